use std::f32::consts::PI;

use glam::Vec2;
use storewalk::{CameraController, StoreConfig};

const DT: f32 = 1.0 / 60.0;

fn entered_controller() -> CameraController {
    let mut controller = CameraController::new(&StoreConfig::default(), 16.0 / 9.0);
    controller.enter();
    settle(&mut controller);
    controller
}

fn settle(controller: &mut CameraController) {
    for _ in 0..120 {
        controller.update(DT);
    }
}

#[cfg(test)]
mod navigation_tests {
    use super::*;

    #[test]
    fn test_scroll_clamps_to_section_range() {
        let mut c = entered_controller();
        let last = c.section_count() - 1;

        for _ in 0..10 {
            c.handle_scroll(120.0);
            settle(&mut c);
        }
        assert_eq!(c.state().current_section, last);
        assert_eq!(c.handle_scroll(120.0), None, "no step past the last section");

        for _ in 0..10 {
            c.handle_scroll(-120.0);
            settle(&mut c);
        }
        assert_eq!(c.state().current_section, 0);
        assert_eq!(c.handle_scroll(-120.0), None, "no step before the first section");
    }

    #[test]
    fn test_navigate_to_current_section_is_noop() {
        let mut c = entered_controller();
        let before = c.target_pose();
        assert!(!c.navigate_to_section(0));
        assert!(!c.state().is_animating);
        assert_eq!(c.target_pose(), before);
    }

    #[test]
    fn test_navigate_out_of_range_is_clamped() {
        let mut c = entered_controller();
        assert!(c.navigate_to_section(99));
        settle(&mut c);
        assert_eq!(c.state().current_section, c.section_count() - 1);
    }

    #[test]
    fn test_request_during_flight_is_dropped() {
        let mut c = entered_controller();
        assert!(c.navigate_to_section(1));
        c.update(DT);
        assert!(c.state().is_animating);

        assert!(!c.navigate_to_section(2));
        assert_eq!(c.handle_scroll(120.0), None);
        settle(&mut c);

        assert_eq!(c.state().current_section, 1);
        assert!(!c.state().is_animating);
    }

    #[test]
    fn test_target_reaches_waypoint_after_duration() {
        let mut c = entered_controller();
        let duration = StoreConfig::default().navigation_duration_secs;
        c.navigate_to_section(2);

        let frames = (duration / DT).ceil() as u32 + 1;
        for _ in 0..frames {
            c.update(DT);
        }
        let waypoint = c.waypoint(2).unwrap();
        assert!(c.target_pose().distance(&waypoint) < 1e-3);
        assert!(!c.state().is_animating);
    }

    #[test]
    fn test_current_pose_converges_monotonically() {
        let mut c = entered_controller();
        c.navigate_to_section(1);
        for _ in 0..120 {
            c.update(DT);
        }
        assert!(!c.state().is_animating);

        let mut previous = c.current_pose().distance(&c.target_pose());
        for _ in 0..300 {
            c.update(DT);
            let gap = c.current_pose().distance(&c.target_pose());
            assert!(gap <= previous + 1e-6, "gap grew from {previous} to {gap}");
            previous = gap;
        }
        assert!(previous < 1e-2);
    }

    #[test]
    fn test_orbit_never_reaches_poles() {
        let mut c = entered_controller();
        c.pointer_down(Vec2::new(400.0, 300.0));
        for step in 1..=50 {
            c.pointer_move(Vec2::new(400.0, 300.0 + step as f32 * 200.0));
            let phi = c.orbit_angles().phi;
            assert!(phi > 0.0 && phi < PI, "phi {phi} left (0, pi)");
        }
        for step in 1..=100 {
            c.pointer_move(Vec2::new(400.0, 10_000.0 - step as f32 * 400.0));
            let phi = c.orbit_angles().phi;
            assert!(phi > 0.0 && phi < PI, "phi {phi} left (0, pi)");
        }
        c.pointer_up();
    }

    #[test]
    fn test_orbit_during_flight_survives_the_flight() {
        let mut c = entered_controller();
        c.navigate_to_section(1);
        for _ in 0..30 {
            c.update(DT);
        }
        assert!(c.state().is_animating);

        let before = c.target_pose();
        c.orbit_by(Vec2::new(300.0, 0.0));
        assert_ne!(c.target_pose().position, before.position, "orbit applies at once");

        // Every waypoint looks straight down -Z, so without the drag theta would stay at 0
        let turned = -300.0 * StoreConfig::default().orbit_sensitivity;
        c.update(DT);
        assert!(
            (c.orbit_angles().theta - turned).abs() < 1e-3,
            "orbit was overwritten by the flight"
        );

        settle(&mut c);
        assert!(!c.state().is_animating);
        assert_eq!(c.state().current_section, 1);

        let waypoint = c.waypoint(1).unwrap();
        let end = c.target_pose();
        assert!(end.look_at.distance(waypoint.look_at) < 1e-4);
        assert!((c.orbit_angles().theta - turned).abs() < 1e-3, "orbit lost at flight end");
        let radius = waypoint.position.distance(waypoint.look_at);
        assert!((end.position.distance(end.look_at) - radius).abs() < 1e-3);
    }

    #[test]
    fn test_orbit_does_not_move_current_pose_directly() {
        let mut c = entered_controller();
        let before = c.current_pose();
        c.orbit_by(Vec2::new(80.0, 0.0));
        assert_eq!(c.current_pose(), before);
        c.update(DT);
        assert_ne!(c.current_pose(), before);
    }
}
