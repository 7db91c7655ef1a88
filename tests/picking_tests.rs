mod common;

use common::*;
use glam::Vec2;
use storewalk::{InputEvent, StoreEvent};

fn entered_store() -> Store {
    let mut store = ready_store(six_entities());
    store.enter_store();
    run(&mut store, 3.0);
    store
}

#[cfg(test)]
mod picking_tests {
    use super::*;

    #[test]
    fn test_click_on_product_publishes_entity() {
        let mut store = entered_store();
        let seen = record_all(&mut store);

        let product = store.displays()[0].pickable_nodes()[0];
        let expected = store.displays()[0].entity().clone();
        let position = screen_position(&store, product);

        assert_eq!(store.pick(position), Some(&expected));
        store.handle_input(InputEvent::Click { position });
        assert_eq!(*seen.borrow(), vec![StoreEvent::EntityClick { entity: expected }]);
    }

    #[test]
    fn test_click_on_empty_space_publishes_nothing() {
        let mut store = entered_store();
        let seen = record_all(&mut store);

        store.handle_input(InputEvent::Click { position: Vec2::new(1.0, 1.0) });
        assert!(seen.borrow().is_empty());
        assert_eq!(store.pick(Vec2::new(1.0, 1.0)), None);
    }

    #[test]
    fn test_labels_are_not_pickable() {
        let store = entered_store();
        let display = &store.displays()[1];
        let label = display.label().unwrap();
        assert!(!display.pickable_nodes().contains(&label));
    }

    #[test]
    fn test_pick_follows_resize() {
        let mut store = entered_store();
        store.handle_input(InputEvent::Resize { width: 800, height: 800 });
        let product = store.displays()[1].pickable_nodes()[0];
        let position = screen_position(&store, product);
        assert_eq!(store.pick(position).map(|e| e.id.as_str()), Some("2"));
    }
}
