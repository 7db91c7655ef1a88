// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::config::LoadFailurePolicy;

#[derive(Parser, Debug, Clone)]
#[command(name = "storewalk")]
#[command(about = "Walk-through 3D store for a product catalog", long_about = None)]
pub struct Cli {
    /// Catalog JSON: an array of entities
    #[arg(long)]
    pub catalog: PathBuf,

    /// Store configuration JSON; defaults are used when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the environment model path
    #[arg(long)]
    pub environment: Option<String>,

    /// Behaviour when the environment model fails to load: throw or fallback
    #[arg(long = "on-load-failure")]
    pub on_load_failure: Option<LoadFailurePolicy>,

    /// Run a scripted walk-through without opening a window
    #[arg(long, default_value = "false")]
    pub headless: bool,

    /// Frames per section in headless mode
    #[arg(long, default_value_t = 120)]
    pub frames: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "storewalk",
            "--catalog",
            "items.json",
            "--on-load-failure",
            "throw",
            "--headless",
        ])
        .unwrap();
        assert_eq!(cli.catalog, PathBuf::from("items.json"));
        assert_eq!(cli.on_load_failure, Some(LoadFailurePolicy::Throw));
        assert!(cli.headless);
        assert_eq!(cli.frames, 120);
    }

    #[test]
    fn catalog_is_required() {
        assert!(Cli::try_parse_from(["storewalk"]).is_err());
    }
}
