pub mod loader;
pub mod settings;

pub use loader::{load_config_with_env, save_config};
pub use settings::DigestConfig;
