//! Configuration system: schema, loading with default merging, env overrides.
//!
//! # Usage
//! ```no_run
//! use snapask_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Provider: {}", cfg.provider);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{default_providers, AppConfig, ProviderSettings};
