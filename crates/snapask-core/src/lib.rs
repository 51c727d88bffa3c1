//! SnapAsk core: configuration, response sanitizer, prompt building and
//! process-level helpers shared by the provider layer and the CLI.
//!
//! - **config**: on-disk settings schema, loading with default merging, saving
//! - **sanitize**: Markdown → plain text normalization of model output
//! - **prompt**: OCR context + question → single prompt string
//! - **instance**: PID lock file guarding against a second live instance
//! - **types**: OpenAI chat-completions wire types

pub mod config;
pub mod instance;
pub mod prompt;
pub mod sanitize;
pub mod types;
pub mod utils;

pub use config::{AppConfig, ProviderSettings};
pub use instance::{InstanceError, InstanceLock};
pub use prompt::{build_prompt, PromptError, QUICK_QUESTIONS};
pub use sanitize::{sanitize, sanitize_opt, sanitize_value};
