//! docqa core library
//!
//! Foundational utilities shared by every docqa crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - Provider credential wrapper

pub mod config;
pub mod credential;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::AppConfig;
pub use credential::Credential;
pub use error::{AppError, AppResult};
