//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! environment variables / flags
//!     → loader.rs (clap parse, defaults, hostname lookup)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc with every request handler
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never mutated afterwards
//! - All fields have defaults so an empty environment is valid
//! - Validation separates syntactic (clap) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_from_env, ConfigError, ProxyArgs};
pub use schema::{
    IdentityConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, TargetConfig, TimeoutConfig,
};
