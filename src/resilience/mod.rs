//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (one deadline per request: dispatch + response body)
//!     → On expiry: 504 before the head, truncated body after it; no retry
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline
//! - Failures are terminal; nothing is retried

pub mod timeouts;

pub use timeouts::{Deadline, DeadlineElapsed};
