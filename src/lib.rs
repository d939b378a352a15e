// Library interface for the planrs scheduling and progression engine
// This allows integration tests to access the core functionality

pub mod badges;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod parser;
pub mod progression;
pub mod resolver;

// Re-export commonly used types for convenience
pub use models::*;
pub use badges::{BadgeDefinition, BadgeMetric, BADGES};
pub use error::{PlanError, Result};
pub use ledger::CompletionLedger;
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use parser::{parse, strip_formatting, WorkoutDescriptor, WorkoutSections};
pub use progression::{compute_progress, compute_streaks, toggle_completion, ToggleOutcome};
pub use resolver::{PlanResolver, PlanSchema};
