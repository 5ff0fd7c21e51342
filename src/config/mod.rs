//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply command-line overrides)
//!     → validation.rs (semantic checks)
//!     → SumConfig (validated, immutable)
//!     → borrowed by the controller for one run
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a run starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::ComputationConfig;
pub use schema::CoordinationConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::SignalConfig;
pub use schema::SumConfig;
