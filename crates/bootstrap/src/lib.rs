//! Composition root for the Huddle data layer.
//!
//! Provides configuration loading, logging setup, and store assembly that
//! front-ends reuse instead of wiring `huddle-runtime` by hand.
pub mod builder;
pub mod config;
pub mod dirs;
pub mod logging;

pub use builder::HuddleBuilder;
pub use config::{HuddleConfig, StoreKind};
pub use logging::setup_logging;
