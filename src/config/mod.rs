//! Configuration loading and management for the leave engine.
//!
//! This module provides functionality to load leave policies from YAML files,
//! including policy metadata, allocation rules and the roles permitted at
//! each approval stage.
//!
//! # Example
//!
//! ```no_run
//! use leave_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded policy: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AllocationRules, ApproverRules, LeavePolicy, PolicyConfig, PolicyMetadata};
