//! Application-level configuration.
//!
//! - [`EngineParams`]: sampling bounds, windows, timeouts, proposal schedule

pub mod engine_params;

pub use engine_params::EngineParams;
