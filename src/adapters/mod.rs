//! Concrete adapter implementations of the port traits.

pub mod file_config_adapter;
pub mod csv_replay_adapter;
pub mod json_state_adapter;
pub mod rate_limiter;
