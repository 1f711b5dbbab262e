//! Domain types for netkit
//!
//! Validated configuration values shared by the settings layer and the core.

pub mod config_types;
