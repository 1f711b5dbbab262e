//! netkit - a local debugging forward proxy
//!
//! Relays HTTP requests to arbitrary destinations, tunnels CONNECT traffic and
//! keeps a bounded, queryable history of every proxied HTTP exchange with
//! microsecond timing and aggregate statistics.

pub mod admin;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod history;
pub mod proxy;

pub use application::Application;
pub use error::{Error, Result};
