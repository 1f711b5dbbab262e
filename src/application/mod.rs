//! Application root
//!
//! Builds the shared history store and the proxy and admin services from
//! settings, then serves them on their listeners.

pub mod app;

pub use app::Application;
