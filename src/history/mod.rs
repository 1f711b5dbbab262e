//! Request history: captured records, the bounded store and its statistics
//!
//! The store is created once by the application root and shared by `Arc`
//! between the forwarding path (which appends) and the admin surface (which
//! reads and clears).

pub mod record;
pub mod stats;
pub mod store;


pub use record::{HeaderSnapshot, RequestRecord};
pub use stats::RequestStats;
pub use store::HistoryStore;
