//! # codegraph-store
//!
//! The Graph Store Adapter (spec §4.2): a thin semantic layer over SQLite
//! that persists [`codegraph_core::schema`] nodes/edges scoped by project and
//! answers the read queries higher layers need. Hides all store syntax —
//! callers never see a `Connection` or a SQL string.

pub mod connection;
pub mod engine;
pub mod snapshot;

pub use engine::GraphStoreEngine;
pub use snapshot::GraphSnapshot;
