//! Outbound adapters implementing domain ports.
//!
//! - **memory**: transactional in-process community store and taxonomy
//!
//! Adapters are thin translators between domain types and their storage
//! representation. They contain no business logic.

pub mod memory;
