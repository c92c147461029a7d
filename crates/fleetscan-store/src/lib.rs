//! # fleetscan-store
//!
//! The authoritative in-process registry of extraction jobs.
//!
//! Jobs live in an arena behind a single synchronized map; every read
//! returns a snapshot copy and every mutation goes through
//! [`JobStore::update_record`], so concurrent workers never observe an
//! inconsistent counter pair and no caller ever holds a live reference
//! into store state.

pub mod registry;

pub use registry::{JobStore, RecordUpdate};
