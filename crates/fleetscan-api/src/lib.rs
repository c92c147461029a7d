//! # fleetscan-api
//!
//! Thin HTTP glue over the extraction engine: route definitions,
//! request/response DTOs, and the `AppError` → HTTP mapping. All real
//! behavior lives in the engine and store crates.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
