//! # fleetscan-export
//!
//! Renders a job snapshot into its stable output formats. Exporting is
//! a pure function of the snapshot: no side effects, and calling it
//! twice on a terminal job produces byte-identical output.

pub mod render;

pub use render::{render_csv, render_failed_csv, render_json};
