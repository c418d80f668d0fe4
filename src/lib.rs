//! gridtree
//!
//! Config-driven, lazily drillable grids over relational REST data. The
//! engine lives in the workspace crates; this crate adds the headless
//! JSON-lines bridge used by UI layers and scripts.

pub mod headless;

pub use headless::runner::{run_headless, HeadlessOptions};
