// logrange - core/mod.rs
//
// Core business logic layer.
// Dependencies: standard library, regex, chrono, serde, csv.
// Must NOT depend on: app, platform.

pub mod convert;
pub mod export;
pub mod extract;
pub mod filter;
pub mod model;
