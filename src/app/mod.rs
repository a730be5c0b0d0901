// logrange - app/mod.rs
//
// Application layer: orchestration of the analysis pipeline.
// Dependencies: core, platform.

pub mod analyse;
