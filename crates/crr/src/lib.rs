//! # crr
//!
//! Wires the target and source units into two stacks and an app. The binary
//! in `main.rs` loads configuration and synthesizes the app.

pub mod stacks;

pub use stacks::{build_app, SourceStack, TargetStack, SOURCE_CONSTRUCT_ID, TARGET_CONSTRUCT_ID};
