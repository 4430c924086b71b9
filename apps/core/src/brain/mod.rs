//! # Brain Module
//!
//! Rule-based offline reply engine for Little Genius.
//!
//! ## Components
//! - `intent`: Intent types and pattern predicates
//! - `context`: Context window and word-set similarity
//! - `math`: Safe recursive-descent arithmetic evaluator
//! - `nudges`: Canned domain advice and follow-up probes
//! - `rules`: The ordered reply rule table
//! - `engine`: `BrainsEngine`, the `ChatEngine` implementation

pub mod context;
pub mod engine;
pub mod intent;
pub mod math;
pub mod nudges;
pub mod rules;

pub use context::similarity;
pub use engine::BrainsEngine;
pub use intent::Intent;
pub use math::{evaluate, MathError};
