//! Test Module
//!
//! Cross-module test suite for the Little Genius chat core.
//!
//! ## Test Categories
//! - `brain_tests`: Reply rules, calculator, echo guard and fallbacks
//! - `session_tests`: Send flow, in-flight guard, failure replies, undo
//! - `integration_tests`: Config to engine to client to session workflows

pub mod integration_tests;
pub mod session_tests;
