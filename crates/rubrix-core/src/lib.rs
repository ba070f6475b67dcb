//! rubrix-core — Core rubric evaluation engine, traits, and scoring.
//!
//! This crate defines the fundamental data model, collaborator traits, and
//! the scoring pipeline (AI path plus deterministic heuristic fallback) that
//! the entire rubrix system builds on.

pub mod ai;
pub mod concepts;
pub mod context;
pub mod engine;
pub mod error;
pub mod heuristic;
pub mod model;
pub mod parser;
pub mod router;
pub mod traits;
