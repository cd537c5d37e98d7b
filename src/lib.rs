//! Cartlab - Class dashboard statistics for cart-mass experiments
//!
//! Student groups submit roll distances for a cart under several added-mass
//! conditions. This library validates those submissions, narrows them by
//! class, and derives the instructor dashboard: per-condition confidence
//! intervals, the mass/distance trend, hypothesis correctness, precision
//! rankings, effect sizes against the control and a cross-class comparison.
//!
//! Views are recomputed in full whenever the record stream emits or the
//! class filter changes (see [`pipeline::ReactivePipeline`]).

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod draft;
pub mod filter;
pub mod numeric;
pub mod pipeline;
pub mod record;
pub mod store;
pub mod stream;
pub mod submit;
