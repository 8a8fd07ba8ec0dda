//! Branching Galton-board cascade: a ball starts in the first box of a
//! descending ladder, hops forward at random, splits by a multiplicative
//! factor and the per-box landing counts build up a histogram.
//!
//! `simulation` is the renderer-agnostic engine; `scene`, `gpu` and `app`
//! draw it in a winit window.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod gpu;
pub mod scene;
pub mod simulation;
