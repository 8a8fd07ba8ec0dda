pub mod branching;
pub mod engine;
pub mod histogram;
pub mod ladder;
pub mod pacing;
pub mod token;

pub use engine::{Command, Simulation, Stats};
pub use pacing::FrameClock;
