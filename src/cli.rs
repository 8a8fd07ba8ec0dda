use clap::builder::TypedValueParser;
use clap::Parser;

use crate::config::{SimConfig, BOX_COUNT, DEFAULT_MAX_FACTOR, MAX_BOX_COUNT, MAX_POPULATION};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Branching Galton-board cascade visualizer")]
pub struct Args {
    /// Expected children per branch (1.5 = one child plus a 50% chance of a second)
    #[arg(long, default_value_t = 1.0)]
    pub factor: f32,

    /// Ceiling for the multiplicative factor (clamped to at most 100 and the live ball cap)
    #[arg(long, default_value_t = DEFAULT_MAX_FACTOR)]
    pub max_factor: f32,

    /// Initial speed multiplier
    #[arg(long, default_value_t = 1.0)]
    pub speed: f32,

    /// Number of boxes, origin and terminal included (2-200)
    #[arg(
        long,
        default_value_t = BOX_COUNT,
        value_parser = clap::value_parser!(u16).range(2..=MAX_BOX_COUNT as i64).map(|v| v as usize)
    )]
    pub boxes: usize,

    /// Live ball cap; overflow is dropped each tick
    #[arg(long, default_value_t = MAX_POPULATION)]
    pub max_population: usize,

    /// RNG seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            box_count: self.boxes,
            factor: self.factor,
            max_factor: self.max_factor,
            speed: self.speed,
            max_population: self.max_population,
            seed: self.seed,
            ..SimConfig::default()
        }
        .normalized()
    }
}
