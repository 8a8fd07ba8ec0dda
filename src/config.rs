/// Layout surface in pixels (the renderer maps this onto the window)
pub const WINDOW_WIDTH: f32 = 1280.0;
pub const WINDOW_HEIGHT: f32 = 720.0;

/// Pixels per world unit
pub const SCALE: f32 = 30.0;

/// Ball radius in world units
pub const BALL_RADIUS: f32 = 0.5;

/// Gap between neighbouring boxes in pixels
pub const BOX_GAP: f32 = 2.0;

/// Height step per box in world units at the default box count
pub const BOX_HEIGHT_STEP: f32 = 0.6;

/// Narrowest box the layout will draw, in pixels
pub const MIN_BOX_WIDTH: f32 = 1.0;

// ============================================
// Simulation Parameters
// ============================================

/// Number of boxes in the ladder (index 0 = origin, BOX_COUNT - 1 = terminal)
pub const BOX_COUNT: usize = 21;

/// Smallest ladder that still has an origin and a terminal box
pub const MIN_BOX_COUNT: usize = 2;

/// Largest ladder whose boxes still have a usable width on the layout
pub const MAX_BOX_COUNT: usize = 200;

/// Trail positions remembered per ball
pub const TRAIL_CAPACITY: usize = 50;

/// Hard cap on live balls; overflow is dropped at the end of a tick
pub const MAX_POPULATION: usize = 1000;

/// Seconds a ball rests in a box before advancing (at speed 1.0)
pub const BASE_WAIT: f32 = 1.5;

/// Seconds a jump between boxes takes (at speed 1.0)
pub const BASE_JUMP: f32 = 0.8;

/// Seconds between the last ball finishing and the next cycle (at speed 1.0)
pub const CYCLE_WAIT: f32 = 2.0;

/// Peak height of the jump arc in pixels
pub const ARC_HEIGHT: f32 = 100.0;

/// Horizontal spread between siblings at spawn, in pixels
pub const SIBLING_OFFSET: f32 = 5.0;

// ============================================
// User-adjustable Bounds
// ============================================

pub const MIN_SPEED: f32 = 0.1;
pub const MAX_SPEED: f32 = 10.0;
pub const SPEED_STEP: f32 = 0.5;

pub const MIN_FACTOR: f32 = 1.0;
pub const DEFAULT_MAX_FACTOR: f32 = 4.0;
/// Hard upper bound for any configured factor ceiling
pub const MAX_FACTOR_CEILING: f32 = 100.0;
pub const FACTOR_STEP: f32 = 0.5;

/// Runtime simulation settings, built from defaults and the command line.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub box_count: usize,
    pub factor: f32,
    pub max_factor: f32,
    pub speed: f32,
    pub base_wait: f32,
    pub base_jump: f32,
    pub cycle_wait: f32,
    pub max_population: usize,
    pub trail_capacity: usize,
    /// Fixed RNG seed for reproducible runs; entropy when `None`
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            box_count: BOX_COUNT,
            factor: MIN_FACTOR,
            max_factor: DEFAULT_MAX_FACTOR,
            speed: 1.0,
            base_wait: BASE_WAIT,
            base_jump: BASE_JUMP,
            cycle_wait: CYCLE_WAIT,
            max_population: MAX_POPULATION,
            trail_capacity: TRAIL_CAPACITY,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Clamp every field into its policy range.
    ///
    /// Out-of-range values are never an error. The factor ceiling lands in
    /// `[MIN_FACTOR, min(MAX_FACTOR_CEILING, max_population)]`, so a single
    /// branch can never outgrow the population cap; factor and speed are
    /// clamped after that.
    pub fn normalized(mut self) -> Self {
        self.box_count = self.box_count.clamp(MIN_BOX_COUNT, MAX_BOX_COUNT);
        self.max_population = self.max_population.max(1);
        let ceiling = MAX_FACTOR_CEILING.min(self.max_population as f32).max(MIN_FACTOR);
        self.max_factor = sanitize(self.max_factor, DEFAULT_MAX_FACTOR).clamp(MIN_FACTOR, ceiling);
        self.factor = clamp_factor(self.factor, self.max_factor);
        self.speed = clamp_speed(self.speed);
        self.base_wait = sanitize(self.base_wait, BASE_WAIT).max(0.0);
        self.base_jump = sanitize(self.base_jump, BASE_JUMP).max(f32::EPSILON);
        self.cycle_wait = sanitize(self.cycle_wait, CYCLE_WAIT).max(0.0);
        self
    }
}

/// Clamp a multiplicative factor to `[MIN_FACTOR, max_factor]`
pub fn clamp_factor(factor: f32, max_factor: f32) -> f32 {
    sanitize(factor, MIN_FACTOR).clamp(MIN_FACTOR, max_factor.max(MIN_FACTOR))
}

/// Clamp a speed multiplier to `[MIN_SPEED, MAX_SPEED]`
pub fn clamp_speed(speed: f32) -> f32 {
    sanitize(speed, 1.0).clamp(MIN_SPEED, MAX_SPEED)
}

fn sanitize(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
