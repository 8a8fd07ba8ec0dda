use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{clamp_factor, SimConfig};
use crate::simulation::branching::branch;
use crate::simulation::histogram::Histogram;
use crate::simulation::ladder::StateLadder;
use crate::simulation::pacing::Pacing;
use crate::simulation::token::{Phase, Token};

/// Discrete control input from the front-end
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Reset,
    SetFactor(f32),
    AdjustSpeed(f32),
    TogglePause,
}

/// Counters the front-end shows alongside the picture
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stats {
    pub states: usize,
    pub steps: u64,
    pub balls: usize,
    pub cycles: u64,
    pub factor: f32,
    pub speed: f32,
    pub paused: bool,
    /// Balls discarded by the population cap since the last reset
    pub dropped: u64,
}

/// Cycle controller: owns the ladder, the live balls, the clocks and the RNG
pub struct Simulation {
    ladder: StateLadder,
    tokens: Vec<Token>,
    pacing: Pacing,
    factor: f32,
    max_factor: f32,
    max_population: usize,
    trail_capacity: usize,
    steps: u64,
    cycles: u64,
    dropped: u64,
    cycle_wait_elapsed: f32,
    paused: bool,
    rng: StdRng,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let config = config.normalized();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut sim = Self {
            ladder: StateLadder::new(config.box_count),
            tokens: Vec::new(),
            pacing: Pacing::from_config(&config),
            factor: config.factor,
            max_factor: config.max_factor,
            max_population: config.max_population,
            trail_capacity: config.trail_capacity,
            steps: 0,
            cycles: 0,
            dropped: 0,
            cycle_wait_elapsed: 0.0,
            paused: false,
            rng,
        };
        sim.spawn_origin();
        sim
    }

    /// Advance the world by `dt` seconds. Does nothing while paused.
    pub fn tick(&mut self, dt: f32) {
        if self.paused {
            return;
        }

        if self.all_terminal() {
            self.cycle_wait_elapsed += dt;
            if self.cycle_wait_elapsed > self.pacing.cycle_wait() {
                self.start_new_cycle();
            }
            return;
        }

        let wait = self.pacing.wait();
        let jump_step = dt / self.pacing.jump();
        let terminal = self.ladder.terminal();

        let current = std::mem::take(&mut self.tokens);
        let mut next = Vec::with_capacity(current.len().min(self.max_population));
        let mut excess = 0usize;

        for mut token in current {
            token.trail.push(token.position);

            match token.phase {
                Phase::Terminal => next.push(token),
                Phase::Waiting { elapsed } => {
                    let elapsed = elapsed + dt;
                    if elapsed <= wait {
                        token.phase = Phase::Waiting { elapsed };
                        next.push(token);
                        continue;
                    }

                    if token.state > 0 {
                        self.ladder.arrive(token.state);
                        self.steps += 1;
                    }

                    if token.state == terminal {
                        token.phase = Phase::Terminal;
                        next.push(token);
                    } else {
                        let room = self.max_population.saturating_sub(next.len());
                        let (children, overflow) =
                            branch(&token, self.factor, &self.ladder, room, &mut self.rng);
                        next.extend(children);
                        excess += overflow;
                    }
                }
                Phase::Transiting { .. } => {
                    token.advance_jump(jump_step);
                    next.push(token);
                }
            }
        }

        if next.len() > self.max_population {
            excess += next.len() - self.max_population;
            next.truncate(self.max_population);
        }
        if excess > 0 {
            self.dropped += excess as u64;
            log::debug!(
                "Population capped at {} balls ({} dropped)",
                self.max_population,
                excess
            );
        }

        self.tokens = next;
    }

    pub fn issue(&mut self, command: Command) {
        match command {
            Command::Reset => {
                self.reset();
                log::info!("Simulation reset");
            }
            Command::SetFactor(factor) => {
                self.factor = clamp_factor(factor, self.max_factor);
                self.reset();
                log::info!("Multiplicative factor set to {:.2}", self.factor);
            }
            Command::AdjustSpeed(delta) => {
                let speed = self.pacing.adjust(delta);
                log::info!("Speed set to {:.1}x", speed);
            }
            Command::TogglePause => {
                self.paused = !self.paused;
                log::info!(
                    "Simulation {}",
                    if self.paused { "paused" } else { "resumed" }
                );
            }
        }
    }

    fn reset(&mut self) {
        self.ladder.reset();
        self.steps = 0;
        self.cycles = 0;
        self.dropped = 0;
        self.cycle_wait_elapsed = 0.0;
        self.spawn_origin();
    }

    fn start_new_cycle(&mut self) {
        self.spawn_origin();
        self.cycles += 1;
        self.cycle_wait_elapsed = 0.0;
        log::info!("Starting cycle {}", self.cycles);
    }

    fn spawn_origin(&mut self) {
        let origin = Token::resting(0, self.ladder.anchor(0), self.trail_capacity);
        self.tokens = vec![origin];
    }

    fn all_terminal(&self) -> bool {
        !self.tokens.is_empty() && self.tokens.iter().all(Token::is_terminal)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn ladder(&self) -> &StateLadder {
        &self.ladder
    }

    pub fn visits(&self) -> Vec<u32> {
        self.ladder.visits()
    }

    pub fn histogram(&self) -> Histogram {
        Histogram::from_ladder(&self.ladder)
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn max_factor(&self) -> f32 {
        self.max_factor
    }

    pub fn speed(&self) -> f32 {
        self.pacing.speed()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            states: self.ladder.terminal(),
            steps: self.steps,
            balls: self.tokens.len(),
            cycles: self.cycles,
            factor: self.factor,
            speed: self.pacing.speed(),
            paused: self.paused,
            dropped: self.dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_FACTOR_CEILING, MAX_POPULATION};

    const WAIT_DT: f32 = 1.6;
    const JUMP_DT: f32 = 1.0;

    fn seeded(box_count: usize, factor: f32, seed: u64) -> Simulation {
        Simulation::new(SimConfig {
            box_count,
            factor,
            seed: Some(seed),
            ..SimConfig::default()
        })
    }

    /// Tick until the current cycle finishes; returns the number of ticks
    fn run_cycle(sim: &mut Simulation, dt: f32, limit: usize) -> usize {
        let start = sim.cycles();
        for n in 1..=limit {
            sim.tick(dt);
            if sim.cycles() > start {
                return n;
            }
        }
        panic!("cycle did not finish within {} ticks", limit);
    }

    #[test]
    fn test_starts_with_single_origin_ball() {
        let sim = seeded(21, 1.0, 0);
        assert_eq!(sim.tokens().len(), 1);
        assert_eq!(sim.tokens()[0].state, 0);
        assert_eq!(sim.steps(), 0);
        assert_eq!(sim.cycles(), 0);
        assert!(sim.visits().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_ball_waits_before_advancing() {
        let mut sim = seeded(21, 1.0, 0);
        sim.tick(1.0);
        sim.tick(0.5);
        // Exactly at the wait threshold is not enough
        assert!(matches!(sim.tokens()[0].phase, Phase::Waiting { .. }));
        sim.tick(0.01);
        assert!(sim.tokens()[0].destination().is_some());
    }

    #[test]
    fn test_doubling_scenario_on_small_ladder() {
        let mut sim = seeded(5, 2.0, 1234);

        sim.tick(WAIT_DT);
        let tokens = sim.tokens();
        assert_eq!(tokens.len(), 2);
        let destinations: Vec<usize> = tokens
            .iter()
            .map(|t| t.destination().expect("in flight"))
            .collect();
        for &d in &destinations {
            assert!((1..=4).contains(&d));
        }
        // The origin box is never counted
        assert_eq!(sim.visits(), vec![0; 5]);
        assert_eq!(sim.steps(), 0);

        sim.tick(JUMP_DT);
        for (token, &d) in sim.tokens().iter().zip(&destinations) {
            assert_eq!(token.state, d);
            assert_eq!(token.position, sim.ladder().anchor(d));
        }

        // The landing is tallied once the dwell in the new box elapses
        sim.tick(WAIT_DT);
        let visits = sim.visits();
        for state in 1..5 {
            let expected = destinations.iter().filter(|&&d| d == state).count() as u32;
            assert_eq!(visits[state], expected, "box {}", state);
        }
        assert_eq!(sim.steps(), 2);
    }

    #[test]
    fn test_terminal_box_counted_once_per_ball() {
        // Two boxes: every jump lands on the terminal box
        let mut sim = seeded(2, 1.0, 5);
        sim.tick(WAIT_DT);
        sim.tick(JUMP_DT);
        assert_eq!(sim.tokens()[0].state, 1);
        assert!(!sim.tokens()[0].is_terminal());

        sim.tick(WAIT_DT);
        assert!(sim.tokens()[0].is_terminal());
        assert_eq!(sim.visits(), vec![0, 1]);

        // Absorbed balls are not counted again
        sim.tick(0.5);
        assert_eq!(sim.visits(), vec![0, 1]);
        assert_eq!(sim.steps(), 1);
    }

    #[test]
    fn test_cycle_finishes_and_restarts() {
        let mut sim = seeded(21, 1.0, 9);
        // At most one jump per box, each needing a wait tick and a jump tick,
        // then two ticks of inter-cycle wait
        let ticks = run_cycle(&mut sim, 2.5, 2 * 21 + 4);
        assert!(ticks > 2);

        assert_eq!(sim.cycles(), 1);
        assert_eq!(sim.tokens().len(), 1);
        assert_eq!(sim.tokens()[0].state, 0);
        // Counters survive a normal rollover
        assert!(sim.steps() > 0);
        assert!(sim.visits()[20] >= 1);
    }

    #[test]
    fn test_branching_cycles_terminate() {
        let mut sim = seeded(21, 2.5, 77);
        for _ in 0..3 {
            run_cycle(&mut sim, 2.5, 200);
        }
        assert_eq!(sim.cycles(), 3);
    }

    #[test]
    fn test_visits_monotonic_across_cycles() {
        let mut sim = seeded(12, 1.5, 21);
        let mut previous = sim.visits();
        for _ in 0..400 {
            sim.tick(0.9);
            let current = sim.visits();
            for (now, before) in current.iter().zip(&previous) {
                assert!(now >= before);
            }
            previous = current;
        }
        assert!(sim.cycles() > 0);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut sim = seeded(21, 2.0, 4);
        for _ in 0..30 {
            sim.tick(1.0);
        }
        assert!(sim.steps() > 0);

        sim.issue(Command::Reset);
        assert_eq!(sim.tokens().len(), 1);
        assert_eq!(sim.tokens()[0].state, 0);
        assert!(sim.visits().iter().all(|&v| v == 0));
        assert_eq!(sim.steps(), 0);
        assert_eq!(sim.cycles(), 0);
        assert!(sim.histogram().heights().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_set_factor_clamps_and_resets() {
        let mut sim = seeded(21, 1.0, 4);
        for _ in 0..10 {
            sim.tick(1.0);
        }

        sim.issue(Command::SetFactor(9.0));
        assert_eq!(sim.factor(), sim.max_factor());
        assert_eq!(sim.steps(), 0);
        assert_eq!(sim.tokens().len(), 1);

        sim.issue(Command::SetFactor(0.3));
        assert_eq!(sim.factor(), 1.0);
    }

    #[test]
    fn test_adjust_speed_clamps() {
        let mut sim = seeded(21, 1.0, 4);
        sim.issue(Command::AdjustSpeed(-5.0));
        assert_eq!(sim.speed(), 0.1);
        sim.issue(Command::AdjustSpeed(50.0));
        assert_eq!(sim.speed(), 10.0);
    }

    #[test]
    fn test_population_cap_truncates() {
        let mut sim = seeded(21, 40.0, 8);
        sim.tick(WAIT_DT);
        assert_eq!(sim.tokens().len(), 40);
        sim.tick(JUMP_DT);

        // Forty balls branching forty ways at once overflow the cap
        sim.tick(WAIT_DT);
        assert_eq!(sim.tokens().len(), 1000);
        assert!(sim.stats().dropped > 0);
    }

    #[test]
    fn test_huge_factor_stays_bounded() {
        let mut sim = Simulation::new(SimConfig {
            factor: 1e30,
            max_factor: 1e30,
            seed: Some(1),
            ..SimConfig::default()
        });
        assert_eq!(sim.factor(), MAX_FACTOR_CEILING);

        for _ in 0..6 {
            sim.tick(WAIT_DT);
            assert!(sim.tokens().len() <= MAX_POPULATION);
        }
    }

    /// Drive a two-box ladder until its single ball is absorbed
    fn finish_two_box_cycle(sim: &mut Simulation) {
        let pacing_dt = 1.0 / sim.speed();
        sim.tick(WAIT_DT * pacing_dt);
        sim.tick(JUMP_DT * pacing_dt);
        sim.tick(WAIT_DT * pacing_dt);
        assert!(sim.tokens().iter().all(Token::is_terminal));
    }

    #[test]
    fn test_next_cycle_waits_for_cycle_pause() {
        let mut sim = seeded(2, 1.0, 6);
        finish_two_box_cycle(&mut sim);

        // 1.9 s of the 2.0 s pause: still the finished population
        sim.tick(1.0);
        sim.tick(0.9);
        assert_eq!(sim.cycles(), 0);
        assert!(sim.tokens()[0].is_terminal());

        sim.tick(0.2);
        assert_eq!(sim.cycles(), 1);
        assert_eq!(sim.tokens().len(), 1);
        assert_eq!(sim.tokens()[0].state, 0);
        assert!(!sim.tokens()[0].is_terminal());
    }

    #[test]
    fn test_cycle_pause_scales_with_speed() {
        let mut sim = Simulation::new(SimConfig {
            box_count: 2,
            speed: 2.0,
            seed: Some(6),
            ..SimConfig::default()
        });
        finish_two_box_cycle(&mut sim);

        // Half of the 2.0 s pause at double speed
        sim.tick(0.9);
        assert_eq!(sim.cycles(), 0);
        sim.tick(0.2);
        assert_eq!(sim.cycles(), 1);
        assert_eq!(sim.tokens().len(), 1);
        assert_eq!(sim.tokens()[0].state, 0);
    }

    #[test]
    fn test_pause_freezes_and_resume_is_seamless() {
        let mut paused = seeded(8, 2.0, 99);
        let mut control = seeded(8, 2.0, 99);

        paused.tick(WAIT_DT);
        control.tick(WAIT_DT);

        paused.issue(Command::TogglePause);
        let tokens = paused.tokens().to_vec();
        let visits = paused.visits();
        for _ in 0..5 {
            paused.tick(0.5);
        }
        assert_eq!(paused.tokens(), tokens.as_slice());
        assert_eq!(paused.visits(), visits);
        assert_eq!(paused.steps(), control.steps());

        paused.issue(Command::TogglePause);
        paused.tick(0.4);
        control.tick(0.4);
        assert_eq!(paused.tokens(), control.tokens());
        assert_eq!(paused.visits(), control.visits());
        assert_eq!(paused.stats(), control.stats());
    }

    #[test]
    fn test_trail_grows_while_running() {
        let mut sim = seeded(21, 1.0, 2);
        for _ in 0..60 {
            sim.tick(0.01);
        }
        let trail = &sim.tokens()[0].trail;
        assert_eq!(trail.len(), 50);
    }
}
