use std::collections::VecDeque;

use crate::config::ARC_HEIGHT;

/// Display tag carried by a ball (RGB, 8 bits per channel)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const GREEN: Rgb = Rgb([0, 255, 0]);

    /// Normalized RGBA for the GPU
    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.0;
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, alpha]
    }
}

/// Bounded FIFO of past positions; the oldest entry is evicted first
#[derive(Clone, Debug, PartialEq)]
pub struct Trail {
    points: VecDeque<[f32; 2]>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, point: [f32; 2]) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &[f32; 2]> {
        self.points.iter()
    }
}

/// Where a ball is in its wait / jump / done cycle
#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    /// Resting in `Token::state`, `elapsed` seconds since landing
    Waiting { elapsed: f32 },
    /// Jumping toward `destination`; `progress` runs 0 → 1
    Transiting {
        destination: usize,
        start: [f32; 2],
        target: [f32; 2],
        progress: f32,
    },
    /// Absorbed at the terminal box
    Terminal,
}

/// A ball on the ladder
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// Box the ball last landed in
    pub state: usize,
    pub position: [f32; 2],
    pub color: Rgb,
    pub trail: Trail,
    pub phase: Phase,
}

impl Token {
    /// A fresh ball resting at `state`
    pub fn resting(state: usize, position: [f32; 2], trail_capacity: usize) -> Self {
        Self {
            state,
            position,
            color: Rgb::GREEN,
            trail: Trail::new(trail_capacity),
            phase: Phase::Waiting { elapsed: 0.0 },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Terminal)
    }

    pub fn destination(&self) -> Option<usize> {
        match self.phase {
            Phase::Transiting { destination, .. } => Some(destination),
            _ => None,
        }
    }

    /// Jump progress in [0, 1]; 0 when not jumping
    pub fn progress(&self) -> f32 {
        match self.phase {
            Phase::Transiting { progress, .. } => progress,
            _ => 0.0,
        }
    }

    /// Start a jump from the current position toward `destination`
    pub fn launch(&mut self, destination: usize, target: [f32; 2]) {
        debug_assert!(destination > self.state, "jumps only move forward");
        self.phase = Phase::Transiting {
            destination,
            start: self.position,
            target,
            progress: 0.0,
        };
    }

    /// Advance an in-flight jump by `step` of its duration.
    ///
    /// Returns true when the ball lands this call; it then rests at the
    /// destination with its wait timer reset.
    pub fn advance_jump(&mut self, step: f32) -> bool {
        let Phase::Transiting {
            destination,
            start,
            target,
            progress,
        } = &mut self.phase
        else {
            return false;
        };

        *progress += step;
        if *progress >= 1.0 {
            self.position = *target;
            self.state = *destination;
            self.phase = Phase::Waiting { elapsed: 0.0 };
            true
        } else {
            self.position = jump_position(*start, *target, *progress);
            false
        }
    }
}

/// Ease-in/ease-out curve 3t² − 2t³
pub fn smooth_step(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Screen position along a jump: eased straight line plus a parabolic lift
pub fn jump_position(start: [f32; 2], target: [f32; 2], progress: f32) -> [f32; 2] {
    let t = smooth_step(progress);
    let x = start[0] + (target[0] - start[0]) * t;
    let base_y = start[1] + (target[1] - start[1]) * t;
    let arc = -ARC_HEIGHT * 4.0 * progress * (1.0 - progress);
    [x, base_y + arc]
}
