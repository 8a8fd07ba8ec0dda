use crate::simulation::ladder::StateLadder;

/// One histogram bar: a non-origin box and its normalized height
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub state: usize,
    pub count: u32,
    /// `count / max(count)`, in [0, 1]
    pub height: f32,
}

/// Visit frequencies for boxes 1..=terminal, normalized to the busiest box
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    pub bars: Vec<Bar>,
    pub max_count: u32,
}

impl Histogram {
    pub fn from_ladder(ladder: &StateLadder) -> Self {
        let counted = &ladder.boxes()[1..];
        let max_count = counted.iter().map(|b| b.visits).max().unwrap_or(0);
        let denominator = max_count.max(1) as f32;

        let bars = counted
            .iter()
            .map(|b| Bar {
                state: b.index,
                count: b.visits,
                height: b.visits as f32 / denominator,
            })
            .collect();

        Self { bars, max_count }
    }

    pub fn heights(&self) -> Vec<f32> {
        self.bars.iter().map(|b| b.height).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ladder_is_flat() {
        let ladder = StateLadder::new(21);
        let histogram = Histogram::from_ladder(&ladder);
        assert_eq!(histogram.bars.len(), 20);
        assert_eq!(histogram.max_count, 0);
        assert!(histogram.heights().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_busiest_box_is_full_height() {
        let mut ladder = StateLadder::new(5);
        for _ in 0..4 {
            ladder.arrive(2);
        }
        ladder.arrive(3);
        ladder.arrive(4);
        ladder.arrive(4);

        let histogram = Histogram::from_ladder(&ladder);
        assert_eq!(histogram.max_count, 4);
        assert_eq!(histogram.heights(), vec![0.0, 1.0, 0.25, 0.5]);
        assert_eq!(histogram.bars[0].state, 1);
    }

    #[test]
    fn test_reset_reflects_immediately() {
        let mut ladder = StateLadder::new(5);
        ladder.arrive(1);
        ladder.reset();
        let histogram = Histogram::from_ladder(&ladder);
        assert!(histogram.heights().iter().all(|&h| h == 0.0));
    }
}
