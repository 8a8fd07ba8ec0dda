use crate::config::{
    BALL_RADIUS, BOX_COUNT, BOX_GAP, BOX_HEIGHT_STEP, MIN_BOX_WIDTH, SCALE, WINDOW_HEIGHT,
    WINDOW_WIDTH,
};

/// Height of the first (tallest) box in pixels, whatever the box count
const LADDER_HEIGHT: f32 = BOX_COUNT as f32 * BOX_HEIGHT_STEP * SCALE;

/// One box of the ladder.
///
/// `x`, `width` and `height` are pixel layout used by the renderer and to
/// place balls; they play no part in the simulation rules.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxState {
    pub index: usize,
    pub visits: u32,
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

impl BoxState {
    /// Where a resting ball sits: centered on the box top
    pub fn anchor(&self) -> [f32; 2] {
        [
            self.x + self.width / 2.0,
            WINDOW_HEIGHT - self.height - BALL_RADIUS * SCALE,
        ]
    }
}

/// Fixed, ordered sequence of boxes with per-box visit counters
#[derive(Clone, Debug, PartialEq)]
pub struct StateLadder {
    boxes: Vec<BoxState>,
}

impl StateLadder {
    /// Build a descending staircase of `count` boxes spread across the layout width.
    ///
    /// Heights step down linearly from `LADDER_HEIGHT`, so any box count fits
    /// the layout.
    pub fn new(count: usize) -> Self {
        debug_assert!(count >= 2, "a ladder needs an origin and a terminal box");

        let width = ((WINDOW_WIDTH - (count as f32 + 1.0) * BOX_GAP) / count as f32).max(MIN_BOX_WIDTH);
        let boxes = (0..count)
            .map(|index| BoxState {
                index,
                visits: 0,
                x: index as f32 * (width + BOX_GAP),
                width,
                height: (count - index) as f32 / count as f32 * LADDER_HEIGHT,
            })
            .collect();

        Self { boxes }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn terminal(&self) -> usize {
        self.boxes.len() - 1
    }

    pub fn boxes(&self) -> &[BoxState] {
        &self.boxes
    }

    pub fn anchor(&self, index: usize) -> [f32; 2] {
        self.boxes[index].anchor()
    }

    /// Record a visit to a non-origin box, returning its new count
    pub fn arrive(&mut self, index: usize) -> u32 {
        debug_assert!(index > 0, "the origin box is never counted");
        let state = &mut self.boxes[index];
        state.visits += 1;
        state.visits
    }

    pub fn visits(&self) -> Vec<u32> {
        self.boxes.iter().map(|b| b.visits).collect()
    }

    pub fn reset(&mut self) {
        for state in &mut self.boxes {
            state.visits = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_layout() {
        let ladder = StateLadder::new(21);
        assert_eq!(ladder.len(), 21);
        assert_eq!(ladder.terminal(), 20);

        // Boxes step down left to right and stay inside the layout
        for pair in ladder.boxes().windows(2) {
            assert!(pair[0].height > pair[1].height);
            assert!(pair[0].x < pair[1].x);
        }
        let last = &ladder.boxes()[20];
        assert!(last.x + last.width <= WINDOW_WIDTH);
    }

    #[test]
    fn test_large_ladder_stays_on_screen() {
        for count in [2, 21, 200, 5000] {
            let ladder = StateLadder::new(count);
            for b in ladder.boxes() {
                assert!(b.width >= MIN_BOX_WIDTH);
                assert!(b.height > 0.0);
                assert!(b.height <= LADDER_HEIGHT + 1e-3);
                assert!(ladder.anchor(b.index)[1] > 0.0);
            }
        }
    }

    #[test]
    fn test_arrive_counts_and_reset() {
        let mut ladder = StateLadder::new(5);
        assert_eq!(ladder.arrive(3), 1);
        assert_eq!(ladder.arrive(3), 2);
        assert_eq!(ladder.arrive(4), 1);
        assert_eq!(ladder.visits(), vec![0, 0, 0, 2, 1]);

        ladder.reset();
        assert_eq!(ladder.visits(), vec![0; 5]);
    }

    #[test]
    fn test_anchor_sits_on_box_top() {
        let ladder = StateLadder::new(5);
        let b = &ladder.boxes()[2];
        let [x, y] = ladder.anchor(2);
        assert_eq!(x, b.x + b.width / 2.0);
        assert!(y < WINDOW_HEIGHT - b.height);
    }
}
