use rand::Rng;

use crate::config::SIBLING_OFFSET;
use crate::simulation::ladder::StateLadder;
use crate::simulation::token::{Rgb, Token};

/// Number of children for one branch event.
///
/// `floor(factor)` children, plus one more with probability equal to the
/// fractional part, so the expected count is exactly `factor`.
pub fn descendant_count<R: Rng + ?Sized>(factor: f32, rng: &mut R) -> usize {
    let whole = factor.floor();
    let fraction = factor - whole;
    let mut count = whole as usize;
    if fraction > 0.0 && rng.gen::<f32>() < fraction {
        count += 1;
    }
    count
}

/// Random display color, each channel drawn from the brighter part of the range
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    Rgb([
        rng.gen_range(100..=255),
        rng.gen_range(100..=255),
        rng.gen_range(100..=255),
    ])
}

/// Split a ball that has finished waiting in a non-terminal box.
///
/// Every child is already launched toward its own destination, drawn
/// uniformly from the boxes strictly ahead of the parent up to and
/// including the terminal box. At most `limit` children are built; the
/// second value is how many were drawn but not built.
pub fn branch<R: Rng + ?Sized>(
    parent: &Token,
    factor: f32,
    ladder: &StateLadder,
    limit: usize,
    rng: &mut R,
) -> (Vec<Token>, usize) {
    let terminal = ladder.terminal();
    debug_assert!(parent.state < terminal, "terminal balls never branch");

    let count = descendant_count(factor, rng);
    let built = count.min(limit);
    let mut children = Vec::with_capacity(built);

    for rank in 0..built {
        let mut child = parent.clone();
        child.trail.clear();
        child.color = if factor > 1.0 {
            random_color(rng)
        } else {
            Rgb::GREEN
        };
        child.position[0] += (rank as f32 - count as f32 / 2.0) * SIBLING_OFFSET;

        let destination = rng.gen_range(parent.state + 1..=terminal);
        child.launch(destination, ladder.anchor(destination));
        children.push(child);
    }

    (children, count - built)
}
