use crate::config::{BALL_RADIUS, SCALE, WINDOW_HEIGHT};
use crate::simulation::Simulation;

pub const SHAPE_RECT: u32 = 0;
pub const SHAPE_DISC: u32 = 1;

/// Histogram panel placement, in layout pixels
const HIST_X: f32 = 20.0;
const HIST_Y: f32 = 40.0;
const HIST_WIDTH: f32 = 900.0;
const HIST_HEIGHT: f32 = 180.0;

const BOX_OUTLINE: f32 = 2.0;
const TRAIL_MAX_ALPHA: f32 = 120.0 / 255.0;

const BOX_FILL: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const BOX_EDGE: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const BAR_FILL: [f32; 4] = [100.0 / 255.0, 150.0 / 255.0, 1.0, 180.0 / 255.0];
const BAR_EDGE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// GPU-compatible drawable: an axis-aligned rectangle or a disc.
///
/// Layout: 48 bytes, matching `Shape` in shapes.wgsl.
/// - center: [f32; 2] - layout pixels, y down
/// - size: [f32; 2] - full width/height in pixels
/// - color: [f32; 4] - straight RGBA
/// - kind: u32 - SHAPE_RECT or SHAPE_DISC
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShapeInstance {
    pub center: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
    pub kind: u32,
    pub _padding: [u32; 3],
}

impl ShapeInstance {
    pub fn rect(x: f32, y: f32, width: f32, height: f32, color: [f32; 4]) -> Self {
        Self {
            center: [x + width / 2.0, y + height / 2.0],
            size: [width, height],
            color,
            kind: SHAPE_RECT,
            _padding: [0; 3],
        }
    }

    pub fn disc(center: [f32; 2], radius: f32, color: [f32; 4]) -> Self {
        Self {
            center,
            size: [radius * 2.0, radius * 2.0],
            color,
            kind: SHAPE_DISC,
            _padding: [0; 3],
        }
    }
}

/// Flatten the current simulation state into draw order:
/// histogram, boxes, trails, balls.
pub fn build(sim: &Simulation, out: &mut Vec<ShapeInstance>) {
    out.clear();
    push_histogram(sim, out);
    push_boxes(sim, out);
    push_balls(sim, out);
}

fn push_histogram(sim: &Simulation, out: &mut Vec<ShapeInstance>) {
    let histogram = sim.histogram();
    let count = histogram.bars.len();
    if count == 0 {
        return;
    }
    let slot = HIST_WIDTH / count as f32;
    let baseline = HIST_Y + HIST_HEIGHT;

    // Slot i reads as "i + 1 boxes before the end", so it shows box N - 1 - i
    for (i, bar) in histogram.bars.iter().rev().enumerate() {
        let height = bar.height * HIST_HEIGHT;
        if height <= 0.0 {
            continue;
        }
        let x = HIST_X + i as f32 * slot;
        let width = slot - 2.0;
        out.push(ShapeInstance::rect(x - 1.0, baseline - height - 1.0, width + 2.0, height + 2.0, BAR_EDGE));
        out.push(ShapeInstance::rect(x, baseline - height, width, height, BAR_FILL));
    }
}

fn push_boxes(sim: &Simulation, out: &mut Vec<ShapeInstance>) {
    for b in sim.ladder().boxes() {
        let top = WINDOW_HEIGHT - b.height;
        out.push(ShapeInstance::rect(
            b.x - BOX_OUTLINE,
            top - BOX_OUTLINE,
            b.width + 2.0 * BOX_OUTLINE,
            b.height + 2.0 * BOX_OUTLINE,
            BOX_EDGE,
        ));
        out.push(ShapeInstance::rect(b.x, top, b.width, b.height, BOX_FILL));
    }
}

fn push_balls(sim: &Simulation, out: &mut Vec<ShapeInstance>) {
    let radius = BALL_RADIUS * SCALE;

    for token in sim.tokens() {
        let len = token.trail.len();
        for (i, point) in token.trail.iter().enumerate() {
            let alpha = i as f32 / len as f32 * TRAIL_MAX_ALPHA;
            out.push(ShapeInstance::disc(*point, radius / 2.5, token.color.to_rgba(alpha)));
        }
    }

    for token in sim.tokens() {
        out.push(ShapeInstance::disc(token.position, radius, token.color.to_rgba(1.0)));
    }
}
