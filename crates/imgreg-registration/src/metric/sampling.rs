//! Spatial sample drawing for density-based metrics.

use imgreg_core::spatial::Point;
use rand::rngs::StdRng;
use rand::Rng;

/// Draw `count` continuous indices uniformly over the support of an
/// image with the given `[rows, cols]` shape.
///
/// The generator is owned by the caller and must be seeded explicitly,
/// so identical seeds produce bit-identical sample sets across runs.
/// Drawing runs single-threaded regardless of how the metric sums are
/// later reduced.
pub fn draw_sample_indices(shape: [usize; 2], count: usize, rng: &mut StdRng) -> Vec<Point> {
    let [rows, cols] = shape;
    let max_x = (cols.saturating_sub(1)) as f64;
    let max_y = (rows.saturating_sub(1)) as f64;

    (0..count)
        .map(|_| {
            let x = rng.gen_range(0.0..=max_x);
            let y = rng.gen_range(0.0..=max_y);
            Point::new(x, y)
        })
        .collect()
}
