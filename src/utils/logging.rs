use log::{debug, warn};
use std::time::Duration;

/// Registers a warning when frame budget is exceeded.
pub fn warn_if_frame_budget_exceeded(duration: Duration, budget_ms: f32) {
    let elapsed_ms = duration.as_secs_f32() * 1000.0;
    if budget_ms > 0.0 && elapsed_ms > budget_ms {
        warn!(
            "Frame exceeded budget: {:.2} ms > {:.2} ms",
            elapsed_ms, budget_ms
        );
    }
}

/// Reports broad-phase degradation for the frame that was just rebuilt.
///
/// Overflowing cells lose candidates, so that is a warning; atoms outside the
/// padded grid simply stop colliding and only show up at debug level.
pub fn report_grid_degradation(dropped: usize, out_of_bounds: usize) {
    if dropped > 0 {
        warn!("Grid cell capacity exceeded: {dropped} insertions dropped this frame");
    }
    if out_of_bounds > 0 {
        debug!("{out_of_bounds} atoms outside the collision grid");
    }
}
