use std::time::{Duration, Instant};

use log::{debug, log_enabled, trace, Level};

/// Per-frame timing and population counters for the simulation pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameProfile {
    pub forces_time: Duration,
    pub broad_phase_time: Duration,
    pub contact_time: Duration,
    pub solver_time: Duration,
    pub integrator_time: Duration,
    pub fracture_time: Duration,
    pub total_frame_time: Duration,

    pub atom_count: usize,
    pub body_count: usize,
    pub contact_count: usize,
    pub contacts_created: usize,
    pub contacts_destroyed: usize,
    pub grid_overflow: usize,
    pub fractures: usize,
    pub impacts: usize,
}

impl FrameProfile {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Writes the frame breakdown at debug level.
    pub fn log_summary(&self) {
        if !log_enabled!(Level::Debug) {
            return;
        }
        let total_us = self.total_frame_time.as_micros().max(1) as f32;
        let share = |d: Duration| (d.as_micros() as f32 / total_us) * 100.0;

        debug!(
            "frame {:.3} ms: {} atoms {} bodies {} contacts (+{} -{}) {} dropped {} splits {} hits",
            self.total_frame_time.as_secs_f32() * 1000.0,
            self.atom_count,
            self.body_count,
            self.contact_count,
            self.contacts_created,
            self.contacts_destroyed,
            self.grid_overflow,
            self.fractures,
            self.impacts,
        );
        debug!(
            "  forces {:.1}% broad {:.1}% contacts {:.1}% solver {:.1}% integ {:.1}% split {:.1}%",
            share(self.forces_time),
            share(self.broad_phase_time),
            share(self.contact_time),
            share(self.solver_time),
            share(self.integrator_time),
            share(self.fracture_time),
        );
    }
}

/// Adds the lifetime of a pipeline stage to a profile slot and traces its
/// start and end.
pub struct StageTimer<'a> {
    label: &'static str,
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> StageTimer<'a> {
    pub fn new(label: &'static str, output: &'a mut Duration) -> Self {
        trace!("start {label}");
        Self {
            label,
            start: Instant::now(),
            output,
        }
    }
}

impl<'a> Drop for StageTimer<'a> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        *self.output += elapsed;
        trace!("end {} ({} µs)", self.label, elapsed.as_micros());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_timer_accumulates_into_slot() {
        let mut profile = FrameProfile::default();
        {
            let _timer = StageTimer::new("test", &mut profile.solver_time);
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(profile.solver_time >= Duration::from_millis(1));
        profile.reset();
        assert_eq!(profile.solver_time, Duration::ZERO);
    }
}
