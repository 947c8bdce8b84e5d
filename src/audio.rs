//! Impact notifications for an external sound player.

use std::sync::Arc;

use log::trace;
use parking_lot::Mutex;

use crate::{
    dynamics::solver::ImpactEvent,
    error::{PhysicsError, Result},
};

/// Receives one call per contact whose impulse added this frame crossed the
/// loudness threshold. Errors are logged by the world and otherwise ignored.
pub trait ImpactSink: Send {
    fn on_impact(&mut self, impact: &ImpactEvent) -> Result<()>;
}

/// Sink that accepts and ignores every impact.
#[derive(Debug, Default)]
pub struct SilentImpacts;

impl ImpactSink for SilentImpacts {
    fn on_impact(&mut self, _impact: &ImpactEvent) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
struct VoicePool {
    capacity: usize,
    active: usize,
    played: u64,
}

/// Bounded pool of sound voices shared with the playback side.
///
/// The simulation claims a voice per impact; the player calls
/// [`release`](Self::release) when a sound finishes. Impacts arriving while
/// every voice is busy are rejected with [`PhysicsError::ImpactDropped`].
#[derive(Debug, Clone)]
pub struct PolyphonicImpacts {
    voices: Arc<Mutex<VoicePool>>,
}

impl PolyphonicImpacts {
    pub fn new(capacity: usize) -> Self {
        Self {
            voices: Arc::new(Mutex::new(VoicePool {
                capacity,
                active: 0,
                played: 0,
            })),
        }
    }

    /// Frees one voice.
    pub fn release(&self) {
        let mut pool = self.voices.lock();
        pool.active = pool.active.saturating_sub(1);
    }

    pub fn active(&self) -> usize {
        self.voices.lock().active
    }

    /// Impacts that got a voice so far.
    pub fn played(&self) -> u64 {
        self.voices.lock().played
    }
}

impl ImpactSink for PolyphonicImpacts {
    fn on_impact(&mut self, impact: &ImpactEvent) -> Result<()> {
        let mut pool = self.voices.lock();
        if pool.active >= pool.capacity {
            return Err(PhysicsError::ImpactDropped(format!(
                "all {} voices busy (impulse {:.1})",
                pool.capacity, impact.impulse
            )));
        }
        pool.active += 1;
        pool.played += 1;
        trace!("impact voice {}/{} for impulse {:.1}", pool.active, pool.capacity, impact.impulse);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::allocator::AtomId;

    fn impact() -> ImpactEvent {
        ImpactEvent {
            atoms: (AtomId::new(0, 0), AtomId::new(1, 0)),
            impulse: 900.0,
        }
    }

    #[test]
    fn voices_are_bounded_and_shared() {
        let mut sink = PolyphonicImpacts::new(2);
        let player = sink.clone();

        assert!(sink.on_impact(&impact()).is_ok());
        assert!(sink.on_impact(&impact()).is_ok());
        assert!(matches!(
            sink.on_impact(&impact()),
            Err(PhysicsError::ImpactDropped(_))
        ));

        player.release();
        assert_eq!(sink.active(), 1);
        assert!(sink.on_impact(&impact()).is_ok());
        assert_eq!(player.played(), 3);
    }
}
