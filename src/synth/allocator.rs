use log::{debug, trace};

use crate::synth::{
    pool::{Voice, VoiceId, VoicePool},
    source::{NoteSource, SourceId, SourceRegistry},
};

/// Where a source stands relative to the voice pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Not held
    Idle,
    /// Held, but its voice was stolen
    Waiting,
    /// Held and bound to a voice
    Sounding(VoiceId),
}

/// Result of a press edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// A free voice was bound.
    Assigned(VoiceId),
    /// The oldest sounding voice was taken from `from`.
    Stole { voice: VoiceId, from: SourceId },
    /// The source was already sounding; only its age was refreshed.
    Refreshed(VoiceId),
    /// Pool capacity is zero. Nothing is recorded, not even the hold.
    Dropped,
    /// Id outside its domain's range.
    Ignored,
}

/// Result of a release edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReleaseOutcome {
    /// Voice the released source gave up, if it had one.
    pub freed: Option<VoiceId>,
    /// Waiting sources that got a voice back.
    pub restored: usize,
}

/// Voice allocation policy over a [`SourceRegistry`] and a [`VoicePool`].
///
/// Owned exclusively by the control task. Every handler takes `&mut self` and
/// runs to completion, so the bidirectional binding invariant holds between
/// any two calls:
///
/// - a voice is active iff exactly one source points back at it
/// - that source is held
/// - no free voice coexists with a waiting source
///
/// Policy: newest press wins. When the pool is full a press steals the voice
/// of the longest-held note, whatever its domain. When a voice frees up it goes
/// back to the longest-waiting stolen note.
pub struct Allocator {
    registry: SourceRegistry,
    pool: VoicePool,
}

impl Allocator {
    pub fn new(num_voices: usize, num_buttons: usize) -> Self {
        Self {
            registry: SourceRegistry::new(num_buttons),
            pool: VoicePool::new(num_voices),
        }
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn num_buttons(&self) -> usize {
        self.registry.num_buttons()
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> + '_ {
        self.pool.iter()
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn source(&self, id: SourceId) -> Option<&NoteSource> {
        self.registry.get(id)
    }

    pub fn source_state(&self, id: SourceId) -> SourceState {
        match self.registry.get(id) {
            Some(s) if s.is_held() => match s.bound_voice() {
                Some(voice) => SourceState::Sounding(voice),
                None => SourceState::Waiting,
            },
            _ => SourceState::Idle,
        }
    }

    /// Handle a rising edge on `id`.
    ///
    /// A repeated press without an intervening release re-stamps the source,
    /// which makes it the youngest note for future stealing decisions. A
    /// source that is already sounding keeps its voice.
    pub fn on_press(&mut self, id: SourceId) -> PressOutcome {
        if !self.registry.contains(id) {
            return PressOutcome::Ignored;
        }
        if self.pool.capacity() == 0 {
            trace!("press {id:?} dropped, no voices");
            return PressOutcome::Dropped;
        }
        if !self.registry.mark_held(id) {
            return PressOutcome::Ignored;
        }

        let outcome = if let Some(voice) = self.registry.bound_voice(id) {
            PressOutcome::Refreshed(voice)
        } else if let Some(voice) = self.pool.find_free() {
            self.pool.bind(&mut self.registry, voice, id);
            PressOutcome::Assigned(voice)
        } else if let Some(voice) = self.pool.find_oldest_active(&self.registry) {
            let from = self.pool.unbind(&mut self.registry, voice);
            self.pool.bind(&mut self.registry, voice, id);
            match from {
                Some(from) => {
                    debug!("voice {voice}: {id:?} steals from {from:?}");
                    PressOutcome::Stole { voice, from }
                }
                None => PressOutcome::Assigned(voice),
            }
        } else {
            PressOutcome::Dropped
        };

        trace!("press {id:?} -> {outcome:?}");
        debug_assert!(self.is_consistent());
        outcome
    }

    /// Handle a falling edge on `id`.
    ///
    /// Releasing a source that is not held is a no-op.
    pub fn on_release(&mut self, id: SourceId) -> ReleaseOutcome {
        if !self.registry.mark_released(id) {
            return ReleaseOutcome::default();
        }

        let freed = self
            .registry
            .bound_voice(id)
            .and_then(|voice| self.pool.unbind(&mut self.registry, voice).map(|_| voice));
        let restored = self.restitute();

        let outcome = ReleaseOutcome { freed, restored };
        trace!("release {id:?} -> {outcome:?}");
        debug_assert!(self.is_consistent());
        outcome
    }

    /// Hand free voices back to waiting sources, oldest-waiting first.
    ///
    /// Fixed-point loop: each pass recomputes the free voice and the waiting
    /// set from scratch and applies exactly one binding. Each pass consumes a
    /// free voice, so it runs at most `capacity` times.
    fn restitute(&mut self) -> usize {
        let mut restored = 0;
        for _ in 0..self.pool.capacity() {
            let Some(voice) = self.pool.find_free() else {
                break;
            };
            let Some(source) = self.registry.oldest_waiting() else {
                break;
            };
            self.pool.bind(&mut self.registry, voice, source);
            debug!("voice {voice}: restored to {source:?}");
            restored += 1;
        }
        restored
    }

    /// Release every held source, leaving the pool empty.
    pub fn release_all(&mut self) {
        self.release_where(|_| true);
    }

    /// Release every held note event. Buttons are physical and only their
    /// own falling edge releases them, so a held button keeps (or regains)
    /// its voice.
    pub fn release_notes(&mut self) {
        self.release_where(|id| matches!(id, SourceId::Note(_)));
    }

    fn release_where(&mut self, mut select: impl FnMut(SourceId) -> bool) {
        let held: Vec<SourceId> = self
            .registry
            .iter()
            .filter(|(id, s)| s.is_held() && select(*id))
            .map(|(id, _)| id)
            .collect();
        for id in held {
            self.on_release(id);
        }
    }

    /// Check the binding invariants.
    pub fn is_consistent(&self) -> bool {
        for voice in self.pool.iter() {
            if let Some(source) = voice.source() {
                let Some(state) = self.registry.get(source) else {
                    return false;
                };
                if state.bound_voice() != Some(voice.index) || !state.is_held() {
                    return false;
                }
            }
        }

        for (id, source) in self.registry.iter() {
            if let Some(index) = source.bound_voice() {
                let points_back = self
                    .pool
                    .get(index)
                    .is_some_and(|voice| voice.source() == Some(id));
                if !points_back {
                    return false;
                }
            }
        }

        let starving = self.pool.find_free().is_some() && self.registry.oldest_waiting().is_some();
        !starving && self.pool.active_count() <= self.pool.capacity()
    }
}
