use crate::synth::source::{SourceId, SourceRegistry};

pub type VoiceId = usize;

/// One slot of synthesis capacity.
///
/// A voice is active exactly when it is bound to a source. The binding is
/// mirrored on the source side; only [`VoicePool::bind`] and
/// [`VoicePool::unbind`] touch either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    pub index: VoiceId,
    source: Option<SourceId>,
}

impl Voice {
    #[inline]
    pub fn new(index: VoiceId) -> Self {
        Self {
            index,
            source: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.source.is_some()
    }

    pub fn source(&self) -> Option<SourceId> {
        self.source
    }
}

/// Fixed-size array of voice slots. Never grows or shrinks after construction.
pub struct VoicePool {
    voices: Vec<Voice>,
}

impl VoicePool {
    pub fn new(capacity: usize) -> Self {
        let voices = (0..capacity).map(Voice::new).collect();
        Self { voices }
    }

    pub fn capacity(&self) -> usize {
        self.voices.len()
    }

    pub fn get(&self, voice: VoiceId) -> Option<&Voice> {
        self.voices.get(voice)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voice> + '_ {
        self.voices.iter()
    }

    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Lowest-index inactive voice.
    pub fn find_free(&self) -> Option<VoiceId> {
        self.voices.iter().position(|v| !v.is_active())
    }

    /// Active voice whose source was pressed longest ago.
    ///
    /// Ties on timestamp go to the lowest voice index.
    pub fn find_oldest_active(&self, registry: &SourceRegistry) -> Option<VoiceId> {
        self.voices
            .iter()
            .filter_map(|v| {
                let source = v.source?;
                let stamp = registry.timestamp(source)?;
                Some((stamp, v.index))
            })
            .min()
            .map(|(_, index)| index)
    }

    /// Link `voice` and `source` in both directions.
    ///
    /// Any previous binding on either side is cleared first so the link stays
    /// one-to-one. Returns `false` (and changes nothing) when the voice index
    /// or the source id is out of range.
    pub fn bind(&mut self, registry: &mut SourceRegistry, voice: VoiceId, source: SourceId) -> bool {
        if voice >= self.voices.len() || !registry.contains(source) {
            return false;
        }

        self.unbind(registry, voice);
        if let Some(previous) = registry.bound_voice(source) {
            self.unbind(registry, previous);
        }

        self.voices[voice].source = Some(source);
        registry.set_bound_voice(source, Some(voice));
        true
    }

    /// Clear both sides of the link. Returns the source that owned the voice.
    pub fn unbind(&mut self, registry: &mut SourceRegistry, voice: VoiceId) -> Option<SourceId> {
        let slot = self.voices.get_mut(voice)?;
        let source = slot.source.take()?;
        registry.set_bound_voice(source, None);
        Some(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_free_prefers_lowest_index() {
        let mut reg = SourceRegistry::new(4);
        let mut pool = VoicePool::new(3);
        assert_eq!(pool.find_free(), Some(0));

        pool.bind(&mut reg, 0, SourceId::Button(0));
        pool.bind(&mut reg, 2, SourceId::Button(1));
        assert_eq!(pool.find_free(), Some(1));

        pool.bind(&mut reg, 1, SourceId::Button(2));
        assert_eq!(pool.find_free(), None);
    }

    #[test]
    fn bind_links_both_sides() {
        let mut reg = SourceRegistry::new(1);
        let mut pool = VoicePool::new(2);
        assert!(pool.bind(&mut reg, 1, SourceId::Note(64)));

        assert_eq!(pool.get(1).unwrap().source(), Some(SourceId::Note(64)));
        assert_eq!(reg.bound_voice(SourceId::Note(64)), Some(1));
    }

    #[test]
    fn rebinding_a_source_moves_it() {
        let mut reg = SourceRegistry::new(1);
        let mut pool = VoicePool::new(2);
        pool.bind(&mut reg, 0, SourceId::Button(0));
        pool.bind(&mut reg, 1, SourceId::Button(0));

        assert!(!pool.get(0).unwrap().is_active());
        assert_eq!(reg.bound_voice(SourceId::Button(0)), Some(1));
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn unbind_is_idempotent() {
        let mut reg = SourceRegistry::new(1);
        let mut pool = VoicePool::new(1);
        pool.bind(&mut reg, 0, SourceId::Button(0));

        assert_eq!(pool.unbind(&mut reg, 0), Some(SourceId::Button(0)));
        assert_eq!(pool.unbind(&mut reg, 0), None);
        assert_eq!(reg.bound_voice(SourceId::Button(0)), None);
    }

    #[test]
    fn bind_rejects_out_of_range() {
        let mut reg = SourceRegistry::new(1);
        let mut pool = VoicePool::new(1);
        assert!(!pool.bind(&mut reg, 1, SourceId::Button(0)));
        assert!(!pool.bind(&mut reg, 0, SourceId::Button(1)));
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn oldest_active_uses_source_timestamps() {
        let mut reg = SourceRegistry::new(2);
        let mut pool = VoicePool::new(3);

        reg.mark_held(SourceId::Note(60));
        reg.mark_held(SourceId::Button(1));
        reg.mark_held(SourceId::Note(61));
        pool.bind(&mut reg, 0, SourceId::Note(61));
        pool.bind(&mut reg, 1, SourceId::Button(1));
        pool.bind(&mut reg, 2, SourceId::Note(60));

        assert_eq!(pool.find_oldest_active(&reg), Some(2));
    }

    #[test]
    fn oldest_active_tie_breaks_on_index() {
        // Never-pressed sources share timestamp 0
        let mut reg = SourceRegistry::new(2);
        let mut pool = VoicePool::new(2);
        pool.bind(&mut reg, 1, SourceId::Button(0));
        pool.bind(&mut reg, 0, SourceId::Button(1));

        assert_eq!(pool.find_oldest_active(&reg), Some(0));
    }

    #[test]
    fn empty_pool_has_nothing_to_offer() {
        let reg = SourceRegistry::new(0);
        let pool = VoicePool::new(0);
        assert_eq!(pool.find_free(), None);
        assert_eq!(pool.find_oldest_active(&reg), None);
    }
}
