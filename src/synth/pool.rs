use crate::synth::voice::Voice;

/// Outcome of offering a voice to a full or non-full pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A free slot was available.
    Inserted,
    /// The pool was full; the oldest resident voice was dropped to make room.
    Evicted,
}

/// Fixed-capacity voice arena.
///
/// Slots and the free list are allocated once at construction; admitting and
/// reclaiming a voice is O(1) and never allocates. Mixing walks slots in
/// ascending index order.
pub struct VoicePool {
    slots: Vec<Option<Voice>>,
    free: Vec<usize>,
    next_sequence: u64,
}

impl VoicePool {
    /// Capacity is at least one voice.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            // Reversed so the lowest slot index is handed out first
            free: (0..capacity).rev().collect(),
            next_sequence: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sequence number for the next voice built for this pool.
    pub fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        sequence
    }

    /// Admit a voice. The newcomer is always kept; when the pool is full the
    /// oldest resident by `(start_frame, sequence)` gives up its slot.
    pub fn insert(&mut self, voice: Voice) -> Admission {
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(voice);
            return Admission::Inserted;
        }

        // A full pool has no empty slots, so index 0 is only a fallback.
        let oldest = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(idx, v)| v.as_ref().map(|v| (idx, v.age_key())))
            .min_by_key(|(_, key)| *key)
            .map_or(0, |(idx, _)| idx);

        self.slots[oldest] = Some(voice);
        Admission::Evicted
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voice> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Reclaim the slots of every finished voice. Returns how many were freed.
    pub fn sweep(&mut self) -> usize {
        let mut freed = 0;
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(Voice::is_finished) {
                *slot = None;
                self.free.push(idx);
                freed += 1;
            }
        }
        freed
    }

    pub fn clear(&mut self) {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.free.push(idx);
            }
        }
    }
}

impl std::fmt::Debug for VoicePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoicePool")
            .field("active_voices", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
