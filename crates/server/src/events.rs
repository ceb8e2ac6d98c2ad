use crate::types::{EventBatch, EventCursor, StampedEvent};
use rally_core::SessionEvent;

/// Fixed-capacity ring of published session events, read by cursor.
pub struct EventBuffer {
    slots: Vec<Option<StampedEvent>>,
    next_sequence: u64,
}

impl EventBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity.max(1)).map(|_| None).collect(),
            next_sequence: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn push(&mut self, match_number: u64, event: SessionEvent) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let index = self.slot(sequence);
        self.slots[index] = Some(StampedEvent {
            sequence,
            match_number,
            event,
        });
        sequence
    }

    /// Sequence of the oldest event still held.
    pub fn oldest_sequence(&self) -> u64 {
        self.next_sequence.saturating_sub(self.capacity() as u64)
    }

    pub fn current_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Everything published at or after `cursor`.
    ///
    /// A cursor older than the buffer resumes at the oldest held event and
    /// reports the gap in `skipped`. A cursor past the end returns nothing.
    pub fn since(&self, cursor: EventCursor) -> EventBatch {
        let oldest = self.oldest_sequence();
        let start = cursor.0.max(oldest);
        let events = (start..self.next_sequence)
            .filter_map(|seq| {
                self.slots[self.slot(seq)]
                    .as_ref()
                    .filter(|stamped| stamped.sequence == seq)
                    .cloned()
            })
            .collect();

        EventBatch {
            events,
            next: EventCursor(self.next_sequence.max(cursor.0)),
            skipped: oldest.saturating_sub(cursor.0),
        }
    }

    fn slot(&self, sequence: u64) -> usize {
        (sequence % self.capacity() as u64) as usize
    }
}
