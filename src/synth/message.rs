use std::collections::VecDeque;

use rtrb::Consumer;

/// Note events as delivered by the note-event source, already de-framed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoteMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    AllNotesOff,
}

impl NoteMessage {
    /// Fold `NoteOn` with velocity 0 into `NoteOff`.
    pub fn normalized(self) -> Self {
        match self {
            NoteMessage::NoteOn { note, velocity: 0 } => NoteMessage::NoteOff { note },
            other => other,
        }
    }
}

/// A finite-per-poll source of note events.
///
/// `pop` returns `None` once everything that arrived before the call has been
/// handed out; the control loop drains it once per iteration.
pub trait MessageReceiver {
    fn pop(&mut self) -> Option<NoteMessage>;
}

impl MessageReceiver for Consumer<NoteMessage> {
    fn pop(&mut self) -> Option<NoteMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for VecDeque<NoteMessage> {
    fn pop(&mut self) -> Option<NoteMessage> {
        self.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtrb::RingBuffer;

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        let msg = NoteMessage::NoteOn {
            note: 64,
            velocity: 0,
        };
        assert_eq!(msg.normalized(), NoteMessage::NoteOff { note: 64 });

        let msg = NoteMessage::NoteOn {
            note: 64,
            velocity: 1,
        };
        assert_eq!(msg.normalized(), msg);
    }

    #[test]
    fn ring_buffer_preserves_arrival_order() {
        let (mut tx, mut rx) = RingBuffer::<NoteMessage>::new(4);
        tx.push(NoteMessage::NoteOn {
            note: 60,
            velocity: 100,
        })
        .unwrap();
        tx.push(NoteMessage::NoteOff { note: 60 }).unwrap();

        assert!(matches!(
            MessageReceiver::pop(&mut rx),
            Some(NoteMessage::NoteOn { note: 60, .. })
        ));
        assert_eq!(
            MessageReceiver::pop(&mut rx),
            Some(NoteMessage::NoteOff { note: 60 })
        );
        assert_eq!(MessageReceiver::pop(&mut rx), None);
    }
}
