use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Pending { deadline: Instant },
}

/// Coalesces bursts of state-affecting events into a single "state
/// changed" signal.
///
/// Explicit idle / pending-with-deadline state machine, deliberately free
/// of timers: the owner turns [`Debouncer::deadline`] into a sleep and
/// calls [`Debouncer::fire`] when it elapses. The deadline is fixed at the
/// first event of a burst, so publication latency is bounded by the
/// window regardless of event rate.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    state: State,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: State::Idle,
        }
    }

    /// Note a state-affecting event. Idle transitions to pending; an
    /// already-pending burst keeps its original deadline.
    pub fn note_event(&mut self, now: Instant) {
        if matches!(self.state, State::Idle) {
            self.state = State::Pending {
                deadline: now + self.window,
            };
        }
    }

    /// Deadline of the pending signal, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            State::Idle => None,
            State::Pending { deadline } => Some(deadline),
        }
    }

    /// Consume the pending signal once its deadline has passed. Returns
    /// whether the owner should publish now.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.state {
            State::Pending { deadline } if now >= deadline => {
                self.state = State::Idle;
                true
            }
            _ => false,
        }
    }
}
