//! Deterministic virtual-clock host.
//!
//! `SimHost` records every collaborator call, orders scheduled continuations
//! by virtual due time (FIFO among equal times) and can close popups on its
//! own, so whole spin flows run to completion without real timers.

use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

use crate::host::{Continuation, Message, MessageKind, WheelHost};
use crate::machine::SpinRequest;
use crate::rng::RandomSource;
use crate::sectors::SectorLabel;
use crate::session::WheelSession;

/// Upper bound on steps per drain; a spin flow needs only a few dozen.
pub const MAX_DRAIN_STEPS: usize = 10_000;

/// Collaborator call recorded with its virtual timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    SectorsRendered {
        count: usize,
    },
    Rotated {
        at_ms: u128,
        angle: f64,
        duration_ms: u128,
    },
    SpinEnabled {
        at_ms: u128,
        enabled: bool,
    },
    MessageShown {
        at_ms: u128,
        message: Message,
    },
    Scheduled {
        at_ms: u128,
        due_ms: u128,
        continuation: Continuation,
    },
    Fired {
        at_ms: u128,
        continuation: Continuation,
    },
    Dismissed {
        at_ms: u128,
        kind: MessageKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStep {
    Fired(Continuation),
    Dismissed(MessageKind),
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    due: Duration,
    seq: u64,
    continuation: Continuation,
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone)]
pub struct SimHost {
    now: Duration,
    queue: BinaryHeap<Reverse<Pending>>,
    next_seq: u64,
    open_message: Option<Message>,
    spin_enabled: bool,
    labels: Vec<SectorLabel>,
    events: Vec<HostEvent>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            queue: BinaryHeap::new(),
            next_seq: 0,
            open_message: None,
            spin_enabled: false,
            labels: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub const fn spin_enabled(&self) -> bool {
        self.spin_enabled
    }

    #[must_use]
    pub const fn open_message(&self) -> Option<&Message> {
        self.open_message.as_ref()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn labels(&self) -> &[SectorLabel] {
        &self.labels
    }

    #[must_use]
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Take the recorded events, leaving the log empty.
    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Messages shown so far, in order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.events.iter().filter_map(|event| match event {
            HostEvent::MessageShown { message, .. } => Some(message),
            _ => None,
        })
    }

    /// Rotation targets emitted so far, in order.
    pub fn rotations(&self) -> impl Iterator<Item = f64> + '_ {
        self.events.iter().filter_map(|event| match event {
            HostEvent::Rotated { angle, .. } => Some(*angle),
            _ => None,
        })
    }

    /// Advance the clock to the earliest timer and hand it back to `session`.
    pub fn fire_next<R: RandomSource>(
        &mut self,
        session: &mut WheelSession<R>,
    ) -> Option<Continuation> {
        let Reverse(pending) = self.queue.pop()?;
        self.now = self.now.max(pending.due);
        self.events.push(HostEvent::Fired {
            at_ms: self.now.as_millis(),
            continuation: pending.continuation,
        });
        session.resume(pending.continuation, self);
        Some(pending.continuation)
    }

    /// Close the open popup, if any.
    pub fn dismiss<R: RandomSource>(&mut self, session: &mut WheelSession<R>) -> Option<MessageKind> {
        let message = self.open_message.take()?;
        self.events.push(HostEvent::Dismissed {
            at_ms: self.now.as_millis(),
            kind: message.kind,
        });
        session.dismiss(message.kind, self);
        Some(message.kind)
    }

    /// Fire the next timer, or close the open popup when `auto_dismiss` is set.
    pub fn step<R: RandomSource>(
        &mut self,
        session: &mut WheelSession<R>,
        auto_dismiss: bool,
    ) -> SimStep {
        if let Some(continuation) = self.fire_next(session) {
            return SimStep::Fired(continuation);
        }
        if auto_dismiss && let Some(kind) = self.dismiss(session) {
            return SimStep::Dismissed(kind);
        }
        SimStep::Idle
    }

    /// Fire timers until none remain; stops at an open popup.
    pub fn run_timers<R: RandomSource>(&mut self, session: &mut WheelSession<R>) -> usize {
        self.drain(session, false)
    }

    /// Fire timers and close popups until nothing is left to do.
    pub fn run_until_idle<R: RandomSource>(&mut self, session: &mut WheelSession<R>) -> usize {
        self.drain(session, true)
    }

    /// Press the spin control and play the whole flow out, popups included.
    pub fn play_round<R: RandomSource>(&mut self, session: &mut WheelSession<R>) -> SpinRequest {
        let request = session.request_spin(self);
        self.run_until_idle(session);
        request
    }

    fn drain<R: RandomSource>(&mut self, session: &mut WheelSession<R>, auto_dismiss: bool) -> usize {
        let mut steps = 0;
        while steps < MAX_DRAIN_STEPS {
            if self.step(session, auto_dismiss) == SimStep::Idle {
                break;
            }
            steps += 1;
        }
        steps
    }
}

impl WheelHost for SimHost {
    fn render_sectors(&mut self, labels: &[SectorLabel]) {
        self.labels = labels.to_vec();
        self.events.push(HostEvent::SectorsRendered {
            count: labels.len(),
        });
    }

    fn set_wheel_rotation(&mut self, angle: f64, duration: Duration) {
        self.events.push(HostEvent::Rotated {
            at_ms: self.now.as_millis(),
            angle,
            duration_ms: duration.as_millis(),
        });
    }

    fn set_spin_enabled(&mut self, enabled: bool) {
        self.spin_enabled = enabled;
        self.events.push(HostEvent::SpinEnabled {
            at_ms: self.now.as_millis(),
            enabled,
        });
    }

    fn show_message(&mut self, message: Message) {
        self.events.push(HostEvent::MessageShown {
            at_ms: self.now.as_millis(),
            message: message.clone(),
        });
        self.open_message = Some(message);
    }

    fn schedule(&mut self, delay: Duration, continuation: Continuation) {
        let due = self.now + delay;
        self.events.push(HostEvent::Scheduled {
            at_ms: self.now.as_millis(),
            due_ms: due.as_millis(),
            continuation,
        });
        self.queue.push(Reverse(Pending {
            due,
            seq: self.next_seq,
            continuation,
        }));
        self.next_seq += 1;
    }
}
