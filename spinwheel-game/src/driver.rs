//! Real-time driver running one wheel inside a tokio task.
//!
//! The session never leaves the task. Spin presses and popup closes arrive as
//! [`DriverCommand`]s; scheduled continuations sleep on tokio timers and are
//! resumed in due order.

use log::debug;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use crate::host::{Continuation, Message, MessageKind, WheelHost};
use crate::rng::RandomSource;
use crate::sectors::SectorLabel;
use crate::session::WheelSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCommand {
    Spin,
    Dismiss(MessageKind),
    Shutdown,
}

/// Presentation half of [`WheelHost`]; timers are handled by the driver.
pub trait Presenter {
    fn render_sectors(&mut self, labels: &[SectorLabel]);
    fn set_wheel_rotation(&mut self, angle: f64, duration: Duration);
    fn set_spin_enabled(&mut self, enabled: bool);
    fn show_message(&mut self, message: &Message);
}

/// Scheduled continuation, ordered by deadline then scheduling order.
#[derive(Debug, Clone, Copy)]
struct Timer {
    at: Instant,
    seq: u64,
    continuation: Continuation,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.seq) == (other.at, other.seq)
    }
}

impl Eq for Timer {}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.at, self.seq).cmp(&(other.at, other.seq))
    }
}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct TokioHost<P> {
    presenter: P,
    timers: BinaryHeap<Reverse<Timer>>,
    next_seq: u64,
}

impl<P: Presenter> TokioHost<P> {
    fn next_deadline(&self) -> Option<Instant> {
        self.timers.peek().map(|Reverse(timer)| timer.at)
    }

    fn pop_due(&mut self) -> Option<Continuation> {
        self.timers.pop().map(|Reverse(timer)| timer.continuation)
    }
}

impl<P: Presenter> WheelHost for TokioHost<P> {
    fn render_sectors(&mut self, labels: &[SectorLabel]) {
        self.presenter.render_sectors(labels);
    }

    fn set_wheel_rotation(&mut self, angle: f64, duration: Duration) {
        self.presenter.set_wheel_rotation(angle, duration);
    }

    fn set_spin_enabled(&mut self, enabled: bool) {
        self.presenter.set_spin_enabled(enabled);
    }

    fn show_message(&mut self, message: Message) {
        self.presenter.show_message(&message);
    }

    fn schedule(&mut self, delay: Duration, continuation: Continuation) {
        self.timers.push(Reverse(Timer {
            at: Instant::now() + delay,
            seq: self.next_seq,
            continuation,
        }));
        self.next_seq += 1;
    }
}

/// Drive `session` until `Shutdown` arrives or every command sender is gone.
///
/// Timers still pending at shutdown are dropped. Returns the session and the
/// presenter so callers can inspect the final state.
pub async fn run_wheel<R, P>(
    mut session: WheelSession<R>,
    presenter: P,
    mut commands: mpsc::Receiver<DriverCommand>,
) -> (WheelSession<R>, P)
where
    R: RandomSource,
    P: Presenter,
{
    let mut host = TokioHost {
        presenter,
        timers: BinaryHeap::new(),
        next_seq: 0,
    };
    session.start(&mut host);

    loop {
        let next = host.next_deadline();
        let wake_at = next.unwrap_or_else(Instant::now);
        tokio::select! {
            command = commands.recv() => match command {
                Some(DriverCommand::Spin) => {
                    session.request_spin(&mut host);
                }
                Some(DriverCommand::Dismiss(kind)) => session.dismiss(kind, &mut host),
                Some(DriverCommand::Shutdown) | None => break,
            },
            () = sleep_until(wake_at), if next.is_some() => {
                if let Some(continuation) = host.pop_due() {
                    debug!("timer fired: {continuation:?}");
                    session.resume(continuation, &mut host);
                }
            }
        }
    }

    (session, host.presenter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WheelConfig;
    use crate::rng::ScriptedSource;
    use tokio::time::sleep;

    #[derive(Default)]
    struct Recording {
        rendered: usize,
        enabled: Vec<bool>,
        messages: Vec<Message>,
        rotations: Vec<(f64, Duration)>,
    }

    impl Presenter for Recording {
        fn render_sectors(&mut self, labels: &[SectorLabel]) {
            self.rendered = labels.len();
        }

        fn set_wheel_rotation(&mut self, angle: f64, duration: Duration) {
            self.rotations.push((angle, duration));
        }

        fn set_spin_enabled(&mut self, enabled: bool) {
            self.enabled.push(enabled);
        }

        fn show_message(&mut self, message: &Message) {
            self.messages.push(message.clone());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn prize_round_resolves_after_animation() {
        let session =
            WheelSession::with_source(WheelConfig::default(), ScriptedSource::new(vec![0])).unwrap();
        let (tx, rx) = mpsc::channel(8);
        let script = async move {
            tx.send(DriverCommand::Spin).await.unwrap();
            tx.send(DriverCommand::Spin).await.unwrap();
            sleep(Duration::from_millis(4_900)).await;
            tx.send(DriverCommand::Dismiss(MessageKind::Prize)).await.unwrap();
            sleep(Duration::from_millis(200)).await;
            tx.send(DriverCommand::Dismiss(MessageKind::Prize)).await.unwrap();
            tx.send(DriverCommand::Shutdown).await.unwrap();
        };
        let ((session, presenter), ()) = tokio::join!(run_wheel(session, Recording::default(), rx), script);

        assert_eq!(presenter.rendered, 18);
        assert_eq!(presenter.rotations.len(), 1);
        assert_eq!(presenter.rotations[0].1, Duration::from_millis(5_000));
        assert_eq!(presenter.messages.len(), 1);
        assert_eq!(presenter.messages[0].amount, Some(100));
        assert_eq!(presenter.enabled, vec![true, false, true]);
        assert_eq!(session.state().spins_resolved, 1);
        assert!(session.state().is_settled());
    }

    #[tokio::test(start_paused = true)]
    async fn free_spins_chain_without_commands() {
        // Filler draws: bonus sector first, then plain sectors.
        let source = ScriptedSource::new(vec![9, 0, 1, 2, 4]);
        let session = WheelSession::with_source(WheelConfig::default(), source).unwrap();
        let (tx, rx) = mpsc::channel(8);
        let script = async move {
            tx.send(DriverCommand::Spin).await.unwrap();
            sleep(Duration::from_millis(5_100)).await;
            tx.send(DriverCommand::Dismiss(MessageKind::BonusAnnouncement))
                .await
                .unwrap();
            // 500ms start + 3 x 5000ms spins + 2 x 1000ms gaps
            sleep(Duration::from_millis(17_600)).await;
            tx.send(DriverCommand::Dismiss(MessageKind::FreeSpinTotal))
                .await
                .unwrap();
            tx.send(DriverCommand::Shutdown).await.unwrap();
        };
        let ((session, presenter), ()) = tokio::join!(run_wheel(session, Recording::default(), rx), script);

        let kinds: Vec<MessageKind> = presenter.messages.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MessageKind::BonusAnnouncement, MessageKind::FreeSpinTotal]);
        // Cycle positions 1, 2, 3 pay 30, 15 and the filler at sector 0.
        assert_eq!(presenter.messages[1].amount, Some(30 + 15 + 100));
        assert_eq!(session.state().spins_resolved, 4);
        assert_eq!(presenter.enabled.last(), Some(&true));
        assert!(session.state().is_settled());
    }
}
