//! Collaborator seam between the engine and whatever draws the wheel.
//!
//! The engine never sleeps and never owns a UI. It describes what should be
//! shown and what should happen later; the host renders, runs the timers and
//! hands [`Continuation`]s and dismissals back.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::sectors::{SectorIndex, SectorLabel};

/// Deferred work the host must hand back once its delay elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Continuation {
    /// The spin animation toward `sector` has finished.
    SettleSpin { sector: SectorIndex },
    /// Start free spin `number` (1-based) of the running sub-session.
    FreeSpin { number: usize },
}

/// Which popup is on screen; doubles as the dismissal token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Prize,
    BonusAnnouncement,
    FreeSpinTotal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub title: String,
    pub body: String,
    /// Amount awarded, when the message announces one.
    pub amount: Option<u32>,
}

/// Rendering, notification, spin control and timer surface.
pub trait WheelHost {
    /// Lay out sector labels. Called once when the session starts.
    fn render_sectors(&mut self, labels: &[SectorLabel]);

    /// Animate the wheel to an absolute angle over `duration`.
    fn set_wheel_rotation(&mut self, angle: f64, duration: Duration);

    fn set_spin_enabled(&mut self, enabled: bool);

    /// Show a popup. The host reports the close via
    /// [`crate::WheelSession::dismiss`] with `message.kind`.
    fn show_message(&mut self, message: Message);

    /// Fire-once timer. The continuation must be handed back exactly once.
    fn schedule(&mut self, delay: Duration, continuation: Continuation);
}
