//! Prize resolution: normal prizes, the bonus announcement, and the
//! free-spin sub-session that chains its own spins.

use log::{info, warn};
use std::time::Duration;

use crate::config::{TimingConfig, WheelConfig};
use crate::constants::{
    LOG_FREE_SPINS_COLLECTED, LOG_FREE_SPINS_TOTAL, LOG_FREE_SPINS_TRIGGERED, LOG_PRIZE_AWARDED,
    LOG_STALE_DISMISSAL,
};
use crate::host::{Message, MessageKind};
use crate::sectors::Prize;
use crate::state::SpinSession;

/// What the session must do after a prize is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveStep {
    Show(Message),
    /// Chain free spin `number` after `delay`.
    ScheduleFreeSpin { delay: Duration, number: usize },
}

/// What the session must do after a popup closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissStep {
    /// Open the sub-session with its first spin after `delay`.
    StartFreeSpins { delay: Duration },
    EnableSpin,
    /// The dismissal did not match the open popup.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct PrizeFlow {
    free_spin_count: usize,
    timing: TimingConfig,
    currency: String,
}

impl PrizeFlow {
    #[must_use]
    pub fn new(cfg: &WheelConfig) -> Self {
        Self {
            free_spin_count: cfg.free_spin_count,
            timing: cfg.timing,
            currency: cfg.currency.clone(),
        }
    }

    #[must_use]
    pub const fn free_spin_count(&self) -> usize {
        self.free_spin_count
    }

    /// Interpret a settled prize.
    pub fn resolve(&self, state: &mut SpinSession, prize: Prize) -> ResolveStep {
        if prize.is_bonus() && !state.free_spin_active {
            info!("{LOG_FREE_SPINS_TRIGGERED}: {} free spins", self.free_spin_count);
            return Self::show(state, self.bonus_message());
        }

        if state.free_spin_active {
            // A bonus marker landing here is collected like any other prize.
            state.free_spin_winnings.push(prize);
            let collected = state.free_spin_winnings.len();
            info!(
                "{LOG_FREE_SPINS_COLLECTED}: {prize} ({collected}/{})",
                self.free_spin_count
            );
            if collected < self.free_spin_count {
                return ResolveStep::ScheduleFreeSpin {
                    delay: self.timing.free_spin_interval(),
                    number: collected + 1,
                };
            }
            let total = state.free_spin_total();
            state.free_spin_active = false;
            info!("{LOG_FREE_SPINS_TOTAL}: {total}");
            return Self::show(state, self.total_message(total));
        }

        info!("{LOG_PRIZE_AWARDED}: {prize}");
        Self::show(state, self.prize_message(prize.amount()))
    }

    /// Apply the close of the popup identified by `kind`.
    pub fn dismiss(&self, state: &mut SpinSession, kind: MessageKind) -> DismissStep {
        if state.pending_message != Some(kind) {
            warn!(
                "{LOG_STALE_DISMISSAL}: {kind:?} closed but {:?} is open",
                state.pending_message
            );
            return DismissStep::Ignored;
        }
        state.pending_message = None;
        match kind {
            MessageKind::BonusAnnouncement => {
                state.free_spin_active = true;
                state.free_spin_winnings.clear();
                DismissStep::StartFreeSpins {
                    delay: self.timing.free_spin_start(),
                }
            }
            MessageKind::FreeSpinTotal => {
                state.free_spin_winnings.clear();
                DismissStep::EnableSpin
            }
            MessageKind::Prize => DismissStep::EnableSpin,
        }
    }

    fn show(state: &mut SpinSession, message: Message) -> ResolveStep {
        state.pending_message = Some(message.kind);
        ResolveStep::Show(message)
    }

    fn prize_message(&self, amount: u32) -> Message {
        Message {
            kind: MessageKind::Prize,
            title: "Congratulations!".to_string(),
            body: format!("You won: {amount}{}", self.currency),
            amount: Some(amount),
        }
    }

    fn bonus_message(&self) -> Message {
        Message {
            kind: MessageKind::BonusAnnouncement,
            title: "FREE SPINS!".to_string(),
            body: format!("You get {} free spins!", self.free_spin_count),
            amount: None,
        }
    }

    fn total_message(&self, total: u32) -> Message {
        Message {
            kind: MessageKind::FreeSpinTotal,
            title: "FREE SPINS COMPLETE!".to_string(),
            body: format!("Total winnings: {total}{}!", self.currency),
            amount: Some(total),
        }
    }
}
