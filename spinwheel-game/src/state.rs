//! Mutable spin session state shared by the state machine and prize flow.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::host::MessageKind;
use crate::sectors::{Prize, SectorIndex};

/// Free-spin winnings stored inline; a sub-session collects only a handful.
pub type FreeSpinWinnings = SmallVec<[Prize; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpinPhase {
    Idle,
    Spinning,
}

/// Single source of truth for one wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinSession {
    /// Absolute wheel rotation in degrees; only ever grows.
    pub cumulative_rotation: f64,
    pub is_spinning: bool,
    /// Next read position in the active cycle, `0..=CYCLE_LEN`.
    pub cycle_position: usize,
    pub free_spin_active: bool,
    pub free_spin_winnings: FreeSpinWinnings,
    pub spins_resolved: u64,
    pub cycle_wraps: u64,
    /// Popup currently awaiting dismissal.
    pub pending_message: Option<MessageKind>,
    /// Outcome of the spin whose animation is running.
    pub in_flight: Option<SectorIndex>,
}

impl Default for SpinSession {
    fn default() -> Self {
        Self {
            cumulative_rotation: 0.0,
            is_spinning: false,
            cycle_position: 0,
            free_spin_active: false,
            free_spin_winnings: FreeSpinWinnings::new(),
            spins_resolved: 0,
            cycle_wraps: 0,
            pending_message: None,
            in_flight: None,
        }
    }
}

impl SpinSession {
    #[must_use]
    pub const fn phase(&self) -> SpinPhase {
        if self.is_spinning {
            SpinPhase::Spinning
        } else {
            SpinPhase::Idle
        }
    }

    /// Sum of collected free-spin amounts; bonus markers add nothing.
    #[must_use]
    pub fn free_spin_total(&self) -> u32 {
        self.free_spin_winnings
            .iter()
            .map(|prize| prize.amount())
            .fold(0, u32::saturating_add)
    }

    /// Nothing in flight: not spinning, no popup open, no sub-session.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !self.is_spinning && !self.free_spin_active && self.pending_message.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_idle() {
        let state = SpinSession::default();
        assert_eq!(state.phase(), SpinPhase::Idle);
        assert_eq!(state.cycle_position, 0);
        assert!(state.free_spin_winnings.is_empty());
        assert!(state.is_settled());
    }

    #[test]
    fn free_spin_total_sums_amounts() {
        let mut state = SpinSession::default();
        state
            .free_spin_winnings
            .extend([Prize::Amount(30), Prize::Amount(15), Prize::Amount(45)]);
        assert_eq!(state.free_spin_total(), 90);

        state.free_spin_winnings[1] = Prize::FreeSpins;
        assert_eq!(state.free_spin_total(), 75);
    }

    #[test]
    fn snapshot_serializes() {
        let mut state = SpinSession::default();
        state.free_spin_winnings.push(Prize::Amount(30));
        let json = serde_json::to_string(&state).expect("serialize");
        let back: SpinSession = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, state);
    }
}
