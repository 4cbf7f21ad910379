//! Spin state machine: `Idle` / `Spinning`, cycle pointer and rotation math.

use log::{debug, warn};
use serde::Serialize;

use crate::constants::{
    CYCLE_LEN, DEGREES_PER_TURN, LOG_CYCLE_REGENERATED, LOG_SPIN_ACCEPTED, LOG_SPIN_IGNORED,
    LOG_SPIN_SETTLED, LOG_STALE_CONTINUATION,
};
use crate::rng::{RandomSource, WheelRng};
use crate::sectors::{Prize, SectorIndex, SectorTable};
use crate::sequence::{SequenceGenerator, WinSequence};
use crate::state::SpinSession;

/// Everything decided when a spin is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpinPlan {
    pub sector: SectorIndex,
    pub prize: Prize,
    /// Absolute rotation the wheel animates to.
    pub rotation: f64,
    /// Cycle position the outcome was read from.
    pub cycle_position: usize,
    /// A fresh cycle was drawn before reading the outcome.
    pub regenerated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinRequest {
    Accepted(SpinPlan),
    /// A spin was already running; nothing changed.
    Ignored,
}

impl SpinRequest {
    #[must_use]
    pub const fn plan(&self) -> Option<&SpinPlan> {
        match self {
            Self::Accepted(plan) => Some(plan),
            Self::Ignored => None,
        }
    }

    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Next absolute rotation landing `sector` under the pointer.
///
/// Truncates the current rotation to its last full turn, then adds
/// `full_turns` turns back to the sector plus one extra turn, so the result is
/// always strictly greater than `current`.
#[must_use]
pub fn target_rotation(current: f64, sector: SectorIndex, full_turns: u32) -> f64 {
    let target = f64::from(full_turns) * DEGREES_PER_TURN - sector.angle();
    let base = current - current.rem_euclid(DEGREES_PER_TURN);
    base + target + DEGREES_PER_TURN
}

/// Owns the active cycle and the generator that refills it.
#[derive(Debug, Clone)]
pub struct SpinMachine<R = WheelRng> {
    generator: SequenceGenerator<R>,
    sequence: WinSequence,
    full_turns: u32,
}

impl<R: RandomSource> SpinMachine<R> {
    /// Draw the first cycle immediately.
    pub fn new(mut generator: SequenceGenerator<R>, full_turns: u32) -> Self {
        let sequence = generator.generate();
        Self {
            generator,
            sequence,
            full_turns,
        }
    }

    #[must_use]
    pub const fn sequence(&self) -> &WinSequence {
        &self.sequence
    }

    #[must_use]
    pub const fn generator(&self) -> &SequenceGenerator<R> {
        &self.generator
    }

    #[must_use]
    pub const fn full_turns(&self) -> u32 {
        self.full_turns
    }

    /// Accept a spin unless one is already running.
    pub fn request_spin(&mut self, state: &mut SpinSession) -> SpinRequest {
        if state.is_spinning {
            debug!("{LOG_SPIN_IGNORED}: animation still running");
            return SpinRequest::Ignored;
        }
        state.is_spinning = true;

        let regenerated = state.cycle_position >= CYCLE_LEN;
        if regenerated {
            state.cycle_position = 0;
            state.cycle_wraps = state.cycle_wraps.saturating_add(1);
            self.sequence = self.generator.generate();
            debug!(
                "{LOG_CYCLE_REGENERATED}: cycle {} {:?}",
                self.generator.generated(),
                self.sequence.as_slice()
            );
        }

        let cycle_position = state.cycle_position;
        let sector = self.sequence.as_slice()[cycle_position];
        let rotation = target_rotation(state.cumulative_rotation, sector, self.full_turns);
        state.cumulative_rotation = rotation;
        state.in_flight = Some(sector);

        let prize = SectorTable::global().prize(sector);
        debug!("{LOG_SPIN_ACCEPTED}: position {cycle_position} -> {sector} ({prize}) at {rotation}deg");
        SpinRequest::Accepted(SpinPlan {
            sector,
            prize,
            rotation,
            cycle_position,
            regenerated,
        })
    }

    /// Finish the running animation and advance the cycle pointer.
    ///
    /// Returns `None` for a settle that does not match the spin in flight.
    pub fn settle(&mut self, state: &mut SpinSession, sector: SectorIndex) -> Option<Prize> {
        if !state.is_spinning || state.in_flight != Some(sector) {
            warn!(
                "{LOG_STALE_CONTINUATION}: settle for {sector} but in flight is {:?}",
                state.in_flight
            );
            return None;
        }
        state.is_spinning = false;
        state.in_flight = None;
        state.cycle_position += 1;
        state.spins_resolved = state.spins_resolved.saturating_add(1);
        let prize = SectorTable::global().prize(sector);
        debug!(
            "{LOG_SPIN_SETTLED}: {sector} -> {prize}, position now {}",
            state.cycle_position
        );
        Some(prize)
    }
}
