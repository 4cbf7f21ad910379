//! Win sequence generation: the 10-spin cycle with pity sectors pinned to
//! fixed positions and random filler everywhere else.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{CYCLE_LEN, TOTAL_SECTORS};
use crate::rng::{RandomSource, WheelRng};
use crate::sectors::SectorIndex;

/// Role a cycle position plays in the sequence layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Filler,
    Primary,
    Secondary,
}

/// Fixed layout of every cycle: `[R, P1, P2, R, P1, R, P1, R, P2, R]`.
pub const CYCLE_LAYOUT: [Slot; CYCLE_LEN] = [
    Slot::Filler,
    Slot::Primary,
    Slot::Secondary,
    Slot::Filler,
    Slot::Primary,
    Slot::Filler,
    Slot::Primary,
    Slot::Filler,
    Slot::Secondary,
    Slot::Filler,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("pity sector {value} is outside the wheel (0..{max})")]
    PitySectorOutOfRange { value: u8, max: u8 },
    #[error("pity sectors must differ, both are {0}")]
    PitySectorsCollide(u8),
}

/// The two sectors guaranteed to land at fixed cycle positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitySectors {
    primary: SectorIndex,
    secondary: SectorIndex,
}

impl PitySectors {
    /// Validate and pair the two pity sectors.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError` when either sector is off the wheel or both are
    /// the same sector.
    pub fn new(primary: u8, secondary: u8) -> Result<Self, SequenceError> {
        let lookup = |value: u8| {
            SectorIndex::new(value).ok_or(SequenceError::PitySectorOutOfRange {
                value,
                max: TOTAL_SECTORS,
            })
        };
        let primary = lookup(primary)?;
        let secondary = lookup(secondary)?;
        if primary == secondary {
            return Err(SequenceError::PitySectorsCollide(primary.get()));
        }
        Ok(Self { primary, secondary })
    }

    #[must_use]
    pub const fn primary(self) -> SectorIndex {
        self.primary
    }

    #[must_use]
    pub const fn secondary(self) -> SectorIndex {
        self.secondary
    }

    #[must_use]
    pub const fn for_slot(self, slot: Slot) -> Option<SectorIndex> {
        match slot {
            Slot::Filler => None,
            Slot::Primary => Some(self.primary),
            Slot::Secondary => Some(self.secondary),
        }
    }

    #[must_use]
    pub fn contains(self, index: SectorIndex) -> bool {
        index == self.primary || index == self.secondary
    }

    /// Exclusion set for filler draws.
    #[must_use]
    pub fn exclude_set(self) -> ExcludeSet {
        ExcludeSet(bit(self.primary) | bit(self.secondary))
    }
}

const fn bit(index: SectorIndex) -> u32 {
    1 << index.get()
}

const FULL_WHEEL: u32 = (1 << TOTAL_SECTORS) - 1;

/// Set of sectors a draw must avoid. Never covers the whole wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExcludeSet(u32);

impl ExcludeSet {
    /// Build a set, returning `None` when it would leave no sector to draw.
    #[must_use]
    pub fn from_sectors(sectors: impl IntoIterator<Item = SectorIndex>) -> Option<Self> {
        let mask = sectors.into_iter().fold(0, |mask, index| mask | bit(index));
        (mask != FULL_WHEEL).then_some(Self(mask))
    }

    #[must_use]
    pub const fn contains(self, index: SectorIndex) -> bool {
        self.0 & bit(index) != 0
    }

    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Draw uniformly from the wheel minus `exclude`, retrying on collision.
pub fn pick_random_excluding<R>(source: &mut R, exclude: ExcludeSet) -> SectorIndex
where
    R: RandomSource + ?Sized,
{
    loop {
        let drawn = source.draw_below(TOTAL_SECTORS);
        if let Some(index) = SectorIndex::new(drawn)
            && !exclude.contains(index)
        {
            return index;
        }
    }
}

/// One full cycle of predetermined outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinSequence([SectorIndex; CYCLE_LEN]);

impl WinSequence {
    #[must_use]
    pub const fn from_sectors(sectors: [SectorIndex; CYCLE_LEN]) -> Self {
        Self(sectors)
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<SectorIndex> {
        self.0.get(position).copied()
    }

    #[must_use]
    pub const fn as_slice(&self) -> &[SectorIndex] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = SectorIndex> + '_ {
        self.0.iter().copied()
    }

    /// Outcomes at filler positions, in cycle order.
    pub fn fillers(&self) -> impl Iterator<Item = SectorIndex> + '_ {
        CYCLE_LAYOUT
            .iter()
            .zip(self.0.iter())
            .filter(|(slot, _)| **slot == Slot::Filler)
            .map(|(_, index)| *index)
    }
}

/// Produces fresh pity-guaranteed cycles from an injected random source.
#[derive(Debug, Clone)]
pub struct SequenceGenerator<R = WheelRng> {
    pity: PitySectors,
    source: R,
    generated: u64,
}

impl SequenceGenerator<WheelRng> {
    /// Generator backed by the seeded production stream.
    #[must_use]
    pub fn seeded(pity: PitySectors, seed: u64) -> Self {
        Self::with_source(pity, WheelRng::from_user_seed(seed))
    }
}

impl<R: RandomSource> SequenceGenerator<R> {
    pub const fn with_source(pity: PitySectors, source: R) -> Self {
        Self {
            pity,
            source,
            generated: 0,
        }
    }

    #[must_use]
    pub const fn pity(&self) -> PitySectors {
        self.pity
    }

    /// Number of sequences produced so far.
    #[must_use]
    pub const fn generated(&self) -> u64 {
        self.generated
    }

    #[must_use]
    pub const fn source(&self) -> &R {
        &self.source
    }

    /// Draw one filler sector, never a pity sector.
    pub fn pick_filler(&mut self) -> SectorIndex {
        pick_random_excluding(&mut self.source, self.pity.exclude_set())
    }

    /// Produce a fresh cycle.
    pub fn generate(&mut self) -> WinSequence {
        let pity = self.pity;
        let sectors = CYCLE_LAYOUT.map(|slot| match pity.for_slot(slot) {
            Some(index) => index,
            None => self.pick_filler(),
        });
        self.generated = self.generated.saturating_add(1);
        WinSequence(sectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedSource;

    fn default_pity() -> PitySectors {
        PitySectors::new(3, 7).unwrap()
    }

    #[test]
    fn layout_pins_pity_positions() {
        let mut generator = SequenceGenerator::seeded(default_pity(), 1337);
        for _ in 0..200 {
            let sequence = generator.generate();
            for pos in [1, 4, 6] {
                assert_eq!(sequence.get(pos).map(SectorIndex::get), Some(3));
            }
            for pos in [2, 8] {
                assert_eq!(sequence.get(pos).map(SectorIndex::get), Some(7));
            }
            for pos in [0, 3, 5, 7, 9] {
                let filler = sequence.get(pos).unwrap();
                assert!(!default_pity().contains(filler), "filler hit pity at {pos}");
            }
        }
        assert_eq!(generator.generated(), 200);
    }

    #[test]
    fn scripted_source_fills_in_order() {
        let source = ScriptedSource::new(vec![0, 1, 2, 4, 5]);
        let mut generator = SequenceGenerator::with_source(default_pity(), source);
        let sequence = generator.generate();
        let raw: Vec<u8> = sequence.iter().map(SectorIndex::get).collect();
        assert_eq!(raw, vec![0, 3, 7, 1, 3, 2, 3, 4, 7, 5]);
    }

    #[test]
    fn rejection_skips_pity_draws() {
        let source = ScriptedSource::new(vec![3, 7, 3, 11]);
        let mut generator = SequenceGenerator::with_source(default_pity(), source);
        assert_eq!(generator.pick_filler().get(), 11);
        assert_eq!(generator.source().consumed(), 4);
    }

    #[test]
    fn pity_validation() {
        assert_eq!(
            PitySectors::new(4, 4),
            Err(SequenceError::PitySectorsCollide(4))
        );
        assert!(matches!(
            PitySectors::new(18, 2),
            Err(SequenceError::PitySectorOutOfRange { value: 18, .. })
        ));
    }

    #[test]
    fn exclude_set_refuses_full_wheel() {
        assert!(ExcludeSet::from_sectors(SectorIndex::all()).is_none());
        let partial = ExcludeSet::from_sectors(SectorIndex::all().take(17)).unwrap();
        assert_eq!(partial.len(), 17);
        assert!(!partial.contains(SectorIndex::new(17).unwrap()));
        assert_eq!(default_pity().exclude_set().len(), 2);
    }

    #[test]
    fn fillers_follow_layout() {
        let source = ScriptedSource::new(vec![10, 11, 12, 13, 14]);
        let mut generator = SequenceGenerator::with_source(default_pity(), source);
        let fillers: Vec<u8> = generator.generate().fillers().map(SectorIndex::get).collect();
        assert_eq!(fillers, vec![10, 11, 12, 13, 14]);
    }
}
