//! Static sector table: the 18 prizes printed on the wheel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::constants::{
    DEGREES_PER_SECTOR, FREE_SPINS_LABEL, LABEL_ANGLE_OFFSET, TOTAL_SECTORS,
};

/// Index of a sector on the wheel, always in `0..TOTAL_SECTORS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SectorIndex(u8);

impl SectorIndex {
    /// Construct an index, rejecting values past the last sector.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value < TOTAL_SECTORS {
            Some(Self(value))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Angle of the sector centre measured from the pointer, in degrees.
    #[must_use]
    pub fn angle(self) -> f64 {
        f64::from(self.0) * DEGREES_PER_SECTOR
    }

    /// Iterate every sector index in wheel order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..TOTAL_SECTORS).map(Self)
    }
}

impl TryFrom<u8> for SectorIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("sector index {value} out of range"))
    }
}

impl From<SectorIndex> for u8 {
    fn from(index: SectorIndex) -> Self {
        index.0
    }
}

impl fmt::Display for SectorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a sector pays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prize {
    Amount(u32),
    FreeSpins,
}

impl Prize {
    #[must_use]
    pub const fn is_bonus(self) -> bool {
        matches!(self, Self::FreeSpins)
    }

    /// Cash value of the prize; the bonus marker carries none.
    #[must_use]
    pub const fn amount(self) -> u32 {
        match self {
            Self::Amount(value) => value,
            Self::FreeSpins => 0,
        }
    }
}

impl fmt::Display for Prize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(value) => write!(f, "{value}"),
            Self::FreeSpins => f.write_str("FreeSpins"),
        }
    }
}

/// Prize printed on each sector, in wheel order starting at 12 o'clock.
pub const PRIZE_TABLE: [Prize; TOTAL_SECTORS as usize] = [
    Prize::Amount(100),
    Prize::Amount(20),
    Prize::Amount(50),
    Prize::Amount(30),
    Prize::Amount(10),
    Prize::Amount(80),
    Prize::Amount(40),
    Prize::Amount(15),
    Prize::Amount(70),
    Prize::FreeSpins,
    Prize::Amount(60),
    Prize::Amount(35),
    Prize::Amount(90),
    Prize::Amount(45),
    Prize::Amount(85),
    Prize::Amount(55),
    Prize::Amount(75),
    Prize::Amount(65),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sector {
    pub index: SectorIndex,
    pub prize: Prize,
}

/// Render payload for one sector label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorLabel {
    pub index: SectorIndex,
    pub text: String,
    pub is_bonus: bool,
    /// Placement angle in degrees, sector 0 at 12 o'clock.
    pub angle: f64,
}

/// Immutable view over the wheel's sectors.
#[derive(Debug, Clone)]
pub struct SectorTable {
    sectors: Vec<Sector>,
}

impl SectorTable {
    fn load_static() -> Self {
        let sectors = SectorIndex::all()
            .zip(PRIZE_TABLE)
            .map(|(index, prize)| Sector { index, prize })
            .collect();
        Self { sectors }
    }

    /// Shared table for the process lifetime.
    #[must_use]
    pub fn global() -> &'static Self {
        static TABLE: OnceLock<SectorTable> = OnceLock::new();
        TABLE.get_or_init(Self::load_static)
    }

    #[must_use]
    pub fn prize(&self, index: SectorIndex) -> Prize {
        self.sectors[index.as_usize()].prize
    }

    #[must_use]
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// First sector carrying the free-spins marker.
    #[must_use]
    pub fn bonus_sector(&self) -> Option<SectorIndex> {
        self.sectors
            .iter()
            .find(|sector| sector.prize.is_bonus())
            .map(|sector| sector.index)
    }

    /// Build the label list handed to the renderer once at startup.
    #[must_use]
    pub fn labels(&self, currency: &str) -> Vec<SectorLabel> {
        self.sectors
            .iter()
            .map(|sector| {
                let text = match sector.prize {
                    Prize::Amount(value) => format!("{value}{currency}"),
                    Prize::FreeSpins => FREE_SPINS_LABEL.to_string(),
                };
                SectorLabel {
                    index: sector.index,
                    text,
                    is_bonus: sector.prize.is_bonus(),
                    angle: sector.index.angle() + LABEL_ANGLE_OFFSET,
                }
            })
            .collect()
    }
}
