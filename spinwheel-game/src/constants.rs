//! Centralized wheel geometry and timing constants for the spin engine.
//!
//! Geometry values are fixed by the physical wheel artwork. Timing values are
//! the defaults used by [`crate::config::TimingConfig`]; hosts that need a
//! faster clock (tests, the tester's real-time mode) override them there.

// Wheel geometry -----------------------------------------------------------
pub const TOTAL_SECTORS: u8 = 18;
pub const DEGREES_PER_TURN: f64 = 360.0;
pub const DEGREES_PER_SECTOR: f64 = DEGREES_PER_TURN / TOTAL_SECTORS as f64;
/// Label placement offset so sector 0 sits at 12 o'clock.
pub const LABEL_ANGLE_OFFSET: f64 = -90.0;
pub const DEFAULT_FULL_TURNS: u32 = 5;

// Cycle layout -------------------------------------------------------------
pub const CYCLE_LEN: usize = 10;
pub const DEFAULT_PITY_PRIMARY: u8 = 3;
pub const DEFAULT_PITY_SECONDARY: u8 = 7;

// Free spins ---------------------------------------------------------------
pub const DEFAULT_FREE_SPIN_COUNT: usize = 3;

// Timing (milliseconds) ----------------------------------------------------
pub const SPIN_ANIMATION_MS: u64 = 5_000;
pub const FREE_SPIN_INTERVAL_MS: u64 = 1_000;
pub const FREE_SPIN_START_DELAY_MS: u64 = 500;

// Presentation -------------------------------------------------------------
pub const DEFAULT_CURRENCY_SUFFIX: &str = "лв";
pub const FREE_SPINS_LABEL: &str = "FREE\nSPINS";

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_SPIN_ACCEPTED: &str = "spin.accepted";
pub(crate) const LOG_SPIN_IGNORED: &str = "spin.ignored";
pub(crate) const LOG_SPIN_SETTLED: &str = "spin.settled";
pub(crate) const LOG_CYCLE_REGENERATED: &str = "cycle.regenerated";
pub(crate) const LOG_PRIZE_AWARDED: &str = "prize.awarded";
pub(crate) const LOG_FREE_SPINS_TRIGGERED: &str = "free-spins.triggered";
pub(crate) const LOG_FREE_SPINS_COLLECTED: &str = "free-spins.collected";
pub(crate) const LOG_FREE_SPINS_TOTAL: &str = "free-spins.total";
pub(crate) const LOG_STALE_CONTINUATION: &str = "flow.stale-continuation";
pub(crate) const LOG_STALE_DISMISSAL: &str = "flow.stale-dismissal";
