//! Spinwheel Engine
//!
//! Platform-agnostic spin outcome engine for the Spinwheel promotional prize
//! wheel: the pity-guaranteed sequence generator, the spin state machine and
//! the prize resolution flow with its free-spin sub-session. Rendering, popups
//! and timers are supplied by the host through [`WheelHost`].

pub mod config;
pub mod constants;
#[cfg(feature = "async")]
pub mod driver;
pub mod flow;
pub mod host;
pub mod machine;
pub mod rng;
pub mod sectors;
pub mod sequence;
pub mod session;
pub mod sim;
pub mod state;

// Re-export commonly used types
pub use config::{PityConfig, TimingConfig, WheelConfig, WheelConfigError};
#[cfg(feature = "async")]
pub use driver::{DriverCommand, Presenter, run_wheel};
pub use flow::{DismissStep, PrizeFlow, ResolveStep};
pub use host::{Continuation, Message, MessageKind, WheelHost};
pub use machine::{SpinMachine, SpinPlan, SpinRequest, target_rotation};
pub use rng::{CountingRng, RandomSource, ScriptedSource, WheelRng, derive_stream_seed};
pub use sectors::{PRIZE_TABLE, Prize, Sector, SectorIndex, SectorLabel, SectorTable};
pub use sequence::{
    CYCLE_LAYOUT, ExcludeSet, PitySectors, SequenceError, SequenceGenerator, Slot, WinSequence,
    pick_random_excluding,
};
pub use session::WheelSession;
pub use sim::{HostEvent, SimHost, SimStep};
pub use state::{FreeSpinWinnings, SpinPhase, SpinSession};

/// Trait for abstracting configuration loading.
/// Platform-specific implementations should provide this
pub trait ConfigLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the raw wheel configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    fn load_wheel_config(&self) -> Result<String, Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError<E: std::error::Error + 'static> {
    #[error("failed to load wheel config")]
    Load(#[source] E),
    #[error(transparent)]
    Config(#[from] WheelConfigError),
}

/// Builds wheel sessions from a platform-supplied configuration source.
pub struct WheelEngine<L>
where
    L: ConfigLoader,
{
    loader: L,
}

impl<L> WheelEngine<L>
where
    L: ConfigLoader,
{
    /// Create a new engine with the provided config loader
    pub const fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Load and validate the wheel configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded, parsed or validated.
    pub fn load_config(&self) -> Result<WheelConfig, EngineError<L::Error>> {
        let raw = self.loader.load_wheel_config().map_err(EngineError::Load)?;
        Ok(WheelConfig::from_json(&raw)?)
    }

    /// Create a new session with the loaded configuration and seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn create_session(&self, seed: u64) -> Result<WheelSession, EngineError<L::Error>> {
        let cfg = self.load_config()?;
        Ok(WheelSession::new(cfg, seed)?)
    }
}
