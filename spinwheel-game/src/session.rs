use log::{debug, warn};

use crate::config::{WheelConfig, WheelConfigError};
use crate::constants::LOG_STALE_CONTINUATION;
use crate::flow::{DismissStep, PrizeFlow, ResolveStep};
use crate::host::{Continuation, MessageKind, WheelHost};
use crate::machine::{SpinMachine, SpinRequest};
use crate::rng::{RandomSource, WheelRng};
use crate::sectors::SectorTable;
use crate::sequence::SequenceGenerator;
use crate::state::SpinSession;

/// High-level session binding the spin machine and prize flow to one owned
/// [`SpinSession`]. Hosts drive everything through this type.
#[derive(Debug, Clone)]
pub struct WheelSession<R = WheelRng> {
    machine: SpinMachine<R>,
    flow: PrizeFlow,
    state: SpinSession,
    cfg: WheelConfig,
}

impl WheelSession<WheelRng> {
    /// Construct a session whose filler draws come from `seed`.
    ///
    /// # Errors
    ///
    /// Returns `WheelConfigError` if the configuration fails validation.
    pub fn new(cfg: WheelConfig, seed: u64) -> Result<Self, WheelConfigError> {
        Self::with_source(cfg, WheelRng::from_user_seed(seed))
    }
}

impl<R: RandomSource> WheelSession<R> {
    /// Construct a session over an injected random source.
    ///
    /// # Errors
    ///
    /// Returns `WheelConfigError` if the configuration fails validation.
    pub fn with_source(cfg: WheelConfig, source: R) -> Result<Self, WheelConfigError> {
        cfg.validate()?;
        let generator = SequenceGenerator::with_source(cfg.pity.sectors()?, source);
        let machine = SpinMachine::new(generator, cfg.full_turns);
        Ok(Self {
            machine,
            flow: PrizeFlow::new(&cfg),
            state: SpinSession::default(),
            cfg,
        })
    }

    /// Render the sector labels and enable the spin control.
    pub fn start<H: WheelHost + ?Sized>(&mut self, host: &mut H) {
        let labels = SectorTable::global().labels(&self.cfg.currency);
        host.render_sectors(&labels);
        host.set_spin_enabled(true);
    }

    /// Entry point for the spin trigger and for chained free spins.
    pub fn request_spin<H: WheelHost + ?Sized>(&mut self, host: &mut H) -> SpinRequest {
        let request = self.machine.request_spin(&mut self.state);
        if let SpinRequest::Accepted(plan) = &request {
            host.set_spin_enabled(false);
            host.set_wheel_rotation(plan.rotation, self.cfg.timing.spin());
            host.schedule(
                self.cfg.timing.spin(),
                Continuation::SettleSpin {
                    sector: plan.sector,
                },
            );
        }
        request
    }

    /// Run a continuation the host scheduled earlier.
    pub fn resume<H: WheelHost + ?Sized>(&mut self, continuation: Continuation, host: &mut H) {
        debug!("resume {continuation:?}");
        match continuation {
            Continuation::SettleSpin { sector } => {
                let Some(prize) = self.machine.settle(&mut self.state, sector) else {
                    return;
                };
                match self.flow.resolve(&mut self.state, prize) {
                    ResolveStep::Show(message) => host.show_message(message),
                    ResolveStep::ScheduleFreeSpin { delay, number } => {
                        host.schedule(delay, Continuation::FreeSpin { number });
                    }
                }
            }
            Continuation::FreeSpin { number } => {
                let expected = self.state.free_spin_winnings.len() + 1;
                if !self.state.free_spin_active || number != expected {
                    warn!(
                        "{LOG_STALE_CONTINUATION}: free spin {number} but sub-session expects {expected}"
                    );
                    return;
                }
                self.request_spin(host);
            }
        }
    }

    /// Apply the close of the popup identified by `kind`.
    pub fn dismiss<H: WheelHost + ?Sized>(&mut self, kind: MessageKind, host: &mut H) {
        match self.flow.dismiss(&mut self.state, kind) {
            DismissStep::StartFreeSpins { delay } => {
                host.schedule(delay, Continuation::FreeSpin { number: 1 });
            }
            DismissStep::EnableSpin => host.set_spin_enabled(true),
            DismissStep::Ignored => {}
        }
    }

    /// Borrow the underlying immutable spin state.
    #[must_use]
    pub const fn state(&self) -> &SpinSession {
        &self.state
    }

    #[must_use]
    pub const fn machine(&self) -> &SpinMachine<R> {
        &self.machine
    }

    #[must_use]
    pub const fn config(&self) -> &WheelConfig {
        &self.cfg
    }

    /// Consume the session, returning the underlying spin state.
    #[must_use]
    pub fn into_state(self) -> SpinSession {
        self.state
    }
}
