//! Real-time runs through the tokio driver with an auto-clicking presenter.

use anyhow::{Context, Result, ensure};
use log::warn;
use spinwheel_game::{
    DriverCommand, Message, MessageKind, Presenter, SectorLabel, WheelConfig, WheelSession,
    run_wheel,
};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use super::tester::{ScenarioResult, iteration_seed};

pub const REALTIME_SCENARIO: &str = "Realtime Driver";

/// Presses spin whenever the control is enabled and closes every popup.
struct AutoPresenter {
    commands: mpsc::Sender<DriverCommand>,
    presses_left: usize,
    labels: usize,
    rotations: Vec<f64>,
    messages: Vec<Message>,
}

impl AutoPresenter {
    fn send(&self, command: DriverCommand) {
        if let Err(err) = self.commands.try_send(command) {
            warn!("auto presenter dropped {command:?}: {err}");
        }
    }
}

impl Presenter for AutoPresenter {
    fn render_sectors(&mut self, labels: &[SectorLabel]) {
        self.labels = labels.len();
    }

    fn set_wheel_rotation(&mut self, angle: f64, _duration: Duration) {
        self.rotations.push(angle);
    }

    fn set_spin_enabled(&mut self, enabled: bool) {
        if !enabled {
            return;
        }
        if self.presses_left == 0 {
            self.send(DriverCommand::Shutdown);
        } else {
            self.presses_left -= 1;
            self.send(DriverCommand::Spin);
        }
    }

    fn show_message(&mut self, message: &Message) {
        self.messages.push(message.clone());
        self.send(DriverCommand::Dismiss(message.kind));
    }
}

/// What one real-time run observed.
#[derive(Debug, Clone)]
pub struct RealtimeSummary {
    pub spins_resolved: u64,
    pub presses: usize,
    pub rotations: Vec<f64>,
    pub messages: Vec<Message>,
    pub settled: bool,
}

/// Upper bound on wall time for `presses` presses, bonus rounds included.
fn run_budget(cfg: &WheelConfig, presses: usize) -> Duration {
    let timing = cfg.timing;
    let count = u32::try_from(cfg.free_spin_count).unwrap_or(u32::MAX);
    let bonus_round = (timing.spin() + timing.free_spin_start())
        .saturating_add(timing.spin().saturating_mul(count))
        .saturating_add(timing.free_spin_interval().saturating_mul(count));
    let presses = u32::try_from(presses).unwrap_or(u32::MAX);
    bonus_round
        .saturating_mul(presses.saturating_add(1))
        .saturating_mul(2)
        .saturating_add(Duration::from_secs(1))
}

/// Drive one session through the tokio driver with timings scaled by `time_scale`.
///
/// # Errors
///
/// Returns an error if the config is invalid or the run exceeds its time budget.
pub async fn run_realtime(
    cfg: &WheelConfig,
    seed: u64,
    presses: usize,
    time_scale: f64,
) -> Result<RealtimeSummary> {
    let mut cfg = cfg.clone();
    cfg.timing = cfg.timing.scaled(time_scale);
    let budget = run_budget(&cfg, presses);

    let session = WheelSession::new(cfg, seed)?;
    let (tx, rx) = mpsc::channel(16);
    let presenter = AutoPresenter {
        commands: tx,
        presses_left: presses,
        labels: 0,
        rotations: Vec::new(),
        messages: Vec::new(),
    };

    let (session, presenter) = tokio::time::timeout(budget, run_wheel(session, presenter, rx))
        .await
        .with_context(|| format!("real-time run for seed {seed} exceeded {budget:?}"))?;

    ensure!(
        presenter.labels > 0,
        "driver never rendered the sector labels"
    );
    Ok(RealtimeSummary {
        spins_resolved: session.state().spins_resolved,
        presses,
        rotations: presenter.rotations,
        messages: presenter.messages,
        settled: session.state().is_settled(),
    })
}

/// Properties every finished real-time run must satisfy.
///
/// # Errors
///
/// Returns the first violated property.
pub fn check_summary(summary: &RealtimeSummary) -> Result<()> {
    ensure!(summary.settled, "wheel left unsettled at shutdown");
    ensure!(
        summary.spins_resolved >= u64::try_from(summary.presses)?,
        "{} presses resolved only {} spins",
        summary.presses,
        summary.spins_resolved
    );
    ensure!(
        summary.rotations.len() as u64 == summary.spins_resolved,
        "{} rotations for {} resolved spins",
        summary.rotations.len(),
        summary.spins_resolved
    );
    for pair in summary.rotations.windows(2) {
        ensure!(
            pair[1] > pair[0],
            "rotation went backwards: {} -> {}",
            pair[0],
            pair[1]
        );
    }
    let announcements = summary
        .messages
        .iter()
        .filter(|m| m.kind == MessageKind::BonusAnnouncement)
        .count();
    let totals = summary
        .messages
        .iter()
        .filter(|m| m.kind == MessageKind::FreeSpinTotal)
        .count();
    ensure!(
        announcements == totals,
        "{announcements} bonus announcements but {totals} free-spin totals"
    );
    Ok(())
}

/// Run `iterations` real-time sessions per seed.
pub async fn run_realtime_seeds(
    cfg: &WheelConfig,
    seeds: &[u64],
    iterations: usize,
    presses: usize,
    time_scale: f64,
    verbose: bool,
) -> Vec<ScenarioResult> {
    let mut results = Vec::with_capacity(seeds.len());
    for &seed in seeds {
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        for i in 0..iterations {
            let run_seed = iteration_seed(seed, i);
            let start_time = Instant::now();
            let outcome = run_realtime(cfg, run_seed, presses, time_scale)
                .await
                .and_then(|summary| check_summary(&summary).map(|()| summary));
            match outcome {
                Ok(summary) => {
                    performance_data.push(start_time.elapsed());
                    if verbose {
                        println!(
                            "  ✅ seed {run_seed}: {} spins, {} popups",
                            summary.spins_resolved,
                            summary.messages.len()
                        );
                    }
                }
                Err(err) => {
                    failures.push(format!("Iteration {} (seed {run_seed}): {err:#}", i + 1));
                }
            }
        }
        results.push(ScenarioResult::from_iterations(
            REALTIME_SCENARIO,
            seed,
            iterations,
            failures,
            performance_data,
        ));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn auto_presenter_plays_requested_presses() {
        let summary = run_realtime(&WheelConfig::default(), 42, 6, 1.0)
            .await
            .unwrap();
        check_summary(&summary).unwrap();
        assert!(summary.spins_resolved >= 6);
        assert_eq!(summary.presses, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn seeds_fold_into_results() {
        let results = run_realtime_seeds(&WheelConfig::default(), &[3, 4], 2, 3, 0.01, false).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
        assert_eq!(results[0].scenario_name, REALTIME_SCENARIO);
    }

    #[test]
    fn summary_check_flags_backwards_rotation() {
        let summary = RealtimeSummary {
            spins_resolved: 2,
            presses: 2,
            rotations: vec![2160.0, 1800.0],
            messages: Vec::new(),
            settled: true,
        };
        let err = check_summary(&summary).unwrap_err();
        assert!(err.to_string().contains("backwards"));
    }

    #[test]
    fn budget_grows_with_presses() {
        let cfg = WheelConfig::default();
        assert!(run_budget(&cfg, 10) > run_budget(&cfg, 1));
    }
}
