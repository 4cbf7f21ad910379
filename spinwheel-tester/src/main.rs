mod common;
mod logic;
mod scenario;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use spinwheel_game::WheelConfig;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::{load_config, split_csv};
use logic::{ScenarioResult, SimTester, resolve_seed_inputs, run_realtime_seeds};
use scenario::{expand_scenarios, get_scenario, list_scenarios};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TestMode {
    /// Virtual-clock scenarios (fast, deterministic)
    Sim,
    /// Tokio driver with real timers (scaled by --time-scale)
    Realtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "spinwheel-tester", version = "0.1.0")]
#[command(about = "Automated QA testing for the Spinwheel spin outcome engine")]
struct Args {
    /// Test mode: sim (virtual clock) or realtime (tokio timers)
    #[arg(long, value_enum, default_value_t = TestMode::Sim)]
    mode: TestMode,

    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated, decimal or 0x hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Spin presses per run (cycles, for generator scenarios)
    #[arg(long, default_value_t = 30)]
    spins: usize,

    /// Wheel config JSON; defaults apply to missing fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Multiplier applied to every timer in realtime mode
    #[arg(long, default_value_t = 0.01)]
    time_scale: f64,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let config = load_config(args.config.as_deref())?;
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let seeds: Vec<u64> = seed_infos.iter().map(|s| s.seed).collect();
    if args.verbose {
        for info in &seed_infos {
            println!("🌱 Seed {} ({})", info.seed, info.token);
        }
    }

    let results = match args.mode {
        TestMode::Sim => run_sim_scenarios(&args, &config, &seeds),
        TestMode::Realtime => run_realtime_mode(&args, &config, &seeds).await,
    };

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎡 Spinwheel Automated Tester".bright_cyan().bold());
    println!("{}", "=============================".cyan());
}

fn run_sim_scenarios(args: &Args, config: &WheelConfig, seeds: &[u64]) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Simulated Spins".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let tester = SimTester::new(config.clone(), args.spins, args.verbose);
    let mut results = Vec::new();
    for scenario_name in expand_scenarios(&split_csv(&args.scenarios)) {
        if let Some(scenario) = get_scenario(&scenario_name) {
            results.extend(tester.run_scenario(scenario, seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }
    results
}

async fn run_realtime_mode(args: &Args, config: &WheelConfig, seeds: &[u64]) -> Vec<ScenarioResult> {
    println!("{}", "⏱️  Running Real-time Driver".bright_blue().bold());
    println!("{}", "-".repeat(30).blue());

    run_realtime_seeds(
        config,
        seeds,
        args.iterations,
        args.spins,
        args.time_scale,
        args.verbose,
    )
    .await
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => logic::reports::generate_json_report(&mut output_target, results)?,
        ReportFormat::Markdown => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Spinwheel Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            mode: TestMode::Sim,
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            spins: 5,
            config: None,
            time_scale: 0.01,
            report: ReportFormat::Json,
            output: None,
            verbose: false,
        }
    }

    fn sample_result(passed: bool) -> ScenarioResult {
        let failures = if passed {
            Vec::new()
        } else {
            vec!["failure".to_string()]
        };
        ScenarioResult::from_iterations(
            "Smoke Test",
            1337,
            3,
            failures,
            vec![Duration::from_millis(10)],
        )
    }

    #[test]
    fn args_parse_hex_seeds_and_modes() {
        let args = Args::try_parse_from([
            "spinwheel-tester",
            "--mode",
            "realtime",
            "--seeds",
            "0x10,7",
            "--report",
            "markdown",
            "--time-scale",
            "0.5",
        ])
        .unwrap();
        assert_eq!(args.mode, TestMode::Realtime);
        assert_eq!(args.report, ReportFormat::Markdown);
        assert!((args.time_scale - 0.5).abs() < f64::EPSILON);
        let seeds = resolve_seed_inputs(&split_csv(&args.seeds)).unwrap();
        assert_eq!(seeds[0].seed, 16);
    }

    #[test]
    fn sim_scenarios_skip_unknown_names() {
        let args = Args {
            scenarios: "smoke,jackpot".to_string(),
            ..base_args()
        };
        let results = run_sim_scenarios(&args, &WheelConfig::default(), &[1, 2]);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let temp = std::env::temp_dir().join("spinwheel-scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("free-spins"));
    }

    #[test]
    fn maybe_list_scenarios_returns_false_when_disabled() {
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_emits_json_for_results() {
        let temp = std::env::temp_dir().join("spinwheel-report.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("scenario_name"));
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let temp = std::env::temp_dir().join("spinwheel-report-empty.md");
        let args = Args {
            report: ReportFormat::Markdown,
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No scenarios executed"));
    }

    #[test]
    fn write_reports_console_includes_failures() {
        let temp = std::env::temp_dir().join("spinwheel-report.txt");
        let args = Args {
            report: ReportFormat::Console,
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("failure"));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
