use anyhow::Result;
use spinwheel_game::WheelConfig;

pub mod checks;

/// Inputs shared by every scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioCtx {
    pub seed: u64,
    /// Spin presses (or cycles, for generator scenarios) per run.
    pub spins: usize,
    pub config: WheelConfig,
    pub verbose: bool,
}

pub type ScenarioCheck = fn(&ScenarioCtx) -> Result<()>;

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub check: ScenarioCheck,
}

impl TestScenario {
    #[must_use]
    pub const fn new(key: &'static str, name: &'static str, check: ScenarioCheck) -> Self {
        Self { key, name, check }
    }

    /// Run the check once.
    ///
    /// # Errors
    ///
    /// Returns the first violated expectation.
    pub fn run(&self, ctx: &ScenarioCtx) -> Result<()> {
        (self.check)(ctx)
    }
}

const SCENARIOS: &[TestScenario] = &[
    TestScenario::new("smoke", "Smoke Test", checks::smoke),
    TestScenario::new("pity-layout", "Pity Layout", checks::pity_layout),
    TestScenario::new(
        "filler-uniformity",
        "Filler Uniformity",
        checks::filler_uniformity,
    ),
    TestScenario::new("cycle-wrap", "Cycle Wrap", checks::cycle_wrap),
    TestScenario::new(
        "rotation-monotonic",
        "Rotation Monotonic",
        checks::rotation_monotonic,
    ),
    TestScenario::new("spin-guard", "Spin Guard", checks::spin_guard),
    TestScenario::new("free-spins", "Free Spins Sub-session", checks::free_spins),
];

pub fn get_scenario(name: &str) -> Option<&'static TestScenario> {
    let key = match name.to_lowercase().as_str() {
        "pity" => "pity-layout",
        "uniformity" => "filler-uniformity",
        "wrap" => "cycle-wrap",
        "rotation" => "rotation-monotonic",
        "guard" => "spin-guard",
        "bonus" => "free-spins",
        other => return SCENARIOS.iter().find(|scenario| scenario.key == other),
    };
    SCENARIOS.iter().find(|scenario| scenario.key == key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS
        .iter()
        .map(|scenario| (scenario.key, scenario.name))
        .collect()
}

/// Expand `all` into every scenario key, keeping explicit names in order.
pub fn expand_scenarios(requested: &[String]) -> Vec<String> {
    let mut scenarios: Vec<String> = requested
        .iter()
        .filter(|name| !name.eq_ignore_ascii_case("all"))
        .cloned()
        .collect();
    if requested.iter().any(|name| name.eq_ignore_ascii_case("all")) {
        for (key, _) in list_scenarios() {
            if !scenarios.iter().any(|name| name == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}
