pub mod realtime;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use realtime::run_realtime_seeds;
pub use seeds::resolve_seed_inputs;
pub use tester::*;
