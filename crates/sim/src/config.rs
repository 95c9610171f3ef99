//! Simulator configuration read from the process environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use ability_core::TICK_MILLIS;

/// Settings for one simulator session.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Wall-clock length of one tick when running in realtime.
    pub tick_interval: Duration,
    pub command_buffer: usize,
    pub event_buffer: usize,
    /// Let the runtime tick on its own instead of stepping manually.
    pub realtime: bool,
    pub session_id: Option<String>,
    /// Directory holding `abilities.toml`.
    pub data_dir: PathBuf,
    /// World steps to simulate after the scripted casts.
    pub steps: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(TICK_MILLIS),
            command_buffer: 32,
            event_buffer: 256,
            realtime: false,
            session_id: None,
            data_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data")),
            steps: 120,
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SIM_TICK_MS` - Tick length in realtime mode (default: 50)
    /// - `SIM_COMMAND_BUFFER` - Command queue size (default: 32)
    /// - `SIM_EVENT_BUFFER` - Event buffer per topic (default: 256)
    /// - `SIM_REALTIME` - Drive the clock from the runtime ticker (default: false)
    /// - `SIM_SESSION_ID` - Session identifier for log files (default: auto-generated)
    /// - `SIM_DATA_DIR` - Directory with `abilities.toml` (default: the crate's `data/`)
    /// - `SIM_STEPS` - World steps after the scripted casts (default: 120)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(millis) = read_env::<u64>("SIM_TICK_MS") {
            config.tick_interval = Duration::from_millis(millis.max(1));
        }
        if let Some(capacity) = read_env::<usize>("SIM_COMMAND_BUFFER") {
            config.command_buffer = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("SIM_EVENT_BUFFER") {
            config.event_buffer = capacity.max(1);
        }
        if let Some(realtime) = read_env::<bool>("SIM_REALTIME") {
            config.realtime = realtime;
        }
        if let Some(steps) = read_env::<u64>("SIM_STEPS") {
            config.steps = steps;
        }

        config.session_id = env::var("SIM_SESSION_ID").ok();
        if let Ok(dir) = env::var("SIM_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
