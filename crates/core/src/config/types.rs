use serde::{Deserialize, Serialize};

use crate::batch::BatchConfig;
use crate::runner::RunnerConfig;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    /// Runner settings derived from the `[tool]` section.
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig::default().with_drain_grace(self.tool.drain_grace_ms)
    }
}

/// chdman location and output capture settings
///
/// The failure tail is always the last five output lines and is not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolConfig {
    /// Path as the user entered it; resolved with [`crate::locate::resolve`].
    #[serde(default = "default_tool_path")]
    pub path: String,
    /// Post-exit output drain period in milliseconds.
    #[serde(default = "default_drain_grace_ms")]
    pub drain_grace_ms: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            path: default_tool_path(),
            drain_grace_ms: default_drain_grace_ms(),
        }
    }
}

fn default_tool_path() -> String {
    "chdman".to_string()
}

fn default_drain_grace_ms() -> u64 {
    RunnerConfig::default().drain_grace_ms
}
