//! Deterministic fakes and scenario fixtures for Warden tests.
//!
//! Scenario files live in the workspace-level `test-fixtures/` directory and
//! are shared by every crate's tests and benches.

pub mod executors;
pub mod sources;

pub use executors::{Outcome, PanickingEscalation, RecordingEscalation, ScriptedExecutor};
pub use sources::{ScriptedSource, Step};

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Root directory of the test-fixtures folder.
fn fixtures_root() -> PathBuf {
    // Works from any crate in the workspace: walk up to find test-fixtures.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    while !path.join("test-fixtures").join("scenarios").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures directory from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// A scripted run: one map of metric values per tick.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    /// Source name the values are reported under.
    pub source: String,
    pub ticks: Vec<BTreeMap<String, f64>>,
    /// Tick (1-based) at which the scenario's issue is expected to be detected.
    #[serde(default)]
    pub expected_detection_tick: Option<usize>,
    #[serde(default)]
    pub expected_issue_type: Option<String>,
}

/// Load `test-fixtures/scenarios/<name>.json`.
pub fn load_scenario(name: &str) -> Scenario {
    load_fixture(&format!("scenarios/{name}.json"))
}
