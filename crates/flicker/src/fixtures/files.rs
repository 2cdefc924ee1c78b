//! Synthetic trace files on disk.
//!
//! Traces are JSON documents holding a list of [`MockEntrySubject`]s. Binary
//! trace formats are not handled here; scenario assets are copied as opaque
//! bytes.

use super::entry::MockEntrySubject;
use crate::config::FlickerConfig;
use crate::result::{FlickerError, FlickerResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Extension of trace files
pub const TRACE_EXT: &str = ".winscope";

/// Trace kinds captured per scenario, in [`TraceFiles`] field order
pub const SCENARIO_TRACE_NAMES: [&str; 5] = [
    "wm_trace",
    "layers_trace",
    "transactions_trace",
    "transition_trace",
    "eventlog",
];

#[derive(Debug, Serialize, Deserialize)]
struct MockTrace {
    entries: Vec<MockEntrySubject>,
}

/// Write entries as a JSON trace file
pub fn write_trace(path: impl AsRef<Path>, entries: &[MockEntrySubject]) -> FlickerResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let trace = MockTrace {
        entries: entries.to_vec(),
    };
    fs::write(path, serde_json::to_vec_pretty(&trace)?)?;
    Ok(())
}

/// Read a JSON trace file
pub fn read_trace_from_file(path: impl AsRef<Path>) -> FlickerResult<Vec<MockEntrySubject>> {
    let bytes = fs::read(path)?;
    let trace: MockTrace = serde_json::from_slice(&bytes)?;
    Ok(trace.entries)
}

/// Read a JSON trace file, keeping entries with elapsed time in `from..=to`
pub fn read_trace_window(
    path: impl AsRef<Path>,
    from_nanos: i64,
    to_nanos: i64,
) -> FlickerResult<Vec<MockEntrySubject>> {
    let window = from_nanos..=to_nanos;
    let entries = read_trace_from_file(path)?;
    Ok(entries
        .into_iter()
        .filter(|e| window.contains(&e.timestamp.elapsed_nanos))
        .collect())
}

/// Read a recorded asset relative to the configured assets directory
pub fn read_asset(config: &FlickerConfig, relative: impl AsRef<Path>) -> FlickerResult<Vec<u8>> {
    let path = config.asset_path(relative);
    fs::read(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FlickerError::Fixture {
            message: format!("asset not found: {}", path.display()),
        },
        _ => FlickerError::Io(e),
    })
}

/// Delete a file; returns whether it existed
pub fn delete_if_exists(path: impl AsRef<Path>) -> FlickerResult<bool> {
    let path = path.as_ref();
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Trace files of one scenario, copied into the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFiles {
    /// Window manager trace
    pub wm_trace: PathBuf,
    /// Layers trace
    pub layers_trace: PathBuf,
    /// Transactions trace
    pub transactions_trace: PathBuf,
    /// Transitions trace
    pub transition_trace: PathBuf,
    /// Event log
    pub event_log: PathBuf,
}

impl TraceFiles {
    /// All paths, in [`SCENARIO_TRACE_NAMES`] order
    #[must_use]
    pub fn paths(&self) -> [&Path; 5] {
        [
            &self.wm_trace,
            &self.layers_trace,
            &self.transactions_trace,
            &self.transition_trace,
            &self.event_log,
        ]
    }
}

/// Copy the recorded traces of `scenario` into the output directory
///
/// Assets are read from `<assets_dir>/scenarios/<scenario>/<name>.winscope`
/// and written as `<output_dir>/<name>_<random>.winscope`, so concurrent
/// copies of one scenario never collide.
pub fn get_scenario_traces(scenario: &str, config: &FlickerConfig) -> FlickerResult<TraceFiles> {
    let id = Uuid::new_v4().simple().to_string();
    let suffix: String = id.chars().take(10).collect();
    fs::create_dir_all(&config.output_dir)?;

    let mut copied = Vec::with_capacity(SCENARIO_TRACE_NAMES.len());
    for name in SCENARIO_TRACE_NAMES {
        let bytes = read_asset(config, format!("scenarios/{scenario}/{name}{TRACE_EXT}"))?;
        let target = config.output_dir.join(format!("{name}_{suffix}{TRACE_EXT}"));
        fs::write(&target, bytes)?;
        copied.push(target);
    }

    let [wm, layers, transactions, transitions, events]: [PathBuf; 5] =
        copied.try_into().map_err(|_| FlickerError::Fixture {
            message: format!("incomplete trace set for scenario {scenario}"),
        })?;
    Ok(TraceFiles {
        wm_trace: wm,
        layers_trace: layers,
        transactions_trace: transactions,
        transition_trace: transitions,
        event_log: events,
    })
}
