//! Scripted device and mocked flicker test contexts.
//!
//! A [`MockedFlicker`] replays setup, transition and teardown actions on a
//! [`MockDevice`]. Only the transitions are traced: one entry for the state
//! reached after setup, then one per transition.

use super::entry::{MockEntrySubject, VisibilityTraceSubject};
use super::scenario::{test_scenario, RunStatus, Scenario};
use crate::config::FlickerConfig;
use crate::result::FlickerResult;
use crate::timestamp::Timestamp;
use crate::trace::TraceSubject;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Step applied to the mock device
pub type DeviceAction = Box<dyn Fn(&mut MockDevice)>;

/// Device clock advance per traced step
pub const FRAME_NANOS: i64 = 16_666_667;

/// In-memory stand-in for a device screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockDevice {
    clock_nanos: i64,
    visible: BTreeSet<String>,
    state: String,
}

impl MockDevice {
    /// Create a device with nothing on screen
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an element visible
    pub fn show(&mut self, id: &str) {
        self.visible.insert(id.to_string());
    }

    /// Hide an element
    pub fn hide(&mut self, id: &str) {
        self.visible.remove(id);
    }

    /// Set the state name (e.g. the focused app)
    pub fn set_state(&mut self, state: &str) {
        self.state = state.to_string();
    }

    /// Advance the device clock by one frame
    pub fn tick(&mut self) {
        self.clock_nanos += FRAME_NANOS;
    }

    /// Current clock value
    #[must_use]
    pub const fn clock_nanos(&self) -> i64 {
        self.clock_nanos
    }

    /// Visible elements
    #[must_use]
    pub fn visible(&self) -> &BTreeSet<String> {
        &self.visible
    }

    /// Capture the current screen as a trace entry
    #[must_use]
    pub fn snapshot(&self) -> MockEntrySubject {
        MockEntrySubject {
            timestamp: Timestamp::from_elapsed_nanos(self.clock_nanos),
            visible: self.visible.clone(),
            state: self.state.clone(),
        }
    }
}

/// A flicker test context backed by a [`MockDevice`]
pub struct MockedFlicker {
    config: FlickerConfig,
    scenario: Scenario,
    setup: Vec<DeviceAction>,
    teardown: Vec<DeviceAction>,
    transitions: Vec<DeviceAction>,
}

/// Build a mocked flicker test context for [`test_scenario`]
#[must_use]
pub fn create_mocked_flicker(
    setup: Vec<DeviceAction>,
    teardown: Vec<DeviceAction>,
    transitions: Vec<DeviceAction>,
    config: FlickerConfig,
) -> MockedFlicker {
    MockedFlicker {
        config,
        scenario: test_scenario(),
        setup,
        teardown,
        transitions,
    }
}

impl MockedFlicker {
    /// Use another scenario
    #[must_use]
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = scenario;
        self
    }

    /// Scenario under test
    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &FlickerConfig {
        &self.config
    }

    /// Artifact directory
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Number of traced transitions
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Replay the actions on a fresh device and return the traced entries
    #[must_use]
    pub fn run(&self) -> Vec<MockEntrySubject> {
        let mut device = MockDevice::new();
        for action in &self.setup {
            action(&mut device);
        }

        device.tick();
        let mut entries = vec![device.snapshot()];
        for action in &self.transitions {
            action(&mut device);
            device.tick();
            entries.push(device.snapshot());
        }

        for action in &self.teardown {
            action(&mut device);
        }
        debug!(
            scenario = %self.scenario,
            entries = entries.len(),
            "mocked flicker run complete"
        );
        entries
    }

    /// Replay and wrap the entries in a generic trace subject
    #[must_use]
    pub fn capture(&self) -> TraceSubject<MockEntrySubject> {
        TraceSubject::new(self.run())
    }

    /// Replay and wrap the entries in a visibility trace subject
    #[must_use]
    pub fn capture_visibility(&self) -> VisibilityTraceSubject {
        VisibilityTraceSubject::new(self.run())
    }
}

impl std::fmt::Debug for MockedFlicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockedFlicker")
            .field("scenario", &self.scenario)
            .field("setup", &self.setup.len())
            .field("transitions", &self.transitions.len())
            .field("teardown", &self.teardown.len())
            .finish()
    }
}

/// Runs assertions against fresh captures and tracks the run status
#[derive(Debug)]
pub struct AssertionRunner<'a> {
    flicker: &'a MockedFlicker,
    status: RunStatus,
    executed: usize,
}

impl<'a> AssertionRunner<'a> {
    /// Create a runner for an executed flicker context
    #[must_use]
    pub fn new(flicker: &'a MockedFlicker) -> Self {
        Self {
            flicker,
            status: RunStatus::RunExecuted,
            executed: 0,
        }
    }

    /// Run one assertion; returns its failure, if any
    pub fn run_assertion<F>(&mut self, assertion: F) -> Option<crate::result::FlickerError>
    where
        F: FnOnce(VisibilityTraceSubject) -> FlickerResult<()>,
    {
        self.executed += 1;
        let result = assertion(self.flicker.capture_visibility());
        self.status = self.status.after_assertion(result.is_ok());
        result.err()
    }

    /// Current run status
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Number of assertions run
    #[must_use]
    pub const fn executed(&self) -> usize {
        self.executed
    }
}
