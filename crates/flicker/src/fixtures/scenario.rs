//! Scenario naming and run status for fixture artifacts.

use crate::config::FlickerConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Class name used when a capture has no scenario
pub const UNNAMED_CAPTURE: &str = "UNNAMED_CAPTURE";

/// Display rotation at the start of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    /// Natural orientation
    #[default]
    Rotation0,
    /// 90 degrees
    Rotation90,
    /// 180 degrees
    Rotation180,
    /// 270 degrees
    Rotation270,
}

impl Rotation {
    /// Name used in artifact file names
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::Rotation0 => "ROTATION_0",
            Rotation::Rotation90 => "ROTATION_90",
            Rotation::Rotation180 => "ROTATION_180",
            Rotation::Rotation270 => "ROTATION_270",
        }
    }
}

/// Navigation bar mode of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavBarMode {
    /// Gesture navigation
    #[default]
    Gestural,
    /// Three button navigation
    ThreeButton,
}

impl NavBarMode {
    /// Name used in artifact file names
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NavBarMode::Gestural => "GESTURAL_NAV",
            NavBarMode::ThreeButton => "3_BUTTON_NAV",
        }
    }
}

/// One test scenario: the test class and the device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Test class name
    pub test_class: String,
    /// Rotation at start
    pub start_rotation: Rotation,
    /// Navigation mode
    pub nav_bar_mode: NavBarMode,
}

impl Scenario {
    /// Check if no test class was set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.test_class.is_empty()
    }

    /// Unique key used in artifact names
    #[must_use]
    pub fn key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.test_class,
            self.start_rotation.as_str(),
            self.nav_bar_mode.as_str()
        )
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Builder for `Scenario`
#[derive(Debug, Clone, Default)]
pub struct ScenarioBuilder {
    test_class: String,
    start_rotation: Rotation,
    nav_bar_mode: NavBarMode,
}

impl ScenarioBuilder {
    /// Create a builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the test class
    #[must_use]
    pub fn for_class(mut self, test_class: impl Into<String>) -> Self {
        self.test_class = test_class.into();
        self
    }

    /// Set the start rotation
    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.start_rotation = rotation;
        self
    }

    /// Set the navigation mode
    #[must_use]
    pub fn with_nav_bar_mode(mut self, mode: NavBarMode) -> Self {
        self.nav_bar_mode = mode;
        self
    }

    /// Build the scenario; an unset class becomes [`UNNAMED_CAPTURE`]
    #[must_use]
    pub fn build(self) -> Scenario {
        let test_class = if self.test_class.is_empty() {
            UNNAMED_CAPTURE.to_string()
        } else {
            self.test_class
        };
        Scenario {
            test_class,
            start_rotation: self.start_rotation,
            nav_bar_mode: self.nav_bar_mode,
        }
    }
}

/// The scenario used by the engine's own tests
#[must_use]
pub fn test_scenario() -> Scenario {
    ScenarioBuilder::new().for_class("test").build()
}

/// Outcome of a run, as recorded in artifact names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunStatus {
    /// Nothing ran yet
    #[default]
    Undefined,
    /// Transitions ran, no assertion yet
    RunExecuted,
    /// Transitions failed
    RunFailed,
    /// Traces could not be parsed
    ParsingFailure,
    /// All assertions passed so far
    AssertionSuccess,
    /// At least one assertion failed
    AssertionFailed,
}

impl RunStatus {
    /// File name prefix
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            RunStatus::Undefined => "UNDEFINED",
            RunStatus::RunExecuted => "EXECUTED",
            RunStatus::RunFailed => "FAILED_RUN",
            RunStatus::ParsingFailure => "FAILED_PARSING",
            RunStatus::AssertionSuccess => "PASS",
            RunStatus::AssertionFailed => "FAIL",
        }
    }

    /// Check if the run ended in a failure of any kind
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            RunStatus::RunFailed | RunStatus::ParsingFailure | RunStatus::AssertionFailed
        )
    }

    /// Status after one more assertion ran; a failure is sticky
    #[must_use]
    pub fn after_assertion(self, passed: bool) -> Self {
        match (self, passed) {
            (RunStatus::AssertionFailed, _) | (_, false) => RunStatus::AssertionFailed,
            (_, true) => RunStatus::AssertionSuccess,
        }
    }
}

/// Archive path of a run, e.g. `/sdcard/flicker/PASS_test_ROTATION_0_GESTURAL_NAV.zip`
#[must_use]
pub fn output_file_name(status: RunStatus, scenario: &Scenario, config: &FlickerConfig) -> PathBuf {
    config
        .output_dir
        .join(format!("{}_{}.zip", status.prefix(), scenario))
}
