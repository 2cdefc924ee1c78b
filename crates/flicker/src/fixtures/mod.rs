//! Fixtures for testing flicker assertions without a device.
//!
//! Everything here is built from explicit parameters: synthetic entries,
//! a scripted [`MockDevice`] driven by setup/transition/teardown actions,
//! scenario naming and trace files on disk.
//!
//! ## Example
//!
//! ```rust,ignore
//! use flicker::fixtures::{create_mocked_flicker, MockDevice};
//! use flicker::FlickerConfig;
//!
//! let flicker = create_mocked_flicker(
//!     vec![Box::new(|d: &mut MockDevice| d.show("Launcher"))],
//!     vec![],
//!     vec![
//!         Box::new(|d: &mut MockDevice| d.show("App")),
//!         Box::new(|d: &mut MockDevice| d.hide("Launcher")),
//!     ],
//!     FlickerConfig::default(),
//! );
//! flicker
//!     .capture_visibility()
//!     .is_visible("Launcher")
//!     .then()
//!     .is_invisible("Launcher")
//!     .for_all_entries()?;
//! ```

pub mod asserts;
pub mod entry;
pub mod files;
pub mod harness;
pub mod scenario;
pub mod strategies;

pub use asserts::{
    assert_error_contains_debug_info, assert_error_message, assert_failure_fact,
    expect_assertion_failure,
};
pub use entry::{trace_from_sets, MockEntrySubject, VisibilityTraceSubject};
pub use files::{
    delete_if_exists, get_scenario_traces, read_asset, read_trace_from_file, read_trace_window,
    write_trace, TraceFiles, SCENARIO_TRACE_NAMES, TRACE_EXT,
};
pub use harness::{create_mocked_flicker, AssertionRunner, DeviceAction, MockDevice, MockedFlicker};
pub use scenario::{
    output_file_name, test_scenario, NavBarMode, Rotation, RunStatus, Scenario, ScenarioBuilder,
};
pub use strategies::{app_launch_trace, splash_flicker_trace, ELEMENT_IDS};
#[cfg(feature = "proptest")]
pub use strategies::{any_visibility_trace, flicker_free_trace, visibility_set};
