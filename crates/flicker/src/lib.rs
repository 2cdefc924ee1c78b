//! Flicker: temporal assertions over captured UI traces
//!
//! A trace is an ordered list of timestamped entries (frames or state
//! snapshots). Assertions are grouped into blocks; blocks must hold one after
//! the other over the trace, each taking over when the previous one stops
//! holding. Failures carry a structured, labeled report: what failed, where
//! (the blamed entry's timestamp), the supporting facts and a state dump.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    FLICKER Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Trace      │    │ Assertion  │    │ Subject    │            │
//! │   │ Subject    │───►│ Checker    │───►│ Error      │            │
//! │   │ (entries)  │    │ (blocks)   │    │ (facts)    │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```ignore
//! use flicker::prelude::*;
//!
//! VisibilityTraceSubject::new(entries)
//!     .is_visible("Launcher")
//!     .then()
//!     .is_invisible("Launcher")
//!     .for_all_entries()?;
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Named assertions, blocks and the block sequencer
#[allow(clippy::doc_markdown)]
pub mod assertion;
mod config;
mod fact;

/// Synthetic entries, scripted devices and trace files for tests
#[allow(clippy::panic, clippy::missing_panics_doc, clippy::doc_markdown)]
pub mod fixtures;
mod logging;
mod result;
mod subject;
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
mod timestamp;
mod trace;

pub use assertion::checker::{AssertionsBuilder, AssertionsChecker};
pub use assertion::{AssertionBlock, AssertionFn, BlockOutcome, NamedAssertion, OptionalFailure};
pub use config::{
    FlickerConfig, FlickerConfigBuilder, DEFAULT_ASSETS_DIR, DEFAULT_LOG_FILTER,
    DEFAULT_OUTPUT_DIR, ENV_ASSETS_DIR, ENV_LOG_FILTER, ENV_OUTPUT_DIR,
};
pub use fact::Fact;
pub use logging::{env_filter, init_logging};
pub use result::{FlickerError, FlickerResult};
pub use subject::{EntrySubject, FlickerSubjectError};
pub use timestamp::{format_duration_nanos, Timestamp};
pub use trace::TraceSubject;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::assertion::checker::*;
    pub use super::assertion::{AssertionBlock, NamedAssertion};
    pub use super::config::*;
    pub use super::fact::*;
    pub use super::fixtures::{MockEntrySubject, VisibilityTraceSubject};
    pub use super::logging::*;
    pub use super::result::*;
    pub use super::subject::*;
    pub use super::timestamp::*;
    pub use super::trace::*;
}
