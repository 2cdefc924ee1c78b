//! Proptest strategies for synthetic visibility traces.
//!
//! Ids are drawn from a small alphabet so that generated traces actually
//! overlap between entries.
//!
//! ```rust,ignore
//! proptest! {
//!     #[test]
//!     fn prop_runs_never_flicker(entries in flicker_free_trace()) {
//!         let subject = VisibilityTraceSubject::new(entries);
//!         prop_assert!(subject.visible_entries_shown_more_than_one_consecutive_time().is_ok());
//!     }
//! }
//! ```

use super::entry::{trace_from_sets, MockEntrySubject};

#[cfg(feature = "proptest")]
use super::entry::ENTRY_SPACING_NANOS;
#[cfg(feature = "proptest")]
use crate::timestamp::Timestamp;
#[cfg(feature = "proptest")]
use proptest::prelude::*;
#[cfg(feature = "proptest")]
use std::collections::BTreeSet;

/// Ids used by generated traces
pub const ELEMENT_IDS: [&str; 5] = ["StatusBar", "NavBar", "Launcher", "App", "Splash"];

/// Generate a set of visible ids
#[cfg(feature = "proptest")]
pub fn visibility_set() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::sample::subsequence(ELEMENT_IDS.to_vec(), 0..=ELEMENT_IDS.len())
        .prop_map(|ids| ids.into_iter().map(str::to_string).collect())
}

/// Generate any trace of 1 to 12 entries
#[cfg(feature = "proptest")]
pub fn any_visibility_trace() -> impl Strategy<Value = Vec<MockEntrySubject>> {
    prop::collection::vec(visibility_set(), 1..=12).prop_map(entries_from)
}

/// Generate a trace in which every visible set lasts at least two entries
#[cfg(feature = "proptest")]
pub fn flicker_free_trace() -> impl Strategy<Value = Vec<MockEntrySubject>> {
    prop::collection::vec((visibility_set(), 2usize..4), 1..6).prop_map(|runs| {
        let sets = runs
            .into_iter()
            .flat_map(|(set, len)| std::iter::repeat(set).take(len))
            .collect();
        entries_from(sets)
    })
}

#[cfg(feature = "proptest")]
fn entries_from(sets: Vec<BTreeSet<String>>) -> Vec<MockEntrySubject> {
    sets.into_iter()
        .enumerate()
        .map(|(i, visible)| MockEntrySubject {
            timestamp: Timestamp::from_elapsed_nanos((i as i64 + 1) * ENTRY_SPACING_NANOS),
            visible,
            state: String::new(),
        })
        .collect()
}

// Canned traces for use without the feature

/// App launch: the launcher hands over to the app without flicker
#[must_use]
pub fn app_launch_trace() -> Vec<MockEntrySubject> {
    trace_from_sets(&[
        &["StatusBar", "Launcher"],
        &["StatusBar", "Launcher", "App"],
        &["StatusBar", "App"],
        &["StatusBar", "App"],
    ])
}

/// A splash screen shown for a single entry in the middle of the trace
#[must_use]
pub fn splash_flicker_trace() -> Vec<MockEntrySubject> {
    trace_from_sets(&[
        &["StatusBar", "Launcher"],
        &["StatusBar", "Launcher"],
        &["StatusBar", "Splash"],
        &["StatusBar", "App"],
        &["StatusBar", "App"],
    ])
}
