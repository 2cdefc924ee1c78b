//! Synthetic entries and a visibility trace subject built on them.

use crate::fact::Fact;
use crate::result::FlickerResult;
use crate::subject::{EntrySubject, FlickerSubjectError};
use crate::timestamp::Timestamp;
use crate::trace::TraceSubject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Spacing of entries produced by [`trace_from_sets`]
pub const ENTRY_SPACING_NANOS: i64 = 1_000_000;

/// One synthetic snapshot: a timestamp and the ids visible on screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockEntrySubject {
    /// Capture time
    pub timestamp: Timestamp,
    /// Ids of visible elements
    pub visible: BTreeSet<String>,
    /// Free-form state name, e.g. the focused window
    #[serde(default)]
    pub state: String,
}

impl MockEntrySubject {
    /// Create an entry
    #[must_use]
    pub fn new<I, S>(timestamp: Timestamp, visible: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            timestamp,
            visible: visible.into_iter().map(Into::into).collect(),
            state: String::new(),
        }
    }

    /// Set the state name
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Check if an element is visible
    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    /// Fail unless `id` is visible
    pub fn check_visible(&self, id: &str) -> Result<(), FlickerSubjectError> {
        if self.is_visible(id) {
            Ok(())
        } else {
            Err(self.fail_with_facts(
                format!("{id} is not visible"),
                vec![Fact::new("Expected visible", id)],
            ))
        }
    }

    /// Fail if `id` is visible
    pub fn check_invisible(&self, id: &str) -> Result<(), FlickerSubjectError> {
        if self.is_visible(id) {
            Err(self.fail_with_facts(
                format!("{id} is visible"),
                vec![Fact::new("Expected invisible", id)],
            ))
        } else {
            Ok(())
        }
    }
}

impl EntrySubject for MockEntrySubject {
    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn self_facts(&self) -> Vec<Fact> {
        if self.state.is_empty() {
            Vec::new()
        } else {
            vec![Fact::new("State name", &self.state)]
        }
    }

    fn state_dump(&self) -> Option<String> {
        let visible = self.visible.iter().cloned().collect::<Vec<_>>().join(", ");
        Some(format!("state: {}\nvisible: [{visible}]", self.state))
    }
}

/// Entries from per-entry visible id sets, 1ms apart starting at 1ms
#[must_use]
pub fn trace_from_sets(sets: &[&[&str]]) -> Vec<MockEntrySubject> {
    sets.iter()
        .enumerate()
        .map(|(i, ids)| {
            let ts = (i as i64 + 1) * ENTRY_SPACING_NANOS;
            MockEntrySubject::new(Timestamp::from_elapsed_nanos(ts), ids.iter().copied())
        })
        .collect()
}

/// Trace subject over [`MockEntrySubject`]s with visibility assertions
#[derive(Debug)]
pub struct VisibilityTraceSubject {
    inner: TraceSubject<MockEntrySubject>,
}

impl VisibilityTraceSubject {
    /// Wrap entries
    #[must_use]
    pub fn new(entries: Vec<MockEntrySubject>) -> Self {
        Self {
            inner: TraceSubject::new(entries),
        }
    }

    /// Build from per-entry visible id sets
    #[must_use]
    pub fn from_sets(sets: &[&[&str]]) -> Self {
        Self::new(trace_from_sets(sets))
    }

    /// Assert `id` is visible
    #[must_use]
    pub fn is_visible(self, id: impl Into<String>) -> Self {
        let id = id.into();
        let name = format!("isVisible({id})");
        let check = move |e: &MockEntrySubject| e.check_visible(&id);
        self.map(|t| t.add_required(name, check))
    }

    /// Assert `id` is invisible
    #[must_use]
    pub fn is_invisible(self, id: impl Into<String>) -> Self {
        let id = id.into();
        let name = format!("isInvisible({id})");
        let check = move |e: &MockEntrySubject| e.check_invisible(&id);
        self.map(|t| t.add_required(name, check))
    }

    /// Assert `id` is visible, tolerating failures
    #[must_use]
    pub fn is_visible_optional(self, id: impl Into<String>) -> Self {
        let id = id.into();
        let name = format!("isVisible({id})");
        let check = move |e: &MockEntrySubject| e.check_visible(&id);
        self.map(|t| t.add_assertion(name, true, check))
    }

    /// Close the current assertion block
    #[must_use]
    pub fn then(self) -> Self {
        self.map(TraceSubject::then)
    }

    /// Ignore leading entries until the first assertion passes
    #[must_use]
    pub fn skip_until_first_assertion(self) -> Self {
        self.map(TraceSubject::skip_until_first_assertion)
    }

    /// Check if no assertion was declared
    #[must_use]
    pub fn is_assertions_empty(&self) -> bool {
        self.inner.is_assertions_empty()
    }

    /// Run the declared assertions
    pub fn for_all_entries(self) -> FlickerResult<()> {
        self.inner.for_all_entries()
    }

    /// First entry
    pub fn first(&self) -> FlickerResult<&MockEntrySubject> {
        self.inner.first()
    }

    /// Last entry
    pub fn last(&self) -> FlickerResult<&MockEntrySubject> {
        self.inner.last()
    }

    /// Check that no element is visible in a single entry only
    pub fn visible_entries_shown_more_than_one_consecutive_time(&self) -> FlickerResult<()> {
        self.inner
            .visible_entries_shown_more_than_one_consecutive_time(|e| e.visible.clone())
    }

    /// The wrapped generic subject
    #[must_use]
    pub fn inner(&self) -> &TraceSubject<MockEntrySubject> {
        &self.inner
    }

    fn map<F>(self, f: F) -> Self
    where
        F: FnOnce(TraceSubject<MockEntrySubject>) -> TraceSubject<MockEntrySubject>,
    {
        Self {
            inner: f(self.inner),
        }
    }
}
