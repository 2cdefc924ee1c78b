//! Trace subjects.
//!
//! A [`TraceSubject`] owns the ordered entries of one captured trace and the
//! assertion blocks declared against it. Declaration is a by-value builder
//! chain; [`TraceSubject::for_all_entries`] consumes the subject, finalizes the
//! blocks and runs them.
//!
//! ```ignore
//! TraceSubject::new(entries)
//!     .add_required("isVisible(StatusBar)", |e| e.check_visible("StatusBar"))
//!     .then()
//!     .add_required("isInvisible(StatusBar)", |e| e.check_invisible("StatusBar"))
//!     .for_all_entries()?;
//! ```

use crate::assertion::checker::AssertionsBuilder;
use crate::fact::Fact;
use crate::result::{FlickerError, FlickerResult};
use crate::subject::{EntrySubject, FlickerSubjectError};
use crate::timestamp::Timestamp;
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

/// Assertion target over all entries of one trace
pub struct TraceSubject<E> {
    subjects: Vec<E>,
    assertions: AssertionsBuilder<E>,
}

impl<E: EntrySubject> TraceSubject<E> {
    /// Wrap the entries of a parsed trace, in capture order
    #[must_use]
    pub fn new(subjects: Vec<E>) -> Self {
        Self {
            subjects,
            assertions: AssertionsBuilder::new(),
        }
    }

    /// Entries in capture order
    #[must_use]
    pub fn subjects(&self) -> &[E] {
        &self.subjects
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Check if the trace has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Timestamp of the first entry, or the empty timestamp
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.subjects
            .first()
            .map_or_else(Timestamp::empty, EntrySubject::timestamp)
    }

    /// "Trace start" and "Trace end" facts
    #[must_use]
    pub fn self_facts(&self) -> Vec<Fact> {
        let start = self
            .subjects
            .first()
            .map_or_else(Timestamp::empty, EntrySubject::timestamp);
        let end = self
            .subjects
            .last()
            .map_or_else(Timestamp::empty, EntrySubject::timestamp);
        vec![Fact::new("Trace start", start), Fact::new("Trace end", end)]
    }

    /// Add an assertion to the current block, or to a new block after [`then`](Self::then)
    #[must_use]
    pub fn add_assertion<F>(
        mut self,
        name: impl Into<String>,
        is_optional: bool,
        assertion: F,
    ) -> Self
    where
        F: Fn(&E) -> Result<(), FlickerSubjectError> + 'static,
    {
        self.assertions.append(name, is_optional, assertion);
        self
    }

    /// Add an assertion that must pass
    #[must_use]
    pub fn add_required<F>(self, name: impl Into<String>, assertion: F) -> Self
    where
        F: Fn(&E) -> Result<(), FlickerSubjectError> + 'static,
    {
        self.add_assertion(name, false, assertion)
    }

    /// Close the current assertion block
    ///
    /// `a().then().b()` produces two blocks; `b` is only checked once `a`
    /// held and then stopped holding.
    #[must_use]
    pub fn then(mut self) -> Self {
        self.assertions.start_block();
        self
    }

    /// Ignore the first entries until the first assertion passes
    ///
    /// If no entry passes it, the failure of the first assertion is returned.
    #[must_use]
    pub fn skip_until_first_assertion(mut self) -> Self {
        self.assertions.skip_until_first_assertion();
        self
    }

    /// Check if no assertion was declared
    #[must_use]
    pub fn is_assertions_empty(&self) -> bool {
        self.assertions.is_empty()
    }

    /// Run the declared assertion blocks over all entries
    ///
    /// # Errors
    ///
    /// [`FlickerError::EmptyTrace`] without entries, otherwise the first
    /// assertion failure with the trace start/end facts attached.
    pub fn for_all_entries(self) -> FlickerResult<()> {
        if self.subjects.is_empty() {
            return Err(FlickerError::EmptyTrace);
        }
        if self.assertions.is_empty() {
            warn!(trace = %self, "no assertions declared, nothing to check");
        }
        let trace_facts = self.self_facts();
        let checker = self.assertions.build();
        checker
            .test(&self.subjects)
            .map_err(|failure| failure.with_trace_facts(trace_facts).into())
    }

    /// First entry of the trace
    ///
    /// # Errors
    ///
    /// [`FlickerError::EmptyTrace`] without entries.
    pub fn first(&self) -> FlickerResult<&E> {
        self.subjects.first().ok_or(FlickerError::EmptyTrace)
    }

    /// Last entry of the trace
    ///
    /// # Errors
    ///
    /// [`FlickerError::EmptyTrace`] without entries.
    pub fn last(&self) -> FlickerResult<&E> {
        self.subjects.last().ok_or(FlickerError::EmptyTrace)
    }

    /// Check that every visible element stays visible for at least two
    /// consecutive entries
    ///
    /// Traces only log an entry when something changes, so an element seen
    /// only in the first or last entry may have been on screen before or
    /// after the capture; those are not flickers. The first and last entries
    /// are duplicated before scanning to exempt them.
    ///
    /// An element that disappears after a single entry is blamed on that
    /// entry; elements still pending at the end are blamed on the last one.
    ///
    /// # Errors
    ///
    /// The first offending set of element ids, as an assertion failure.
    pub fn visible_entries_shown_more_than_one_consecutive_time<F>(
        &self,
        visible_entries_provider: F,
    ) -> FlickerResult<()>
    where
        F: Fn(&E) -> BTreeSet<String>,
    {
        let (Some(first), Some(last)) = (self.subjects.first(), self.subjects.last()) else {
            return Ok(());
        };
        let padded: Vec<&E> = std::iter::once(first)
            .chain(self.subjects.iter())
            .chain(std::iter::once(last))
            .collect();

        let mut last_visible = visible_entries_provider(padded[0]);
        let mut pending = last_visible.clone();

        for (index, entry) in padded.iter().enumerate().skip(1) {
            let current_visible = visible_entries_provider(*entry);
            let newly_visible: BTreeSet<String> =
                current_visible.difference(&last_visible).cloned().collect();
            pending.retain(|id| !current_visible.contains(id));

            if !pending.is_empty() {
                return Err(self.flicker_failure(padded[index - 1], &pending));
            }
            pending.extend(newly_visible);
            last_visible = current_visible;
        }

        if !pending.is_empty() {
            return Err(self.flicker_failure(last, &pending));
        }
        Ok(())
    }

    fn flicker_failure(&self, entry: &E, ids: &BTreeSet<String>) -> FlickerError {
        let names = ids.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        entry
            .fail_with_facts(
                format!("[{names}] is not visible for 2 entries"),
                vec![Fact::new("Entry timestamp", entry.timestamp())],
            )
            .with_trace_facts(self.self_facts())
            .into()
    }
}

impl<E: EntrySubject> fmt::Display for TraceSubject<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self
            .subjects
            .first()
            .map_or_else(|| "0".to_string(), |e| e.timestamp().to_string());
        let end = self
            .subjects
            .last()
            .map_or_else(|| "0".to_string(), |e| e.timestamp().to_string());
        write!(f, "TraceSubject({start},{end})")
    }
}

impl<E> fmt::Debug for TraceSubject<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceSubject")
            .field("entries", &self.subjects.len())
            .field("assertions", &self.assertions)
            .finish()
    }
}
