//! Assertion Block Checker
//!
//! Runs ordered assertion blocks over the entries of a trace.
//!
//! A block stays active across consecutive entries for as long as it holds.
//! Once it has held at least once and then fails, the checker moves to the
//! next block and re-evaluates the same entry against it. The final block
//! must hold until the end of the trace.
//!
//! ```text
//!   entries:  e0   e1   e2   e3   e4
//!   blocks:   [A]  [A]  [A]  [B]  [B]     A.then(B)
//!                            ^ A fails here, B takes over on e3
//! ```

use super::{AssertionBlock, NamedAssertion};
use crate::fact::Fact;
use crate::subject::{EntrySubject, FlickerSubjectError};
use tracing::{debug, trace};

/// Accumulates assertion blocks before a check runs
pub struct AssertionsBuilder<E> {
    blocks: Vec<AssertionBlock<E>>,
    skip_until_first_assertion: bool,
}

impl<E> AssertionsBuilder<E> {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            skip_until_first_assertion: false,
        }
    }

    /// Start a new block holding one assertion
    pub fn add<F>(&mut self, name: impl Into<String>, is_optional: bool, predicate: F) -> &mut Self
    where
        F: Fn(&E) -> Result<(), FlickerSubjectError> + 'static,
    {
        let assertion = NamedAssertion::new(name, is_optional, predicate);
        match self.blocks.last_mut() {
            // An open empty block left by `start_block` takes the assertion.
            Some(block) if block.is_empty() => block.push(assertion),
            _ => self.blocks.push(AssertionBlock::with_assertion(assertion)),
        }
        self
    }

    /// Add an assertion to the last block, or start one if there is none
    pub fn append<F>(
        &mut self,
        name: impl Into<String>,
        is_optional: bool,
        predicate: F,
    ) -> &mut Self
    where
        F: Fn(&E) -> Result<(), FlickerSubjectError> + 'static,
    {
        match self.blocks.last_mut() {
            Some(block) => block.push(NamedAssertion::new(name, is_optional, predicate)),
            None => {
                self.add(name, is_optional, predicate);
            }
        }
        self
    }

    /// Make the next appended assertion start a new block
    pub fn start_block(&mut self) -> &mut Self {
        if self.blocks.last().is_some_and(|block| !block.is_empty()) {
            self.blocks.push(AssertionBlock::new());
        }
        self
    }

    /// Ignore leading entries until the first block passes
    pub fn skip_until_first_assertion(&mut self) -> &mut Self {
        self.skip_until_first_assertion = true;
        self
    }

    /// Check if no assertion was declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(AssertionBlock::is_empty)
    }

    /// Number of non-empty blocks declared so far
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.iter().filter(|block| !block.is_empty()).count()
    }

    /// Finalize into an immutable checker
    #[must_use]
    pub fn build(mut self) -> AssertionsChecker<E> {
        self.blocks.retain(|block| !block.is_empty());
        AssertionsChecker {
            blocks: self.blocks,
            skip_until_first_assertion: self.skip_until_first_assertion,
        }
    }
}

impl<E> Default for AssertionsBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for AssertionsBuilder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssertionsBuilder")
            .field("blocks", &self.blocks)
            .field(
                "skip_until_first_assertion",
                &self.skip_until_first_assertion,
            )
            .finish()
    }
}

/// Finalized, ordered assertion blocks
pub struct AssertionsChecker<E> {
    blocks: Vec<AssertionBlock<E>>,
    skip_until_first_assertion: bool,
}

impl<E> AssertionsChecker<E> {
    /// Create a builder
    #[must_use]
    pub fn builder() -> AssertionsBuilder<E> {
        AssertionsBuilder::new()
    }

    /// Check if no block was declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of blocks
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Blocks in evaluation order
    #[must_use]
    pub fn blocks(&self) -> &[AssertionBlock<E>] {
        &self.blocks
    }

    /// Whether leading entries failing the first block are ignored
    #[must_use]
    pub const fn skips_until_first_assertion(&self) -> bool {
        self.skip_until_first_assertion
    }
}

impl<E: EntrySubject> AssertionsChecker<E> {
    /// Run the blocks over `entries`, in order
    ///
    /// # Errors
    ///
    /// Returns the failure of the first required assertion that breaks the
    /// block sequence, or a "never satisfied" failure when the trace ends
    /// before a required block is reached.
    pub fn test(&self, entries: &[E]) -> Result<(), FlickerSubjectError> {
        let Some(last_entry) = entries.last() else {
            return Ok(());
        };
        if self.blocks.is_empty() {
            return Ok(());
        }

        let block_count = self.blocks.len();
        let mut entry_index = 0;
        let mut block_index = 0;
        let mut last_passed: Option<usize> = None;
        let mut skipped_failure: Option<FlickerSubjectError> = None;
        let mut optional_facts: Vec<Fact> = Vec::new();

        while block_index < block_count && entry_index < entries.len() {
            let block = &self.blocks[block_index];
            let entry = &entries[entry_index];
            trace!(
                "{}/{}:[{}] entry {}/{} {}",
                block_index + 1,
                block_count,
                block.name(),
                entry_index + 1,
                entries.len(),
                entry.timestamp()
            );

            let failure = match block.check(entry) {
                Ok(outcome) => {
                    for optional in outcome.optional_failures {
                        debug!(
                            assertion = %optional.name,
                            timestamp = %entry.timestamp(),
                            "optional assertion failed: {}",
                            optional.failure.what()
                        );
                        optional_facts.push(Fact::new(
                            "Optional assertion failed",
                            format!(
                                "{} at {}: {}",
                                optional.name,
                                entry.timestamp(),
                                optional.failure.what()
                            ),
                        ));
                    }
                    last_passed = Some(block_index);
                    entry_index += 1;
                    continue;
                }
                Err(failure) => failure,
            };

            if self.skip_until_first_assertion && last_passed.is_none() {
                debug!(
                    entry = entry_index + 1,
                    "skipping entry before first assertion passes"
                );
                skipped_failure.get_or_insert(failure);
                entry_index += 1;
                continue;
            }

            if block.is_optional() {
                debug!(block = %block.name(), "optional block failed, moving to next block");
                last_passed = Some(block_index);
                block_index += 1;
                continue;
            }

            if last_passed != Some(block_index) || block_index + 1 == block_count {
                return Err(self.describe(
                    failure,
                    block_index,
                    entry_index,
                    entries.len(),
                    &optional_facts,
                ));
            }

            debug!(
                from = %block.name(),
                entry = entry_index + 1,
                "assertion block satisfied, advancing"
            );
            block_index += 1;
        }

        if last_passed.is_none() {
            if let Some(failure) = skipped_failure {
                return Err(self
                    .describe(failure, 0, 0, entries.len(), &optional_facts)
                    .with_fact("Skipped entries", entries.len()));
            }
        }

        let pending = self
            .blocks
            .iter()
            .skip(block_index + 1)
            .find(|block| block.has_required());
        if let Some(pending) = pending {
            let passed = self.blocks[..=block_index.min(block_count - 1)]
                .iter()
                .map(AssertionBlock::name)
                .collect::<Vec<_>>()
                .join(", ");
            let untested = self
                .blocks
                .iter()
                .skip(block_index + 1)
                .map(AssertionBlock::name)
                .collect::<Vec<_>>()
                .join(", ");
            let first_name = pending
                .assertions()
                .first()
                .map(NamedAssertion::name)
                .unwrap_or_default();
            let facts = vec![
                Fact::new("Assertion", first_name),
                Fact::new("Last entry examined", last_entry.timestamp()),
                Fact::new("Passed assertions", passed),
                Fact::new("Untested assertions", untested),
            ];
            return Err(last_entry
                .fail_with_facts(
                    format!("Assertion block never satisfied: {}", pending.name()),
                    facts,
                )
                .with_facts(optional_facts));
        }

        Ok(())
    }

    fn describe(
        &self,
        failure: FlickerSubjectError,
        block_index: usize,
        entry_index: usize,
        entry_count: usize,
        optional_facts: &[Fact],
    ) -> FlickerSubjectError {
        let block = &self.blocks[block_index];
        let total = self.blocks.len();
        failure
            .with_fact(
                "Assertion block",
                format!("{}/{total}: {}", block_index + 1, block.name()),
            )
            .with_fact("Entry", format!("{}/{}", entry_index + 1, entry_count))
            .with_facts(optional_facts.iter().cloned())
    }
}

impl<E> std::fmt::Debug for AssertionsChecker<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssertionsChecker")
            .field("blocks", &self.blocks)
            .field(
                "skip_until_first_assertion",
                &self.skip_until_first_assertion,
            )
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;

    #[derive(Debug)]
    struct Entry {
        ts: i64,
        value: i32,
    }

    impl EntrySubject for Entry {
        fn timestamp(&self) -> Timestamp {
            Timestamp::from_elapsed_nanos(self.ts)
        }
    }

    fn entries(values: &[i32]) -> Vec<Entry> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| Entry {
                ts: (i as i64 + 1) * 10,
                value,
            })
            .collect()
    }

    fn value_is(expected: i32) -> impl Fn(&Entry) -> Result<(), FlickerSubjectError> {
        move |e: &Entry| {
            if e.value == expected {
                Ok(())
            } else {
                Err(e.fail(format!("expected {expected}, got {}", e.value)))
            }
        }
    }

    fn sequence(expected: &[i32]) -> AssertionsChecker<Entry> {
        let mut builder = AssertionsChecker::builder();
        for &value in expected {
            builder.add(format!("is{value}"), false, value_is(value));
        }
        builder.build()
    }

    mod builder {
        use super::*;

        #[test]
        fn test_new_builder_is_empty() {
            let builder = AssertionsBuilder::<Entry>::new();
            assert!(builder.is_empty());
            assert!(builder.build().is_empty());
        }

        #[test]
        fn test_add_starts_new_block() {
            let mut builder = AssertionsBuilder::new();
            builder
                .add("a", false, value_is(1))
                .add("b", false, value_is(2));
            assert_eq!(builder.block_count(), 2);
        }

        #[test]
        fn test_append_extends_last_block() {
            let mut builder = AssertionsBuilder::new();
            builder
                .add("a", false, value_is(1))
                .append("b", true, value_is(2));
            let checker = builder.build();
            assert_eq!(checker.len(), 1);
            assert_eq!(checker.blocks()[0].name(), "a and b");
        }

        #[test]
        fn test_append_without_block_behaves_like_add() {
            let mut builder = AssertionsBuilder::new();
            builder.append("a", false, value_is(1));
            assert_eq!(builder.block_count(), 1);
            assert!(!builder.is_empty());
        }

        #[test]
        fn test_start_block_separates_appends() {
            let mut builder = AssertionsBuilder::new();
            builder
                .append("a", false, value_is(1))
                .start_block()
                .start_block()
                .append("b", false, value_is(2));
            let checker = builder.build();
            assert_eq!(checker.len(), 2);
            assert_eq!(checker.blocks()[1].name(), "b");
        }

        #[test]
        fn test_trailing_start_block_is_dropped() {
            let mut builder = AssertionsBuilder::new();
            builder.append("a", false, value_is(1)).start_block();
            assert_eq!(builder.build().len(), 1);
        }

        #[test]
        fn test_skip_flag_survives_build() {
            let mut builder = AssertionsBuilder::new();
            builder
                .add("a", false, value_is(1))
                .skip_until_first_assertion();
            assert!(builder.build().skips_until_first_assertion());
        }
    }

    mod sequencing {
        use super::*;

        #[test]
        fn test_empty_checker_passes() {
            let checker = AssertionsChecker::<Entry>::builder().build();
            assert!(checker.test(&entries(&[1, 2, 3])).is_ok());
        }

        #[test]
        fn test_empty_trace_passes() {
            assert!(sequence(&[1]).test(&[]).is_ok());
        }

        #[test]
        fn test_single_block_holds_for_all_entries() {
            assert!(sequence(&[1]).test(&entries(&[1, 1, 1])).is_ok());
        }

        #[test]
        fn test_always_failing_assertion_reports_reason() {
            let err = sequence(&[9]).test(&entries(&[1, 2])).unwrap_err();
            assert_eq!(err.what(), "expected 9, got 1");
            assert_eq!(err.timestamp(), Timestamp::from_elapsed_nanos(10));
            assert_eq!(err.fact_values("Assertion"), vec!["is9"]);
            assert_eq!(err.fact_values("Entry"), vec!["1/2"]);
            assert_eq!(err.fact_values("Assertion block"), vec!["1/1: is9"]);
        }

        #[test]
        fn test_transition_between_blocks() {
            assert!(sequence(&[1, 2]).test(&entries(&[1, 1, 2, 2])).is_ok());
            assert!(sequence(&[1, 2, 3]).test(&entries(&[1, 2, 3])).is_ok());
        }

        #[test]
        fn test_last_block_must_hold_until_end() {
            let err = sequence(&[1, 2]).test(&entries(&[1, 2, 1])).unwrap_err();
            assert_eq!(err.what(), "expected 2, got 1");
            assert_eq!(err.fact_values("Entry"), vec!["3/3"]);
        }

        #[test]
        fn test_first_block_must_hold_on_first_entry() {
            let err = sequence(&[1, 2]).test(&entries(&[2, 2])).unwrap_err();
            assert_eq!(err.what(), "expected 1, got 2");
            assert_eq!(err.fact_values("Entry"), vec!["1/2"]);
        }

        #[test]
        fn test_skipping_a_block_fails_on_next() {
            let err = sequence(&[1, 2, 3]).test(&entries(&[1, 3])).unwrap_err();
            assert_eq!(err.what(), "expected 2, got 3");
            assert_eq!(err.fact_values("Assertion block"), vec!["2/3: is2"]);
        }

        #[test]
        fn test_block_never_satisfied_at_end_of_trace() {
            let err = sequence(&[1, 2]).test(&entries(&[1, 1])).unwrap_err();
            assert_eq!(err.what(), "Assertion block never satisfied: is2");
            assert_eq!(err.timestamp(), Timestamp::from_elapsed_nanos(20));
            assert_eq!(err.fact_values("Assertion"), vec!["is2"]);
            assert_eq!(err.fact_values("Passed assertions"), vec!["is1"]);
            assert_eq!(err.fact_values("Untested assertions"), vec!["is2"]);
        }

        #[test]
        fn test_new_block_never_merges_with_previous() {
            // Same predicates, one block versus two blocks.
            let mut merged = AssertionsChecker::builder();
            merged
                .add("is1", false, value_is(1))
                .append("is1 again", false, value_is(1));
            assert!(merged.build().test(&entries(&[1, 1])).is_ok());

            let mut split = AssertionsChecker::builder();
            split
                .add("is1", false, value_is(1))
                .start_block()
                .append("is2", false, value_is(2));
            assert!(split.build().test(&entries(&[1, 1])).is_err());
        }
    }

    mod optional {
        use super::*;

        #[test]
        fn test_optional_block_is_skipped_when_failing() {
            let mut builder = AssertionsChecker::builder();
            builder
                .add("is1", false, value_is(1))
                .add("is5", true, value_is(5))
                .add("is2", false, value_is(2));
            assert!(builder.build().test(&entries(&[1, 2])).is_ok());
        }

        #[test]
        fn test_optional_block_used_when_passing() {
            let mut builder = AssertionsChecker::builder();
            builder
                .add("is1", false, value_is(1))
                .add("is5", true, value_is(5))
                .add("is2", false, value_is(2));
            assert!(builder.build().test(&entries(&[1, 5, 5, 2])).is_ok());
        }

        #[test]
        fn test_failing_optional_block_hands_over_on_same_entry() {
            let mut builder = AssertionsChecker::builder();
            builder
                .add("is1", false, value_is(1))
                .add("is5", true, value_is(5))
                .add("is2", false, value_is(2));
            let err = builder.build().test(&entries(&[1, 3])).unwrap_err();
            assert_eq!(err.what(), "expected 2, got 3");
            assert_eq!(err.fact_values("Assertion block"), vec!["3/3: is2"]);
            assert_eq!(err.fact_values("Entry"), vec!["2/2"]);
        }

        #[test]
        fn test_leading_optional_block_skipped_on_first_entry() {
            let mut builder = AssertionsChecker::builder();
            builder
                .add("is5", true, value_is(5))
                .add("is2", false, value_is(2));
            assert!(builder.build().test(&entries(&[2, 2])).is_ok());
        }

        #[test]
        fn test_trailing_optional_block_may_stay_untested() {
            let mut builder = AssertionsChecker::builder();
            builder
                .add("is1", false, value_is(1))
                .add("is5", true, value_is(5));
            assert!(builder.build().test(&entries(&[1, 1])).is_ok());
        }

        #[test]
        fn test_optional_assertion_failure_is_recorded_in_facts() {
            let mut builder = AssertionsChecker::builder();
            builder
                .add("is1", false, value_is(1))
                .append("is7", true, value_is(7))
                .add("is2", false, value_is(2));
            let err = builder.build().test(&entries(&[1, 3])).unwrap_err();
            assert_eq!(err.what(), "expected 2, got 3");
            let recorded = err.fact_values("Optional assertion failed");
            assert_eq!(recorded.len(), 1);
            assert!(recorded[0].starts_with("is7"));
        }
    }

    mod skip_mode {
        use super::*;

        fn skipping(expected: &[i32]) -> AssertionsChecker<Entry> {
            let mut builder = AssertionsChecker::builder();
            for &value in expected {
                builder.add(format!("is{value}"), false, value_is(value));
            }
            builder.skip_until_first_assertion();
            builder.build()
        }

        #[test]
        fn test_skips_leading_entries() {
            let trace = entries(&[0, 0, 1, 2, 2]);
            assert!(skipping(&[1, 2]).test(&trace).is_ok());

            let err = sequence(&[1, 2]).test(&trace).unwrap_err();
            assert_eq!(err.fact_values("Entry"), vec!["1/5"]);
        }

        #[test]
        fn test_exhaustion_reports_original_failure() {
            let err = skipping(&[1]).test(&entries(&[0, 3])).unwrap_err();
            assert_eq!(err.what(), "expected 1, got 0");
            assert_eq!(err.timestamp(), Timestamp::from_elapsed_nanos(10));
            assert_eq!(err.fact_values("Skipped entries"), vec!["2"]);
        }

        #[test]
        fn test_later_blocks_checked_normally() {
            let err = skipping(&[1, 2]).test(&entries(&[0, 1, 3])).unwrap_err();
            assert_eq!(err.what(), "expected 2, got 3");
        }
    }
}
