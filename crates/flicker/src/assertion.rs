//! Named assertions over trace entries, grouped into assertion blocks.

pub mod checker;

use crate::subject::FlickerSubjectError;
use std::fmt;

/// Predicate over one entry subject
pub type AssertionFn<E> = Box<dyn Fn(&E) -> Result<(), FlickerSubjectError>>;

/// A named check over one entry
pub struct NamedAssertion<E> {
    name: String,
    is_optional: bool,
    predicate: AssertionFn<E>,
}

impl<E> NamedAssertion<E> {
    /// Create a new assertion
    #[must_use]
    pub fn new<F>(name: impl Into<String>, is_optional: bool, predicate: F) -> Self
    where
        F: Fn(&E) -> Result<(), FlickerSubjectError> + 'static,
    {
        Self {
            name: name.into(),
            is_optional,
            predicate: Box::new(predicate),
        }
    }

    /// Create an assertion that must pass
    #[must_use]
    pub fn required<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&E) -> Result<(), FlickerSubjectError> + 'static,
    {
        Self::new(name, false, predicate)
    }

    /// Create an assertion whose failure is tolerated
    #[must_use]
    pub fn optional<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&E) -> Result<(), FlickerSubjectError> + 'static,
    {
        Self::new(name, true, predicate)
    }

    /// Assertion name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a failure of this assertion is tolerated
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.is_optional
    }

    /// Run the predicate against one entry
    pub fn check(&self, entry: &E) -> Result<(), FlickerSubjectError> {
        (self.predicate)(entry)
    }
}

impl<E> fmt::Debug for NamedAssertion<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedAssertion")
            .field("name", &self.name)
            .field("is_optional", &self.is_optional)
            .finish()
    }
}

/// Failure of an optional assertion, tolerated by its block
#[derive(Debug, Clone)]
pub struct OptionalFailure {
    /// Name of the assertion that failed
    pub name: String,
    /// The tolerated failure
    pub failure: FlickerSubjectError,
}

/// Outcome of a block that passed on one entry
#[derive(Debug, Clone, Default)]
pub struct BlockOutcome {
    /// Optional assertions that failed on the entry
    pub optional_failures: Vec<OptionalFailure>,
}

impl BlockOutcome {
    /// Check if every assertion of the block passed, optional ones included
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.optional_failures.is_empty()
    }
}

/// Ordered group of assertions that must pass together on an entry
pub struct AssertionBlock<E> {
    assertions: Vec<NamedAssertion<E>>,
}

impl<E> AssertionBlock<E> {
    /// Create an empty block
    #[must_use]
    pub fn new() -> Self {
        Self {
            assertions: Vec::new(),
        }
    }

    /// Create a block holding one assertion
    #[must_use]
    pub fn with_assertion(assertion: NamedAssertion<E>) -> Self {
        Self {
            assertions: vec![assertion],
        }
    }

    /// Append an assertion
    pub fn push(&mut self, assertion: NamedAssertion<E>) {
        self.assertions.push(assertion);
    }

    /// Assertions of the block, in declaration order
    #[must_use]
    pub fn assertions(&self) -> &[NamedAssertion<E>] {
        &self.assertions
    }

    /// Number of assertions
    #[must_use]
    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    /// Check if the block has no assertions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }

    /// Block name: member names joined with " and "
    #[must_use]
    pub fn name(&self) -> String {
        self.assertions
            .iter()
            .map(NamedAssertion::name)
            .collect::<Vec<_>>()
            .join(" and ")
    }

    /// A block is optional when all of its assertions are
    #[must_use]
    pub fn is_optional(&self) -> bool {
        !self.assertions.is_empty() && self.assertions.iter().all(NamedAssertion::is_optional)
    }

    /// Check if any assertion must pass
    #[must_use]
    pub fn has_required(&self) -> bool {
        self.assertions.iter().any(|a| !a.is_optional())
    }

    /// Evaluate the block on one entry
    ///
    /// Stops at the first failing required assertion. Failing optional
    /// assertions are collected and evaluation continues, unless the block
    /// has no required assertion: then the first optional failure fails it.
    pub fn check(&self, entry: &E) -> Result<BlockOutcome, FlickerSubjectError> {
        let mut outcome = BlockOutcome::default();
        for assertion in &self.assertions {
            if let Err(failure) = assertion.check(entry) {
                if !assertion.is_optional() {
                    return Err(failure.with_fact("Assertion", assertion.name()));
                }
                outcome.optional_failures.push(OptionalFailure {
                    name: assertion.name().to_string(),
                    failure,
                });
            }
        }
        if self.is_optional() && !outcome.is_clean() {
            let first = outcome.optional_failures.swap_remove(0);
            return Err(first.failure.with_fact("Assertion", first.name));
        }
        Ok(outcome)
    }
}

impl<E> Default for AssertionBlock<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for AssertionBlock<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionBlock")
            .field("name", &self.name())
            .field("is_optional", &self.is_optional())
            .finish()
    }
}
