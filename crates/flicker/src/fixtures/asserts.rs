//! Panicking helpers for inspecting assertion failures in tests.

use crate::result::{FlickerError, FlickerResult};
use crate::subject::FlickerSubjectError;

/// Unwrap the assertion failure of a result
///
/// # Panics
///
/// When the result is `Ok` or carries another error kind.
#[must_use]
pub fn expect_assertion_failure(result: FlickerResult<()>) -> FlickerSubjectError {
    match result {
        Ok(()) => panic!("Expected an assertion failure, but the check passed"),
        Err(FlickerError::Assertion(failure)) => *failure,
        Err(other) => panic!("Expected an assertion failure, got: {other}"),
    }
}

/// Value of the `index`-th fact with key `key`
///
/// # Panics
///
/// When no such fact exists; the message lists the available facts.
#[must_use]
pub fn assert_failure_fact<'a>(
    failure: &'a FlickerSubjectError,
    key: &str,
    index: usize,
) -> &'a str {
    match failure.fact_values(key).get(index).copied() {
        Some(value) => value,
        None => {
            let available = failure
                .all_facts()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            panic!(
                "Cannot find failure fact with key '{key}' and index {index}\n\
                 Available facts:\n{available}"
            )
        }
    }
}

/// Assert the error message lists every debug section
///
/// The "State" section is only expected when the failure is blamed on an
/// entry that dumps its state.
///
/// # Panics
///
/// When a section is missing.
pub fn assert_error_contains_debug_info(error: &FlickerError, with_blame_entry: bool) {
    let message = error.to_string();
    let mut sections = vec!["What?", "Where?", "Facts", "Trace start", "Trace end"];
    if with_blame_entry {
        sections.push("State");
    }
    for section in sections {
        assert!(
            message.contains(section),
            "Missing section '{section}' in error message:\n{message}"
        );
    }
}

/// Assert the error message contains `expected`
///
/// # Panics
///
/// When it does not.
pub fn assert_error_message(error: &FlickerError, expected: &str) {
    let message = error.to_string();
    assert!(
        message.contains(expected),
        "Expected '{expected}' in error message:\n{message}"
    );
}
