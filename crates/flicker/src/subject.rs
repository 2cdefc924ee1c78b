//! Entry subjects and the structured failure they raise.
//!
//! An entry subject wraps one parsed trace entry (a frame or a state
//! snapshot). Assertions never mutate it; a failing check asks the entry to
//! build a [`FlickerSubjectError`] which the caller propagates with `?`.

use crate::fact::Fact;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One timestamped trace entry under assertion
pub trait EntrySubject {
    /// Timestamp of the entry
    fn timestamp(&self) -> Timestamp;

    /// Facts describing the entry, added to every failure it raises
    fn self_facts(&self) -> Vec<Fact> {
        Vec::new()
    }

    /// Dump of the backing state, shown in the "State" section of failures
    fn state_dump(&self) -> Option<String> {
        None
    }

    /// Build a failure blamed on this entry
    fn fail(&self, reason: impl Into<String>) -> FlickerSubjectError
    where
        Self: Sized,
    {
        self.fail_with_facts(reason, Vec::new())
    }

    /// Build a failure blamed on this entry with extra facts
    fn fail_with_facts(&self, reason: impl Into<String>, facts: Vec<Fact>) -> FlickerSubjectError
    where
        Self: Sized,
    {
        let mut all_facts = self.self_facts();
        all_facts.extend(facts);
        let failure = FlickerSubjectError::new(reason, self.timestamp())
            .with_facts(all_facts);
        match self.state_dump() {
            Some(state) => failure.with_state(state),
            None => failure,
        }
    }
}

/// A failed check over a trace or one of its entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlickerSubjectError {
    what: String,
    timestamp: Timestamp,
    facts: Vec<Fact>,
    trace_facts: Vec<Fact>,
    state: Option<String>,
}

impl FlickerSubjectError {
    /// Create a failure with its reason and the timestamp it is blamed on
    #[must_use]
    pub fn new(what: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            what: what.into(),
            timestamp,
            facts: Vec::new(),
            trace_facts: Vec::new(),
            state: None,
        }
    }

    /// Append facts
    #[must_use]
    pub fn with_facts(mut self, facts: impl IntoIterator<Item = Fact>) -> Self {
        self.facts.extend(facts);
        self
    }

    /// Append one fact
    #[must_use]
    pub fn with_fact(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.facts.push(Fact::new(key, value));
        self
    }

    /// Attach the facts of the trace the entry belongs to
    ///
    /// Replaces facts from an earlier call, so re-attaching is idempotent.
    #[must_use]
    pub fn with_trace_facts(mut self, facts: Vec<Fact>) -> Self {
        self.trace_facts = facts;
        self
    }

    /// Attach a state dump of the blamed entry
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Reason of the failure
    #[must_use]
    pub fn what(&self) -> &str {
        &self.what
    }

    /// Timestamp the failure is blamed on
    #[must_use]
    pub const fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Facts of the failure, without the trace facts
    #[must_use]
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Trace start/end facts, empty when raised outside a trace
    #[must_use]
    pub fn trace_facts(&self) -> &[Fact] {
        &self.trace_facts
    }

    /// State dump of the blamed entry
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// All facts in rendering order
    pub fn all_facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter().chain(self.trace_facts.iter())
    }

    /// Values of every fact with the given key, in rendering order
    #[must_use]
    pub fn fact_values(&self, key: &str) -> Vec<&str> {
        self.all_facts()
            .filter(|fact| fact.key == key)
            .map(|fact| fact.value.as_str())
            .collect()
    }

    /// Render the debug message
    ///
    /// Sections: "What?", "Where?", "Facts" and, when `include_state` is set
    /// and the blamed entry provided one, "State".
    #[must_use]
    pub fn render(&self, include_state: bool) -> String {
        let mut out = String::new();
        out.push_str("What?\n");
        push_indented(&mut out, &self.what);
        out.push_str("\nWhere?\n");
        push_indented(&mut out, &self.timestamp.to_string());
        out.push_str("\nFacts\n");
        for fact in self.all_facts() {
            push_indented(&mut out, &fact.to_string());
        }
        if include_state {
            if let Some(state) = &self.state {
                out.push_str("\nState\n");
                push_indented(&mut out, state);
            }
        }
        out
    }
}

fn push_indented(out: &mut String, text: &str) {
    for line in text.lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
}

/// Renders every section, state dump included; use
/// [`FlickerConfig::render_failure`](crate::FlickerConfig::render_failure) to
/// honor `include_state`.
impl fmt::Display for FlickerSubjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}

impl std::error::Error for FlickerSubjectError {}
