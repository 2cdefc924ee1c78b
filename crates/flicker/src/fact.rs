//! Diagnostic facts attached to assertion failures.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A labeled piece of diagnostic information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// Label
    pub key: String,
    /// Rendered value
    pub value: String,
}

impl Fact {
    /// Create a new fact
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_display() {
        let fact = Fact::new("Trace start", 42);
        assert_eq!(fact.to_string(), "Trace start: 42");
        assert_eq!(fact.value, "42");
    }
}
