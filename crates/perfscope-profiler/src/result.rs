//! Decoded session results.

use hashbrown::HashMap;

use perfscope_core::CounterValue;

/// Counter values decoded from a finished session, keyed by counter name.
///
/// Iteration order follows the backend's enabled order, which carries no
/// meaning; look values up by name.
#[derive(Debug, Default)]
pub struct SessionResult {
    values: HashMap<String, CounterValue>,
}

impl SessionResult {
    pub(crate) fn new(values: HashMap<String, CounterValue>) -> Self {
        Self { values }
    }

    /// Value of the named counter, if it was enabled for the session.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<CounterValue> {
        self.values.get(name).copied()
    }

    /// Number of decoded counters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the result holds no values (the session was polled before it
    /// was ready).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over decoded (name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, CounterValue)> {
        self.values.iter().map(|(name, v)| (name.as_str(), *v))
    }
}
