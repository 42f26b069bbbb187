//! Counter selection.

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};

use perfscope_backend::Backend;
use perfscope_core::{Counter, Result};

/// A named selection of counters for one context.
///
/// Built by [`Context::available_counters`](crate::Context::available_counters)
/// from a full enumeration, then narrowed with [`keep`](CounterSet::keep).
/// Enabling and disabling talk to the backend; everything else is local.
pub struct CounterSet {
    backend: Arc<dyn Backend>,
    counters: HashMap<String, Counter>,
}

impl std::fmt::Debug for CounterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterSet")
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}

impl CounterSet {
    pub(crate) fn new(backend: Arc<dyn Backend>, counters: HashMap<String, Counter>) -> Self {
        Self { backend, counters }
    }

    /// Number of counters currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether the selection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Look up a counter descriptor by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Counter> {
        self.counters.get(name)
    }

    /// Whether the selection holds a counter with this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.counters.contains_key(name)
    }

    /// Iterate over the held counters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Counter)> {
        self.counters.iter().map(|(name, c)| (name.as_str(), c))
    }

    /// Retain only the named counters, dropping the rest from the selection.
    ///
    /// Local-only: backend state is untouched. Names not present in the
    /// selection are ignored, so the operation is idempotent.
    pub fn keep<S: AsRef<str>>(&mut self, names: &[S]) {
        let wanted: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        self.counters.retain(|name, _| wanted.contains(name.as_str()));
    }

    /// Enable every held counter, one backend call per entry.
    ///
    /// On a mid-iteration failure the operation stops and the error is
    /// returned; counters enabled before the failure stay enabled. There is no
    /// rollback, call [`disable`](CounterSet::disable) to clear them.
    pub fn enable(&self) -> Result<()> {
        for counter in self.counters.values() {
            self.backend.enable_counter(counter.index)?;
        }
        Ok(())
    }

    /// Disable every held counter, one backend call per entry.
    ///
    /// Same partial-failure contract as [`enable`](CounterSet::enable).
    pub fn disable(&self) -> Result<()> {
        for counter in self.counters.values() {
            self.backend.disable_counter(counter.index)?;
        }
        Ok(())
    }

    /// How many passes the backend needs to resolve the enabled counters.
    ///
    /// Meaningful only after [`enable`](CounterSet::enable): the count is a
    /// function of which counters are currently enabled in the backend.
    pub fn required_pass_count(&self) -> Result<u32> {
        self.backend.pass_count()
    }
}
