//! Stale-label tracking for gauge vectors with a cycle-dependent label set.
//!
//! A gauge vector keeps every label value it has ever been given. When a
//! label stops occurring its last value would otherwise linger forever, so
//! the emitter must write an explicit zero. The tracker remembers which
//! labels carried a value last cycle and hands back the ones that need that
//! zero.
//!
//! Each cycle the whole memory is cleared to "not emitted" and only the
//! labels present this cycle are re-marked. A label that disappears is
//! therefore returned exactly once, on the first cycle it is absent.

use std::collections::BTreeMap;

/// Memory of which labels were emitted in the previous cycle.
#[derive(Debug, Clone)]
pub struct StaleLabelTracker<L: Ord> {
    emitted: BTreeMap<L, bool>,
}

impl<L: Ord> Default for StaleLabelTracker<L> {
    fn default() -> Self {
        Self {
            emitted: BTreeMap::new(),
        }
    }
}

impl<L: Ord + Clone> StaleLabelTracker<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `label` was emitted in the last committed cycle.
    pub fn is_emitted(&self, label: &L) -> bool {
        self.emitted.get(label).copied().unwrap_or(false)
    }

    /// Commit this cycle's labels and return the ones that went stale.
    ///
    /// The returned labels were emitted last cycle but are absent from
    /// `present`; the caller must zero them.
    pub fn advance<I>(&mut self, present: I) -> Vec<L>
    where
        I: IntoIterator<Item = L>,
    {
        let previous: Vec<L> = self
            .emitted
            .iter()
            .filter(|(_, emitted)| **emitted)
            .map(|(label, _)| label.clone())
            .collect();

        for emitted in self.emitted.values_mut() {
            *emitted = false;
        }
        for label in present {
            self.emitted.insert(label, true);
        }

        previous
            .into_iter()
            .filter(|label| !self.is_emitted(label))
            .collect()
    }
}
