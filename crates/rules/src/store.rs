//! Shared, externally-edited rule list with copy-on-read snapshots.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::loader::{Result, RuleError};
use crate::schema::Rule;

/// Read capability the evaluation engine depends on.
pub trait RuleSource: Send + Sync {
    /// The rule list as of now. The returned list never changes.
    fn snapshot(&self) -> Arc<Vec<Rule>>;
}

/// Ordered rule list shared between editors and evaluators.
///
/// Every mutation builds a new list and swaps it in, so a snapshot taken
/// before the mutation keeps observing the old list in full. Readers only
/// hold the lock long enough to clone an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Arc<RwLock<Arc<Vec<Rule>>>>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules: Arc::new(RwLock::new(Arc::new(rules))),
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<Rule>> {
        Arc::clone(&self.read())
    }

    /// Replace the whole list (e.g. after a rules file reload).
    pub fn replace(&self, rules: Vec<Rule>) {
        *self.write() = Arc::new(rules);
    }

    /// Append a rule at the end of the list.
    pub fn add(&self, rule: Rule) {
        let mut guard = self.write();
        let mut next = Vec::clone(&guard);
        next.push(rule);
        *guard = Arc::new(next);
    }

    /// Replace the rule at `index`, returning the previous one.
    pub fn update(&self, index: usize, rule: Rule) -> Result<Rule> {
        self.mutate(|rules| {
            let len = rules.len();
            let slot = rules
                .get_mut(index)
                .ok_or(RuleError::IndexOutOfRange { index, len })?;
            Ok(std::mem::replace(slot, rule))
        })
    }

    /// Remove the rule at `index`. Later rules shift down by one.
    pub fn remove(&self, index: usize) -> Result<Rule> {
        self.mutate(|rules| {
            if index >= rules.len() {
                return Err(RuleError::IndexOutOfRange {
                    index,
                    len: rules.len(),
                });
            }
            Ok(rules.remove(index))
        })
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut Vec<Rule>) -> Result<T>) -> Result<T> {
        let mut guard = self.write();
        let mut next = Vec::clone(&guard);
        let out = f(&mut next)?;
        *guard = Arc::new(next);
        Ok(out)
    }

    // The guarded value is only ever swapped whole, so a poisoned lock
    // still holds a complete list.
    fn read(&self) -> RwLockReadGuard<'_, Arc<Vec<Rule>>> {
        self.rules.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<Vec<Rule>>> {
        self.rules.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RuleSource for RuleStore {
    fn snapshot(&self) -> Arc<Vec<Rule>> {
        RuleStore::snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overcurrent() -> Rule {
        Rule::new("Overcurrent", "Ia", ">", 300.0)
    }

    fn undervoltage() -> Rule {
        Rule::new("Undervoltage", "Va", "<", 200.0)
    }

    #[test]
    fn snapshot_is_unaffected_by_later_edits() {
        let store = RuleStore::with_rules(vec![overcurrent()]);
        let before = store.snapshot();

        store.add(undervoltage());
        store.update(0, Rule::new("Overcurrent", "Ia", ">", 500.0)).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].threshold, 300.0);

        let after = store.snapshot();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].threshold, 500.0);
    }

    #[test]
    fn update_and_remove_by_position() {
        let store = RuleStore::with_rules(vec![overcurrent(), undervoltage()]);

        let old = store.update(1, Rule::new("Undervoltage", "Va", "<", 180.0)).unwrap();
        assert_eq!(old, undervoltage());

        let removed = store.remove(0).unwrap();
        assert_eq!(removed, overcurrent());
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot()[0].threshold, 180.0);
    }

    #[test]
    fn out_of_range_edits_leave_list_intact() {
        let store = RuleStore::with_rules(vec![overcurrent()]);

        let err = store.remove(3).unwrap_err();
        assert!(matches!(err, RuleError::IndexOutOfRange { index: 3, len: 1 }));
        assert!(store.update(1, undervoltage()).is_err());
        assert_eq!(*store.snapshot(), vec![overcurrent()]);
    }

    #[test]
    fn clones_share_the_same_list() {
        let store = RuleStore::new();
        let editor = store.clone();
        assert!(store.is_empty());

        editor.replace(vec![overcurrent(), undervoltage()]);
        assert_eq!(store.len(), 2);

        let source: &dyn RuleSource = &store;
        assert_eq!(source.snapshot().len(), 2);
    }
}
