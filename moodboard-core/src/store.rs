//! Rule persistence seam.

use std::sync::RwLock;

use crate::error::StoreError;
use crate::rule::Rule;

/// Where compiled rules live between mood logs.
///
/// Deactivation is a soft delete: the rule stays in `list_all`.
pub trait RuleStore {
    fn save(&self, rule: Rule) -> Result<(), StoreError>;
    fn list_active(&self) -> Result<Vec<Rule>, StoreError>;
    fn list_all(&self) -> Result<Vec<Rule>, StoreError>;
    fn deactivate(&self, id: &str) -> Result<Rule, StoreError>;
}

/// Insertion-ordered in-memory store.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: RwLock<Vec<Rule>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("rule store lock poisoned".to_string())
}

impl RuleStore for MemoryRuleStore {
    fn save(&self, rule: Rule) -> Result<(), StoreError> {
        let mut rules = self.rules.write().map_err(poisoned)?;
        match rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
        Ok(())
    }

    fn list_active(&self) -> Result<Vec<Rule>, StoreError> {
        let rules = self.rules.read().map_err(poisoned)?;
        Ok(rules.iter().filter(|r| r.is_active).cloned().collect())
    }

    fn list_all(&self) -> Result<Vec<Rule>, StoreError> {
        Ok(self.rules.read().map_err(poisoned)?.clone())
    }

    fn deactivate(&self, id: &str) -> Result<Rule, StoreError> {
        let mut rules = self.rules.write().map_err(poisoned)?;
        let rule = rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        rule.deactivate();
        Ok(rule.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_rule;

    #[test]
    fn test_save_and_list() {
        let store = MemoryRuleStore::new();
        let a = compile_rule("If I feel sad, remind me to call a friend").unwrap();
        let b = compile_rule("If I'm stressed, block 15 mins for breathing").unwrap();
        store.save(a.clone()).unwrap();
        store.save(b.clone()).unwrap();

        let ids: Vec<_> = store.list_active().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_deactivate_is_soft() {
        let store = MemoryRuleStore::new();
        let rule = compile_rule("If I feel sad, remind me to call a friend").unwrap();
        store.save(rule.clone()).unwrap();

        let removed = store.deactivate(&rule.id).unwrap();
        assert!(!removed.is_active);
        assert!(store.list_active().unwrap().is_empty());
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_deactivate_unknown_id() {
        let store = MemoryRuleStore::new();
        assert_eq!(
            store.deactivate("rule_missing").unwrap_err(),
            StoreError::NotFound("rule_missing".to_string())
        );
    }
}
