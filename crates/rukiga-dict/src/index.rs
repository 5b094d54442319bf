use std::collections::HashMap;

/// Headword key to distinct definitions, iterated in first-insertion order.
#[derive(Clone, Debug, Default)]
pub struct ForwardIndex {
    slots: Vec<(String, Vec<String>)>,
    positions: HashMap<String, usize>,
}

impl ForwardIndex {
    /// Append `definition` under `key` unless that exact string is already
    /// stored there. Returns whether it was added.
    pub(crate) fn insert(&mut self, key: &str, definition: &str) -> bool {
        let slot = match self.positions.get(key) {
            Some(&idx) => idx,
            None => {
                self.slots.push((key.to_string(), Vec::new()));
                self.positions.insert(key.to_string(), self.slots.len() - 1);
                self.slots.len() - 1
            }
        };
        let definitions = &mut self.slots[slot].1;
        if definitions.iter().any(|d| d == definition) {
            return false;
        }
        definitions.push(definition.to_string());
        true
    }

    /// Definitions stored under a normalized key.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.positions
            .get(key)
            .map(|&idx| self.slots[idx].1.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Keys with their definitions, in the order keys were first seen.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.slots
            .iter()
            .map(|(key, defs)| (key.as_str(), defs.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_suppresses_duplicates() {
        let mut index = ForwardIndex::default();
        assert!(index.insert("zeta", "last letter"));
        assert!(index.insert("alpha", "first letter"));
        assert!(index.insert("zeta", "a fish"));
        assert!(!index.insert("zeta", "last letter"));

        let keys: Vec<&str> = index.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(
            index.get("zeta").unwrap(),
            &["last letter".to_string(), "a fish".to_string()]
        );
        assert_eq!(index.len(), 2);
        assert!(index.get("beta").is_none());
    }
}
