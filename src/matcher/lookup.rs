use std::collections::HashMap;

use crate::model::ArgumentKey;

/// The key space of one handler scope, mapping key forms to adapter
/// identities.
#[derive(Debug, Default)]
pub(crate) struct KeyTable {
    longs: HashMap<String, usize>,
    shorts: HashMap<char, usize>,
    free: Option<usize>,
}

impl KeyTable {
    /// Register a key, reporting `false` on any collision with the already
    /// registered forms.
    pub(crate) fn insert(&mut self, key: &ArgumentKey, id: usize) -> bool {
        if key.is_free() {
            return self.free.replace(id).is_none();
        }

        if let Some(short) = key.short() {
            if self.shorts.contains_key(&short) {
                return false;
            }
        }

        if let Some(long) = key.long() {
            if self.longs.contains_key(long) {
                return false;
            }
        }

        if let Some(short) = key.short() {
            self.shorts.insert(short, id);
        }

        if let Some(long) = key.long() {
            self.longs.insert(long.to_string(), id);
        }

        true
    }

    /// Resolve a long name by exact match only.
    pub(crate) fn exact_long(&self, name: &str) -> Option<usize> {
        self.longs.get(name).copied()
    }

    /// The registered long names this (abbreviated) name is a prefix of.
    pub(crate) fn candidates(&self, name: &str) -> Vec<(String, usize)> {
        let mut candidates: Vec<(String, usize)> = self
            .longs
            .iter()
            .filter(|(registered, _)| registered.starts_with(name))
            .map(|(registered, id)| (registered.clone(), *id))
            .collect();
        candidates.sort();
        candidates
    }

    pub(crate) fn resolve_short(&self, short: char) -> Option<usize> {
        self.shorts.get(&short).copied()
    }

    pub(crate) fn free(&self) -> Option<usize> {
        self.free
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn table() -> KeyTable {
        let mut table = KeyTable::default();
        assert!(table.insert(&ArgumentKey::parse("i,input").unwrap(), 0));
        assert!(table.insert(&ArgumentKey::parse("inplace").unwrap(), 1));
        assert!(table.insert(&ArgumentKey::parse("o,output").unwrap(), 2));
        assert!(table.insert(&ArgumentKey::parse("-").unwrap(), 3));
        table
    }

    #[rstest]
    #[case("input", Some(0))]
    #[case("inplace", Some(1))]
    #[case("output", Some(2))]
    #[case("inpu", None)]
    #[case("unrelated", None)]
    fn exact_resolution(#[case] name: &str, #[case] expected: Option<usize>) {
        assert_eq!(table().exact_long(name), expected);
    }

    #[rstest]
    #[case("inpu", vec![("input".to_string(), 0)])]
    #[case("inpl", vec![("inplace".to_string(), 1)])]
    #[case("o", vec![("output".to_string(), 2)])]
    #[case("inp", vec![("inplace".to_string(), 1), ("input".to_string(), 0)])]
    #[case("in", vec![("inplace".to_string(), 1), ("input".to_string(), 0)])]
    #[case("unrelated", vec![])]
    fn abbreviation_candidates(#[case] name: &str, #[case] expected: Vec<(String, usize)>) {
        assert_eq!(table().candidates(name), expected);
    }

    #[test]
    fn exact_match_beats_abbreviation() {
        let mut table = KeyTable::default();
        assert!(table.insert(&ArgumentKey::parse("in").unwrap(), 0));
        assert!(table.insert(&ArgumentKey::parse("input").unwrap(), 1));

        assert_eq!(table.exact_long("in"), Some(0));
        assert_eq!(table.exact_long("input"), Some(1));
    }

    #[test]
    fn short_resolution() {
        let table = table();
        assert_eq!(table.resolve_short('i'), Some(0));
        assert_eq!(table.resolve_short('o'), Some(2));
        assert_eq!(table.resolve_short('x'), None);
    }

    #[test]
    fn free_resolution() {
        assert_eq!(table().free(), Some(3));
        assert_eq!(KeyTable::default().free(), None);
    }

    #[rstest]
    #[case("i")]
    #[case("input")]
    #[case("i,insert")]
    #[case("x,input")]
    #[case("-")]
    fn insert_collision(#[case] spec: &str) {
        let mut table = table();
        let key = ArgumentKey::parse(spec).unwrap();
        assert!(!table.insert(&key, 9));
    }
}
