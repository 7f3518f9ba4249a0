//! Randomized invariant checks.
//!
//! An oracle multimap (`BTreeMap<K, Vec<V>>`, newest value last) mirrors
//! every operation; after each sequence the tree must agree with the oracle
//! and its structural report must satisfy the BST and parent-link
//! invariants.

use std::collections::BTreeMap;

use proptest::prelude::*;

use splay_multimap::SplayMultimap;

/// Oracle model: per key, all values in insertion order; the last element
/// is the primary. `remove` takes the newest duplicate first (the element
/// just below the primary), and only the final removal takes the primary.
#[derive(Debug, Default)]
struct Oracle {
    entries: BTreeMap<i32, Vec<i32>>,
    len: usize,
}

impl Oracle {
    fn insert(&mut self, k: i32, v: i32) {
        self.entries.entry(k).or_default().push(v);
        self.len += 1;
    }

    fn get(&self, k: i32) -> Option<i32> {
        self.entries.get(&k).map(|vs| *vs.last().unwrap())
    }

    fn update(&mut self, k: i32, v: i32) -> bool {
        match self.entries.get_mut(&k) {
            Some(vs) => {
                *vs.last_mut().unwrap() = v;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, k: i32) -> Option<i32> {
        let vs = self.entries.get_mut(&k)?;
        let removed = if vs.len() == 1 {
            let v = vs[0];
            self.entries.remove(&k);
            v
        } else {
            vs.remove(vs.len() - 2)
        };
        self.len -= 1;
        Some(removed)
    }

    fn flattened(&self) -> Vec<(i32, i32)> {
        self.entries
            .iter()
            .flat_map(|(k, vs)| {
                // duplicates in insertion order, then the primary — which is
                // exactly the stored order
                vs.iter().map(move |v| (*k, *v))
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
enum Op {
    Insert(i32, i32),
    Remove(i32),
    Get(i32),
    Update(i32, i32),
}

fn key() -> impl Strategy<Value = i32> {
    // small key space to force collisions and duplicate traffic
    -16..16i32
}

fn operations(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            (key(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
            key().prop_map(Op::Remove),
            key().prop_map(Op::Get),
            (key(), any::<i32>()).prop_map(|(k, v)| Op::Update(k, v)),
        ],
        0..max_ops,
    )
}

fn assert_invariants(map: &SplayMultimap<i32, i32>) {
    let report = map.structure();
    assert_eq!(report.len(), map.len());

    let keys: Vec<i32> = report.iter().map(|e| e.key).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted, "in-order walk must ascend");

    let mut parentless = std::collections::HashSet::new();
    for e in &report {
        if e.parent.is_none() {
            parentless.insert(e.key);
        }
        if let Some(l) = e.left {
            assert!(l < e.key);
            let child = report.iter().find(|c| c.key == l).unwrap();
            assert_eq!(child.parent, Some(e.key));
        }
        if let Some(r) = e.right {
            assert!(r > e.key);
            let child = report.iter().find(|c| c.key == r).unwrap();
            assert_eq!(child.parent, Some(e.key));
        }
    }
    assert_eq!(parentless.len(), usize::from(!map.is_empty()));
}

proptest! {
    /// Arbitrary op sequences agree with the oracle step by step and leave
    /// a structurally valid tree.
    #[test]
    fn mixed_operations_match_the_oracle(ops in operations(300)) {
        let mut map = SplayMultimap::new();
        let mut oracle = Oracle::default();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    map.insert(k, v).unwrap();
                    oracle.insert(k, v);
                }
                Op::Remove(k) => {
                    prop_assert_eq!(map.remove(&k).unwrap(), oracle.remove(k));
                }
                Op::Get(k) => {
                    prop_assert_eq!(map.get(&k).unwrap().copied(), oracle.get(k));
                }
                Op::Update(k, v) => {
                    prop_assert_eq!(map.update(&k, v).unwrap(), oracle.update(k, v));
                }
            }
            prop_assert_eq!(map.len(), oracle.len);
        }

        assert_invariants(&map);
        let flattened: Vec<(i32, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(flattened, oracle.flattened());
    }

    /// Every inserted key is retrievable afterwards, and the root is the
    /// key just searched.
    #[test]
    fn inserted_keys_are_found_and_splayed(pairs in prop::collection::vec((key(), any::<i32>()), 1..200)) {
        let mut map = SplayMultimap::new();
        let mut oracle = Oracle::default();
        for (k, v) in &pairs {
            map.insert(*k, *v).unwrap();
            oracle.insert(*k, *v);
        }
        for (k, _) in &pairs {
            prop_assert_eq!(map.get(k).unwrap().copied(), oracle.get(*k));
            let root = map.structure().into_iter().find(|e| e.parent.is_none()).unwrap();
            prop_assert_eq!(root.key, *k);
        }
    }

    /// Deleting every key in a random order preserves the invariants after
    /// each step and drains the map exactly.
    #[test]
    fn delete_all_in_random_order(
        permutation in Just((1..=48i32).collect::<Vec<_>>()).prop_shuffle(),
        removal in Just((1..=48i32).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let mut map = SplayMultimap::new();
        for &k in &permutation {
            map.insert(k, k).unwrap();
        }
        for (i, k) in removal.iter().enumerate() {
            prop_assert_eq!(map.remove(k).unwrap(), Some(*k));
            prop_assert_eq!(map.len(), removal.len() - i - 1);
            assert_invariants(&map);
        }
        prop_assert!(map.is_empty());
        prop_assert_eq!(map.height(), 0);
    }

    /// `range` agrees with the oracle's filtered flattening, in order.
    #[test]
    fn range_matches_filtered_oracle(
        pairs in prop::collection::vec((key(), any::<i32>()), 0..150),
        low in key(),
        high in key(),
    ) {
        let mut map = SplayMultimap::new();
        let mut oracle = Oracle::default();
        for (k, v) in pairs {
            map.insert(k, v).unwrap();
            oracle.insert(k, v);
        }
        let got: Vec<(i32, i32)> = map.range(&low, &high).unwrap().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(i32, i32)> = oracle
            .flattened()
            .into_iter()
            .filter(|(k, _)| low <= *k && *k <= high)
            .collect();
        prop_assert_eq!(got, expected);
        assert_invariants(&map);
    }

    /// Neighbor queries agree with what the oracle's sorted key set implies.
    #[test]
    fn neighbors_match_the_oracle(
        keys in prop::collection::btree_set(key(), 0..40),
        probe in key(),
    ) {
        let mut map = SplayMultimap::new();
        for &k in &keys {
            map.insert(k, k).unwrap();
        }
        let higher = keys.iter().copied().find(|k| *k > probe);
        let ceiling = keys.iter().copied().find(|k| *k >= probe);
        let lower = keys.iter().copied().rev().find(|k| *k < probe);
        let floor = keys.iter().copied().rev().find(|k| *k <= probe);

        prop_assert_eq!(map.higher(&probe).unwrap().map(|(k, _)| *k), higher);
        prop_assert_eq!(map.ceiling(&probe).unwrap().map(|(k, _)| *k), ceiling);
        prop_assert_eq!(map.lower(&probe).unwrap().map(|(k, _)| *k), lower);
        prop_assert_eq!(map.floor(&probe).unwrap().map(|(k, _)| *k), floor);
        assert_invariants(&map);
    }
}
