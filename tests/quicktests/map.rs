use threaded_bst::Map;

use std::collections::{BTreeMap, HashSet};

use crate::Op;

/// Applies a set of operations to a map and a `BTreeMap`.
/// This way we can ensure that after a random smattering of inserts
/// and defaulted lookups we have the same pairs in both.
fn do_ops<K, V>(ops: &[Op<K, V>], map: &mut Map<K, V>, expected: &mut BTreeMap<K, V>)
where
    K: Clone + Ord,
    V: Clone + Default,
{
    for op in ops {
        match op {
            Op::Insert(k, v) => {
                map.insert(k.clone(), v.clone());
                expected.insert(k.clone(), v.clone());
            }
            Op::GetOrInsertDefault(k) => {
                map.get_or_insert_default(k.clone());
                expected.entry(k.clone()).or_default();
            }
        }
    }
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>) -> bool {
    let mut map = Map::new();
    let mut expected = BTreeMap::new();

    do_ops(&ops, &mut map, &mut expected);
    map.len() == expected.len()
        && map.check_invariants().is_ok()
        && map.to_ordered_pairs() == expected.into_iter().collect::<Vec<_>>()
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let mut map = Map::new();
    for x in &xs {
        map.insert(*x, *x);
    }

    xs.iter().all(|x| map.contains(x) && map.get(x) == *x)
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let mut map = Map::new();
    for x in &xs {
        map.insert(*x, i16::from(*x) + 1);
    }
    let len = map.len();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| !map.contains(x) && map.get(x) == 0 && map.find(x).is_none())
        && map.len() == len
}

#[quickcheck]
fn keeps_earlier_keys(xs: Vec<u8>, later: Vec<u8>) -> bool {
    let mut map = Map::new();
    for x in &xs {
        map.insert(*x, u32::from(*x) * 3);
    }
    for x in &later {
        map.get_or_insert_default(*x);
    }

    // A defaulted lookup never overwrites a value that's already there.
    xs.iter().all(|x| map.get(x) == u32::from(*x) * 3)
}

#[quickcheck]
fn update_keeps_len(xs: Vec<i16>, value: u8, other: u8) -> bool {
    let mut map = Map::new();
    for x in &xs {
        map.insert(*x, value);
    }
    let len = map.len();
    for x in &xs {
        map.insert(*x, other);
    }

    map.len() == len && xs.iter().all(|x| map.get(x) == other)
}

#[quickcheck]
fn iterates_in_ascending_order(xs: Vec<i32>) -> bool {
    let map: Map<_, _> = xs.iter().map(|x| (*x, ())).collect();
    let keys: Vec<_> = map.iter().copied().collect();

    keys.len() == map.len() && keys.windows(2).all(|pair| pair[0] < pair[1])
}

#[quickcheck]
fn copies_are_independent(xs: Vec<i8>, extra: i8) -> bool {
    let original: Map<_, _> = xs.iter().map(|x| (*x, 1u8)).collect();
    let mut copy = original.clone();
    copy.get_or_insert_default(extra);
    copy.insert(extra, 2);

    let untouched = original.len() == xs.iter().collect::<HashSet<_>>().len();
    let extra_value = if xs.contains(&extra) { 1 } else { 0 };
    untouched && original.get(&extra) == extra_value && copy.get(&extra) == 2
}
