use std::collections::BTreeSet;

use mwtree::BPlusSet;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Generates values in a range that ensures collisions.
fn value_strategy() -> impl Strategy<Value = i64> {
    -500i64..500i64
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum SetOp {
    Insert(i64),
    Remove(i64),
    Search(i64),
    First,
    Last,
}

fn set_op_strategy() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        5 => value_strategy().prop_map(SetOp::Insert),
        4 => value_strategy().prop_map(SetOp::Remove),
        2 => value_strategy().prop_map(SetOp::Search),
        1 => Just(SetOp::First),
        1 => Just(SetOp::Last),
    ]
}

/// Replays `ops` on a `BPlusSet` of order `N` and a `BTreeSet`, validating after every step.
fn replay<const N: usize>(ops: &[SetOp]) -> Result<(), TestCaseError> {
    let mut bp_set: BPlusSet<i64, N> = BPlusSet::new();
    let mut bt_set: BTreeSet<i64> = BTreeSet::new();

    for op in ops {
        match op {
            SetOp::Insert(v) => {
                prop_assert_eq!(bp_set.insert(*v), bt_set.insert(*v), "insert({})", v);
            }
            SetOp::Remove(v) => {
                prop_assert_eq!(bp_set.remove(v), bt_set.remove(v), "remove({})", v);
            }
            SetOp::Search(v) => {
                prop_assert_eq!(bp_set.contains(v), bt_set.contains(v), "contains({})", v);
            }
            SetOp::First => {
                prop_assert_eq!(bp_set.first(), bt_set.first());
            }
            SetOp::Last => {
                prop_assert_eq!(bp_set.last(), bt_set.last());
            }
        }
        prop_assert_eq!(bp_set.validate(), Ok(()), "after {:?}", op);
    }

    prop_assert_eq!(bp_set.len(), bt_set.len());
    prop_assert!(bp_set.traverse().eq(bt_set.iter()));
    prop_assert!(bp_set.traverse().rev().eq(bt_set.iter().rev()));
    Ok(())
}

// ─── Core CRUD operations ────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn set_ops_match_btreeset_order_3(ops in proptest::collection::vec(set_op_strategy(), TEST_SIZE)) {
        replay::<3>(&ops)?;
    }

    #[test]
    fn set_ops_match_btreeset_order_4(ops in proptest::collection::vec(set_op_strategy(), TEST_SIZE)) {
        replay::<4>(&ops)?;
    }

    #[test]
    fn set_ops_match_btreeset_default_order(ops in proptest::collection::vec(set_op_strategy(), TEST_SIZE)) {
        replay::<5>(&ops)?;
    }

    #[test]
    fn set_ops_match_btreeset_order_9(ops in proptest::collection::vec(set_op_strategy(), TEST_SIZE)) {
        replay::<9>(&ops)?;
    }

    /// Alternating `next` and `next_back` visits every key exactly once.
    #[test]
    fn iter_interleaved_next_next_back(values in proptest::collection::vec(value_strategy(), 1..TEST_SIZE)) {
        let set: BPlusSet<i64, 3> = values.iter().copied().collect();
        let bt_set: BTreeSet<i64> = values.into_iter().collect();

        let mut iter = set.iter();
        let mut bt_iter = bt_set.iter();
        let mut front = true;
        loop {
            prop_assert_eq!(iter.len(), bt_iter.len());
            let (ours, theirs) = if front {
                (iter.next(), bt_iter.next())
            } else {
                (iter.next_back(), bt_iter.next_back())
            };
            prop_assert_eq!(ours, theirs);
            if ours.is_none() {
                break;
            }
            front = !front;
        }
        prop_assert_eq!(iter.next(), None);
        prop_assert_eq!(iter.next_back(), None);
    }

    /// Duplicate inserts and absent removals leave the structure untouched.
    #[test]
    fn no_op_mutations_are_idempotent(
        values in proptest::collection::vec(value_strategy(), 1..500),
        absent in 1_000i64..2_000i64,
    ) {
        let mut set: BPlusSet<i64, 3> = values.iter().copied().collect();
        let view = set.tree_view().to_string();

        for v in &values {
            prop_assert!(!set.insert(*v));
        }
        prop_assert!(!set.remove(&absent));

        prop_assert_eq!(set.tree_view().to_string(), view);
        prop_assert_eq!(set.validate(), Ok(()));
    }

    #[test]
    fn from_iter_and_extend_agree(values in proptest::collection::vec(value_strategy(), 0..TEST_SIZE)) {
        let collected: BPlusSet<i64, 4> = values.iter().copied().collect();
        let mut extended: BPlusSet<i64, 4> = BPlusSet::default();
        extended.extend(&values);
        prop_assert_eq!(&collected, &extended);
        prop_assert_eq!(collected.clone(), collected);
    }
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn order_3_scenario() {
    let mut set: BPlusSet<i64, 3> = BPlusSet::new();
    let mut model = BTreeSet::new();

    let inserts = [5, 15, 25, 35, 45, 55, 20, 30, 40];
    let heights = [1, 1, 2, 2, 3, 3, 3, 3, 3];
    for (&key, &height) in inserts.iter().zip(&heights) {
        assert!(set.insert(key));
        model.insert(key);
        set.validate().unwrap();
        assert_eq!(set.height(), height, "after inserting {key}");
        if key == 25 {
            assert_eq!(set.tree_view().to_string(), "[15] children=2\n  [5]\n  [15 25]\n");
        }
    }

    assert_eq!(
        set.tree_view().to_string(),
        "[25] children=2\n  [15] children=2\n    [5]\n    [15 20]\n  [35 45] children=3\n    [25 30]\n    [35 40]\n    [45 55]\n"
    );

    for key in [40, 5, 45, 35, 25, 55] {
        assert!(set.remove(&key));
        model.remove(&key);
        set.validate().unwrap();
        assert!(set.traverse().eq(model.iter()), "after removing {key}");
    }
    assert_eq!(set.tree_view().to_string(), "[20 30] children=3\n  [15]\n  [20]\n  [30]\n");

    for key in [15, 20, 30] {
        assert!(set.remove(&key));
        set.validate().unwrap();
    }
    assert!(set.is_empty());
    assert_eq!(set.traverse().next(), None);
    assert_eq!(set.traverse().next_back(), None);
    assert_eq!((set.first(), set.last()), (None, None));
}

#[test]
fn merge_two_levels_up_shrinks_height() {
    let mut set: BPlusSet<i64, 3> = (1..=5).collect();
    assert_eq!(set.height(), 3);

    assert!(set.remove(&1));
    set.validate().unwrap();
    assert_eq!(set.height(), 2);
    assert_eq!(set.tree_view().to_string(), "[3 4] children=3\n  [2]\n  [3]\n  [4 5]\n");
}

#[test]
fn removed_separator_is_replaced_by_successor() {
    let mut set: BPlusSet<i64, 3> = BPlusSet::from([5, 15, 25, 35]);
    assert_eq!(set.tree_view().to_string(), "[15 25] children=3\n  [5]\n  [15]\n  [25 35]\n");

    assert!(set.remove(&25));
    set.validate().unwrap();
    assert_eq!(set.tree_view().to_string(), "[15 35] children=3\n  [5]\n  [15]\n  [35]\n");
}

#[test]
fn search_always_reaches_a_leaf() {
    let mut set: BPlusSet<i64, 3> = BPlusSet::from([5, 15, 25]);
    // 15 is both a separator and a leaf key; only the leaf copy decides membership.
    assert!(set.search(&15));
    assert!(set.remove(&15));
    assert!(!set.search(&15));
    set.validate().unwrap();
}

// ─── Deterministic Insertion Pattern Tests ────────────────────────────────────

/// Helper function to generate deterministic pseudo-random values using LCG.
fn random_values_deterministic(n: usize) -> Vec<i64> {
    let mut values = Vec::with_capacity(n);
    let mut x: u64 = 12345; // Fixed seed for reproducibility
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        values.push((x >> 33) as i64 % 5_000);
    }
    values
}

mod insertion_pattern_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const N: usize = 5_000;

    fn check_against_btreeset<const ORDER: usize>(values: impl IntoIterator<Item = i64>) {
        let mut bp_set: BPlusSet<i64, ORDER> = BPlusSet::new();
        let mut bt_set: BTreeSet<i64> = BTreeSet::new();

        for v in values {
            assert_eq!(bp_set.insert(v), bt_set.insert(v));
        }
        bp_set.validate().unwrap();
        assert_eq!(bp_set.len(), bt_set.len());
        assert!(bp_set.iter().eq(bt_set.iter()));
        assert!(bp_set.iter().rev().eq(bt_set.iter().rev()));

        // Remove from the back so the last leaf keeps emptying.
        let keys: Vec<i64> = bt_set.iter().rev().copied().collect();
        for (step, key) in keys.iter().enumerate() {
            assert!(bp_set.remove(key));
            if step % 10 == 0 {
                bp_set.validate().unwrap();
                assert_eq!(bp_set.last(), keys.get(step + 1));
            }
        }
        assert!(bp_set.is_empty());
        bp_set.validate().unwrap();
    }

    #[test]
    fn ordered_inserts_match_btreeset() {
        check_against_btreeset::<3>(0..N as i64);
        check_against_btreeset::<6>(0..N as i64);
    }

    #[test]
    fn reverse_ordered_inserts_match_btreeset() {
        check_against_btreeset::<3>((0..N as i64).rev());
        check_against_btreeset::<7>((0..N as i64).rev());
    }

    #[test]
    fn random_inserts_match_btreeset() {
        check_against_btreeset::<3>(random_values_deterministic(N));
        check_against_btreeset::<5>(random_values_deterministic(N));
    }
}
