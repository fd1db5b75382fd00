//! The merge recursion.
//!
//! | old    | new    | result                                   |
//! |--------|--------|------------------------------------------|
//! | leaf   | leaf   | `old` if value-equal, otherwise `new`    |
//! | leaf   | record | `new`                                    |
//! | record | leaf   | `new` (including absent and null)        |
//! | record | record | `old` if no key changed, else a rebuild  |
//!
//! A rebuilt record holds exactly the keys of `new`. Each child is the result
//! of blending that key, so unchanged siblings keep the old allocation.

use blend_types::{KeyPath, Record, Value};

use crate::observer::{BlendObserver, NoopObserver};

/// Merge `new` onto `old`, preserving `old`'s identity wherever the two are
/// deeply equal.
///
/// The result is always deeply equal to `new`. It is identical to `old`
/// (see [`Value::ptr_eq`]) exactly when `old` and `new` are deeply equal.
/// Neither input is modified.
pub fn blend(old: &Value, new: &Value) -> Value {
    blend_observed(old, new, &mut NoopObserver)
}

/// Like [`blend`], reporting each decision to `observer`.
pub fn blend_observed<O: BlendObserver + ?Sized>(
    old: &Value,
    new: &Value,
    observer: &mut O,
) -> Value {
    let mut path = KeyPath::root();
    match blend_slot(old, new, &mut path, observer) {
        Slot::Kept => old.clone(),
        Slot::Fresh(value) => value,
    }
}

/// Outcome for one slot. `Kept` means the old value stands as is.
enum Slot {
    Kept,
    Fresh(Value),
}

fn blend_slot<O: BlendObserver + ?Sized>(
    old: &Value,
    new: &Value,
    path: &mut KeyPath,
    observer: &mut O,
) -> Slot {
    match (old, new) {
        (Value::Record(old_record), Value::Record(new_record)) => {
            if old_record.ptr_eq(new_record) {
                observer.kept(path, old);
                return Slot::Kept;
            }
            match blend_records(old_record, new_record, path, observer) {
                Some(rebuilt) => Slot::Fresh(Value::Record(rebuilt)),
                None => {
                    observer.kept(path, old);
                    Slot::Kept
                }
            }
        }
        (Value::Leaf(old_leaf), Value::Leaf(new_leaf)) if old_leaf.value_eq(new_leaf) => {
            observer.kept(path, old);
            Slot::Kept
        }
        _ => {
            observer.replaced(path, old, new);
            Slot::Fresh(new.clone())
        }
    }
}

/// Blend two distinct records key by key. Returns `None` when every key was
/// kept and the key sets match.
fn blend_records<O: BlendObserver + ?Sized>(
    old: &Record,
    new: &Record,
    path: &mut KeyPath,
    observer: &mut O,
) -> Option<Record> {
    let mut changed = !old.same_keys(new);
    let mut entries = Vec::with_capacity(new.len());

    for (key, new_child) in new {
        path.push(key.clone());
        let child = match old.get(key) {
            Some(old_child) => match blend_slot(old_child, new_child, path, observer) {
                Slot::Kept => old_child.clone(),
                Slot::Fresh(value) => {
                    changed = true;
                    value
                }
            },
            // blend(absent, x) is always x
            None => {
                observer.added(path, new_child);
                new_child.clone()
            }
        };
        path.pop();
        entries.push((key.clone(), child));
    }

    for (key, old_child) in old {
        if !new.contains_key(key) {
            path.push(key.clone());
            observer.removed(path, old_child);
            path.pop();
        }
    }

    if !changed {
        return None;
    }
    observer.rebuilt(path);
    Some(entries.into_iter().collect())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::absent()),
            Just(Value::null()),
            any::<bool>().prop_map(Value::from),
            (-3i64..3).prop_map(Value::from),
            (-3i64..3).prop_map(|n| Value::from(n as f64)),
            "[a-c]{0,2}".prop_map(Value::from),
        ]
    }

    fn value() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(4, 48, 4, |inner| {
            prop::collection::btree_map("[a-d]", inner, 0..4)
                .prop_map(|entries| Value::Record(Record::from_map(entries)))
        })
    }

    /// Rebuild every allocation so nothing is shared with the input.
    fn deep_copy(value: &Value) -> Value {
        match value {
            Value::Record(record) => Value::Record(
                record
                    .iter()
                    .map(|(k, v)| (k.clone(), deep_copy(v)))
                    .collect(),
            ),
            Value::Leaf(leaf) => match leaf.clone() {
                blend_types::Leaf::String(s) => Value::from(s.to_string()),
                other => Value::Leaf(other),
            },
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn blending_with_itself_is_identity(x in value()) {
            prop_assert!(blend(&x, &x).ptr_eq(&x));
        }

        #[test]
        fn deep_copy_blends_to_old(x in value()) {
            let y = deep_copy(&x);
            prop_assert!(blend(&x, &y).ptr_eq(&x));
        }

        #[test]
        fn result_equals_new(x in value(), y in value()) {
            prop_assert_eq!(blend(&x, &y), y);
        }

        #[test]
        fn identity_only_when_equal(x in value(), y in value()) {
            let result = blend(&x, &y);
            prop_assert_eq!(result.ptr_eq(&x), x == y);
        }

        #[test]
        fn equal_children_keep_old_identity(x in value(), y in value()) {
            let result = blend(&x, &y);
            if let (Some(old), Some(new), Some(out)) = (x.as_record(), y.as_record(), result.as_record()) {
                prop_assert!(out.same_keys(new));
                for (key, new_child) in new {
                    if let Some(old_child) = old.get(key) {
                        if old_child == new_child {
                            prop_assert!(out.get(key).unwrap().ptr_eq(old_child));
                        }
                    }
                }
            }
        }
    }
}
