//! Change reporting on top of the merge.
//!
//! [`ChangeSet`] is itself a [`BlendObserver`]: it records additions,
//! removals and modifications as the merge walks the tree, so the report and
//! the merged value come out of a single traversal.

use blend_types::{KeyPath, Value};
use serde::Serialize;
use tracing::debug;

use crate::blend::blend_observed;
use crate::observer::BlendObserver;

/// A single change between the old and new value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Change {
    /// A record key present only in the new value.
    Added { path: KeyPath, value: Value },
    /// A record key present only in the old value.
    Removed { path: KeyPath, value: Value },
    /// A leaf changed, or a slot switched between leaf and record.
    Modified { path: KeyPath, old: Value, new: Value },
}

impl Change {
    pub fn path(&self) -> &KeyPath {
        match self {
            Change::Added { path, .. }
            | Change::Removed { path, .. }
            | Change::Modified { path, .. } => path,
        }
    }
}

/// Everything a blend did, in traversal order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChangeSet {
    /// Additions, removals and modifications.
    pub changes: Vec<Change>,
    /// Records that were reconstructed, innermost first.
    pub rebuilt: Vec<KeyPath>,
    /// Number of slots, at any depth, resolved to the old value.
    pub shared: usize,
}

impl ChangeSet {
    /// Create an empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn additions(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, Change::Added { .. }))
            .count()
    }

    pub fn removals(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, Change::Removed { .. }))
            .count()
    }

    pub fn modifications(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, Change::Modified { .. }))
            .count()
    }

    /// Returns `true` if any change lies at or below `path`.
    pub fn touches(&self, path: &KeyPath) -> bool {
        self.changes.iter().any(|c| c.path().starts_with(path))
    }
}

impl BlendObserver for ChangeSet {
    fn kept(&mut self, _path: &KeyPath, _old: &Value) {
        self.shared += 1;
    }

    fn replaced(&mut self, path: &KeyPath, old: &Value, new: &Value) {
        self.changes.push(Change::Modified {
            path: path.clone(),
            old: old.clone(),
            new: new.clone(),
        });
    }

    fn added(&mut self, path: &KeyPath, new: &Value) {
        self.changes.push(Change::Added {
            path: path.clone(),
            value: new.clone(),
        });
    }

    fn removed(&mut self, path: &KeyPath, old: &Value) {
        self.changes.push(Change::Removed {
            path: path.clone(),
            value: old.clone(),
        });
    }

    fn rebuilt(&mut self, path: &KeyPath) {
        self.rebuilt.push(path.clone());
    }
}

/// A merged value and the report of how it was produced.
#[derive(Clone, Debug)]
pub struct Blended {
    pub value: Value,
    pub changes: ChangeSet,
}

impl Blended {
    pub fn into_parts(self) -> (Value, ChangeSet) {
        (self.value, self.changes)
    }
}

/// Blend `new` onto `old` and report what changed.
pub fn blend_with_changes(old: &Value, new: &Value) -> Blended {
    let mut changes = ChangeSet::new();
    let value = blend_observed(old, new, &mut changes);
    debug!(
        changes = changes.len(),
        rebuilt = changes.rebuilt.len(),
        shared = changes.shared,
        "blend complete"
    );
    Blended { value, changes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn from(json: serde_json::Value) -> Value {
        Value::from_json(json)
    }

    fn path(s: &str) -> KeyPath {
        KeyPath::parse(s).unwrap()
    }

    #[test]
    fn identical_values_no_changes() {
        let state = from(json!({"a": 1, "b": {"c": "hello"}}));
        let blended = blend_with_changes(&state, &state);
        assert!(blended.changes.is_empty());
        assert!(blended.changes.rebuilt.is_empty());
        assert_eq!(blended.changes.shared, 1);
        assert!(blended.value.ptr_eq(&state));
    }

    #[test]
    fn deep_copy_counts_every_shared_slot() {
        let old = from(json!({"a": 1, "b": {"c": "hello"}}));
        let new = from(json!({"a": 1, "b": {"c": "hello"}}));
        let blended = blend_with_changes(&old, &new);
        assert!(blended.changes.is_empty());
        // a, b.c, b, root
        assert_eq!(blended.changes.shared, 4);
        assert!(blended.value.ptr_eq(&old));
    }

    #[test]
    fn empty_to_populated() {
        let old = from(json!({}));
        let new = from(json!({"x": 42, "y": "new"}));

        let changes = blend_with_changes(&old, &new).changes;
        assert_eq!(changes.len(), 2);
        assert_eq!(changes.additions(), 2);
        assert_eq!(changes.removals(), 0);
        assert_eq!(changes.rebuilt, vec![KeyPath::root()]);
    }

    #[test]
    fn populated_to_empty() {
        let old = from(json!({"x": 42}));
        let new = from(json!({}));

        let changes = blend_with_changes(&old, &new).changes;
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.removals(), 1);
    }

    #[test]
    fn single_key_modification() {
        let old = from(json!({"count": 1}));
        let new = from(json!({"count": 2}));

        let changes = blend_with_changes(&old, &new).changes;
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.modifications(), 1);

        match &changes.changes[0] {
            Change::Modified { path: p, old, new } => {
                assert_eq!(p, &path("count"));
                assert_eq!(*old, Value::from(1));
                assert_eq!(*new, Value::from(2));
            }
            other => panic!("expected Modified, got {:?}", other),
        }
    }

    #[test]
    fn mixed_changes() {
        let old = from(json!({"keep": true, "modify": "old", "remove": 42}));
        let new = from(json!({"keep": true, "modify": "new", "added": [1, 2, 3]}));

        let changes = blend_with_changes(&old, &new).changes;
        assert_eq!(changes.len(), 3);
        assert_eq!(changes.additions(), 1);
        assert_eq!(changes.removals(), 1);
        assert_eq!(changes.modifications(), 1);
    }

    #[test]
    fn nested_modification_reports_leaf_path_and_rebuilt_ancestors() {
        let old = from(json!({"config": {"debug": false, "port": 8080}, "other": {"x": 1}}));
        let new = from(json!({"config": {"debug": true, "port": 8080}, "other": {"x": 1}}));

        let changes = blend_with_changes(&old, &new).changes;
        assert_eq!(changes.modifications(), 1);
        assert_eq!(changes.changes[0].path(), &path("config.debug"));
        assert_eq!(changes.rebuilt, vec![path("config"), KeyPath::root()]);
        assert!(changes.touches(&path("config")));
        assert!(changes.touches(&KeyPath::root()));
        assert!(!changes.touches(&path("other")));
    }

    #[test]
    fn whole_subtree_added_once() {
        let old = from(json!({"a": 1}));
        let new = from(json!({"a": 1, "tree": {"deep": {"deeper": 2}}}));

        let changes = blend_with_changes(&old, &new).changes;
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.additions(), 1);
        assert_eq!(changes.changes[0].path(), &path("tree"));
    }

    #[test]
    fn kind_change_is_modification() {
        let old = from(json!({"value": {"nested": 1}}));
        let new = from(json!({"value": "flat"}));

        let changes = blend_with_changes(&old, &new).changes;
        assert_eq!(changes.modifications(), 1);
        assert_eq!(changes.additions(), 0);
        assert_eq!(changes.removals(), 0);
    }

    #[test]
    fn absent_value_on_existing_key_is_modification() {
        let old = from(json!({"k": 1}));
        let new = Value::from(blend_types::Record::new().with("k", Value::absent()));

        let changes = blend_with_changes(&old, &new).changes;
        assert_eq!(changes.modifications(), 1);
        assert_eq!(changes.additions(), 0);
    }

    #[test]
    fn root_leaf_change_is_modification_at_root() {
        let changes = blend_with_changes(&Value::from(1), &Value::from(2)).changes;
        assert_eq!(changes.len(), 1);
        assert!(changes.changes[0].path().is_root());
    }

    #[test]
    fn serializes_with_op_tag_and_dotted_paths() {
        let old = from(json!({"a": {"b": 1}}));
        let new = from(json!({"a": {"b": 2}}));

        let changes = blend_with_changes(&old, &new).changes;
        let json = serde_json::to_value(&changes.changes).unwrap();
        assert_eq!(
            json,
            json!([{"op": "modified", "path": "a.b", "old": 1, "new": 2}])
        );
    }

    #[test]
    fn into_parts_splits_value_and_report() {
        let old = from(json!({"a": 1}));
        let (value, changes) = blend_with_changes(&old, &from(json!({"a": 2}))).into_parts();
        assert_eq!(value, from(json!({"a": 2})));
        assert_eq!(changes.len(), 1);
    }
}
