use blend_types::{KeyPath, Value};

/// A projection of one slot, recomputed only when that slot's identity
/// changes.
///
/// Feed it successive states produced by blending (for example from
/// [`StateStore::state`](crate::StateStore::state)). Since blending preserves
/// the identity of unchanged subtrees, an identical slot means the projection
/// would produce the same output.
pub struct Selector<T, F> {
    path: KeyPath,
    project: F,
    memo: Option<(Value, T)>,
    recomputations: usize,
}

impl<T, F> Selector<T, F>
where
    F: Fn(&Value) -> T,
{
    /// Select the slot at `path`. A missing slot is passed to `project` as
    /// the absence sentinel.
    pub fn new(path: KeyPath, project: F) -> Self {
        Self {
            path,
            project,
            memo: None,
            recomputations: 0,
        }
    }

    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// The projection of `state`'s slot, reusing the previous output when the
    /// slot is identical to the last one seen.
    pub fn select(&mut self, state: &Value) -> &T {
        let slot = state.get_path(&self.path).cloned().unwrap_or_default();
        if self
            .memo
            .as_ref()
            .is_some_and(|(input, _)| !input.ptr_eq(&slot))
        {
            self.memo = None;
        }
        let (_, output) = self.memo.get_or_insert_with(|| {
            self.recomputations += 1;
            let output = (self.project)(&slot);
            (slot, output)
        });
        output
    }

    /// How many times the projection has run.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// Drop the memoized output so the next `select` recomputes.
    pub fn invalidate(&mut self) {
        self.memo = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateStore;
    use serde_json::json;

    fn from(json: serde_json::Value) -> Value {
        Value::from_json(json)
    }

    fn count_done(todos: &Value) -> usize {
        todos
            .as_record()
            .map(|r| {
                r.values()
                    .filter(|t| t.get("done").and_then(Value::as_bool) == Some(true))
                    .count()
            })
            .unwrap_or(0)
    }

    #[test]
    fn recomputes_only_when_slot_changes() {
        let store = StateStore::new(from(json!({
            "todos": {"t1": {"done": true}, "t2": {"done": false}},
            "filter": "all"
        })));
        let mut done = Selector::new(KeyPath::parse("todos").unwrap(), count_done);

        assert_eq!(*done.select(&store.state().unwrap()), 1);
        assert_eq!(done.recomputations(), 1);

        // unrelated slot changes; todos keeps its identity
        store
            .commit(from(json!({
                "todos": {"t1": {"done": true}, "t2": {"done": false}},
                "filter": "active"
            })))
            .unwrap();
        assert_eq!(*done.select(&store.state().unwrap()), 1);
        assert_eq!(done.recomputations(), 1);

        store
            .commit(from(json!({
                "todos": {"t1": {"done": true}, "t2": {"done": true}},
                "filter": "active"
            })))
            .unwrap();
        assert_eq!(*done.select(&store.state().unwrap()), 2);
        assert_eq!(done.recomputations(), 2);
    }

    #[test]
    fn missing_slot_projects_absent() {
        let mut selector = Selector::new(KeyPath::parse("nowhere").unwrap(), |v: &Value| v.is_absent());
        assert!(*selector.select(&from(json!({}))));
        assert!(*selector.select(&from(json!({"other": 1}))));
        assert_eq!(selector.recomputations(), 1);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let state = from(json!({"a": 1}));
        let mut selector = Selector::new(KeyPath::root(), |v: &Value| v.get("a").cloned());
        selector.select(&state);
        selector.select(&state);
        assert_eq!(selector.recomputations(), 1);

        selector.invalidate();
        selector.select(&state);
        assert_eq!(selector.recomputations(), 2);
    }
}
