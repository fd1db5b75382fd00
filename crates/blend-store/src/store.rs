//! The state container.
//!
//! All state lives behind a `RwLock`; watches live behind a separate `Mutex`.
//! A transition holds both for its whole read-blend-store step, so watch
//! bookkeeping always sees transitions in commit order. Watch callbacks run
//! after both locks are released and may read from or commit to the store.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use blend_engine::{blend, blend_with_changes, ChangeSet};
use blend_types::{KeyPath, Value};
use tracing::{debug, trace};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// Handle returned by [`StateStore::watch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

type Callback = Arc<dyn Fn(&Value) + Send + Sync>;
type Fired = (WatchId, KeyPath, Callback, Value);

struct Watch {
    id: WatchId,
    path: KeyPath,
    last: Value,
    callback: Callback,
}

struct Inner {
    state: Value,
    revision: u64,
    history: VecDeque<Value>,
}

/// Outcome of a commit or undo.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Store revision after the transition.
    pub revision: u64,
    /// `false` if the new state blended back to the identical old state.
    pub changed: bool,
    /// What changed. Empty when change recording is disabled.
    pub changes: ChangeSet,
}

/// Holds application state and blends every transition into it.
pub struct StateStore {
    config: StoreConfig,
    inner: RwLock<Inner>,
    watches: Mutex<Vec<Watch>>,
    next_watch: AtomicU64,
}

impl StateStore {
    /// Create a store with the default configuration.
    pub fn new(initial: Value) -> Self {
        Self::with_config(initial, StoreConfig::default())
    }

    pub fn with_config(initial: Value, config: StoreConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(Inner {
                state: initial,
                revision: 0,
                history: VecDeque::new(),
            }),
            watches: Mutex::new(Vec::new()),
            next_watch: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The current state. Cheap: shares the root allocation.
    pub fn state(&self) -> StoreResult<Value> {
        Ok(self.read()?.state.clone())
    }

    /// Number of commits that changed the state.
    pub fn revision(&self) -> StoreResult<u64> {
        Ok(self.read()?.revision)
    }

    /// The value at `path` in the current state, if present.
    pub fn get(&self, path: &KeyPath) -> StoreResult<Option<Value>> {
        Ok(self.read()?.state.get_path(path).cloned())
    }

    /// Previous states, oldest first.
    pub fn history(&self) -> StoreResult<Vec<Value>> {
        Ok(self.read()?.history.iter().cloned().collect())
    }

    /// Blend `next` into the current state.
    pub fn commit(&self, next: Value) -> StoreResult<Transition> {
        self.transition(|_| Ok((next, true)))
    }

    /// Commit the value produced by `f` from the current state.
    ///
    /// `f` runs while the store is locked for writing, so it sees exactly the
    /// state its result replaces. It must not call back into the store.
    pub fn update<F>(&self, f: F) -> StoreResult<Transition>
    where
        F: FnOnce(&Value) -> Value,
    {
        self.transition(|inner| Ok((f(&inner.state), true)))
    }

    /// Restore the most recent history entry.
    ///
    /// The restored state is blended onto the current one, so subtrees the
    /// undone commit did not touch keep their current identity.
    pub fn undo(&self) -> StoreResult<Transition> {
        self.transition(|inner| {
            let previous = inner.history.pop_back().ok_or(StoreError::NoHistory)?;
            Ok((previous, false))
        })
    }

    /// Call `callback` with the new slot value whenever the slot at `path`
    /// stops being identical to what it was.
    pub fn watch<F>(&self, path: KeyPath, callback: F) -> StoreResult<WatchId>
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = WatchId(self.next_watch.fetch_add(1, Ordering::Relaxed));
        let inner = self.read()?;
        let last = inner.state.get_path(&path).cloned().unwrap_or_default();
        self.lock_watches()?.push(Watch {
            id,
            path,
            last,
            callback: Arc::new(callback),
        });
        Ok(id)
    }

    /// Remove a watch. Returns `true` if it existed.
    pub fn unwatch(&self, id: WatchId) -> StoreResult<bool> {
        let mut watches = self.lock_watches()?;
        let before = watches.len();
        watches.retain(|w| w.id != id);
        Ok(watches.len() != before)
    }

    /// Run one transition with both locks held. `next` picks the incoming
    /// state and whether the replaced state goes into history. Nothing is
    /// modified if either lock is poisoned.
    fn transition<F>(&self, next: F) -> StoreResult<Transition>
    where
        F: FnOnce(&mut Inner) -> StoreResult<(Value, bool)>,
    {
        let (transition, fired) = {
            let mut inner = self.write()?;
            let mut watches = self.lock_watches()?;
            let (next, record_history) = next(&mut *inner)?;
            self.apply(&mut *inner, &mut *watches, next, record_history)
        };

        debug!(
            revision = transition.revision,
            changed = transition.changed,
            changes = transition.changes.len(),
            "state transition"
        );
        for (id, path, callback, value) in fired {
            trace!(watch = id.0, path = %path, "watch fired");
            callback(&value);
        }
        Ok(transition)
    }

    fn apply(
        &self,
        inner: &mut Inner,
        watches: &mut [Watch],
        next: Value,
        record_history: bool,
    ) -> (Transition, Vec<Fired>) {
        let (merged, changes) = if self.config.record_changes {
            blend_with_changes(&inner.state, &next).into_parts()
        } else {
            (blend(&inner.state, &next), ChangeSet::new())
        };

        let changed = !merged.ptr_eq(&inner.state);
        let mut fired = Vec::new();
        if changed {
            let previous = std::mem::replace(&mut inner.state, merged);
            if record_history && self.config.history_limit > 0 {
                if inner.history.len() == self.config.history_limit {
                    inner.history.pop_front();
                }
                inner.history.push_back(previous);
            }
            inner.revision += 1;
            fired = collect_fired(watches, &inner.state);
        }

        let transition = Transition {
            revision: inner.revision,
            changed,
            changes,
        };
        (transition, fired)
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn lock_watches(&self) -> StoreResult<std::sync::MutexGuard<'_, Vec<Watch>>> {
        self.watches
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

/// Update watch snapshots against `state` and return the ones to notify.
fn collect_fired(watches: &mut [Watch], state: &Value) -> Vec<Fired> {
    let mut fired = Vec::new();
    for watch in watches.iter_mut() {
        let current = state.get_path(&watch.path).cloned().unwrap_or_default();
        if !current.ptr_eq(&watch.last) {
            watch.last = current.clone();
            fired.push((watch.id, watch.path.clone(), Arc::clone(&watch.callback), current));
        }
    }
    fired
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(Value::absent())
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
