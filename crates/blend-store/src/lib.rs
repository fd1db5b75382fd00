//! State container for blend.
//!
//! A [`StateStore`] holds the current state of an application and replaces
//! it on every commit with `blend(current, next)`. Because unchanged subtrees
//! keep their identity, watchers and [`Selector`]s can detect changes by
//! pointer comparison instead of walking the tree.
//!
//! # Key Types
//!
//! - [`StateStore`] / [`Transition`] -- commit, undo, history, watches
//! - [`Selector`] -- projection memoized on the identity of one slot
//! - [`StoreConfig`] -- history depth and change recording, loadable from TOML

pub mod config;
pub mod error;
pub mod selector;
pub mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use selector::Selector;
pub use store::{StateStore, Transition, WatchId};
