//! Reference-preserving structural merge.
//!
//! [`blend`] takes the previous and next value of a slot and returns a value
//! deeply equal to the next one that reuses the previous value's allocations
//! wherever nothing changed. A caller holding the result can then compare any
//! subtree against the previous state with [`Value::ptr_eq`] instead of a
//! deep comparison.
//!
//! # Key Types
//!
//! - [`blend`] / [`blend_observed`] -- the merge itself
//! - [`BlendObserver`] -- callbacks fired while the merge walks the tree
//! - [`blend_with_changes`] / [`ChangeSet`] / [`Change`] -- merge plus a
//!   report of what was added, removed, modified, rebuilt, and shared
//!
//! Inputs must be finite and acyclic. There is no cycle or depth guard.
//!
//! [`Value::ptr_eq`]: blend_types::Value::ptr_eq

pub mod blend;
pub mod changes;
pub mod observer;

pub use blend::{blend, blend_observed};
pub use changes::{blend_with_changes, Blended, Change, ChangeSet};
pub use observer::{BlendObserver, NoopObserver};
