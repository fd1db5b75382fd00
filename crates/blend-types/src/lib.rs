//! Value model for blend.
//!
//! A [`Value`] is either a [`Leaf`] (scalars, the absence sentinel, null,
//! lists, and opaque host objects) or a [`Record`]: an immutable, reference
//! counted map from string keys to values. Records are never mutated in place,
//! so two values can share a subtree and callers can compare allocations with
//! [`Value::ptr_eq`] to learn whether a subtree changed.
//!
//! # Key Types
//!
//! - [`Value`] / [`Leaf`] -- the closed set of value kinds
//! - [`Record`] -- shared key-value container with copy-on-derive helpers
//! - [`Opaque`] -- host object compared by pointer, never inspected
//! - [`KeyPath`] -- location of a slot from the root, in dotted notation

pub mod error;
pub mod json;
pub mod path;
pub mod record;
pub mod value;

pub use error::{TypeError, TypeResult};
pub use path::KeyPath;
pub use record::Record;
pub use value::{Leaf, Opaque, Value};
