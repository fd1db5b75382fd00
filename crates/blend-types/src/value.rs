use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::path::KeyPath;
use crate::record::Record;

/// A value that can flow through a blend.
///
/// Cloning a `Value` never copies a record, string, or list: clones share the
/// same allocation, which is what makes identity comparison meaningful.
#[derive(Clone, Debug)]
pub enum Value {
    /// Anything that is not a plain record.
    Leaf(Leaf),
    /// A plain key-value container.
    Record(Record),
}

/// Non-record values.
///
/// A blend never recurses into a leaf: it keeps or replaces it whole. Value
/// equality still looks inside lists, so an equal list counts as unchanged.
#[derive(Clone, Debug, Default)]
pub enum Leaf {
    /// No value provided. Distinct from [`Leaf::Null`].
    #[default]
    Absent,
    /// An explicit null.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Arc<str>),
    /// An ordered sequence, treated as a single unit.
    List(Arc<[Value]>),
    Opaque(Opaque),
}

/// A host object carried through a value tree without being inspected.
///
/// Two opaque values are equal only when they point at the same allocation.
#[derive(Clone)]
pub struct Opaque(Arc<dyn Any + Send + Sync>);

impl Opaque {
    /// Wrap a host object.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Wrap an already shared host object without reallocating it.
    pub fn from_arc(inner: Arc<dyn Any + Send + Sync>) -> Self {
        Self(inner)
    }

    /// Borrow the wrapped object if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Returns `true` if both handles point at the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}

impl Leaf {
    /// Value equality: primitives by value, strings by content, lists
    /// element-wise, opaque objects by pointer.
    ///
    /// `Absent` and `Null` are each equal only to themselves. Numbers form a
    /// single kind: `Int(5)` equals `Float(5.0)`, and `NaN` equals nothing.
    pub fn value_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Leaf::Absent, Leaf::Absent) | (Leaf::Null, Leaf::Null) => true,
            (Leaf::Bool(a), Leaf::Bool(b)) => a == b,
            (Leaf::Int(a), Leaf::Int(b)) => a == b,
            (Leaf::Float(a), Leaf::Float(b)) => a == b,
            (Leaf::Int(i), Leaf::Float(f)) | (Leaf::Float(f), Leaf::Int(i)) => int_eq_float(*i, *f),
            (Leaf::String(a), Leaf::String(b)) => Arc::ptr_eq(a, b) || a == b,
            (Leaf::List(a), Leaf::List(b)) => Arc::ptr_eq(a, b) || a[..] == b[..],
            (Leaf::Opaque(a), Leaf::Opaque(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Identity: same allocation for heap-backed leaves, same variant and
    /// bits for inline scalars.
    ///
    /// Two `NaN` floats with the same bits are identical even though they are
    /// never value-equal.
    pub fn is_identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Leaf::Absent, Leaf::Absent) | (Leaf::Null, Leaf::Null) => true,
            (Leaf::Bool(a), Leaf::Bool(b)) => a == b,
            (Leaf::Int(a), Leaf::Int(b)) => a == b,
            (Leaf::Float(a), Leaf::Float(b)) => a.to_bits() == b.to_bits(),
            (Leaf::String(a), Leaf::String(b)) => Arc::ptr_eq(a, b),
            (Leaf::List(a), Leaf::List(b)) => Arc::ptr_eq(a, b),
            (Leaf::Opaque(a), Leaf::Opaque(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Short name of the leaf kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Leaf::Absent => "absent",
            Leaf::Null => "null",
            Leaf::Bool(_) => "bool",
            Leaf::Int(_) => "int",
            Leaf::Float(_) => "float",
            Leaf::String(_) => "string",
            Leaf::List(_) => "list",
            Leaf::Opaque(_) => "opaque",
        }
    }
}

/// Exact comparison: `f` must be integral and convert to `i` without rounding.
fn int_eq_float(i: i64, f: f64) -> bool {
    // 2^63 is the first float past i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) && f as i64 == i
}

impl PartialEq for Leaf {
    fn eq(&self, other: &Self) -> bool {
        self.value_eq(other)
    }
}

impl Value {
    /// The absence sentinel.
    pub const fn absent() -> Self {
        Value::Leaf(Leaf::Absent)
    }

    /// An explicit null.
    pub const fn null() -> Self {
        Value::Leaf(Leaf::Null)
    }

    /// Wrap a host object as an opaque leaf.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Value::Leaf(Leaf::Opaque(Opaque::new(value)))
    }

    /// Build a list leaf.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Leaf(Leaf::List(items.into_iter().collect()))
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Leaf(Leaf::Absent))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Leaf(Leaf::Null))
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            Value::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Value::Leaf(leaf) => Some(leaf),
            Value::Record(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Leaf(Leaf::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Leaf(Leaf::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Leaf(Leaf::Float(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Leaf(Leaf::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Look up a key if this value is a record.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_record().and_then(|record| record.get(key))
    }

    /// Walk a key path from this value. The root path yields `self`.
    ///
    /// Returns `None` if a key is missing or a leaf is reached before the
    /// path is exhausted.
    pub fn get_path(&self, path: &KeyPath) -> Option<&Value> {
        path.segments()
            .iter()
            .try_fold(self, |current, key| current.get(key))
    }

    /// Identity comparison.
    ///
    /// Records, strings, lists and opaque objects are identical only when
    /// they share an allocation. Inline scalars are identical when they have
    /// the same variant and bits, so `Int(5)` and `Float(5.0)` are equal but
    /// not identical. Two values that are deeply equal but were built
    /// separately are *not* identical.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Record(a), Value::Record(b)) => a.ptr_eq(b),
            (Value::Leaf(a), Value::Leaf(b)) => a.is_identical(b),
            _ => false,
        }
    }

    /// Short name of the value kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Leaf(leaf) => leaf.kind_name(),
            Value::Record(_) => "record",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::absent()
    }
}

/// Deep structural equality.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Leaf(a), Value::Leaf(b)) => a.value_eq(b),
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Leaf> for Value {
    fn from(leaf: Leaf) -> Self {
        Value::Leaf(leaf)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<Opaque> for Value {
    fn from(opaque: Opaque) -> Self {
        Value::Leaf(Leaf::Opaque(opaque))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Leaf(Leaf::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Leaf(Leaf::Int(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Leaf(Leaf::Int(i64::from(n)))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Leaf(Leaf::Float(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Leaf(Leaf::String(Arc::from(s)))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Leaf(Leaf::String(Arc::from(s)))
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Value::Leaf(Leaf::String(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Leaf(Leaf::List(Arc::from(items)))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Value::absent, Into::into)
    }
}
