use blend_types::{KeyPath, Value};

/// Callbacks fired while a blend walks two value trees.
///
/// Every method has an empty default, so an observer only implements what it
/// needs. Paths are relative to the root passed to [`blend_observed`].
///
/// [`blend_observed`]: crate::blend_observed
pub trait BlendObserver {
    /// A slot resolved to the old value. Fires for leaves and for records,
    /// including records whose children were all kept.
    fn kept(&mut self, _path: &KeyPath, _old: &Value) {}

    /// A slot took the new value wholesale: a leaf changed, or the slot
    /// changed between leaf and record.
    fn replaced(&mut self, _path: &KeyPath, _old: &Value, _new: &Value) {}

    /// A record key exists in the new record only.
    fn added(&mut self, _path: &KeyPath, _new: &Value) {}

    /// A record key exists in the old record only.
    fn removed(&mut self, _path: &KeyPath, _old: &Value) {}

    /// A record was reconstructed because something beneath it changed.
    fn rebuilt(&mut self, _path: &KeyPath) {}
}

/// Observer that ignores every callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl BlendObserver for NoopObserver {}

impl<O: BlendObserver + ?Sized> BlendObserver for &mut O {
    fn kept(&mut self, path: &KeyPath, old: &Value) {
        (**self).kept(path, old);
    }

    fn replaced(&mut self, path: &KeyPath, old: &Value, new: &Value) {
        (**self).replaced(path, old, new);
    }

    fn added(&mut self, path: &KeyPath, new: &Value) {
        (**self).added(path, new);
    }

    fn removed(&mut self, path: &KeyPath, old: &Value) {
        (**self).removed(path, old);
    }

    fn rebuilt(&mut self, path: &KeyPath) {
        (**self).rebuilt(path);
    }
}
