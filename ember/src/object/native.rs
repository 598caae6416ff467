//! Extension types supplied by embedding code

use super::{ObjRef, TypeDescriptor};
use std::any::Any;
use std::cmp::Ordering;

/// A value whose behaviour lives entirely in its own [`TypeDescriptor`].
///
/// Slots receive the wrapping `ObjRef` and reach the concrete value with
/// [`Object::as_native`](super::Object::as_native).
pub trait NativeObject: Any {
    fn descriptor(&self) -> &'static TypeDescriptor;

    fn as_any(&self) -> &dyn Any;

    fn repr(&self) -> String {
        format!("<{} object>", self.descriptor().name)
    }

    fn is_true(&self) -> bool {
        true
    }

    /// Order against an operand already coerced to this type
    fn compare(&self, _other: &ObjRef) -> Option<Ordering> {
        None
    }
}
