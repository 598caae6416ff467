//! Numeric coercion
//!
//! Brings two operands to a common representation before a binary slot
//! runs. Operands of the same built-in type pass through unchanged;
//! otherwise the left operand's hook is asked first, then the right
//! operand's with the pair swapped. Neither operand needs a Number table
//! of its own: a type without one simply has no hook.

use crate::error::{Error, Result};
use crate::object::{CoerceFn, ObjRef};
use std::ptr;
use tracing::trace;

fn hook(obj: &ObjRef) -> Option<CoerceFn> {
    obj.descriptor().number.and_then(|m| m.coerce)
}

/// Returns a new owning reference for each operand, possibly converted.
///
/// On failure no new references survive: anything a hook produced is
/// dropped before the error is returned.
pub fn coerce(a: &ObjRef, b: &ObjRef) -> Result<(ObjRef, ObjRef)> {
    if ptr::eq(a.descriptor(), b.descriptor()) && !a.is_native() {
        return Ok((a.clone(), b.clone()));
    }

    if let Some(left) = hook(a) {
        if let Some(pair) = left(a, b)? {
            return Ok(pair);
        }
    }
    if let Some(right) = hook(b) {
        if let Some((b2, a2)) = right(b, a)? {
            return Ok((a2, b2));
        }
    }

    trace!(left = a.type_name(), right = b.type_name(), "coercion failed");
    Err(Error::type_mismatch("number coercion failed: no common numeric representation"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::object::{NativeObject, NumberMethods, TypeDescriptor};
    use std::any::Any;

    #[test]
    fn test_same_type_is_unchanged_and_counted() {
        let a = ObjRef::int(3);
        let b = ObjRef::int(4);
        let (x, y) = coerce(&a, &b).unwrap();
        assert!(x.is(&a));
        assert!(y.is(&b));
        assert_eq!(a.ref_count(), 2);
        drop((x, y));
        assert_eq!(a.ref_count(), 1);
    }

    #[test]
    fn test_int_float_widens_either_side() {
        let (x, y) = coerce(&ObjRef::int(1), &ObjRef::float(2.5)).unwrap();
        assert_eq!((x.as_float(), y.as_float()), (Some(1.0), Some(2.5)));
        let (x, y) = coerce(&ObjRef::float(2.5), &ObjRef::int(1)).unwrap();
        assert_eq!((x.as_float(), y.as_float()), (Some(2.5), Some(1.0)));
    }

    #[test]
    fn test_non_number_fails() {
        let err = coerce(&ObjRef::int(1), &ObjRef::str("1")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_same_non_numeric_type_passes_through() {
        let (x, y) = coerce(&ObjRef::str("a"), &ObjRef::str("b")).unwrap();
        assert_eq!((x.as_str(), y.as_str()), (Some("a"), Some("b")));
        let left = ObjRef::list(vec![ObjRef::int(1)]);
        let (x, _) = coerce(&left, &ObjRef::list(vec![])).unwrap();
        assert!(x.is(&left));
    }

    /// Native number that absorbs any string on the other side
    struct Label(String);

    static LABEL_NUMBER: NumberMethods = NumberMethods {
        coerce: Some(label_coerce),
        ..NumberMethods::EMPTY
    };

    static LABEL_TYPE: TypeDescriptor = TypeDescriptor {
        number: Some(&LABEL_NUMBER),
        ..TypeDescriptor::plain("label")
    };

    impl NativeObject for Label {
        fn descriptor(&self) -> &'static TypeDescriptor {
            &LABEL_TYPE
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn repr(&self) -> String {
            format!("<label {}>", self.0)
        }
    }

    fn label_coerce(a: &ObjRef, b: &ObjRef) -> Result<Option<(ObjRef, ObjRef)>> {
        Ok(b.as_str()
            .map(|s| (a.clone(), ObjRef::native(Label(s.to_string())))))
    }

    #[test]
    fn test_right_hook_runs_for_non_number_left() {
        let label = ObjRef::native(Label("x".to_string()));
        let (x, y) = coerce(&ObjRef::str("s"), &label).unwrap();
        assert_eq!(x.repr(), "<label s>");
        assert!(y.is(&label));

        let err = coerce(&ObjRef::list(vec![]), &label).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_failure_leaves_counts_untouched() {
        let a = ObjRef::int(1);
        let b = ObjRef::list(vec![]);
        assert!(coerce(&a, &b).is_err());
        assert_eq!(a.ref_count(), 1);
        assert_eq!(b.ref_count(), 1);
    }
}
