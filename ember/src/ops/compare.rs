//! Ordering and equality

use super::coerce::coerce;
use super::dispatch::has_number;
use crate::ast::CmpOp;
use crate::config::{DEFAULT_RECURSION_LIMIT, DEFAULT_STACK_GROW_SIZE, DEFAULT_STACK_RED_ZONE};
use crate::error::{Error, Result};
use crate::object::{Object, ObjRef};
use std::cmp::Ordering;

/// Three-way comparison.
///
/// Numbers compare after coercion, strings and sequences lexicographically.
/// Unrelated types order by type name; same-type values without a natural
/// order fall back to identity. Nesting deeper than the default recursion
/// limit, as with a list that contains itself, is a recursion error.
pub fn compare(a: &ObjRef, b: &ObjRef) -> Result<Ordering> {
    compare_at(a, b, 0)
}

fn compare_at(a: &ObjRef, b: &ObjRef, depth: usize) -> Result<Ordering> {
    if a.is(b) {
        return Ok(Ordering::Equal);
    }
    if has_number(a) && has_number(b) {
        let (x, y) = coerce(a, b)?;
        return match (&*x, &*y) {
            (Object::Int(p), Object::Int(q)) => Ok(p.cmp(q)),
            (Object::Float(p), Object::Float(q)) => p
                .partial_cmp(q)
                .ok_or_else(|| Error::value("cannot order nan")),
            (Object::Native(n), _) => n.compare(&y).ok_or_else(|| {
                Error::type_mismatch(format!("'{}' objects are unordered", x.type_name()))
            }),
            _ => Err(Error::type_mismatch(format!(
                "cannot compare '{}' and '{}'",
                a.type_name(),
                b.type_name()
            ))),
        };
    }
    match (&**a, &**b) {
        (Object::Str(p), Object::Str(q)) => Ok(p.cmp(q)),
        (Object::Tuple(p), Object::Tuple(q)) => compare_items(p, q, depth),
        (Object::List(p), Object::List(q)) => {
            let (p, q) = (p.borrow().clone(), q.borrow().clone());
            compare_items(&p, &q, depth)
        }
        (Object::None, Object::None) => Ok(Ordering::Equal),
        _ if std::ptr::eq(a.descriptor(), b.descriptor()) => {
            if a.equals(b) {
                Ok(Ordering::Equal)
            } else {
                Ok(a.id().cmp(&b.id()))
            }
        }
        _ => Ok(a.type_name().cmp(b.type_name())),
    }
}

fn compare_items(p: &[ObjRef], q: &[ObjRef], depth: usize) -> Result<Ordering> {
    if depth >= DEFAULT_RECURSION_LIMIT {
        return Err(Error::recursion(DEFAULT_RECURSION_LIMIT));
    }
    for (x, y) in p.iter().zip(q) {
        let ordering = stacker::maybe_grow(DEFAULT_STACK_RED_ZONE, DEFAULT_STACK_GROW_SIZE, || {
            compare_at(x, y, depth + 1)
        })?;
        if ordering != Ordering::Equal {
            return Ok(ordering);
        }
    }
    Ok(p.len().cmp(&q.len()))
}

/// Evaluate a comparison operator
pub fn rich(op: CmpOp, a: &ObjRef, b: &ObjRef) -> Result<bool> {
    Ok(match op {
        CmpOp::Eq => equal(a, b)?,
        CmpOp::Ne => !equal(a, b)?,
        CmpOp::Lt => compare(a, b)? == Ordering::Less,
        CmpOp::Le => compare(a, b)? != Ordering::Greater,
        CmpOp::Gt => compare(a, b)? == Ordering::Greater,
        CmpOp::Ge => compare(a, b)? != Ordering::Less,
    })
}

/// Equality; extension numbers are compared through coercion
pub fn equal(a: &ObjRef, b: &ObjRef) -> Result<bool> {
    if (a.is_native() || b.is_native()) && has_number(a) && has_number(b) {
        return Ok(compare(a, b)? == Ordering::Equal);
    }
    Ok(a.equals(b))
}
