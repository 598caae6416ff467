//! Eager and lazy integer progressions

use super::take_between;
use crate::error::{Error, Result};
use crate::interp::Interpreter;
use crate::object::{Object, ObjRef, RangeObject};

/// Number of elements in `start, start+step, ...` strictly before `stop`.
///
/// Rounds up on the magnitude for either step sign and clamps at zero.
pub fn range_length(start: i64, stop: i64, step: i64) -> Result<usize> {
    if step == 0 {
        return Err(Error::value("zero step for range()"));
    }
    let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
    let (span, magnitude) = if step > 0 {
        (stop - start, step)
    } else {
        (start - stop, -step)
    };
    if span <= 0 {
        return Ok(0);
    }
    let len = (span + magnitude - 1) / magnitude;
    usize::try_from(len).map_err(|_| Error::overflow("range() has too many items"))
}

/// `range(stop)`, `range(start, stop)` or `range(start, stop, step)` as
/// (start, stop, step)
fn bounds(name: &str, args: ObjRef) -> Result<(i64, i64, i64)> {
    let items = take_between(name, args, 1, 3)?;
    let mut ints = Vec::with_capacity(items.len());
    for item in &items {
        let n = item.as_int().ok_or_else(|| {
            Error::type_mismatch(format!(
                "{name}() requires integer arguments, not '{}'",
                item.type_name()
            ))
        })?;
        ints.push(n);
    }
    Ok(match ints[..] {
        [stop] => (0, stop, 1),
        [start, stop] => (start, stop, 1),
        [start, stop, step] => (start, stop, step),
        _ => return Err(Error::arity(name, 1, 3, ints.len())),
    })
}

/// Materialize the progression as a list
pub fn range(start: i64, stop: i64, step: i64) -> Result<ObjRef> {
    let len = range_length(start, stop, step)?;
    let mut items = Vec::new();
    items.try_reserve_exact(len)?;
    let mut value = start;
    for _ in 0..len {
        items.push(ObjRef::int(value));
        value = value.wrapping_add(step);
    }
    Ok(ObjRef::list(items))
}

/// Lazy progression computing each element on demand
pub fn xrange(start: i64, stop: i64, step: i64) -> Result<ObjRef> {
    let len = range_length(start, stop, step)?;
    Ok(ObjRef::new(Object::Range(RangeObject { start, len, step })))
}

pub fn builtin_range(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let (start, stop, step) = bounds("range", args)?;
    range(start, stop, step)
}

pub fn builtin_xrange(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let (start, stop, step) = bounds("xrange", args)?;
    xrange(start, stop, step)
}
