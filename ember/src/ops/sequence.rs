//! Generic length, subscript and slice operations

use super::dispatch::{mapping_slot, sequence_slot};
use crate::error::{Error, ErrorKind, Result};
use crate::object::ObjRef;

/// Sequence length, else mapping length
pub fn length(obj: &ObjRef) -> Result<usize> {
    let descriptor = obj.descriptor();
    if let Some(length) = descriptor.sequence.and_then(|m| m.length) {
        return length(obj);
    }
    if let Some(length) = descriptor.mapping.and_then(|m| m.length) {
        return length(obj);
    }
    Err(Error::type_mismatch("len() of unsized object"))
}

/// Resolve a possibly negative index against `len`
fn normalize(index: i64, len: usize, what: &str) -> Result<usize> {
    let resolved = if index < 0 {
        i128::from(index) + len as i128
    } else {
        i128::from(index)
    };
    usize::try_from(resolved)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| Error::index(format!("{what} index out of range")))
}

/// Clamp slice bounds the way the slice slots expect them
fn slice_bounds(lo: Option<i64>, hi: Option<i64>, len: usize) -> (usize, usize) {
    let clamp = |bound: i64| -> usize {
        let resolved = if bound < 0 {
            i128::from(bound) + len as i128
        } else {
            i128::from(bound)
        };
        resolved.clamp(0, len as i128) as usize
    };
    let lo = lo.map_or(0, clamp);
    let hi = hi.map_or(len, clamp).max(lo);
    (lo, hi)
}

/// `obj[key]`
pub fn get_item(obj: &ObjRef, key: &ObjRef) -> Result<ObjRef> {
    if obj.descriptor().sequence.is_some() {
        let index = key.as_int().ok_or_else(|| {
            Error::type_mismatch(format!(
                "sequence index must be integer, not '{}'",
                key.type_name()
            ))
        })?;
        let item = sequence_slot(obj, "subscript", |m| m.item)?;
        let len = length(obj)?;
        return item(obj, normalize(index, len, obj.type_name())?);
    }
    let subscript = mapping_slot(obj, "subscript", |m| m.subscript)?;
    subscript(obj, key)
}

/// `obj[key] = value`
pub fn set_item(obj: &ObjRef, key: &ObjRef, value: ObjRef) -> Result<()> {
    if obj.descriptor().sequence.is_some() {
        let assign = sequence_slot(obj, "item assignment", |m| m.ass_item)?;
        let index = key.as_int().ok_or_else(|| {
            Error::type_mismatch("sequence index must be integer")
        })?;
        let len = length(obj)?;
        return assign(obj, normalize(index, len, obj.type_name())?, value);
    }
    let assign = mapping_slot(obj, "item assignment", |m| m.ass_subscript)?;
    assign(obj, key, value)
}

/// `obj[lo:hi]`
pub fn get_slice(obj: &ObjRef, lo: Option<i64>, hi: Option<i64>) -> Result<ObjRef> {
    let slice = sequence_slot(obj, "slice", |m| m.slice)?;
    let (lo, hi) = slice_bounds(lo, hi, length(obj)?);
    slice(obj, lo, hi)
}

/// `obj[lo:hi] = value`; `None` deletes the range
pub fn set_slice(
    obj: &ObjRef,
    lo: Option<i64>,
    hi: Option<i64>,
    value: Option<&ObjRef>,
) -> Result<()> {
    let assign = sequence_slot(obj, "slice assignment", |m| m.ass_slice)?;
    let (lo, hi) = slice_bounds(lo, hi, length(obj)?);
    assign(obj, lo, hi, value)
}

/// Collect the items of any sequence into a vector
pub fn to_vec(obj: &ObjRef, op: &str) -> Result<Vec<ObjRef>> {
    if let Some(s) = obj.as_str() {
        let mut out = Vec::new();
        out.try_reserve_exact(s.chars().count())?;
        out.extend(s.chars().map(|c| ObjRef::str(c.to_string())));
        return Ok(out);
    }
    let item = sequence_slot(obj, op, |m| m.item)?;
    let len = length(obj)?;
    let mut out = Vec::new();
    out.try_reserve_exact(len)?;
    for i in 0..len {
        out.push(item(obj, i)?);
    }
    Ok(out)
}

/// Keyed lookup that reports a missing key as `None`.
///
/// Only a Key error is treated as absence; any other failure propagates.
pub fn lookup(mapping: &ObjRef, key: &str) -> Result<Option<ObjRef>> {
    if let Some(dict) = mapping.as_dict() {
        return Ok(dict.borrow().get_str(key));
    }
    let subscript = mapping_slot(mapping, "name lookup", |m| m.subscript)?;
    match subscript(mapping, &ObjRef::str(key)) {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is(ErrorKind::Key) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Dict;

    fn ints(values: &[i64]) -> ObjRef {
        ObjRef::list(values.iter().copied().map(ObjRef::int).collect())
    }

    #[test]
    fn test_length_of_sequence_and_mapping() {
        assert_eq!(length(&ObjRef::str("abc")).unwrap(), 3);
        assert_eq!(length(&ObjRef::dict(Dict::new())).unwrap(), 0);
        let err = length(&ObjRef::int(3)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_to_vec_splits_text_by_character() {
        let items = to_vec(&ObjRef::str("añb"), "test").unwrap();
        assert_eq!(items, vec![ObjRef::str("a"), ObjRef::str("ñ"), ObjRef::str("b")]);
        assert!(to_vec(&ObjRef::str(""), "test").unwrap().is_empty());
        assert_eq!(to_vec(&ints(&[1, 2]), "test").unwrap(), vec![ObjRef::int(1), ObjRef::int(2)]);
    }

    #[test]
    fn test_negative_index() {
        let list = ints(&[1, 2, 3]);
        assert_eq!(get_item(&list, &ObjRef::int(-1)).unwrap(), ObjRef::int(3));
        assert_eq!(get_item(&list, &ObjRef::int(3)).unwrap_err().kind, ErrorKind::Index);
        assert_eq!(get_item(&list, &ObjRef::int(-4)).unwrap_err().kind, ErrorKind::Index);
    }

    #[test]
    fn test_tuple_item_assignment_unsupported() {
        let tuple = ObjRef::tuple(vec![ObjRef::int(1)]);
        let err = set_item(&tuple, &ObjRef::int(0), ObjRef::int(2)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_slices_clamp() {
        let list = ints(&[1, 2, 3, 4]);
        assert_eq!(get_slice(&list, Some(-2), None).unwrap(), ints(&[3, 4]));
        assert_eq!(get_slice(&list, Some(3), Some(1)).unwrap(), ints(&[]));
        assert_eq!(get_slice(&list, None, Some(100)).unwrap(), ints(&[1, 2, 3, 4]));
        set_slice(&list, Some(1), Some(3), None).unwrap();
        assert_eq!(list, ints(&[1, 4]));
    }

    #[test]
    fn test_dict_subscript() {
        let dict = ObjRef::dict(Dict::new());
        set_item(&dict, &ObjRef::str("k"), ObjRef::int(1)).unwrap();
        assert_eq!(get_item(&dict, &ObjRef::str("k")).unwrap(), ObjRef::int(1));
        assert_eq!(lookup(&dict, "k").unwrap(), Some(ObjRef::int(1)));
        assert_eq!(lookup(&dict, "missing").unwrap(), None);
    }
}
