//! Sequence slots for strings, tuples, lists and lazy ranges
//!
//! Slots receive indices already normalized by the generic layer, but
//! still bounds-check them since map, filter and reduce call them
//! directly.

use super::{Object, ObjRef, SequenceMethods};
use crate::error::{Error, Result};
use std::fmt;

pub static STR_SEQUENCE: SequenceMethods = SequenceMethods {
    length: Some(str_length),
    concat: Some(str_concat),
    repeat: Some(str_repeat),
    item: Some(str_item),
    slice: Some(str_slice),
    ..SequenceMethods::EMPTY
};

pub static TUPLE_SEQUENCE: SequenceMethods = SequenceMethods {
    length: Some(tuple_length),
    concat: Some(tuple_concat),
    repeat: Some(tuple_repeat),
    item: Some(tuple_item),
    slice: Some(tuple_slice),
    ..SequenceMethods::EMPTY
};

pub static LIST_SEQUENCE: SequenceMethods = SequenceMethods {
    length: Some(list_length),
    concat: Some(list_concat),
    repeat: Some(list_repeat),
    item: Some(list_item),
    slice: Some(list_slice),
    ass_item: Some(list_ass_item),
    ass_slice: Some(list_ass_slice),
};

pub static RANGE_SEQUENCE: SequenceMethods = SequenceMethods {
    length: Some(range_length),
    item: Some(range_item),
    ..SequenceMethods::EMPTY
};

fn wrong_receiver(expected: &str, obj: &ObjRef) -> Error {
    Error::internal(format!(
        "{expected} slot called with '{}'",
        obj.type_name()
    ))
}

fn out_of_range(what: &str) -> Error {
    Error::index(format!("{what} index out of range"))
}

fn cannot_concat(a: &ObjRef, b: &ObjRef) -> Error {
    Error::type_mismatch(format!(
        "cannot concatenate '{}' and '{}' objects",
        a.type_name(),
        b.type_name()
    ))
}

/// Copy `items` `count` times into a fresh vector
fn repeated<T: Clone>(items: &[T], count: usize) -> Result<Vec<T>> {
    let total = items
        .len()
        .checked_mul(count)
        .ok_or_else(|| Error::allocation("repeated sequence is too long"))?;
    let mut out = Vec::new();
    out.try_reserve_exact(total)?;
    for _ in 0..count {
        out.extend_from_slice(items);
    }
    Ok(out)
}

// ---- string ----

fn text(obj: &ObjRef) -> Result<&str> {
    obj.as_str().ok_or_else(|| wrong_receiver("string", obj))
}

fn str_length(obj: &ObjRef) -> Result<usize> {
    Ok(text(obj)?.chars().count())
}

fn str_concat(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let left = text(a)?;
    let right = b.as_str().ok_or_else(|| cannot_concat(a, b))?;
    let mut out = String::new();
    out.try_reserve_exact(left.len() + right.len())?;
    out.push_str(left);
    out.push_str(right);
    Ok(ObjRef::str(out))
}

fn str_repeat(obj: &ObjRef, count: usize) -> Result<ObjRef> {
    let bytes = repeated(text(obj)?.as_bytes(), count)?;
    String::from_utf8(bytes)
        .map(ObjRef::str)
        .map_err(|e| Error::internal(e.to_string()))
}

fn str_item(obj: &ObjRef, index: usize) -> Result<ObjRef> {
    text(obj)?
        .chars()
        .nth(index)
        .map(|c| ObjRef::str(c.to_string()))
        .ok_or_else(|| out_of_range("string"))
}

fn str_slice(obj: &ObjRef, lo: usize, hi: usize) -> Result<ObjRef> {
    let s: String = text(obj)?.chars().skip(lo).take(hi.saturating_sub(lo)).collect();
    Ok(ObjRef::str(s))
}

// ---- tuple ----

fn tuple_items(obj: &ObjRef) -> Result<&[ObjRef]> {
    obj.as_tuple().ok_or_else(|| wrong_receiver("tuple", obj))
}

fn tuple_length(obj: &ObjRef) -> Result<usize> {
    Ok(tuple_items(obj)?.len())
}

fn tuple_concat(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let left = tuple_items(a)?;
    let right = b.as_tuple().ok_or_else(|| cannot_concat(a, b))?;
    let mut out = Vec::new();
    out.try_reserve_exact(left.len() + right.len())?;
    out.extend_from_slice(left);
    out.extend_from_slice(right);
    Ok(ObjRef::tuple(out))
}

fn tuple_repeat(obj: &ObjRef, count: usize) -> Result<ObjRef> {
    if count == 1 {
        return Ok(obj.clone());
    }
    repeated(tuple_items(obj)?, count).map(ObjRef::tuple)
}

fn tuple_item(obj: &ObjRef, index: usize) -> Result<ObjRef> {
    tuple_items(obj)?
        .get(index)
        .cloned()
        .ok_or_else(|| out_of_range("tuple"))
}

fn tuple_slice(obj: &ObjRef, lo: usize, hi: usize) -> Result<ObjRef> {
    let items = tuple_items(obj)?;
    if lo == 0 && hi >= items.len() {
        return Ok(obj.clone());
    }
    Ok(ObjRef::tuple(items[lo.min(items.len())..hi.min(items.len())].to_vec()))
}

// ---- list ----

fn list_cell(obj: &ObjRef) -> Result<&std::cell::RefCell<Vec<ObjRef>>> {
    obj.as_list().ok_or_else(|| wrong_receiver("list", obj))
}

fn list_length(obj: &ObjRef) -> Result<usize> {
    Ok(list_cell(obj)?.borrow().len())
}

fn list_concat(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let left = list_cell(a)?.borrow();
    let right = b.as_list().ok_or_else(|| cannot_concat(a, b))?.borrow();
    let mut out = Vec::new();
    out.try_reserve_exact(left.len() + right.len())?;
    out.extend_from_slice(&left);
    out.extend_from_slice(&right);
    Ok(ObjRef::list(out))
}

fn list_repeat(obj: &ObjRef, count: usize) -> Result<ObjRef> {
    repeated(&list_cell(obj)?.borrow(), count).map(ObjRef::list)
}

fn list_item(obj: &ObjRef, index: usize) -> Result<ObjRef> {
    list_cell(obj)?
        .borrow()
        .get(index)
        .cloned()
        .ok_or_else(|| out_of_range("list"))
}

fn list_slice(obj: &ObjRef, lo: usize, hi: usize) -> Result<ObjRef> {
    let items = list_cell(obj)?.borrow();
    let hi = hi.min(items.len());
    Ok(ObjRef::list(items[lo.min(hi)..hi].to_vec()))
}

fn list_ass_item(obj: &ObjRef, index: usize, value: ObjRef) -> Result<()> {
    let mut items = list_cell(obj)?.borrow_mut();
    let slot = items
        .get_mut(index)
        .ok_or_else(|| out_of_range("list assignment"))?;
    *slot = value;
    Ok(())
}

fn list_ass_slice(obj: &ObjRef, lo: usize, hi: usize, value: Option<&ObjRef>) -> Result<()> {
    let replacement: Vec<ObjRef> = match value {
        None => Vec::new(),
        Some(v) => match &**v {
            Object::List(items) => items.borrow().clone(),
            Object::Tuple(items) => items.clone(),
            _ => {
                return Err(Error::type_mismatch(
                    "must assign list or tuple to slice",
                ));
            }
        },
    };
    let mut items = list_cell(obj)?.borrow_mut();
    let hi = hi.min(items.len());
    let lo = lo.min(hi);
    items.splice(lo..hi, replacement).for_each(drop);
    Ok(())
}

// ---- range ----

/// Lazy arithmetic progression produced by `xrange`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeObject {
    pub start: i64,
    pub len: usize,
    pub step: i64,
}

impl RangeObject {
    /// Element `index`, which must be below `len`
    pub fn get(&self, index: usize) -> Option<i64> {
        if index >= self.len {
            return None;
        }
        let value = i128::from(self.start) + (index as i128) * i128::from(self.step);
        i64::try_from(value).ok()
    }
}

impl fmt::Display for RangeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stop = i128::from(self.start) + (self.len as i128) * i128::from(self.step);
        write!(f, "xrange({}, {}, {})", self.start, stop, self.step)
    }
}

fn range_of(obj: &ObjRef) -> Result<&RangeObject> {
    match &**obj {
        Object::Range(range) => Ok(range),
        _ => Err(wrong_receiver("xrange", obj)),
    }
}

fn range_length(obj: &ObjRef) -> Result<usize> {
    Ok(range_of(obj)?.len)
}

fn range_item(obj: &ObjRef, index: usize) -> Result<ObjRef> {
    range_of(obj)?
        .get(index)
        .map(ObjRef::int)
        .ok_or_else(|| out_of_range("xrange object"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn ints(values: &[i64]) -> Vec<ObjRef> {
        values.iter().copied().map(ObjRef::int).collect()
    }

    #[test]
    fn test_str_slots_count_chars() {
        let s = ObjRef::str("héllo");
        assert_eq!(str_length(&s).unwrap(), 5);
        assert_eq!(str_item(&s, 1).unwrap().as_str(), Some("é"));
        assert_eq!(str_slice(&s, 1, 3).unwrap().as_str(), Some("él"));
        assert_eq!(str_item(&s, 5).unwrap_err().kind, ErrorKind::Index);
    }

    #[test]
    fn test_str_concat_requires_str() {
        let err = str_concat(&ObjRef::str("a"), &ObjRef::int(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_repeat() {
        assert_eq!(str_repeat(&ObjRef::str("ab"), 3).unwrap().as_str(), Some("ababab"));
        let t = tuple_repeat(&ObjRef::tuple(ints(&[1])), 0).unwrap();
        assert_eq!(t.as_tuple().map(<[_]>::len), Some(0));
    }

    #[test]
    fn test_tuple_full_slice_is_same_object() {
        let t = ObjRef::tuple(ints(&[1, 2]));
        assert!(tuple_slice(&t, 0, 2).unwrap().is(&t));
        assert_eq!(tuple_slice(&t, 1, 2).unwrap(), ObjRef::tuple(ints(&[2])));
    }

    #[test]
    fn test_list_assignment() {
        let list = ObjRef::list(ints(&[1, 2, 3, 4]));
        list_ass_item(&list, 0, ObjRef::int(9)).unwrap();
        list_ass_slice(&list, 1, 3, Some(&ObjRef::tuple(ints(&[7])))).unwrap();
        assert_eq!(list, ObjRef::list(ints(&[9, 7, 4])));
        list_ass_slice(&list, 1, 10, None).unwrap();
        assert_eq!(list, ObjRef::list(ints(&[9])));
        assert_eq!(
            list_ass_item(&list, 3, ObjRef::none()).unwrap_err().kind,
            ErrorKind::Index
        );
    }

    #[test]
    fn test_range_items() {
        let r = ObjRef::new(Object::Range(RangeObject { start: 10, len: 3, step: -4 }));
        assert_eq!(range_length(&r).unwrap(), 3);
        assert_eq!(range_item(&r, 2).unwrap(), ObjRef::int(2));
        assert!(range_item(&r, 3).is_err());
        assert_eq!(r.repr(), "xrange(10, -2, -4)");
    }
}
