//! Generic arithmetic
//!
//! Binary operators coerce first and then call the slot of the coerced
//! left operand. `+` and `*` fall back to sequence concatenation and
//! repetition when the operands are not both numbers.

use super::coerce::coerce;
use super::dispatch::{has_number, number_slot, sequence_slot};
use crate::ast::BinOp;
use crate::error::{Error, Result};
use crate::object::{BinaryFn, NumberMethods, ObjRef};

/// Apply a binary operator
pub fn binary(op: BinOp, a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    if has_number(a) && has_number(b) {
        let (x, y) = coerce(a, b)?;
        let slot = match op {
            BinOp::Add => number_slot(&x, "+", |m| m.add)?,
            BinOp::Sub => number_slot(&x, "-", |m| m.subtract)?,
            BinOp::Mul => number_slot(&x, "*", |m| m.multiply)?,
            BinOp::Div => number_slot(&x, "/", |m| m.divide)?,
            BinOp::Mod => number_slot(&x, "%", |m| m.remainder)?,
            BinOp::Pow => number_slot(&x, "**", |m| m.power)?,
        };
        return slot(&x, &y);
    }
    match op {
        BinOp::Add if !has_number(a) => {
            let concat = sequence_slot(a, "+", |m| m.concat)?;
            concat(a, b)
        }
        BinOp::Mul => {
            if let Some(count) = b.as_int().filter(|_| !has_number(a)) {
                let repeat = sequence_slot(a, "*", |m| m.repeat)?;
                repeat(a, repeat_count(count))
            } else if let Some(count) = a.as_int().filter(|_| !has_number(b)) {
                let repeat = sequence_slot(b, "*", |m| m.repeat)?;
                repeat(b, repeat_count(count))
            } else {
                Err(unsupported(op, a, b))
            }
        }
        _ => Err(unsupported(op, a, b)),
    }
}

fn repeat_count(count: i64) -> usize {
    usize::try_from(count).unwrap_or(0)
}

fn unsupported(op: BinOp, a: &ObjRef, b: &ObjRef) -> Error {
    Error::type_mismatch(format!(
        "unsupported operand type(s) for {op}: '{}' and '{}'",
        a.type_name(),
        b.type_name()
    ))
}

pub fn negative(a: &ObjRef) -> Result<ObjRef> {
    number_slot(a, "unary -", |m| m.negative)?(a)
}

pub fn absolute(a: &ObjRef) -> Result<ObjRef> {
    number_slot(a, "abs()", |m| m.absolute)?(a)
}

pub fn to_int(a: &ObjRef) -> Result<ObjRef> {
    number_slot(a, "int()", |m| m.int)?(a)
}

pub fn to_float(a: &ObjRef) -> Result<ObjRef> {
    number_slot(a, "float()", |m| m.float)?(a)
}

pub fn hex(a: &ObjRef) -> Result<ObjRef> {
    number_slot(a, "hex()", |m| m.hex)?(a)
}

pub fn oct(a: &ObjRef) -> Result<ObjRef> {
    number_slot(a, "oct()", |m| m.oct)?(a)
}

/// `divmod` and `pow` demand the number capability on both sides
fn strict_binary(
    name: &str,
    a: &ObjRef,
    b: &ObjRef,
    pick: impl FnOnce(&'static NumberMethods) -> Option<BinaryFn>,
) -> Result<ObjRef> {
    if !has_number(a) || !has_number(b) {
        return Err(Error::type_mismatch(format!(
            "{name} requires numeric arguments, not '{}' and '{}'",
            a.type_name(),
            b.type_name()
        )));
    }
    let (x, y) = coerce(a, b)?;
    number_slot(&x, name, pick)?(&x, &y)
}

pub fn divmod(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    strict_binary("divmod()", a, b, |m| m.divmod)
}

pub fn power(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    strict_binary("pow()", a, b, |m| m.power)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_mixed_arithmetic_coerces() {
        let r = binary(BinOp::Add, &ObjRef::int(1), &ObjRef::float(0.5)).unwrap();
        assert_eq!(r.as_float(), Some(1.5));
        let r = binary(BinOp::Div, &ObjRef::int(7), &ObjRef::int(2)).unwrap();
        assert_eq!(r.as_int(), Some(3));
    }

    #[test]
    fn test_sequence_fallbacks() {
        let r = binary(BinOp::Add, &ObjRef::str("ab"), &ObjRef::str("cd")).unwrap();
        assert_eq!(r.as_str(), Some("abcd"));
        let r = binary(BinOp::Mul, &ObjRef::int(2), &ObjRef::str("ab")).unwrap();
        assert_eq!(r.as_str(), Some("abab"));
        let r = binary(BinOp::Mul, &ObjRef::list(vec![ObjRef::int(1)]), &ObjRef::int(-3)).unwrap();
        assert_eq!(r, ObjRef::list(vec![]));
    }

    #[test]
    fn test_unsupported_operands() {
        let err = binary(BinOp::Sub, &ObjRef::str("a"), &ObjRef::int(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert_eq!(err.message, "unsupported operand type(s) for -: 'string' and 'int'");
        let err = binary(BinOp::Add, &ObjRef::int(1), &ObjRef::str("a")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_unary_and_conversions() {
        assert_eq!(negative(&ObjRef::float(2.0)).unwrap().as_float(), Some(-2.0));
        assert_eq!(absolute(&ObjRef::int(-4)).unwrap().as_int(), Some(4));
        assert_eq!(to_float(&ObjRef::int(3)).unwrap().as_float(), Some(3.0));
        assert_eq!(hex(&ObjRef::int(26)).unwrap().as_str(), Some("0x1a"));
        assert_eq!(hex(&ObjRef::float(1.0)).unwrap_err().kind, ErrorKind::TypeMismatch);
        assert_eq!(absolute(&ObjRef::none()).unwrap_err().kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_divmod_and_pow() {
        assert_eq!(
            divmod(&ObjRef::int(7), &ObjRef::float(2.0)).unwrap(),
            ObjRef::tuple(vec![ObjRef::float(3.0), ObjRef::float(1.0)])
        );
        assert_eq!(power(&ObjRef::int(2), &ObjRef::int(5)).unwrap().as_int(), Some(32));
        assert_eq!(
            power(&ObjRef::str("2"), &ObjRef::int(5)).unwrap_err().kind,
            ErrorKind::TypeMismatch
        );
    }
}
