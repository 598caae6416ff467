//! Integer number slots
//!
//! Division and remainder floor toward negative infinity. Every operation
//! that can leave the i64 range reports an Overflow error instead of
//! wrapping.

use super::{NumberMethods, ObjRef};
use crate::error::{Error, Result};

pub static INT_NUMBER: NumberMethods = NumberMethods {
    add: Some(add),
    subtract: Some(subtract),
    multiply: Some(multiply),
    divide: Some(divide),
    remainder: Some(remainder),
    divmod: Some(divmod),
    power: Some(power),
    negative: Some(negative),
    absolute: Some(absolute),
    coerce: Some(coerce),
    int: Some(to_int),
    float: Some(to_float),
    hex: Some(hex),
    oct: Some(oct),
};

/// Both operands as ints; the dispatcher coerces before calling a slot
fn operands(a: &ObjRef, b: &ObjRef) -> Result<(i64, i64)> {
    match (a.as_int(), b.as_int()) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(Error::internal(format!(
            "int slot called with '{}' and '{}'",
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn operand(a: &ObjRef) -> Result<i64> {
    a.as_int()
        .ok_or_else(|| Error::internal(format!("int slot called with '{}'", a.type_name())))
}

fn add(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (x, y) = operands(a, b)?;
    x.checked_add(y)
        .map(ObjRef::int)
        .ok_or_else(|| Error::overflow("integer addition"))
}

fn subtract(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (x, y) = operands(a, b)?;
    x.checked_sub(y)
        .map(ObjRef::int)
        .ok_or_else(|| Error::overflow("integer subtraction"))
}

fn multiply(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (x, y) = operands(a, b)?;
    x.checked_mul(y)
        .map(ObjRef::int)
        .ok_or_else(|| Error::overflow("integer multiplication"))
}

pub(super) fn floor_div(x: i64, y: i64) -> Result<i64> {
    if y == 0 {
        return Err(Error::zero_division("integer division or modulo by zero"));
    }
    let q = x
        .checked_div(y)
        .ok_or_else(|| Error::overflow("integer division"))?;
    if (x % y != 0) && ((x < 0) != (y < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

pub(super) fn floor_mod(x: i64, y: i64) -> Result<i64> {
    if y == 0 {
        return Err(Error::zero_division("integer division or modulo by zero"));
    }
    // i64::MIN % -1 has no overflow-free quotient but the remainder is 0
    let r = x.checked_rem(y).unwrap_or(0);
    if r != 0 && ((r < 0) != (y < 0)) {
        Ok(r + y)
    } else {
        Ok(r)
    }
}

fn divide(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (x, y) = operands(a, b)?;
    floor_div(x, y).map(ObjRef::int)
}

fn remainder(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (x, y) = operands(a, b)?;
    floor_mod(x, y).map(ObjRef::int)
}

fn divmod(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (x, y) = operands(a, b)?;
    let q = floor_div(x, y)?;
    let r = floor_mod(x, y)?;
    Ok(ObjRef::tuple(vec![ObjRef::int(q), ObjRef::int(r)]))
}

fn power(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (base, exp) = operands(a, b)?;
    if exp < 0 {
        return Err(Error::value("integer to the negative power"));
    }
    let mut result: i64 = 1;
    let mut base = base;
    let mut exp = exp;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result
                .checked_mul(base)
                .ok_or_else(|| Error::overflow("integer pow()"))?;
        }
        exp >>= 1;
        if exp > 0 {
            base = base
                .checked_mul(base)
                .ok_or_else(|| Error::overflow("integer pow()"))?;
        }
    }
    Ok(ObjRef::int(result))
}

fn negative(a: &ObjRef) -> Result<ObjRef> {
    operand(a)?
        .checked_neg()
        .map(ObjRef::int)
        .ok_or_else(|| Error::overflow("integer negation"))
}

fn absolute(a: &ObjRef) -> Result<ObjRef> {
    operand(a)?
        .checked_abs()
        .map(ObjRef::int)
        .ok_or_else(|| Error::overflow("integer absolute value"))
}

/// int pairs with int as is and widens itself against float
fn coerce(a: &ObjRef, b: &ObjRef) -> Result<Option<(ObjRef, ObjRef)>> {
    let x = operand(a)?;
    if b.as_int().is_some() {
        return Ok(Some((a.clone(), b.clone())));
    }
    if b.as_float().is_some() {
        return Ok(Some((ObjRef::float(x as f64), b.clone())));
    }
    Ok(None)
}

fn to_int(a: &ObjRef) -> Result<ObjRef> {
    operand(a)?;
    Ok(a.clone())
}

fn to_float(a: &ObjRef) -> Result<ObjRef> {
    Ok(ObjRef::float(operand(a)? as f64))
}

fn hex(a: &ObjRef) -> Result<ObjRef> {
    let x = operand(a)?;
    let text = if x < 0 {
        format!("-0x{:x}", x.unsigned_abs())
    } else {
        format!("0x{x:x}")
    };
    Ok(ObjRef::str(text))
}

fn oct(a: &ObjRef) -> Result<ObjRef> {
    let x = operand(a)?;
    let text = match x {
        0 => "0".to_string(),
        x if x < 0 => format!("-0{:o}", x.unsigned_abs()),
        x => format!("0{x:o}"),
    };
    Ok(ObjRef::str(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn int(n: i64) -> ObjRef {
        ObjRef::int(n)
    }

    #[test]
    fn test_floor_division_and_modulo() {
        assert_eq!(floor_div(7, 2).unwrap(), 3);
        assert_eq!(floor_div(-7, 2).unwrap(), -4);
        assert_eq!(floor_mod(-7, 2).unwrap(), 1);
        assert_eq!(floor_mod(7, -2).unwrap(), -1);
        assert_eq!(floor_mod(i64::MIN, -1).unwrap(), 0);
    }

    #[test]
    fn test_division_by_zero() {
        let err = divide(&int(1), &int(0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ZeroDivision);
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(add(&int(i64::MAX), &int(1)).unwrap_err().kind, ErrorKind::Overflow);
        assert_eq!(negative(&int(i64::MIN)).unwrap_err().kind, ErrorKind::Overflow);
        assert_eq!(divide(&int(i64::MIN), &int(-1)).unwrap_err().kind, ErrorKind::Overflow);
    }

    #[test]
    fn test_power() {
        assert_eq!(power(&int(2), &int(10)).unwrap(), int(1024));
        assert_eq!(power(&int(-3), &int(3)).unwrap(), int(-27));
        assert_eq!(power(&int(5), &int(0)).unwrap(), int(1));
        assert_eq!(power(&int(2), &int(-1)).unwrap_err().kind, ErrorKind::Value);
        assert_eq!(power(&int(2), &int(64)).unwrap_err().kind, ErrorKind::Overflow);
    }

    #[test]
    fn test_divmod() {
        assert_eq!(
            divmod(&int(-7), &int(2)).unwrap(),
            ObjRef::tuple(vec![int(-4), int(1)])
        );
    }

    #[test]
    fn test_hex_oct() {
        assert_eq!(hex(&int(255)).unwrap().to_string(), "0xff");
        assert_eq!(hex(&int(-16)).unwrap().to_string(), "-0x10");
        assert_eq!(oct(&int(8)).unwrap().to_string(), "010");
        assert_eq!(oct(&int(0)).unwrap().to_string(), "0");
    }

    #[test]
    fn test_coerce_widens_against_float() {
        let (a, b) = coerce(&int(2), &ObjRef::float(0.5)).unwrap().unwrap();
        assert_eq!(a.as_float(), Some(2.0));
        assert_eq!(b.as_float(), Some(0.5));
        assert!(coerce(&int(2), &ObjRef::str("x")).unwrap().is_none());
    }
}
