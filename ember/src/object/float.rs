//! Float number slots

use super::{NumberMethods, ObjRef};
use crate::error::{Error, Result};

pub static FLOAT_NUMBER: NumberMethods = NumberMethods {
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
    ..NumberMethods::EMPTY
};

/// Shortest text that reads back as the same float, always with a
/// fractional part or exponent
pub fn format_float(x: f64) -> String {
    if !x.is_finite() {
        return if x.is_nan() {
            "nan".to_string()
        } else if x > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }
    let text = format!("{x}");
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}

fn operands(a: &ObjRef, b: &ObjRef) -> Result<(f64, f64)> {
    match (a.as_float(), b.as_float()) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(Error::internal(format!(
            "float slot called with '{}' and '{}'",
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn operand(a: &ObjRef) -> Result<f64> {
    a.as_float()
        .ok_or_else(|| Error::internal(format!("float slot called with '{}'", a.type_name())))
}

fn add(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (x, y) = operands(a, b)?;
    Ok(ObjRef::float(x + y))
}

fn subtract(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (x, y) = operands(a, b)?;
    Ok(ObjRef::float(x - y))
}

fn multiply(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (x, y) = operands(a, b)?;
    Ok(ObjRef::float(x * y))
}

fn divide(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (x, y) = operands(a, b)?;
    if y == 0.0 {
        return Err(Error::zero_division("float division"));
    }
    Ok(ObjRef::float(x / y))
}

fn float_mod(x: f64, y: f64) -> Result<f64> {
    if y == 0.0 {
        return Err(Error::zero_division("float modulo"));
    }
    let r = x % y;
    if r != 0.0 && ((r < 0.0) != (y < 0.0)) {
        Ok(r + y)
    } else {
        Ok(r)
    }
}

fn remainder(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (x, y) = operands(a, b)?;
    float_mod(x, y).map(ObjRef::float)
}

fn divmod(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (x, y) = operands(a, b)?;
    let r = float_mod(x, y)?;
    let q = ((x - r) / y).round();
    Ok(ObjRef::tuple(vec![ObjRef::float(q), ObjRef::float(r)]))
}

fn power(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let (x, y) = operands(a, b)?;
    if x == 0.0 && y < 0.0 {
        return Err(Error::zero_division("0.0 cannot be raised to a negative power"));
    }
    if x < 0.0 && y.fract() != 0.0 {
        return Err(Error::value("negative number cannot be raised to a fractional power"));
    }
    Ok(ObjRef::float(x.powf(y)))
}

fn negative(a: &ObjRef) -> Result<ObjRef> {
    Ok(ObjRef::float(-operand(a)?))
}

fn absolute(a: &ObjRef) -> Result<ObjRef> {
    Ok(ObjRef::float(operand(a)?.abs()))
}

/// float absorbs an int operand
fn coerce(a: &ObjRef, b: &ObjRef) -> Result<Option<(ObjRef, ObjRef)>> {
    operand(a)?;
    if let Some(y) = b.as_int() {
        return Ok(Some((a.clone(), ObjRef::float(y as f64))));
    }
    if b.as_float().is_some() {
        return Ok(Some((a.clone(), b.clone())));
    }
    Ok(None)
}

fn to_int(a: &ObjRef) -> Result<ObjRef> {
    let x = operand(a)?.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    if !x.is_finite() || x < i64::MIN as f64 || x >= i64::MAX as f64 {
        return Err(Error::overflow("float too large to convert"));
    }
    Ok(ObjRef::int(x as i64))
}

fn to_float(a: &ObjRef) -> Result<ObjRef> {
    operand(a)?;
    Ok(a.clone())
}
