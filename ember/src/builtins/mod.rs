//! Builtin functions
//!
//! Every builtin has the [`BuiltinFn`] signature: it owns its argument
//! tuple and may call back into the interpreter. The higher-order engine
//! lives in [`functional`], the code execution entry in [`exec`] and the
//! progressions in [`range`]; the rest are thin wrappers over `ops`.

pub mod exec;
pub mod functional;
pub mod range;

pub use exec::execute;
pub use functional::{filter, map, reduce};
pub use range::{range_length, xrange};

use crate::error::{Error, Result};
use crate::interp::Interpreter;
use crate::object::{Builtin, BuiltinFn, Dict, HashKey, Object, ObjRef};
use crate::ops;
use std::cmp::Ordering;
use std::io::Write;

/// Registration table, in the order names appear in `builtins_dict`
const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("abs", builtin_abs),
    ("apply", builtin_apply),
    ("bagof", functional::builtin_bagof),
    ("chr", builtin_chr),
    ("cmp", builtin_cmp),
    ("coerce", builtin_coerce),
    ("compile", exec::builtin_compile),
    ("divmod", builtin_divmod),
    ("eval", exec::builtin_eval),
    ("exec", exec::builtin_exec),
    ("filter", functional::builtin_filter),
    ("float", builtin_float),
    ("hash", builtin_hash),
    ("hex", builtin_hex),
    ("id", builtin_id),
    ("int", builtin_int),
    ("lambda", exec::builtin_lambda),
    ("len", builtin_len),
    ("map", functional::builtin_map),
    ("max", builtin_max),
    ("min", builtin_min),
    ("oct", builtin_oct),
    ("ord", builtin_ord),
    ("pow", builtin_pow),
    ("print", builtin_print),
    ("range", range::builtin_range),
    ("reduce", functional::builtin_reduce),
    ("repr", builtin_repr),
    ("round", builtin_round),
    ("str", builtin_str),
    ("type", builtin_type),
    ("xrange", range::builtin_xrange),
];

/// Fresh builtins mapping with every builtin function and the constants
pub fn builtins_dict() -> ObjRef {
    let mut dict = Dict::new();
    for &(name, func) in BUILTINS {
        dict.set_str(name, ObjRef::new(Object::Builtin(Builtin { name, func })));
    }
    dict.set_str("None", ObjRef::none());
    dict.set_str("True", ObjRef::int(1));
    dict.set_str("False", ObjRef::int(0));
    ObjRef::dict(dict)
}

/// Unpack exactly `N` arguments
pub(crate) fn take<const N: usize>(name: &str, args: ObjRef) -> Result<[ObjRef; N]> {
    let items = args.into_tuple_items()?;
    let got = items.len();
    items.try_into().map_err(|_| Error::arity(name, N, N, got))
}

/// Unpack between `min` and `max` arguments
pub(crate) fn take_between(name: &str, args: ObjRef, min: usize, max: usize) -> Result<Vec<ObjRef>> {
    let items = args.into_tuple_items()?;
    if items.len() < min || items.len() > max {
        return Err(Error::arity(name, min, max, items.len()));
    }
    Ok(items)
}

fn int_arg(name: &str, obj: &ObjRef) -> Result<i64> {
    obj.as_int().ok_or_else(|| {
        Error::type_mismatch(format!(
            "{name}() argument must be int, not '{}'",
            obj.type_name()
        ))
    })
}

fn builtin_abs(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [x] = take("abs", args)?;
    ops::absolute(&x)
}

/// `apply(fn[, args])`
fn builtin_apply(interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let mut items = take_between("apply", args, 1, 2)?.into_iter();
    let func = items.next().unwrap_or_else(ObjRef::none);
    let call_args = match items.next() {
        None => ObjRef::tuple(Vec::new()),
        Some(a) if a.is_none() => ObjRef::tuple(Vec::new()),
        Some(a) if a.as_tuple().is_some() => a,
        Some(a) => {
            return Err(Error::type_mismatch(format!(
                "apply() 2nd argument must be tuple, not '{}'",
                a.type_name()
            )))
        }
    };
    interp.call_object(&func, call_args)
}

fn builtin_chr(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [x] = take("chr", args)?;
    let code = int_arg("chr", &x)?;
    let byte = u8::try_from(code).map_err(|_| Error::value("chr() arg not in range(256)"))?;
    Ok(ObjRef::str(char::from(byte)))
}

fn builtin_ord(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [x] = take("ord", args)?;
    let text = x
        .as_str()
        .ok_or_else(|| Error::type_mismatch(format!("ord() expected string, not '{}'", x.type_name())))?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(ObjRef::int(i64::from(u32::from(c)))),
        _ => Err(Error::value("ord() arg must be a string of length 1")),
    }
}

fn builtin_cmp(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [a, b] = take("cmp", args)?;
    let sign = match ops::compare(&a, &b)? {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    };
    Ok(ObjRef::int(sign))
}

fn builtin_coerce(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [a, b] = take("coerce", args)?;
    let (a, b) = ops::coerce(&a, &b)?;
    Ok(ObjRef::tuple(vec![a, b]))
}

fn builtin_divmod(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [a, b] = take("divmod", args)?;
    ops::divmod(&a, &b)
}

fn builtin_pow(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [a, b] = take("pow", args)?;
    ops::power(&a, &b)
}

fn builtin_float(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [x] = take("float", args)?;
    ops::to_float(&x)
}

fn builtin_int(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [x] = take("int", args)?;
    ops::to_int(&x)
}

fn builtin_hex(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [x] = take("hex", args)?;
    ops::hex(&x)
}

fn builtin_oct(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [x] = take("oct", args)?;
    ops::oct(&x)
}

fn builtin_hash(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [x] = take("hash", args)?;
    Ok(ObjRef::int(HashKey::of(&x)?.digest()))
}

fn builtin_id(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [x] = take("id", args)?;
    Ok(ObjRef::int(x.id() as i64))
}

fn builtin_len(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [x] = take("len", args)?;
    let len = ops::length(&x)?;
    i64::try_from(len)
        .map(ObjRef::int)
        .map_err(|_| Error::overflow("len() result too large"))
}

/// Extreme element of one sequence argument or of the arguments themselves
fn extreme(name: &str, args: ObjRef, wanted: Ordering) -> Result<ObjRef> {
    let items = args.into_tuple_items()?;
    let candidates = match items.len() {
        0 => return Err(Error::arity(name, 1, usize::MAX, 0)),
        1 => ops::to_vec(&items[0], name)?,
        _ => items,
    };
    let mut best: Option<ObjRef> = None;
    for item in candidates {
        best = match best {
            Some(current) if ops::compare(&item, &current)? != wanted => Some(current),
            _ => Some(item),
        };
    }
    best.ok_or_else(|| Error::value(format!("{name}() arg is an empty sequence")))
}

fn builtin_max(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    extreme("max", args, Ordering::Greater)
}

fn builtin_min(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    extreme("min", args, Ordering::Less)
}

fn builtin_print(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let items = args.into_tuple_items()?;
    let line = items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")
        .and_then(|()| stdout.flush())
        .map_err(|e| Error::io(e.to_string()))?;
    Ok(ObjRef::none())
}

fn builtin_repr(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [x] = take("repr", args)?;
    Ok(ObjRef::str(x.repr()))
}

/// `round(x[, ndigits])`, halves away from zero
fn builtin_round(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let mut items = take_between("round", args, 1, 2)?.into_iter();
    let x = items.next().unwrap_or_else(ObjRef::none);
    let digits = match items.next() {
        Some(n) => int_arg("round", &n)?,
        None => 0,
    };
    let value = ops::to_float(&x)?
        .as_float()
        .ok_or_else(|| Error::internal("float conversion did not yield a float"))?;
    if !value.is_finite() {
        return Ok(ObjRef::float(value));
    }
    let exponent = i32::try_from(digits.unsigned_abs()).unwrap_or(i32::MAX);
    let scale = 10f64.powi(exponent);
    let rounded = if digits < 0 {
        if scale.is_finite() {
            (value / scale).round() * scale
        } else {
            0f64.copysign(value)
        }
    } else {
        // beyond the precision of a double there is nothing left to round
        let scaled = value * scale;
        if scaled.is_finite() { scaled.round() / scale } else { value }
    };
    Ok(ObjRef::float(rounded))
}

fn builtin_str(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [x] = take("str", args)?;
    if x.as_str().is_some() {
        return Ok(x);
    }
    Ok(ObjRef::str(x.repr()))
}

fn builtin_type(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [x] = take("type", args)?;
    Ok(ObjRef::new(Object::Type(x.descriptor())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::EntryPoint;
    use crate::error::ErrorKind;

    fn eval(source: &str) -> Result<ObjRef> {
        Interpreter::new().run(source, "<test>", EntryPoint::Expression)
    }

    #[test]
    fn test_table_is_registered() {
        let builtins = builtins_dict();
        let dict = builtins.as_dict().unwrap().borrow();
        for &(name, _) in BUILTINS {
            assert!(dict.get_str(name).is_some(), "{name} missing");
        }
        assert_eq!(dict.get_str("True"), Some(ObjRef::int(1)));
    }

    #[test]
    fn test_take_arity() {
        let err = take::<2>("cmp", ObjRef::tuple(vec![ObjRef::int(1)])).unwrap_err();
        assert_eq!(err.message, "cmp() takes exactly 2 argument(s) (1 given)");
    }

    #[test]
    fn test_chr_and_ord() {
        assert_eq!(eval("chr(65)").unwrap(), ObjRef::str("A"));
        assert_eq!(eval("ord('a')").unwrap(), ObjRef::int(97));
        assert_eq!(eval("chr(256)").unwrap_err().kind, ErrorKind::Value);
        assert_eq!(eval("ord('ab')").unwrap_err().kind, ErrorKind::Value);
    }

    #[test]
    fn test_cmp_and_extremes() {
        assert_eq!(eval("cmp(1, 2.5)").unwrap(), ObjRef::int(-1));
        assert_eq!(eval("cmp('b', 'a')").unwrap(), ObjRef::int(1));
        assert_eq!(eval("max([3, 9, 2])").unwrap(), ObjRef::int(9));
        assert_eq!(eval("min(4, 1.5, 7)").unwrap(), ObjRef::float(1.5));
        assert_eq!(eval("max([])").unwrap_err().kind, ErrorKind::Value);
    }

    #[test]
    fn test_apply() {
        assert_eq!(eval("apply(lambda a, b: a - b, (5, 2))").unwrap(), ObjRef::int(3));
        assert_eq!(eval("apply(lambda: 7)").unwrap(), ObjRef::int(7));
        assert_eq!(eval("apply(len, [1])").unwrap_err().kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(eval("round(2.5)").unwrap(), ObjRef::float(3.0));
        assert_eq!(eval("round(-2.5)").unwrap(), ObjRef::float(-3.0));
        assert_eq!(eval("round(1234, -2)").unwrap(), ObjRef::float(1200.0));
        assert_eq!(eval("round(0.125, 2)").unwrap(), ObjRef::float(0.13));
    }

    #[test]
    fn test_round_with_extreme_digits() {
        assert_eq!(eval("round(1.5, 400)").unwrap(), ObjRef::float(1.5));
        assert_eq!(eval("round(1e300, 20)").unwrap(), ObjRef::float(1e300));
        assert_eq!(eval("round(1234.5, -400)").unwrap(), ObjRef::float(0.0));
        assert_eq!(eval("round(-7.25, -400)").unwrap().repr(), "-0.0");
        assert_eq!(eval("round(1e308 * 10, 2)").unwrap().repr(), "inf");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(eval("str('x')").unwrap(), ObjRef::str("x"));
        assert_eq!(eval("str((1,))").unwrap(), ObjRef::str("(1,)"));
        assert_eq!(eval("repr('x')").unwrap(), ObjRef::str("'x'"));
        assert_eq!(eval("len({1: 2})").unwrap(), ObjRef::int(1));
        assert_eq!(eval("type(1.0)").unwrap().repr(), "<type 'float'>");
        assert_eq!(eval("coerce(1, 2.0)").unwrap().repr(), "(1.0, 2.0)");
        assert_eq!(eval("hash(3.0) == hash(3)").unwrap(), ObjRef::int(1));
        assert_eq!(eval("hash([])").unwrap_err().kind, ErrorKind::TypeMismatch);
    }
}
