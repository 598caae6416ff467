//! Integration tests for the ember runtime
//!
//! Drive source text through compile and evaluate, and exercise the
//! builtin layer through the public Rust API.

use ember::builtins::{execute, filter, map, reduce};
use ember::compiler::EntryPoint;
use ember::error::Result;
use ember::object::{NativeObject, NumberMethods, ObjRef, TypeDescriptor};
use ember::{ErrorKind, Interpreter};
use insta::assert_snapshot;
use std::any::Any;

/// Run source on the interactive entry point and return the repr of the
/// trailing expression
fn run(source: &str) -> String {
    let mut interp = Interpreter::new();
    match interp.run(source, "<test>", EntryPoint::Interactive) {
        Ok(value) => value.repr(),
        Err(e) => e.to_string(),
    }
}

fn ints(values: &[i64]) -> ObjRef {
    ObjRef::list(values.iter().copied().map(ObjRef::int).collect())
}

// ---- map ----

#[test]
fn test_map_identity_pads_shorter_sequences() {
    assert_snapshot!(run("map(None, [1, 2, 3], [10, 20])"), @"[(1, 10), (2, 20), (3, None)]");
}

#[test]
fn test_map_single_sequence_yields_raw_values() {
    assert_snapshot!(run("map(lambda x: x * 2, [1, 2, 3])"), @"[2, 4, 6]");
    assert_snapshot!(run("map(lambda a, b: a + b, (1, 2), [10, 20])"), @"[11, 22]");
}

#[test]
fn test_map_retaining_callee_gets_fresh_tuples() {
    assert_snapshot!(
        run("map(lambda *args: args, [1, 2], 'ab')"),
        @"[(1, 'a'), (2, 'b')]"
    );
}

#[test]
fn test_map_over_lazy_range() {
    assert_snapshot!(run("map(None, xrange(3))"), @"[0, 1, 2]");
}

#[test]
fn test_map_non_sequence() {
    assert_snapshot!(
        run("map(None, [1], 2)"),
        @"TypeError: argument 3 to map() must be a sequence object"
    );
}

// ---- filter ----

#[test]
fn test_filter_keeps_order() {
    assert_snapshot!(run("filter(lambda x: x % 2, [1, 2, 3, 4, 5])"), @"[1, 3, 5]");
}

#[test]
fn test_filter_reuses_unique_list() {
    let mut interp = Interpreter::new();
    let odd = interp
        .run("lambda x: x % 2", "<test>", EntryPoint::Expression)
        .unwrap();
    let list = ints(&[1, 2, 3, 4, 5]);
    let id = list.id();
    let result = filter(&mut interp, odd, list).unwrap();
    assert_eq!(result.id(), id);
    assert_snapshot!(result.repr(), @"[1, 3, 5]");
}

#[test]
fn test_filter_preserves_text_and_tuple() {
    assert_snapshot!(run("filter(None, 'hello')"), @"'hello'");
    assert_snapshot!(run("filter('c: c != \"l\"', 'hello')"), @"'heo'");
    assert_snapshot!(run("filter('n: n > 2', (1, 5, 2, 7))"), @"(5, 7)");
    assert_snapshot!(run("filter(None, (0, '', 3))"), @"(3,)");
}

#[test]
fn test_filter_shared_input_untouched() {
    assert_snapshot!(
        run("xs = [0, 1, 0, 2]\nys = filter(None, xs)\n(xs, ys)"),
        @"([0, 1, 0, 2], [1, 2])"
    );
}

#[test]
fn test_filter_is_idempotent() {
    let mut interp = Interpreter::new();
    let pred = interp
        .run("lambda x: x > 3", "<test>", EntryPoint::Expression)
        .unwrap();
    let once = filter(&mut interp, pred.clone(), ints(&[5, 1, 7, 3, 9])).unwrap();
    let first = once.repr();
    let twice = filter(&mut interp, pred, once).unwrap();
    assert_eq!(twice.repr(), first);
}

#[test]
fn test_bagof_alias() {
    assert_snapshot!(run("bagof([0, 4, None, 5])"), @"[4, 5]");
    assert_snapshot!(run("bagof(lambda s: len(s) > 1, ['a', 'bb', 'ccc'])"), @"['bb', 'ccc']");
}

// ---- reduce ----

#[test]
fn test_reduce() {
    assert_snapshot!(run("reduce(lambda a, b: a + b, [1, 2, 3, 4])"), @"10");
    assert_snapshot!(run("reduce(lambda a, b: a + b, [], 0)"), @"0");
    assert_snapshot!(
        run("reduce(lambda a, b: a + b, [])"),
        @"ValueError: reduce of empty sequence with no initial value"
    );
}

#[test]
fn test_reduce_text_callable() {
    assert_snapshot!(run("reduce('acc, s: acc + s', ['x', 'y', 'z'], '>')"), @"'>xyz'");
}

#[test]
fn test_reduce_propagates_callee_failure() {
    let mut interp = Interpreter::new();
    let err = reduce(
        &mut interp,
        ObjRef::str("a, b: a / b"),
        &ints(&[1, 0]),
        None,
    )
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ZeroDivision);
}

// ---- range ----

#[test]
fn test_range() {
    assert_snapshot!(run("range(0, 10, 3)"), @"[0, 3, 6, 9]");
    assert_snapshot!(run("range(10, 0, -3)"), @"[10, 7, 4, 1]");
    assert_snapshot!(run("range(4)"), @"[0, 1, 2, 3]");
    assert_snapshot!(run("range(5, 1)"), @"[]");
    assert_snapshot!(run("range(1, 5, 0)"), @"ValueError: zero step for range()");
}

#[test]
fn test_xrange() {
    assert_snapshot!(run("xrange(0, 10, 3)"), @"xrange(0, 12, 3)");
    assert_snapshot!(run("len(xrange(10, 0, -3))"), @"4");
    assert_snapshot!(run("xrange(5)[-1]"), @"4");
    assert_snapshot!(run("xrange(0, 0, 0)"), @"ValueError: zero step for range()");
}

// ---- execute ----

#[test]
fn test_execute_expression() {
    let mut interp = Interpreter::new();
    let result = execute(&mut interp, &ObjRef::str("1+1"), None, None, EntryPoint::Expression).unwrap();
    assert_eq!(result, ObjRef::int(2));
}

#[test]
fn test_execute_rejects_non_mapping_scope() {
    let mut interp = Interpreter::new();
    let err = execute(
        &mut interp,
        &ObjRef::str("1+1"),
        Some(ObjRef::list(vec![])),
        None,
        EntryPoint::Expression,
    )
    .unwrap_err();
    assert_snapshot!(err.to_string(), @"TypeError: eval/lambda arguments must be (string|code)[,mapping[,mapping]]");
}

#[test]
fn test_eval_and_exec_builtins() {
    assert_snapshot!(run("eval('  2 ** 10')"), @"1024");
    assert_snapshot!(run("g = {}\nexec('x = 3\\ny = x * 2', g)\n(g['x'], g['y'])"), @"(3, 6)");
    assert_snapshot!(run("k = 5\neval('k + 1')"), @"6");
    assert_snapshot!(run("eval('a + b', {'a': 1}, {'b': 2})"), @"3");
}

#[test]
fn test_compiled_code_reused_across_scopes() {
    assert_snapshot!(
        run("c = compile('n * 2', '<s>', 'eval')\n(eval(c, {'n': 4}), eval(c, {'n': 21}))"),
        @"(8, 42)"
    );
}

#[test]
fn test_lambda_builtin() {
    let mut interp = Interpreter::new();
    let lambda = ember::ops::lookup(interp.builtins(), "lambda").unwrap().unwrap();
    let func = interp.call(&lambda, vec![ObjRef::str("a, b: a * b")]).unwrap();
    let result = interp.call(&func, vec![ObjRef::int(6), ObjRef::int(7)]).unwrap();
    assert_eq!(result, ObjRef::int(42));
}

#[test]
fn test_syntax_error_in_evaluated_text() {
    assert_eq!(
        Interpreter::new()
            .run("eval('1 +')", "<test>", EntryPoint::Expression)
            .unwrap_err()
            .kind,
        ErrorKind::Syntax
    );
}

// ---- coercion and native types ----

#[test]
fn test_mixed_arithmetic() {
    assert_snapshot!(run("1 + 2.5"), @"3.5");
    assert_snapshot!(run("coerce(2, 0.5)"), @"(2.0, 0.5)");
    assert_snapshot!(run("coerce('a', 'b')"), @"('a', 'b')");
    assert_snapshot!(run("divmod(7, -2)"), @"(-4, -1)");
    assert_snapshot!(run("1 + 'a'"), @"TypeError: unsupported operand type(s) for +: 'int' and 'string'");
}

/// Exact rational used to exercise coercion hooks on a native type
struct Fraction {
    num: i64,
    den: i64,
}

static FRACTION_NUMBER: NumberMethods = NumberMethods {
    add: Some(fraction_add),
    multiply: Some(fraction_mul),
    coerce: Some(fraction_coerce),
    ..NumberMethods::EMPTY
};

static FRACTION_TYPE: TypeDescriptor = TypeDescriptor {
    number: Some(&FRACTION_NUMBER),
    ..TypeDescriptor::plain("fraction")
};

impl Fraction {
    fn new(num: i64, den: i64) -> ObjRef {
        let g = gcd(num.abs(), den.abs()).max(1);
        ObjRef::native(Fraction {
            num: num / g,
            den: den / g,
        })
    }
}

impl NativeObject for Fraction {
    fn descriptor(&self) -> &'static TypeDescriptor {
        &FRACTION_TYPE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn repr(&self) -> String {
        format!("{}/{}", self.num, self.den)
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn parts(obj: &ObjRef) -> (i64, i64) {
    let f = obj.as_native::<Fraction>().unwrap();
    (f.num, f.den)
}

fn fraction_add(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let ((p, q), (r, s)) = (parts(a), parts(b));
    Ok(Fraction::new(p * s + r * q, q * s))
}

fn fraction_mul(a: &ObjRef, b: &ObjRef) -> Result<ObjRef> {
    let ((p, q), (r, s)) = (parts(a), parts(b));
    Ok(Fraction::new(p * r, q * s))
}

fn fraction_coerce(a: &ObjRef, b: &ObjRef) -> Result<Option<(ObjRef, ObjRef)>> {
    if let Some(n) = b.as_int() {
        return Ok(Some((a.clone(), Fraction::new(n, 1))));
    }
    if b.as_native::<Fraction>().is_some() {
        return Ok(Some((a.clone(), b.clone())));
    }
    Ok(None)
}

fn run_with_half(source: &str) -> String {
    let mut interp = Interpreter::new();
    interp
        .main_globals()
        .as_dict()
        .unwrap()
        .borrow_mut()
        .set_str("half", Fraction::new(1, 2));
    match interp.run(source, "<test>", EntryPoint::Interactive) {
        Ok(value) => value.repr(),
        Err(e) => e.to_string(),
    }
}

#[test]
fn test_native_coercion_from_either_side() {
    assert_snapshot!(run_with_half("half + 1"), @"3/2");
    assert_snapshot!(run_with_half("1 + half"), @"3/2");
    assert_snapshot!(run_with_half("half * half"), @"1/4");
    assert_snapshot!(run_with_half("coerce(3, half)"), @"(3/1, 1/2)");
    assert_snapshot!(
        run_with_half("half + 0.5"),
        @"TypeError: number coercion failed: no common numeric representation"
    );
}

#[test]
fn test_native_through_higher_order_builtins() {
    assert_snapshot!(run_with_half("reduce(lambda a, b: a + b, [half, half, half])"), @"3/2");
    assert_snapshot!(run_with_half("map(lambda x: x * half, range(1, 4))"), @"[1/2, 1/1, 3/2]");
    assert_snapshot!(run_with_half("type(half)"), @"<type 'fraction'>");
}

#[test]
fn test_missing_capability_is_type_error() {
    assert_snapshot!(run_with_half("len(half)"), @"TypeError: len() of unsized object");
    assert_snapshot!(run_with_half("-half"), @"TypeError: unary -: number capability of 'fraction' does not support this operation");
}

// ---- ownership ----

#[test]
fn test_reference_round_trip() {
    let list = ints(&[1, 2]);
    let before = list.ref_count();
    let extra = list.clone();
    assert_eq!(list.ref_count(), before + 1);
    drop(extra);
    assert_eq!(list.ref_count(), before);
    assert!(list.is_unique());
}

#[test]
fn test_deeply_nested_value_is_freed() {
    let mut interp = Interpreter::new();
    let depth = interp
        .run(
            "x = reduce(lambda a, b: [a], xrange(200000), 0); len(x)",
            "<test>",
            EntryPoint::Interactive,
        )
        .unwrap();
    assert_eq!(depth, ObjRef::int(1));
    drop(interp);
}

#[test]
fn test_self_referencing_containers() {
    assert_snapshot!(run("l = [0]; l[0] = l; repr(l)"), @"'[[...]]'");
    assert_snapshot!(run("d = {}; d['k'] = d; d"), @"{'k': {...}}");
    assert_snapshot!(run("l = [1, 2]; l[1] = l; (l == l, len(l))"), @"(1, 2)");
}

#[test]
fn test_coerce_same_type_adds_one_reference_each() {
    let a = ObjRef::int(3);
    let b = ObjRef::int(4);
    let (x, y) = ember::ops::coerce(&a, &b).unwrap();
    assert!(x.is(&a) && y.is(&b));
    assert_eq!(a.ref_count(), 2);
    assert_eq!(b.ref_count(), 2);
}

#[test]
fn test_map_result_through_api() {
    let mut interp = Interpreter::new();
    let result = map(&mut interp, ObjRef::none(), &[ObjRef::str("ab"), ints(&[1])]).unwrap();
    assert_snapshot!(result.repr(), @"[('a', 1), ('b', None)]");
}
