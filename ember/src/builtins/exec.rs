//! Code execution entry
//!
//! `eval`, `exec` and `lambda` share one routine that validates the
//! argument shape, fills in default scopes and hands text or code to the
//! compiler and evaluator.

use super::{take, take_between};
use crate::compiler::{compile, EntryPoint};
use crate::error::{Error, Result};
use crate::interp::Interpreter;
use crate::object::ObjRef;
use crate::ops::has_mapping;
use tracing::debug;

const SOURCE_FILENAME: &str = "<string>";

/// Run text or a code object against optional scopes.
///
/// The whole argument shape is checked before anything is compiled.
/// Missing globals default to the caller's current globals and missing
/// locals to the globals.
pub fn execute(
    interp: &mut Interpreter,
    source: &ObjRef,
    globals: Option<ObjRef>,
    locals: Option<ObjRef>,
    entry: EntryPoint,
) -> Result<ObjRef> {
    let is_code = source.as_code().is_some();
    let shape_ok = (is_code || source.as_str().is_some())
        && globals.as_ref().is_none_or(has_mapping)
        && locals.as_ref().is_none_or(has_mapping);
    if !shape_ok {
        return Err(Error::type_mismatch(
            "eval/lambda arguments must be (string|code)[,mapping[,mapping]]",
        ));
    }

    let globals = globals.unwrap_or_else(|| interp.current_globals());
    let locals = locals.unwrap_or_else(|| globals.clone());
    debug!(%entry, code = is_code, "execute");

    if is_code {
        return interp.evaluate(source, &globals, &locals);
    }

    let text = source.as_str().unwrap_or_default();
    if text.contains('\0') {
        return Err(Error::value("embedded terminator in source"));
    }
    let text = match entry {
        EntryPoint::Expression | EntryPoint::Lambda => text.trim_start_matches([' ', '\t']),
        EntryPoint::Module | EntryPoint::Interactive => text,
    };
    let code = compile(text, SOURCE_FILENAME, entry)?;
    interp.evaluate(&code, &globals, &locals)
}

/// Split `(source[, globals[, locals]])`
fn execute_args(
    interp: &mut Interpreter,
    name: &str,
    args: ObjRef,
    entry: EntryPoint,
) -> Result<ObjRef> {
    let mut items = take_between(name, args, 1, 3)?.into_iter();
    let source = items.next().unwrap_or_else(ObjRef::none);
    let globals = items.next();
    let locals = items.next();
    execute(interp, &source, globals, locals, entry)
}

pub fn builtin_eval(interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    execute_args(interp, "eval", args, EntryPoint::Expression)
}

pub fn builtin_exec(interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    execute_args(interp, "exec", args, EntryPoint::Module)
}

pub fn builtin_lambda(interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    execute_args(interp, "lambda", args, EntryPoint::Lambda)
}

/// `compile(text, filename, mode)`
pub fn builtin_compile(_interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [text, filename, mode] = take("compile", args)?;
    let (Some(text), Some(filename), Some(mode)) = (text.as_str(), filename.as_str(), mode.as_str())
    else {
        return Err(Error::type_mismatch("compile() arguments must be strings"));
    };
    if text.contains('\0') {
        return Err(Error::value("embedded terminator in source"));
    }
    compile(text, filename, EntryPoint::from_mode(mode)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::object::Dict;

    fn text(s: &str) -> ObjRef {
        ObjRef::str(s)
    }

    #[test]
    fn test_expression_entry() {
        let mut interp = Interpreter::new();
        let result = execute(&mut interp, &text("1+1"), None, None, EntryPoint::Expression).unwrap();
        assert_eq!(result, ObjRef::int(2));
    }

    #[test]
    fn test_leading_whitespace_stripped_for_expressions_only() {
        let mut interp = Interpreter::new();
        let result =
            execute(&mut interp, &text(" \t 3 * 4"), None, None, EntryPoint::Expression).unwrap();
        assert_eq!(result, ObjRef::int(12));
        let err = execute(&mut interp, &text("  x = 1"), None, None, EntryPoint::Module);
        assert!(err.is_ok(), "blank-leading statement text still parses");
    }

    #[test]
    fn test_non_mapping_scope_rejected_before_compiling() {
        let mut interp = Interpreter::new();
        // Unparseable source: a syntax error here would mean compilation ran
        let err = execute(
            &mut interp,
            &text("1 +"),
            Some(ObjRef::int(5)),
            None,
            EntryPoint::Expression,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_bad_source_type() {
        let mut interp = Interpreter::new();
        let err = execute(&mut interp, &ObjRef::int(1), None, None, EntryPoint::Expression)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_embedded_terminator() {
        let mut interp = Interpreter::new();
        let err = execute(&mut interp, &text("1\0"), None, None, EntryPoint::Expression)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Value);
        assert_eq!(err.message, "embedded terminator in source");
    }

    #[test]
    fn test_explicit_scopes() {
        let mut interp = Interpreter::new();
        let mut globals = Dict::new();
        globals.set_str("a", ObjRef::int(2));
        let globals = ObjRef::dict(globals);
        let mut locals = Dict::new();
        locals.set_str("b", ObjRef::int(5));
        let locals = ObjRef::dict(locals);
        let result = execute(
            &mut interp,
            &text("a * b"),
            Some(globals.clone()),
            Some(locals.clone()),
            EntryPoint::Expression,
        )
        .unwrap();
        assert_eq!(result, ObjRef::int(10));

        execute(&mut interp, &text("c = a"), Some(globals.clone()), Some(locals.clone()), EntryPoint::Module)
            .unwrap();
        assert_eq!(crate::ops::lookup(&locals, "c").unwrap(), Some(ObjRef::int(2)));
        assert_eq!(crate::ops::lookup(&globals, "c").unwrap(), None);
    }

    #[test]
    fn test_code_object_reused() {
        let mut interp = Interpreter::new();
        let code = compile("n + 1", "<string>", EntryPoint::Expression).unwrap();
        for n in 0..3 {
            let mut scope = Dict::new();
            scope.set_str("n", ObjRef::int(n));
            let result =
                execute(&mut interp, &code, Some(ObjRef::dict(scope)), None, EntryPoint::Expression)
                    .unwrap();
            assert_eq!(result, ObjRef::int(n + 1));
        }
    }

    #[test]
    fn test_lambda_entry_yields_function() {
        let mut interp = Interpreter::new();
        let f = execute(&mut interp, &text("  x, y: x - y"), None, None, EntryPoint::Lambda).unwrap();
        assert_eq!(f.type_name(), "function");
        let result = interp.call(&f, vec![ObjRef::int(9), ObjRef::int(4)]).unwrap();
        assert_eq!(result, ObjRef::int(5));
    }

    #[test]
    fn test_compile_builtin_mode() {
        let mut interp = Interpreter::new();
        let args = ObjRef::tuple(vec![text("1"), text("f"), text("nope")]);
        let err = builtin_compile(&mut interp, args).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Value);
    }
}
