//! Tree-walking evaluator
//!
//! Owns the builtins mapping, the module globals and the stack of active
//! scopes. Builtins receive `&mut Interpreter` so they can call back into
//! user code.

mod eval;
mod scope;

pub use scope::Scope;

use crate::builtins;
use crate::compiler::{compile, CodeBody, EntryPoint};
use crate::config::RuntimeConfig;
use crate::error::{Error, Result};
use crate::object::{Dict, Function, Object, ObjRef};
use std::rc::Rc;
use tracing::debug;

/// The interpreter
pub struct Interpreter {
    config: RuntimeConfig,
    builtins: ObjRef,
    main_globals: ObjRef,
    /// Scopes of the code currently executing, innermost last
    scopes: Vec<Scope>,
    /// Nested evaluations and calls in progress
    depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create a new interpreter
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Interpreter {
            config,
            builtins: builtins::builtins_dict(),
            main_globals: ObjRef::dict(Dict::new()),
            scopes: Vec::new(),
            depth: 0,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn builtins(&self) -> &ObjRef {
        &self.builtins
    }

    /// Globals of the top-level module
    pub fn main_globals(&self) -> &ObjRef {
        &self.main_globals
    }

    /// Globals of the innermost executing scope
    pub fn current_globals(&self) -> ObjRef {
        self.scopes
            .last()
            .map_or_else(|| self.main_globals.clone(), |scope| scope.globals.clone())
    }

    /// Compile and evaluate source in the module globals
    pub fn run(&mut self, source: &str, filename: &str, entry: EntryPoint) -> Result<ObjRef> {
        let code = compile(source, filename, entry)?;
        let globals = self.main_globals.clone();
        self.evaluate(&code, &globals, &globals)
    }

    /// Evaluate a code object against a scope pair
    pub fn evaluate(&mut self, code: &ObjRef, globals: &ObjRef, locals: &ObjRef) -> Result<ObjRef> {
        let code = code.as_code().ok_or_else(|| {
            Error::type_mismatch(format!("expected a code object, got '{}'", code.type_name()))
        })?;
        debug!(entry = %code.entry, filename = %code.filename, "evaluate");
        let scope = Scope::new(globals.clone(), locals.clone());
        self.nested(scope, |interp, scope| match &code.body {
            CodeBody::Expression(expr) => interp.eval_expr(expr, scope),
            CodeBody::Block(program) => {
                let last = interp.exec_program(program, scope)?;
                match code.entry {
                    EntryPoint::Interactive => Ok(last.unwrap_or_else(ObjRef::none)),
                    _ => Ok(ObjRef::none()),
                }
            }
            CodeBody::Lambda(def) => Ok(ObjRef::new(Object::Function(Function {
                def: Rc::clone(def),
                globals: scope.globals.clone(),
            }))),
        })
    }

    /// Call any callable with a positional argument tuple
    pub fn call_object(&mut self, func: &ObjRef, args: ObjRef) -> Result<ObjRef> {
        if args.as_tuple().is_none() {
            return Err(Error::type_mismatch("argument list must be a tuple"));
        }
        match &**func {
            Object::Builtin(builtin) => (builtin.func)(self, args),
            Object::Function(function) => self.call_function(function, args),
            _ => Err(Error::type_mismatch(format!(
                "'{}' object is not callable",
                func.type_name()
            ))),
        }
    }

    /// Convenience wrapper building the argument tuple
    pub fn call(&mut self, func: &ObjRef, args: Vec<ObjRef>) -> Result<ObjRef> {
        self.call_object(func, ObjRef::tuple(args))
    }

    fn call_function(&mut self, function: &Function, args: ObjRef) -> Result<ObjRef> {
        let def = Rc::clone(&function.def);
        let params = &def.params;
        let argc = args.as_tuple().map_or(0, <[_]>::len);
        let fixed = params.names.len();
        if argc < fixed || (params.rest.is_none() && argc > fixed) {
            let max = if params.rest.is_some() { usize::MAX } else { fixed };
            return Err(Error::arity(&def.name, fixed, max, argc));
        }

        let mut locals = Dict::new();
        match &params.rest {
            // The argument tuple itself becomes the rest binding
            Some(rest) if params.is_rest_only() => locals.set_str(rest, args),
            rest => {
                let mut items = args.into_tuple_items()?;
                let extra = items.split_off(fixed);
                for (name, value) in params.names.iter().zip(items) {
                    locals.set_str(name, value);
                }
                if let Some(rest) = rest {
                    locals.set_str(rest, ObjRef::tuple(extra));
                }
            }
        }

        let scope = Scope::new(function.globals.clone(), ObjRef::dict(locals));
        self.nested(scope, |interp, scope| interp.eval_expr(&def.body, scope))
    }

    /// Run `f` one level deeper with `scope` active
    fn nested<T>(
        &mut self,
        scope: Scope,
        f: impl FnOnce(&mut Self, &Scope) -> Result<T>,
    ) -> Result<T> {
        if self.depth >= self.config.recursion_limit {
            return Err(Error::recursion(self.config.recursion_limit));
        }
        self.depth += 1;
        self.scopes.push(scope.clone());
        let (red_zone, grow) = (self.config.stack_red_zone, self.config.stack_grow_size);
        let result = stacker::maybe_grow(red_zone, grow, || f(self, &scope));
        self.scopes.pop();
        self.depth -= 1;
        result
    }
}
