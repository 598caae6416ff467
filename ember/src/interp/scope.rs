//! Variable scopes
//!
//! A scope is a (globals, locals) pair of mapping objects. Any object with
//! the mapping capability can serve; name resolution checks locals, then
//! globals, then the builtins mapping.

use crate::error::{Error, Result};
use crate::object::ObjRef;
use crate::ops;
use crate::util::find_similar_name;

/// Namespace pair consulted by the evaluator
#[derive(Clone)]
pub struct Scope {
    pub globals: ObjRef,
    pub locals: ObjRef,
}

impl Scope {
    pub fn new(globals: ObjRef, locals: ObjRef) -> Self {
        Scope { globals, locals }
    }

    /// Module-level scope where locals and globals are the same mapping
    pub fn module(globals: ObjRef) -> Self {
        Scope {
            locals: globals.clone(),
            globals,
        }
    }

    /// Look up a variable: locals, then globals, then builtins
    pub fn lookup(&self, name: &str, builtins: &ObjRef) -> Result<ObjRef> {
        if let Some(value) = ops::lookup(&self.locals, name)? {
            return Ok(value);
        }
        if !self.globals.is(&self.locals) {
            if let Some(value) = ops::lookup(&self.globals, name)? {
                return Ok(value);
            }
        }
        if let Some(value) = ops::lookup(builtins, name)? {
            return Ok(value);
        }
        let hint = self.suggest(name, builtins);
        Err(Error::name_error(name, hint.as_deref()))
    }

    /// Bind a name in locals
    pub fn assign(&self, name: &str, value: ObjRef) -> Result<()> {
        ops::set_item(&self.locals, &ObjRef::str(name), value)
    }

    /// Closest bound name, drawn from dictionary-backed namespaces only
    fn suggest(&self, name: &str, builtins: &ObjRef) -> Option<String> {
        let dicts: Vec<_> = [&self.locals, &self.globals, builtins]
            .into_iter()
            .filter_map(|m| m.as_dict().map(|d| d.borrow()))
            .collect();
        find_similar_name(name, dicts.iter().flat_map(|d| d.str_keys())).map(str::to_string)
    }
}
