//! Object model
//!
//! Every runtime value is an [`Object`] behind a reference-counted [`ObjRef`].
//! Cloning an `ObjRef` takes a new owning reference; dropping it releases
//! one. When the last reference goes away the object is freed on the spot,
//! together with every child reference it owns.
//!
//! Behaviour is looked up through the object's [`TypeDescriptor`], which
//! exposes optional Number, Sequence and Mapping capability tables.

mod dict;
mod float;
mod int;
mod native;
mod seq;
mod typeobj;

pub use dict::{Dict, HashKey};
pub use native::NativeObject;
pub use seq::RangeObject;
pub use typeobj::*;

use crate::ast::FunctionDef;
use crate::compiler::Code;
use crate::error::{Error, Result};
use crate::interp::Interpreter;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Remaining stack below which nested traversal grows the stack
const STACK_RED_ZONE: usize = crate::config::DEFAULT_STACK_RED_ZONE;

/// Size of each stack extension for nested traversal
const STACK_GROW_SIZE: usize = crate::config::DEFAULT_STACK_GROW_SIZE;

/// Native implementation of a builtin function.
///
/// Receives the positional arguments as a tuple, owned.
pub type BuiltinFn = fn(&mut Interpreter, ObjRef) -> Result<ObjRef>;

/// A builtin function object
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

/// A user function: definition plus the globals it was created in
pub struct Function {
    pub def: Rc<FunctionDef>,
    pub globals: ObjRef,
}

/// Runtime value payload
pub enum Object {
    None,
    Int(i64),
    Float(f64),
    Str(String),
    /// Immutable to the language; resized in place only while uniquely owned
    Tuple(Vec<ObjRef>),
    List(RefCell<Vec<ObjRef>>),
    Dict(RefCell<Dict>),
    Range(RangeObject),
    Code(Code),
    Function(Function),
    Builtin(Builtin),
    Type(&'static TypeDescriptor),
    /// Extension type supplied by embedding code
    Native(Box<dyn NativeObject>),
}

/// Owning handle to an [`Object`]
#[derive(Clone)]
pub struct ObjRef(Rc<Object>);

thread_local! {
    static NONE: ObjRef = ObjRef(Rc::new(Object::None));
}

impl ObjRef {
    pub fn new(object: Object) -> Self {
        ObjRef(Rc::new(object))
    }

    /// The shared None object
    pub fn none() -> Self {
        NONE.with(ObjRef::clone)
    }

    pub fn int(n: i64) -> Self {
        Self::new(Object::Int(n))
    }

    pub fn float(x: f64) -> Self {
        Self::new(Object::Float(x))
    }

    pub fn str(s: impl Into<String>) -> Self {
        Self::new(Object::Str(s.into()))
    }

    pub fn bool(b: bool) -> Self {
        Self::int(i64::from(b))
    }

    pub fn tuple(items: Vec<ObjRef>) -> Self {
        Self::new(Object::Tuple(items))
    }

    pub fn list(items: Vec<ObjRef>) -> Self {
        Self::new(Object::List(RefCell::new(items)))
    }

    pub fn dict(dict: Dict) -> Self {
        Self::new(Object::Dict(RefCell::new(dict)))
    }

    pub fn native(value: impl NativeObject) -> Self {
        Self::new(Object::Native(Box::new(value)))
    }

    /// Number of owning references currently outstanding
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// True when this handle is the only owner, so in-place mutation is safe
    pub fn is_unique(&self) -> bool {
        Rc::strong_count(&self.0) == 1 && Rc::weak_count(&self.0) == 0
    }

    /// Identity comparison
    pub fn is(&self, other: &ObjRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the object, stable for its lifetime
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// Exclusive access, granted only while uniquely owned
    pub fn get_mut(&mut self) -> Option<&mut Object> {
        Rc::get_mut(&mut self.0)
    }

    /// Tuple storage for in-place reuse; `None` if shared or not a tuple
    pub fn tuple_items_mut(&mut self) -> Option<&mut Vec<ObjRef>> {
        match self.get_mut()? {
            Object::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// String buffer for in-place truncation; `None` if shared or not a string
    pub fn str_buffer_mut(&mut self) -> Option<&mut String> {
        match self.get_mut()? {
            Object::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Unpack an argument tuple, taking the items without touching their
    /// reference counts when this handle owns the tuple alone.
    pub fn into_tuple_items(self) -> Result<Vec<ObjRef>> {
        if let Some(items) = self.as_tuple() {
            if !self.is_unique() {
                return Ok(items.to_vec());
            }
        } else {
            return Err(Error::type_mismatch(format!(
                "expected a tuple, got '{}'",
                self.type_name()
            )));
        }
        match Rc::try_unwrap(self.0) {
            Ok(mut object) => match &mut object {
                Object::Tuple(items) => Ok(std::mem::take(items)),
                _ => Err(Error::internal("argument tuple changed variant while unpacking")),
            },
            Err(_) => Err(Error::internal("argument tuple changed ownership while unpacking")),
        }
    }

    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.0.descriptor()
    }

    pub fn type_name(&self) -> &'static str {
        self.descriptor().name
    }

    /// Representation as produced by `repr()`
    ///
    /// A container met again while it is still being printed shows as
    /// `[...]`, `(...)` or `{...}`.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out, &mut HashSet::new());
        out
    }

    fn write_repr(&self, out: &mut String, active: &mut HashSet<usize>) {
        use std::fmt::Write;
        let (open, close) = match &*self.0 {
            Object::Tuple(_) => ('(', ')'),
            Object::List(_) => ('[', ']'),
            Object::Dict(_) => ('{', '}'),
            _ => {
                self.write_scalar(out);
                return;
            }
        };
        if !active.insert(self.id()) {
            let _ = write!(out, "{open}...{close}");
            return;
        }
        out.push(open);
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || match &*self.0 {
            Object::Tuple(items) => {
                write_items(out, items, active);
                if items.len() == 1 {
                    out.push(',');
                }
            }
            Object::List(items) => write_items(out, &items.borrow(), active),
            Object::Dict(dict) => {
                for (i, (key, value)) in dict.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    key.write_repr(out, active);
                    out.push_str(": ");
                    value.write_repr(out, active);
                }
            }
            _ => {}
        });
        out.push(close);
        active.remove(&self.id());
    }

    fn write_scalar(&self, out: &mut String) {
        use std::fmt::Write;
        let _ = match &*self.0 {
            Object::None => write!(out, "None"),
            Object::Int(n) => write!(out, "{n}"),
            Object::Float(x) => write!(out, "{}", float::format_float(*x)),
            Object::Str(s) => write!(out, "{}", quote(s)),
            Object::Range(range) => write!(out, "{range}"),
            Object::Code(code) => write!(out, "<code object at {:#x}, file \"{}\">", self.id(), code.filename),
            Object::Function(func) => {
                write!(out, "<function {} at {:#x}>", func.def.name, self.id())
            }
            Object::Builtin(builtin) => write!(out, "<built-in function {}>", builtin.name),
            Object::Type(ty) => write!(out, "<type '{}'>", ty.name),
            Object::Native(native) => write!(out, "{}", native.repr()),
            Object::Tuple(_) | Object::List(_) | Object::Dict(_) => Ok(()),
        };
    }

    /// Structural equality; numbers compare across int and float.
    ///
    /// A pair of containers met again while still being compared counts
    /// as equal, so self-referencing values terminate.
    pub fn equals(&self, other: &ObjRef) -> bool {
        self.equals_in(other, &mut HashSet::new())
    }

    fn equals_in(&self, other: &ObjRef, active: &mut HashSet<(usize, usize)>) -> bool {
        if self.is(other) {
            return true;
        }
        match (&*self.0, &*other.0) {
            (Object::None, Object::None) => true,
            (Object::Int(a), Object::Int(b)) => a == b,
            (Object::Float(a), Object::Float(b)) => a == b,
            (Object::Int(a), Object::Float(b)) | (Object::Float(b), Object::Int(a)) => {
                (*a as f64) == *b
            }
            (Object::Str(a), Object::Str(b)) => a == b,
            (Object::Tuple(a), Object::Tuple(b)) => {
                self.nested_equal(other, active, |active| items_equal(a, b, active))
            }
            (Object::List(a), Object::List(b)) => self.nested_equal(other, active, |active| {
                items_equal(&a.borrow(), &b.borrow(), active)
            }),
            (Object::Dict(a), Object::Dict(b)) => self.nested_equal(other, active, |active| {
                a.borrow()
                    .equals_by(&b.borrow(), |x, y| x.equals_in(y, active))
            }),
            (Object::Range(a), Object::Range(b)) => a == b,
            (Object::Type(a), Object::Type(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }

    fn nested_equal(
        &self,
        other: &ObjRef,
        active: &mut HashSet<(usize, usize)>,
        f: impl FnOnce(&mut HashSet<(usize, usize)>) -> bool,
    ) -> bool {
        let pair = (self.id(), other.id());
        if !active.insert(pair) {
            return true;
        }
        let equal = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || f(active));
        active.remove(&pair);
        equal
    }
}

fn items_equal(a: &[ObjRef], b: &[ObjRef], active: &mut HashSet<(usize, usize)>) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals_in(y, active))
}

fn write_items(out: &mut String, items: &[ObjRef], active: &mut HashSet<usize>) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.write_repr(out, active);
    }
}

/// Single-quoted string literal with escapes
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32))
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

impl Object {
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        match self {
            Object::None => &NONE_TYPE,
            Object::Int(_) => &INT_TYPE,
            Object::Float(_) => &FLOAT_TYPE,
            Object::Str(_) => &STR_TYPE,
            Object::Tuple(_) => &TUPLE_TYPE,
            Object::List(_) => &LIST_TYPE,
            Object::Dict(_) => &DICT_TYPE,
            Object::Range(_) => &RANGE_TYPE,
            Object::Code(_) => &CODE_TYPE,
            Object::Function(_) => &FUNCTION_TYPE,
            Object::Builtin(_) => &BUILTIN_TYPE,
            Object::Type(_) => &TYPE_TYPE,
            Object::Native(native) => native.descriptor(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Object::None)
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Object::Native(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Object::List(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Object::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Object::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Object::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[ObjRef]> {
        match self {
            Object::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&RefCell<Vec<ObjRef>>> {
        match self {
            Object::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&RefCell<Dict>> {
        match self {
            Object::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_code(&self) -> Option<&Code> {
        match self {
            Object::Code(code) => Some(code),
            _ => None,
        }
    }

    pub fn as_native<T: NativeObject>(&self) -> Option<&T> {
        match self {
            Object::Native(native) => native.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Truth value used by conditionals and filter
    pub fn is_true(&self) -> bool {
        match self {
            Object::None => false,
            Object::Int(n) => *n != 0,
            Object::Float(x) => *x != 0.0,
            Object::Str(s) => !s.is_empty(),
            Object::Tuple(items) => !items.is_empty(),
            Object::List(items) => !items.borrow().is_empty(),
            Object::Dict(dict) => !dict.borrow().is_empty(),
            Object::Range(range) => range.len > 0,
            Object::Native(native) => native.is_true(),
            Object::Code(_) | Object::Function(_) | Object::Builtin(_) | Object::Type(_) => true,
        }
    }
}

impl Object {
    /// Move out every child reference held directly by a container
    fn take_children(&mut self, into: &mut Vec<ObjRef>) {
        match self {
            Object::Tuple(items) => into.append(items),
            Object::List(items) => into.append(items.get_mut()),
            Object::Dict(dict) => {
                for (key, value) in dict.get_mut().take_entries() {
                    into.push(key);
                    into.push(value);
                }
            }
            _ => {}
        }
    }
}

/// Containers are torn down from a worklist, so
/// freeing a deeply nested value runs in constant stack.
impl Drop for Object {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(child) = pending.pop() {
            if let Ok(mut object) = Rc::try_unwrap(child.0) {
                object.take_children(&mut pending);
            }
        }
    }
}

impl Deref for ObjRef {
    type Target = Object;

    fn deref(&self) -> &Object {
        &self.0
    }
}

/// `str()` form: strings print raw, everything else as its repr
impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => f.write_str(s),
            None => f.write_str(&self.repr()),
        }
    }
}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl PartialEq for ObjRef {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<i64> for ObjRef {
    fn from(n: i64) -> Self {
        ObjRef::int(n)
    }
}

impl From<f64> for ObjRef {
    fn from(x: f64) -> Self {
        ObjRef::float(x)
    }
}

impl From<&str> for ObjRef {
    fn from(s: &str) -> Self {
        ObjRef::str(s)
    }
}

impl From<String> for ObjRef {
    fn from(s: String) -> Self {
        ObjRef::str(s)
    }
}
