//! Higher-order sequence engine: map, filter, reduce
//!
//! Callbacks receive their arguments through a scratch tuple that is
//! refilled on every iteration. The tuple is reused only while this engine
//! holds the sole reference to it; a callee that keeps its argument tuple
//! (a `*args` function returning `args`, say) forces a fresh one for the
//! next iteration.
//!
//! String and tuple inputs to `filter` keep their type. A uniquely owned
//! tuple, string or list is filtered in place.

use super::{exec::execute, take, take_between};
use crate::compiler::EntryPoint;
use crate::error::{Error, Result};
use crate::interp::Interpreter;
use crate::object::{ItemFn, ObjRef};
use crate::ops::{self, has_sequence, length, sequence_slot};
use tracing::debug;

/// Positional-argument tuple reused across callback invocations
struct ScratchArgs {
    tuple: ObjRef,
    arity: usize,
}

impl ScratchArgs {
    fn new(arity: usize) -> Result<Self> {
        Ok(ScratchArgs {
            tuple: Self::alloc(arity)?,
            arity,
        })
    }

    fn alloc(arity: usize) -> Result<ObjRef> {
        let mut items = Vec::new();
        items.try_reserve_exact(arity)?;
        items.resize_with(arity, ObjRef::none);
        Ok(ObjRef::tuple(items))
    }

    /// Writable argument slots, swapping in a new tuple if the last
    /// callee kept a reference to the old one
    fn slots(&mut self) -> Result<&mut [ObjRef]> {
        if !self.tuple.is_unique() {
            debug!(
                arity = self.arity,
                refs = self.tuple.ref_count(),
                "argument tuple retained by callee, reallocating"
            );
            self.tuple = Self::alloc(self.arity)?;
        }
        self.tuple
            .tuple_items_mut()
            .map(Vec::as_mut_slice)
            .ok_or_else(|| Error::internal("scratch tuple is not writable"))
    }

    /// Hand the filled tuple over as a value and start a new one
    fn detach(&mut self) -> Result<ObjRef> {
        let fresh = Self::alloc(self.arity)?;
        Ok(std::mem::replace(&mut self.tuple, fresh))
    }

    fn call(&self, interp: &mut Interpreter, func: &ObjRef) -> Result<ObjRef> {
        interp.call_object(func, self.tuple.clone())
    }
}

/// Function argument after resolution: None is the identity marker and
/// text is compiled through the lambda entry point
enum Callable {
    Identity,
    Call(ObjRef),
}

impl Callable {
    fn resolve(interp: &mut Interpreter, func: ObjRef) -> Result<Self> {
        if func.is_none() {
            return Ok(Callable::Identity);
        }
        if func.as_str().is_some() {
            debug!(source = %func, "compiling text callable");
            let compiled = execute(interp, &func, None, None, EntryPoint::Lambda)?;
            return Ok(Callable::Call(compiled));
        }
        Ok(Callable::Call(func))
    }

    /// Whether `element` passes the predicate
    fn keeps(
        &self,
        interp: &mut Interpreter,
        scratch: &mut ScratchArgs,
        element: &ObjRef,
    ) -> Result<bool> {
        match self {
            Callable::Identity => Ok(element.is_true()),
            Callable::Call(func) => {
                scratch.slots()?[0] = element.clone();
                Ok(scratch.call(interp, func)?.is_true())
            }
        }
    }
}

/// Move the retained items to the front and drop the rest
fn keep_items(
    interp: &mut Interpreter,
    func: &Callable,
    scratch: &mut ScratchArgs,
    mut items: Vec<ObjRef>,
) -> Result<Vec<ObjRef>> {
    let mut kept = 0;
    for i in 0..items.len() {
        if func.keeps(interp, scratch, &items[i])? {
            items.swap(kept, i);
            kept += 1;
        }
    }
    items.truncate(kept);
    Ok(items)
}

/// A sequence whose item slot runs in constant time.
///
/// Strings index by character, so they are split into a tuple once up
/// front; everything else is passed through.
fn positional(seq: &ObjRef) -> Result<ObjRef> {
    if seq.as_str().is_some() {
        return Ok(ObjRef::tuple(ops::to_vec(seq, "sequence")?));
    }
    Ok(seq.clone())
}

/// Apply `func` across one or more sequences.
///
/// Shorter sequences are padded with None up to the longest one.
pub fn map(interp: &mut Interpreter, func: ObjRef, seqs: &[ObjRef]) -> Result<ObjRef> {
    let mut indexed = Vec::new();
    indexed.try_reserve_exact(seqs.len())?;
    for (i, seq) in seqs.iter().enumerate() {
        if !has_sequence(seq) {
            return Err(Error::type_mismatch(format!(
                "argument {} to map() must be a sequence object",
                i + 2
            )));
        }
        indexed.push(positional(seq)?);
    }
    let mut sources: Vec<(&ObjRef, usize, ItemFn)> = Vec::new();
    sources.try_reserve_exact(indexed.len())?;
    for seq in &indexed {
        let item = sequence_slot(seq, "map", |m| m.item)?;
        sources.push((seq, length(seq)?, item));
    }
    let func = Callable::resolve(interp, func)?;
    let longest = sources.iter().map(|&(_, len, _)| len).max().unwrap_or(0);

    let mut results = Vec::new();
    results.try_reserve_exact(longest)?;
    let mut scratch = ScratchArgs::new(sources.len())?;
    for i in 0..longest {
        let slots = scratch.slots()?;
        for (slot, &(seq, len, item)) in slots.iter_mut().zip(&sources) {
            *slot = if i < len { item(seq, i)? } else { ObjRef::none() };
        }
        let value = match &func {
            Callable::Identity if sources.len() == 1 => slots[0].clone(),
            Callable::Identity => scratch.detach()?,
            Callable::Call(f) => scratch.call(interp, f)?,
        };
        results.push(value);
    }
    Ok(ObjRef::list(results))
}

/// Keep the elements for which `func` is true.
///
/// Strings and tuples come back as the same type, lists as lists and any
/// other sequence as a new list.
pub fn filter(interp: &mut Interpreter, func: ObjRef, seq: ObjRef) -> Result<ObjRef> {
    ops::sequence_methods(&seq, "filter")?;
    if seq.as_str().is_some() && func.is_none() {
        return Ok(seq);
    }
    let func = Callable::resolve(interp, func)?;
    let mut scratch = ScratchArgs::new(1)?;

    if seq.as_str().is_some() {
        filter_str(interp, &func, &mut scratch, seq)
    } else if seq.as_tuple().is_some() {
        filter_tuple(interp, &func, &mut scratch, seq)
    } else if seq.is_list() && seq.is_unique() {
        filter_list_in_place(interp, &func, &mut scratch, seq)
    } else {
        let items = ops::to_vec(&seq, "filter")?;
        Ok(ObjRef::list(keep_items(interp, &func, &mut scratch, items)?))
    }
}

fn filter_str(
    interp: &mut Interpreter,
    func: &Callable,
    scratch: &mut ScratchArgs,
    mut text: ObjRef,
) -> Result<ObjRef> {
    let mut failure = None;
    let mut keep = |c: char| -> bool {
        if failure.is_some() {
            return true;
        }
        func.keeps(interp, scratch, &ObjRef::str(c))
            .unwrap_or_else(|e| {
                failure = Some(e);
                true
            })
    };

    let result = if let Some(buffer) = text.str_buffer_mut() {
        debug!(len = buffer.len(), "filtering string in place");
        buffer.retain(&mut keep);
        text
    } else {
        let kept: String = text.as_str().unwrap_or_default().chars().filter(|&c| keep(c)).collect();
        ObjRef::str(kept)
    };
    match failure {
        Some(e) => Err(e),
        None => Ok(result),
    }
}

fn filter_tuple(
    interp: &mut Interpreter,
    func: &Callable,
    scratch: &mut ScratchArgs,
    mut tuple: ObjRef,
) -> Result<ObjRef> {
    if let Some(items) = tuple.tuple_items_mut() {
        debug!(len = items.len(), "filtering tuple in place");
        *items = keep_items(interp, func, scratch, std::mem::take(items))?;
        return Ok(tuple);
    }
    let items = tuple.as_tuple().map(<[_]>::to_vec).unwrap_or_default();
    Ok(ObjRef::tuple(keep_items(interp, func, scratch, items)?))
}

/// Compact a uniquely owned list through its own item slots.
///
/// The caller holds the only reference, and the predicate only ever sees
/// items, so nothing it runs can reach the list. Ownership is still
/// rechecked before every write; should the list turn out shared, the
/// remaining work goes into a new list and the original is left as is.
fn filter_list_in_place(
    interp: &mut Interpreter,
    func: &Callable,
    scratch: &mut ScratchArgs,
    list: ObjRef,
) -> Result<ObjRef> {
    let item = sequence_slot(&list, "filter", |m| m.item)?;
    let assign = sequence_slot(&list, "filter", |m| m.ass_item)?;
    let resize = sequence_slot(&list, "filter", |m| m.ass_slice)?;
    let len = length(&list)?;
    debug!(len, "filtering list in place");

    let mut kept = 0;
    let mut fresh: Option<Vec<ObjRef>> = None;
    for i in 0..len {
        let element = item(&list, i)?;
        if !func.keeps(interp, scratch, &element)? {
            continue;
        }
        match &mut fresh {
            Some(out) => out.push(element),
            None if list.is_unique() => {
                assign(&list, kept, element)?;
                kept += 1;
            }
            None => {
                debug!(kept, "list shared during filter, copying");
                let mut out = ops::to_vec(&ops::get_slice(&list, None, Some(kept as i64))?, "filter")?;
                out.try_reserve(len - i)?;
                out.push(element);
                fresh = Some(out);
            }
        }
    }

    match fresh {
        Some(out) => Ok(ObjRef::list(out)),
        None => {
            resize(&list, kept, len, None)?;
            Ok(list)
        }
    }
}

/// Left fold of `func` over `seq`.
///
/// With the identity marker the accumulator never changes, so the result
/// is the initial value or the first element.
pub fn reduce(
    interp: &mut Interpreter,
    func: ObjRef,
    seq: &ObjRef,
    initial: Option<ObjRef>,
) -> Result<ObjRef> {
    let seq = &positional(seq)?;
    let item = sequence_slot(seq, "reduce", |m| m.item)?;
    let len = length(seq)?;
    let (mut acc, start) = match initial {
        Some(value) => (value, 0),
        None if len == 0 => {
            return Err(Error::value("reduce of empty sequence with no initial value"))
        }
        None => (item(seq, 0)?, 1),
    };

    let Callable::Call(func) = Callable::resolve(interp, func)? else {
        return Ok(acc);
    };
    let mut scratch = ScratchArgs::new(2)?;
    for i in start..len {
        let element = item(seq, i)?;
        let slots = scratch.slots()?;
        slots[0] = acc;
        slots[1] = element;
        acc = scratch.call(interp, &func)?;
    }
    Ok(acc)
}

pub fn builtin_map(interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let mut items = args.into_tuple_items()?;
    if items.len() < 2 {
        return Err(Error::arity("map", 2, usize::MAX, items.len()));
    }
    let seqs = items.split_off(1);
    let func = items.pop().unwrap_or_else(ObjRef::none);
    map(interp, func, &seqs)
}

pub fn builtin_filter(interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let [func, seq] = take("filter", args)?;
    filter(interp, func, seq)
}

/// `bagof([fn,] seq)`: filter with an optional predicate
pub fn builtin_bagof(interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let mut items = take_between("bagof", args, 1, 2)?;
    let seq = items.pop().unwrap_or_else(ObjRef::none);
    let func = items.pop().unwrap_or_else(ObjRef::none);
    filter(interp, func, seq)
}

pub fn builtin_reduce(interp: &mut Interpreter, args: ObjRef) -> Result<ObjRef> {
    let mut items = take_between("reduce", args, 2, 3)?.into_iter();
    let func = items.next().unwrap_or_else(ObjRef::none);
    let seq = items.next().unwrap_or_else(ObjRef::none);
    reduce(interp, func, &seq, items.next())
}
