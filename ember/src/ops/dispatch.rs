//! Capability and slot lookup
//!
//! Every generic operation goes through these helpers. A missing table or
//! a missing slot becomes a TypeMismatch that names the operation.

use crate::error::{Error, Result};
use crate::object::{MappingMethods, NumberMethods, ObjRef, SequenceMethods};
use tracing::trace;

fn unsupported(op: &str, obj: &ObjRef, capability: &str) -> Error {
    trace!(op, ty = obj.type_name(), capability, "capability missing");
    Error::type_mismatch(format!(
        "{op}: '{}' object has no {capability} capability",
        obj.type_name()
    ))
}

fn slot_missing(op: &str, obj: &ObjRef, capability: &str) -> Error {
    trace!(op, ty = obj.type_name(), capability, "slot missing");
    Error::type_mismatch(format!(
        "{op}: {capability} capability of '{}' does not support this operation",
        obj.type_name()
    ))
}

pub fn number_methods(obj: &ObjRef, op: &str) -> Result<&'static NumberMethods> {
    obj.descriptor()
        .number
        .ok_or_else(|| unsupported(op, obj, "number"))
}

pub fn number_slot<F>(
    obj: &ObjRef,
    op: &str,
    pick: impl FnOnce(&'static NumberMethods) -> Option<F>,
) -> Result<F> {
    pick(number_methods(obj, op)?).ok_or_else(|| slot_missing(op, obj, "number"))
}

pub fn sequence_methods(obj: &ObjRef, op: &str) -> Result<&'static SequenceMethods> {
    obj.descriptor()
        .sequence
        .ok_or_else(|| unsupported(op, obj, "sequence"))
}

pub fn sequence_slot<F>(
    obj: &ObjRef,
    op: &str,
    pick: impl FnOnce(&'static SequenceMethods) -> Option<F>,
) -> Result<F> {
    pick(sequence_methods(obj, op)?).ok_or_else(|| slot_missing(op, obj, "sequence"))
}

pub fn mapping_methods(obj: &ObjRef, op: &str) -> Result<&'static MappingMethods> {
    obj.descriptor()
        .mapping
        .ok_or_else(|| unsupported(op, obj, "mapping"))
}

pub fn mapping_slot<F>(
    obj: &ObjRef,
    op: &str,
    pick: impl FnOnce(&'static MappingMethods) -> Option<F>,
) -> Result<F> {
    pick(mapping_methods(obj, op)?).ok_or_else(|| slot_missing(op, obj, "mapping"))
}

pub fn has_number(obj: &ObjRef) -> bool {
    obj.descriptor().number.is_some()
}

pub fn has_sequence(obj: &ObjRef) -> bool {
    obj.descriptor().sequence.is_some()
}

pub fn has_mapping(obj: &ObjRef) -> bool {
    obj.descriptor().mapping.is_some()
}
