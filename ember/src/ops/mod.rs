//! Generic operations over the capability tables

mod coerce;
mod compare;
mod dispatch;
mod number;
mod sequence;

pub use coerce::coerce;
pub use compare::{compare, equal, rich};
pub use dispatch::{
    has_mapping, has_number, has_sequence, mapping_methods, mapping_slot, number_methods,
    number_slot, sequence_methods, sequence_slot,
};
pub use number::{absolute, binary, divmod, hex, negative, oct, power, to_float, to_int};
pub use sequence::{get_item, get_slice, length, lookup, set_item, set_slice, to_vec};

use crate::object::ObjRef;

/// Truth value of any object
pub fn is_true(obj: &ObjRef) -> bool {
    obj.is_true()
}
