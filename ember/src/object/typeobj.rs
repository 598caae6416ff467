//! Type descriptors and capability tables
//!
//! A descriptor carries up to three optional capability tables. Each table
//! is a set of optional slots; an absent table and an absent slot are
//! both legal and mean "operation not supported".

use super::{float, int, seq, dict, ObjRef};
use crate::error::Result;

pub type UnaryFn = fn(&ObjRef) -> Result<ObjRef>;
pub type BinaryFn = fn(&ObjRef, &ObjRef) -> Result<ObjRef>;
/// Returns `None` when the hook does not know how to pair the operands
pub type CoerceFn = fn(&ObjRef, &ObjRef) -> Result<Option<(ObjRef, ObjRef)>>;
pub type LengthFn = fn(&ObjRef) -> Result<usize>;
pub type ItemFn = fn(&ObjRef, usize) -> Result<ObjRef>;
pub type RepeatFn = fn(&ObjRef, usize) -> Result<ObjRef>;
pub type SliceFn = fn(&ObjRef, usize, usize) -> Result<ObjRef>;
pub type AssItemFn = fn(&ObjRef, usize, ObjRef) -> Result<()>;
/// Replace `lo..hi`; `None` deletes the range
pub type AssSliceFn = fn(&ObjRef, usize, usize, Option<&ObjRef>) -> Result<()>;
pub type SubscriptFn = fn(&ObjRef, &ObjRef) -> Result<ObjRef>;
pub type AssSubscriptFn = fn(&ObjRef, &ObjRef, ObjRef) -> Result<()>;

/// Per-type behaviour record
pub struct TypeDescriptor {
    pub name: &'static str,
    pub number: Option<&'static NumberMethods>,
    pub sequence: Option<&'static SequenceMethods>,
    pub mapping: Option<&'static MappingMethods>,
}

impl TypeDescriptor {
    /// Descriptor with no capabilities
    pub const fn plain(name: &'static str) -> Self {
        TypeDescriptor {
            name,
            number: None,
            sequence: None,
            mapping: None,
        }
    }
}

/// Arithmetic capability
#[derive(Debug)]
pub struct NumberMethods {
    pub add: Option<BinaryFn>,
    pub subtract: Option<BinaryFn>,
    pub multiply: Option<BinaryFn>,
    pub divide: Option<BinaryFn>,
    pub remainder: Option<BinaryFn>,
    pub divmod: Option<BinaryFn>,
    pub power: Option<BinaryFn>,
    pub negative: Option<UnaryFn>,
    pub absolute: Option<UnaryFn>,
    pub coerce: Option<CoerceFn>,
    pub int: Option<UnaryFn>,
    pub float: Option<UnaryFn>,
    pub hex: Option<UnaryFn>,
    pub oct: Option<UnaryFn>,
}

impl NumberMethods {
    pub const EMPTY: NumberMethods = NumberMethods {
        add: None,
        subtract: None,
        multiply: None,
        divide: None,
        remainder: None,
        divmod: None,
        power: None,
        negative: None,
        absolute: None,
        coerce: None,
        int: None,
        float: None,
        hex: None,
        oct: None,
    };
}

/// Indexed-collection capability
pub struct SequenceMethods {
    pub length: Option<LengthFn>,
    pub concat: Option<BinaryFn>,
    pub repeat: Option<RepeatFn>,
    pub item: Option<ItemFn>,
    pub slice: Option<SliceFn>,
    pub ass_item: Option<AssItemFn>,
    pub ass_slice: Option<AssSliceFn>,
}

impl SequenceMethods {
    pub const EMPTY: SequenceMethods = SequenceMethods {
        length: None,
        concat: None,
        repeat: None,
        item: None,
        slice: None,
        ass_item: None,
        ass_slice: None,
    };
}

/// Keyed-lookup capability
pub struct MappingMethods {
    pub length: Option<LengthFn>,
    pub subscript: Option<SubscriptFn>,
    pub ass_subscript: Option<AssSubscriptFn>,
}

pub static NONE_TYPE: TypeDescriptor = TypeDescriptor::plain("None");

pub static INT_TYPE: TypeDescriptor = TypeDescriptor {
    number: Some(&int::INT_NUMBER),
    ..TypeDescriptor::plain("int")
};

pub static FLOAT_TYPE: TypeDescriptor = TypeDescriptor {
    number: Some(&float::FLOAT_NUMBER),
    ..TypeDescriptor::plain("float")
};

pub static STR_TYPE: TypeDescriptor = TypeDescriptor {
    sequence: Some(&seq::STR_SEQUENCE),
    ..TypeDescriptor::plain("string")
};

pub static TUPLE_TYPE: TypeDescriptor = TypeDescriptor {
    sequence: Some(&seq::TUPLE_SEQUENCE),
    ..TypeDescriptor::plain("tuple")
};

pub static LIST_TYPE: TypeDescriptor = TypeDescriptor {
    sequence: Some(&seq::LIST_SEQUENCE),
    ..TypeDescriptor::plain("list")
};

pub static RANGE_TYPE: TypeDescriptor = TypeDescriptor {
    sequence: Some(&seq::RANGE_SEQUENCE),
    ..TypeDescriptor::plain("xrange")
};

pub static DICT_TYPE: TypeDescriptor = TypeDescriptor {
    mapping: Some(&dict::DICT_MAPPING),
    ..TypeDescriptor::plain("dictionary")
};

pub static CODE_TYPE: TypeDescriptor = TypeDescriptor::plain("code");
pub static FUNCTION_TYPE: TypeDescriptor = TypeDescriptor::plain("function");
pub static BUILTIN_TYPE: TypeDescriptor = TypeDescriptor::plain("builtin_function_or_method");
pub static TYPE_TYPE: TypeDescriptor = TypeDescriptor::plain("type");
