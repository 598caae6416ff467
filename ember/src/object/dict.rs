//! Dictionaries and hash keys
//!
//! Entries keep insertion order. Keys are reduced to a [`HashKey`] so that
//! numerically equal ints and floats land in the same bucket.

use super::{MappingMethods, Object, ObjRef};
use crate::error::{Error, Result};
use std::collections::HashMap;

pub static DICT_MAPPING: MappingMethods = MappingMethods {
    length: Some(length),
    subscript: Some(subscript),
    ass_subscript: Some(ass_subscript),
};

/// Hashable projection of a key object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    None,
    Int(i64),
    /// Bit pattern of a non-integral float
    Float(u64),
    Str(String),
    Tuple(Vec<HashKey>),
    /// Functions, builtins, types and code hash by identity
    Identity(usize),
}

impl HashKey {
    pub fn of(obj: &ObjRef) -> Result<HashKey> {
        Ok(match &**obj {
            Object::None => HashKey::None,
            Object::Int(n) => HashKey::Int(*n),
            Object::Float(x) => {
                if x.fract() == 0.0 && *x >= i64::MIN as f64 && *x < i64::MAX as f64 {
                    HashKey::Int(*x as i64)
                } else {
                    HashKey::Float(x.to_bits())
                }
            }
            Object::Str(s) => HashKey::Str(s.clone()),
            Object::Tuple(items) => {
                HashKey::Tuple(items.iter().map(HashKey::of).collect::<Result<_>>()?)
            }
            Object::Function(_) | Object::Builtin(_) | Object::Type(_) | Object::Code(_) => {
                HashKey::Identity(obj.id())
            }
            _ => {
                return Err(Error::type_mismatch(format!(
                    "unhashable type: '{}'",
                    obj.type_name()
                )));
            }
        })
    }

    /// Integer digest used by the `hash` builtin
    pub fn digest(&self) -> i64 {
        use std::hash::{DefaultHasher, Hash, Hasher};
        match self {
            HashKey::Int(n) => *n,
            other => {
                let mut hasher = DefaultHasher::new();
                other.hash(&mut hasher);
                hasher.finish() as i64
            }
        }
    }
}

/// Insertion-ordered hash table
#[derive(Default, Clone)]
pub struct Dict {
    index: HashMap<HashKey, usize>,
    entries: Vec<(ObjRef, ObjRef)>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &ObjRef) -> Result<Option<ObjRef>> {
        let hashed = HashKey::of(key)?;
        Ok(self.index.get(&hashed).map(|&i| self.entries[i].1.clone()))
    }

    /// Lookup by string key without allocating a key object
    pub fn get_str(&self, name: &str) -> Option<ObjRef> {
        self.index
            .get(&HashKey::Str(name.to_string()))
            .map(|&i| self.entries[i].1.clone())
    }

    /// Insert or replace; returns the previous value
    pub fn insert(&mut self, key: ObjRef, value: ObjRef) -> Result<Option<ObjRef>> {
        let hashed = HashKey::of(&key)?;
        match self.index.get(&hashed) {
            Some(&i) => Ok(Some(std::mem::replace(&mut self.entries[i].1, value))),
            None => {
                self.entries.try_reserve(1)?;
                self.index.insert(hashed, self.entries.len());
                self.entries.push((key, value));
                Ok(None)
            }
        }
    }

    pub fn set_str(&mut self, name: &str, value: ObjRef) {
        let hashed = HashKey::Str(name.to_string());
        match self.index.get(&hashed) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(hashed, self.entries.len());
                self.entries.push((ObjRef::str(name), value));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjRef, &ObjRef)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Keys that are strings, in insertion order
    pub fn str_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(k, _)| k.as_str())
    }

    /// Empty the table, handing back its entries
    pub(crate) fn take_entries(&mut self) -> Vec<(ObjRef, ObjRef)> {
        self.index.clear();
        std::mem::take(&mut self.entries)
    }

    pub fn equals(&self, other: &Dict) -> bool {
        self.equals_by(other, |a, b| a.equals(b))
    }

    /// Same keys, with values matched by `eq`
    pub(crate) fn equals_by(
        &self,
        other: &Dict,
        mut eq: impl FnMut(&ObjRef, &ObjRef) -> bool,
    ) -> bool {
        self.len() == other.len()
            && self.index.iter().all(|(key, &i)| {
                other
                    .index
                    .get(key)
                    .is_some_and(|&j| eq(&self.entries[i].1, &other.entries[j].1))
            })
    }
}

fn cell(obj: &ObjRef) -> Result<&std::cell::RefCell<Dict>> {
    obj.as_dict().ok_or_else(|| {
        Error::internal(format!("dictionary slot called with '{}'", obj.type_name()))
    })
}

fn length(obj: &ObjRef) -> Result<usize> {
    Ok(cell(obj)?.borrow().len())
}

fn subscript(obj: &ObjRef, key: &ObjRef) -> Result<ObjRef> {
    cell(obj)?
        .borrow()
        .get(key)?
        .ok_or_else(|| Error::key(key.repr()))
}

fn ass_subscript(obj: &ObjRef, key: &ObjRef, value: ObjRef) -> Result<()> {
    let previous = cell(obj)?.borrow_mut().insert(key.clone(), value)?;
    drop(previous);
    Ok(())
}
