use std::collections::HashMap;

use crate::error::{PdfError, Result};

/// Dictionary body: name (without the slash) to value
pub type Dict = HashMap<String, Object>;

/// Reference to an indirect object (e.g., "5 0 R")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef {
    pub obj_num: u32,
    pub gen_num: u16,
}

impl ObjRef {
    pub fn new(obj_num: u32, gen_num: u16) -> Self {
        Self { obj_num, gen_num }
    }
}

/// The object kinds that appear in roster documents
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Name(String),
    String(Vec<u8>),
    Array(Vec<Object>),
    Dict(Dict),
    Ref(ObjRef),
    /// Stream dictionary and its raw, still encoded, body
    Stream { dict: Dict, data: Vec<u8> },
}

/// An object read at the top level, with its `n g obj` header when present
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedObject {
    pub id: Option<ObjRef>,
    pub value: Object,
}

impl Object {
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::Bool(_) => "boolean",
            Object::Int(_) => "integer",
            Object::Real(_) => "real",
            Object::Name(_) => "name",
            Object::String(_) => "string",
            Object::Array(_) => "array",
            Object::Dict(_) => "dictionary",
            Object::Ref(_) => "reference",
            Object::Stream { .. } => "stream",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Object::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer or real, widened to f64
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Object::Real(f) => Some(*f),
            Object::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Object]> {
        match self {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Dictionary of a plain dictionary or of a stream
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dict(d) => Some(d),
            Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<(&Dict, &[u8])> {
        match self {
            Object::Stream { dict, data } => Some((dict, data)),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Option<ObjRef> {
        match self {
            Object::Ref(r) => Some(*r),
            _ => None,
        }
    }

    pub fn expect_int(&self) -> Result<i64> {
        self.as_int().ok_or_else(|| self.mismatch("integer"))
    }

    pub fn expect_name(&self) -> Result<&str> {
        self.as_name().ok_or_else(|| self.mismatch("name"))
    }

    pub fn expect_array(&self) -> Result<&[Object]> {
        self.as_array().ok_or_else(|| self.mismatch("array"))
    }

    pub fn expect_dict(&self) -> Result<&Dict> {
        self.as_dict().ok_or_else(|| self.mismatch("dictionary"))
    }

    pub fn expect_ref(&self) -> Result<ObjRef> {
        self.as_ref().ok_or_else(|| self.mismatch("reference"))
    }

    fn mismatch(&self, expected: &'static str) -> PdfError {
        PdfError::TypeMismatch {
            expected,
            found: self.type_name(),
        }
    }
}

/// Look up a key that the document structure requires
pub fn required<'a>(dict: &'a Dict, key: &str) -> Result<&'a Object> {
    dict.get(key).ok_or_else(|| PdfError::missing_key(key))
}
