mod object;

pub use object::{required, Dict, ObjRef, Object, ParsedObject};
