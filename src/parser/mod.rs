pub mod cursor;
mod object;

pub use cursor::ByteCursor;
pub use object::Parser;
