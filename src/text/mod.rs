//! Line-oriented text grammar of the `.anim` format.
//!
//! Statements are terminated by `;`, `#` starts an end-of-line comment
//! and blocks are delimited by `{ }`. The reader is a cursor over the
//! lines of a text buffer; the writer appends to a string buffer. File
//! I/O lives with the caller.

mod reader;
mod writer;

pub use reader::*;
pub use writer::*;
