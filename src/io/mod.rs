//! Random-access byte sources backing the zip reader.

mod cursor;
mod source;

pub use cursor::SourceCursor;
pub use source::{ByteSource, FileSource, MemorySource};
