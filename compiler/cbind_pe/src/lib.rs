//! cbind PE export reader
//!
//! Lists the exported symbol names of a PE dynamic library (`.dll`), in
//! export-table order. The generator uses them to decide which declared
//! functions actually exist in a native library.
//!
//! Only the headers needed to reach the export name table are parsed; no
//! relocation, import or resource data is touched.

mod error;
mod reader;

pub use error::ImageError;
pub use reader::{parse_exports, read_exports};
