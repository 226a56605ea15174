// Export types so one can import only types without the rest of the module.
pub mod types;
// Only contains Parser, so re-export it in this module.
mod parser;
// Only contains ByteReader, so re-export it in this module.
mod reader;
// Only contains WasmParseError, so re-export in this module.
mod error;

pub use types::*;
pub use error::WasmParseError;
pub use parser::Parser;
pub use reader::ByteReader;
