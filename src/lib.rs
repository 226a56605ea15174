//! Static analysis over the code section of WebAssembly 1.0 modules.
//!
//! [`parse`] reads the module envelope and the sections needed to resolve
//! every function's signature, [`walk`] decodes function bodies opcode by
//! opcode, [`census`] turns that into opcode frequency tables and [`trace`]
//! runs a validation-lite abstract interpreter that tracks the operand-stack
//! height across structured control flow, including the polymorphic-stack
//! rule after unconditional branches.
//!
//! Supported beyond plain MVP: sign-extension, non-trapping float-to-int,
//! bulk-memory, table operations and the reference-type-adjacent opcodes.
//! SIMD and atomics are parse errors.

pub mod census;
pub mod parse;
pub mod trace;
pub mod walk;

#[cfg(test)]
pub(crate) mod testutil;
