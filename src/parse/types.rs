use num_enum::TryFromPrimitive;
use crate::parse::{Parser, WasmParseError};

/// <https://webassembly.github.io/spec/core/binary/modules.html#sections>
#[derive(Eq, PartialEq, Debug, TryFromPrimitive)]
#[repr(u8)]
pub enum SectionId {
	Custom = 0,
	Type = 1,
	Import = 2,
	Function = 3,
	Table = 4,
	Memory = 5,
	Global = 6,
	Export = 7,
	Start = 8,
	Element = 9,
	Code = 10,
	Data = 11,
}

/// <https://webassembly.github.io/spec/core/binary/modules.html#import-section>
#[derive(Eq, PartialEq, Debug, TryFromPrimitive, Clone)]
#[repr(u8)]
pub enum ImportKind {
	Function = 0x00,
	Table = 0x01,
	Memory = 0x02,
	Global = 0x03,
}

/// Parameter and result counts of a function type. Stack-height analysis only
/// needs operand counts, never the value types themselves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FuncType {
	pub params: u32,
	pub results: u32,
}

/// The parts of a parsed module that code-section analysis needs.
#[derive(Default, Debug)]
pub struct Module<'a> {
	/// Function types in type-section declaration order.
	pub types: Vec<FuncType>,
	/// One type-section index per declared function, imported functions first.
	pub func_type_indices: Vec<u64>,
	/// Raw code bodies, one per module-defined function, aligned to the tail
	/// of [`func_type_indices`](Self::func_type_indices).
	pub code_bodies: Vec<&'a [u8]>,
}

impl<'a> Module<'a> {
	/// Parses `bytecode` into a [Module] or a [WasmParseError].
	pub fn parse(bytecode: &'a [u8]) -> Result<Module<'a>, WasmParseError> {
		Parser::parse_module(bytecode)
	}

	/// Imported functions precede module-defined ones in the function index
	/// space. Clamped at zero so misaligned modules can still be analyzed.
	pub fn imported_function_count(&self) -> usize {
		self.func_type_indices.len().saturating_sub(self.code_bodies.len())
	}

	/// Function type at `type_idx`. Indices are only validated here, at the
	/// point where they are consumed.
	pub fn type_at(&self, type_idx: u64) -> Result<FuncType, WasmParseError> {
		if type_idx >= self.types.len() as u64 {
			return Err(WasmParseError::TypeIdxOutOfRange(type_idx as i64));
		}
		Ok(self.types[type_idx as usize])
	}

	/// Signature of the function at `func_index` (imports included), resolved
	/// through the type section.
	pub fn func_type(&self, func_index: u64) -> Result<FuncType, WasmParseError> {
		if func_index >= self.func_type_indices.len() as u64 {
			return Err(WasmParseError::FuncIdxOutOfRange(func_index));
		}
		self.type_at(self.func_type_indices[func_index as usize])
	}
}
