use std::string;
use thiserror::Error;
use num_enum::TryFromPrimitiveError;
use crate::parse::types::ImportKind;

/// Every failure the reader, the module parser, the instruction walker and
/// the stack tracer can surface.
#[derive(Debug, Error)]
pub enum WasmParseError {
	#[error("The module does not start with the magic constant 0x00 0x61 0x73 0x6D")]
	BadMagic,

	#[error("The version {0:?} is not supported (expected 1)")]
	BadVersion([u8; 4]),

	#[error("Unexpected EOF while reading {0}")]
	UnexpectedEof(&'static str),

	#[error("Seek out of range: {pos} (end is {end})")]
	SeekOutOfRange { pos: usize, end: usize },

	#[error("LEB128 value too large for {max_bits} bits")]
	LebOverflow { max_bits: u32 },

	#[error("Invalid UTF-8 name: {0}")]
	BadUtf8(#[from] string::FromUtf8Error),

	#[error("Unsupported type form 0x{0:02x} (expected function form 0x60)")]
	UnsupportedTypeForm(u8),

	#[error("Unknown import kind: {0}")]
	UnknownImportKind(#[from] TryFromPrimitiveError<ImportKind>),

	#[error("Non-MVP init expression opcode 0x{0:02x}")]
	NonMvpInitExpr(u8),

	#[error("Section {id} not fully consumed ({remaining} bytes left)")]
	SectionNotConsumed { id: u8, remaining: usize },

	#[error("Section {id} size exceeds file length")]
	SectionExceedsFile { id: u8 },

	#[error("Unsupported opcode 0x{opcode:02x} at body offset 0x{offset:x}")]
	UnsupportedOpcode { opcode: u8, offset: usize },

	#[error("Unsupported 0xFC subopcode 0x{subop:x} at body offset 0x{offset:x}")]
	UnsupportedFcSubop { subop: u64, offset: usize },

	#[error("Operand stack underflow: have {have}, need {need}")]
	OperandStackUnderflow { have: u64, need: u64 },

	#[error("Block end result underflow: have {have}, need {need}")]
	ResultUnderflow { have: i64, need: u32 },

	#[error("Block end result mismatch: have {have}, need {need}")]
	ResultArityMismatch { have: i64, need: u32 },

	#[error("Illegal label index: {0}")]
	IllegalLabelIndex(u64),

	#[error("Non-zero memory index in {mnemonic} (MVP supports only memory 0)")]
	NonZeroMemIdx { mnemonic: String },

	#[error("Trailing bytes after function end")]
	TrailingBytes,

	#[error("else outside an if frame")]
	ElseWithoutIf,

	#[error("end without an open control frame")]
	EndWithoutFrame,

	#[error("Function index out of range: {0}")]
	FuncIdxOutOfRange(u64),

	#[error("Type index out of range: {0}")]
	TypeIdxOutOfRange(i64),

	#[error("Invalid block type (s33): {0}")]
	InvalidBlockType(i64),
}
