use std::borrow::Cow;
use crate::parse::{ByteReader, WasmParseError};
use crate::walk::opcodes::{fc_op_info, op_info, Immediates, StackEffect};

/// One decoded instruction: the opcode byte, its canonical text name, the
/// immediate values the stack tracer needs and its operand-stack arity.
#[derive(Debug)]
pub struct Instr {
	pub opcode: u8,
	/// Borrowed from the dispatch table, or `opcode_0x<hh>` for an opcode the
	/// table does not know.
	pub mnemonic: Cow<'static, str>,
	pub imm: Imm,
	/// `None` for opcodes outside the dispatch table. The census still counts
	/// them under their placeholder name, the tracer rejects them.
	pub effect: Option<StackEffect>,
}

/// Immediate values that influence stack tracing. Immediates that only need
/// skipping (memargs, constants, valtype vectors) are consumed but not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imm {
	None,
	BlockType(i64),
	Index(u64),
	BrTable { targets: Vec<u64>, default: u64 },
	CallIndirect { type_idx: u64, table_idx: u64 },
	MemIdx(u64),
	FcSubop(u64),
}

/// Advances over one function body opcode by opcode without building a tree.
///
/// Creating the walker consumes the locals declaration, so the first
/// [`next_instr`](Self::next_instr) call decodes the first opcode. Every call
/// leaves the reader exactly past the instruction's last immediate byte.
pub struct InstrWalker<'a> {
	reader: ByteReader<'a>,
}

impl<'a> InstrWalker<'a> {
	pub fn new(body: &'a [u8]) -> Result<Self, WasmParseError> {
		let mut reader = ByteReader::new(body);
		// Locals declaration: a vector of (count, valtype) pairs. Locals do
		// not contribute to the operand stack, only local.get does.
		let local_decl_count = reader.read_uleb(32)?;
		for _ in 0..local_decl_count {
			reader.read_uleb(32)?; // count
			reader.read_u8()?; // valtype
		}
		Ok(Self { reader })
	}

	pub fn at_end(&self) -> bool {
		self.reader.at_end()
	}

	/// Byte offset of the next opcode within the body.
	pub fn offset(&self) -> usize {
		self.reader.tell()
	}

	pub fn next_instr(&mut self) -> Result<Instr, WasmParseError> {
		let offset = self.reader.tell();
		let opcode = self.reader.read_u8()?;
		match opcode {
			// SIMD and atomics prefixes.
			0xFD | 0xFE => return Err(WasmParseError::UnsupportedOpcode { opcode, offset }),
			0xFC => return self.next_fc_instr(offset),
			_ => {},
		}
		let info = match op_info(opcode) {
			Some(info) => info,
			None => {
				return Ok(Instr {
					opcode,
					mnemonic: Cow::Owned(format!("opcode_0x{:02x}", opcode)),
					imm: Imm::None,
					effect: None,
				});
			},
		};
		let imm = match info.immediates {
			Immediates::None => Imm::None,
			Immediates::BlockType => Imm::BlockType(self.reader.read_sleb(33)?),
			Immediates::Index => Imm::Index(self.reader.read_uleb(32)?),
			Immediates::BrTable => {
				let target_count = self.reader.read_uleb(32)?;
				let mut targets = Vec::new();
				for _ in 0..target_count {
					targets.push(self.reader.read_uleb(32)?);
				}
				let default = self.reader.read_uleb(32)?;
				Imm::BrTable { targets, default }
			},
			Immediates::CallIndirect => {
				let type_idx = self.reader.read_uleb(32)?;
				let table_idx = self.reader.read_uleb(32)?;
				Imm::CallIndirect { type_idx, table_idx }
			},
			Immediates::ValTypeVec => {
				let num_types = self.reader.read_uleb(32)?;
				for _ in 0..num_types {
					self.reader.read_u8()?;
				}
				Imm::None
			},
			Immediates::MemArg => {
				self.reader.read_uleb(32)?; // align
				self.reader.read_uleb(32)?; // offset
				Imm::None
			},
			Immediates::MemIdx => Imm::MemIdx(self.reader.read_uleb(32)?),
			Immediates::SLeb32 => {
				self.reader.read_sleb(32)?;
				Imm::None
			},
			Immediates::SLeb64 => {
				self.reader.read_sleb(64)?;
				Imm::None
			},
			Immediates::Bytes4 => {
				self.reader.read_bytes(4)?;
				Imm::None
			},
			Immediates::Bytes8 => {
				self.reader.read_bytes(8)?;
				Imm::None
			},
			Immediates::HeapType => {
				self.reader.read_sleb(33)?;
				Imm::None
			},
		};
		Ok(Instr {
			opcode,
			mnemonic: Cow::Borrowed(info.mnemonic),
			imm,
			effect: Some(info.effect),
		})
	}

	fn next_fc_instr(&mut self, offset: usize) -> Result<Instr, WasmParseError> {
		let subop = self.reader.read_uleb(32)?;
		let info = fc_op_info(subop).ok_or(WasmParseError::UnsupportedFcSubop { subop, offset })?;
		for _ in 0..info.index_count {
			self.reader.read_uleb(32)?;
		}
		Ok(Instr {
			opcode: 0xFC,
			mnemonic: Cow::Borrowed(info.mnemonic),
			imm: Imm::FcSubop(subop),
			effect: Some(info.effect),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn mnemonics(body: &[u8]) -> Vec<String> {
		let mut walker = InstrWalker::new(body).unwrap();
		let mut names = Vec::new();
		while !walker.at_end() {
			names.push(walker.next_instr().unwrap().mnemonic.into_owned());
		}
		names
	}

	#[test]
	fn consumes_exactly_the_body() {
		let body = [
			0x02, // two locals declarations
			0x03, 0x7F, // 3 x i32
			0x01, 0x7E, // 1 x i64
			0x41, 0x2A, // i32.const 42
			0x21, 0x00, // local.set 0
			0x20, 0x00, // local.get 0
			0x28, 0x02, 0x08, // i32.load align=2 offset=8
			0x1A, // drop
			0x0B, // end
		];
		let mut walker = InstrWalker::new(&body).unwrap();
		while !walker.at_end() {
			walker.next_instr().unwrap();
		}
		assert_eq!(walker.offset(), body.len());
	}

	#[test]
	fn decodes_branch_and_call_immediates() {
		let body = [
			0x00, // no locals
			0x0E, 0x02, 0x00, 0x01, 0x02, // br_table [0, 1] default 2
			0x11, 0x03, 0x00, // call_indirect type 3 table 0
			0x0B, // end
		];
		let mut walker = InstrWalker::new(&body).unwrap();
		let br_table = walker.next_instr().unwrap();
		assert_eq!(br_table.imm, Imm::BrTable { targets: vec![0, 1], default: 2 });
		let call_indirect = walker.next_instr().unwrap();
		assert_eq!(call_indirect.imm, Imm::CallIndirect { type_idx: 3, table_idx: 0 });
	}

	#[test]
	fn names_match_the_text_format() {
		let body = [
			0x00, // no locals
			0x41, 0x01, // i32.const 1
			0x42, 0x01, // i64.const 1
			0x43, 0x00, 0x00, 0x80, 0x3F, // f32.const 1.0
			0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF0, 0x3F, // f64.const 1.0
			0xD0, 0x70, // ref.null funcref
			0x1C, 0x01, 0x7F, // select.t [i32]
			0xFC, 0x00, // i32.trunc_sat_f32_s
			0xFC, 0x0A, 0x00, 0x00, // memory.copy 0 0
			0x0B, // end
		];
		assert_eq!(mnemonics(&body), vec![
			"i32.const",
			"i64.const",
			"f32.const",
			"f64.const",
			"ref.null",
			"select.t",
			"i32.trunc_sat_f32_s",
			"memory.copy",
			"end",
		]);
	}

	#[test]
	fn unknown_opcode_gets_a_placeholder_name() {
		let body = [0x00, 0x12, 0x0B];
		assert_eq!(mnemonics(&body), vec!["opcode_0x12", "end"]);
		let mut walker = InstrWalker::new(&body).unwrap();
		assert!(walker.next_instr().unwrap().effect.is_none());
	}

	#[test]
	fn simd_and_atomics_prefixes_are_rejected() {
		let mut walker = InstrWalker::new(&[0x00, 0xFD, 0x00]).unwrap();
		assert!(matches!(
			walker.next_instr(),
			Err(WasmParseError::UnsupportedOpcode { opcode: 0xFD, offset: 1 })
		));
		let mut walker = InstrWalker::new(&[0x00, 0xFE, 0x00]).unwrap();
		assert!(matches!(
			walker.next_instr(),
			Err(WasmParseError::UnsupportedOpcode { opcode: 0xFE, offset: 1 })
		));
	}

	#[test]
	fn unknown_fc_subop_is_rejected() {
		let mut walker = InstrWalker::new(&[0x00, 0xFC, 0x12]).unwrap();
		assert!(matches!(
			walker.next_instr(),
			Err(WasmParseError::UnsupportedFcSubop { subop: 0x12, offset: 1 })
		));
	}
}
