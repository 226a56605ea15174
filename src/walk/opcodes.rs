use self::Immediates as Im;
use self::StackEffect as Fx;

/// Shape of the immediate bytes that follow an opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Immediates {
	None,
	/// One sleb33 block type.
	BlockType,
	/// One uleb32 index (label, function, local, global or table).
	Index,
	/// uleb32 target count, that many targets, one default.
	BrTable,
	/// uleb32 typeidx, uleb32 tableidx.
	CallIndirect,
	/// Vector of valtype bytes.
	ValTypeVec,
	/// uleb32 alignment, uleb32 offset.
	MemArg,
	/// One uleb32 memory index.
	MemIdx,
	SLeb32,
	SLeb64,
	Bytes4,
	Bytes8,
	/// One sleb33 heap type.
	HeapType,
}

/// Operand-stack arity of an opcode. `Control` marks the opcodes whose effect
/// depends on the control-frame stack and is handled by the tracer itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackEffect {
	Nothing,
	Push(u32),
	Pop(u32),
	PopPush(u32, u32),
	Control,
}

/// One entry of the dispatch table: the canonical text name, the immediate
/// shape and the operand-stack arity.
#[derive(Clone, Copy, Debug)]
pub struct OpInfo {
	pub mnemonic: &'static str,
	pub immediates: Immediates,
	pub effect: StackEffect,
}

/// Dense dispatch over the single-byte opcode space.
/// <https://webassembly.github.io/spec/core/binary/instructions.html>
///
/// `0xFC` is dispatched through [`fc_op_info`] instead and never looked up
/// here; opcodes absent from both tables return `None`.
pub(crate) fn op_info(opcode: u8) -> Option<OpInfo> {
	let (mnemonic, immediates, effect) = match opcode {
		0x00 => ("unreachable", Im::None, Fx::Control),
		0x01 => ("nop", Im::None, Fx::Nothing),
		0x02 => ("block", Im::BlockType, Fx::Control),
		0x03 => ("loop", Im::BlockType, Fx::Control),
		0x04 => ("if", Im::BlockType, Fx::Control),
		0x05 => ("else", Im::None, Fx::Control),
		0x0B => ("end", Im::None, Fx::Control),
		0x0C => ("br", Im::Index, Fx::Control),
		0x0D => ("br_if", Im::Index, Fx::Control),
		0x0E => ("br_table", Im::BrTable, Fx::Control),
		0x0F => ("return", Im::None, Fx::Control),
		0x10 => ("call", Im::Index, Fx::Control),
		0x11 => ("call_indirect", Im::CallIndirect, Fx::Control),
		0x1A => ("drop", Im::None, Fx::Pop(1)),
		0x1B => ("select", Im::None, Fx::PopPush(3, 1)),
		0x1C => ("select.t", Im::ValTypeVec, Fx::PopPush(3, 1)),
		0x20 => ("local.get", Im::Index, Fx::Push(1)),
		0x21 => ("local.set", Im::Index, Fx::Pop(1)),
		0x22 => ("local.tee", Im::Index, Fx::PopPush(1, 1)),
		0x23 => ("global.get", Im::Index, Fx::Push(1)),
		0x24 => ("global.set", Im::Index, Fx::Pop(1)),
		0x25 => ("table.get", Im::Index, Fx::PopPush(1, 1)),
		0x26 => ("table.set", Im::Index, Fx::Pop(2)),
		0x28 => ("i32.load", Im::MemArg, Fx::PopPush(1, 1)),
		0x29 => ("i64.load", Im::MemArg, Fx::PopPush(1, 1)),
		0x2A => ("f32.load", Im::MemArg, Fx::PopPush(1, 1)),
		0x2B => ("f64.load", Im::MemArg, Fx::PopPush(1, 1)),
		0x2C => ("i32.load8_s", Im::MemArg, Fx::PopPush(1, 1)),
		0x2D => ("i32.load8_u", Im::MemArg, Fx::PopPush(1, 1)),
		0x2E => ("i32.load16_s", Im::MemArg, Fx::PopPush(1, 1)),
		0x2F => ("i32.load16_u", Im::MemArg, Fx::PopPush(1, 1)),
		0x30 => ("i64.load8_s", Im::MemArg, Fx::PopPush(1, 1)),
		0x31 => ("i64.load8_u", Im::MemArg, Fx::PopPush(1, 1)),
		0x32 => ("i64.load16_s", Im::MemArg, Fx::PopPush(1, 1)),
		0x33 => ("i64.load16_u", Im::MemArg, Fx::PopPush(1, 1)),
		0x34 => ("i64.load32_s", Im::MemArg, Fx::PopPush(1, 1)),
		0x35 => ("i64.load32_u", Im::MemArg, Fx::PopPush(1, 1)),
		0x36 => ("i32.store", Im::MemArg, Fx::Pop(2)),
		0x37 => ("i64.store", Im::MemArg, Fx::Pop(2)),
		0x38 => ("f32.store", Im::MemArg, Fx::Pop(2)),
		0x39 => ("f64.store", Im::MemArg, Fx::Pop(2)),
		0x3A => ("i32.store8", Im::MemArg, Fx::Pop(2)),
		0x3B => ("i32.store16", Im::MemArg, Fx::Pop(2)),
		0x3C => ("i64.store8", Im::MemArg, Fx::Pop(2)),
		0x3D => ("i64.store16", Im::MemArg, Fx::Pop(2)),
		0x3E => ("i64.store32", Im::MemArg, Fx::Pop(2)),
		0x3F => ("memory.size", Im::MemIdx, Fx::Push(1)),
		0x40 => ("memory.grow", Im::MemIdx, Fx::PopPush(1, 1)),
		0x41 => ("i32.const", Im::SLeb32, Fx::Push(1)),
		0x42 => ("i64.const", Im::SLeb64, Fx::Push(1)),
		0x43 => ("f32.const", Im::Bytes4, Fx::Push(1)),
		0x44 => ("f64.const", Im::Bytes8, Fx::Push(1)),
		0x45 => ("i32.eqz", Im::None, Fx::PopPush(1, 1)),
		0x46 => ("i32.eq", Im::None, Fx::PopPush(2, 1)),
		0x47 => ("i32.ne", Im::None, Fx::PopPush(2, 1)),
		0x48 => ("i32.lt_s", Im::None, Fx::PopPush(2, 1)),
		0x49 => ("i32.lt_u", Im::None, Fx::PopPush(2, 1)),
		0x4A => ("i32.gt_s", Im::None, Fx::PopPush(2, 1)),
		0x4B => ("i32.gt_u", Im::None, Fx::PopPush(2, 1)),
		0x4C => ("i32.le_s", Im::None, Fx::PopPush(2, 1)),
		0x4D => ("i32.le_u", Im::None, Fx::PopPush(2, 1)),
		0x4E => ("i32.ge_s", Im::None, Fx::PopPush(2, 1)),
		0x4F => ("i32.ge_u", Im::None, Fx::PopPush(2, 1)),
		0x50 => ("i64.eqz", Im::None, Fx::PopPush(1, 1)),
		0x51 => ("i64.eq", Im::None, Fx::PopPush(2, 1)),
		0x52 => ("i64.ne", Im::None, Fx::PopPush(2, 1)),
		0x53 => ("i64.lt_s", Im::None, Fx::PopPush(2, 1)),
		0x54 => ("i64.lt_u", Im::None, Fx::PopPush(2, 1)),
		0x55 => ("i64.gt_s", Im::None, Fx::PopPush(2, 1)),
		0x56 => ("i64.gt_u", Im::None, Fx::PopPush(2, 1)),
		0x57 => ("i64.le_s", Im::None, Fx::PopPush(2, 1)),
		0x58 => ("i64.le_u", Im::None, Fx::PopPush(2, 1)),
		0x59 => ("i64.ge_s", Im::None, Fx::PopPush(2, 1)),
		0x5A => ("i64.ge_u", Im::None, Fx::PopPush(2, 1)),
		0x5B => ("f32.eq", Im::None, Fx::PopPush(2, 1)),
		0x5C => ("f32.ne", Im::None, Fx::PopPush(2, 1)),
		0x5D => ("f32.lt", Im::None, Fx::PopPush(2, 1)),
		0x5E => ("f32.gt", Im::None, Fx::PopPush(2, 1)),
		0x5F => ("f32.le", Im::None, Fx::PopPush(2, 1)),
		0x60 => ("f32.ge", Im::None, Fx::PopPush(2, 1)),
		0x61 => ("f64.eq", Im::None, Fx::PopPush(2, 1)),
		0x62 => ("f64.ne", Im::None, Fx::PopPush(2, 1)),
		0x63 => ("f64.lt", Im::None, Fx::PopPush(2, 1)),
		0x64 => ("f64.gt", Im::None, Fx::PopPush(2, 1)),
		0x65 => ("f64.le", Im::None, Fx::PopPush(2, 1)),
		0x66 => ("f64.ge", Im::None, Fx::PopPush(2, 1)),
		0x67 => ("i32.clz", Im::None, Fx::PopPush(1, 1)),
		0x68 => ("i32.ctz", Im::None, Fx::PopPush(1, 1)),
		0x69 => ("i32.popcnt", Im::None, Fx::PopPush(1, 1)),
		0x6A => ("i32.add", Im::None, Fx::PopPush(2, 1)),
		0x6B => ("i32.sub", Im::None, Fx::PopPush(2, 1)),
		0x6C => ("i32.mul", Im::None, Fx::PopPush(2, 1)),
		0x6D => ("i32.div_s", Im::None, Fx::PopPush(2, 1)),
		0x6E => ("i32.div_u", Im::None, Fx::PopPush(2, 1)),
		0x6F => ("i32.rem_s", Im::None, Fx::PopPush(2, 1)),
		0x70 => ("i32.rem_u", Im::None, Fx::PopPush(2, 1)),
		0x71 => ("i32.and", Im::None, Fx::PopPush(2, 1)),
		0x72 => ("i32.or", Im::None, Fx::PopPush(2, 1)),
		0x73 => ("i32.xor", Im::None, Fx::PopPush(2, 1)),
		0x74 => ("i32.shl", Im::None, Fx::PopPush(2, 1)),
		0x75 => ("i32.shr_s", Im::None, Fx::PopPush(2, 1)),
		0x76 => ("i32.shr_u", Im::None, Fx::PopPush(2, 1)),
		0x77 => ("i32.rotl", Im::None, Fx::PopPush(2, 1)),
		0x78 => ("i32.rotr", Im::None, Fx::PopPush(2, 1)),
		0x79 => ("i64.clz", Im::None, Fx::PopPush(1, 1)),
		0x7A => ("i64.ctz", Im::None, Fx::PopPush(1, 1)),
		0x7B => ("i64.popcnt", Im::None, Fx::PopPush(1, 1)),
		0x7C => ("i64.add", Im::None, Fx::PopPush(2, 1)),
		0x7D => ("i64.sub", Im::None, Fx::PopPush(2, 1)),
		0x7E => ("i64.mul", Im::None, Fx::PopPush(2, 1)),
		0x7F => ("i64.div_s", Im::None, Fx::PopPush(2, 1)),
		0x80 => ("i64.div_u", Im::None, Fx::PopPush(2, 1)),
		0x81 => ("i64.rem_s", Im::None, Fx::PopPush(2, 1)),
		0x82 => ("i64.rem_u", Im::None, Fx::PopPush(2, 1)),
		0x83 => ("i64.and", Im::None, Fx::PopPush(2, 1)),
		0x84 => ("i64.or", Im::None, Fx::PopPush(2, 1)),
		0x85 => ("i64.xor", Im::None, Fx::PopPush(2, 1)),
		0x86 => ("i64.shl", Im::None, Fx::PopPush(2, 1)),
		0x87 => ("i64.shr_s", Im::None, Fx::PopPush(2, 1)),
		0x88 => ("i64.shr_u", Im::None, Fx::PopPush(2, 1)),
		0x89 => ("i64.rotl", Im::None, Fx::PopPush(2, 1)),
		0x8A => ("i64.rotr", Im::None, Fx::PopPush(2, 1)),
		0x8B => ("f32.abs", Im::None, Fx::PopPush(1, 1)),
		0x8C => ("f32.neg", Im::None, Fx::PopPush(1, 1)),
		0x8D => ("f32.ceil", Im::None, Fx::PopPush(1, 1)),
		0x8E => ("f32.floor", Im::None, Fx::PopPush(1, 1)),
		0x8F => ("f32.trunc", Im::None, Fx::PopPush(1, 1)),
		0x90 => ("f32.nearest", Im::None, Fx::PopPush(1, 1)),
		0x91 => ("f32.sqrt", Im::None, Fx::PopPush(1, 1)),
		0x92 => ("f32.add", Im::None, Fx::PopPush(2, 1)),
		0x93 => ("f32.sub", Im::None, Fx::PopPush(2, 1)),
		0x94 => ("f32.mul", Im::None, Fx::PopPush(2, 1)),
		0x95 => ("f32.div", Im::None, Fx::PopPush(2, 1)),
		0x96 => ("f32.min", Im::None, Fx::PopPush(2, 1)),
		0x97 => ("f32.max", Im::None, Fx::PopPush(2, 1)),
		0x98 => ("f32.copysign", Im::None, Fx::PopPush(2, 1)),
		0x99 => ("f64.abs", Im::None, Fx::PopPush(1, 1)),
		0x9A => ("f64.neg", Im::None, Fx::PopPush(1, 1)),
		0x9B => ("f64.ceil", Im::None, Fx::PopPush(1, 1)),
		0x9C => ("f64.floor", Im::None, Fx::PopPush(1, 1)),
		0x9D => ("f64.trunc", Im::None, Fx::PopPush(1, 1)),
		0x9E => ("f64.nearest", Im::None, Fx::PopPush(1, 1)),
		0x9F => ("f64.sqrt", Im::None, Fx::PopPush(1, 1)),
		0xA0 => ("f64.add", Im::None, Fx::PopPush(2, 1)),
		0xA1 => ("f64.sub", Im::None, Fx::PopPush(2, 1)),
		0xA2 => ("f64.mul", Im::None, Fx::PopPush(2, 1)),
		0xA3 => ("f64.div", Im::None, Fx::PopPush(2, 1)),
		0xA4 => ("f64.min", Im::None, Fx::PopPush(2, 1)),
		0xA5 => ("f64.max", Im::None, Fx::PopPush(2, 1)),
		0xA6 => ("f64.copysign", Im::None, Fx::PopPush(2, 1)),
		0xA7 => ("i32.wrap_i64", Im::None, Fx::PopPush(1, 1)),
		0xA8 => ("i32.trunc_f32_s", Im::None, Fx::PopPush(1, 1)),
		0xA9 => ("i32.trunc_f32_u", Im::None, Fx::PopPush(1, 1)),
		0xAA => ("i32.trunc_f64_s", Im::None, Fx::PopPush(1, 1)),
		0xAB => ("i32.trunc_f64_u", Im::None, Fx::PopPush(1, 1)),
		0xAC => ("i64.extend_i32_s", Im::None, Fx::PopPush(1, 1)),
		0xAD => ("i64.extend_i32_u", Im::None, Fx::PopPush(1, 1)),
		0xAE => ("i64.trunc_f32_s", Im::None, Fx::PopPush(1, 1)),
		0xAF => ("i64.trunc_f32_u", Im::None, Fx::PopPush(1, 1)),
		0xB0 => ("i64.trunc_f64_s", Im::None, Fx::PopPush(1, 1)),
		0xB1 => ("i64.trunc_f64_u", Im::None, Fx::PopPush(1, 1)),
		0xB2 => ("f32.convert_i32_s", Im::None, Fx::PopPush(1, 1)),
		0xB3 => ("f32.convert_i32_u", Im::None, Fx::PopPush(1, 1)),
		0xB4 => ("f32.convert_i64_s", Im::None, Fx::PopPush(1, 1)),
		0xB5 => ("f32.convert_i64_u", Im::None, Fx::PopPush(1, 1)),
		0xB6 => ("f32.demote_f64", Im::None, Fx::PopPush(1, 1)),
		0xB7 => ("f64.convert_i32_s", Im::None, Fx::PopPush(1, 1)),
		0xB8 => ("f64.convert_i32_u", Im::None, Fx::PopPush(1, 1)),
		0xB9 => ("f64.convert_i64_s", Im::None, Fx::PopPush(1, 1)),
		0xBA => ("f64.convert_i64_u", Im::None, Fx::PopPush(1, 1)),
		0xBB => ("f64.promote_f32", Im::None, Fx::PopPush(1, 1)),
		0xBC => ("i32.reinterpret_f32", Im::None, Fx::PopPush(1, 1)),
		0xBD => ("i64.reinterpret_f64", Im::None, Fx::PopPush(1, 1)),
		0xBE => ("f32.reinterpret_i32", Im::None, Fx::PopPush(1, 1)),
		0xBF => ("f64.reinterpret_i64", Im::None, Fx::PopPush(1, 1)),
		0xC0 => ("i32.extend8_s", Im::None, Fx::PopPush(1, 1)),
		0xC1 => ("i32.extend16_s", Im::None, Fx::PopPush(1, 1)),
		0xC2 => ("i64.extend8_s", Im::None, Fx::PopPush(1, 1)),
		0xC3 => ("i64.extend16_s", Im::None, Fx::PopPush(1, 1)),
		0xC4 => ("i64.extend32_s", Im::None, Fx::PopPush(1, 1)),
		0xD0 => ("ref.null", Im::HeapType, Fx::Push(1)),
		0xD1 => ("ref.is_null", Im::None, Fx::PopPush(1, 1)),
		0xD2 => ("ref.func", Im::Index, Fx::Push(1)),
		_ => return None,
	};
	Some(OpInfo { mnemonic, immediates, effect })
}

/// One entry of the `0xFC` dispatch table. All immediates in this family are
/// plain indices, so their shape is just a count.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FcOpInfo {
	pub mnemonic: &'static str,
	pub index_count: u8,
	pub effect: StackEffect,
}

/// Saturating truncations, bulk-memory and table operations.
/// <https://webassembly.github.io/spec/core/binary/instructions.html#numeric-instructions>
pub(crate) fn fc_op_info(subop: u64) -> Option<FcOpInfo> {
	let (mnemonic, index_count, effect) = match subop {
		0x00 => ("i32.trunc_sat_f32_s", 0, Fx::PopPush(1, 1)),
		0x01 => ("i32.trunc_sat_f32_u", 0, Fx::PopPush(1, 1)),
		0x02 => ("i32.trunc_sat_f64_s", 0, Fx::PopPush(1, 1)),
		0x03 => ("i32.trunc_sat_f64_u", 0, Fx::PopPush(1, 1)),
		0x04 => ("i64.trunc_sat_f32_s", 0, Fx::PopPush(1, 1)),
		0x05 => ("i64.trunc_sat_f32_u", 0, Fx::PopPush(1, 1)),
		0x06 => ("i64.trunc_sat_f64_s", 0, Fx::PopPush(1, 1)),
		0x07 => ("i64.trunc_sat_f64_u", 0, Fx::PopPush(1, 1)),
		0x08 => ("memory.init", 2, Fx::Pop(3)),
		0x09 => ("data.drop", 1, Fx::Nothing),
		0x0A => ("memory.copy", 2, Fx::Pop(3)),
		0x0B => ("memory.fill", 1, Fx::Pop(3)),
		0x0C => ("table.init", 2, Fx::Pop(3)),
		0x0D => ("elem.drop", 1, Fx::Nothing),
		0x0E => ("table.copy", 2, Fx::Pop(3)),
		0x0F => ("table.grow", 1, Fx::PopPush(2, 1)),
		0x10 => ("table.size", 1, Fx::Push(1)),
		0x11 => ("table.fill", 1, Fx::Pop(3)),
		_ => return None,
	};
	Some(FcOpInfo { mnemonic, index_count, effect })
}

/// The structured-control opcodes `block`, `loop`, `if`, `else` and `end`,
/// which both tools can filter out of their counts.
pub fn is_structural(opcode: u8) -> bool {
	matches!(opcode, 0x02 | 0x03 | 0x04 | 0x05 | 0x0B)
}
