use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug_span, trace};
use crate::parse::{FuncType, Module, WasmParseError};
use crate::trace::frame::{CtrlFrame, FrameKind};
use crate::walk::{is_structural, Imm, Instr, InstrWalker, StackEffect};

/// Operand-stack statistics for one function (or the whole module when
/// aggregated).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FunctionStats {
	pub instructions_counted: u64,
	pub above_threshold: u64,
	pub at_or_below_threshold: u64,
	pub max_stack_height: u64,
}

impl FunctionStats {
	fn record(&mut self, height: u64, threshold: u64) {
		self.instructions_counted += 1;
		self.max_stack_height = self.max_stack_height.max(height);
		if height > threshold {
			self.above_threshold += 1;
		} else {
			self.at_or_below_threshold += 1;
		}
	}

	fn merge(&mut self, other: &FunctionStats) {
		self.instructions_counted += other.instructions_counted;
		self.above_threshold += other.above_threshold;
		self.at_or_below_threshold += other.at_or_below_threshold;
		self.max_stack_height = self.max_stack_height.max(other.max_stack_height);
	}
}

/// Traces every code body and aggregates the statistics. Function indices in
/// the per-function map count imports first, so local function 0 reports as
/// index [`Module::imported_function_count`].
pub fn trace_stack_stats(
	module: &Module,
	threshold: u64,
	include_structural: bool,
	per_function: bool,
) -> Result<(FunctionStats, Option<IndexMap<usize, FunctionStats>>), WasmParseError> {
	let imported = module.imported_function_count();
	let mut total = FunctionStats::default();
	let mut per_func = per_function.then(IndexMap::new);

	for (local_idx, body) in module.code_bodies.iter().enumerate() {
		let func_index = imported + local_idx;
		let func_type = if func_index < module.func_type_indices.len() {
			module.func_type(func_index as u64)?
		} else {
			// Body without a matching function declaration, traced as () -> ().
			FuncType::default()
		};
		let _log_span = debug_span!("function", func_index).entered();
		trace!("Tracing with {:?}", func_type);
		let stats = trace_function(module, func_type, body, threshold, include_structural)?;
		total.merge(&stats);
		if let Some(per_func) = per_func.as_mut() {
			per_func.insert(func_index, stats);
		}
	}
	Ok((total, per_func))
}

/// Walks one body and records the post-instruction stack height after every
/// opcode (structural ones only when asked to).
fn trace_function(
	module: &Module,
	func_type: FuncType,
	body: &[u8],
	threshold: u64,
	include_structural: bool,
) -> Result<FunctionStats, WasmParseError> {
	let mut walker = InstrWalker::new(body)?;
	let mut tracer = StackTracer::new(module, func_type);
	let mut stats = FunctionStats::default();

	while !walker.at_end() {
		let offset = walker.offset();
		let instr = walker.next_instr()?;
		let function_done = tracer.step(&instr, offset)?;
		if function_done && !walker.at_end() {
			return Err(WasmParseError::TrailingBytes);
		}
		if include_structural || !is_structural(instr.opcode) {
			stats.record(tracer.height, threshold);
		}
	}
	Ok(stats)
}

/// Validation-lite abstract interpreter over one function body. Tracks only
/// the operand-stack height and the polymorphic flag, never operand types.
struct StackTracer<'m, 'a> {
	module: &'m Module<'a>,
	frames: Vec<CtrlFrame>,
	height: u64,
	polymorphic: bool,
}

impl<'m, 'a> StackTracer<'m, 'a> {
	fn new(module: &'m Module<'a>, func_type: FuncType) -> Self {
		Self {
			module,
			frames: vec![CtrlFrame {
				base: 0,
				label_arity: func_type.results,
				end_arity: func_type.results,
				kind: FrameKind::Function,
				polymorphic_base: false,
				then_polymorphic_end: false,
			}],
			height: 0,
			polymorphic: false,
		}
	}

	/// Applies one instruction to the stack model. Returns true once the
	/// function frame was popped, i.e. the body's final `end` was consumed.
	fn step(&mut self, instr: &Instr, offset: usize) -> Result<bool, WasmParseError> {
		let frame_base = self.frames.last().map(|frame| frame.base).unwrap_or(0);
		match (instr.opcode, &instr.imm) {
			(0x00, _) => self.polymorphic = true, // unreachable
			(0x01, _) => {}, // nop
			(0x02 | 0x03 | 0x04, Imm::BlockType(block_type)) => {
				self.enter_block(instr.opcode, *block_type, frame_base)?;
			},
			(0x05, _) => self.enter_else()?,
			(0x0B, _) => return self.exit_frame(),
			(0x0C, Imm::Index(label)) => self.branch(*label, frame_base)?,
			(0x0D, Imm::Index(label)) => self.branch_if(*label, frame_base)?,
			(0x0E, Imm::BrTable { targets, default }) => {
				self.branch_table(targets, *default, frame_base)?;
			},
			(0x0F, _) => self.do_return(frame_base)?,
			(0x10, Imm::Index(func_index)) => self.call(*func_index, frame_base)?,
			(0x11, Imm::CallIndirect { type_idx, .. }) => self.call_indirect(*type_idx, frame_base)?,
			_ => {
				if let Imm::MemIdx(mem_idx) = instr.imm {
					if mem_idx != 0 {
						return Err(WasmParseError::NonZeroMemIdx {
							mnemonic: instr.mnemonic.to_string(),
						});
					}
				}
				match instr.effect {
					None => {
						return Err(WasmParseError::UnsupportedOpcode { opcode: instr.opcode, offset });
					},
					Some(StackEffect::Nothing | StackEffect::Control) => {},
					Some(StackEffect::Push(push)) => self.push(push),
					Some(StackEffect::Pop(pop)) => self.pop(pop, frame_base)?,
					Some(StackEffect::PopPush(pop, push)) => {
						self.pop(pop, frame_base)?;
						self.push(push);
					},
				}
			},
		}
		Ok(false)
	}

	fn push(&mut self, n: u32) {
		self.height += n as u64;
	}

	/// Pops saturate at the current frame's base once the stack is
	/// polymorphic; otherwise underflow is an error.
	fn pop(&mut self, n: u32, frame_base: u64) -> Result<(), WasmParseError> {
		let n = n as u64;
		if n == 0 {
			return Ok(());
		}
		if self.polymorphic {
			self.height = frame_base.max(self.height.saturating_sub(n));
		} else {
			if self.height < n {
				return Err(WasmParseError::OperandStackUnderflow { have: self.height, need: n });
			}
			self.height -= n;
		}
		Ok(())
	}

	fn target_frame(&self, label_index: u64) -> Result<&CtrlFrame, WasmParseError> {
		if label_index >= self.frames.len() as u64 {
			return Err(WasmParseError::IllegalLabelIndex(label_index));
		}
		Ok(&self.frames[self.frames.len() - 1 - label_index as usize])
	}

	/// Block-type selector: -0x40 is void, -1..-4 one scalar result, a
	/// non-negative value indexes the type section.
	fn block_arity(&self, block_type: i64) -> Result<(u32, u32), WasmParseError> {
		match block_type {
			-0x40 => Ok((0, 0)),
			-4..=-1 => Ok((0, 1)),
			index if index >= 0 => {
				let func_type = self.module.type_at(index as u64)?;
				Ok((func_type.params, func_type.results))
			},
			other => Err(WasmParseError::InvalidBlockType(other)),
		}
	}

	fn enter_block(&mut self, opcode: u8, block_type: i64, frame_base: u64) -> Result<(), WasmParseError> {
		let (params_arity, results_arity) = self.block_arity(block_type)?;
		if opcode == 0x04 {
			self.pop(1, frame_base)?; // if condition
		}
		self.pop(params_arity, frame_base)?;
		let kind = match opcode {
			0x02 => FrameKind::Block,
			0x03 => FrameKind::Loop,
			_ => FrameKind::If,
		};
		let label_arity = if kind == FrameKind::Loop { params_arity } else { results_arity };
		self.frames.push(CtrlFrame {
			base: self.height,
			label_arity,
			end_arity: results_arity,
			kind,
			polymorphic_base: self.polymorphic,
			then_polymorphic_end: false,
		});
		// Block results are not pushed here, they appear at the frame's end.
		Ok(())
	}

	fn enter_else(&mut self) -> Result<(), WasmParseError> {
		let polymorphic = self.polymorphic;
		let frame = self.frames.last_mut().ok_or(WasmParseError::ElseWithoutIf)?;
		if frame.kind != FrameKind::If {
			return Err(WasmParseError::ElseWithoutIf);
		}
		frame.then_polymorphic_end = polymorphic;
		frame.kind = FrameKind::Else;
		self.height = frame.base;
		self.polymorphic = frame.polymorphic_base;
		Ok(())
	}

	fn exit_frame(&mut self) -> Result<bool, WasmParseError> {
		let frame = self.frames.pop().ok_or(WasmParseError::EndWithoutFrame)?;
		let expected = frame.base + frame.end_arity as u64;
		if !self.polymorphic {
			let have = self.height as i64 - frame.base as i64;
			if self.height < expected {
				return Err(WasmParseError::ResultUnderflow { have, need: frame.end_arity });
			}
			if self.height != expected {
				return Err(WasmParseError::ResultArityMismatch { have, need: frame.end_arity });
			}
		}
		self.height = expected;
		self.polymorphic = match frame.kind {
			FrameKind::Else => {
				frame.polymorphic_base || (frame.then_polymorphic_end && self.polymorphic)
			},
			_ => frame.polymorphic_base,
		};
		Ok(frame.kind == FrameKind::Function)
	}

	fn branch(&mut self, label_index: u64, frame_base: u64) -> Result<(), WasmParseError> {
		let label_arity = self.target_frame(label_index)?.label_arity;
		self.pop(label_arity, frame_base)?;
		self.height = frame_base;
		self.polymorphic = true;
		Ok(())
	}

	fn branch_if(&mut self, label_index: u64, frame_base: u64) -> Result<(), WasmParseError> {
		self.target_frame(label_index)?;
		self.pop(1, frame_base) // condition
	}

	fn branch_table(&mut self, targets: &[u64], default: u64, frame_base: u64) -> Result<(), WasmParseError> {
		let label_arity = self.target_frame(default)?.label_arity;
		for &target in targets {
			self.target_frame(target)?;
		}
		self.pop(1, frame_base)?; // index
		self.pop(label_arity, frame_base)?;
		self.height = frame_base;
		self.polymorphic = true;
		Ok(())
	}

	fn do_return(&mut self, frame_base: u64) -> Result<(), WasmParseError> {
		let return_arity = self.frames.first().map(|frame| frame.end_arity).unwrap_or(0);
		self.pop(return_arity, frame_base)?;
		self.height = frame_base;
		self.polymorphic = true;
		Ok(())
	}

	fn call(&mut self, func_index: u64, frame_base: u64) -> Result<(), WasmParseError> {
		let func_type = self.module.func_type(func_index)?;
		self.pop(func_type.params, frame_base)?;
		self.push(func_type.results);
		Ok(())
	}

	fn call_indirect(&mut self, type_idx: u64, frame_base: u64) -> Result<(), WasmParseError> {
		let func_type = self.module.type_at(type_idx)?;
		self.pop(1, frame_base)?; // table element index
		self.pop(func_type.params, frame_base)?;
		self.push(func_type.results);
		Ok(())
	}
}
