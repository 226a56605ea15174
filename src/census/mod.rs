use indexmap::IndexMap;
use tracing::trace;
use crate::parse::{Module, WasmParseError};
use crate::walk::{is_structural, InstrWalker};

// Only contains the report types, so re-export them in this module.
mod report;

pub use report::{CensusReport, MnemonicReport};

#[cfg(test)]
mod tests;

/// Running opcode frequencies, in first-encounter order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Counts {
	pub total: u64,
	pub per_mnemonic: IndexMap<String, u64>,
}

impl Counts {
	fn add(&mut self, mnemonic: &str) {
		self.total += 1;
		if let Some(count) = self.per_mnemonic.get_mut(mnemonic) {
			*count += 1;
		} else {
			self.per_mnemonic.insert(mnemonic.to_owned(), 1);
		}
	}
}

/// Counts every instruction in every code body. Function indices in the
/// per-function map are zero-based over the code section.
pub fn count_opcodes(
	module: &Module,
	exclude_structural: bool,
	per_function: bool,
) -> Result<(Counts, Option<IndexMap<usize, Counts>>), WasmParseError> {
	let mut total = Counts::default();
	let mut per_func = per_function.then(IndexMap::new);

	for (func_idx, body) in module.code_bodies.iter().enumerate() {
		trace!("Counting opcodes in code body {}", func_idx);
		let mut func_counts = Counts::default();
		let mut walker = InstrWalker::new(body)?;
		while !walker.at_end() {
			let instr = walker.next_instr()?;
			if exclude_structural && is_structural(instr.opcode) {
				continue;
			}
			func_counts.add(&instr.mnemonic);
			total.add(&instr.mnemonic);
		}
		if let Some(per_func) = per_func.as_mut() {
			per_func.insert(func_idx, func_counts);
		}
	}
	Ok((total, per_func))
}

/// Counts only the instructions whose mnemonic equals `mnemonic`. Immediates
/// of every other instruction are still consumed to stay aligned.
pub fn count_mnemonic(
	module: &Module,
	mnemonic: &str,
	exclude_structural: bool,
	per_function: bool,
) -> Result<(u64, Option<IndexMap<usize, u64>>), WasmParseError> {
	let mut total = 0;
	let mut per_func = per_function.then(IndexMap::new);

	for (func_idx, body) in module.code_bodies.iter().enumerate() {
		let mut func_total = 0;
		let mut walker = InstrWalker::new(body)?;
		while !walker.at_end() {
			let instr = walker.next_instr()?;
			if exclude_structural && is_structural(instr.opcode) {
				continue;
			}
			if instr.mnemonic == mnemonic {
				func_total += 1;
				total += 1;
			}
		}
		if let Some(per_func) = per_func.as_mut() {
			per_func.insert(func_idx, func_total);
		}
	}
	Ok((total, per_func))
}
