use indexmap::IndexMap;
use serde::Serialize;
use crate::census::Counts;

/// Full census result, ready for JSON or text output.
#[derive(Debug, Serialize)]
pub struct CensusReport {
	pub wasm: String,
	pub exclude_structural: bool,
	pub functions: usize,
	pub total_instructions_counted: u64,
	/// Ordered by descending count, ties by mnemonic.
	pub counts: IndexMap<String, u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub per_function: Option<IndexMap<usize, IndexMap<String, u64>>>,
}

impl CensusReport {
	pub fn new(
		wasm: String,
		exclude_structural: bool,
		functions: usize,
		total: Counts,
		per_function: Option<IndexMap<usize, Counts>>,
	) -> Self {
		let mut items: Vec<(String, u64)> = total.per_mnemonic.into_iter().collect();
		items.sort_by(|(a_name, a_count), (b_name, b_count)| {
			b_count.cmp(a_count).then_with(|| a_name.cmp(b_name))
		});
		Self {
			wasm,
			exclude_structural,
			functions,
			total_instructions_counted: total.total,
			counts: items.into_iter().collect(),
			per_function: per_function.map(|per_func| {
				per_func
					.into_iter()
					.map(|(func_idx, counts)| (func_idx, counts.per_mnemonic))
					.collect()
			}),
		}
	}

	/// The rows for `--top N`: the first `n` entries of the ordered counts.
	pub fn top(&self, n: usize) -> impl Iterator<Item = (&String, &u64)> {
		self.counts.iter().take(n)
	}
}

/// Result of the single-mnemonic counting mode.
#[derive(Debug, Serialize)]
pub struct MnemonicReport {
	pub wasm: String,
	pub mnemonic: String,
	pub count: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub per_function: Option<IndexMap<usize, u64>>,
}
