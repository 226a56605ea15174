use indexmap::IndexMap;
use serde::Serialize;
use crate::trace::FunctionStats;

/// Aggregate stack statistics, ready for JSON or text output.
#[derive(Debug, Serialize)]
pub struct StackReport {
	pub wasm: String,
	pub threshold: u64,
	pub include_structural: bool,
	#[serde(flatten)]
	pub total: FunctionStats,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub per_function: Option<IndexMap<usize, FunctionStats>>,
}
