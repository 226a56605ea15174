use std::fs;
use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use wasm_opstats::parse::Module;
use wasm_opstats::trace::{trace_stack_stats, StackReport};

/// Report the operand-stack height after every opcode in the code section of
/// a WebAssembly module.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
	/// Input .wasm file path.
	wasm: PathBuf,

	/// Stack height threshold (an instruction counts as above when its
	/// post-instruction height > N).
	#[arg(long)]
	threshold: u64,

	/// Also count block/loop/if/else/end opcodes.
	#[arg(long)]
	include_structural: bool,

	/// Output per-function stats (local functions).
	#[arg(long)]
	per_function: bool,

	/// Output as JSON.
	#[arg(long)]
	json: bool,
}

fn main() -> anyhow::Result<()> {
	init_tracing();
	let args = Args::parse();

	let bytecode = fs::read(&args.wasm)
		.with_context(|| format!("Reading {}", args.wasm.display()))?;
	let module = Module::parse(&bytecode)?;
	let (total, per_function) =
		trace_stack_stats(&module, args.threshold, args.include_structural, args.per_function)?;

	let report = StackReport {
		wasm: args.wasm
			.canonicalize()
			.unwrap_or_else(|_| args.wasm.clone())
			.display()
			.to_string(),
		threshold: args.threshold,
		include_structural: args.include_structural,
		total,
		per_function,
	};

	if args.json {
		println!("{}", serde_json::to_string_pretty(&report)?);
	} else {
		println!("wasm: {}", report.wasm);
		println!("threshold: {}", report.threshold);
		println!("include_structural: {}", report.include_structural);
		println!("instructions_counted: {}", report.total.instructions_counted);
		println!("> threshold: {}", report.total.above_threshold);
		println!("<= threshold: {}", report.total.at_or_below_threshold);
		println!("max_stack_height: {}", report.total.max_stack_height);
		if let Some(per_function) = &report.per_function {
			println!("functions: {}", per_function.len());
		}
	}
	Ok(())
}

fn init_tracing() {
	use tracing_subscriber::layer::SubscriberExt;
	use tracing_subscriber::util::SubscriberInitExt;

	tracing_subscriber::registry()
		.with(tracing_subscriber::EnvFilter::from_default_env())
		.with(tracing_tree::HierarchicalLayer::new(2))
		.init();
}
