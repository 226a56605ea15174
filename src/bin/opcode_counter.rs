use std::fs;
use std::path::PathBuf;
use anyhow::Context;
use clap::{ArgGroup, Parser};
use wasm_opstats::census::{count_mnemonic, count_opcodes, CensusReport, MnemonicReport};
use wasm_opstats::parse::Module;

/// Count opcode occurrences in the code section of a WebAssembly module.
#[derive(Parser, Debug)]
#[command(version, about)]
#[command(group(ArgGroup::new("mode").required(true).args(["mnemonic", "top"])))]
struct Args {
	/// Input .wasm file path.
	wasm: PathBuf,

	/// Print only the count of this mnemonic (e.g. i32.const).
	#[arg(long)]
	mnemonic: Option<String>,

	/// Print the top-N mnemonics.
	#[arg(long)]
	top: Option<usize>,

	/// Exclude block/loop/if/else/end.
	#[arg(long)]
	exclude_structural: bool,

	/// Also output per-function counts.
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
	let wasm = args.wasm
		.canonicalize()
		.unwrap_or_else(|_| args.wasm.clone())
		.display()
		.to_string();

	if let Some(mnemonic) = &args.mnemonic {
		let (count, per_function) =
			count_mnemonic(&module, mnemonic, args.exclude_structural, args.per_function)?;
		let report = MnemonicReport {
			wasm,
			mnemonic: mnemonic.clone(),
			count,
			per_function,
		};
		if args.json {
			println!("{}", serde_json::to_string_pretty(&report)?);
		} else {
			println!("wasm: {}", report.wasm);
			println!("{}: {}", report.mnemonic, report.count);
		}
		return Ok(());
	}

	let top = args.top.unwrap_or(0);
	let (total, per_function) = count_opcodes(&module, args.exclude_structural, args.per_function)?;
	let report = CensusReport::new(
		wasm,
		args.exclude_structural,
		module.code_bodies.len(),
		total,
		per_function,
	);
	if args.json {
		println!("{}", serde_json::to_string_pretty(&report)?);
	} else {
		println!("wasm: {}", report.wasm);
		println!("exclude_structural: {}", report.exclude_structural);
		println!("functions: {}", report.functions);
		println!("total_instructions_counted: {}", report.total_instructions_counted);
		println!("top {}:", report.counts.len().min(top));
		for (mnemonic, count) in report.top(top) {
			println!("  {}: {}", mnemonic, count);
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
