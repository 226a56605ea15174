use super::*;
use crate::parse::Module;
use crate::testutil::build_module;

const CONST_ADD_BODY: &[u8] = &[
	0x00, // no locals
	0x41, 0x02, // i32.const 2
	0x41, 0x03, // i32.const 3
	0x6A, // i32.add
	0x01, // nop
	0x0B, // end
];

#[test]
fn counts_every_instruction() {
	let wasm = build_module(&[(0, 1)], &[], &[0], &[CONST_ADD_BODY]);
	let module = Module::parse(&wasm).unwrap();
	let (total, per_func) = count_opcodes(&module, false, true).unwrap();
	assert_eq!(total.total, 5);
	assert_eq!(total.per_mnemonic.get("i32.const"), Some(&2));
	assert_eq!(total.per_mnemonic.get("i32.add"), Some(&1));
	assert_eq!(total.per_mnemonic.get("nop"), Some(&1));
	assert_eq!(total.per_mnemonic.get("end"), Some(&1));
	let per_func = per_func.unwrap();
	assert_eq!(per_func.len(), 1);
	assert_eq!(per_func[&0], total);
}

#[test]
fn excluding_structural_drops_exactly_block_loop_if_else_end() {
	let body = [
		0x00, // no locals
		0x02, 0x40, // block void
		0x0B, // end
		0x41, 0x00, // i32.const 0
		0x04, 0x40, // if void
		0x05, // else
		0x0B, // end
		0x03, 0x40, // loop void
		0x0B, // end
		0x0B, // end (function)
	];
	let wasm = build_module(&[(0, 0)], &[], &[0], &[&body]);
	let module = Module::parse(&wasm).unwrap();
	let (all, _) = count_opcodes(&module, false, false).unwrap();
	let (filtered, _) = count_opcodes(&module, true, false).unwrap();
	assert_eq!(all.total, 9);
	assert_eq!(filtered.total, 1);
	assert_eq!(filtered.per_mnemonic.get("i32.const"), Some(&1));
	assert!(filtered.per_mnemonic.get("end").is_none());
}

#[test]
fn total_equals_the_sum_of_all_counts() {
	let wasm = build_module(
		&[(0, 1)],
		&[],
		&[0, 0],
		&[CONST_ADD_BODY, &[0x00, 0x41, 0x07, 0x1A, 0x0B]],
	);
	let module = Module::parse(&wasm).unwrap();
	for exclude_structural in [false, true] {
		let (total, per_func) = count_opcodes(&module, exclude_structural, true).unwrap();
		assert_eq!(total.total, total.per_mnemonic.values().sum::<u64>());
		let per_func = per_func.unwrap();
		assert_eq!(total.total, per_func.values().map(|counts| counts.total).sum::<u64>());
	}
}

#[test]
fn single_mnemonic_count_is_a_projection_of_the_census() {
	let wasm = build_module(
		&[(0, 1)],
		&[],
		&[0, 0],
		&[CONST_ADD_BODY, &[0x00, 0x41, 0x07, 0x1A, 0x0B]],
	);
	let module = Module::parse(&wasm).unwrap();
	for exclude_structural in [false, true] {
		let (total, _) = count_opcodes(&module, exclude_structural, false).unwrap();
		for (mnemonic, &count) in &total.per_mnemonic {
			let (single, _) = count_mnemonic(&module, mnemonic, exclude_structural, false).unwrap();
			assert_eq!(single, count, "mnemonic {}", mnemonic);
		}
	}
	// A mnemonic that never occurs counts zero.
	let (none, _) = count_mnemonic(&module, "f64.sqrt", false, false).unwrap();
	assert_eq!(none, 0);
}

#[test]
fn per_function_indices_are_zero_based_over_the_code_section() {
	// One imported function, one local body. The census does not offset by
	// the import count (unlike the stack tracer).
	let wasm = build_module(&[(0, 0)], &[0], &[0], &[&[0x00, 0x0B]]);
	let module = Module::parse(&wasm).unwrap();
	let (_, per_func) = count_mnemonic(&module, "end", false, true).unwrap();
	let per_func = per_func.unwrap();
	assert_eq!(per_func.len(), 1);
	assert_eq!(per_func[&0], 1);
}

#[test]
fn report_orders_counts_by_descending_count_then_name() {
	let wasm = build_module(&[(0, 1)], &[], &[0], &[CONST_ADD_BODY]);
	let module = Module::parse(&wasm).unwrap();
	let (total, _) = count_opcodes(&module, false, false).unwrap();
	let report = CensusReport::new("test.wasm".to_owned(), false, 1, total, None);
	let ordered: Vec<&str> = report.counts.keys().map(String::as_str).collect();
	assert_eq!(ordered, vec!["i32.const", "end", "i32.add", "nop"]);
	let top: Vec<&str> = report.top(2).map(|(name, _)| name.as_str()).collect();
	assert_eq!(top, vec!["i32.const", "end"]);
}

#[test]
fn unknown_opcodes_are_counted_under_a_placeholder_name() {
	let wasm = build_module(&[(0, 0)], &[], &[0], &[&[0x00, 0x12, 0x0B]]);
	let module = Module::parse(&wasm).unwrap();
	let (total, _) = count_opcodes(&module, false, false).unwrap();
	assert_eq!(total.per_mnemonic.get("opcode_0x12"), Some(&1));
}
