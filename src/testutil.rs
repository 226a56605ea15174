//! Hand-rolled module assembly for tests. All counts and sizes stay below
//! 128 so every LEB128 in here is a single byte.

/// Builds a module with a type section, an optional import section (function
/// imports only), a function section and a code section. Each body must
/// already start with its locals declaration.
pub(crate) fn build_module(
	types: &[(u8, u8)],
	import_type_indices: &[u8],
	func_type_indices: &[u8],
	bodies: &[&[u8]],
) -> Vec<u8> {
	let mut wasm = vec![
		0x00, 0x61, 0x73, 0x6D, // magic
		0x01, 0x00, 0x00, 0x00, // version
	];

	let mut payload = vec![types.len() as u8];
	for &(params, results) in types {
		payload.push(0x60);
		payload.push(params);
		payload.extend(std::iter::repeat(0x7F).take(params as usize));
		payload.push(results);
		payload.extend(std::iter::repeat(0x7F).take(results as usize));
	}
	push_section(&mut wasm, 1, &payload);

	if !import_type_indices.is_empty() {
		let mut payload = vec![import_type_indices.len() as u8];
		for &type_idx in import_type_indices {
			payload.push(3);
			payload.extend(b"env");
			payload.push(1);
			payload.extend(b"f");
			payload.push(0x00); // function import
			payload.push(type_idx);
		}
		push_section(&mut wasm, 2, &payload);
	}

	if !func_type_indices.is_empty() {
		let mut payload = vec![func_type_indices.len() as u8];
		payload.extend_from_slice(func_type_indices);
		push_section(&mut wasm, 3, &payload);
	}

	if !bodies.is_empty() {
		let mut payload = vec![bodies.len() as u8];
		for body in bodies {
			payload.push(body.len() as u8);
			payload.extend_from_slice(body);
		}
		push_section(&mut wasm, 10, &payload);
	}

	wasm
}

fn push_section(wasm: &mut Vec<u8>, id: u8, payload: &[u8]) {
	wasm.push(id);
	wasm.push(payload.len() as u8);
	wasm.extend_from_slice(payload);
}
