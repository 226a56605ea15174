use tracing::{debug, trace};
use crate::parse::{
	error::WasmParseError,
	reader::ByteReader,
	types::*,
};

/// Parses the module envelope and the sections code-section analysis needs:
/// type, import and function (to assemble every function's signature) and
/// code (raw bodies). Everything else is skipped using its declared shape so
/// the reader stays aligned.
pub struct Parser<'a> {
	data: &'a [u8],
	bytecode: ByteReader<'a>,
	module: Module<'a>,
}

impl<'a> Parser<'a> {
	pub fn parse_module(bytecode: &'a [u8]) -> Result<Module<'a>, WasmParseError> {
		let parser = Parser {
			data: bytecode,
			bytecode: ByteReader::new(bytecode),
			module: Module::default(),
		};
		parser.parse_module_internal()
	}

	fn parse_type_section(&mut self, sec: &mut ByteReader<'a>) -> Result<(), WasmParseError> {
		let num_types = sec.read_uleb(32)?;
		trace!("Parsing type section with {} types", num_types);
		for _ in 0..num_types {
			let form = sec.read_u8()?;
			if form != 0x60 {
				return Err(WasmParseError::UnsupportedTypeForm(form));
			}
			let params = sec.read_uleb(32)?;
			for _ in 0..params {
				sec.read_u8()?; // valtype
			}
			let results = sec.read_uleb(32)?;
			for _ in 0..results {
				sec.read_u8()?; // valtype
			}
			let function_type = FuncType {
				params: params as u32,
				results: results as u32,
			};
			debug!("{:?}", function_type);
			self.module.types.push(function_type);
		}
		Ok(())
	}

	fn parse_import_section(&mut self, sec: &mut ByteReader<'a>) -> Result<(), WasmParseError> {
		let num_imports = sec.read_uleb(32)?;
		trace!("Parsing import section with {} imports", num_imports);
		for _ in 0..num_imports {
			let module_name = sec.read_name()?;
			let field_name = sec.read_name()?;
			let import_kind = ImportKind::try_from(sec.read_u8()?)?;
			match import_kind {
				ImportKind::Function => {
					let type_index = sec.read_uleb(32)?;
					trace!("Import function {}.{} with type index {}", module_name, field_name, type_index);
					self.module.func_type_indices.push(type_index);
				},
				ImportKind::Table => {
					sec.read_u8()?; // elemtype
					Self::skip_limits(sec)?;
				},
				ImportKind::Memory => Self::skip_limits(sec)?,
				ImportKind::Global => Self::skip_global_type(sec)?,
			}
		}
		Ok(())
	}

	fn parse_function_section(&mut self, sec: &mut ByteReader<'a>) -> Result<(), WasmParseError> {
		let num_functions = sec.read_uleb(32)?;
		trace!("Parsing function section with {} functions", num_functions);
		for _ in 0..num_functions {
			self.module.func_type_indices.push(sec.read_uleb(32)?);
		}
		Ok(())
	}

	fn parse_code_section(&mut self, sec: &mut ByteReader<'a>) -> Result<(), WasmParseError> {
		let num_functions = sec.read_uleb(32)?;
		trace!("Parsing code section with {} functions", num_functions);
		for _ in 0..num_functions {
			let body_size = sec.read_uleb(32)? as usize;
			let body = sec.read_bytes(body_size)?;
			self.module.code_bodies.push(body);
		}
		Ok(())
	}

	/// <https://webassembly.github.io/spec/core/binary/types.html#limits>
	fn skip_limits(sec: &mut ByteReader<'a>) -> Result<(), WasmParseError> {
		let flags = sec.read_u8()?;
		sec.read_uleb(32)?; // min
		if flags & 0x01 != 0 {
			sec.read_uleb(32)?; // max
		}
		Ok(())
	}

	fn skip_global_type(sec: &mut ByteReader<'a>) -> Result<(), WasmParseError> {
		sec.read_u8()?; // valtype
		sec.read_u8()?; // mut
		Ok(())
	}

	/// Skips a constant expression up to its terminating `end`. Only the MVP
	/// init opcodes are accepted, anything else would leave the reader
	/// misaligned within the section.
	fn skip_init_expr(sec: &mut ByteReader<'a>) -> Result<(), WasmParseError> {
		loop {
			let opcode = sec.read_u8()?;
			match opcode {
				0x0B => return Ok(()), // end
				0x41 => {
					sec.read_sleb(32)?; // i32.const
				},
				0x42 => {
					sec.read_sleb(64)?; // i64.const
				},
				0x43 => {
					sec.read_bytes(4)?; // f32.const
				},
				0x44 => {
					sec.read_bytes(8)?; // f64.const
				},
				0x23 => {
					sec.read_uleb(32)?; // global.get
				},
				other => return Err(WasmParseError::NonMvpInitExpr(other)),
			}
		}
	}

	fn skip_table_section(sec: &mut ByteReader<'a>) -> Result<(), WasmParseError> {
		let num_tables = sec.read_uleb(32)?;
		for _ in 0..num_tables {
			sec.read_u8()?; // elemtype
			Self::skip_limits(sec)?;
		}
		Ok(())
	}

	fn skip_memory_section(sec: &mut ByteReader<'a>) -> Result<(), WasmParseError> {
		let num_memories = sec.read_uleb(32)?;
		for _ in 0..num_memories {
			Self::skip_limits(sec)?;
		}
		Ok(())
	}

	fn skip_global_section(sec: &mut ByteReader<'a>) -> Result<(), WasmParseError> {
		let num_globals = sec.read_uleb(32)?;
		for _ in 0..num_globals {
			Self::skip_global_type(sec)?;
			Self::skip_init_expr(sec)?;
		}
		Ok(())
	}

	fn skip_export_section(sec: &mut ByteReader<'a>) -> Result<(), WasmParseError> {
		let num_exports = sec.read_uleb(32)?;
		for _ in 0..num_exports {
			sec.read_name()?;
			sec.read_u8()?; // export kind
			sec.read_uleb(32)?; // index
		}
		Ok(())
	}

	/// MVP element segment shape: tableidx, init-expr, vector of funcidx.
	fn skip_element_section(sec: &mut ByteReader<'a>) -> Result<(), WasmParseError> {
		let num_segments = sec.read_uleb(32)?;
		for _ in 0..num_segments {
			sec.read_uleb(32)?; // tableidx
			Self::skip_init_expr(sec)?;
			let num_funcs = sec.read_uleb(32)?;
			for _ in 0..num_funcs {
				sec.read_uleb(32)?; // funcidx
			}
		}
		Ok(())
	}

	fn skip_data_section(sec: &mut ByteReader<'a>) -> Result<(), WasmParseError> {
		let num_segments = sec.read_uleb(32)?;
		for _ in 0..num_segments {
			sec.read_uleb(32)?; // memidx
			Self::skip_init_expr(sec)?;
			let num_bytes = sec.read_uleb(32)? as usize;
			sec.read_bytes(num_bytes)?;
		}
		Ok(())
	}

	fn parse_module_internal(mut self) -> Result<Module<'a>, WasmParseError> {
		let magic = self.bytecode.read_bytes(4)?;
		if magic != [0x00, 0x61, 0x73, 0x6D] {
			return Err(WasmParseError::BadMagic);
		}

		let version = self.bytecode.read_bytes(4)?;
		if version != [0x01, 0x00, 0x00, 0x00] {
			return Err(WasmParseError::BadVersion([version[0], version[1], version[2], version[3]]));
		}

		while !self.bytecode.at_end() {
			let section_id = self.bytecode.read_u8()?;
			let section_size = self.bytecode.read_uleb(32)? as usize;
			let section_start = self.bytecode.tell();
			let section_end = section_start + section_size;
			if section_end > self.data.len() {
				return Err(WasmParseError::SectionExceedsFile { id: section_id });
			}
			let mut sec = ByteReader::with_bounds(self.data, section_start, section_end);
			trace!("Section id {} with {} bytes", section_id, section_size);

			match SectionId::try_from(section_id) {
				Ok(SectionId::Custom) => {
					// The name is the only structured part, the rest is opaque.
					sec.read_name()?;
					sec.seek(section_end)?;
				},
				Ok(SectionId::Type) => self.parse_type_section(&mut sec)?,
				Ok(SectionId::Import) => self.parse_import_section(&mut sec)?,
				Ok(SectionId::Function) => self.parse_function_section(&mut sec)?,
				Ok(SectionId::Table) => Self::skip_table_section(&mut sec)?,
				Ok(SectionId::Memory) => Self::skip_memory_section(&mut sec)?,
				Ok(SectionId::Global) => Self::skip_global_section(&mut sec)?,
				Ok(SectionId::Export) => Self::skip_export_section(&mut sec)?,
				Ok(SectionId::Start) => {
					sec.read_uleb(32)?; // funcidx
				},
				Ok(SectionId::Element) => Self::skip_element_section(&mut sec)?,
				Ok(SectionId::Code) => self.parse_code_section(&mut sec)?,
				Ok(SectionId::Data) => Self::skip_data_section(&mut sec)?,
				Err(_) => {
					// Unknown proposal, skip the whole payload.
					trace!("Skipping unknown section id {}", section_id);
					sec.seek(section_end)?;
				},
			}

			if !sec.at_end() {
				return Err(WasmParseError::SectionNotConsumed {
					id: section_id,
					remaining: sec.remaining(),
				});
			}
			self.bytecode.seek(section_end)?;
		}
		Ok(self.module)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_bad_magic_and_version() {
		assert!(matches!(Module::parse(b"\x00wasm\x01\x00\x00"), Err(WasmParseError::BadMagic)));
		assert!(matches!(
			Module::parse(b"\x00asm\x02\x00\x00\x00"),
			Err(WasmParseError::BadVersion([0x02, 0x00, 0x00, 0x00]))
		));
	}

	#[test]
	fn empty_module() {
		let module = Module::parse(b"\x00asm\x01\x00\x00\x00").unwrap();
		assert!(module.types.is_empty());
		assert!(module.func_type_indices.is_empty());
		assert!(module.code_bodies.is_empty());
	}

	#[test]
	fn type_function_and_code_sections() {
		let wasm = [
			0x00, 0x61, 0x73, 0x6D, // magic
			0x01, 0x00, 0x00, 0x00, // version
			0x01, 0x0B, // type section, 11 bytes
			0x02, // num types
			0x60, // func type 0
			0x02, // num params
			0x7F, 0x7F, // i32 i32
			0x01, // num results
			0x7F, // i32
			0x60, // func type 1
			0x00, // num params
			0x01, // num results
			0x7E, // i64
			0x03, 0x03, // function section, 3 bytes
			0x02, // num functions
			0x01, 0x00, // type indices
			0x0A, 0x07, // code section, 7 bytes
			0x02, // num bodies
			0x02, // body 0 size
			0x00, 0x0B, // locals=0, end
			0x02, // body 1 size
			0x00, 0x0B, // locals=0, end
		];
		let module = Module::parse(&wasm).unwrap();
		assert_eq!(module.types, vec![
			FuncType { params: 2, results: 1 },
			FuncType { params: 0, results: 1 },
		]);
		assert_eq!(module.func_type_indices, vec![1, 0]);
		assert_eq!(module.code_bodies, vec![&[0x00, 0x0B][..], &[0x00, 0x0B][..]]);
		assert_eq!(module.imported_function_count(), 0);
		assert_eq!(module.func_type(0).unwrap(), FuncType { params: 0, results: 1 });
	}

	#[test]
	fn import_section_collects_functions_and_skips_the_rest() {
		let wasm = [
			0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
			0x01, 0x04, // type section
			0x01, 0x60, 0x00, 0x00, // one type () -> ()
			0x02, 0x1E, // import section, 30 bytes
			0x04, // num imports
			0x01, b'e', 0x01, b'f', // "e"."f"
			0x00, 0x00, // function import, type 0
			0x01, b'e', 0x01, b't', // "e"."t"
			0x01, 0x70, 0x01, 0x00, 0x10, // table import: funcref, limits min/max 0..16
			0x01, b'e', 0x01, b'm', // "e"."m"
			0x02, 0x00, 0x01, // memory import: limits min 1
			0x01, b'e', 0x01, b'g', // "e"."g"
			0x03, 0x7F, 0x00, // global import: i32 const
		];
		let module = Module::parse(&wasm).unwrap();
		assert_eq!(module.func_type_indices, vec![0]);
		assert_eq!(module.imported_function_count(), 1);
	}

	#[test]
	fn unknown_import_kind_is_an_error() {
		let wasm = [
			0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
			0x02, 0x06, // import section
			0x01, // num imports
			0x01, b'e', 0x01, b'f',
			0x07, // import kind 7 does not exist
		];
		assert!(matches!(Module::parse(&wasm), Err(WasmParseError::UnknownImportKind(_))));
	}

	#[test]
	fn skips_custom_unknown_and_unused_sections() {
		let wasm = [
			0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
			0x00, 0x07, // custom section
			0x04, b'n', b'a', b'm', b'e', // name
			0xAA, 0xBB, // opaque payload
			0x04, 0x04, // table section
			0x01, 0x70, 0x00, 0x00,
			0x05, 0x03, // memory section
			0x01, 0x00, 0x01,
			0x06, 0x06, // global section
			0x01, 0x7F, 0x00, 0x41, 0x05, 0x0B, // i32 const, init i32.const 5
			0x07, 0x05, // export section
			0x01, 0x01, b'g', 0x03, 0x00,
			0x08, 0x01, // start section
			0x00,
			0x09, 0x07, // element section
			0x01, 0x00, 0x41, 0x00, 0x0B, 0x01, 0x00,
			0x0B, 0x08, // data section
			0x01, 0x00, 0x41, 0x00, 0x0B, 0x02, 0xAA, 0xBB,
			0x0C, 0x01, // data count section (unknown here)
			0x01,
		];
		let module = Module::parse(&wasm).unwrap();
		assert!(module.types.is_empty());
		assert!(module.func_type_indices.is_empty());
	}

	#[test]
	fn non_mvp_init_expr_is_an_error() {
		let wasm = [
			0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
			0x06, 0x05, // global section
			0x01, 0x7F, 0x00, // i32 mutable
			0x20, 0x00, // local.get is not a constant opcode
		];
		assert!(matches!(Module::parse(&wasm), Err(WasmParseError::NonMvpInitExpr(0x20))));
	}

	#[test]
	fn section_with_trailing_bytes_is_an_error() {
		let wasm = [
			0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
			0x03, 0x03, // function section declares 3 bytes
			0x01, 0x00, // but only consumes 2
			0xFF,
		];
		assert!(matches!(
			Module::parse(&wasm),
			Err(WasmParseError::SectionNotConsumed { id: 3, remaining: 1 })
		));
	}

	#[test]
	fn section_exceeding_the_file_is_an_error() {
		let wasm = [
			0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
			0x0A, 0x10, // code section claims 16 bytes
			0x00,
		];
		assert!(matches!(
			Module::parse(&wasm),
			Err(WasmParseError::SectionExceedsFile { id: 10 })
		));
	}

	#[test]
	fn unsupported_type_form_is_an_error() {
		let wasm = [
			0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
			0x01, 0x04, // type section
			0x01, 0x5F, 0x00, 0x00, // struct types are not MVP
		];
		assert!(matches!(Module::parse(&wasm), Err(WasmParseError::UnsupportedTypeForm(0x5F))));
	}

	#[test]
	fn lazy_index_validation() {
		// The function section may reference a type that does not exist; the
		// error only surfaces when the index is consumed.
		let wasm = [
			0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00,
			0x03, 0x02, // function section
			0x01, 0x05, // one function with type index 5
		];
		let module = Module::parse(&wasm).unwrap();
		assert!(matches!(module.func_type(0), Err(WasmParseError::TypeIdxOutOfRange(5))));
		assert!(matches!(module.func_type(1), Err(WasmParseError::FuncIdxOutOfRange(1))));
	}
}
