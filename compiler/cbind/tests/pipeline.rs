//! End-to-end runs: declarations in, renamed bindings out.

use std::path::PathBuf;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use cbind::policy::{
    BoolFields, BoolMarshal, BoolTypedef, ChainOverride, ChainVisitor, ErrorMessageParams,
    OpaqueHandles, OutParams, PrefixStripRenamer, StructAttribute, TextParams,
};
use cbind::{
    ArraySize, Bindings, Builtin, CType, DeclarationError, DeclarationSource, Diagnostic, Doc,
    EmitConfig, Emitter, EnumDecl, EnumItemDecl, FieldDecl, FunctionDecl, GenerateError,
    Generator, KindImports, MacroDecl, ParamDecl, ParamModifier, RecordDecl, Severity,
    TranslationUnit, TypedefDecl, Unit, UnitGrouping, UnitKind,
};

fn int() -> CType {
    CType::Builtin(Builtin::Int)
}

fn char_() -> CType {
    CType::Builtin(Builtin::Char)
}

fn record(name: &str, fields: Vec<FieldDecl>) -> Rc<RecordDecl> {
    Rc::new(RecordDecl {
        name: Some(name.to_owned()),
        fields: Some(fields),
        ..RecordDecl::default()
    })
}

fn int_enum(name: &str, items: &[&str]) -> Rc<EnumDecl> {
    Rc::new(EnumDecl {
        name: Some(name.to_owned()),
        underlying: int(),
        items: items
            .iter()
            .zip(0u64..)
            .map(|(&item, value)| EnumItemDecl::new(item, value))
            .collect(),
        doc: Doc::default(),
    })
}

fn finalize(mut generator: Generator, units: &[TranslationUnit]) -> Bindings {
    generator
        .process(units)
        .unwrap_or_else(|err| panic!("generation failed: {err}"));
    generator.finalize()
}

fn unit<'b>(bindings: &'b Bindings, name: &str) -> &'b Unit {
    bindings
        .unit(name)
        .unwrap_or_else(|| panic!("`{name}` is not in the bindings"))
}

fn host(bindings: &Bindings, name: &str) -> String {
    unit(bindings, name)
        .host_name()
        .unwrap_or_else(|| panic!("`{name}` was not renamed"))
        .to_owned()
}

#[test]
fn enum_items_lose_their_shared_prefix() {
    let mut header = TranslationUnit::new("colors.h");
    header
        .enums
        .push(int_enum("Color", &["COLOR_RED", "COLOR_GREEN", "COLOR_BLUE"]));
    header.enums.push(int_enum("Pair", &["A_X", "B_Y"]));
    header
        .enums
        .push(int_enum("Layout", &["LAYOUT_2POINT1", "LAYOUT_5POINT1"]));

    let bindings = finalize(Generator::new(), &[header]);

    let items = |name: &str| -> Vec<String> {
        unit(&bindings, name)
            .as_enum()
            .unwrap_or_else(|| panic!("{name} is not an enum"))
            .items
            .iter()
            .filter_map(|item| item.host_name.clone())
            .collect()
    };
    assert_eq!(items("Color"), vec!["Red", "Green", "Blue"]);
    assert_eq!(items("Pair"), vec!["AX", "BY"]);
    assert_eq!(items("Layout"), vec!["_2point1", "_5point1"]);
}

#[test]
fn flag_enums_are_marked() {
    let mut header = TranslationUnit::new("flags.h");
    header.enums.push(int_enum("AVCodecFlags", &["A", "B"]));
    header.enums.push(int_enum("AVMediaType", &["A", "B"]));

    let bindings = finalize(Generator::new(), &[header]);

    let is_flags = |name: &str| {
        unit(&bindings, name)
            .as_enum()
            .is_some_and(|e| e.is_flags)
    };
    assert!(is_flags("AVCodecFlags"));
    assert!(!is_flags("AVMediaType"));
}

#[test]
fn primitive_array_fields_collapse_and_struct_arrays_stay() {
    let mut header = TranslationUnit::new("frame.h");
    let point = record("Point", vec![FieldDecl::new("x", int())]);
    header.records.push(Rc::clone(&point));
    header.records.push(record(
        "Frame",
        vec![
            FieldDecl::new("line_size", CType::array(int(), ArraySize::Constant(8))),
            FieldDecl::new(
                "corners",
                CType::array(CType::Record(point), ArraySize::Constant(4)),
            ),
        ],
    ));

    let bindings = finalize(Generator::new(), &[header]);

    let frame = unit(&bindings, "Frame")
        .as_struct()
        .unwrap_or_else(|| panic!("Frame is not a struct"));
    let line_size = &frame.fields[0];
    assert_eq!(line_size.host_name.as_deref(), Some("LineSize"));
    assert_eq!(line_size.ty.host_name.as_deref(), Some("int"));
    assert_eq!(line_size.fixed_len, Some(8));

    let corners = &frame.fields[1];
    assert_eq!(corners.ty.host_name.as_deref(), Some("Point_array4"));
    assert_eq!(corners.fixed_len, None);
    assert!(bindings.unit("Point_array4").is_some());
}

#[test]
fn self_referential_struct_is_renamed_once() {
    let forward = Rc::new(RecordDecl::forward("Node"));
    let mut header = TranslationUnit::new("list.h");
    header.records.push(record(
        "Node",
        vec![
            FieldDecl::new("next", CType::pointer(CType::Record(forward))),
            FieldDecl::new("value", int()),
        ],
    ));

    let bindings = finalize(Generator::new(), &[header]);

    let node = unit(&bindings, "Node")
        .as_struct()
        .unwrap_or_else(|| panic!("Node is not a struct"));
    let types: Vec<_> = node
        .fields
        .iter()
        .map(|f| f.ty.host_name.clone().unwrap_or_default())
        .collect();
    assert_eq!(types, vec!["Node*", "int"]);
    assert_eq!(bindings.units_of(UnitKind::Struct).count(), 1);
}

#[test]
fn unexported_functions_are_dropped_and_reported() {
    let mut header = TranslationUnit::new("api.h");
    header
        .functions
        .push(FunctionDecl::new("exported", int(), Vec::new()));
    header
        .functions
        .push(FunctionDecl::new("internal_only", int(), Vec::new()));
    let mut generator = Generator::new();
    generator.add_exports(["exported"], "api", true);

    let bindings = finalize(generator, &[header]);

    assert!(bindings.unit("exported").is_some());
    assert!(bindings.unit("internal_only").is_none());
    assert_eq!(bindings.unresolved_exports(), ["internal_only".to_owned()]);
    let exported = unit(&bindings, "exported")
        .as_function()
        .unwrap_or_else(|| panic!("not a function"));
    assert_eq!(exported.library, "api");
    assert!(exported.library_is_const);
}

fn put_u16(image: &mut [u8], at: usize, value: u16) {
    image[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(image: &mut [u8], at: usize, value: u32) {
    image[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// 64-bit image with one section holding the export directory at RVA
/// 0x1000, file offset 0x400.
fn dll_exporting(names: &[&str]) -> Vec<u8> {
    const PE: usize = 0x80;
    const RAW: usize = 0x400;
    let mut image = vec![0u8; 0x600];
    put_u16(&mut image, 0, 0x5A4D);
    put_u32(&mut image, 0x3C, 0x80);
    image[PE..PE + 4].copy_from_slice(b"PE\0\0");
    put_u16(&mut image, PE + 4, 0x8664);
    put_u16(&mut image, PE + 6, 1);

    let export_entry = PE + 8 + 128;
    put_u32(&mut image, export_entry, 0x1000);
    let section = export_entry + 8 + 15 * 8;
    put_u32(&mut image, section + 8, 0x200);
    put_u32(&mut image, section + 12, 0x1000);
    put_u32(&mut image, section + 16, 0x200);
    put_u32(&mut image, section + 20, 0x400);

    let count = u32::try_from(names.len()).unwrap_or_else(|_| panic!("too many names"));
    put_u32(&mut image, RAW + 24, count);
    put_u32(&mut image, RAW + 32, 0x1040);
    let mut string_rva = 0x1080u32;
    for (i, name) in names.iter().enumerate() {
        put_u32(&mut image, RAW + 0x40 + 4 * i, string_rva);
        let at = RAW + (string_rva as usize - 0x1000);
        image[at..at + name.len()].copy_from_slice(name.as_bytes());
        string_rva += u32::try_from(name.len() + 1).unwrap_or_else(|_| panic!("name too long"));
    }
    image
}

#[test]
fn image_exports_gate_functions() {
    let path = std::env::temp_dir().join(format!("cbind-pipeline-{}.dll", std::process::id()));
    std::fs::write(&path, dll_exporting(&["av_malloc", "av_free"]))
        .unwrap_or_else(|err| panic!("cannot write {}: {err}", path.display()));

    let mut generator = Generator::new();
    let count = generator.add_image_exports(&path, "avutil");
    let _ = std::fs::remove_file(&path);
    assert_eq!(count.ok(), Some(2));

    let mut header = TranslationUnit::new("mem.h");
    for name in ["av_malloc", "av_free", "av_strdup"] {
        let void_ptr = CType::pointer(CType::Builtin(Builtin::Void));
        header
            .functions
            .push(FunctionDecl::new(name, void_ptr, Vec::new()));
    }
    let bindings = finalize(generator, &[header]);

    let functions: Vec<_> = bindings
        .units_of(UnitKind::Function)
        .map(|f| bindings.source_name(f).to_owned())
        .collect();
    assert_eq!(functions, vec!["av_malloc", "av_free"]);
    assert_eq!(bindings.unresolved_exports(), ["av_strdup".to_owned()]);
}

#[test]
fn non_image_export_source_is_fatal() {
    let path = std::env::temp_dir().join(format!("cbind-not-a-dll-{}.txt", std::process::id()));
    std::fs::write(&path, b"plain text")
        .unwrap_or_else(|err| panic!("cannot write {}: {err}", path.display()));

    let result = Generator::new().add_image_exports(&path, "lib");
    let _ = std::fs::remove_file(&path);

    assert!(matches!(
        result,
        Err(GenerateError::Image(cbind::ImageError::BadDosMagic))
    ));
}

/// `typedef struct LLVMOpaque<X> *LLVM<X>Ref;`
fn handle(name: &str) -> CType {
    let opaque = Rc::new(RecordDecl::forward(format!("LLVMOpaque{name}")));
    CType::Typedef(Rc::new(TypedefDecl {
        name: format!("LLVM{name}Ref"),
        ty: CType::pointer(CType::Record(opaque)),
    }))
}

#[test]
fn target_policies_shape_an_llvm_style_api() {
    let llvm_bool = CType::typedef("LLVMBool", int());
    let mut header = TranslationUnit::new("Core.h");
    header.functions.push(FunctionDecl::new(
        "LLVMGetParams",
        CType::Builtin(Builtin::Void),
        vec![
            ParamDecl::new("Fn", handle("Value")),
            ParamDecl::new("OutParams", CType::pointer(handle("Value"))),
        ],
    ));
    header.functions.push(FunctionDecl::new(
        "LLVMIsConstant",
        llvm_bool.clone(),
        vec![ParamDecl::new("Val", handle("Value"))],
    ));
    header.functions.push(FunctionDecl::new(
        "LLVMGetModuleIdentifier",
        CType::const_pointer(char_()),
        vec![ParamDecl::new("M", handle("Module"))],
    ));
    header.functions.push(FunctionDecl::new(
        "LLVMVerifyModule",
        llvm_bool.clone(),
        vec![
            ParamDecl::new("M", handle("Module")),
            ParamDecl::new("OutMessage", CType::pointer(CType::pointer(char_()))),
        ],
    ));
    header.functions.push(FunctionDecl::new(
        "LLVMGetNamedFunction",
        handle("Value"),
        vec![
            ParamDecl::new("M", handle("Module")),
            ParamDecl::new("Name", CType::const_pointer(char_())),
        ],
    ));
    header.records.push(record(
        "LLVMMCJITCompilerOptions",
        vec![FieldDecl::new("NoFramePointerElim", llvm_bool)],
    ));

    let mut generator = Generator::new()
        .with_type_override(
            ChainOverride::new()
                .with(OpaqueHandles::new("LLVM", "Ref"))
                .with(BoolTypedef::new("LLVMBool")),
        )
        .with_visitor(
            ChainVisitor::new()
                .with(OutParams::new(["LLVMGet", "LLVMParse", "LLVMCreate", "LLVMFind"]))
                .with(ErrorMessageParams::new("NativeString"))
                .with(BoolMarshal::new("MarshalAs(UnmanagedType.Bool)"))
                .with(TextParams::new("string", "MarshalAs(UnmanagedType.LPStr)"))
                .with(StructAttribute::new("LLVM", "Ref", r#"DebuggerDisplay("{Pointer}")"#))
                .with(BoolFields::new("bool_t")),
        )
        .with_renamer(PrefixStripRenamer::new("LLVM"));
    generator.add_exports(
        [
            "LLVMGetParams",
            "LLVMIsConstant",
            "LLVMGetModuleIdentifier",
            "LLVMVerifyModule",
            "LLVMGetNamedFunction",
        ],
        "LLVM-C",
        true,
    );
    let bindings = finalize(generator, &[header]);

    let value = unit(&bindings, "LLVMValueRef")
        .as_struct()
        .unwrap_or_else(|| panic!("handle is not a struct"));
    assert!(value.complete);
    assert_eq!(value.fields[0].ty.host_name.as_deref(), Some("void*"));
    assert_eq!(value.attrs, vec![r#"DebuggerDisplay("{Pointer}")"#.to_owned()]);
    assert!(bindings.unit("LLVMOpaqueValue").is_none());

    assert_eq!(host(&bindings, "LLVMGetParams"), "GetParams");
    let get_params = unit(&bindings, "LLVMGetParams")
        .as_function()
        .unwrap_or_else(|| panic!("not a function"));
    let out = &get_params.sig.params[1];
    assert_eq!(out.modifier, ParamModifier::Out);
    assert_eq!(out.ty.host_name.as_deref(), Some("LLVMValueRef"));
    assert_eq!(get_params.sig.params[0].modifier, ParamModifier::None);

    let is_constant = unit(&bindings, "LLVMIsConstant")
        .as_function()
        .unwrap_or_else(|| panic!("not a function"));
    assert_eq!(is_constant.sig.return_type.host_name.as_deref(), Some("bool"));
    assert_eq!(
        is_constant.sig.return_attrs,
        vec!["MarshalAs(UnmanagedType.Bool)".to_owned()]
    );

    let identifier = unit(&bindings, "LLVMGetModuleIdentifier")
        .as_function()
        .unwrap_or_else(|| panic!("not a function"));
    assert_eq!(identifier.sig.return_type.host_name.as_deref(), Some("string"));
    assert_eq!(
        identifier.sig.return_attrs,
        vec!["MarshalAs(UnmanagedType.LPStr)".to_owned()]
    );
    assert_eq!(
        identifier.sig.params[0].ty.host_name.as_deref(),
        Some("LLVMModuleRef")
    );

    let verify = unit(&bindings, "LLVMVerifyModule")
        .as_function()
        .unwrap_or_else(|| panic!("not a function"));
    let message = &verify.sig.params[1];
    assert_eq!(message.modifier, ParamModifier::Out);
    assert_eq!(message.ty.host_name.as_deref(), Some("NativeString"));

    let named = unit(&bindings, "LLVMGetNamedFunction")
        .as_function()
        .unwrap_or_else(|| panic!("not a function"));
    assert_eq!(named.sig.params[1].ty.host_name.as_deref(), Some("string"));
    assert_eq!(
        named.sig.params[1].attrs,
        vec!["MarshalAs(UnmanagedType.LPStr)".to_owned()]
    );

    let options = unit(&bindings, "LLVMMCJITCompilerOptions")
        .as_struct()
        .unwrap_or_else(|| panic!("not a struct"));
    assert_eq!(options.fields[0].ty.host_name.as_deref(), Some("bool_t"));
}

#[test]
fn suppressed_names_never_appear() {
    let mut header = TranslationUnit::new("internal.h");
    header
        .records
        .push(record("Internal", vec![FieldDecl::new("x", int())]));
    header.records.push(record(
        "Public",
        vec![FieldDecl::new(
            "internal",
            CType::pointer(CType::Record(Rc::new(RecordDecl::forward("Internal")))),
        )],
    ));
    let mut generator = Generator::new();
    generator.suppress("Internal");

    let bindings = finalize(generator, &[header]);

    assert!(bindings.unit("Internal").is_none());
    let public = unit(&bindings, "Public")
        .as_struct()
        .unwrap_or_else(|| panic!("not a struct"));
    assert_eq!(public.fields[0].ty.host_name.as_deref(), Some("Internal*"));
}

#[test]
fn macros_are_typed_and_rewritten() {
    let mut header = TranslationUnit::new("version.h");
    header.macros.push(MacroDecl::new("MAJOR", "58"));
    header
        .macros
        .push(MacroDecl::new("VERSION", "(MAJOR << 16) | 256"));
    header.macros.push(MacroDecl::new("BROKEN", "1 +"));

    let bindings = finalize(Generator::new(), &[header]);

    let version = unit(&bindings, "VERSION")
        .as_macro()
        .unwrap_or_else(|| panic!("not a macro"));
    assert_eq!(version.ty, Some(cbind::MacroType::I32));
    assert!(version.constant);
    assert_eq!(version.rewritten.as_deref(), Some("MAJOR << 16 | 256"));
    assert_eq!(host(&bindings, "VERSION"), "VERSION");

    let broken = unit(&bindings, "BROKEN")
        .as_macro()
        .unwrap_or_else(|| panic!("not a macro"));
    assert_eq!(broken.ty, None);
    assert_eq!(broken.rewritten, None);
}

/// Renders each group as a header line plus one line per unit.
#[derive(Default)]
struct Listing {
    out: String,
}

impl Emitter for Listing {
    type Error = std::fmt::Error;

    fn emit(&mut self, bindings: &Bindings, config: &EmitConfig) -> Result<(), Self::Error> {
        use std::fmt::Write;

        for group in bindings.group(config.grouping) {
            let title = group.kind.map_or("all".to_owned(), |kind| kind.to_string());
            writeln!(
                self.out,
                "[{}::{title}] {}",
                config.namespace,
                group.imports(config).join(",")
            )?;
            for unit in group.units {
                writeln!(self.out, "{}", unit.host_name().unwrap_or_default())?;
            }
        }
        Ok(())
    }
}

fn small_api() -> Bindings {
    let mut header = TranslationUnit::new("small.h");
    header.enums.push(int_enum("Mode", &["MODE_ON", "MODE_OFF"]));
    header
        .records
        .push(record("Ctx", vec![FieldDecl::new("id", int())]));
    header
        .functions
        .push(FunctionDecl::new("ctx_open", int(), Vec::new()));
    let mut generator = Generator::new();
    generator.add_exports(["ctx_open"], "small", true);
    finalize(generator, &[header])
}

#[test]
fn emitter_sees_groups_by_kind() {
    let bindings = small_api();
    let config = EmitConfig {
        grouping: UnitGrouping::ByKind,
        namespace: "Small".to_owned(),
        imports: KindImports {
            functions: vec!["System.Runtime.InteropServices".to_owned()],
            ..KindImports::default()
        },
    };
    let mut listing = Listing::default();

    bindings
        .emit(&mut listing, &config)
        .unwrap_or_else(|err| panic!("emit failed: {err}"));

    assert_eq!(
        listing.out,
        "[Small::enum] \nMode\n[Small::struct] \nCtx\n\
         [Small::function] System.Runtime.InteropServices\nctx_open\n"
    );
}

#[test]
fn single_grouping_collects_every_import_once() {
    let bindings = small_api();
    let config = EmitConfig {
        grouping: UnitGrouping::Single,
        namespace: "Small".to_owned(),
        imports: KindImports {
            structs: vec!["System".to_owned()],
            functions: vec!["System".to_owned(), "System.Security".to_owned()],
            ..KindImports::default()
        },
    };
    let mut listing = Listing::default();

    bindings
        .emit(&mut listing, &config)
        .unwrap_or_else(|err| panic!("emit failed: {err}"));

    assert_eq!(
        listing.out,
        "[Small::all] System,System.Security\nMode\nCtx\nctx_open\n"
    );
}

/// Serves fixed translation units, or fails with one diagnostic.
struct FixedSource {
    units: Option<Vec<TranslationUnit>>,
}

impl DeclarationSource for FixedSource {
    fn parse(&mut self, files: &[PathBuf]) -> Result<Vec<TranslationUnit>, DeclarationError> {
        self.units.take().ok_or_else(|| DeclarationError::Parse {
            files: files.to_vec(),
            diagnostics: vec![Diagnostic {
                file: "broken.h".to_owned(),
                line: 3,
                column: 9,
                severity: Severity::Error,
                message: "expected ';'".to_owned(),
            }],
        })
    }
}

#[test]
fn declaration_source_feeds_the_generator() {
    let mut header = TranslationUnit::new("ok.h");
    header.enums.push(int_enum("Level", &["LEVEL_LOW", "LEVEL_HIGH"]));
    let mut source = FixedSource {
        units: Some(vec![header]),
    };
    let mut generator = Generator::new();

    generator
        .parse(&mut source, &[PathBuf::from("ok.h")])
        .unwrap_or_else(|err| panic!("parse failed: {err}"));

    assert!(generator.registry().lookup_str("Level").is_some());
}

#[test]
fn declaration_errors_abort_with_diagnostics() {
    let mut source = FixedSource { units: None };
    let mut generator = Generator::new();

    let err = generator
        .parse(&mut source, &[PathBuf::from("broken.h")])
        .err()
        .unwrap_or_else(|| panic!("parse should fail"));

    let err = match err {
        GenerateError::Declaration(err) => err,
        other => panic!("unexpected error: {other}"),
    };
    assert_eq!(
        err.diagnostics()[0].to_string(),
        "broken.h(3,9): error: expected ';'"
    );
    assert!(generator.registry().is_empty());
}
