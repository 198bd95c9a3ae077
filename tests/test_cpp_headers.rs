use cxxbind::config::ParserSettings;
use cxxbind::parsing::cpp::strip_macros;
use cxxbind::{
    HeaderParser, Module, ParseError, ParserSession, Settings, TemplateParamKind,
    TreeSitterHeaderParser, discover_headers,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/occt")
}

fn parse_fixture(name: &str) -> cxxbind::HeaderDescriptor {
    let mut parser = TreeSitterHeaderParser::new().expect("Failed to create C++ parser");
    parser
        .parse_header(Path::new(name), &fixtures(), &ParserSettings::default(), "gp")
        .unwrap()
}

#[test]
fn test_header_level_declarations() {
    let header = parse_fixture("gp_Trsf.hxx");

    assert_eq!(header.short_name, "gp_Trsf.hxx");
    assert_eq!(header.path, fixtures().join("gp_Trsf.hxx"));
    assert_eq!(
        header.dependencies,
        vec!["gp_TrsfForm.hxx", "Standard_Real.hxx", "gp_Mat.hxx"]
    );
    assert_eq!(header.forwards, vec!["gp_Pnt", "gp_Ax1"]);

    assert_eq!(header.enums.len(), 1);
    assert_eq!(header.enums[0].name, "gp_EulerSequence");
    assert_eq!(header.enums[0].values.len(), 2);

    assert_eq!(header.typedefs.len(), 1);
    assert_eq!(header.typedefs[0].name, "gp_Transform");
    assert_eq!(header.typedefs[0].underlying, "gp_Trsf");

    assert_eq!(header.functions.len(), 1);
    let distance = &header.functions[0];
    assert_eq!(distance.full_name, "gp_Distance(const gp_Pnt &, const gp_Pnt &)");
    assert_eq!(distance.return_type.as_deref(), Some("double"));

    assert_eq!(header.operators.len(), 1);
    assert_eq!(header.operators[0].name, "operator*");
    assert!(header.operators[0].is_inline);
}

#[test]
fn test_class_members() {
    let header = parse_fixture("gp_Trsf.hxx");
    assert_eq!(header.classes.len(), 1);

    let trsf = &header.classes[0];
    assert_eq!(trsf.name, "gp_Trsf");
    assert_eq!(trsf.superclasses, vec!["gp_Base"]);
    assert_eq!(trsf.path.as_deref(), Some(header.path.as_path()));
    assert!(
        trsf.comment
            .as_deref()
            .is_some_and(|c| c.contains("non-persistent transformation"))
    );
    assert!(!trsf.is_abstract);

    assert_eq!(trsf.enums.len(), 1);
    assert_eq!(trsf.enums[0].name, "gp_Trsf::Kind");
    assert_eq!(trsf.enums[0].values, vec!["Rotation", "Translation"]);
    assert!(trsf.typedefs.contains_key("Scalar"));
    assert!(trsf.inner_classes.contains_key("gp_Trsf::Iterator"));

    let constructors: Vec<&str> = trsf.constructors.iter().map(|c| c.full_name.as_str()).collect();
    assert_eq!(constructors, vec!["gp_Trsf()", "gp_Trsf(const gp_Trsf &)"]);

    assert!(
        trsf.methods
            .contains_key("void SetRotation(const gp_Ax1 &, const Standard_Real)")
    );
    let form = &trsf.methods["Kind Form()"];
    assert!(form.is_const);
    assert!(trsf.methods.contains_key("Scalar ScaleFactor()"));
    assert!(trsf.static_methods.contains_key("gp_Trsf Identity()"));

    // Rvalue overloads and non-public members are not bound
    assert!(trsf.methods.values().all(|m| m.name != "Move" && m.name != "Hidden"));
    assert!(trsf.fields.is_empty());

    assert_eq!(trsf.operators.len(), 1);
    assert_eq!(trsf.destructors.len(), 1);
}

#[test]
fn test_class_template() {
    let header = parse_fixture("gp_Trsf.hxx");
    assert_eq!(header.class_templates.len(), 1);

    let vec = &header.class_templates[0];
    assert_eq!(vec.name(), "gp_Vec");
    assert_eq!(vec.class.superclasses, vec!["gp_BaseVec"]);
    assert_eq!(vec.param_names(), vec!["TheItemType", "N"]);
    assert_eq!(vec.type_params[0].kind, TemplateParamKind::Type);
    assert_eq!(
        vec.type_params[1].kind,
        TemplateParamKind::NonType {
            ty: "int".to_string()
        }
    );
    assert_eq!(vec.type_params[1].default.as_deref(), Some("4"));

    assert_eq!(vec.class.constructors.len(), 1);
    assert!(
        vec.class
            .methods
            .contains_key("const TheItemType & Value(const int)")
    );
}

#[test]
fn test_abstract_class() {
    let header = parse_fixture("gp_Base.hxx");
    let base = &header.classes[0];

    assert!(base.is_abstract);
    assert_eq!(base.superclasses, vec!["Standard_Transient"]);
    let tolerance = base.methods.values().next().unwrap();
    assert!(tolerance.is_virtual);
    assert!(tolerance.is_pure_virtual);
}

#[test]
fn test_namespaces_prefix_names() {
    let code = r#"
namespace occ {
namespace detail { class Hidden {}; }

class Shape {
public:
    enum Orientation { Forward, Reversed };
};
}
"#;
    let mut parser = TreeSitterHeaderParser::new().unwrap();
    let header = parser.parse_source(code, Path::new("occ_Shape.hxx")).unwrap();

    let names: Vec<&str> = header.classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["occ::detail::Hidden", "occ::Shape"]);
    assert_eq!(header.classes[1].enums[0].name, "occ::Shape::Orientation");
}

#[test]
fn test_missing_header_is_a_read_error() {
    let mut parser = TreeSitterHeaderParser::new().unwrap();
    let result = parser.parse_header(
        Path::new("gp_Missing.hxx"),
        &fixtures(),
        &ParserSettings::default(),
        "gp",
    );

    assert!(matches!(result, Err(ParseError::FileRead { .. })));
}

#[test]
fn test_module_macros_are_stripped() {
    let stripped = strip_macros("Geom_EXPORT int f();", &["Geom_EXPORT"]);
    assert_eq!(stripped.trim(), "int f();");
}

#[test]
fn test_assemble_fixture_module() {
    let settings = Settings::default();
    let headers = discover_headers(&fixtures(), "gp", &settings.parser).unwrap();
    assert_eq!(
        headers,
        vec![PathBuf::from("gp_Base.hxx"), PathBuf::from("gp_Trsf.hxx")]
    );

    let known: HashSet<String> = ["gp", "Standard"].iter().map(|s| s.to_string()).collect();
    let mut session = ParserSession::open(&settings.parser).unwrap();
    let module = Module::build(
        "gp",
        &fixtures(),
        &headers,
        &known,
        &settings,
        &mut session,
    )
    .unwrap();
    assert_eq!(session.close(), 2);

    let order: Vec<&str> = module.classes().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(order, vec!["gp_Base", "gp_Trsf"]);
    assert_eq!(module.class_templates().len(), 1);

    let trsf = module.class("gp_Trsf").unwrap();
    let form = trsf.methods.values().find(|m| m.name == "Form").unwrap();
    assert_eq!(form.return_type.as_deref(), Some("gp_Trsf::Kind"));
    let scale = trsf.methods.values().find(|m| m.name == "ScaleFactor").unwrap();
    assert_eq!(scale.return_type.as_deref(), Some("gp_Trsf::Scalar"));

    let dependencies: Vec<&str> = module.dependencies().iter().map(String::as_str).collect();
    assert_eq!(dependencies, vec!["Standard"]);
}
