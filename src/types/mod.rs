//! Declaration records produced by header parsers and consumed by module assembly.
//!
//! Type strings are kept as free-form C++ spellings. Nothing here validates them
//! against a symbol table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A single function or method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(default)]
    pub name: String,
    /// Absent only for malformed parser output
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty.into()),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn is_rvalue_reference(&self) -> bool {
        self.ty.as_deref().is_some_and(|ty| ty.contains("&&"))
    }
}

/// Instance method, static method, constructor or destructor of a class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodInfo {
    pub name: String,
    /// Display signature, e.g. `SetCoord(const Standard_Integer, const Standard_Real)`
    pub full_name: String,
    pub args: Vec<Argument>,
    /// Absent for constructors and destructors
    pub return_type: Option<String>,
    pub comment: Option<String>,
    pub is_const: bool,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_pure_virtual: bool,
}

/// Constructors share the method record; `return_type` stays `None`.
pub type ConstructorInfo = MethodInfo;

impl MethodInfo {
    pub fn new(name: impl Into<String>, args: Vec<Argument>) -> Self {
        let name = name.into();
        let full_name = display_signature(&name, &args);
        Self {
            name,
            full_name,
            args,
            ..Self::default()
        }
    }

    pub fn returning(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    /// Key used in the method maps: `"<return type> <full name>"`
    pub fn signature_key(&self) -> String {
        match &self.return_type {
            Some(ret) => format!("{ret} {}", self.full_name),
            None => self.full_name.clone(),
        }
    }

    pub fn has_rvalue_arguments(&self) -> bool {
        self.args.iter().any(Argument::is_rvalue_reference)
    }
}

/// Build a clang-style display name: `Name(T1, T2)`
pub fn display_signature(name: &str, args: &[Argument]) -> String {
    let types: Vec<&str> = args.iter().map(|a| a.ty.as_deref().unwrap_or("")).collect();
    format!("{name}({})", types.join(", "))
}

/// Free function or free operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionInfo {
    pub name: String,
    pub full_name: String,
    pub args: Vec<Argument>,
    pub return_type: Option<String>,
    pub comment: Option<String>,
    pub is_inline: bool,
}

impl FunctionInfo {
    pub fn signature_key(&self) -> String {
        format!(
            "{} {}",
            self.return_type.as_deref().unwrap_or(""),
            self.full_name
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumInfo {
    pub name: String,
    pub values: Vec<String>,
    pub comment: Option<String>,
    pub anonymous: bool,
}

impl EnumInfo {
    pub fn named(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypedefInfo {
    pub name: String,
    /// Spelling of the aliased type
    pub underlying: String,
    pub comment: Option<String>,
}

impl TypedefInfo {
    pub fn new(name: impl Into<String>, underlying: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            underlying: underlying.into(),
            comment: None,
        }
    }
}

/// Public data member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub is_static: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassInfo {
    pub name: String,
    pub comment: Option<String>,
    pub path: Option<PathBuf>,
    pub is_abstract: bool,
    /// Public bases as spelled in source; may name classes of other modules
    pub superclasses: Vec<String>,
    /// Instance methods keyed by [`MethodInfo::signature_key`]
    pub methods: BTreeMap<String, MethodInfo>,
    pub static_methods: BTreeMap<String, MethodInfo>,
    pub constructors: Vec<ConstructorInfo>,
    pub destructors: Vec<MethodInfo>,
    pub operators: Vec<MethodInfo>,
    pub fields: Vec<FieldInfo>,
    pub inner_classes: BTreeMap<String, ClassInfo>,
    pub typedefs: BTreeMap<String, TypedefInfo>,
    pub enums: Vec<EnumInfo>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_superclass(mut self, base: impl Into<String>) -> Self {
        self.superclasses.push(base.into());
        self
    }

    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.add_method(method);
        self
    }

    pub fn with_static_method(mut self, method: MethodInfo) -> Self {
        let method = MethodInfo {
            is_static: true,
            ..method
        };
        self.static_methods.insert(method.signature_key(), method);
        self
    }

    pub fn with_constructor(mut self, ctor: ConstructorInfo) -> Self {
        self.constructors.push(ctor);
        self
    }

    pub fn with_enum(mut self, e: EnumInfo) -> Self {
        self.enums.push(e);
        self
    }

    pub fn with_typedef(mut self, typedef: TypedefInfo) -> Self {
        self.typedefs.insert(typedef.name.clone(), typedef);
        self
    }

    pub fn with_inner_class(mut self, inner: ClassInfo) -> Self {
        self.inner_classes.insert(inner.name.clone(), inner);
        self
    }

    /// Insert into the instance or static map depending on `is_static`
    pub fn add_method(&mut self, method: MethodInfo) {
        let key = method.signature_key();
        if method.is_static {
            self.static_methods.insert(key, method);
        } else {
            self.methods.insert(key, method);
        }
    }

    /// Instance methods, static methods and constructors
    pub fn callables(&self) -> impl Iterator<Item = &MethodInfo> {
        self.methods
            .values()
            .chain(self.static_methods.values())
            .chain(self.constructors.iter())
    }

    pub fn callables_mut(&mut self) -> impl Iterator<Item = &mut MethodInfo> {
        self.methods
            .values_mut()
            .chain(self.static_methods.values_mut())
            .chain(self.constructors.iter_mut())
    }

    /// Fold a second definition of the same class into this one.
    ///
    /// Ordered members are appended; keyed members from `other` win. A
    /// constructor, destructor or operator with a signature already present
    /// replaces the earlier record in place.
    pub fn extend_definition(&mut self, other: ClassInfo) {
        self.comment = match (self.comment.take(), other.comment) {
            (Some(a), Some(b)) => Some(a + &b),
            (a, b) => a.or(b),
        };
        self.is_abstract |= other.is_abstract;
        for base in other.superclasses {
            if !self.superclasses.contains(&base) {
                self.superclasses.push(base);
            }
        }
        self.methods.extend(other.methods);
        self.static_methods.extend(other.static_methods);
        replace_or_push(&mut self.constructors, other.constructors, |m| m.full_name.clone());
        replace_or_push(&mut self.destructors, other.destructors, |m| m.full_name.clone());
        replace_or_push(&mut self.operators, other.operators, MethodInfo::signature_key);
        self.fields.extend(other.fields);
        for (name, inner) in other.inner_classes {
            match self.inner_classes.get_mut(&name) {
                Some(existing) => existing.extend_definition(inner),
                None => {
                    self.inner_classes.insert(name, inner);
                }
            }
        }
        self.typedefs.extend(other.typedefs);
        self.enums.extend(other.enums);
    }
}

fn replace_or_push(
    members: &mut Vec<MethodInfo>,
    incoming: Vec<MethodInfo>,
    key: impl Fn(&MethodInfo) -> String,
) {
    for member in incoming {
        let wanted = key(&member);
        match members.iter_mut().find(|m| key(m) == wanted) {
            Some(existing) => *existing = member,
            None => members.push(member),
        }
    }
}

/// Kind of a template parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateParamKind {
    /// `typename T` / `class T`
    Type,
    /// `int N`
    NonType {
        #[serde(rename = "type")]
        ty: String,
    },
    /// `template <class> class C`
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParam {
    #[serde(flatten)]
    pub kind: TemplateParamKind,
    pub name: String,
    #[serde(default)]
    pub default: Option<String>,
}

impl TemplateParam {
    pub fn type_param(name: impl Into<String>) -> Self {
        Self {
            kind: TemplateParamKind::Type,
            name: name.into(),
            default: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassTemplateInfo {
    #[serde(flatten)]
    pub class: ClassInfo,
    #[serde(default)]
    pub type_params: Vec<TemplateParam>,
}

impl ClassTemplateInfo {
    pub fn new(class: ClassInfo, type_params: Vec<TemplateParam>) -> Self {
        Self { class, type_params }
    }

    pub fn name(&self) -> &str {
        &self.class.name
    }

    /// Names of every template parameter, type or not
    pub fn param_names(&self) -> Vec<String> {
        self.type_params.iter().map(|p| p.name.clone()).collect()
    }
}

/// Everything a header parser extracted from one header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderDescriptor {
    pub path: PathBuf,
    pub short_name: String,
    /// Included headers or other textual dependencies
    pub dependencies: Vec<String>,
    pub classes: Vec<ClassInfo>,
    pub class_templates: Vec<ClassTemplateInfo>,
    pub typedefs: Vec<TypedefInfo>,
    pub enums: Vec<EnumInfo>,
    pub functions: Vec<FunctionInfo>,
    pub operators: Vec<FunctionInfo>,
    /// Names that are only forward declared here
    pub forwards: Vec<String>,
}

impl HeaderDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let short_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            short_name,
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: ClassInfo) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_template(mut self, template: ClassTemplateInfo) -> Self {
        self.class_templates.push(template);
        self
    }

    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_key_and_display_name() {
        let method = MethodInfo::new(
            "SetCoord",
            vec![
                Argument::new("theIndex", "const Standard_Integer"),
                Argument::new("theXi", "const Standard_Real"),
            ],
        )
        .returning("void");

        assert_eq!(
            method.full_name,
            "SetCoord(const Standard_Integer, const Standard_Real)"
        );
        assert_eq!(
            method.signature_key(),
            "void SetCoord(const Standard_Integer, const Standard_Real)"
        );

        let ctor = ConstructorInfo::new("gp_Pnt", vec![]);
        assert_eq!(ctor.signature_key(), "gp_Pnt()");
    }

    #[test]
    fn test_extend_definition_merges_members() {
        let mut first = ClassInfo::new("gp_Trsf")
            .with_superclass("Base")
            .with_method(MethodInfo::new("Form", vec![]).returning("gp_TrsfForm"))
            .with_constructor(ConstructorInfo::new("gp_Trsf", vec![]))
            .with_inner_class(ClassInfo::new("Inner").with_enum(EnumInfo::named("A", &["X"])));
        let second = ClassInfo::new("gp_Trsf")
            .with_superclass("Base")
            .with_superclass("Other")
            .with_method(MethodInfo::new("Invert", vec![]).returning("void"))
            .with_constructor(ConstructorInfo {
                comment: Some("Identity".to_string()),
                ..ConstructorInfo::new("gp_Trsf", vec![])
            })
            .with_constructor(ConstructorInfo::new(
                "gp_Trsf",
                vec![Argument::new("theT", "const gp_Trsf &")],
            ))
            .with_inner_class(ClassInfo::new("Inner").with_enum(EnumInfo::named("B", &["Y"])));

        first.extend_definition(second);

        assert_eq!(first.superclasses, vec!["Base", "Other"]);
        assert_eq!(first.methods.len(), 2);
        let ctors: Vec<&str> = first.constructors.iter().map(|c| c.full_name.as_str()).collect();
        assert_eq!(ctors, vec!["gp_Trsf()", "gp_Trsf(const gp_Trsf &)"]);
        assert_eq!(first.constructors[0].comment.as_deref(), Some("Identity"));
        assert_eq!(first.inner_classes["Inner"].enums.len(), 2);
    }

    #[test]
    fn test_template_descriptor_json_shape() {
        let template = ClassTemplateInfo::new(
            ClassInfo::new("NCollection_List"),
            vec![TemplateParam::type_param("TheItemType")],
        );
        let value = serde_json::to_value(&template).unwrap();

        assert_eq!(value["name"], "NCollection_List");
        assert_eq!(value["type_params"][0]["kind"], "type");
        assert_eq!(value["type_params"][0]["name"], "TheItemType");

        let back: ClassTemplateInfo = serde_json::from_value(value).unwrap();
        assert_eq!(back, template);
    }

    #[test]
    fn test_descriptor_accepts_sparse_json() {
        let json = r#"{
            "path": "gp_Ax1.hxx",
            "classes": [{ "name": "gp_Ax1", "superclasses": [] }],
            "dependencies": ["gp_Dir.hxx"]
        }"#;
        let header: HeaderDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(header.classes[0].name, "gp_Ax1");
        assert!(header.class_templates.is_empty());
        assert_eq!(header.dependencies, vec!["gp_Dir.hxx"]);
    }
}
