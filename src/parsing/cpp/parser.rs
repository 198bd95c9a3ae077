//! C++ header reader built on tree-sitter
//!
//! Purely syntactic: names are reported as spelled, bases are not resolved and
//! template bodies are not instantiated. Only public members are collected,
//! except inner classes and typedefs which are always recorded because method
//! signatures may name them.

use crate::config::{ParserBackend, ParserSettings};
use crate::error::{ParseError, ParseResult};
use crate::parsing::{HeaderParser, resolve_header_path};
use crate::types::{
    Argument, ClassInfo, ClassTemplateInfo, EnumInfo, FieldInfo, FunctionInfo, HeaderDescriptor,
    MethodInfo, TemplateParam, TemplateParamKind, TypedefInfo, display_signature,
};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, trace, warn};
use tree_sitter::{Node, Parser};

pub struct TreeSitterHeaderParser {
    parser: Parser,
}

impl std::fmt::Debug for TreeSitterHeaderParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSitterHeaderParser")
            .field("language", &"C++")
            .finish()
    }
}

impl TreeSitterHeaderParser {
    pub fn new() -> ParseResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .map_err(|e| ParseError::ParserInit {
                backend: "tree-sitter".to_string(),
                reason: format!("Failed to set C++ language: {e}"),
            })?;

        Ok(Self { parser })
    }

    /// Extract declarations from header source already in memory
    pub fn parse_source(&mut self, code: &str, path: &Path) -> ParseResult<HeaderDescriptor> {
        let tree = self
            .parser
            .parse(code, None)
            .ok_or_else(|| ParseError::Aborted {
                path: path.to_path_buf(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            debug!(
                "{} has syntax errors, keeping whatever parsed",
                path.display()
            );
        }

        let mut collector = Collector::new(code, path);
        collector.visit_scope(root, &mut Vec::new());
        Ok(collector.finish())
    }
}

impl HeaderParser for TreeSitterHeaderParser {
    fn backend(&self) -> ParserBackend {
        ParserBackend::TreeSitter
    }

    fn parse_header(
        &mut self,
        path: &Path,
        prefix: &Path,
        settings: &ParserSettings,
        module: &str,
    ) -> ParseResult<HeaderDescriptor> {
        let full_path = resolve_header_path(path, prefix);
        let code = std::fs::read_to_string(&full_path).map_err(|source| ParseError::FileRead {
            path: full_path.clone(),
            source,
        })?;

        let code = strip_macros(&code, &settings.strip_macros_for(module));
        self.parse_source(&code, &full_path)
    }
}

/// Blank out whole-word macro uses, keeping byte offsets intact
pub fn strip_macros(code: &str, macros: &[&str]) -> String {
    if macros.is_empty() {
        return code.to_string();
    }

    let alternatives: Vec<String> = macros.iter().map(|m| regex::escape(m)).collect();
    match Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|"))) {
        Ok(pattern) => pattern
            .replace_all(code, |caps: &Captures| " ".repeat(caps[0].len()))
            .into_owned(),
        Err(e) => {
            warn!("Ignoring strip_macros setting: {e}");
            code.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    fn from_keyword(keyword: &str) -> Self {
        match keyword.trim().trim_end_matches(':').trim() {
            "public" => Access::Public,
            "protected" => Access::Protected,
            _ => Access::Private,
        }
    }

    fn default_for(class_kind: &str) -> Self {
        if class_kind == "struct_specifier" {
            Access::Public
        } else {
            Access::Private
        }
    }
}

fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-normalized type with a space before each pointer/reference run
fn spell_type(text: &str) -> String {
    let normalized = normalize(text);
    let mut out = String::with_capacity(normalized.len() + 4);
    let mut prev = ' ';
    for c in normalized.chars() {
        if matches!(c, '*' | '&') && !matches!(prev, ' ' | '*' | '&') {
            out.push(' ');
        }
        out.push(c);
        prev = c;
    }
    out
}

fn qualified(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}::{name}")
    }
}

fn without_template_args(name: &str) -> &str {
    name.split('<').next().unwrap_or(name).trim()
}

/// The identifier a declarator introduces
fn declared_identifier<'t>(node: Node<'t>) -> Option<Node<'t>> {
    match node.kind() {
        "identifier" | "field_identifier" | "type_identifier" => Some(node),
        _ => {
            if let Some(inner) = node.child_by_field_name("declarator") {
                return declared_identifier(inner);
            }
            let mut cursor = node.walk();
            let found = node.named_children(&mut cursor).find_map(declared_identifier);
            found
        }
    }
}

/// Find the function declarator under pointer/reference wrappers.
///
/// Returns the declarator and the pointer/reference suffix of the return type.
fn function_declarator(node: Node<'_>) -> Option<(Node<'_>, String)> {
    match node.kind() {
        "function_declarator" => Some((node, String::new())),
        "pointer_declarator" => {
            let (function, suffix) = function_declarator(node.child_by_field_name("declarator")?)?;
            Some((function, format!(" *{suffix}")))
        }
        "reference_declarator" => {
            let marker = if children(node).iter().any(|c| c.kind() == "&&") {
                " &&"
            } else {
                " &"
            };
            let inner = children(node).into_iter().rev().find(|c| c.is_named())?;
            let (function, suffix) = function_declarator(inner)?;
            Some((function, format!("{marker}{suffix}")))
        }
        _ => None,
    }
}

fn is_callable_name(kind: &str) -> bool {
    matches!(
        kind,
        "identifier"
            | "field_identifier"
            | "operator_name"
            | "destructor_name"
            | "qualified_identifier"
            | "template_function"
    )
}

fn clean_comment(raw: &str) -> String {
    raw.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches("//!")
                .trim_start_matches("///")
                .trim_start_matches("//")
                .trim_start_matches("/*")
                .trim_end_matches("*/")
                .trim_start_matches('*')
                .trim()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

struct Collector<'a> {
    code: &'a str,
    header: HeaderDescriptor,
    class_slots: HashMap<String, usize>,
    template_slots: HashMap<String, usize>,
    /// Member definitions outside their class: (class, method)
    out_of_line: Vec<(String, MethodInfo)>,
}

impl<'a> Collector<'a> {
    fn new(code: &'a str, path: &Path) -> Self {
        Self {
            code,
            header: HeaderDescriptor::new(path),
            class_slots: HashMap::new(),
            template_slots: HashMap::new(),
            out_of_line: Vec::new(),
        }
    }

    fn text(&self, node: Node<'_>) -> &'a str {
        &self.code[node.byte_range()]
    }

    fn visit_scope(&mut self, node: Node<'_>, namespace: &mut Vec<String>) {
        for child in children(node) {
            match child.kind() {
                "preproc_include" => self.include(child),
                "preproc_ifdef" | "preproc_if" | "preproc_else" | "preproc_elif"
                | "preproc_elifdef" | "linkage_specification" | "declaration_list" => {
                    self.visit_scope(child, namespace)
                }
                "namespace_definition" => {
                    // Anonymous namespaces only hold internal symbols
                    let (Some(name), Some(body)) = (
                        child.child_by_field_name("name"),
                        child.child_by_field_name("body"),
                    ) else {
                        continue;
                    };
                    let depth = namespace.len();
                    namespace.extend(self.text(name).split("::").map(|s| s.trim().to_string()));
                    self.visit_scope(body, namespace);
                    namespace.truncate(depth);
                }
                "class_specifier" | "struct_specifier" => self.add_class(child, namespace),
                "enum_specifier" => self.add_enum(child, namespace),
                "template_declaration" => self.add_template(child, namespace),
                "declaration" => self.declaration(child, namespace),
                "function_definition" => self.free_function(child, namespace),
                "type_definition" => {
                    if let Some(typedef) = self.typedef(child, &namespace.join("::")) {
                        self.header.typedefs.push(typedef);
                    }
                }
                "alias_declaration" => {
                    if let Some(typedef) = self.alias(child, &namespace.join("::")) {
                        self.header.typedefs.push(typedef);
                    }
                }
                _ => {}
            }
        }
    }

    fn include(&mut self, node: Node<'_>) {
        if let Some(path_node) = node.child_by_field_name("path") {
            let path_text = self.text(path_node);
            // Remove quotes
            let clean_path = path_text.trim_matches(|c| c == '"' || c == '<' || c == '>');
            self.header.dependencies.push(clean_path.to_string());
        }
    }

    fn declaration(&mut self, node: Node<'_>, namespace: &[String]) {
        if let Some(ty) = node.child_by_field_name("type") {
            match ty.kind() {
                "class_specifier" | "struct_specifier" => self.add_class(ty, namespace),
                "enum_specifier" => self.add_enum(ty, namespace),
                _ => {}
            }
        }
        self.free_function(node, namespace);
    }

    fn add_class(&mut self, node: Node<'_>, namespace: &[String]) {
        let scope = namespace.join("::");
        match self.parse_class(node, &scope) {
            Some(class) => self.insert_class(class),
            None => {
                if node.child_by_field_name("body").is_none() {
                    if let Some(name) = node.child_by_field_name("name") {
                        let name = qualified(&scope, self.text(name));
                        if !self.header.forwards.contains(&name) {
                            self.header.forwards.push(name);
                        }
                    }
                }
            }
        }
    }

    fn insert_class(&mut self, mut class: ClassInfo) {
        class.path = Some(self.header.path.clone());
        match self.class_slots.get(&class.name) {
            Some(&slot) => self.header.classes[slot].extend_definition(class),
            None => {
                self.class_slots
                    .insert(class.name.clone(), self.header.classes.len());
                self.header.classes.push(class);
            }
        }
    }

    fn add_template(&mut self, node: Node<'_>, namespace: &[String]) {
        let type_params = node
            .child_by_field_name("parameters")
            .map(|list| self.template_params(list))
            .unwrap_or_default();
        let scope = namespace.join("::");

        for child in children(node) {
            let class_node = match child.kind() {
                "class_specifier" | "struct_specifier" => Some(child),
                "declaration" => child
                    .child_by_field_name("type")
                    .filter(|ty| matches!(ty.kind(), "class_specifier" | "struct_specifier")),
                // Function and member templates are not bound
                _ => None,
            };
            let Some(mut class) = class_node.and_then(|n| self.parse_class(n, &scope)) else {
                continue;
            };

            class.path = Some(self.header.path.clone());
            let template = ClassTemplateInfo::new(class, type_params.clone());
            match self.template_slots.get(template.name()) {
                Some(&slot) => self.header.class_templates[slot]
                    .class
                    .extend_definition(template.class),
                None => {
                    self.template_slots
                        .insert(template.name().to_string(), self.header.class_templates.len());
                    self.header.class_templates.push(template);
                }
            }
        }
    }

    fn template_params(&self, list: Node<'_>) -> Vec<TemplateParam> {
        children(list)
            .into_iter()
            .filter_map(|param| self.template_param(param))
            .collect()
    }

    fn template_param(&self, param: Node<'_>) -> Option<TemplateParam> {
        match param.kind() {
            "type_parameter_declaration" | "variadic_type_parameter_declaration" => {
                let name = children(param)
                    .into_iter()
                    .rev()
                    .find(|c| c.kind() == "type_identifier")?;
                Some(TemplateParam {
                    kind: TemplateParamKind::Type,
                    name: self.text(name).to_string(),
                    default: None,
                })
            }
            "optional_type_parameter_declaration" => Some(TemplateParam {
                kind: TemplateParamKind::Type,
                name: self.text(param.child_by_field_name("name")?).to_string(),
                default: param
                    .child_by_field_name("default_type")
                    .map(|d| spell_type(self.text(d))),
            }),
            "parameter_declaration" | "optional_parameter_declaration" => {
                let ty = param.child_by_field_name("type")?;
                let name = param
                    .child_by_field_name("declarator")
                    .and_then(declared_identifier)?;
                Some(TemplateParam {
                    kind: TemplateParamKind::NonType {
                        ty: spell_type(self.text(ty)),
                    },
                    name: self.text(name).to_string(),
                    default: param
                        .child_by_field_name("default_value")
                        .map(|d| normalize(self.text(d))),
                })
            }
            "template_template_parameter_declaration" => {
                let inner = children(param).into_iter().rev().find(|c| c.is_named())?;
                let mut template_param = self.template_param(inner)?;
                template_param.kind = TemplateParamKind::Template;
                Some(template_param)
            }
            _ => None,
        }
    }

    /// Parse a class with a body; forward declarations and specializations yield None
    fn parse_class(&self, node: Node<'_>, scope: &str) -> Option<ClassInfo> {
        let name_node = node.child_by_field_name("name")?;
        if name_node.kind() == "template_type" {
            return None;
        }
        let body = node.child_by_field_name("body")?;

        let mut class = ClassInfo::new(qualified(scope, self.text(name_node)));
        class.comment = self.doc_comment(node);
        class.superclasses = self.base_classes(node);

        let mut access = Access::default_for(node.kind());
        self.visit_class_body(body, &mut class, &mut access);
        Some(class)
    }

    fn base_classes(&self, node: Node<'_>) -> Vec<String> {
        let default = Access::default_for(node.kind());
        let mut bases = Vec::new();

        for clause in children(node)
            .into_iter()
            .filter(|c| c.kind() == "base_class_clause")
        {
            let mut access = default;
            for child in children(clause) {
                match child.kind() {
                    "access_specifier" => access = Access::from_keyword(self.text(child)),
                    "," => access = default,
                    "type_identifier" | "qualified_identifier" | "template_type" => {
                        // Only public inheritance is visible to bindings
                        if access == Access::Public {
                            bases.push(normalize(self.text(child)));
                        }
                    }
                    _ => {}
                }
            }
        }
        bases
    }

    fn visit_class_body(&self, body: Node<'_>, class: &mut ClassInfo, access: &mut Access) {
        for child in children(body) {
            match child.kind() {
                "access_specifier" => *access = Access::from_keyword(self.text(child)),
                "preproc_ifdef" | "preproc_if" | "preproc_else" | "preproc_elif"
                | "preproc_elifdef" => self.visit_class_body(child, class, access),
                "field_declaration" | "declaration" | "function_definition"
                | "inline_method_definition" => self.member(child, class, *access),
                "type_definition" => {
                    if let Some(typedef) = self.typedef(child, "") {
                        class.typedefs.insert(typedef.name.clone(), typedef);
                    }
                }
                "alias_declaration" => {
                    if let Some(typedef) = self.alias(child, "") {
                        class.typedefs.insert(typedef.name.clone(), typedef);
                    }
                }
                "class_specifier" | "struct_specifier" => self.inner_class(child, class),
                "enum_specifier" => self.member_enum(child, class, *access),
                _ => {}
            }
        }
    }

    fn member(&self, node: Node<'_>, class: &mut ClassInfo, access: Access) {
        let ty = node.child_by_field_name("type");
        if let Some(ty) = ty {
            match ty.kind() {
                "class_specifier" | "struct_specifier" => self.inner_class(ty, class),
                "enum_specifier" => self.member_enum(ty, class, access),
                _ => {}
            }
        }

        let Some(declarator) = node.child_by_field_name("declarator") else {
            return;
        };

        if let Some((function, suffix)) = function_declarator(declarator) {
            if access == Access::Public {
                self.member_function(node, function, &suffix, class);
            } else if self.is_pure_virtual(node, function) {
                class.is_abstract = true;
            }
        } else if access == Access::Public {
            let (Some(ty), Some(name)) = (ty, declared_identifier(declarator)) else {
                return;
            };
            class.fields.push(FieldInfo {
                name: self.text(name).to_string(),
                ty: spell_type(self.text(ty)),
                is_static: self.has_specifier(node, "static"),
            });
        }
    }

    fn inner_class(&self, node: Node<'_>, class: &mut ClassInfo) {
        let inner = match self.parse_class(node, &class.name) {
            Some(inner) => inner,
            None => {
                // Forward-declared inner classes still name a nested type
                let Some(name) = node.child_by_field_name("name") else {
                    return;
                };
                ClassInfo::new(qualified(&class.name, self.text(name)))
            }
        };

        match class.inner_classes.get_mut(&inner.name) {
            Some(existing) => existing.extend_definition(inner),
            None => {
                class.inner_classes.insert(inner.name.clone(), inner);
            }
        }
    }

    fn member_enum(&self, node: Node<'_>, class: &mut ClassInfo, access: Access) {
        if access != Access::Public {
            return;
        }
        if let Some(e) = self.parse_enum(node, &class.name) {
            class.enums.push(e);
        }
    }

    fn member_function(
        &self,
        node: Node<'_>,
        function: Node<'_>,
        suffix: &str,
        class: &mut ClassInfo,
    ) {
        let Some(name_node) = function.child_by_field_name("declarator") else {
            return;
        };
        if !is_callable_name(name_node.kind()) {
            return;
        }
        let name = normalize(self.text(name_node));
        let mut method = self.callable(node, function, suffix, name.clone());

        if name_node.kind() == "destructor_name" || name.starts_with('~') {
            method.return_type = None;
            class.destructors.push(method);
            return;
        }

        let bare_class = class.name.rsplit("::").next().unwrap_or(&class.name);
        if method.return_type.is_none() {
            // Without a return type only constructors are meaningful; the rest
            // are macro invocations the grammar read as declarations
            if without_template_args(&name) == bare_class
                && !method.has_rvalue_arguments()
                && !class
                    .constructors
                    .iter()
                    .any(|c| c.full_name == method.full_name)
            {
                class.constructors.push(method);
            }
            return;
        }

        if method.is_pure_virtual {
            class.is_abstract = true;
        }
        if name.starts_with("operator") {
            class.operators.push(method);
        } else if method.has_rvalue_arguments() {
            trace!("Skipping rvalue overload {}::{}", class.name, method.full_name);
        } else {
            class.add_method(method);
        }
    }

    fn callable(&self, node: Node<'_>, function: Node<'_>, suffix: &str, name: String) -> MethodInfo {
        let args = function
            .child_by_field_name("parameters")
            .map(|list| self.parameters(list))
            .unwrap_or_default();

        let return_type = node.child_by_field_name("type").map(|ty| {
            let mut parts: Vec<&str> = children(node)
                .into_iter()
                .take_while(|c| c.id() != ty.id())
                .filter(|c| c.kind() == "type_qualifier")
                .map(|c| self.text(c))
                .collect();
            parts.push(self.text(ty));
            spell_type(&format!("{}{suffix}", parts.join(" ")))
        });

        MethodInfo {
            full_name: display_signature(&name, &args),
            name,
            args,
            return_type,
            comment: self.doc_comment(node),
            is_const: children(function)
                .iter()
                .any(|c| c.kind() == "type_qualifier" && self.text(*c) == "const"),
            is_static: self.has_specifier(node, "static"),
            is_virtual: self.has_specifier(node, "virtual"),
            is_pure_virtual: self.is_pure_virtual(node, function),
        }
    }

    fn has_specifier(&self, node: Node<'_>, keyword: &str) -> bool {
        children(node).iter().any(|c| {
            c.kind() == keyword
                || (matches!(
                    c.kind(),
                    "storage_class_specifier" | "virtual" | "virtual_function_specifier"
                ) && self.text(*c) == keyword)
        })
    }

    fn is_pure_virtual(&self, node: Node<'_>, function: Node<'_>) -> bool {
        let tail: String = self.code[function.end_byte()..node.end_byte()]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        tail.starts_with("=0")
    }

    fn parameters(&self, list: Node<'_>) -> Vec<Argument> {
        children(list)
            .into_iter()
            .filter(|p| {
                matches!(
                    p.kind(),
                    "parameter_declaration" | "optional_parameter_declaration"
                )
            })
            .filter_map(|p| self.argument(p))
            .collect()
    }

    fn argument(&self, param: Node<'_>) -> Option<Argument> {
        let start = param.start_byte();
        let default = param.child_by_field_name("default_value");
        let end = match default {
            Some(d) => {
                let before = self.code[start..d.start_byte()].trim_end();
                start + before.strip_suffix('=').unwrap_or(before).trim_end().len()
            }
            None => param.end_byte(),
        };

        let name = param
            .child_by_field_name("declarator")
            .and_then(declared_identifier)
            .filter(|n| n.start_byte() >= start && n.end_byte() <= end);
        let spelled = match name {
            Some(n) => format!(
                "{}{}",
                &self.code[start..n.start_byte()],
                &self.code[n.end_byte()..end]
            ),
            None => self.code[start..end].to_string(),
        };
        let ty = spell_type(&spelled);

        // `f(void)` declares no parameters
        if ty == "void" && name.is_none() {
            return None;
        }

        Some(Argument {
            name: name.map(|n| self.text(n).to_string()).unwrap_or_default(),
            ty: (!ty.is_empty()).then_some(ty),
            default: default.map(|d| normalize(self.text(d))),
        })
    }

    fn add_enum(&mut self, node: Node<'_>, namespace: &[String]) {
        if let Some(e) = self.parse_enum(node, &namespace.join("::")) {
            self.header.enums.push(e);
        }
    }

    /// Named enums are qualified with `scope`; anonymous ones take the scope as name
    fn parse_enum(&self, node: Node<'_>, scope: &str) -> Option<EnumInfo> {
        let body = node.child_by_field_name("body")?;
        let values = children(body)
            .into_iter()
            .filter(|c| c.kind() == "enumerator")
            .filter_map(|c| c.child_by_field_name("name"))
            .map(|n| self.text(n).to_string())
            .collect();

        let (name, anonymous) = match node.child_by_field_name("name") {
            Some(name) => (qualified(scope, self.text(name)), false),
            None => (scope.to_string(), true),
        };

        Some(EnumInfo {
            name,
            values,
            comment: self.doc_comment(node),
            anonymous,
        })
    }

    fn typedef(&self, node: Node<'_>, scope: &str) -> Option<TypedefInfo> {
        let ty = node.child_by_field_name("type")?;
        let declarator = node.child_by_field_name("declarator")?;
        let name = declared_identifier(declarator)?;

        // `typedef struct {...} Name;` aliases the tag, not its body
        let base = if ty.child_by_field_name("body").is_some() {
            ty.child_by_field_name("name")
                .map(|n| self.text(n))
                .unwrap_or_default()
                .to_string()
        } else {
            self.text(ty).to_string()
        };
        let declarator_rest = format!(
            "{}{}",
            &self.code[declarator.start_byte()..name.start_byte()],
            &self.code[name.end_byte()..declarator.end_byte()]
        );

        Some(TypedefInfo {
            name: qualified(scope, self.text(name)),
            underlying: spell_type(&format!("{base} {declarator_rest}")),
            comment: self.doc_comment(node),
        })
    }

    fn alias(&self, node: Node<'_>, scope: &str) -> Option<TypedefInfo> {
        let name = node.child_by_field_name("name")?;
        let ty = node.child_by_field_name("type")?;
        Some(TypedefInfo {
            name: qualified(scope, self.text(name)),
            underlying: spell_type(self.text(ty)),
            comment: self.doc_comment(node),
        })
    }

    fn free_function(&mut self, node: Node<'_>, namespace: &[String]) {
        let Some((function, suffix)) = node
            .child_by_field_name("declarator")
            .and_then(function_declarator)
        else {
            return;
        };
        let Some(name_node) = function.child_by_field_name("declarator") else {
            return;
        };
        // Declarations without a return type are macro invocations or
        // out-of-line constructors
        if node.child_by_field_name("type").is_none() {
            return;
        }

        match name_node.kind() {
            "qualified_identifier" => {
                let full = normalize(self.text(name_node));
                if let Some((scope, name)) = full.rsplit_once("::") {
                    let method = self.callable(node, function, &suffix, name.to_string());
                    self.out_of_line
                        .push((qualified(&namespace.join("::"), scope), method));
                }
            }
            "identifier" | "operator_name" => {
                let name = normalize(self.text(name_node));
                let method = self.callable(node, function, &suffix, name);
                let info = FunctionInfo {
                    name: method.name,
                    full_name: method.full_name,
                    args: method.args,
                    return_type: method.return_type,
                    comment: method.comment,
                    is_inline: node.kind() == "function_definition"
                        || self.has_specifier(node, "inline"),
                };

                let target = if info.name.starts_with("operator") {
                    &mut self.header.operators
                } else {
                    &mut self.header.functions
                };
                let key = info.signature_key();
                if !target.iter().any(|f| f.signature_key() == key) {
                    target.push(info);
                }
            }
            _ => {}
        }
    }

    fn doc_comment(&self, node: Node<'_>) -> Option<String> {
        let mut lines = Vec::new();
        let mut current = node.prev_sibling();
        while let Some(comment) = current.filter(|c| c.kind() == "comment") {
            lines.push(clean_comment(self.text(comment)));
            current = comment.prev_sibling();
        }
        lines.reverse();

        let doc = lines.join("\n").trim().to_string();
        (!doc.is_empty()).then_some(doc)
    }

    fn finish(mut self) -> HeaderDescriptor {
        for (scope, method) in std::mem::take(&mut self.out_of_line) {
            let Some(&slot) = self.class_slots.get(&scope) else {
                continue;
            };
            let class = &mut self.header.classes[slot];
            let declared = class
                .methods
                .values()
                .chain(class.static_methods.values())
                .any(|m| m.name == method.name);
            if !declared && !method.has_rvalue_arguments() {
                class.add_method(method);
            }
        }

        let defined = &self.class_slots;
        self.header.forwards.retain(|name| !defined.contains_key(name));
        self.header
    }
}
