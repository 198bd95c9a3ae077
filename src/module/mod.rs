//! Module assembly: from per-header descriptors to one ordered, qualified
//! symbol space.
//!
//! Construction runs four stages in a fixed order:
//! 1. [`aggregate`] merges the headers under a [`CollisionPolicy`]
//! 2. [`deps`] maps included headers to other module names
//! 3. [`order`] sorts classes so bases come first
//! 4. [`qualify`] rewrites bare inner type references in signatures
//!
//! A [`Module`] is immutable once built.

pub mod aggregate;
pub mod deps;
pub mod discover;
pub mod order;
pub mod qualify;

pub use aggregate::{CollisionPolicy, NamedSymbol, SymbolMap};
pub use discover::discover_headers;
pub use order::ClassGraph;
pub use qualify::InnerTypes;

use crate::config::Settings;
use crate::error::{ModuleError, ModuleResult};
use crate::parsing::ParserSession;
use crate::types::{
    ClassInfo, ClassTemplateInfo, EnumInfo, FunctionInfo, HeaderDescriptor, TypedefInfo,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
pub struct Module {
    name: String,
    prefix: PathBuf,
    #[serde(skip)]
    headers: Vec<HeaderDescriptor>,
    classes: SymbolMap<ClassInfo>,
    class_templates: SymbolMap<ClassTemplateInfo>,
    typedefs: SymbolMap<TypedefInfo>,
    enums: Vec<EnumInfo>,
    functions: Vec<FunctionInfo>,
    operators: Vec<FunctionInfo>,
    /// Exception markers; this stage never populates them
    exceptions: BTreeSet<String>,
    dependencies: BTreeSet<String>,
    dependency_headers: BTreeSet<String>,
}

impl Module {
    /// Parse `paths` in order through `session` and assemble the result.
    ///
    /// The first header that fails to parse aborts construction.
    pub fn build(
        name: &str,
        prefix: &Path,
        paths: &[PathBuf],
        known_modules: &HashSet<String>,
        settings: &Settings,
        session: &mut ParserSession,
    ) -> ModuleResult<Self> {
        debug!("Processing {} headers of module {name}", paths.len());

        let mut headers = Vec::with_capacity(paths.len());
        for path in paths {
            debug!("Parsing {}", path.display());
            headers.push(session.parse_header(path, prefix, &settings.parser, name)?);
        }

        Self::from_headers(
            name,
            prefix,
            headers,
            known_modules,
            settings.assembly.collision_policy,
        )
    }

    /// Assemble a module from already-parsed headers
    pub fn from_headers(
        name: &str,
        prefix: &Path,
        headers: Vec<HeaderDescriptor>,
        known_modules: &HashSet<String>,
        policy: CollisionPolicy,
    ) -> ModuleResult<Self> {
        let start = Instant::now();

        let table = aggregate::aggregate(name, &headers, policy)?;

        let dependency_headers: BTreeSet<String> = headers
            .iter()
            .flat_map(|h| h.dependencies.iter().cloned())
            .collect();
        let dependencies =
            deps::resolve_module_dependencies(name, &dependency_headers, known_modules);

        let classes = order::sort_classes(table.classes.into_vec()).map_err(|classes| {
            ModuleError::Cycle {
                module: name.to_string(),
                classes,
            }
        })?;
        let mut classes = SymbolMap::from_vec(classes);
        let mut class_templates = table.class_templates;

        let rewritten =
            qualify::qualify_module(classes.as_mut_slice(), class_templates.as_mut_slice());

        info!(
            "Assembled module {name}: {} classes, {} templates, {} dependencies, {rewritten} types qualified in {:?}",
            classes.len(),
            class_templates.len(),
            dependencies.len(),
            start.elapsed()
        );

        Ok(Self {
            name: name.to_string(),
            prefix: prefix.to_path_buf(),
            headers,
            classes,
            class_templates,
            typedefs: table.typedefs,
            enums: table.enums,
            functions: table.functions,
            operators: table.operators,
            exceptions: BTreeSet::new(),
            dependencies,
            dependency_headers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Parsed headers in input order
    pub fn headers(&self) -> &[HeaderDescriptor] {
        &self.headers
    }

    /// Classes in emission order: every class follows its in-module bases
    pub fn classes(&self) -> &[ClassInfo] {
        self.classes.as_slice()
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    /// Class templates in aggregation order
    pub fn class_templates(&self) -> &[ClassTemplateInfo] {
        self.class_templates.as_slice()
    }

    pub fn class_template(&self, name: &str) -> Option<&ClassTemplateInfo> {
        self.class_templates.get(name)
    }

    pub fn typedefs(&self) -> &[TypedefInfo] {
        self.typedefs.as_slice()
    }

    pub fn typedef(&self, name: &str) -> Option<&TypedefInfo> {
        self.typedefs.get(name)
    }

    pub fn enums(&self) -> &[EnumInfo] {
        &self.enums
    }

    pub fn functions(&self) -> &[FunctionInfo] {
        &self.functions
    }

    pub fn operators(&self) -> &[FunctionInfo] {
        &self.operators
    }

    pub fn exceptions(&self) -> &BTreeSet<String> {
        &self.exceptions
    }

    /// Other known modules this module's headers include
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Raw union of every header's dependencies
    pub fn dependency_headers(&self) -> &BTreeSet<String> {
        &self.dependency_headers
    }
}
