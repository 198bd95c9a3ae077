//! Merging per-header declarations into module-wide collections.

use crate::error::{ModuleError, ModuleResult};
use crate::types::{
    ClassInfo, ClassTemplateInfo, EnumInfo, FunctionInfo, HeaderDescriptor, TypedefInfo,
};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, trace};

/// How redeclarations of a class, template or typedef are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// The later header's record replaces the earlier one
    #[default]
    Overwrite,
    /// A redeclaration fails module construction
    Reject,
    /// The later record's members are folded into the earlier one
    Merge,
}

/// A declaration that is looked up by name at module level
pub trait NamedSymbol {
    /// Human readable kind used in diagnostics
    const KIND: &'static str;

    fn symbol_name(&self) -> &str;

    fn merge_from(&mut self, other: Self);
}

impl NamedSymbol for ClassInfo {
    const KIND: &'static str = "class";

    fn symbol_name(&self) -> &str {
        &self.name
    }

    fn merge_from(&mut self, other: Self) {
        self.extend_definition(other);
    }
}

impl NamedSymbol for ClassTemplateInfo {
    const KIND: &'static str = "class template";

    fn symbol_name(&self) -> &str {
        &self.class.name
    }

    fn merge_from(&mut self, other: Self) {
        if self.type_params.is_empty() {
            self.type_params = other.type_params;
        }
        self.class.extend_definition(other.class);
    }
}

impl NamedSymbol for TypedefInfo {
    const KIND: &'static str = "typedef";

    fn symbol_name(&self) -> &str {
        &self.name
    }

    // A typedef has no members to union; the later spelling wins.
    fn merge_from(&mut self, other: Self) {
        *self = other;
    }
}

/// Ordered collection with unique names.
///
/// Each name occupies the slot of its first declaration, so iteration order is
/// declaration order and never yields a superseded record.
#[derive(Debug, Clone)]
pub struct SymbolMap<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for SymbolMap<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: NamedSymbol> SymbolMap<T> {
    /// Build from a sequence whose names are already unique; later entries win otherwise.
    pub fn from_vec(items: Vec<T>) -> Self {
        let mut map = Self::default();
        for item in items {
            map.upsert(item);
        }
        map
    }

    fn upsert(&mut self, item: T) {
        match self.index.get(item.symbol_name()) {
            Some(&slot) => self.items[slot] = item,
            None => {
                self.index
                    .insert(item.symbol_name().to_string(), self.items.len());
                self.items.push(item);
            }
        }
    }

    /// Insert a declaration coming from `header`, resolving collisions with `policy`
    pub fn insert(
        &mut self,
        item: T,
        policy: CollisionPolicy,
        module: &str,
        header: &Path,
    ) -> ModuleResult<()> {
        let Some(&slot) = self.index.get(item.symbol_name()) else {
            self.upsert(item);
            return Ok(());
        };

        debug!(
            "{} '{}' redeclared in {} ({:?})",
            T::KIND,
            item.symbol_name(),
            header.display(),
            policy
        );

        match policy {
            CollisionPolicy::Overwrite => self.items[slot] = item,
            CollisionPolicy::Merge => self.items[slot].merge_from(item),
            CollisionPolicy::Reject => {
                return Err(ModuleError::DuplicateSymbol {
                    module: module.to_string(),
                    kind: T::KIND,
                    name: item.symbol_name().to_string(),
                    header: header.to_path_buf(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&slot| &self.items[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

impl<T> SymbolMap<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Mutable access to the records; names must not be changed through it.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a SymbolMap<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Serialize> Serialize for SymbolMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

/// Module-wide view of every header's declarations
#[derive(Debug, Default)]
pub struct SymbolTable {
    pub classes: SymbolMap<ClassInfo>,
    pub class_templates: SymbolMap<ClassTemplateInfo>,
    pub typedefs: SymbolMap<TypedefInfo>,
    pub enums: Vec<EnumInfo>,
    pub functions: Vec<FunctionInfo>,
    pub operators: Vec<FunctionInfo>,
}

/// Merge the headers of one module in input order
pub fn aggregate(
    module: &str,
    headers: &[HeaderDescriptor],
    policy: CollisionPolicy,
) -> ModuleResult<SymbolTable> {
    let mut table = SymbolTable::default();

    for header in headers {
        trace!(
            "Aggregating {}: {} classes, {} templates, {} typedefs",
            header.path.display(),
            header.classes.len(),
            header.class_templates.len(),
            header.typedefs.len()
        );

        for class in &header.classes {
            table
                .classes
                .insert(class.clone(), policy, module, &header.path)?;
        }
        for template in &header.class_templates {
            table
                .class_templates
                .insert(template.clone(), policy, module, &header.path)?;
        }
        for typedef in &header.typedefs {
            table
                .typedefs
                .insert(typedef.clone(), policy, module, &header.path)?;
        }

        table.enums.extend(header.enums.iter().cloned());
        table.functions.extend(header.functions.iter().cloned());
        table.operators.extend(header.operators.iter().cloned());
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MethodInfo, TypedefInfo};

    fn two_headers() -> Vec<HeaderDescriptor> {
        let first = HeaderDescriptor::new("gp_Pnt.hxx")
            .with_class(
                ClassInfo::new("gp_Pnt")
                    .with_constructor(MethodInfo::new("gp_Pnt", vec![]))
                    .with_method(MethodInfo::new("X", vec![]).returning("Standard_Real")),
            )
            .with_class(ClassInfo::new("gp_XYZ"));
        let mut second = HeaderDescriptor::new("gp_Pnt2.hxx").with_class(
            ClassInfo::new("gp_Pnt")
                .with_constructor(MethodInfo {
                    comment: Some("Creates the origin".to_string()),
                    ..MethodInfo::new("gp_Pnt", vec![])
                })
                .with_method(MethodInfo::new("Y", vec![]).returning("Standard_Real")),
        );
        second.enums.push(EnumInfo::named("gp_TrsfForm", &["gp_Identity"]));
        second
            .typedefs
            .push(TypedefInfo::new("gp_Real", "double"));
        vec![first, second]
    }

    #[test]
    fn test_overwrite_keeps_first_slot() {
        let table = aggregate("gp", &two_headers(), CollisionPolicy::Overwrite).unwrap();

        let names: Vec<&str> = table.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["gp_Pnt", "gp_XYZ"]);

        let pnt = table.classes.get("gp_Pnt").unwrap();
        assert_eq!(pnt.methods.len(), 1);
        assert!(pnt.methods.contains_key("Standard_Real Y()"));
        assert_eq!(table.enums.len(), 1);
        assert!(table.typedefs.contains("gp_Real"));
    }

    #[test]
    fn test_merge_unions_members() {
        let table = aggregate("gp", &two_headers(), CollisionPolicy::Merge).unwrap();

        let pnt = table.classes.get("gp_Pnt").unwrap();
        assert_eq!(pnt.methods.len(), 2);
        assert_eq!(table.classes.len(), 2);

        // Both headers declare gp_Pnt(); the later record replaces the first
        assert_eq!(pnt.constructors.len(), 1);
        assert_eq!(
            pnt.constructors[0].comment.as_deref(),
            Some("Creates the origin")
        );
    }

    #[test]
    fn test_reject_reports_duplicate() {
        let err = aggregate("gp", &two_headers(), CollisionPolicy::Reject).unwrap_err();

        match err {
            ModuleError::DuplicateSymbol {
                kind, name, header, ..
            } => {
                assert_eq!(kind, "class");
                assert_eq!(name, "gp_Pnt");
                assert_eq!(header, Path::new("gp_Pnt2.hxx"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_flat_collections_are_concatenated() {
        let mut first = HeaderDescriptor::new("a.hxx");
        first.enums.push(EnumInfo::named("E", &[]));
        let mut second = HeaderDescriptor::new("b.hxx");
        second.enums.push(EnumInfo::named("E", &[]));

        let table = aggregate("a", &[first, second], CollisionPolicy::Reject).unwrap();
        assert_eq!(table.enums.len(), 2);
    }
}
