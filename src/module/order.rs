//! Inheritance-respecting emission order for the classes of a module.

use crate::types::ClassInfo;
use std::collections::HashMap;

/// Directed graph from each class to its in-module direct bases.
///
/// Bases declared in other modules are not nodes; they are assumed to be
/// emitted already.
#[derive(Debug, Default)]
pub struct ClassGraph {
    /// Class names in construction order
    nodes: Vec<String>,
    /// Class name -> node index
    positions: HashMap<String, usize>,
    /// Node index -> indices of its in-module bases, deduplicated
    bases: Vec<Vec<usize>>,
}

impl ClassGraph {
    pub fn new<'a>(classes: impl IntoIterator<Item = &'a ClassInfo>) -> Self {
        let classes: Vec<&ClassInfo> = classes.into_iter().collect();
        let positions: HashMap<String, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();

        let bases = classes
            .iter()
            .map(|class| {
                let mut edges = Vec::new();
                for base in &class.superclasses {
                    if let Some(&target) = positions.get(base.as_str()) {
                        if !edges.contains(&target) {
                            edges.push(target);
                        }
                    }
                }
                edges
            })
            .collect();

        Self {
            nodes: classes.iter().map(|c| c.name.clone()).collect(),
            positions,
            bases,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// In-module bases of `class`, in declaration order
    pub fn bases_of(&self, class: &str) -> Vec<&str> {
        self.positions
            .get(class)
            .map(|&i| self.bases[i].iter().map(|&b| self.nodes[b].as_str()).collect())
            .unwrap_or_default()
    }

    /// Flatten the graph so that every class follows its bases.
    ///
    /// Classes are released level by level; within a level they keep construction
    /// order. On a cycle the classes that could not be placed are returned as the
    /// error, in construction order.
    pub fn topological_order(&self) -> Result<Vec<usize>, Vec<String>> {
        let mut remaining: Vec<usize> = self.bases.iter().map(Vec::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (derived, bases) in self.bases.iter().enumerate() {
            for &base in bases {
                dependents[base].push(derived);
            }
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut level: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| remaining[i] == 0)
            .collect();

        while !level.is_empty() {
            let mut next = Vec::new();
            for &node in &level {
                for &derived in &dependents[node] {
                    remaining[derived] -= 1;
                    if remaining[derived] == 0 {
                        next.push(derived);
                    }
                }
            }
            order.append(&mut level);
            next.sort_unstable();
            level = next;
        }

        if order.len() == self.nodes.len() {
            Ok(order)
        } else {
            Err(remaining
                .iter()
                .enumerate()
                .filter(|&(_, &count)| count > 0)
                .map(|(i, _)| self.nodes[i].clone())
                .collect())
        }
    }
}

/// Reorder `classes` so bases precede derived classes.
///
/// Returns the names caught in a cycle when no such order exists.
pub fn sort_classes(classes: Vec<ClassInfo>) -> Result<Vec<ClassInfo>, Vec<String>> {
    let order = ClassGraph::new(&classes).topological_order()?;

    let mut slots: Vec<Option<ClassInfo>> = classes.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(classes: &[ClassInfo]) -> Vec<&str> {
        classes.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_bases_come_first() {
        let classes = vec![
            ClassInfo::new("TopoDS_Solid").with_superclass("TopoDS_Shape"),
            ClassInfo::new("TopoDS_Shape").with_superclass("Standard_Transient"),
            ClassInfo::new("TopoDS_Builder"),
        ];

        let sorted = sort_classes(classes).unwrap();
        assert_eq!(
            names(&sorted),
            vec!["TopoDS_Shape", "TopoDS_Builder", "TopoDS_Solid"]
        );
    }

    #[test]
    fn test_independent_classes_keep_construction_order() {
        let classes = vec![
            ClassInfo::new("C"),
            ClassInfo::new("A"),
            ClassInfo::new("B"),
        ];

        let sorted = sort_classes(classes).unwrap();
        assert_eq!(names(&sorted), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_diamond() {
        let classes = vec![
            ClassInfo::new("D").with_superclass("B").with_superclass("C"),
            ClassInfo::new("C").with_superclass("A"),
            ClassInfo::new("B").with_superclass("A").with_superclass("A"),
            ClassInfo::new("A"),
        ];

        let graph = ClassGraph::new(&classes);
        assert_eq!(graph.bases_of("B"), vec!["A"]);
        assert_eq!(graph.bases_of("D"), vec!["B", "C"]);
        assert!(graph.bases_of("Standard_Transient").is_empty());

        let sorted = sort_classes(classes).unwrap();
        assert_eq!(names(&sorted), vec!["A", "C", "B", "D"]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let classes = vec![
            ClassInfo::new("Free"),
            ClassInfo::new("A").with_superclass("B"),
            ClassInfo::new("B").with_superclass("A"),
            ClassInfo::new("C").with_superclass("A"),
        ];

        let cycle = sort_classes(classes).unwrap_err();
        assert_eq!(cycle, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_self_inheritance_is_a_cycle() {
        let classes = vec![ClassInfo::new("Loop").with_superclass("Loop")];

        assert_eq!(sort_classes(classes).unwrap_err(), vec!["Loop"]);
    }
}
