use std::fmt;

use tracing::debug;

use crate::table::NestingTable;
use crate::tree::{ContainmentTree, Edge, TextSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViolationReason {
    /// The parent's allowed child set does not include the child's type.
    NestingNotAllowed,
}

/// A forbidden immediate containment edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Violation {
    pub parent: TextSpan,
    pub child: TextSpan,
    pub reason: ViolationReason,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            ViolationReason::NestingNotAllowed => write!(
                f,
                "{} {} may not nest inside {} {}",
                self.child.entity_type, self.child.id, self.parent.entity_type, self.parent.id
            ),
        }
    }
}

/// Report every immediate edge whose child type the parent may not contain.
///
/// Never fails: an empty result means the tree is valid. Violations come
/// back in edge order.
pub fn validate(tree: &ContainmentTree, table: &NestingTable) -> Vec<Violation> {
    let violations: Vec<Violation> = tree
        .edges()
        .iter()
        .filter_map(|edge| check_edge(tree, table, edge))
        .collect();
    debug!(
        edges = tree.edges().len(),
        violations = violations.len(),
        "validated nesting"
    );
    violations
}

/// Same result as [`validate`], with edges checked on the rayon pool.
#[cfg(feature = "parallel")]
pub fn validate_parallel(tree: &ContainmentTree, table: &NestingTable) -> Vec<Violation> {
    use rayon::prelude::*;

    tree.edges()
        .par_iter()
        .filter_map(|edge| check_edge(tree, table, edge))
        .collect()
}

fn check_edge(tree: &ContainmentTree, table: &NestingTable, edge: &Edge) -> Option<Violation> {
    let parent = tree.span(edge.parent)?;
    let child = tree.span(edge.child)?;
    if table.permits(&parent.entity_type, &child.entity_type) {
        return None;
    }
    Some(Violation {
        parent: parent.clone(),
        child: child.clone(),
        reason: ViolationReason::NestingNotAllowed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::EntityType;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn ty(name: &str) -> EntityType {
        EntityType::new(name).unwrap()
    }

    fn span(id: &str, entity: &str, start: usize, end: usize) -> TextSpan {
        TextSpan::new(id, ty(entity), start, end).unwrap()
    }

    fn cell_table() -> NestingTable {
        NestingTable::new([]).allow(ty("Cell_type"), [ty("Tissue"), ty("Drug_or_compound")])
    }

    fn pairs(violations: &[Violation]) -> Vec<(&str, &str)> {
        violations
            .iter()
            .map(|v| (v.parent.id.as_str(), v.child.id.as_str()))
            .collect()
    }

    #[test]
    fn test_allowed_nesting() {
        let tree = ContainmentTree::from_spans(vec![
            span("T1", "Cell_type", 0, 20),
            span("T2", "Tissue", 5, 10),
        ]);
        assert!(validate(&tree, &cell_table()).is_empty());
    }

    #[test]
    fn test_unlisted_parent_uses_empty_default() {
        let tree = ContainmentTree::from_spans(vec![
            span("T1", "Organism", 0, 30),
            span("T2", "Tissue", 0, 5),
            span("T3", "Cell_type", 10, 20),
        ]);
        let violations = validate(&tree, &cell_table());
        assert_eq!(pairs(&violations), vec![("T1", "T2"), ("T1", "T3")]);
        assert!(violations
            .iter()
            .all(|v| v.reason == ViolationReason::NestingNotAllowed));
    }

    #[test]
    fn test_unlisted_parent_uses_permissive_default() {
        let table = NestingTable::new([ty("Tissue")]);
        let tree = ContainmentTree::from_spans(vec![
            span("T1", "Organism", 0, 30),
            span("T2", "Tissue", 0, 5),
            span("T3", "Protein", 10, 20),
        ]);
        assert_eq!(pairs(&validate(&tree, &table)), vec![("T1", "T3")]);
    }

    #[test]
    fn test_empty_allowed_set_forbids_everything() {
        let table = NestingTable::new([ty("Tissue")]).allow(ty("Protein"), []);
        let tree = ContainmentTree::from_spans(vec![
            span("T1", "Protein", 0, 10),
            span("T2", "Tissue", 2, 4),
        ]);
        assert_eq!(pairs(&validate(&tree, &table)), vec![("T1", "T2")]);
    }

    #[test]
    fn test_self_nesting_requires_explicit_entry() {
        let tree = ContainmentTree::from_spans(vec![
            span("T1", "Gene", 0, 10),
            span("T2", "Gene", 2, 4),
        ]);
        let strict = NestingTable::new([]).allow(ty("Gene"), [ty("Protein")]);
        assert_eq!(validate(&tree, &strict).len(), 1);
        let lenient = NestingTable::new([]).allow(ty("Gene"), [ty("Gene")]);
        assert!(validate(&tree, &lenient).is_empty());
    }

    #[test]
    fn test_grandparent_not_checked() {
        // Cell_type > Tissue > Drug_or_compound: only immediate edges count.
        let table = NestingTable::new([])
            .allow(ty("Cell_type"), [ty("Tissue")])
            .allow(ty("Tissue"), [ty("Drug_or_compound")]);
        let tree = ContainmentTree::from_spans(vec![
            span("T1", "Cell_type", 0, 30),
            span("T2", "Tissue", 5, 20),
            span("T3", "Drug_or_compound", 6, 10),
        ]);
        assert!(validate(&tree, &table).is_empty());
    }

    #[test]
    fn test_validation_continues_after_violation() {
        let tree = ContainmentTree::from_spans(vec![
            span("T1", "Organism", 0, 10),
            span("T2", "Tissue", 1, 2),
            span("T3", "Organism", 20, 30),
            span("T4", "Tissue", 21, 22),
        ]);
        assert_eq!(validate(&tree, &cell_table()).len(), 2);
    }

    #[test]
    fn test_order_independence() {
        let spans = vec![
            span("T1", "Organism", 0, 40),
            span("T2", "Cell_type", 1, 20),
            span("T3", "Tissue", 2, 5),
            span("T4", "Protein", 6, 8),
            span("T5", "Drug_or_compound", 25, 30),
        ];
        let forward = ContainmentTree::from_spans(spans.clone());
        let mut reversed_edges = forward.edges().to_vec();
        reversed_edges.reverse();
        let reversed = ContainmentTree::from_edges(spans, reversed_edges).unwrap();

        let a: BTreeSet<_> = validate(&forward, &cell_table()).into_iter().collect();
        let b: BTreeSet<_> = validate(&reversed, &cell_table()).into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_idempotent() {
        let tree = ContainmentTree::from_spans(vec![
            span("T1", "Organism", 0, 10),
            span("T2", "Tissue", 1, 2),
        ]);
        let table = cell_table();
        assert_eq!(validate(&tree, &table), validate(&tree, &table));
    }

    #[test]
    fn test_empty_tree() {
        assert!(validate(&ContainmentTree::default(), &cell_table()).is_empty());
    }

    #[test]
    fn test_violation_display() {
        let violation = Violation {
            parent: span("T1", "Organism", 0, 10),
            child: span("T2", "Tissue", 1, 2),
            reason: ViolationReason::NestingNotAllowed,
        };
        assert_eq!(
            violation.to_string(),
            "Tissue T2 may not nest inside Organism T1"
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let tree = ContainmentTree::from_spans(vec![
            span("T1", "Organism", 0, 40),
            span("T2", "Cell_type", 1, 20),
            span("T3", "Tissue", 2, 5),
            span("T4", "Protein", 6, 8),
        ]);
        assert_eq!(
            validate_parallel(&tree, &cell_table()),
            validate(&tree, &cell_table())
        );
    }
}
