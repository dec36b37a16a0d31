use std::cmp::Reverse;

use crate::table::EntityType;
use crate::NestingError;

/// A typed span over the document text, `start <= end`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextSpan {
    pub id: String,
    pub entity_type: EntityType,
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn new(
        id: impl Into<String>,
        entity_type: EntityType,
        start: usize,
        end: usize,
    ) -> Result<Self, NestingError> {
        let id = id.into();
        if start > end {
            return Err(NestingError::InvalidOffsets { id, start, end });
        }
        Ok(Self {
            id,
            entity_type,
            start,
            end,
        })
    }

    /// True if `other` lies inside this span and the two intervals differ.
    pub fn strictly_contains(&self, other: &TextSpan) -> bool {
        self.start <= other.start
            && other.end <= self.end
            && (self.start, self.end) != (other.start, other.end)
    }
}

/// Immediate containment edge, as indices into [`ContainmentTree::spans`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub parent: usize,
    pub child: usize,
}

/// Forest of spans linked by immediate strict containment.
///
/// A span is a child of every container that has no other container of the
/// span strictly inside it. Spans with identical offsets are never linked,
/// and a span covered by two crossing spans has two parents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainmentTree {
    spans: Vec<TextSpan>,
    edges: Vec<Edge>,
}

impl ContainmentTree {
    /// Compute immediate containment edges from span offsets.
    ///
    /// Spans are swept in `(start, Reverse(end))` order keeping the spans
    /// still open at the current start. Walking the open spans backwards
    /// visits every container of the current span after all containers
    /// nested inside it, so the tightest container seen so far decides
    /// whether the next one is immediate. Edges are ordered by child index,
    /// then parent index.
    pub fn from_spans(spans: Vec<TextSpan>) -> Self {
        let mut order: Vec<usize> = (0..spans.len()).collect();
        order.sort_by_key(|&i| (spans[i].start, Reverse(spans[i].end)));

        let mut open: Vec<usize> = Vec::new();
        let mut edges = Vec::new();

        for &child in &order {
            let span = &spans[child];
            open.retain(|&p| spans[p].end >= span.start);

            // Smallest container so far: least end, then greatest start.
            let mut tightest: Option<(usize, Reverse<usize>)> = None;
            for &parent in open.iter().rev() {
                let container = &spans[parent];
                if !container.strictly_contains(span) {
                    continue;
                }
                let key = (container.end, Reverse(container.start));
                if tightest.map_or(true, |inner| inner >= key) {
                    edges.push(Edge { parent, child });
                }
                tightest = Some(tightest.map_or(key, |inner| inner.min(key)));
            }
            open.push(child);
        }

        edges.sort_by_key(|e| (e.child, e.parent));
        tracing::debug!(spans = spans.len(), edges = edges.len(), "built containment tree");
        Self { spans, edges }
    }

    /// Accept edges computed elsewhere. Every edge must point at existing
    /// spans and describe a strict containment; duplicates are dropped.
    pub fn from_edges(spans: Vec<TextSpan>, edges: Vec<Edge>) -> Result<Self, NestingError> {
        let mut kept: Vec<Edge> = Vec::with_capacity(edges.len());

        for edge in edges {
            let parent = spans.get(edge.parent).ok_or(NestingError::UnknownSpan(edge.parent))?;
            let child = spans.get(edge.child).ok_or(NestingError::UnknownSpan(edge.child))?;
            if !parent.strictly_contains(child) {
                return Err(NestingError::NotContained {
                    parent: parent.id.clone(),
                    child: child.id.clone(),
                });
            }
            if !kept.contains(&edge) {
                kept.push(edge);
            }
        }

        Ok(Self { spans, edges: kept })
    }

    pub fn spans(&self) -> &[TextSpan] {
        &self.spans
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn span(&self, index: usize) -> Option<&TextSpan> {
        self.spans.get(index)
    }

    /// Immediate children of the span at `index`.
    pub fn children(&self, index: usize) -> impl Iterator<Item = &TextSpan> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.parent == index)
            .map(move |e| &self.spans[e.child])
    }

    /// Immediate parents of the span at `index`.
    pub fn parents(&self, index: usize) -> impl Iterator<Item = &TextSpan> + '_ {
        self.edges
            .iter()
            .filter(move |e| e.child == index)
            .map(move |e| &self.spans[e.parent])
    }

    /// Spans with no parent.
    pub fn roots(&self) -> impl Iterator<Item = &TextSpan> + '_ {
        self.spans
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.parents(*i).next().is_none())
            .map(|(_, span)| span)
    }
}
