use standoff_lexer::AnnotationId;
use standoff_nesting::{EntityType, NestingError, TextSpan};

/// A parsed stand-off document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub lines: Vec<AnnotationLine>,
}

/// One annotation together with the line it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationLine {
    pub line: usize,
    pub annotation: Annotation,
}

/// Role-labelled reference to another annotation, e.g. `Theme2:T4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub role: String,
    pub target: AnnotationId,
}

/// External database entry, e.g. `Wikipedia:534366`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub database: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// `T1\tProtein 0 5\tabcde`
    TextBound {
        id: AnnotationId,
        entity_type: String,
        start: u64,
        end: u64,
        text: String,
    },
    /// `E1\tBinding:T1 Theme:T2`
    Event {
        id: AnnotationId,
        event_type: String,
        trigger: AnnotationId,
        arguments: Vec<Argument>,
    },
    /// `R1\tPart-of Arg1:T1 Arg2:T2`
    Relation {
        id: AnnotationId,
        relation_type: String,
        arguments: Vec<Argument>,
    },
    /// `A1\tNegation E1` or `M1\tConfidence T1 High`
    Attribute {
        id: AnnotationId,
        name: String,
        target: AnnotationId,
        value: Option<String>,
    },
    /// `N1\tReference T1 Wikipedia:534366\tBarack Obama`
    Normalization {
        id: AnnotationId,
        kind: String,
        target: AnnotationId,
        reference: Reference,
        text: String,
    },
    /// `#1\tAnnotatorNotes T1\tfree text`
    Note {
        id: AnnotationId,
        kind: String,
        target: AnnotationId,
        text: String,
    },
    /// `*\tEquiv T1 T2 T3`
    Equivalence {
        relation_type: String,
        members: Vec<AnnotationId>,
    },
}

impl Annotation {
    /// Identifier of the annotation; equivalence sets have none.
    pub fn id(&self) -> Option<AnnotationId> {
        match self {
            Annotation::TextBound { id, .. }
            | Annotation::Event { id, .. }
            | Annotation::Relation { id, .. }
            | Annotation::Attribute { id, .. }
            | Annotation::Normalization { id, .. }
            | Annotation::Note { id, .. } => Some(*id),
            Annotation::Equivalence { .. } => None,
        }
    }
}

impl Document {
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> + '_ {
        self.lines.iter().map(|l| &l.annotation)
    }

    /// Text-bound annotations as spans for containment analysis.
    pub fn text_spans(&self) -> Result<Vec<TextSpan>, NestingError> {
        let mut spans = Vec::new();
        for annotation in self.annotations() {
            if let Annotation::TextBound {
                id,
                entity_type,
                start,
                end,
                ..
            } = annotation
            {
                let id = id.to_string();
                let start = offset(&id, *start)?;
                let end = offset(&id, *end)?;
                spans.push(TextSpan::new(
                    id,
                    EntityType::new(entity_type.as_str())?,
                    start,
                    end,
                )?);
            }
        }
        Ok(spans)
    }
}

fn offset(id: &str, value: u64) -> Result<usize, NestingError> {
    usize::try_from(value).map_err(|_| NestingError::OffsetOutOfRange {
        id: id.to_string(),
        offset: value,
    })
}
