use std::fmt;
use std::io;

use thiserror::Error;

use crate::plotter::StyleId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("syntax error on line {line}: unexpected `{context}`")]
    Syntax { line: usize, context: String },

    #[error("duplicate title on line {line}")]
    DuplicateTitle { line: usize },

    /// A segment or arrow points at a style id that was never registered.
    /// `index` is 1-based within its own collection.
    #[error("{primitive} {index} references unknown style {style_id} ({style_count} registered)")]
    UnknownStyleReference {
        primitive: Primitive,
        index: usize,
        style_id: StyleId,
        style_count: usize,
    },

    #[error("failed to write plot script: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Segment,
    Arrow,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Segment => write!(f, "segment"),
            Primitive::Arrow => write!(f, "arrow"),
        }
    }
}
