use crate::plotter::{Point, StyleId};

#[derive(Debug, Clone, PartialEq)]
pub struct PlotDescription {
    pub title: Option<String>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Style { kind: String, value: String },
    Segment { from: Point, to: Point, style_id: StyleId },
    Arrow { from: Point, to: Point, style_id: StyleId },
    Rect { lower_left: Point, upper_right: Point, style_id: StyleId },
}
