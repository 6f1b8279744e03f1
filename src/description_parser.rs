use tracing::trace;
use winnow::prelude::*;
use winnow::ascii::{dec_uint, float, space0, space1};
use winnow::combinator::{alt, delimited, opt, preceded, separated_pair};
use winnow::token::{rest, take_while};

use crate::description_ast::*;
use crate::error::Error;
use crate::plotter::{Point, StyleId};

/// Parses a plot description, one statement per line.
pub fn parse_description(input: &str) -> Result<PlotDescription, Error> {
    let mut title = None;
    let mut statements = Vec::new();

    for (index, text) in input.lines().enumerate() {
        let line = index + 1;
        let parsed = description_line.parse(text).map_err(|_| Error::Syntax {
            line,
            context: error_context(text),
        })?;
        match parsed {
            Some(DescriptionLine::Title(text)) => {
                if title.is_some() {
                    return Err(Error::DuplicateTitle { line });
                }
                title = Some(text);
            }
            Some(DescriptionLine::Statement(statement)) => {
                trace!(line, ?statement, "parsed statement");
                statements.push(statement);
            }
            None => {}
        }
    }

    Ok(PlotDescription { title, statements })
}

fn error_context(text: &str) -> String {
    let context = text.trim();
    if context.chars().count() > 40 {
        let head: String = context.chars().take(40).collect();
        format!("{head}...")
    } else {
        context.to_string()
    }
}

#[derive(Debug)]
enum DescriptionLine {
    Title(String),
    Statement(Statement),
}

fn description_line(input: &mut &str) -> winnow::Result<Option<DescriptionLine>> {
    delimited(
        space0,
        opt(alt((
            comment.map(|_| None),
            title_line.map(|t| Some(DescriptionLine::Title(t))),
            statement.map(|s| Some(DescriptionLine::Statement(s))),
        ))),
        space0,
    )
    .map(Option::flatten)
    .parse_next(input)
}

fn comment(input: &mut &str) -> winnow::Result<()> {
    ('#', rest).void().parse_next(input)
}

fn title_line(input: &mut &str) -> winnow::Result<String> {
    "title".parse_next(input)?;
    let text = opt(preceded(space1, rest)).parse_next(input)?;
    Ok(text.unwrap_or("").trim_end().to_string())
}

fn statement(input: &mut &str) -> winnow::Result<Statement> {
    alt((style_statement, segment_statement, arrow_statement, rect_statement)).parse_next(input)
}

fn style_statement(input: &mut &str) -> winnow::Result<Statement> {
    "style".parse_next(input)?;
    space1.parse_next(input)?;
    let kind = identifier.parse_next(input)?;
    let value = opt(preceded(space1, rest)).parse_next(input)?;
    Ok(Statement::Style {
        kind: kind.to_string(),
        value: value.unwrap_or("").trim_end().to_string(),
    })
}

fn segment_statement(input: &mut &str) -> winnow::Result<Statement> {
    "segment".parse_next(input)?;
    let (from, to, style_id) = primitive_args.parse_next(input)?;
    Ok(Statement::Segment { from, to, style_id })
}

fn arrow_statement(input: &mut &str) -> winnow::Result<Statement> {
    "arrow".parse_next(input)?;
    let (from, to, style_id) = primitive_args.parse_next(input)?;
    Ok(Statement::Arrow { from, to, style_id })
}

fn rect_statement(input: &mut &str) -> winnow::Result<Statement> {
    "rect".parse_next(input)?;
    let (lower_left, upper_right, style_id) = primitive_args.parse_next(input)?;
    Ok(Statement::Rect {
        lower_left,
        upper_right,
        style_id,
    })
}

fn primitive_args(input: &mut &str) -> winnow::Result<(Point, Point, StyleId)> {
    space1.parse_next(input)?;
    let from = point.parse_next(input)?;
    space1.parse_next(input)?;
    let to = point.parse_next(input)?;
    space1.parse_next(input)?;
    let style_id = style_id.parse_next(input)?;
    Ok((from, to, style_id))
}

fn point(input: &mut &str) -> winnow::Result<Point> {
    separated_pair(number, space1, number)
        .map(|(x, y)| Point::new(x, y))
        .parse_next(input)
}

fn number(input: &mut &str) -> winnow::Result<f64> {
    float.parse_next(input)
}

fn style_id(input: &mut &str) -> winnow::Result<StyleId> {
    dec_uint.parse_next(input)
}

fn identifier<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '-').parse_next(input)
}
