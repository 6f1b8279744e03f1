pub mod description_ast;
pub mod description_parser;
pub mod error;
pub mod plotter;

use tracing::debug;

pub use error::{Error, Primitive};
pub use plotter::{Arrow, Plotter, Point, Segment, Style, StyleId};

use description_ast::{PlotDescription, Statement};

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Replaces the description's `title` line.
    pub title: Option<String>,
    /// Reject segments and arrows whose style id was never registered.
    pub strict: bool,
}

pub fn render(input: &str) -> Result<String, Error> {
    render_with_options(input, &RenderOptions::default())
}

pub fn render_with_options(input: &str, options: &RenderOptions) -> Result<String, Error> {
    Ok(load(input, options)?.script())
}

/// Parses a plot description and replays it into a [`Plotter`].
pub fn load(input: &str, options: &RenderOptions) -> Result<Plotter, Error> {
    let description = description_parser::parse_description(input)?;
    let plotter = build(&description, options.title.as_deref());
    debug!(
        statements = description.statements.len(),
        styles = plotter.styles().len(),
        segments = plotter.segments().len(),
        arrows = plotter.arrows().len(),
        "loaded plot description"
    );
    if options.strict {
        plotter.check_style_references()?;
    }
    Ok(plotter)
}

/// Applies statements in order. `title` wins over the description's own.
pub fn build(description: &PlotDescription, title: Option<&str>) -> Plotter {
    let title = title.or(description.title.as_deref()).unwrap_or_default();
    let mut plotter = Plotter::new(title);
    for statement in &description.statements {
        match statement {
            Statement::Style { kind, value } => {
                plotter.add_style(kind.as_str(), value.as_str());
            }
            Statement::Segment { from, to, style_id } => {
                plotter.add_segment(from.x, from.y, to.x, to.y, *style_id);
            }
            Statement::Arrow { from, to, style_id } => {
                plotter.add_arrow(from.x, from.y, to.x, to.y, *style_id);
            }
            Statement::Rect {
                lower_left,
                upper_right,
                style_id,
            } => {
                plotter.add_rect(lower_left.x, lower_left.y, upper_right.x, upper_right.y, *style_id);
            }
        }
    }
    plotter
}
