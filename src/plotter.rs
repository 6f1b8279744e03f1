use std::fmt;
use std::io;

use tracing::debug;

use crate::error::{Error, Primitive};

/// 1-based position of a style in registration order.
pub type StyleId = usize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub style_id: StyleId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub from: Point,
    pub to: Point,
    pub style_id: StyleId,
}

impl Arrow {
    /// Offset of `to` from `from`, the form vectors are plotted in.
    pub fn delta(&self) -> Point {
        Point::new(self.to.x - self.from.x, self.to.y - self.from.y)
    }
}

/// Accumulates styles, segments and arrows and writes them out as a
/// gnuplot script.
///
/// Style ids are plain positions: primitives hold the number, not a link
/// to the style, and nothing is checked until [`Plotter::check_style_references`]
/// is called.
#[derive(Debug, Clone, PartialEq)]
pub struct Plotter {
    title: String,
    styles: Vec<Style>,
    segments: Vec<Segment>,
    arrows: Vec<Arrow>,
}

impl Plotter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            styles: Vec::new(),
            segments: Vec::new(),
            arrows: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    /// Registers a style and returns its id. Identical styles get distinct ids.
    pub fn add_style(&mut self, kind: impl Into<String>, value: impl Into<String>) -> StyleId {
        self.styles.push(Style {
            kind: kind.into(),
            value: value.into(),
        });
        self.styles.len()
    }

    pub fn add_segment(&mut self, from_x: f64, from_y: f64, to_x: f64, to_y: f64, style_id: StyleId) {
        self.segments.push(Segment {
            from: Point::new(from_x, from_y),
            to: Point::new(to_x, to_y),
            style_id,
        });
    }

    pub fn add_arrow(&mut self, from_x: f64, from_y: f64, to_x: f64, to_y: f64, style_id: StyleId) {
        self.arrows.push(Arrow {
            from: Point::new(from_x, from_y),
            to: Point::new(to_x, to_y),
            style_id,
        });
    }

    /// Adds the four edges of a rectangle as segments: left, top, right, bottom.
    pub fn add_rect(&mut self, ll_x: f64, ll_y: f64, ur_x: f64, ur_y: f64, style_id: StyleId) {
        self.add_segment(ll_x, ll_y, ll_x, ur_y, style_id);
        self.add_segment(ll_x, ur_y, ur_x, ur_y, style_id);
        self.add_segment(ur_x, ur_y, ur_x, ll_y, style_id);
        self.add_segment(ur_x, ll_y, ll_x, ll_y, style_id);
    }

    /// Fails on the first segment, then arrow, whose style id is 0 or past
    /// the last registered style. Ids are unsigned, so 0 is the only
    /// non-positive id that can reach this check.
    pub fn check_style_references(&self) -> Result<(), Error> {
        let style_count = self.styles.len();
        let references = self
            .segments
            .iter()
            .map(|s| s.style_id)
            .enumerate()
            .map(|(i, id)| (Primitive::Segment, i, id))
            .chain(
                self.arrows
                    .iter()
                    .map(|a| a.style_id)
                    .enumerate()
                    .map(|(i, id)| (Primitive::Arrow, i, id)),
            );

        for (primitive, i, style_id) in references {
            if style_id == 0 || style_id > style_count {
                return Err(Error::UnknownStyleReference {
                    primitive,
                    index: i + 1,
                    style_id,
                    style_count,
                });
            }
        }
        Ok(())
    }

    /// Writes the script to `sink`. Write errors are returned as-is.
    pub fn render<W: io::Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        debug!(
            title = %self.title,
            styles = self.styles.len(),
            segments = self.segments.len(),
            arrows = self.arrows.len(),
            "rendering plot script"
        );
        write!(sink, "{self}")
    }

    pub fn script(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Plotter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "set title '{}'", self.title)?;
        writeln!(f)?;

        for (id, style) in (1..).zip(&self.styles) {
            writeln!(f, "set style {} {} {}", style.kind, id, style.value)?;
        }
        writeln!(f)?;

        writeln!(f, "set size ratio -1")?;
        writeln!(f, "set clip two")?;
        writeln!(f, "unset key")?;
        writeln!(f)?;

        // Every entry keeps its trailing ", ", an empty list leaves "plot ".
        write!(f, "plot ")?;
        for segment in &self.segments {
            write!(f, "'-' w l ls {}, ", segment.style_id)?;
        }
        for arrow in &self.arrows {
            write!(f, "'-' w vectors arrowstyle {}, ", arrow.style_id)?;
        }
        writeln!(f)?;

        for segment in &self.segments {
            writeln!(f)?;
            writeln!(f, "{} {}", Coord(segment.from.x), Coord(segment.from.y))?;
            writeln!(f, "{} {}", Coord(segment.to.x), Coord(segment.to.y))?;
            writeln!(f, "e")?;
        }

        for arrow in &self.arrows {
            let delta = arrow.delta();
            writeln!(f)?;
            writeln!(
                f,
                "{} {} {} {}",
                Coord(arrow.from.x),
                Coord(arrow.from.y),
                Coord(delta.x),
                Coord(delta.y)
            )?;
            writeln!(f, "e")?;
        }

        writeln!(f)?;
        writeln!(f, "pause -1 'Press enter to exit.'")
    }
}

const SIGNIFICANT_DIGITS: i32 = 6;

/// A coordinate in C `%g` form with 6 significant digits, the way iostreams
/// print doubles by default: `0.2`, `0.333333`, `1.23457e+06`, `1e-07`.
struct Coord(f64);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value.is_nan() {
            return f.write_str(if value.is_sign_negative() { "-nan" } else { "nan" });
        }
        if value.is_infinite() {
            return f.write_str(if value < 0.0 { "-inf" } else { "inf" });
        }
        if value == 0.0 {
            return f.write_str(if value.is_sign_negative() { "-0" } else { "0" });
        }

        // The exponent is taken after rounding, so 999999.7 goes scientific.
        let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
        let Some((mantissa, exponent)) = scientific.split_once('e') else {
            return f.write_str(&scientific);
        };
        let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;

        if exponent < -4 || exponent >= SIGNIFICANT_DIGITS {
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(f, "{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
        } else {
            let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
            let fixed = format!("{value:.decimals$}");
            f.write_str(trim_fraction(&fixed))
        }
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER_TAIL: &str = "set size ratio -1\nset clip two\nunset key\n\n";
    const PAUSE: &str = "\npause -1 'Press enter to exit.'\n";

    #[test]
    fn add_style_returns_position() {
        let mut plotter = Plotter::new("t");
        assert_eq!(plotter.add_style("line", "lc rgb 'red'"), 1);
        assert_eq!(plotter.add_style("arrow", "head filled"), 2);
        assert_eq!(plotter.add_style("line", "lc rgb 'red'"), 3);
        assert_eq!(plotter.styles().len(), 3);
        assert_eq!(plotter.styles()[2], plotter.styles()[0]);
    }

    #[test]
    fn add_rect_expands_to_four_edges() {
        let mut rect = Plotter::new("t");
        rect.add_rect(1.0, 2.0, 4.0, 6.0, 7);

        let mut manual = Plotter::new("t");
        manual.add_segment(1.0, 2.0, 1.0, 6.0, 7);
        manual.add_segment(1.0, 6.0, 4.0, 6.0, 7);
        manual.add_segment(4.0, 6.0, 4.0, 2.0, 7);
        manual.add_segment(4.0, 2.0, 1.0, 2.0, 7);

        assert_eq!(rect, manual);
    }

    #[test]
    fn add_rect_with_swapped_corners_still_draws_four_edges() {
        let mut plotter = Plotter::new("t");
        plotter.add_rect(3.0, 3.0, 0.0, 0.0, 1);
        assert_eq!(plotter.segments().len(), 4);
        assert_eq!(plotter.segments()[0].from, Point::new(3.0, 3.0));
        assert_eq!(plotter.segments()[0].to, Point::new(3.0, 0.0));
    }

    #[test]
    fn arrow_delta() {
        let arrow = Arrow {
            from: Point::new(1.0, -1.0),
            to: Point::new(4.0, 1.5),
            style_id: 1,
        };
        assert_eq!(arrow.delta(), Point::new(3.0, 2.5));
    }

    #[test]
    fn empty_plotter_keeps_bare_plot_line() {
        let plotter = Plotter::new("empty");
        let expected = format!("set title 'empty'\n\n\n{HEADER_TAIL}plot \n{PAUSE}");
        assert_eq!(plotter.script(), expected);
    }

    #[test]
    fn style_directives_numbered_in_order() {
        let mut plotter = Plotter::new("styles");
        plotter.add_style("line", "lc rgb 'red'");
        plotter.add_style("arrow", "head filled size 0.1,20");
        let expected = format!(
            "set title 'styles'\n\n\
             set style line 1 lc rgb 'red'\n\
             set style arrow 2 head filled size 0.1,20\n\n\
             {HEADER_TAIL}plot \n{PAUSE}"
        );
        assert_eq!(plotter.script(), expected);
    }

    #[test]
    fn fractional_and_negative_coordinates() {
        let mut plotter = Plotter::new("t");
        plotter.add_segment(-1.5, 0.25, 2.0, -3.0, 1);
        plotter.add_arrow(0.5, 0.5, 0.0, 2.0, 2);
        let script = plotter.script();
        assert!(script.contains("\n-1.5 0.25\n2 -3\ne\n"), "got: {script}");
        assert!(script.contains("\n0.5 0.5 -0.5 1.5\ne\n"), "got: {script}");
    }

    #[test]
    fn coord_uses_six_significant_digits() {
        let cases = [
            (0.0, "0"),
            (-0.0, "-0"),
            (1.0, "1"),
            (-2.5, "-2.5"),
            (100000.0, "100000"),
            (1234567.0, "1.23457e+06"),
            (999999.7, "1e+06"),
            (0.0001, "0.0001"),
            (0.0000001, "1e-07"),
            (-0.000012345, "-1.2345e-05"),
            (1.0 / 3.0, "0.333333"),
            (0.3 - 0.1, "0.2"),
            (1e300, "1e+300"),
            (f64::INFINITY, "inf"),
        ];
        for (value, expected) in cases {
            assert_eq!(Coord(value).to_string(), expected, "formatting {value:?}");
        }
    }

    #[test]
    fn inexact_arrow_delta_is_rounded() {
        let mut plotter = Plotter::new("t");
        plotter.add_segment(1234567.0, 0.0000001, 1.0 / 3.0, -0.0, 1);
        plotter.add_arrow(0.1, 0.1, 0.3, 0.4, 1);
        let script = plotter.script();
        assert!(script.contains("\n1.23457e+06 1e-07\n0.333333 -0\ne\n"), "got: {script}");
        assert!(script.contains("\n0.1 0.1 0.2 0.3\ne\n"), "got: {script}");
    }

    #[test]
    fn dangling_style_ids_are_rendered_verbatim() {
        let mut plotter = Plotter::new("t");
        plotter.add_segment(0.0, 0.0, 1.0, 1.0, 9);
        let script = plotter.script();
        assert!(script.contains("plot '-' w l ls 9, \n"), "got: {script}");
    }

    #[test]
    fn check_style_references_accepts_registered_ids() {
        let mut plotter = Plotter::new("t");
        let line = plotter.add_style("line", "lc 1");
        let arrow = plotter.add_style("arrow", "head");
        plotter.add_rect(0.0, 0.0, 1.0, 1.0, line);
        plotter.add_arrow(0.0, 0.0, 1.0, 1.0, arrow);
        assert!(plotter.check_style_references().is_ok());
    }

    #[test]
    fn check_style_references_reports_segment_first() {
        let mut plotter = Plotter::new("t");
        plotter.add_style("line", "lc 1");
        plotter.add_arrow(0.0, 0.0, 1.0, 1.0, 3);
        plotter.add_segment(0.0, 0.0, 1.0, 1.0, 1);
        plotter.add_segment(0.0, 0.0, 1.0, 1.0, 0);

        let err = plotter.check_style_references().unwrap_err();
        match err {
            Error::UnknownStyleReference {
                primitive,
                index,
                style_id,
                style_count,
            } => {
                assert_eq!(primitive, Primitive::Segment);
                assert_eq!(index, 2);
                assert_eq!(style_id, 0);
                assert_eq!(style_count, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn check_style_references_reports_arrow() {
        let mut plotter = Plotter::new("t");
        plotter.add_arrow(0.0, 0.0, 1.0, 1.0, 1);
        let err = plotter.check_style_references().unwrap_err();
        assert_eq!(err.to_string(), "arrow 1 references unknown style 1 (0 registered)");
    }

    #[test]
    fn render_matches_script() {
        let mut plotter = Plotter::new("t");
        plotter.add_style("line", "lw 2");
        plotter.add_segment(0.0, 0.0, 1.0, 0.0, 1);
        let mut sink = Vec::new();
        plotter.render(&mut sink).unwrap();
        assert_eq!(String::from_utf8(sink).unwrap(), plotter.script());
    }

    struct ClosedSink;

    impl io::Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn render_propagates_sink_errors() {
        let plotter = Plotter::new("t");
        let err = plotter.render(&mut ClosedSink).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
