//! Two-phase serializers for plot configuration
//!
//! gnuplot requires a style to be defined by its own statement before a `plot`
//! command may reference it. Serializers therefore work in two phases:
//!
//! 1. [`Serializer::prepare`] sends any standalone statements the object needs
//!    (for a line style: `unset style line N` and `set style line N ...`).
//! 2. [`Serializer::print`] appends the inline fragment to the statement being
//!    built (for a line style: `ls N`).
//!
//! A line style holds its [`Identifier`] for as long as the serializer lives; the
//! slot's `unset style line N` statement is queued when the serializer drops.

use tracing::trace;

use super::error::{PlotError, Result};
use super::ids::Identifier;
use super::statement::Statement;
use super::types::{LineStyle, Marker, PlotOptions};

/// Emission context handed to [`Serializer::prepare`]
pub trait Emitter {
    /// Write one complete statement
    fn send_line(&mut self, line: &str) -> Result<()>;

    /// Reserve a fresh style identifier
    fn allocate_id(&mut self) -> Result<Identifier>;
}

/// Renders a configuration object into gnuplot text
pub trait Serializer {
    /// Send the standalone statements this object depends on
    ///
    /// Calling `prepare` a second time on the same instance does nothing.
    fn prepare(&mut self, ctx: &mut dyn Emitter) -> Result<()>;

    /// Append the inline fragment to `out`
    fn print(&self, out: &mut Statement) -> Result<()>;
}

/// Inline point type and size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSerializer {
    marker: Marker,
}

impl MarkerSerializer {
    pub fn new(marker: Marker) -> Self {
        Self { marker }
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }
}

impl Serializer for MarkerSerializer {
    fn prepare(&mut self, _ctx: &mut dyn Emitter) -> Result<()> {
        Ok(())
    }

    fn print(&self, out: &mut Statement) -> Result<()> {
        push_marker(out, &self.marker);
        Ok(())
    }
}

/// Append `pt <n>` and `ps <n>` for whichever marker fields are set
fn push_marker(out: &mut Statement, marker: &Marker) {
    if let Some(point_type) = marker.point_type {
        out.push_pair("pt", point_type);
    }
    if let Some(point_size) = marker.point_size {
        out.push_pair("ps", point_size);
    }
}

/// A numbered `set style line` definition
#[derive(Debug)]
pub struct LineStyleSerializer {
    style: LineStyle,
    id: Option<Identifier>,
}

impl LineStyleSerializer {
    pub fn new(style: LineStyle) -> Self {
        Self { style, id: None }
    }

    pub fn style(&self) -> &LineStyle {
        &self.style
    }

    /// Identifier held since [`prepare`](Serializer::prepare), if any
    pub fn id(&self) -> Option<&Identifier> {
        self.id.as_ref()
    }

    /// The `set style line` statement for slot `id`
    pub fn definition(&self, id: usize) -> Statement {
        let mut statement = Statement::starting_with(format!("set style line {}", id));
        if let Some(line_type) = self.style.copy_from {
            statement.push_pair("lt", line_type);
        }
        if let Some(width) = self.style.line_width {
            statement.push_pair("lw", width);
        }
        if let Some(color) = &self.style.line_color {
            statement.push_pair("lc", color);
        }
        if let Some(dash) = &self.style.dash_type {
            statement.push_pair("dt", dash);
        }
        if let Some(marker) = &self.style.marker {
            push_marker(&mut statement, marker);
        }
        statement
    }
}

impl Serializer for LineStyleSerializer {
    fn prepare(&mut self, ctx: &mut dyn Emitter) -> Result<()> {
        if self.id.is_some() {
            return Ok(());
        }

        let id = ctx.allocate_id()?;
        let value = id.value();
        let undefine = format!("unset style line {}", value);
        id.set_on_release(undefine.clone());
        self.id = Some(id);

        ctx.send_line(&undefine)?;
        let definition = self.definition(value);
        trace!(id = value, definition = %definition, "Defining line style");
        ctx.send_line(&definition.to_string())
    }

    fn print(&self, out: &mut Statement) -> Result<()> {
        let id = self
            .id
            .as_ref()
            .ok_or_else(|| PlotError::usage_error("line style printed before prepare"))?;
        out.push_pair("ls", id);
        Ok(())
    }
}

/// Per-series `plot` fragment
#[derive(Debug)]
pub struct PlotOptionsSerializer {
    options: PlotOptions,
    line_style: Option<LineStyleSerializer>,
}

impl PlotOptionsSerializer {
    /// Wrap `options`, folding a top-level marker into the line style when both are set
    pub fn new(mut options: PlotOptions) -> Self {
        if let Some(style) = options.line_style.as_mut() {
            if let Some(marker) = options.marker.take() {
                style.marker = Some(marker);
            }
        }
        let line_style = options.line_style.clone().map(LineStyleSerializer::new);
        Self {
            options,
            line_style,
        }
    }

    /// Options after marker folding
    pub fn options(&self) -> &PlotOptions {
        &self.options
    }

    pub fn line_style(&self) -> Option<&LineStyleSerializer> {
        self.line_style.as_ref()
    }

    fn using_clause(&self) -> String {
        self.options
            .cols
            .iter()
            .map(|col| (col + 1).to_string())
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl Serializer for PlotOptionsSerializer {
    fn prepare(&mut self, ctx: &mut dyn Emitter) -> Result<()> {
        match self.line_style.as_mut() {
            Some(style) => style.prepare(ctx),
            None => Ok(()),
        }
    }

    fn print(&self, out: &mut Statement) -> Result<()> {
        if self.options.cols.is_empty() {
            return Err(PlotError::usage_error("plot options need at least one column"));
        }
        out.push_pair("using", self.using_clause());

        let mut with_emitted = false;
        if let Some(direction) = self.options.error_bars {
            out.push_pair("with", direction.style_name(self.line_style.is_some()));
            with_emitted = true;
        }

        if let Some(style) = &self.line_style {
            if !with_emitted {
                out.push("with linespoints");
            }
            style.print(out)?;
        }

        if let Some(title) = &self.options.title {
            out.push(format!("title '{}'", title));
        }

        if let Some(marker) = self.options.marker {
            MarkerSerializer::new(marker).print(out)?;
        }

        if let Some(axes) = self.options.axes {
            out.push_pair("axes", axes);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::IdAllocator;
    use crate::core::types::{Color, ErrorBarDir, PlotAxes, PointType};

    #[derive(Default)]
    struct Recorder {
        lines: Vec<String>,
        ids: IdAllocator,
    }

    impl Emitter for Recorder {
        fn send_line(&mut self, line: &str) -> Result<()> {
            self.lines.push(line.to_string());
            Ok(())
        }

        fn allocate_id(&mut self) -> Result<Identifier> {
            for line in self.ids.drain_released() {
                self.lines.push(line);
            }
            Ok(self.ids.allocate())
        }
    }

    fn printed(serializer: &dyn Serializer) -> String {
        let mut statement = Statement::new();
        serializer.print(&mut statement).unwrap();
        statement.to_string()
    }

    #[test]
    fn test_marker_fragment() {
        let marker = Marker::new(PointType::SolidCircle).with_size(1.5);
        assert_eq!(printed(&MarkerSerializer::new(marker)), "pt 7 ps 1.5");
        assert_eq!(printed(&MarkerSerializer::new(Marker::new(7))), "pt 7");
        assert_eq!(printed(&MarkerSerializer::new(Marker::default())), "");
    }

    #[test]
    fn test_definition_marker_matches_inline_marker() {
        let marker = Marker::new(PointType::Cross).with_size(3.0);
        let serializer = LineStyleSerializer::new(LineStyle::new().with_marker(marker));
        let definition = serializer.definition(50).to_string();
        let inline = printed(&MarkerSerializer::new(marker));
        assert_eq!(inline, "pt 1 ps 3");
        assert_eq!(definition, format!("set style line 50 {}", inline));

        let size_only = LineStyleSerializer::new(
            LineStyle::new().with_marker(Marker::default().with_size(0.5)),
        );
        assert_eq!(size_only.definition(7).to_string(), "set style line 7 ps 0.5");
    }

    #[test]
    fn test_line_style_prepare_and_print() {
        let mut recorder = Recorder::default();
        let style = LineStyle::new()
            .copy_from(2)
            .with_width(1.5)
            .with_color("red")
            .with_dash(".-")
            .with_marker(Marker::new(PointType::Circle).with_size(2.0));
        let mut serializer = LineStyleSerializer::new(style);
        serializer.prepare(&mut recorder).unwrap();

        assert_eq!(
            recorder.lines,
            vec![
                "unset style line 50".to_string(),
                "set style line 50 lt 2 lw 1.5 lc \"red\" dt \".-\" pt 6 ps 2".to_string(),
            ]
        );
        assert_eq!(printed(&serializer), "ls 50");
    }

    #[test]
    fn test_second_prepare_is_noop() {
        let mut recorder = Recorder::default();
        let mut serializer = LineStyleSerializer::new(LineStyle::new());
        serializer.prepare(&mut recorder).unwrap();
        serializer.prepare(&mut recorder).unwrap();
        assert_eq!(recorder.lines.len(), 2);
        assert_eq!(recorder.ids.live_count(), 1);
    }

    #[test]
    fn test_print_before_prepare_is_usage_error() {
        let serializer = LineStyleSerializer::new(LineStyle::new());
        let mut statement = Statement::new();
        let err = serializer.print(&mut statement).unwrap_err();
        assert!(matches!(err, PlotError::Usage { .. }));
    }

    #[test]
    fn test_dropping_serializer_queues_unset() {
        let mut recorder = Recorder::default();
        let mut serializer = LineStyleSerializer::new(LineStyle::new());
        serializer.prepare(&mut recorder).unwrap();
        drop(serializer);
        assert_eq!(
            recorder.ids.drain_released(),
            vec!["unset style line 50".to_string()]
        );
    }

    #[test]
    fn test_rgb_color_definition() {
        let serializer =
            LineStyleSerializer::new(LineStyle::new().with_color(Color::new(255, 0, 0)));
        assert_eq!(
            serializer.definition(51).to_string(),
            "set style line 51 lc rgb \"#00ff0000\""
        );
    }

    #[test]
    fn test_plot_options_minimal() {
        let serializer = PlotOptionsSerializer::new(PlotOptions::default());
        assert_eq!(printed(&serializer), "using 1");
    }

    #[test]
    fn test_plot_options_full_order() {
        let mut recorder = Recorder::default();
        let options = PlotOptions {
            cols: vec![0, 1, 2],
            title: Some("measured".to_string()),
            error_bars: Some(ErrorBarDir::Y),
            line_style: Some(LineStyle::new().with_width(2.0)),
            marker: None,
            axes: Some(PlotAxes::X1Y2),
        };
        let mut serializer = PlotOptionsSerializer::new(options);
        serializer.prepare(&mut recorder).unwrap();
        assert_eq!(
            printed(&serializer),
            "using 1:2:3 with yerrorlines ls 50 title 'measured' axes x1y2"
        );
    }

    #[test]
    fn test_line_style_without_error_bars_uses_linespoints() {
        let mut recorder = Recorder::default();
        let options = PlotOptions {
            cols: vec![0, 1],
            line_style: Some(LineStyle::new()),
            ..PlotOptions::default()
        };
        let mut serializer = PlotOptionsSerializer::new(options);
        serializer.prepare(&mut recorder).unwrap();
        assert_eq!(printed(&serializer), "using 1:2 with linespoints ls 50");
    }

    #[test]
    fn test_error_bars_without_style() {
        let options = PlotOptions {
            cols: vec![0, 1, 2, 3],
            error_bars: Some(ErrorBarDir::XY),
            ..PlotOptions::default()
        };
        let serializer = PlotOptionsSerializer::new(options);
        assert_eq!(printed(&serializer), "using 1:2:3:4 with xyerrorbars");
    }

    #[test]
    fn test_marker_folded_into_line_style() {
        let mut recorder = Recorder::default();
        let options = PlotOptions {
            line_style: Some(LineStyle::new()),
            marker: Some(Marker::new(PointType::Star)),
            ..PlotOptions::default()
        };
        let mut serializer = PlotOptionsSerializer::new(options);
        assert!(serializer.options().marker.is_none());
        serializer.prepare(&mut recorder).unwrap();
        assert_eq!(recorder.lines[1], "set style line 50 pt 3");
        let fragment = printed(&serializer);
        assert_eq!(fragment, "using 1 with linespoints ls 50");
        assert!(!fragment.contains("pt"));
    }

    #[test]
    fn test_marker_without_style_inline() {
        let options = PlotOptions {
            title: Some("raw".to_string()),
            marker: Some(Marker::new(5).with_size(0.5)),
            ..PlotOptions::default()
        };
        let serializer = PlotOptionsSerializer::new(options);
        assert_eq!(printed(&serializer), "using 1 title 'raw' pt 5 ps 0.5");
    }

    #[test]
    fn test_empty_cols_rejected() {
        let options = PlotOptions {
            cols: Vec::new(),
            ..PlotOptions::default()
        };
        let serializer = PlotOptionsSerializer::new(options);
        let mut statement = Statement::new();
        assert!(matches!(
            serializer.print(&mut statement),
            Err(PlotError::Usage { .. })
        ));
    }
}
