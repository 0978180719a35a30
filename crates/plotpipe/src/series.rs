//! Plottable series
//!
//! A [`Series`] is either a plain line/point series or an error-bar series. Both
//! reduce to the same pair consumed by the session: a [`DataBuffer`] holding the
//! columns to send inline, and the [`PlotOptions`] describing how gnuplot should
//! read and draw them.
//!
//! ```rust
//! use plotpipe::{Series, SeriesOptions};
//!
//! let series = Series::plot([1.0, 2.0, 3.0], SeriesOptions::new().with_spacing(0.5));
//! let buffer = series.derive_buffer().unwrap();
//! assert_eq!(buffer.cols(), 2);
//! assert_eq!(buffer.get(2, 0), Some(1.0));
//! ```

use tracing::debug;

use crate::core::{
    DataBuffer, ErrorBarDir, LineStyle, Marker, PlotAxes, PlotError, PlotOptions, Result,
};

/// User-facing appearance of one series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesOptions {
    pub title: Option<String>,
    /// Distance between consecutive synthetic x values
    pub spacing: Option<f64>,
    /// Style of the connecting line; without one, points are drawn unconnected
    pub line_style: Option<LineStyle>,
    pub marker: Option<Marker>,
    pub axes: Option<PlotAxes>,
}

impl SeriesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn with_line_style(mut self, style: LineStyle) -> Self {
        self.line_style = Some(style);
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn with_axes(mut self, axes: PlotAxes) -> Self {
        self.axes = Some(axes);
        self
    }

    fn to_plot_options(&self, cols: usize, error_bars: Option<ErrorBarDir>) -> PlotOptions {
        PlotOptions {
            cols: (0..cols).collect(),
            title: self.title.clone(),
            error_bars,
            line_style: self.line_style.clone(),
            marker: self.marker,
            axes: self.axes,
        }
    }
}

/// y values with optional explicit x values
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleSeries {
    pub x: Option<Vec<f64>>,
    pub y: Vec<f64>,
    pub options: SeriesOptions,
}

impl SimpleSeries {
    fn has_x(&self) -> bool {
        self.x.is_some() || self.options.spacing.is_some()
    }

    fn derive_options(&self) -> PlotOptions {
        let cols = if self.has_x() { 2 } else { 1 };
        self.options.to_plot_options(cols, None)
    }

    fn derive_buffer(&self) -> Result<DataBuffer> {
        if let Some(x) = &self.x {
            check_lengths(x.len(), self.y.len())?;
            let mut buffer = DataBuffer::with_capacity(2, self.y.len())?;
            for (&x, &y) in x.iter().zip(&self.y) {
                buffer.push_row([x, y])?;
            }
            return Ok(buffer);
        }

        match self.options.spacing {
            Some(spacing) => {
                let mut buffer = DataBuffer::with_capacity(2, self.y.len())?;
                for (i, &y) in self.y.iter().enumerate() {
                    buffer.push_row([i as f64 * spacing, y])?;
                }
                Ok(buffer)
            }
            None => {
                let mut buffer = DataBuffer::with_capacity(1, self.y.len())?;
                for &y in &self.y {
                    buffer.push_row([y])?;
                }
                Ok(buffer)
            }
        }
    }
}

/// Values and errors of an error-bar series
///
/// An error vector holding a single value applies that value to every point.
/// Empty error vectors are absent; at least one axis needs errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBarData {
    pub x: Option<Vec<f64>>,
    pub y: Vec<f64>,
    pub x_err: Vec<f64>,
    pub y_err: Vec<f64>,
}

impl ErrorBarData {
    pub fn new(y: impl Into<Vec<f64>>) -> Self {
        Self {
            y: y.into(),
            ..Self::default()
        }
    }

    pub fn with_x(mut self, x: impl Into<Vec<f64>>) -> Self {
        self.x = Some(x.into());
        self
    }

    pub fn with_x_err(mut self, x_err: impl Into<Vec<f64>>) -> Self {
        self.x_err = x_err.into();
        self
    }

    pub fn with_y_err(mut self, y_err: impl Into<Vec<f64>>) -> Self {
        self.y_err = y_err.into();
        self
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Check shapes and report which error bars will be drawn
    pub fn direction(&self) -> Result<ErrorBarDir> {
        let points = self.y.len();
        if let Some(x) = &self.x {
            check_lengths(x.len(), points)?;
        }
        check_error_len("x", &self.x_err, points)?;
        check_error_len("y", &self.y_err, points)?;

        match (self.x_err.is_empty(), self.y_err.is_empty()) {
            (false, false) => Ok(ErrorBarDir::XY),
            (false, true) => Ok(ErrorBarDir::X),
            (true, false) => Ok(ErrorBarDir::Y),
            (true, true) => Err(PlotError::MissingErrors),
        }
    }
}

/// Error-bar values with their appearance
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBarSeries {
    pub data: ErrorBarData,
    pub options: SeriesOptions,
}

impl ErrorBarSeries {
    fn column_count(&self) -> usize {
        2 + usize::from(!self.data.x_err.is_empty()) + usize::from(!self.data.y_err.is_empty())
    }

    fn derive_options(&self) -> PlotOptions {
        // Direction is validated by derive_buffer before anything is emitted
        let direction = self.data.direction().ok();
        self.options.to_plot_options(self.column_count(), direction)
    }

    fn derive_buffer(&self) -> Result<DataBuffer> {
        self.data.direction()?;
        let spacing = self.options.spacing.unwrap_or(1.0);
        let data = &self.data;

        let mut buffer = DataBuffer::with_capacity(self.column_count(), data.len())?;
        for (i, &y) in data.y.iter().enumerate() {
            let x = match &data.x {
                Some(x) => x[i],
                None => i as f64 * spacing,
            };
            buffer.push(x).push(y);
            if let Some(dx) = broadcast_at(&data.x_err, i) {
                buffer.push(dx);
            }
            if let Some(dy) = broadcast_at(&data.y_err, i) {
                buffer.push(dy);
            }
            buffer.end_row()?;
        }
        Ok(buffer)
    }
}

/// A series the session can draw
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Simple(SimpleSeries),
    ErrorBar(ErrorBarSeries),
}

impl Series {
    /// y values against their index (or `index * spacing` when spacing is set)
    pub fn plot(y: impl Into<Vec<f64>>, options: SeriesOptions) -> Self {
        Series::Simple(SimpleSeries {
            x: None,
            y: y.into(),
            options,
        })
    }

    /// y values against explicit x values
    ///
    /// # Errors
    /// [`PlotError::LengthMismatch`] if `x` and `y` differ in length.
    pub fn plot_xy(
        x: impl Into<Vec<f64>>,
        y: impl Into<Vec<f64>>,
        options: SeriesOptions,
    ) -> Result<Self> {
        let (x, y) = (x.into(), y.into());
        check_lengths(x.len(), y.len())?;
        Ok(Series::Simple(SimpleSeries {
            x: Some(x),
            y,
            options,
        }))
    }

    /// Error-bar series
    ///
    /// # Errors
    /// [`PlotError::MissingErrors`] when both error vectors are empty, and the
    /// length errors of [`ErrorBarData::direction`].
    pub fn errorbar(data: ErrorBarData, options: SeriesOptions) -> Result<Self> {
        data.direction()?;
        Ok(Series::ErrorBar(ErrorBarSeries { data, options }))
    }

    pub fn options(&self) -> &SeriesOptions {
        match self {
            Series::Simple(s) => &s.options,
            Series::ErrorBar(s) => &s.options,
        }
    }

    pub fn options_mut(&mut self) -> &mut SeriesOptions {
        match self {
            Series::Simple(s) => &mut s.options,
            Series::ErrorBar(s) => &mut s.options,
        }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        match self {
            Series::Simple(s) => s.y.len(),
            Series::ErrorBar(s) => s.data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Options the serializer works from, with `cols` and error bars filled in
    pub fn derive_options(&self) -> PlotOptions {
        match self {
            Series::Simple(s) => s.derive_options(),
            Series::ErrorBar(s) => s.derive_options(),
        }
    }

    /// Table sent inline after the `plot` command
    pub fn derive_buffer(&self) -> Result<DataBuffer> {
        let buffer = match self {
            Series::Simple(s) => s.derive_buffer()?,
            Series::ErrorBar(s) => s.derive_buffer()?,
        };
        debug!(
            rows = buffer.rows(),
            cols = buffer.cols(),
            "Derived series buffer"
        );
        Ok(buffer)
    }
}

fn check_lengths(x_len: usize, y_len: usize) -> Result<()> {
    if x_len != y_len {
        return Err(PlotError::LengthMismatch { x_len, y_len });
    }
    Ok(())
}

fn check_error_len(axis: &'static str, errors: &[f64], points: usize) -> Result<()> {
    match errors.len() {
        0 | 1 => Ok(()),
        len if len == points => Ok(()),
        len => Err(PlotError::ErrorLengthMismatch { axis, len, points }),
    }
}

fn broadcast_at(errors: &[f64], index: usize) -> Option<f64> {
    match errors {
        [] => None,
        [single] => Some(*single),
        many => many.get(index).copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y_only_single_column() {
        let series = Series::plot(vec![1.0, 2.0, 3.0, 2.0, 1.0], SeriesOptions::new());
        let buffer = series.derive_buffer().unwrap();
        assert_eq!(buffer.cols(), 1);
        assert_eq!(buffer.rows(), 5);
        assert_eq!(buffer.get(2, 0), Some(3.0));
        assert_eq!(series.derive_options().cols, vec![0]);
    }

    #[test]
    fn test_explicit_x_two_columns() {
        let series = Series::plot_xy([0.0, 1.0, 2.0], [5.0, 6.0, 7.0], SeriesOptions::new())
            .unwrap();
        let buffer = series.derive_buffer().unwrap();
        assert_eq!(buffer.to_string(), "0\t5\n1\t6\n2\t7\n");
        assert_eq!(series.derive_options().cols, vec![0, 1]);
    }

    #[test]
    fn test_explicit_x_length_mismatch() {
        let err = Series::plot_xy([0.0, 1.0], [5.0], SeriesOptions::new()).unwrap_err();
        assert!(matches!(err, PlotError::LengthMismatch { x_len: 2, y_len: 1 }));

        // Public fields can be edited after construction; the buffer still checks
        let series = Series::Simple(SimpleSeries {
            x: Some(vec![1.0]),
            y: vec![1.0, 2.0],
            options: SeriesOptions::new(),
        });
        assert!(series.derive_buffer().is_err());
    }

    #[test]
    fn test_spacing_synthesizes_x() {
        let series = Series::plot([4.0, 5.0, 6.0], SeriesOptions::new().with_spacing(0.25));
        let buffer = series.derive_buffer().unwrap();
        assert_eq!(buffer.cols(), 2);
        assert_eq!(buffer.get(0, 0), Some(0.0));
        assert_eq!(buffer.get(2, 0), Some(0.5));
        assert_eq!(series.derive_options().cols, vec![0, 1]);
    }

    #[test]
    fn test_errorbar_broadcast_y_error() {
        let data = ErrorBarData::new([1.0, 2.0]).with_y_err([0.5]);
        let series = Series::errorbar(data, SeriesOptions::new()).unwrap();
        let buffer = series.derive_buffer().unwrap();
        assert_eq!(buffer.to_string(), "0\t1\t0.5\n1\t2\t0.5\n");

        let options = series.derive_options();
        assert_eq!(options.cols, vec![0, 1, 2]);
        assert_eq!(options.error_bars, Some(ErrorBarDir::Y));
    }

    #[test]
    fn test_errorbar_broadcast_not_stored() {
        let data = ErrorBarData::new([1.0, 2.0, 3.0]).with_x_err([0.1]);
        let series = Series::errorbar(data, SeriesOptions::new()).unwrap();
        match &series {
            Series::ErrorBar(s) => assert_eq!(s.data.x_err, vec![0.1]),
            Series::Simple(_) => panic!("expected error-bar series"),
        }
    }

    #[test]
    fn test_errorbar_both_axes_column_order() {
        let data = ErrorBarData::new([10.0, 20.0])
            .with_x([1.0, 2.0])
            .with_x_err([0.1, 0.2])
            .with_y_err([1.0]);
        let series = Series::errorbar(data, SeriesOptions::new()).unwrap();
        assert_eq!(
            series.derive_buffer().unwrap().to_string(),
            "1\t10\t0.1\t1\n2\t20\t0.2\t1\n"
        );
        assert_eq!(series.derive_options().error_bars, Some(ErrorBarDir::XY));
        assert_eq!(series.derive_options().cols, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_errorbar_spacing() {
        let data = ErrorBarData::new([1.0, 1.0, 1.0]).with_x_err([0.5]);
        let series = Series::errorbar(data, SeriesOptions::new().with_spacing(2.0)).unwrap();
        let buffer = series.derive_buffer().unwrap();
        assert_eq!(buffer.get(2, 0), Some(4.0));
        assert_eq!(series.derive_options().error_bars, Some(ErrorBarDir::X));
    }

    #[test]
    fn test_errorbar_requires_errors() {
        let err = Series::errorbar(ErrorBarData::new([1.0]), SeriesOptions::new()).unwrap_err();
        assert!(matches!(err, PlotError::MissingErrors));
        assert!(err.to_string().contains("requires errors on at least one axis"));
    }

    #[test]
    fn test_errorbar_error_length() {
        let data = ErrorBarData::new([1.0, 2.0, 3.0]).with_y_err([0.1, 0.2]);
        let err = Series::errorbar(data, SeriesOptions::new()).unwrap_err();
        assert!(matches!(
            err,
            PlotError::ErrorLengthMismatch {
                axis: "y",
                len: 2,
                points: 3
            }
        ));
    }

    #[test]
    fn test_options_carried_through() {
        let options = SeriesOptions::new()
            .with_title("signal")
            .with_axes(PlotAxes::X2Y2)
            .with_marker(Marker::new(3));
        let series = Series::plot([1.0], options);
        let derived = series.derive_options();
        assert_eq!(derived.title.as_deref(), Some("signal"));
        assert_eq!(derived.axes, Some(PlotAxes::X2Y2));
        assert_eq!(derived.marker, Some(Marker::new(3)));
        assert_eq!(derived.error_bars, None);
    }
}
