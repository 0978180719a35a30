//! Core type definitions for plot descriptions
//!
//! Plain value types shared by the serializers and the session: colors, markers,
//! line styles, axes selectors, grid and tick options, terminal kinds. The
//! `Display` impls produce the exact gnuplot tokens.

use std::fmt;

/// A plain numeric pair, used for origin and size placement
pub type Vec2 = (f64, f64);

/// An RGBA color
///
/// gnuplot reads the alpha byte as transparency, so `alpha: 0` is fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: u8,
}

impl Color {
    /// Create an opaque color
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 0 }
    }

    /// Create a color with an explicit alpha (transparency) byte
    pub fn with_alpha(r: u8, g: u8, b: u8, alpha: u8) -> Self {
        Self { r, g, b, alpha }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.alpha, self.r, self.g, self.b
        )
    }
}

/// Point shapes, numbered as gnuplot numbers them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PointType {
    Empty = -1,
    Dot = 0,
    Cross = 1,
    X = 2,
    Star = 3,
    SquareDot = 4,
    SolidSquare = 5,
    Circle = 6,
    SolidCircle = 7,
    TriangleDot = 8,
    SolidDot = 9,
    InvTriangleDot = 10,
    InvSolidDot = 11,
    RhombusDot = 12,
    SolidRhombus = 13,
    HexagonDot = 14,
    SolidHexagon = 15,
}

impl PointType {
    /// The integer gnuplot expects after `pt`
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// A point type given either symbolically or as a raw gnuplot number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointKind {
    Raw(i32),
    Symbol(PointType),
}

impl PointKind {
    pub fn code(self) -> i32 {
        match self {
            PointKind::Raw(n) => n,
            PointKind::Symbol(p) => p.code(),
        }
    }
}

impl From<i32> for PointKind {
    fn from(value: i32) -> Self {
        PointKind::Raw(value)
    }
}

impl From<PointType> for PointKind {
    fn from(value: PointType) -> Self {
        PointKind::Symbol(value)
    }
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Point marker appearance
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Marker {
    pub point_type: Option<PointKind>,
    pub point_size: Option<f64>,
}

impl Marker {
    /// Create a marker with the given point type and default size
    pub fn new(point_type: impl Into<PointKind>) -> Self {
        Self {
            point_type: Some(point_type.into()),
            point_size: None,
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.point_size = Some(size);
        self
    }

    /// Returns true if neither field is set
    pub fn is_empty(&self) -> bool {
        self.point_type.is_none() && self.point_size.is_none()
    }
}

/// Line color: a gnuplot color name or an explicit RGBA value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineColor {
    Named(String),
    Rgb(Color),
}

impl From<&str> for LineColor {
    fn from(value: &str) -> Self {
        LineColor::Named(value.to_string())
    }
}

impl From<String> for LineColor {
    fn from(value: String) -> Self {
        LineColor::Named(value)
    }
}

impl From<Color> for LineColor {
    fn from(value: Color) -> Self {
        LineColor::Rgb(value)
    }
}

impl fmt::Display for LineColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineColor::Named(name) => write!(f, "\"{}\"", name),
            LineColor::Rgb(color) => write!(f, "rgb \"{}\"", color),
        }
    }
}

/// Dash pattern: a gnuplot dash index or a pattern string such as `".-_"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashType {
    Index(i32),
    Pattern(String),
}

impl From<i32> for DashType {
    fn from(value: i32) -> Self {
        DashType::Index(value)
    }
}

impl From<&str> for DashType {
    fn from(value: &str) -> Self {
        DashType::Pattern(value.to_string())
    }
}

impl From<String> for DashType {
    fn from(value: String) -> Self {
        DashType::Pattern(value)
    }
}

impl fmt::Display for DashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashType::Index(n) => write!(f, "{}", n),
            DashType::Pattern(p) => write!(f, "\"{}\"", p),
        }
    }
}

/// Appearance of a numbered gnuplot line style
///
/// Every field is optional; unset fields are left to gnuplot's defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineStyle {
    /// Line type to start from (`lt`)
    pub copy_from: Option<i32>,
    pub line_width: Option<f64>,
    pub line_color: Option<LineColor>,
    pub dash_type: Option<DashType>,
    pub marker: Option<Marker>,
}

impl LineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, color: impl Into<LineColor>) -> Self {
        self.line_color = Some(color.into());
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.line_width = Some(width);
        self
    }

    pub fn with_dash(mut self, dash: impl Into<DashType>) -> Self {
        self.dash_type = Some(dash.into());
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn copy_from(mut self, line_type: i32) -> Self {
        self.copy_from = Some(line_type);
        self
    }
}

/// Error bar direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorBarDir {
    X,
    Y,
    XY,
}

impl ErrorBarDir {
    /// gnuplot plotting style for this direction
    ///
    /// With `lines` set the points are also joined by a line.
    pub fn style_name(self, lines: bool) -> &'static str {
        match (self, lines) {
            (ErrorBarDir::X, false) => "xerrorbars",
            (ErrorBarDir::Y, false) => "yerrorbars",
            (ErrorBarDir::XY, false) => "xyerrorbars",
            (ErrorBarDir::X, true) => "xerrorlines",
            (ErrorBarDir::Y, true) => "yerrorlines",
            (ErrorBarDir::XY, true) => "xyerrorlines",
        }
    }
}

/// Serializable options of one plotted series
///
/// `cols` are 0-based indices into the series' [`DataBuffer`](crate::DataBuffer);
/// they are written 1-based in the `using` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub cols: Vec<usize>,
    pub title: Option<String>,
    pub error_bars: Option<ErrorBarDir>,
    pub line_style: Option<LineStyle>,
    pub marker: Option<Marker>,
    pub axes: Option<PlotAxes>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            cols: vec![0],
            title: None,
            error_bars: None,
            line_style: None,
            marker: None,
            axes: None,
        }
    }
}

/// Axis pair a series is plotted against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum PlotAxes {
    #[default]
    X1Y1,
    X1Y2,
    X2Y1,
    X2Y2,
}

impl fmt::Display for PlotAxes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotAxes::X1Y1 => write!(f, "x1y1"),
            PlotAxes::X1Y2 => write!(f, "x1y2"),
            PlotAxes::X2Y1 => write!(f, "x2y1"),
            PlotAxes::X2Y2 => write!(f, "x2y2"),
        }
    }
}

/// Grid drawing layer relative to the plotted data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum GridLevel {
    #[default]
    LayerDefault,
    Front,
    Back,
}

impl fmt::Display for GridLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridLevel::LayerDefault => write!(f, "layerdefault"),
            GridLevel::Front => write!(f, "front"),
            GridLevel::Back => write!(f, "back"),
        }
    }
}

/// Per-axis enable flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct AxisFlags {
    pub x: bool,
    pub y: bool,
}

impl AxisFlags {
    pub fn new(x: bool, y: bool) -> Self {
        Self { x, y }
    }

    /// Same flag on both axes
    pub fn both(value: bool) -> Self {
        Self { x: value, y: value }
    }
}

impl From<bool> for AxisFlags {
    fn from(value: bool) -> Self {
        Self::both(value)
    }
}

/// Grid configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    pub major: AxisFlags,
    pub minor: AxisFlags,
    pub level: GridLevel,
    pub major_line_style: LineStyle,
    pub minor_line_style: LineStyle,
}

impl GridOptions {
    /// Create grid options with the given major and minor flags
    ///
    /// ```rust
    /// use plotpipe::GridOptions;
    ///
    /// let grid = GridOptions::new(true, false);
    /// assert!(grid.major.x && grid.major.y);
    /// assert!(!grid.minor.x);
    /// ```
    pub fn new(major: impl Into<AxisFlags>, minor: impl Into<AxisFlags>) -> Self {
        Self {
            major: major.into(),
            minor: minor.into(),
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: GridLevel) -> Self {
        self.level = level;
        self
    }
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            major: AxisFlags::default(),
            minor: AxisFlags::default(),
            level: GridLevel::default(),
            major_line_style: LineStyle::new().with_color(Color::with_alpha(0, 0, 0, 192)),
            minor_line_style: LineStyle::new().with_color(Color::with_alpha(0, 0, 0, 224)),
        }
    }
}

/// Minor tick configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicksOptions {
    /// Number of minor intervals between major x tics
    pub minor_x_divider: usize,
    /// Number of minor intervals between major y tics
    pub minor_y_divider: usize,
}

impl Default for TicksOptions {
    fn default() -> Self {
        Self {
            minor_x_divider: 5,
            minor_y_divider: 5,
        }
    }
}

/// gnuplot output terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Terminal {
    /// Leave gnuplot's default terminal in place
    #[default]
    None,
    /// Interactive Qt window
    Qt,
    Png,
    Jpeg,
    Pdf,
    Svg,
    /// Plain text plots on the terminal
    Dumb,
}

impl Terminal {
    /// Every terminal kind, in display order
    pub fn all() -> &'static [Terminal] {
        &[
            Terminal::None,
            Terminal::Qt,
            Terminal::Png,
            Terminal::Jpeg,
            Terminal::Pdf,
            Terminal::Svg,
            Terminal::Dumb,
        ]
    }

    /// Name passed to `set term`, `None` for the default terminal
    pub fn term_name(self) -> Option<&'static str> {
        match self {
            Terminal::None => None,
            Terminal::Qt => Some("qt"),
            Terminal::Png => Some("pngcairo"),
            Terminal::Jpeg => Some("jpeg"),
            Terminal::Pdf => Some("pdfcairo"),
            Terminal::Svg => Some("svg"),
            Terminal::Dumb => Some("dumb"),
        }
    }

    /// Returns true for raster and document terminals that must write to a file
    pub fn requires_file(self) -> bool {
        matches!(
            self,
            Terminal::Png | Terminal::Jpeg | Terminal::Pdf | Terminal::Svg
        )
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::None => write!(f, "none"),
            Terminal::Qt => write!(f, "qt"),
            Terminal::Png => write!(f, "png"),
            Terminal::Jpeg => write!(f, "jpeg"),
            Terminal::Pdf => write!(f, "pdf"),
            Terminal::Svg => write!(f, "svg"),
            Terminal::Dumb => write!(f, "dumb"),
        }
    }
}

/// Line that terminates an inline data block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum EndOfData {
    #[default]
    Eod,
    /// gnuplot's classic single-letter terminator
    E,
    Eof,
}

impl EndOfData {
    pub fn as_str(self) -> &'static str {
        match self {
            EndOfData::Eod => "EOD",
            EndOfData::E => "e",
            EndOfData::Eof => "EOF",
        }
    }
}

impl fmt::Display for EndOfData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
