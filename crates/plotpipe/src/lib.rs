//! plotpipe - Drive gnuplot from typed Rust plot descriptions
//!
//! A library that turns series, line styles, grids and layouts into gnuplot
//! script text with inline data blocks, and writes it to a gnuplot process, a
//! file, or memory.
//!
//! # Quick Start
//!
//! ```rust
//! use plotpipe::{render_script, Series, SeriesOptions};
//!
//! let series = Series::plot([1.0, 2.0, 3.0], SeriesOptions::new().with_title("ramp"));
//! let script = render_script(&[series]).unwrap();
//! assert!(script.starts_with("plot '-' using 1 title 'ramp'\n"));
//! assert!(script.ends_with("3\nEOD\n"));
//! ```
//!
//! # Advanced Usage
//!
//! A [`Session`] keeps gnuplot state across calls:
//!
//! ```rust
//! use plotpipe::prelude::*;
//!
//! let (mut session, capture) = Session::capture();
//! session.set_title(Some("Measurements")).unwrap();
//! session.set_grid(Some(GridOptions::new(true, false))).unwrap();
//!
//! let style = LineStyle::new().with_color("blue").with_width(1.5);
//! let data = ErrorBarData::new([1.0, 2.0]).with_y_err([0.5]);
//! let series = Series::errorbar(data, SeriesOptions::new().with_line_style(style)).unwrap();
//! session.draw(&[series]).unwrap();
//!
//! assert!(capture.contents().contains("with yerrorlines ls 52"));
//! ```
//!
//! Spawning a real gnuplot is one call:
//!
//! ```rust,no_run
//! use plotpipe::{Session, SessionConfig};
//!
//! let mut session = Session::spawn(&SessionConfig::from_env().unwrap()).unwrap();
//! session.send_line("plot sin(x)").unwrap();
//! ```
//!
//! Titles and labels are written inside quotes without escaping; text that
//! contains the quote character produces a broken statement.

pub mod core;
pub mod series;
pub mod session;

pub use core::*;
pub use series::*;
pub use session::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Color, DashType, EndOfData, ErrorBarDir, GridLevel, GridOptions, LineColor, LineStyle,
        Marker, PlotAxes, PlotError, PointType, Terminal, TicksOptions,
    };
    pub use crate::series::{ErrorBarData, Series, SeriesOptions};
    pub use crate::session::{MultiplotGuard, Session, SessionConfig};
}

/// Render a single `plot` command and its data for `series`
///
/// Uses a fresh in-memory session, so line styles start at 50 and are undefined
/// again at the end of the script.
///
/// # Example
/// ```rust
/// use plotpipe::{render_script, Series, SeriesOptions};
///
/// let a = Series::plot([1.0], SeriesOptions::new());
/// let b = Series::plot_xy([0.0, 1.0], [5.0, 6.0], SeriesOptions::new()).unwrap();
/// let script = render_script([&a, &b]).unwrap();
/// assert_eq!(script, "plot '-' using 1, '-' using 1:2\n1\nEOD\n0\t5\n1\t6\nEOD\n");
/// ```
pub fn render_script<'a>(series: impl IntoIterator<Item = &'a Series>) -> Result<String> {
    let (mut session, capture) = Session::capture();
    session.draw(series)?;
    drop(session);
    Ok(capture.take())
}
