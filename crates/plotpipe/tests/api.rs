//! Public API tests for plotpipe
//!
//! These drive a session against an in-memory sink and check the exact script text.

use std::path::Path;

use plotpipe::prelude::*;
use plotpipe::{render_script, AxisFlags, MemorySink, PlotOptions};

fn scenario_session() -> (Session, MemorySink) {
    Session::capture()
}

// =============================================================================
// Series derivation scenarios
// =============================================================================

#[test]
fn test_scenario_a_simple_series() {
    let series = Series::plot([1.0, 2.0, 3.0, 2.0, 1.0], SeriesOptions::new());
    let buffer = series.derive_buffer().unwrap();
    let rows: Vec<Vec<f64>> = buffer.iter_rows().map(|r| r.to_vec()).collect();
    assert_eq!(
        rows,
        vec![vec![1.0], vec![2.0], vec![3.0], vec![2.0], vec![1.0]]
    );
    assert_eq!(series.derive_options().cols, vec![0]);

    let script = render_script(&[series]).unwrap();
    assert!(script.starts_with("plot '-' using 1\n"));
}

#[test]
fn test_scenario_b_xy_series() {
    let series = Series::plot_xy([0.0, 1.0, 2.0], [5.0, 6.0, 7.0], SeriesOptions::new()).unwrap();
    let buffer = series.derive_buffer().unwrap();
    assert_eq!(buffer.cols(), 2);
    let rows: Vec<Vec<f64>> = buffer.iter_rows().map(|r| r.to_vec()).collect();
    assert_eq!(rows, vec![vec![0.0, 5.0], vec![1.0, 6.0], vec![2.0, 7.0]]);
    assert_eq!(series.derive_options().cols, vec![0, 1]);
}

#[test]
fn test_scenario_c_broadcast_error() {
    let data = ErrorBarData::new([1.0, 2.0]).with_y_err([0.5]);
    let series = Series::errorbar(data, SeriesOptions::new()).unwrap();
    let buffer = series.derive_buffer().unwrap();
    let rows: Vec<Vec<f64>> = buffer.iter_rows().map(|r| r.to_vec()).collect();
    assert_eq!(rows, vec![vec![0.0, 1.0, 0.5], vec![1.0, 2.0, 0.5]]);
    assert_eq!(series.derive_options().error_bars, Some(ErrorBarDir::Y));

    let script = render_script(&[series]).unwrap();
    assert_eq!(
        script,
        "plot '-' using 1:2:3 with yerrorbars\n0\t1\t0.5\n1\t2\t0.5\nEOD\n"
    );
}

#[test]
fn test_scenario_d_missing_errors() {
    let err = Series::errorbar(ErrorBarData::new([1.0, 2.0]), SeriesOptions::new()).unwrap_err();
    assert!(matches!(err, PlotError::MissingErrors));
    assert!(err.to_string().contains("requires errors on at least one axis"));
}

#[test]
fn test_scenario_e_raster_terminal_needs_file() {
    let (mut session, capture) = scenario_session();
    let err = session.set_terminal(Terminal::Png, None, None).unwrap_err();
    assert!(matches!(err, PlotError::Config { .. }));
    assert!(capture.contents().is_empty());
}

// =============================================================================
// Plot command layout
// =============================================================================

#[test]
fn test_full_fragment_order() {
    let style = LineStyle::new().with_color(Color::new(0, 0, 255)).with_width(2.0);
    let data = ErrorBarData::new([3.0]).with_x([1.0]).with_x_err([0.2]);
    let options = SeriesOptions::new()
        .with_title("fit")
        .with_line_style(style)
        .with_marker(Marker::new(PointType::SolidSquare).with_size(0.8))
        .with_axes(PlotAxes::X1Y2);
    let series = Series::errorbar(data, options).unwrap();

    let script = render_script(&[series]).unwrap();
    let lines: Vec<&str> = script.lines().collect();
    assert_eq!(
        lines,
        vec![
            "unset style line 50",
            "set style line 50 lw 2 lc rgb \"#000000ff\" pt 5 ps 0.8",
            "plot '-' using 1:2:3 with xerrorlines ls 50 title 'fit' axes x1y2",
            "1\t3\t0.2",
            "EOD",
            "unset style line 50",
        ]
    );
}

#[test]
fn test_styles_defined_before_plot_in_series_order() {
    let (mut session, capture) = scenario_session();
    let red = Series::plot(
        [1.0],
        SeriesOptions::new().with_line_style(LineStyle::new().with_color("red")),
    );
    let plain = Series::plot([2.0], SeriesOptions::new());
    let blue = Series::plot(
        [3.0],
        SeriesOptions::new().with_line_style(LineStyle::new().with_color("blue")),
    );
    session.draw([&red, &plain, &blue]).unwrap();

    assert_eq!(
        capture.lines(),
        vec![
            "unset style line 50",
            "set style line 50 lc \"red\"",
            "unset style line 51",
            "set style line 51 lc \"blue\"",
            "plot '-' using 1 with linespoints ls 50, '-' using 1, '-' using 1 with linespoints ls 51",
            "1",
            "EOD",
            "2",
            "EOD",
            "3",
            "EOD",
            "unset style line 50",
            "unset style line 51",
        ]
    );
}

#[test]
fn test_identifiers_reused_across_draws() {
    let (mut session, capture) = scenario_session();
    let series = Series::plot(
        [1.0],
        SeriesOptions::new().with_line_style(LineStyle::new()),
    );
    session.draw(&[series.clone()]).unwrap();
    capture.take();
    session.draw(&[series]).unwrap();
    assert_eq!(capture.lines()[0], "unset style line 50");
}

#[test]
fn test_serializer_direct_use() {
    let options = PlotOptions {
        cols: vec![1, 0],
        title: Some("swapped".to_string()),
        ..PlotOptions::default()
    };
    let serializer = plotpipe::PlotOptionsSerializer::new(options);
    let mut statement = plotpipe::Statement::new();
    plotpipe::Serializer::print(&serializer, &mut statement).unwrap();
    assert_eq!(statement.to_string(), "using 2:1 title 'swapped'");
}

// =============================================================================
// Grid
// =============================================================================

#[test]
fn test_grid_statement_order() {
    let (mut session, capture) = scenario_session();
    session
        .set_grid(Some(GridOptions::new(true, false)))
        .unwrap();
    assert_eq!(
        capture.lines(),
        vec![
            "unset grid",
            "set grid xtics",
            "set grid ytics",
            "set grid layerdefault",
            "unset style line 50",
            "set style line 50 lc rgb \"#c0000000\"",
            "unset style line 51",
            "set style line 51 lc rgb \"#e0000000\"",
            "set grid ls 50, ls 51",
        ]
    );
    assert_eq!(session.live_identifiers(), vec![50, 51]);
}

#[test]
fn test_grid_replaced_then_removed() {
    let (mut session, capture) = scenario_session();
    session.set_grid(Some(GridOptions::new(true, false))).unwrap();
    capture.take();

    let minor_only = GridOptions::new(false, AxisFlags::new(true, false)).with_level(GridLevel::Front);
    session.set_grid(Some(minor_only)).unwrap();
    assert_eq!(
        capture.take().lines().collect::<Vec<_>>(),
        vec![
            "unset grid",
            "set grid mxtics",
            "set grid front",
            "unset style line 52",
            "set style line 52 lc rgb \"#c0000000\"",
            "unset style line 53",
            "set style line 53 lc rgb \"#e0000000\"",
            "set grid ls 52, ls 53",
            "unset style line 50",
            "unset style line 51",
        ]
    );

    session.set_grid(None).unwrap();
    assert_eq!(
        capture.lines(),
        vec!["unset grid", "unset style line 52", "unset style line 53"]
    );
    assert!(session.live_identifiers().is_empty());
}

#[test]
fn test_grid_styles_not_reused_while_live() {
    let (mut session, capture) = scenario_session();
    session.set_grid(Some(GridOptions::new(true, true))).unwrap();
    capture.take();
    let series = Series::plot(
        [1.0],
        SeriesOptions::new().with_line_style(LineStyle::new().with_width(3.0)),
    );
    session.draw(&[series]).unwrap();
    assert_eq!(capture.lines()[1], "set style line 52 lw 3");
}

// =============================================================================
// Terminal, labels, ticks
// =============================================================================

#[test]
fn test_terminal_file_statements() {
    let (mut session, capture) = scenario_session();
    session
        .set_terminal(Terminal::Png, Some(Path::new("out.png")), Some((800.0, 600.0)))
        .unwrap();
    assert_eq!(
        capture.lines(),
        vec![
            "unset term",
            "unset output",
            "set term pngcairo size 800, 600",
            "set output \"out.png\"",
        ]
    );
}

#[test]
fn test_terminal_interactive_and_default() {
    let (mut session, capture) = scenario_session();
    session.set_terminal(Terminal::Qt, None, None).unwrap();
    session.set_terminal(Terminal::None, None, None).unwrap();
    assert_eq!(
        capture.lines(),
        vec![
            "unset term",
            "unset output",
            "set term qt",
            "unset term",
            "unset output",
        ]
    );
}

#[test]
fn test_ticks() {
    let (mut session, capture) = scenario_session();
    session.set_ticks(Some(TicksOptions::default())).unwrap();
    session
        .set_ticks(Some(TicksOptions {
            minor_x_divider: 2,
            minor_y_divider: 10,
        }))
        .unwrap();
    session.set_ticks(None).unwrap();
    assert_eq!(
        capture.lines(),
        vec![
            "set mxtics 5",
            "set mytics 5",
            "set mxtics 2",
            "set mytics 10",
            "unset mxtics",
            "unset mytics",
        ]
    );
}

#[test]
fn test_reset_and_raw_lines() {
    let (mut session, capture) = scenario_session();
    session.reset_session().unwrap();
    session.send_line("set key left").unwrap();
    assert_eq!(capture.lines(), vec!["reset session", "set key left"]);
}

// =============================================================================
// Multiplot
// =============================================================================

#[test]
fn test_multiplot_guard_emits_once() {
    let (mut session, capture) = scenario_session();
    {
        let mut layout = session.multiplot(2, 2).unwrap();
        layout.set_origin(Some((0.0, 0.0))).unwrap();
        layout.draw(&[Series::plot([1.0], SeriesOptions::new())]).unwrap();
        layout.end_multiplot().unwrap();
    }
    let lines = capture.lines();
    assert_eq!(lines.first().map(String::as_str), Some("set multiplot layout 2, 2"));
    assert_eq!(lines.iter().filter(|l| *l == "unset multiplot").count(), 1);
    assert!(!session.is_multiplot());
}

#[test]
fn test_multiplot_guard_leaves_later_layout_open() {
    let (mut session, capture) = scenario_session();
    {
        let mut layout = session.multiplot(1, 2).unwrap();
        layout.end_multiplot().unwrap();
        layout.begin_multiplot(2, 2).unwrap();
    }
    assert_eq!(
        capture.lines(),
        vec![
            "set multiplot layout 1, 2",
            "unset multiplot",
            "set multiplot layout 2, 2",
        ]
    );
    assert!(session.is_multiplot());

    assert!(session.multiplot(1, 1).is_err());
    session.end_multiplot().unwrap();
    assert!(!session.is_multiplot());
}

#[test]
fn test_multiplot_guard_finish_after_manual_reopen() {
    let (mut session, capture) = scenario_session();
    let mut layout = session.multiplot(1, 1).unwrap();
    layout.end_multiplot().unwrap();
    layout.begin_multiplot(3, 1).unwrap();
    layout.finish().unwrap();
    assert!(session.is_multiplot());
    assert_eq!(
        capture.lines().last().map(String::as_str),
        Some("set multiplot layout 3, 1")
    );
}

fn draw_cells(session: &mut Session, fail: bool) -> plotpipe::Result<()> {
    let mut layout = session.multiplot(1, 2)?;
    layout.draw(&[Series::plot([1.0], SeriesOptions::new())])?;
    if fail {
        let bad = Series::plot_xy([0.0], [1.0, 2.0], SeriesOptions::new())?;
        layout.draw(&[bad])?;
    }
    Ok(())
}

#[test]
fn test_multiplot_guard_on_error_path() {
    let (mut session, capture) = scenario_session();
    assert!(draw_cells(&mut session, true).is_err());
    assert!(capture.contents().ends_with("unset multiplot\n"));
    assert!(!session.is_multiplot());
}

#[test]
fn test_multiplot_guard_release() {
    let (mut session, capture) = scenario_session();
    {
        let mut layout = session.multiplot(1, 1).unwrap();
        layout.release();
    }
    assert!(session.is_multiplot());
    assert!(!capture.contents().contains("unset multiplot"));
    session.end_multiplot().unwrap();
    assert!(capture.contents().ends_with("unset multiplot\n"));
}

#[test]
fn test_multiplot_guard_finish() {
    let (mut session, capture) = scenario_session();
    let layout = session.multiplot(3, 1).unwrap();
    layout.finish().unwrap();
    assert_eq!(
        capture.lines(),
        vec!["set multiplot layout 3, 1", "unset multiplot"]
    );
}

// =============================================================================
// Sinks
// =============================================================================

#[test]
fn test_commands_mirrored_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.gp");

    let (mut session, capture) = scenario_session();
    session.set_title(Some("before")).unwrap();
    session.write_commands_to_file(&path).unwrap();
    session.set_title(Some("after")).unwrap();
    drop(session);

    assert_eq!(
        capture.contents(),
        "set title \"before\"\nset title \"after\"\n"
    );
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "set title \"after\"\n"
    );
}

#[test]
fn test_session_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plot.gp");
    {
        let mut session = Session::to_file(&path).unwrap();
        session.draw(&[Series::plot([7.0], SeriesOptions::new())]).unwrap();
    }
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "plot '-' using 1\n7\nEOD\n"
    );
}

#[test]
fn test_extra_sink_receives_same_text() {
    let (mut session, capture) = scenario_session();
    let mirror = MemorySink::new();
    session.add_sink(mirror.clone());
    session.draw(&[Series::plot([1.0, 2.0], SeriesOptions::new())]).unwrap();
    assert_eq!(capture.contents(), mirror.contents());
}
