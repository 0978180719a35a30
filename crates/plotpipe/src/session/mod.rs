//! The gnuplot session
//!
//! A [`Session`] owns the output sinks and the line style identifiers of one
//! gnuplot process. Every call writes its statements immediately and in call
//! order; nothing is ever read back.
//!
//! Drawing runs in three steps:
//!
//! 1. every series' buffer is derived (shape errors abort before any output);
//! 2. every series' serializer is prepared, writing its style definitions;
//! 3. one `plot '-' ..., '-' ...` command is written, followed by each series'
//!    inline data block and end-of-data line.
//!
//! Styles used by a draw are undefined again once the draw is complete.

mod config;
mod multiplot;

pub use config::*;
pub use multiplot::*;

use std::path::Path;

use tracing::{debug, info, span, trace, warn, Level};

use crate::core::{
    BroadcastSink, EndOfData, Emitter, GnuplotProcess, GridOptions, IdAllocator, Identifier,
    LineStyleSerializer, MemorySink, PlotError, PlotOptionsSerializer, Result, Serializer,
    Statement, Terminal, TextSink, TicksOptions, Vec2, WriterSink,
};
use crate::series::Series;

/// Statement writer for one gnuplot process
pub struct Session {
    sink: BroadcastSink,
    ids: IdAllocator,
    end_of_data: EndOfData,
    in_multiplot: bool,
    /// Bumped by every `begin_multiplot`
    layout_generation: u64,
    grid_styles: Vec<LineStyleSerializer>,
}

impl Session {
    /// Spawn gnuplot as configured and write to its standard input
    pub fn spawn(config: &SessionConfig) -> Result<Self> {
        let process = GnuplotProcess::spawn(&config.program, config.persist)?;
        info!(program = %config.program, persist = config.persist, "Started gnuplot session");
        Ok(Self::with_config(process, config))
    }

    /// Write to `sink` with the default configuration
    pub fn with_sink(sink: impl TextSink + 'static) -> Self {
        Self::with_config(sink, &SessionConfig::default())
    }

    /// Write to `sink`; the program and persist settings are not used
    pub fn with_config(sink: impl TextSink + 'static, config: &SessionConfig) -> Self {
        let mut broadcast = BroadcastSink::new();
        broadcast.push(sink);
        Self {
            sink: broadcast,
            ids: IdAllocator::new(config.id_base),
            end_of_data: config.end_of_data,
            in_multiplot: false,
            layout_generation: 0,
            grid_styles: Vec::new(),
        }
    }

    /// Write the script to a file instead of a process
    pub fn to_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_sink(WriterSink::create(path)?))
    }

    /// Capture the script in memory; the returned sink reads it back
    pub fn capture() -> (Self, MemorySink) {
        let capture = MemorySink::new();
        (Self::with_sink(capture.clone()), capture)
    }

    /// Also write every later statement to `sink`
    pub fn add_sink(&mut self, sink: impl TextSink + 'static) {
        self.sink.push(sink);
        debug!(sinks = self.sink.len(), "Added output sink");
    }

    /// Also write every later statement to the file at `path`
    pub fn write_commands_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let sink = WriterSink::create(path)?;
        self.add_sink(sink);
        Ok(())
    }

    pub fn end_of_data(&self) -> EndOfData {
        self.end_of_data
    }

    pub fn set_end_of_data(&mut self, end_of_data: EndOfData) {
        self.end_of_data = end_of_data;
    }

    /// Whether a multiplot layout is open
    pub fn is_multiplot(&self) -> bool {
        self.in_multiplot
    }

    /// Line style numbers currently held, ascending
    pub fn live_identifiers(&self) -> Vec<usize> {
        self.ids.live_values()
    }

    /// Write one raw statement
    pub fn send_line(&mut self, line: &str) -> Result<()> {
        self.emit(line)?;
        self.sink.flush()
    }

    /// `reset session`
    pub fn reset_session(&mut self) -> Result<()> {
        self.send_line("reset session")
    }

    /// Select the output terminal
    ///
    /// File-backed terminals (png, jpeg, pdf, svg) need `output`; the check runs
    /// before anything is written.
    pub fn set_terminal(
        &mut self,
        terminal: Terminal,
        output: Option<&Path>,
        size: Option<Vec2>,
    ) -> Result<()> {
        let span = span!(Level::INFO, "set_terminal", %terminal);
        let _enter = span.enter();

        if terminal.requires_file() && output.is_none() {
            return Err(PlotError::config_error(format!(
                "the {} terminal needs an output file",
                terminal
            )));
        }

        self.emit("unset term")?;
        self.emit("unset output")?;

        if let Some(name) = terminal.term_name() {
            let mut statement = Statement::starting_with(format!("set term {}", name));
            if let Some((width, height)) = size {
                statement.push(format!("size {}, {}", width, height));
            }
            self.emit(&statement.to_string())?;
        }

        match output {
            Some(path) if terminal.requires_file() => {
                self.emit(&format!("set output \"{}\"", path.display()))?;
            }
            Some(path) => {
                warn!(path = %path.display(), "Terminal does not write to a file; output ignored");
            }
            None => {}
        }

        info!(output = ?output, "Terminal selected");
        self.sink.flush()
    }

    /// `set title "..."`, or `unset title` for `None`
    pub fn set_title(&mut self, title: Option<&str>) -> Result<()> {
        self.set_text("title", title)
    }

    pub fn set_xlabel(&mut self, label: Option<&str>) -> Result<()> {
        self.set_text("xlabel", label)
    }

    pub fn set_ylabel(&mut self, label: Option<&str>) -> Result<()> {
        self.set_text("ylabel", label)
    }

    fn set_text(&mut self, keyword: &str, text: Option<&str>) -> Result<()> {
        match text {
            Some(text) => self.send_line(&format!("set {} \"{}\"", keyword, text)),
            None => self.send_line(&format!("unset {}", keyword)),
        }
    }

    /// Minor tick subdivisions, or no minor tics for `None`
    pub fn set_ticks(&mut self, ticks: Option<TicksOptions>) -> Result<()> {
        match ticks {
            Some(ticks) => {
                self.emit(&format!("set mxtics {}", ticks.minor_x_divider))?;
                self.emit(&format!("set mytics {}", ticks.minor_y_divider))?;
            }
            None => {
                self.emit("unset mxtics")?;
                self.emit("unset mytics")?;
            }
        }
        self.sink.flush()
    }

    /// Configure the grid, or remove it for `None`
    ///
    /// Every call starts with `unset grid`, so tic flags enabled by an earlier
    /// call are cleared before the new `set grid <tics>` statements. The grid's
    /// line styles stay defined until the next `set_grid` call.
    pub fn set_grid(&mut self, grid: Option<GridOptions>) -> Result<()> {
        let span = span!(Level::INFO, "set_grid", enabled = grid.is_some());
        let _enter = span.enter();

        self.emit("unset grid")?;

        let Some(grid) = grid else {
            self.grid_styles.clear();
            self.emit_released()?;
            return self.sink.flush();
        };

        let flags = [
            (grid.major.x, "xtics"),
            (grid.major.y, "ytics"),
            (grid.minor.x, "mxtics"),
            (grid.minor.y, "mytics"),
        ];
        for (enabled, tics) in flags {
            if enabled {
                self.emit(&format!("set grid {}", tics))?;
            }
        }
        self.emit(&format!("set grid {}", grid.level))?;

        let mut major = LineStyleSerializer::new(grid.major_line_style);
        let mut minor = LineStyleSerializer::new(grid.minor_line_style);
        major.prepare(self)?;
        minor.prepare(self)?;

        let mut major_ref = Statement::new();
        let mut minor_ref = Statement::new();
        major.print(&mut major_ref)?;
        minor.print(&mut minor_ref)?;
        self.emit(&format!("set grid {}, {}", major_ref, minor_ref))?;

        self.grid_styles = vec![major, minor];
        self.emit_released()?;
        debug!(live = self.ids.live_count(), "Grid configured");
        self.sink.flush()
    }

    /// `set origin x, y`, or `unset origin` for `None`
    pub fn set_origin(&mut self, origin: Option<Vec2>) -> Result<()> {
        match origin {
            Some((x, y)) => self.send_line(&format!("set origin {}, {}", x, y)),
            None => self.send_line("unset origin"),
        }
    }

    /// `set size x, y`, or `unset size` for `None`
    pub fn set_size(&mut self, size: Option<Vec2>) -> Result<()> {
        match size {
            Some((x, y)) => self.send_line(&format!("set size {}, {}", x, y)),
            None => self.send_line("unset size"),
        }
    }

    /// Open a `rows` x `cols` multiplot layout
    ///
    /// # Errors
    /// [`PlotError::Usage`] if a layout is already open or either dimension is zero.
    pub fn begin_multiplot(&mut self, rows: usize, cols: usize) -> Result<()> {
        if self.in_multiplot {
            return Err(PlotError::usage_error("multiplot layout already open"));
        }
        if rows == 0 || cols == 0 {
            return Err(PlotError::usage_error(format!(
                "multiplot layout {}x{} has no cells",
                rows, cols
            )));
        }
        self.send_line(&format!("set multiplot layout {}, {}", rows, cols))?;
        self.in_multiplot = true;
        self.layout_generation += 1;
        info!(rows, cols, generation = self.layout_generation, "Multiplot started");
        Ok(())
    }

    /// Close the open multiplot layout; does nothing if none is open
    pub fn end_multiplot(&mut self) -> Result<()> {
        if !self.in_multiplot {
            warn!("end_multiplot called with no open layout");
            return Ok(());
        }
        self.in_multiplot = false;
        self.send_line("unset multiplot")?;
        info!("Multiplot ended");
        Ok(())
    }

    /// Open a multiplot layout closed when the returned guard drops
    pub fn multiplot(&mut self, rows: usize, cols: usize) -> Result<MultiplotGuard<'_>> {
        self.begin_multiplot(rows, cols)?;
        Ok(MultiplotGuard::new(self))
    }

    /// Plot `series` with one `plot` command
    ///
    /// # Errors
    /// [`PlotError::Usage`] for an empty input, and any shape error of a series;
    /// both are reported before anything is written.
    pub fn draw<'a, I>(&mut self, series: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Series>,
    {
        let series: Vec<&Series> = series.into_iter().collect();
        let span = span!(Level::INFO, "draw", series = series.len());
        let _enter = span.enter();

        if series.is_empty() {
            warn!("draw called without series");
            return Err(PlotError::usage_error("nothing to draw"));
        }

        let buffers = series
            .iter()
            .map(|s| s.derive_buffer())
            .collect::<Result<Vec<_>>>()?;

        let prepare_span = span!(Level::DEBUG, "draw_prepare");
        let prepare_enter = prepare_span.enter();
        let mut serializers: Vec<PlotOptionsSerializer> = series
            .iter()
            .map(|s| PlotOptionsSerializer::new(s.derive_options()))
            .collect();
        for serializer in &mut serializers {
            serializer.prepare(self)?;
        }
        drop(prepare_enter);

        let mut parts = Vec::with_capacity(serializers.len());
        for serializer in &serializers {
            let mut part = Statement::starting_with("'-'");
            serializer.print(&mut part)?;
            parts.push(part.to_string());
        }
        self.emit(&format!("plot {}", parts.join(", ")))?;

        let sentinel = self.end_of_data.as_str();
        for buffer in &buffers {
            self.sink.write_str(&buffer.to_string())?;
            self.sink.write_str(sentinel)?;
            self.sink.write_str("\n")?;
            trace!(rows = buffer.rows(), cols = buffer.cols(), "Sent inline data");
        }

        drop(serializers);
        self.emit_released()?;
        info!(
            rows = buffers.iter().map(|b| b.rows()).sum::<usize>(),
            "Draw completed"
        );
        self.sink.flush()
    }

    /// Write one statement, after any pending release statements
    fn emit(&mut self, line: &str) -> Result<()> {
        self.emit_released()?;
        self.write_line(line)
    }

    fn emit_released(&mut self) -> Result<()> {
        for line in self.ids.drain_released() {
            self.write_line(&line)?;
        }
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        trace!(statement = line, "Sending");
        self.sink.write_str(line)?;
        self.sink.write_str("\n")
    }
}

impl Emitter for Session {
    fn send_line(&mut self, line: &str) -> Result<()> {
        self.emit(line)
    }

    fn allocate_id(&mut self) -> Result<Identifier> {
        self.emit_released()?;
        Ok(self.ids.allocate())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.grid_styles.clear();
        let result = self.emit_released().and_then(|_| self.sink.flush());
        if let Err(e) = result {
            warn!(error = %e, "Failed to flush session on drop");
        }
    }
}
