//! Command-line interface for the plotpipe utility
//!
//! Turns whitespace-delimited numeric tables into gnuplot scripts, or pipes them
//! straight into a gnuplot process.

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

use plotpipe::core::logging::init_logging;
use plotpipe::{
    DataBuffer, EndOfData, GridOptions, LineStyle, Series, SeriesOptions, Session, SessionConfig,
    Terminal, WriterSink,
};

/// plotpipe - Turn numeric tables into gnuplot plots
#[derive(Parser)]
#[command(name = "plotpipe")]
#[command(about = "Turn numeric tables into gnuplot scripts and plots")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the gnuplot script for a table
    Script {
        #[command(flatten)]
        plot: PlotArgs,

        /// Output file for the script (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Plot a table with a spawned gnuplot
    Plot {
        #[command(flatten)]
        plot: PlotArgs,

        /// Close plot windows when gnuplot exits
        #[arg(long)]
        no_persist: bool,

        /// Also print the script to stdout
        #[arg(long)]
        echo: bool,

        /// gnuplot executable (overrides PLOTPIPE_GNUPLOT)
        #[arg(long)]
        gnuplot: Option<String>,
    },

    /// Show supported terminals
    Terminals {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Options shared by `script` and `plot`
#[derive(Args, Debug, Clone, PartialEq)]
pub struct PlotArgs {
    /// Input table, whitespace-delimited (use - for stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Treat the first column as x values
    #[arg(long)]
    pub x_column: bool,

    /// Distance between synthetic x values
    #[arg(long, conflicts_with = "x_column")]
    pub spacing: Option<f64>,

    /// Plot title
    #[arg(long)]
    pub title: Option<String>,

    /// x axis label
    #[arg(long)]
    pub xlabel: Option<String>,

    /// y axis label
    #[arg(long)]
    pub ylabel: Option<String>,

    /// Draw a major grid
    #[arg(long)]
    pub grid: bool,

    /// Connect points with lines
    #[arg(long)]
    pub lines: bool,

    /// Output terminal
    #[arg(
        long,
        value_enum,
        default_value_t = TerminalChoice::Default
    )]
    pub terminal: TerminalChoice,

    /// Image file for file-backed terminals
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Terminal size as WIDTHxHEIGHT
    #[arg(long)]
    pub size: Option<Size>,

    /// Inline data terminator
    #[arg(
        long,
        value_enum,
        default_value_t = SentinelChoice::Eod
    )]
    pub end_of_data: SentinelChoice,
}

/// Supported output terminals
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum TerminalChoice {
    /// Keep gnuplot's default terminal
    #[default]
    Default,
    Qt,
    Png,
    Jpeg,
    Pdf,
    Svg,
    Dumb,
}

impl From<TerminalChoice> for Terminal {
    fn from(value: TerminalChoice) -> Self {
        match value {
            TerminalChoice::Default => Terminal::None,
            TerminalChoice::Qt => Terminal::Qt,
            TerminalChoice::Png => Terminal::Png,
            TerminalChoice::Jpeg => Terminal::Jpeg,
            TerminalChoice::Pdf => Terminal::Pdf,
            TerminalChoice::Svg => Terminal::Svg,
            TerminalChoice::Dumb => Terminal::Dumb,
        }
    }
}

/// Inline data terminators
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum SentinelChoice {
    #[default]
    Eod,
    E,
    Eof,
}

impl From<SentinelChoice> for EndOfData {
    fn from(value: SentinelChoice) -> Self {
        match value {
            SentinelChoice::Eod => EndOfData::Eod,
            SentinelChoice::E => EndOfData::E,
            SentinelChoice::Eof => EndOfData::Eof,
        }
    }
}

/// Terminal size parsed from `WIDTHxHEIGHT`
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| *v > 0.0)
                .ok_or_else(|| format!("invalid size component '{}'", part))
        };
        Ok(Self {
            width: parse(width)?,
            height: parse(height)?,
        })
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One row of `terminals --json`
#[derive(Debug, Serialize)]
struct TerminalInfo {
    name: String,
    gnuplot_name: Option<&'static str>,
    needs_file: bool,
}

/// Main CLI application
pub struct PlotpipeApp {
    config: SessionConfig,
}

impl PlotpipeApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Create a new application instance with a session config
    pub fn with_config(config: SessionConfig) -> Self {
        Self { config }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over CLI flags
        let log_level_str = std::env::var("PLOTPIPE_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("PLOTPIPE_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("plotpipe v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Script { plot, output } => self.script_command(&plot, output, cli.verbose),
            Commands::Plot {
                plot,
                no_persist,
                echo,
                gnuplot,
            } => self.plot_command(&plot, no_persist, echo, gnuplot, cli.verbose),
            Commands::Terminals { json } => self.terminals_command(json, cli.verbose),
        }
    }

    /// Handle the script command
    fn script_command(&self, args: &PlotArgs, output: Option<PathBuf>, verbose: bool) -> Result<()> {
        let script = self.render(args, verbose)?;
        self.write_output(output, &script)
    }

    /// Build the full script for `args` in memory
    pub fn render(&self, args: &PlotArgs, verbose: bool) -> Result<String> {
        let table = self.read_table(args.input.clone())?;
        if verbose {
            eprintln!("Read {} rows x {} columns", table.rows(), table.cols());
        }

        let (mut session, capture) = Session::capture();
        self.emit_plot(&mut session, &table, args)?;
        drop(session);
        Ok(capture.take())
    }

    /// Handle the plot command
    fn plot_command(
        &self,
        args: &PlotArgs,
        no_persist: bool,
        echo: bool,
        gnuplot: Option<String>,
        verbose: bool,
    ) -> Result<()> {
        let table = self.read_table(args.input.clone())?;

        let mut config = self.config.clone();
        if no_persist {
            config.persist = false;
        }
        if let Some(program) = gnuplot {
            config.program = program;
        }
        if verbose {
            eprintln!("Spawning {} (persist: {})", config.program, config.persist);
        }

        let mut session = Session::spawn(&config)?;
        if echo {
            session.add_sink(WriterSink::new(io::stdout()));
        }
        self.emit_plot(&mut session, &table, args)?;
        drop(session);

        if verbose {
            eprintln!("Plotted {} rows", table.rows());
        }
        Ok(())
    }

    /// Handle the terminals command
    fn terminals_command(&self, json: bool, verbose: bool) -> Result<()> {
        if verbose {
            eprintln!("Listing supported terminals");
        }

        let infos: Vec<TerminalInfo> = Terminal::all()
            .iter()
            .map(|&terminal| TerminalInfo {
                name: terminal.to_string(),
                gnuplot_name: terminal.term_name(),
                needs_file: terminal.requires_file(),
            })
            .collect();

        let total = infos.len();
        if json {
            let listing = serde_json::json!({
                "terminals": infos,
                "total": total,
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        } else {
            println!("Supported terminals:");
            for info in &infos {
                let needs = if info.needs_file { "  (needs --image)" } else { "" };
                println!(
                    "  {:<6} - {}{}",
                    info.name,
                    info.gnuplot_name.unwrap_or("gnuplot default"),
                    needs
                );
            }
            println!();
            println!("Total: {} terminals", total);
        }

        Ok(())
    }

    /// Write settings, then one series per y column
    pub fn emit_plot(&self, session: &mut Session, table: &DataBuffer, args: &PlotArgs) -> Result<()> {
        session.set_end_of_data(args.end_of_data.into());

        let terminal = Terminal::from(args.terminal);
        if terminal != Terminal::None || args.image.is_some() {
            if terminal == Terminal::None {
                return Err(anyhow!("--image needs a file terminal such as --terminal png"));
            }
            let size = args.size.map(|s| (s.width, s.height));
            session.set_terminal(terminal, args.image.as_deref(), size)?;
        }

        if let Some(title) = &args.title {
            session.set_title(Some(title.as_str()))?;
        }
        if let Some(label) = &args.xlabel {
            session.set_xlabel(Some(label.as_str()))?;
        }
        if let Some(label) = &args.ylabel {
            session.set_ylabel(Some(label.as_str()))?;
        }
        if args.grid {
            session.set_grid(Some(GridOptions::new(true, false)))?;
        }

        let series = Self::build_series(table, args)?;
        session.draw(&series)?;
        Ok(())
    }

    /// One series per y column of `table`
    pub fn build_series(table: &DataBuffer, args: &PlotArgs) -> Result<Vec<Series>> {
        let column = |col: usize| -> Vec<f64> {
            table.iter_rows().map(|row| row[col]).collect()
        };

        let first_y = usize::from(args.x_column);
        if first_y >= table.cols() {
            return Err(anyhow!(
                "--x-column needs at least two columns, input has {}",
                table.cols()
            ));
        }
        let x = args.x_column.then(|| column(0));
        let labelled = table.cols() - first_y > 1;

        let mut series = Vec::with_capacity(table.cols() - first_y);
        for (index, col) in (first_y..table.cols()).enumerate() {
            let mut options = SeriesOptions::new();
            if let Some(spacing) = args.spacing {
                options = options.with_spacing(spacing);
            }
            if labelled {
                options = options.with_title(format!("column {}", col + 1));
            }
            if args.lines {
                options = options.with_line_style(LineStyle::new().copy_from(index as i32 + 1));
            }

            let y = column(col);
            let item = match &x {
                Some(x) => Series::plot_xy(x.clone(), y, options)?,
                None => Series::plot(y, options),
            };
            series.push(item);
        }
        Ok(series)
    }

    /// Read and parse the input table
    pub fn read_table(&self, input: Option<PathBuf>) -> Result<DataBuffer> {
        let content = self.read_input(input)?;
        let table =
            DataBuffer::parse(&content).map_err(|e| anyhow!("Failed to read table: {}", e))?;
        debug!(rows = table.rows(), cols = table.cols(), "Read input table");
        Ok(table)
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) => {
                if path.to_string_lossy() == "-" {
                    let mut content = String::new();
                    io::stdin().read_to_string(&mut content)?;
                    Ok(content)
                } else {
                    fs::read_to_string(&path).map_err(|e| {
                        anyhow!("Failed to read input file '{}': {}", path.display(), e)
                    })
                }
            }
            None => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                print!("{}", content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for PlotpipeApp {
    fn default() -> Self {
        Self::new()
    }
}
