//! Session configuration

use crate::core::{EndOfData, PlotError, Result, DEFAULT_ID_BASE};

/// Environment variable naming the gnuplot executable
pub const PROGRAM_ENV: &str = "PLOTPIPE_GNUPLOT";
/// Environment variable toggling `-persist`
pub const PERSIST_ENV: &str = "PLOTPIPE_PERSIST";

/// How a [`Session`](super::Session) talks to gnuplot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Executable spawned by [`Session::spawn`](super::Session::spawn)
    pub program: String,
    /// Keep plot windows open after the pipe closes
    pub persist: bool,
    /// Line written after every inline data block
    pub end_of_data: EndOfData,
    /// Smallest line style number the session allocates
    pub id_base: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            program: "gnuplot".to_string(),
            persist: true,
            end_of_data: EndOfData::default(),
            id_base: DEFAULT_ID_BASE,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn with_end_of_data(mut self, end_of_data: EndOfData) -> Self {
        self.end_of_data = end_of_data;
        self
    }

    pub fn with_id_base(mut self, id_base: usize) -> Self {
        self.id_base = id_base;
        self
    }

    /// Defaults overridden by `PLOTPIPE_GNUPLOT` and `PLOTPIPE_PERSIST`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the environment keys
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(program) = lookup(PROGRAM_ENV) {
            let program = program.trim();
            if program.is_empty() {
                return Err(PlotError::config_error(format!("{} is empty", PROGRAM_ENV)));
            }
            config.program = program.to_string();
        }

        if let Some(persist) = lookup(PERSIST_ENV) {
            config.persist = parse_flag(&persist).ok_or_else(|| {
                PlotError::config_error(format!(
                    "{} must be a boolean flag, got '{}'",
                    PERSIST_ENV, persist
                ))
            })?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
