//! Write-only destinations for script text
//!
//! The session never reads anything back; it only needs somewhere to append text
//! and a way to flush it. [`GnuplotProcess`] connects that to a running gnuplot.

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::rc::Rc;

use tracing::{debug, warn};

use super::error::{PlotError, Result};

/// Append-only text destination
pub trait TextSink {
    fn write_str(&mut self, text: &str) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

impl<S: TextSink + ?Sized> TextSink for Box<S> {
    fn write_str(&mut self, text: &str) -> Result<()> {
        (**self).write_str(text)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Adapter for any [`std::io::Write`]
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<BufWriter<File>> {
    /// Create (or truncate) a script file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Opened script file");
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TextSink for WriterSink<W> {
    fn write_str(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory capture whose clones share one buffer
///
/// Hand one clone to a session and keep another to read what was written.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Rc<RefCell<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far
    pub fn contents(&self) -> String {
        self.buffer.borrow().clone()
    }

    /// Captured text split into lines
    pub fn lines(&self) -> Vec<String> {
        self.buffer.borrow().lines().map(str::to_string).collect()
    }

    /// Take the captured text, leaving the buffer empty
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buffer.borrow_mut())
    }
}

impl TextSink for MemorySink {
    fn write_str(&mut self, text: &str) -> Result<()> {
        self.buffer.borrow_mut().push_str(text);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Fan-out of one stream to several sinks, in insertion order
#[derive(Default)]
pub struct BroadcastSink {
    sinks: Vec<Box<dyn TextSink>>,
}

impl BroadcastSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl TextSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl TextSink for BroadcastSink {
    fn write_str(&mut self, text: &str) -> Result<()> {
        for sink in &mut self.sinks {
            sink.write_str(text)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

/// A gnuplot child process fed through its standard input
///
/// Output and diagnostics from gnuplot go to the parent's stdout and stderr.
/// Dropping the handle closes the pipe and waits for the process to exit.
pub struct GnuplotProcess {
    program: String,
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
}

impl GnuplotProcess {
    /// Spawn `program`, adding `-persist` so plot windows outlive the pipe
    pub fn spawn(program: &str, persist: bool) -> Result<Self> {
        let mut command = Command::new(program);
        if persist {
            command.arg("-persist");
        }
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| PlotError::spawn_error(program, e))?;

        let stdin = child.stdin.take().ok_or_else(|| {
            PlotError::spawn_error(
                program,
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdin not captured"),
            )
        })?;

        debug!(program, persist, pid = child.id(), "Spawned gnuplot");
        Ok(Self {
            program: program.to_string(),
            child,
            stdin: Some(BufWriter::new(stdin)),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Close the pipe and wait for gnuplot to exit
    pub fn finish(mut self) -> Result<ExitStatus> {
        self.close_and_wait()
    }

    fn close_and_wait(&mut self) -> Result<ExitStatus> {
        if let Some(mut stdin) = self.stdin.take() {
            stdin.flush()?;
        }
        Ok(self.child.wait()?)
    }

    fn pipe(&mut self) -> Result<&mut BufWriter<ChildStdin>> {
        self.stdin.as_mut().ok_or_else(|| {
            PlotError::Io {
                source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gnuplot pipe closed"),
            }
        })
    }
}

impl TextSink for GnuplotProcess {
    fn write_str(&mut self, text: &str) -> Result<()> {
        self.pipe()?.write_all(text.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.pipe()?.flush()?;
        Ok(())
    }
}

impl Drop for GnuplotProcess {
    fn drop(&mut self) {
        match self.close_and_wait() {
            Ok(status) if !status.success() => {
                warn!(program = %self.program, %status, "gnuplot exited with failure");
            }
            Ok(_) => {}
            Err(e) => warn!(program = %self.program, error = %e, "Failed to close gnuplot"),
        }
    }
}
