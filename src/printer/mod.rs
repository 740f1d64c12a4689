//! Printers: the text surface every log replay and notice goes through.

use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::Path,
    sync::{Arc, Mutex},
};

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use tracing::warn;

pub struct Console {
    out: Box<dyn Write + Send>,
    color: bool,
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>, color: bool) -> Self {
        Self { out, color }
    }

    pub fn stdout() -> Self {
        let color = io::stdout().is_terminal();
        Self::new(Box::new(io::stdout()), color)
    }

    /// Console writing into a shared buffer; the handle reads what was printed.
    pub fn buffer() -> (Self, SharedBuffer) {
        let buf = SharedBuffer::default();
        (Self::new(Box::new(buf.clone()), false), buf)
    }

    pub fn line(&mut self, text: &str) {
        self.emit(format_args!("{text}"));
    }

    /// Echo of a tool invocation in verbose mode.
    pub fn notice(&mut self, text: &str) {
        if self.color {
            self.emit(format_args!("{}", text.cyan()));
        } else {
            self.line(text);
        }
    }

    pub fn error(&mut self, text: &str) {
        if self.color {
            self.emit(format_args!("{}", text.red()));
        } else {
            self.line(text);
        }
    }

    // Write errors are logged, never propagated.
    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{args}") {
            warn!(error = %e, "console write failed");
        }
    }

    /// Copy every line of `path` to the console.
    pub fn replay(&mut self, path: &Path) -> io::Result<()> {
        let reader = BufReader::new(File::open(path)?);
        for line in reader.split(b'\n') {
            let line = line?;
            self.out.write_all(&line)?;
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }
}

#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        let guard = self.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&guard).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.0.lock().unwrap_or_else(|e| e.into_inner());
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
