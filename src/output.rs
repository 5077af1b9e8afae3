// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::io::{self, Write};

/// Sink for the strings a directive emits.
///
/// The console implementation writes each emission immediately; the buffered
/// implementation keeps them in order until the owning task is done.
pub trait Outputter {
    fn output(&mut self, data: &str) -> io::Result<()>;
}

/// Writes every emission to the wrapped writer as its own line.
pub struct ConsoleOutputter<W: Write> {
    writer: W,
}

impl<W: Write> ConsoleOutputter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Outputter for ConsoleOutputter<W> {
    fn output(&mut self, data: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", data)?;
        self.writer.flush()
    }
}

/// Ordered accumulator for the output of one file task.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OutputBuffer {
    entries: Vec<String>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All emissions joined with LF, regardless of the source's line endings
    pub fn joined(&self) -> String {
        self.entries.join("\n")
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

impl Outputter for OutputBuffer {
    fn output(&mut self, data: &str) -> io::Result<()> {
        self.entries.push(data.to_string());
        Ok(())
    }
}
