// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::{PipeError, Result};
use crate::mode::Mode;
use crate::output::{ConsoleOutputter, Outputter};
use std::io::{self, ErrorKind, Read, Write};
use tracing::{debug, error};

const CHUNK_SIZE: usize = 64 * 1024;

/// Handle on the input stream and the console it echoes to.
///
/// The stream is consumed in chunks, each chunk being one independent text
/// blob. Once closed (see [`StreamProcessor::close`]) the handle cannot be
/// reopened and every stream operation fails with [`PipeError::StreamClosed`].
pub struct StreamProcessor<R: Read, W: Write> {
    reader: Option<R>,
    console: ConsoleOutputter<W>,
    chunk: Vec<u8>,
    /// Bytes held back from the previous chunk: a cut UTF-8 sequence or a trailing CR
    pending: Vec<u8>,
}

impl StreamProcessor<io::Stdin, io::Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin(), io::stdout())
    }
}

impl<R: Read, W: Write> StreamProcessor<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Some(reader),
            console: ConsoleOutputter::new(writer),
            chunk: vec![0; CHUNK_SIZE],
            pending: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Releases the input stream. This is one-way.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!("Input stream closed");
        }
        self.pending.clear();
    }

    /// Invokes `directive` once per line of every chunk, until end of stream
    pub fn line<F>(&mut self, mut directive: F) -> Result<()>
    where
        F: FnMut(&str, &mut dyn Outputter) -> anyhow::Result<()>,
    {
        self.run(Mode::Line, &mut directive)
    }

    /// Invokes `directive` once per chunk with the raw chunk text.
    ///
    /// Data arriving in several chunks yields several invocations; use
    /// [`StreamProcessor::whole_buffered`] to see the stream as one blob.
    pub fn whole<F>(&mut self, mut directive: F) -> Result<()>
    where
        F: FnMut(&str, &mut dyn Outputter) -> anyhow::Result<()>,
    {
        self.run(Mode::Whole, &mut directive)
    }

    /// Reads the stream to its end, then invokes `directive` exactly once
    pub fn whole_buffered<F>(&mut self, mut directive: F) -> Result<()>
    where
        F: FnMut(&str, &mut dyn Outputter) -> anyhow::Result<()>,
    {
        let mut text = String::new();
        while let Some(chunk) = self.next_chunk()? {
            text.push_str(&chunk);
        }
        Mode::Whole.apply(&text, &mut self.console, &mut directive)
    }

    pub fn into_writer(self) -> W {
        self.console.into_inner()
    }

    fn run<F>(&mut self, mode: Mode, directive: &mut F) -> Result<()>
    where
        F: FnMut(&str, &mut dyn Outputter) -> anyhow::Result<()>,
    {
        while let Some(chunk) = self.next_chunk()? {
            mode.apply(&chunk, &mut self.console, directive)?;
        }
        Ok(())
    }

    /// Reads the next decodable chunk; `None` marks the end of the stream.
    ///
    /// A trailing CR is held back with the next chunk so a CRLF pair cut by a
    /// read boundary still reads as one line ending. Read errors other than
    /// interruptions are logged and end the stream; later data is not read
    /// and the caller does not fail.
    fn next_chunk(&mut self) -> Result<Option<String>> {
        let reader = self.reader.as_mut().ok_or(PipeError::StreamClosed)?;

        loop {
            match reader.read(&mut self.chunk) {
                Ok(0) => {
                    if self.pending.is_empty() {
                        return Ok(None);
                    }
                    // Stream ended inside a multi-byte sequence or after a CR
                    let rest = String::from_utf8_lossy(&self.pending).into_owned();
                    self.pending.clear();
                    return Ok(Some(rest));
                }
                Ok(read) => {
                    self.pending.extend_from_slice(&self.chunk[..read]);
                    let mut cut = self.pending.len() - incomplete_suffix_len(&self.pending);
                    if cut > 0 && self.pending[cut - 1] == b'\r' {
                        cut -= 1;
                    }
                    if cut == 0 {
                        continue;
                    }
                    let text = String::from_utf8_lossy(&self.pending[..cut]).into_owned();
                    self.pending.drain(..cut);
                    return Ok(Some(text));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!(error = %e, "Input stream error");
                    return Ok(None);
                }
            }
        }
    }
}

/// Length of a trailing UTF-8 sequence that has been started but not finished.
fn incomplete_suffix_len(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0b1100_0000 == 0b1000_0000 {
            // Continuation byte, keep looking for the lead byte
            continue;
        }
        let width = match byte {
            0xF0..=0xFF => 4,
            0xE0..=0xEF => 3,
            0xC0..=0xDF => 2,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}
