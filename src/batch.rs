// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::{PipeError, Result};
use crate::mode::Mode;
use crate::output::{OutputBuffer, Outputter};
use crate::processor::StreamProcessor;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Suffix-based selection of directory entries.
///
/// A name is selected when it ends with at least one whitelist entry and with
/// no blacklist entry. Matching is a plain suffix test, so `.js` also matches
/// `foo.test.js` unless `.test.js` is blacklisted.
#[derive(Debug, Clone, Default)]
pub struct FileSelector {
    whitelist: Vec<String>,
    blacklist: Vec<String>,
}

impl FileSelector {
    pub fn new<W, B>(whitelist: &[W], blacklist: &[B]) -> Self
    where
        W: AsRef<str>,
        B: AsRef<str>,
    {
        Self {
            whitelist: whitelist.iter().map(|s| s.as_ref().to_string()).collect(),
            blacklist: blacklist.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        ends_with_any(name, &self.whitelist) && !ends_with_any(name, &self.blacklist)
    }

    /// Lists `src_dir` (one level) and pairs every selected entry with its
    /// destination under `out_dir`, ordered by file name.
    ///
    /// Directories are never selected, whatever their name.
    pub fn select(&self, src_dir: &Path, out_dir: &Path) -> Result<Vec<FileTask>> {
        let read_dir_error = |source: std::io::Error| PipeError::ReadDir {
            path: src_dir.to_path_buf(),
            source,
        };

        let mut tasks = Vec::new();
        for entry in fs::read_dir(src_dir).map_err(read_dir_error)? {
            let entry = entry.map_err(read_dir_error)?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();

            if !self.matches(&name) {
                continue;
            }
            if entry.file_type().map_err(read_dir_error)?.is_dir() {
                debug!(entry = %name, "Skipping directory");
                continue;
            }

            tasks.push(FileTask {
                source: entry.path(),
                destination: out_dir.join(&file_name),
            });
        }

        tasks.sort_by(|a, b| a.source.cmp(&b.source));
        Ok(tasks)
    }
}

fn ends_with_any(name: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

/// One selected file and where its output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// What a processor sees of one file: its text and the task's output buffer.
///
/// `line` and `whole` may be called any number of times; all of their output
/// lands in the same buffer.
pub struct FileContext<'a> {
    source: &'a Path,
    text: &'a str,
    buffer: &'a mut OutputBuffer,
}

impl<'a> FileContext<'a> {
    pub fn new(source: &'a Path, text: &'a str, buffer: &'a mut OutputBuffer) -> Self {
        Self {
            source,
            text,
            buffer,
        }
    }

    pub fn source(&self) -> &Path {
        self.source
    }

    pub fn text(&self) -> &str {
        self.text
    }

    /// Invokes `directive` once per line of the file, in order
    pub fn line<F>(&mut self, mut directive: F) -> Result<()>
    where
        F: FnMut(&str, &mut dyn Outputter) -> anyhow::Result<()>,
    {
        self.apply(Mode::Line, &mut directive)
    }

    /// Invokes `directive` once with the full file text
    pub fn whole<F>(&mut self, mut directive: F) -> Result<()>
    where
        F: FnMut(&str, &mut dyn Outputter) -> anyhow::Result<()>,
    {
        self.apply(Mode::Whole, &mut directive)
    }

    pub fn apply<F>(&mut self, mode: Mode, directive: &mut F) -> Result<()>
    where
        F: FnMut(&str, &mut dyn Outputter) -> anyhow::Result<()> + ?Sized,
    {
        mode.apply(self.text, &mut *self.buffer, directive)
    }
}

/// Outcome of a [`files`] run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Destinations written, in processing order
    pub written: Vec<PathBuf>,
    /// The error that aborted the batch, if any
    pub failure: Option<PipeError>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Transforms every selected file of `src_dir` into `out_dir`.
///
/// Closes `stream` first; stream mode is unavailable afterwards. The first
/// error aborts the rest of the batch: it is logged and returned in the
/// report, and files written before it stay written.
pub fn files<R, W, P>(
    stream: &mut StreamProcessor<R, W>,
    src_dir: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    ext_whitelist: &[&str],
    ext_blacklist: &[&str],
    mut processor: P,
) -> BatchReport
where
    R: Read,
    W: Write,
    P: FnMut(&mut FileContext<'_>) -> anyhow::Result<()>,
{
    stream.close();

    let selector = FileSelector::new(ext_whitelist, ext_blacklist);
    let mut report = BatchReport::default();
    let result = run_batch(
        &selector,
        src_dir.as_ref(),
        out_dir.as_ref(),
        &mut processor,
        &mut report,
    );

    match result {
        Ok(()) => info!(files = report.written.len(), "Batch complete"),
        Err(e) => {
            error!(error = %e, written = report.written.len(), "Batch aborted");
            report.failure = Some(e);
        }
    }
    report
}

fn run_batch<P>(
    selector: &FileSelector,
    src_dir: &Path,
    out_dir: &Path,
    processor: &mut P,
    report: &mut BatchReport,
) -> Result<()>
where
    P: FnMut(&mut FileContext<'_>) -> anyhow::Result<()>,
{
    let tasks = selector.select(src_dir, out_dir)?;
    info!(src = %src_dir.display(), files = tasks.len(), "Processing files");

    // Single level on purpose: a missing parent is an error
    if !out_dir.exists() {
        fs::create_dir(out_dir).map_err(|source| PipeError::CreateDir {
            path: out_dir.to_path_buf(),
            source,
        })?;
    }

    for task in &tasks {
        process_file(task, processor)?;
        report.written.push(task.destination.clone());
    }
    Ok(())
}

/// Loads, processes and saves one file
fn process_file<P>(task: &FileTask, processor: &mut P) -> Result<()>
where
    P: FnMut(&mut FileContext<'_>) -> anyhow::Result<()>,
{
    debug!(source = %task.source.display(), "Processing file");

    let bytes = fs::read(&task.source).map_err(|source| PipeError::ReadFile {
        path: task.source.clone(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|source| PipeError::Decode {
        path: task.source.clone(),
        source,
    })?;

    let mut buffer = OutputBuffer::new();
    let mut context = FileContext::new(&task.source, &text, &mut buffer);
    processor(&mut context).map_err(|e| match e.downcast::<PipeError>() {
        Ok(pipe_error) => pipe_error,
        Err(other) => PipeError::Directive(other),
    })?;

    fs::write(&task.destination, buffer.joined()).map_err(|source| PipeError::WriteFile {
        path: task.destination.clone(),
        source,
    })
}
