// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transform piped-in text, or the files of a directory, with a caller
//! supplied directive.
//!
//! A directive sees its data either line by line or as a whole and emits
//! zero or more strings through an [`Outputter`]. Standard input is driven
//! through a [`StreamProcessor`] that echoes every emission to the console;
//! [`files`] runs a processor over each selected file and writes the
//! collected output next to it in an output directory.
//!
//! ```no_run
//! use pipeproc::{FileContext, StreamProcessor, files};
//!
//! let mut stream = StreamProcessor::stdin();
//! let report = files(&mut stream, "src", "out", &[".js"], &[".test.js"], |ctx: &mut FileContext<'_>| {
//!     ctx.line(|line, out| {
//!         out.output(line.trim_end())?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! });
//! assert!(report.is_complete());
//! ```

pub mod batch;
pub mod error;
pub mod mode;
pub mod output;
pub mod processor;
pub mod transform;

pub use batch::{BatchReport, FileContext, FileSelector, FileTask, files};
pub use error::{PipeError, Result};
pub use mode::{Mode, split_lines};
pub use output::{ConsoleOutputter, OutputBuffer, Outputter};
pub use processor::StreamProcessor;
