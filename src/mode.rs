// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::{PipeError, Result};
use crate::output::Outputter;
use regex::Regex;
use std::sync::LazyLock;

/// Matches both LF and CRLF line endings.
static NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n").expect("newline pattern is valid"));

/// Splits a text blob into its lines.
///
/// Behaves like a plain split on `\r?\n`: a blob ending in a newline yields a
/// trailing empty entry, and an empty blob yields a single empty entry.
pub fn split_lines(text: &str) -> Vec<&str> {
    NEWLINE.split(text).collect()
}

/// How a directive is offered its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// Once per line of the blob
    #[default]
    Line,
    /// Once with the untouched blob
    Whole,
}

impl Mode {
    /// Runs `directive` over `text` according to this mode, handing it `output`
    /// for every emission.
    pub fn apply<F>(self, text: &str, output: &mut dyn Outputter, directive: &mut F) -> Result<()>
    where
        F: FnMut(&str, &mut dyn Outputter) -> anyhow::Result<()> + ?Sized,
    {
        match self {
            Mode::Line => {
                for line in split_lines(text) {
                    directive(line, &mut *output).map_err(PipeError::Directive)?;
                }
            }
            Mode::Whole => directive(text, &mut *output).map_err(PipeError::Directive)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputBuffer;
    use rstest::rstest;

    fn collect(mode: Mode, text: &str) -> Vec<String> {
        let mut buffer = OutputBuffer::new();
        let mut echo = |data: &str, out: &mut dyn Outputter| -> anyhow::Result<()> {
            out.output(data)?;
            Ok(())
        };
        mode.apply(text, &mut buffer, &mut echo).unwrap();
        buffer.into_entries()
    }

    #[rstest]
    #[case("a\nb\nc", vec!["a", "b", "c"])]
    #[case("a\r\nb\r\nc", vec!["a", "b", "c"])]
    #[case("a\r\nb\nc", vec!["a", "b", "c"])]
    #[case("no newline at all", vec!["no newline at all"])]
    #[case("a\nb\n", vec!["a", "b", ""])]
    #[case("a\r\n", vec!["a", ""])]
    #[case("\n\n", vec!["", "", ""])]
    #[case("", vec![""])]
    fn test_split_lines(#[case] input: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split_lines(input), expected);
    }

    #[test]
    fn test_split_lines_keeps_lone_carriage_return() {
        // Only a CR directly before LF is part of a line ending
        assert_eq!(split_lines("Quark\rRom\r\nNog"), vec!["Quark\rRom", "Nog"]);
    }

    #[rstest]
    #[case("Sisko\r\nKira\r\nDax\r\n")]
    #[case("Odo\nWorf\r\nBashir")]
    #[case("Garak")]
    fn test_no_carriage_return_survives_line_endings(#[case] input: &str) {
        assert!(split_lines(input).iter().all(|line| !line.ends_with('\r')));
    }

    #[test]
    fn test_line_mode_invokes_per_line_in_order() {
        assert_eq!(collect(Mode::Line, "a\nb\nc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_line_mode_preserves_trailing_empty_entry() {
        assert_eq!(collect(Mode::Line, "a\nb\n"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_whole_mode_invokes_once_with_untouched_blob() {
        let mut calls = Vec::new();
        let mut buffer = OutputBuffer::new();
        let mut record = |data: &str, _: &mut dyn Outputter| -> anyhow::Result<()> {
            calls.push(data.to_string());
            Ok(())
        };
        Mode::Whole.apply("a\nb", &mut buffer, &mut record).unwrap();

        assert_eq!(calls, vec!["a\nb"]);
    }

    #[test]
    fn test_directive_error_stops_line_mode() {
        let mut seen = Vec::new();
        let mut buffer = OutputBuffer::new();
        let result = Mode::Line.apply(
            "ok\nbad\nnever",
            &mut buffer,
            &mut |data: &str, _: &mut dyn Outputter| -> anyhow::Result<()> {
                seen.push(data.to_string());
                if data == "bad" {
                    anyhow::bail!("cannot handle '{data}'");
                }
                Ok(())
            },
        );

        assert!(matches!(result, Err(PipeError::Directive(_))));
        assert_eq!(seen, vec!["ok", "bad"]);
    }
}
