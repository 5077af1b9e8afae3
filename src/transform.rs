// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::output::Outputter;
use enum_dispatch::enum_dispatch;
use regex::Regex;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("The '{op}' transform needs --pattern")]
    MissingPattern { op: &'static str },
}

/// Names of the built-in transforms, as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Op {
    /// Pass data through unchanged
    Identity,
    /// Convert to upper case
    Upper,
    /// Convert to lower case
    Lower,
    /// Strip leading and trailing whitespace
    Trim,
    /// Reverse the characters
    Reverse,
    /// Keep only data matching --pattern
    Grep,
    /// Replace every match of --pattern with --replacement
    Replace,
}

/// Built-in directives usable from the command line.
///
/// Dispatched statically through enum_dispatch; each variant turns one piece
/// of data into zero or one emissions.
#[enum_dispatch(Transform)]
#[derive(Debug)]
pub enum BuiltinTransform {
    Identity(IdentityTransform),
    Upper(UpperTransform),
    Lower(LowerTransform),
    Trim(TrimTransform),
    Reverse(ReverseTransform),
    Grep(GrepTransform),
    Replace(ReplaceTransform),
}

impl BuiltinTransform {
    /// Creates the transform selected on the command line
    ///
    /// # Returns
    /// * `Err(TransformError)` - the pattern is missing or is not a valid regex
    pub fn from_args(
        op: Op,
        pattern: Option<String>,
        replacement: Option<String>,
        case_sensitive: bool,
    ) -> Result<Self, TransformError> {
        let transform = match op {
            Op::Identity => BuiltinTransform::Identity(IdentityTransform),
            Op::Upper => BuiltinTransform::Upper(UpperTransform),
            Op::Lower => BuiltinTransform::Lower(LowerTransform),
            Op::Trim => BuiltinTransform::Trim(TrimTransform),
            Op::Reverse => BuiltinTransform::Reverse(ReverseTransform),
            Op::Grep => {
                let pattern = pattern.ok_or(TransformError::MissingPattern { op: "grep" })?;
                BuiltinTransform::Grep(GrepTransform {
                    regex: compile(pattern, case_sensitive)?,
                })
            }
            Op::Replace => {
                let pattern = pattern.ok_or(TransformError::MissingPattern { op: "replace" })?;
                BuiltinTransform::Replace(ReplaceTransform {
                    regex: compile(pattern, case_sensitive)?,
                    replacement: replacement.unwrap_or_default(),
                })
            }
        };
        Ok(transform)
    }
}

fn compile(pattern: String, case_sensitive: bool) -> Result<Regex, TransformError> {
    let regex_pattern = if case_sensitive {
        pattern.clone()
    } else {
        format!("(?i){}", pattern)
    };

    Regex::new(&regex_pattern).map_err(|source| TransformError::InvalidRegex { pattern, source })
}

#[enum_dispatch]
pub trait Transform {
    /// Emits the transformed `data` to `output`, or nothing to drop it
    fn apply(&self, data: &str, output: &mut dyn Outputter) -> io::Result<()>;
}

#[derive(Debug)]
pub struct IdentityTransform;

impl Transform for IdentityTransform {
    fn apply(&self, data: &str, output: &mut dyn Outputter) -> io::Result<()> {
        output.output(data)
    }
}

#[derive(Debug)]
pub struct UpperTransform;

impl Transform for UpperTransform {
    fn apply(&self, data: &str, output: &mut dyn Outputter) -> io::Result<()> {
        output.output(&data.to_uppercase())
    }
}

#[derive(Debug)]
pub struct LowerTransform;

impl Transform for LowerTransform {
    fn apply(&self, data: &str, output: &mut dyn Outputter) -> io::Result<()> {
        output.output(&data.to_lowercase())
    }
}

#[derive(Debug)]
pub struct TrimTransform;

impl Transform for TrimTransform {
    fn apply(&self, data: &str, output: &mut dyn Outputter) -> io::Result<()> {
        output.output(data.trim())
    }
}

#[derive(Debug)]
pub struct ReverseTransform;

impl Transform for ReverseTransform {
    fn apply(&self, data: &str, output: &mut dyn Outputter) -> io::Result<()> {
        output.output(&data.chars().rev().collect::<String>())
    }
}

/// Passes data through only when the regex matches somewhere in it
#[derive(Debug)]
pub struct GrepTransform {
    regex: Regex,
}

impl Transform for GrepTransform {
    fn apply(&self, data: &str, output: &mut dyn Outputter) -> io::Result<()> {
        if self.regex.is_match(data) {
            output.output(data)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ReplaceTransform {
    regex: Regex,
    replacement: String,
}

impl Transform for ReplaceTransform {
    fn apply(&self, data: &str, output: &mut dyn Outputter) -> io::Result<()> {
        output.output(&self.regex.replace_all(data, self.replacement.as_str()))
    }
}
