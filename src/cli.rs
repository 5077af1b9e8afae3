use clap::{Args, Parser, Subcommand};
use pipeproc::mode::Mode;
use pipeproc::transform::{BuiltinTransform, Op, TransformError};
use std::path::PathBuf;

/// Pipe Processor - Transform text from standard input or from the files of a directory
#[derive(Parser, Debug)]
#[command(version)]
pub struct PipeprocArgs {
    /// Log processing details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Transform standard input line by line
    Line {
        #[command(flatten)]
        transform: TransformArgs,
    },

    /// Transform each chunk of standard input as one piece of text
    Whole {
        #[command(flatten)]
        transform: TransformArgs,

        /// Read all of standard input before transforming it once
        #[arg(short, long)]
        buffered: bool,
    },

    /// Transform the matching files of a directory into another directory
    Files {
        /// Directory containing the files to process (not searched recursively)
        src_dir: PathBuf,

        /// Directory receiving the processed files, created if missing
        out_dir: PathBuf,

        /// Process files whose name ends with this suffix (repeatable)
        #[arg(short, long, required = true)]
        include: Vec<String>,

        /// Skip files whose name ends with this suffix, even if included (repeatable)
        #[arg(short = 'x', long)]
        exclude: Vec<String>,

        /// Hand the transform each line, or each file as a whole
        #[arg(short, long, value_enum, default_value_t = Mode::Line)]
        mode: Mode,

        #[command(flatten)]
        transform: TransformArgs,
    },
}

#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Transform to apply
    #[arg(short, long, value_enum, default_value_t = Op::Identity)]
    pub op: Op,

    /// Regex pattern for the grep and replace transforms
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Replacement text for the replace transform ($1 refers to a capture group)
    #[arg(short, long)]
    pub replacement: Option<String>,

    /// Enable case-sensitive pattern matching
    #[arg(short, long)]
    pub case_sensitive: bool,
}

impl TransformArgs {
    pub fn build(self) -> Result<BuiltinTransform, TransformError> {
        BuiltinTransform::from_args(self.op, self.pattern, self.replacement, self.case_sensitive)
    }
}
