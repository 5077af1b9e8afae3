mod cli;

use anyhow::{Context, Result};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
use clap::Parser;
use cli::{Command, PipeprocArgs};
use pipeproc::batch::{FileContext, files};
use pipeproc::output::Outputter;
use pipeproc::processor::StreamProcessor;
use pipeproc::transform::Transform;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = PipeprocArgs::parse();

    // RUST_LOG wins over --verbose; stdout stays reserved for data
    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Opened once; a files run closes it for good
    let mut stream = StreamProcessor::stdin();

    match args.command {
        Command::Line { transform } => {
            let transform = transform.build()?;
            stream.line(|data, out| {
                transform.apply(data, out)?;
                Ok(())
            })?;
        }
        Command::Whole {
            transform,
            buffered,
        } => {
            let transform = transform.build()?;
            let directive = |data: &str, out: &mut dyn Outputter| -> Result<()> {
                transform.apply(data, out)?;
                Ok(())
            };
            if buffered {
                stream.whole_buffered(directive)?;
            } else {
                stream.whole(directive)?;
            }
        }
        Command::Files {
            src_dir,
            out_dir,
            include,
            exclude,
            mode,
            transform,
        } => {
            let transform = transform.build()?;
            let include: Vec<&str> = include.iter().map(String::as_str).collect();
            let exclude: Vec<&str> = exclude.iter().map(String::as_str).collect();

            let report = files(
                &mut stream,
                &src_dir,
                &out_dir,
                &include,
                &exclude,
                |ctx: &mut FileContext<'_>| {
                    ctx.apply(mode, &mut |data: &str, out: &mut dyn Outputter| -> Result<()> {
                        transform.apply(data, out)?;
                        Ok(())
                    })?;
                    Ok(())
                },
            );

            if let Some(failure) = report.failure {
                return Err(failure).with_context(|| {
                    format!("Batch aborted after {} file(s)", report.written.len())
                });
            }
        }
    }

    Ok(())
}
