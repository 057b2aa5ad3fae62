use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use ssharp::{CompileError, transpile};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<ExitCode> {
  configure_tracing()?;
  let source = read_source()?;
  match transpile(&source) {
    Ok(output) => {
      print!("{output}");
      Ok(ExitCode::SUCCESS)
    }
    Err(CompileError::Lex) => {
      println!("Error, fail while tokenizing");
      Ok(ExitCode::FAILURE)
    }
    Err(err) => {
      debug!(%err, "compilation failed");
      print!("error");
      Ok(ExitCode::SUCCESS)
    }
  }
}

/// The program comes from the file named by the only argument, or stdin.
fn read_source() -> Result<String> {
  let mut args = std::env::args().skip(1);
  let path = args.next();
  if args.next().is_some() {
    bail!("Only one input file is supported");
  }
  if let Some(path) = path {
    return fs::read_to_string(&path).with_context(|| format!("Reading {path}"));
  }
  let mut buffer = String::new();
  io::stdin()
    .read_to_string(&mut buffer)
    .context("Reading stdin")?;
  Ok(buffer)
}

fn configure_tracing() -> Result<()> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  let subscriber = fmt::Subscriber::builder()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .finish();
  tracing::subscriber::set_global_default(subscriber).context("Installing tracing subscriber")
}
