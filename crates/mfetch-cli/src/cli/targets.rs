//! URL targets from the command line and/or an input file.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct Targets {
    /// URLs to request.
    pub urls: Vec<String>,

    /// Read more URLs from FILE, one per line ("-" for stdin). Blank lines
    /// and lines starting with '#' are skipped.
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,
}

impl Targets {
    /// Command-line URLs followed by input-file URLs. Empty is an error.
    pub fn collect(&self) -> Result<Vec<String>> {
        let mut urls = self.urls.clone();
        if let Some(path) = &self.input {
            urls.extend(read_input(path)?);
        }
        if urls.is_empty() {
            bail!("no URLs given (pass URLs or --input FILE)");
        }
        Ok(urls)
    }
}

fn read_input(path: &Path) -> Result<Vec<String>> {
    let reader: Box<dyn Read> = if path == Path::new("-") {
        Box::new(std::io::stdin())
    } else {
        Box::new(
            std::fs::File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?,
        )
    };
    parse_lines(BufReader::new(reader))
}

pub(crate) fn parse_lines(reader: impl BufRead) -> Result<Vec<String>> {
    let mut urls = Vec::new();
    for line in reader.lines() {
        let line = line.context("failed to read input")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        urls.push(line.to_string());
    }
    Ok(urls)
}
