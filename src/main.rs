use std::fs;
use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use ocr_extractor_rust::{Config, logging, run};

/// Extracts a structured commerce record from raw OCR text candidates.
#[derive(Debug, Parser)]
#[command(name = "ocr-extractor", version, about)]
struct Cli {
    /// Candidate text files, one OCR candidate per file. With no files,
    /// candidates are read from stdin, separated by lines containing "---".
    files: Vec<String>,

    /// Skip the translation pass even for CJK text
    #[arg(long)]
    no_translate: bool,

    /// Pretty-print the JSON record
    #[arg(short, long)]
    pretty: bool,

    /// Extract only the named record fields (repeatable)
    #[arg(short = 'F', long = "field")]
    fields: Vec<String>,

    /// Merge settings from this TOML file on top of the defaults
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Verbose pipeline logging on stderr
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    let candidates = read_candidates(&cli)?;
    let config = Config {
        settings_path: cli.read_settings,
        no_translate: cli.no_translate,
        pretty: cli.pretty,
        fields: cli.fields,
    };
    let json = run(config, candidates).await?;
    println!("{json}");
    Ok(())
}

fn read_candidates(cli: &Cli) -> Result<Vec<String>> {
    if !cli.files.is_empty() {
        return cli
            .files
            .iter()
            .map(|path| {
                fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
            })
            .collect();
    }
    if io::stdin().is_terminal() {
        return Err(anyhow!(
            "no input: pass candidate files or pipe text on stdin"
        ));
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;
    Ok(split_candidates(&buffer))
}

/// Splits piped input into candidates on separator lines of three dashes.
fn split_candidates(input: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in input.lines() {
        if line.trim() == "---" {
            candidates.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    candidates.push(current.join("\n"));
    candidates.retain(|c| !c.trim().is_empty());
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_lines_split_candidates() {
        let input = "first block\nmore text\n---\nsecond block\n---\n";
        assert_eq!(
            split_candidates(input),
            vec!["first block\nmore text".to_string(), "second block".to_string()]
        );
    }

    #[test]
    fn whole_input_is_one_candidate_without_separators() {
        assert_eq!(split_candidates("just one\nblock"), vec!["just one\nblock"]);
    }
}
