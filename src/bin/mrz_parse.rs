use anyhow::Context;
use clap::Parser;
use mrz_scan::domain::services::line_assembly::normalize_line;
use mrz_scan::domain::services::parser::{auto_detect, Validation};
use mrz_scan::ParsedMrz;
use std::io::Read;

#[derive(Parser)]
#[command(name = "mrz-parse")]
#[command(about = "Parse MRZ lines and print the fields as JSON")]
struct Args {
    /// Report fields even when check digits fail
    #[arg(long)]
    relaxed: bool,

    /// MRZ lines; read from stdin when none are given
    lines: Vec<String>,
}

impl Args {
    fn validation(&self) -> Validation {
        if self.relaxed {
            Validation::Relaxed
        } else {
            Validation::Strict
        }
    }
}

fn parse_lines(lines: &[String], validation: Validation) -> anyhow::Result<ParsedMrz> {
    let normalized: Vec<String> = lines.iter().map(|l| normalize_line(l)).collect();
    let refs: Vec<&str> = normalized.iter().map(String::as_str).collect();
    auto_detect(&refs, validation).context("could not parse MRZ")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut lines = args.lines.clone();
    if lines.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("failed to read MRZ lines from stdin")?;
        lines.extend(input.lines().map(str::to_string));
    }

    let mrz = parse_lines(&lines, args.validation())?;
    println!("{}", serde_json::to_string_pretty(&mrz)?);
    Ok(())
}
