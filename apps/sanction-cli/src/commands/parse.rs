// parse.rs — Show what the tag parser finds in a text.

use std::path::PathBuf;

use clap::Args;
use sanction_directive::{scan, Directive};
use sanction_proposal::{build_from_report, MessageId};

#[derive(Args)]
pub struct ParseArgs {
    /// File to parse (defaults to stdin).
    #[arg(long)]
    file: Option<PathBuf>,
    /// Print the full parse report as JSON.
    #[arg(long)]
    json: bool,
}

pub fn execute(args: &ParseArgs) -> anyhow::Result<()> {
    let text = super::read_input(args.file.as_deref())?;
    let report = scan(&text);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_empty() {
        println!("No directives found.");
    }
    for directive in &report.directives {
        match directive {
            Directive::Summary { text } => println!("summary  {}", text),
            Directive::FileWrite(write) => println!(
                "write    {} ({} bytes){}",
                write.path,
                write.content.len(),
                write
                    .description
                    .as_deref()
                    .map(|d| format!(": {d}"))
                    .unwrap_or_default()
            ),
        }
    }
    for anomaly in &report.anomalies {
        println!("skipped  {}", anomaly);
    }

    if let Some(proposal) = build_from_report(MessageId(0), &report) {
        println!();
        println!("Proposal title: {}", proposal.title);
    }

    Ok(())
}
