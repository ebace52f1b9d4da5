pub mod audit;
pub mod message;
pub mod parse;
pub mod proposal;

use std::io::Read;
use std::path::Path;

use anyhow::Context;

/// Read `path`, or stdin when no path is given.
pub(crate) fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}
