//! Scores Command
//!
//! Extracts the rating table from a saved report file.

use std::fs;
use std::path::Path;

use console::style;

use crate::report::extract_scores;
use crate::types::Result;

pub fn run(file: &Path, format: &str) -> Result<()> {
    let text = fs::read_to_string(file)?;

    let Some(scores) = extract_scores(&text) else {
        println!(
            "{} No rating block found in {}",
            style("⚠").yellow(),
            file.display()
        );
        return Ok(());
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
        _ => {
            println!("{}", style("Ratings").bold());
            println!("{}", "─".repeat(40));
            for entry in &scores {
                println!("  {:<20} {:>3}", entry.category, entry.score);
            }
        }
    }

    Ok(())
}
