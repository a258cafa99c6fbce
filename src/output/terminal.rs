// Colored terminal output for stage results and similarity previews.
//
// This module handles all terminal-specific formatting. The main.rs command
// handlers delegate here.

use colored::Colorize;

use crate::embedding::similarity::SimilarityTable;
use crate::pipeline::{Stage, StageOutcome, StageStatus};

/// Display the result of a single stage run from its own subcommand.
pub fn display_stage_outcome(stage: Stage, outcome: &StageOutcome) {
    match outcome {
        StageOutcome::Completed { summary, outputs } => {
            println!("{} {}: {}", "✓".green().bold(), stage.name().bold(), summary);
            for path in outputs {
                println!("    {}", path.display().to_string().dimmed());
            }
        }
        StageOutcome::Skipped { reason } => {
            println!("{} {}: skipped ({})", "~".yellow(), stage.name().bold(), reason);
        }
    }
}

/// Display the per-stage report of a batch run.
pub fn display_run_report(report: &[(Stage, StageStatus)]) {
    println!("\n{}", format!("=== Pipeline Report ({} stages) ===", report.len()).bold());
    println!();

    for (stage, status) in report {
        let (marker, detail) = match status {
            StageStatus::Completed { summary, .. } => ("ok".green(), summary.clone()),
            StageStatus::Skipped { reason } => ("skipped".yellow(), reason.clone()),
            StageStatus::Failed { error } => ("failed".red().bold(), error.clone()),
            StageStatus::Blocked { by } => ("blocked".dimmed(), format!("waiting on {by}")),
        };
        println!(
            "  {:<20} {:<8} {}",
            stage.name(),
            marker,
            super::truncate_chars(&detail, 100)
        );
    }
    println!();

    let failed = report
        .iter()
        .filter(|(_, s)| matches!(s, StageStatus::Failed { .. }))
        .count();
    let blocked = report
        .iter()
        .filter(|(_, s)| matches!(s, StageStatus::Blocked { .. }))
        .count();
    let completed = report.iter().filter(|(_, s)| s.is_completed()).count();

    println!("  {} {} stages completed", "✓".green(), completed);
    if failed > 0 {
        println!("  {} {} stages failed", "!!".red().bold(), failed);
    }
    if blocked > 0 {
        println!("  {} {} stages blocked by an incomplete dependency", "~".yellow(), blocked);
    }
}

/// Show the characters whose meaning drifted most: lowest mean similarity
/// to the reference era first.
pub fn display_similarity_preview(table: &SimilarityTable, limit: usize) {
    if table.rows.is_empty() {
        println!("No aligned characters to compare.");
        return;
    }

    let mut ranked: Vec<(char, f64, &[f64])> = table
        .rows
        .iter()
        .map(|row| {
            let mean = if row.values.is_empty() {
                0.0
            } else {
                row.values.iter().sum::<f64>() / row.values.len() as f64
            };
            (row.character, mean, row.values.as_slice())
        })
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    println!(
        "\n{}",
        format!(
            "=== Most Changed Characters (vs {}, {} compared) ===",
            table.reference,
            table.rows.len()
        )
        .bold()
    );
    println!();

    let mut header = format!("  {:>4}  {:<4}  {:>6}", "Rank".dimmed(), "Char".dimmed(), "Mean".dimmed());
    for era in &table.eras {
        header.push_str(&format!("  {:>6}", era.as_str().dimmed()));
    }
    println!("{header}");
    println!("  {}", "-".repeat(20 + 8 * table.eras.len()).dimmed());

    for (i, (c, mean, values)) in ranked.iter().take(limit).enumerate() {
        let mut line = format!("  {:>4}. {:<4} {:>6}", i + 1, c, colorize_similarity(*mean));
        for v in values.iter() {
            line.push_str(&format!("  {:>6.3}", v));
        }
        println!("{line}");
    }
}

/// Color a similarity by how far the character drifted.
fn colorize_similarity(value: f64) -> colored::ColoredString {
    let text = format!("{value:.3}");
    if value < 0.2 {
        text.red().bold()
    } else if value < 0.5 {
        text.yellow()
    } else {
        text.green()
    }
}
