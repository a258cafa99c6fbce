// Pipeline status display — which inputs exist and which outputs are built.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Local};
use colored::Colorize;

use crate::config::Config;
use crate::era::Era;

/// One line of the status listing.
#[derive(Debug, Clone)]
pub struct FileStatus {
    pub label: String,
    pub path: PathBuf,
    /// Size and modification time, if the file exists
    pub present: Option<(u64, Option<DateTime<Local>>)>,
}

impl FileStatus {
    fn probe(label: impl Into<String>, path: PathBuf) -> Self {
        let present = fs::metadata(&path).ok().map(|m| {
            let modified = m.modified().ok().map(DateTime::<Local>::from);
            (m.len(), modified)
        });
        Self {
            label: label.into(),
            path,
            present,
        }
    }
}

/// Inputs the pipeline reads: the raw corpus and the reference dictionaries.
pub fn inputs(config: &Config) -> Vec<FileStatus> {
    vec![
        FileStatus::probe("raw corpus", config.raw_corpus_dir()),
        FileStatus::probe("Unihan readings", config.unihan_path()),
        FileStatus::probe("gloss cache", config.gloss_cache_path()),
        FileStatus::probe("stroke table", config.strokes_path()),
        FileStatus::probe("Pingshui rhymes", config.pingshui_path()),
        FileStatus::probe("Guangyun table", config.guangyun_path()),
    ]
}

/// Every artifact the stages write.
pub fn outputs(config: &Config) -> Vec<FileStatus> {
    let mut files = Vec::new();
    for era in Era::ALL {
        files.push(FileStatus::probe(format!("{era} corpus"), config.era_corpus_path(era)));
    }
    for era in Era::ALL {
        files.push(FileStatus::probe(format!("{era} vocabulary"), config.vocab_path(era)));
    }
    files.push(FileStatus::probe("frequencies", config.frequencies_path()));
    files.push(FileStatus::probe("diversities", config.diversities_path()));
    files.push(FileStatus::probe("phonology", config.phonology_path()));
    files.push(FileStatus::probe("entropies", config.entropies_path()));
    files.push(FileStatus::probe(
        "frequency diversities",
        config.frequency_diversities_path(),
    ));
    for era in Era::ALL {
        files.push(FileStatus::probe(
            format!("{era} co-occurrence"),
            config.cooccurrence_path(era),
        ));
    }
    files.push(FileStatus::probe("CAPLD", config.capld_path()));
    for era in Era::ALL {
        files.push(FileStatus::probe(format!("{era} model"), config.model_path(era)));
    }
    for era in Era::ALL {
        files.push(FileStatus::probe(format!("{era} aligned"), config.aligned_path(era)));
    }
    files.push(FileStatus::probe("similarities", config.similarities_path()));
    files
}

/// Display pipeline status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    println!("Source directory: {}", display_dir(&config.source_dir));
    println!("Output directory: {}", display_dir(&config.output_dir));
    println!("Reference era: {}", config.reference_era);

    println!("\n{}", "Inputs".bold());
    for file in inputs(config) {
        print_line(&file);
    }

    let outputs = outputs(config);
    let built = outputs.iter().filter(|f| f.present.is_some()).count();
    println!("\n{} ({built}/{} built)", "Outputs".bold(), outputs.len());
    for file in &outputs {
        print_line(file);
    }

    if built == 0 {
        println!("\nNothing built yet. Run `diachron run` to build everything.");
    }
    Ok(())
}

fn display_dir(path: &Path) -> String {
    if path.is_dir() {
        path.display().to_string()
    } else {
        format!("{} (missing)", path.display())
    }
}

fn print_line(file: &FileStatus) {
    match &file.present {
        Some((size, modified)) => {
            let when = modified
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            println!(
                "  {} {:<24} {:>10}  {}",
                "✓".green(),
                file.label,
                format_bytes(*size),
                when.dimmed()
            );
        }
        None => {
            println!(
                "  {} {:<24} {}",
                "-".dimmed(),
                file.label,
                file.path.display().to_string().dimmed()
            );
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_outputs_reflect_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_dirs(dir.path().join("source"), dir.path().join("output"));
        assert!(outputs(&config).iter().all(|f| f.present.is_none()));

        std::fs::create_dir_all(config.data_dir()).unwrap();
        std::fs::write(config.frequencies_path(), "Character\n").unwrap();
        let built: Vec<String> = outputs(&config)
            .into_iter()
            .filter(|f| f.present.is_some())
            .map(|f| f.label)
            .collect();
        assert_eq!(built, vec!["frequencies".to_string()]);
    }
}
