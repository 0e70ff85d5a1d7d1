use anyhow::Context;
use humanizer_lib::services::TrainingSet;
use std::path::{Path, PathBuf};

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn default_out_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "pairs".to_string());
    input.with_file_name(format!("{}.processed.csv", stem))
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  cargo run --bin preprocess_pairs -- <pairs.csv> [--out <out.csv>] [--preview <n>]\n\nReads a technical,natural,source CSV and writes it back with URLs removed,\nspaces collapsed and indentation kept."
        );
        return Ok(());
    }

    let input = PathBuf::from(&args[1]);
    let out_path = parse_arg_value(&args, "--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_out_path(&input));
    let preview_n: usize = parse_arg_value(&args, "--preview")
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);

    let mut set = TrainingSet::new();
    set.load_csv(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    println!("Input: {}", input.display());
    println!("Pairs: {}", set.len());

    let processed = set.training_pairs();
    let changed = set
        .raw_pairs()
        .iter()
        .zip(&processed)
        .filter(|(raw, done)| raw.technical != done.technical || raw.natural != done.natural)
        .count();
    println!("Changed by preprocessing: {}", changed);

    for (i, pair) in processed.iter().take(preview_n).enumerate() {
        println!(
            "[{}] {} => {} ({})",
            i,
            preview(&pair.technical, 60),
            preview(&pair.natural, 60),
            pair.source.as_deref().unwrap_or("-")
        );
    }

    set.save_csv(&out_path)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    println!("Written: {}", out_path.display());

    Ok(())
}
