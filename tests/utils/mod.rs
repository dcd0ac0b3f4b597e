// Integration test utilities
//
// Helpers for writing JSON Lines commit histories into temporary directories

#![allow(dead_code)]

use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

/// A history file living in its own temporary directory
pub struct History {
    pub dir: TempDir,
    pub path: PathBuf,
}

/// Write `(sha, title, metrics)` records as one JSON object per line
pub fn write_history(records: &[(String, String, Vec<(&str, f64)>)]) -> History {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.jsonl");

    let lines: Vec<String> = records
        .iter()
        .map(|(sha, title, metrics)| {
            let metrics: serde_json::Map<String, serde_json::Value> = metrics
                .iter()
                .map(|(name, value)| (name.to_string(), json!(value)))
                .collect();
            json!({ "sha": sha, "title": title, "metrics": metrics }).to_string()
        })
        .collect();
    std::fs::write(&path, lines.join("\n") + "\n").unwrap();

    History { dir, path }
}

/// 12 quiet lean4 commits followed by one jump of `jump` instructions
///
/// `build//instructions` alternates 1000 / 1010, so its quantile is 10.
/// `build//lines` grows steadily by 1 per commit, and by `lines_jump` on the
/// last commit.
pub fn lean4_history(jump: f64, lines_jump: f64) -> History {
    let mut records = Vec::new();
    for i in 0..12 {
        let instructions = if i % 2 == 0 { 1000.0 } else { 1010.0 };
        records.push((
            format!("sha{:02}", i),
            format!("Commit {}", i),
            vec![
                ("build//instructions", instructions),
                ("build//lines", 500.0 + i as f64),
            ],
        ));
    }
    records.push((
        "sha12".to_string(),
        "Big change".to_string(),
        vec![
            ("build//instructions", 1010.0 + jump),
            ("build//lines", 511.0 + lines_jump),
        ],
    ));
    write_history(&records)
}
