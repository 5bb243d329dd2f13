use anyhow::{self, Context};
use std::fs;
use std::path::{Path, PathBuf};

const LATENCY_SUFFIX: &str = "_latency.csv";
const ELAPSED_COLUMN: usize = 3;

/// Five-number summary of one latency series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Linearly interpolated percentile over sorted data, `p` in [0, 1].
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

impl BoxStats {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(BoxStats {
            count: sorted.len(),
            min: sorted[0],
            q1: percentile(&sorted, 0.25),
            median: percentile(&sorted, 0.5),
            q3: percentile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Reads the `elapsed_ms` column of a latency CSV, skipping the header.
pub fn load_latencies(path: &Path) -> anyhow::Result<Vec<f64>> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    content
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            let field = line.split(',').nth(ELAPSED_COLUMN).with_context(|| {
                format!("{path:?} line {}: missing elapsed_ms column", i + 2)
            })?;
            field
                .trim()
                .parse::<f64>()
                .with_context(|| format!("{path:?} line {}: bad elapsed_ms {field:?}", i + 2))
        })
        .collect()
}

/// Latency files in `dir`, sorted by path, paired with their case label.
pub fn collect_cases(dir: &Path) -> anyhow::Result<Vec<(String, PathBuf)>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing {dir:?}"))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(LATENCY_SUFFIX))
        })
        .collect();
    paths.sort();

    Ok(paths
        .into_iter()
        .filter_map(|p| {
            let name = p.file_name()?.to_str()?.strip_suffix(LATENCY_SUFFIX)?.to_string();
            Some((name, p))
        })
        .collect())
}

pub fn run(dir: &Path) -> anyhow::Result<()> {
    let cases = collect_cases(dir)?;
    if cases.is_empty() {
        println!("No *{LATENCY_SUFFIX} files found in {}", dir.display());
        return Ok(());
    }

    println!(
        "{:<16} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "case", "n", "min", "q1", "median", "q3", "max"
    );
    for (name, path) in cases {
        let latencies = load_latencies(&path)?;
        match BoxStats::from_samples(&latencies) {
            Some(s) => println!(
                "{:<16} {:>6} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
                name, s.count, s.min, s.q1, s.median, s.q3, s.max
            ),
            None => println!("{name:<16} {:>6}", 0),
        }
    }
    Ok(())
}
