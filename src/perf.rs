use anyhow;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde_json::json;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const TEST_CASES: [(&str, &str); 4] = [
    (
        "fake1",
        "BREAKING: Government confirms lizard people control the stock market.",
    ),
    (
        "fake2",
        "Scientists say chocolate cures all diseases in new groundbreaking study.",
    ),
    (
        "real1",
        "The central bank announced an interest rate decision on Thursday.",
    ),
    (
        "real2",
        "Local council approves new housing plan after public consultation.",
    ),
];

const WARMUP_TIMEOUT: Duration = Duration::from_secs(5);
const CALL_TIMEOUT: Duration = Duration::from_secs(10);
const CSV_HEADER: &str = "call_idx,start_ts,end_ts,elapsed_ms,http_status";

#[derive(Clone, Debug)]
pub struct PerfConfig {
    pub base_url: String,
    pub calls: usize,
    pub out_prefix: String,
    pub out_dir: PathBuf,
    pub pause: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallStatus {
    Http(u16),
    Transport,
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallStatus::Http(code) => write!(f, "{code}"),
            CallStatus::Transport => f.write_str("ERR"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallRecord {
    pub call_idx: usize,
    pub start_ts: f64,
    pub end_ts: f64,
    pub elapsed_ms: f64,
    pub status: CallStatus,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatencySummary {
    pub avg: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Cut points dividing `data` into `n` equal-probability groups.
///
/// Uses the exclusive method: the sample is treated as drawn from a population
/// whose extremes lie beyond the observed minimum and maximum.
pub fn quantiles(data: &[f64], n: usize) -> Vec<f64> {
    if data.is_empty() || n < 2 {
        return Vec::new();
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let len = sorted.len();
    if len == 1 {
        return vec![sorted[0]; n - 1];
    }

    let m = len + 1;
    (1..n)
        .map(|i| {
            let j = (i * m / n).clamp(1, len - 1);
            let delta = (i * m) as f64 - (j * n) as f64;
            (sorted[j - 1] * (n as f64 - delta) + sorted[j] * delta) / n as f64
        })
        .collect()
}

pub fn summarize(latencies: &[f64]) -> Option<LatencySummary> {
    if latencies.is_empty() {
        return None;
    }
    let avg = latencies.iter().sum::<f64>() / latencies.len() as f64;
    let p95 = quantiles(latencies, 20)[18];
    let p99 = quantiles(latencies, 100)[98];
    Some(LatencySummary { avg, p95, p99 })
}

fn epoch_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

pub fn write_csv(path: &Path, records: &[CallRecord]) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{CSV_HEADER}")?;
    for r in records {
        writeln!(
            writer,
            "{},{},{},{},{}",
            r.call_idx, r.start_ts, r.end_ts, r.elapsed_ms, r.status
        )?;
    }
    writer.flush()?;
    Ok(())
}

async fn post_predict(
    client: &reqwest::Client,
    url: &str,
    text: &str,
    timeout: Duration,
) -> reqwest::Result<u16> {
    let response = client
        .post(url)
        .json(&json!({ "text": text }))
        .timeout(timeout)
        .send()
        .await?;
    let status = response.status().as_u16();
    // drain the body so the timing covers the full response
    response.bytes().await?;
    Ok(status)
}

pub async fn run_case(
    client: &reqwest::Client,
    config: &PerfConfig,
    name: &str,
    text: &str,
) -> anyhow::Result<(PathBuf, Option<LatencySummary>)> {
    let url = format!("{}/predict", config.base_url.trim_end_matches('/'));

    if let Err(e) = post_predict(client, &url, text, WARMUP_TIMEOUT).await {
        warn!("warm-up call for {name} failed: {e}");
    }

    let progress_bar = ProgressBar::new(config.calls as u64);
    progress_bar.set_style(
        ProgressStyle::with_template("{msg:>6} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    progress_bar.set_message(name.to_string());

    let mut records = Vec::with_capacity(config.calls);
    for call_idx in 0..config.calls {
        let start_ts = epoch_seconds();
        let start = Instant::now();
        let status = match post_predict(client, &url, text, CALL_TIMEOUT).await {
            Ok(code) => CallStatus::Http(code),
            Err(_) => CallStatus::Transport,
        };
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        records.push(CallRecord {
            call_idx,
            start_ts,
            end_ts: epoch_seconds(),
            elapsed_ms,
            status,
        });
        progress_bar.inc(1);
        tokio::time::sleep(config.pause).await;
    }
    progress_bar.finish_and_clear();

    let csv_path = config
        .out_dir
        .join(format!("{}_{}_latency.csv", config.out_prefix, name));
    write_csv(&csv_path, &records)?;

    let latencies: Vec<f64> = records.iter().map(|r| r.elapsed_ms).collect();
    Ok((csv_path, summarize(&latencies)))
}

pub async fn run(config: PerfConfig) -> anyhow::Result<()> {
    let client = reqwest::Client::builder().build()?;
    info!("Target base URL: {}", config.base_url);

    for (name, text) in TEST_CASES {
        let (csv_path, summary) = run_case(&client, &config, name, text).await?;
        match summary {
            Some(s) => println!(
                "{name:>5}: avg={:.2} ms  p95={:.2} ms  p99={:.2} ms  -> {}",
                s.avg,
                s.p95,
                s.p99,
                csv_path.display()
            ),
            None => println!("{name:>5}: no calls recorded -> {}", csv_path.display()),
        }
    }
    println!("Done.");
    Ok(())
}
