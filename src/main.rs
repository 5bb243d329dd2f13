use anyhow;
use chrono;
use clap::{Parser, Subcommand};
use env_logger::fmt::Formatter;
use log::Record;
use newsclf::config::{ServeConfig, DEFAULT_HOST};
use newsclf::model::model_manager::ModelManager;
use newsclf::perf::{self, PerfConfig};
use newsclf::prediction::AppState;
use newsclf::report;
use newsclf::serve::run_server;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Serve a binary text classifier over HTTP and measure it
#[derive(Parser, Debug)]
#[command(
    name = "newsclf",
    version,
    about = "Serve a fake-news classifier over a small HTTP API",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// serve the classifier over web API
    Serve {
        /// host to listen to
        #[arg(short('H'), long, default_value = DEFAULT_HOST)]
        host: String,

        /// port to listen to
        #[arg(short, long, env = "PORT", default_value = "5001")]
        port: u16,

        /// directory holding basic_classifier.json and count_vectorizer.json.
        /// Defaults to $NEWSCLF_MODEL_DIR or the working directory.
        #[arg(short, long)]
        model_dir: Option<PathBuf>,

        /// classifier artifact, overrides the one in --model-dir
        #[arg(long)]
        classifier: Option<PathBuf>,

        /// vectorizer artifact, overrides the one in --model-dir
        #[arg(long)]
        vectorizer: Option<PathBuf>,

        /// keep diagnostic details out of error responses
        #[arg(long, action=clap::ArgAction::SetTrue)]
        hide_error_detail: bool,
    },

    /// measure /predict latency against a running server
    Perf {
        /// base URL of the server, e.g. http://127.0.0.1:5001
        #[arg(short, long, required = true)]
        base_url: String,

        /// timed calls per test case
        #[arg(short = 'n', long, default_value = "100")]
        calls: usize,

        /// prefix of the CSV files written
        #[arg(long, default_value = "pra5")]
        out_prefix: String,

        /// directory to write CSV files to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// pause between calls, in milliseconds
        #[arg(long, default_value = "75")]
        pause_ms: u64,
    },

    /// summarize *_latency.csv files written by `perf`
    Report {
        /// directory to scan
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .format(|buf: &mut Formatter, record: &Record| {
            writeln!(
                buf,
                "[{} {}] {}",
                chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                record.level(),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse(); // Automatically parses the arguments into the struct

    match cli.command {
        Commands::Serve {
            host,
            port,
            model_dir,
            classifier,
            vectorizer,
            hide_error_detail,
        } => {
            let config = ServeConfig {
                host,
                port,
                expose_error_detail: !hide_error_detail,
                ..ServeConfig::default()
            }
            .with_artifacts(model_dir, classifier, vectorizer);

            let models = ModelManager::load(&config.classifier_path, &config.vectorizer_path)?;
            let state = AppState::new(models).with_error_detail(config.expose_error_detail);
            run_server(config.host, config.port, state).await?;
        }

        Commands::Perf {
            base_url,
            calls,
            out_prefix,
            out_dir,
            pause_ms,
        } => {
            perf::run(PerfConfig {
                base_url,
                calls,
                out_prefix,
                out_dir,
                pause: Duration::from_millis(pause_ms),
            })
            .await?;
        }

        Commands::Report { dir } => {
            report::run(&dir)?;
        }
    }

    Ok(())
}
