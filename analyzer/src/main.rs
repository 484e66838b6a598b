use anyhow::Context;
use clap::{Parser, Subcommand};
use retinacore::interface::Label;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use upload::loader::select_file;
use workflow::config::{AnalyzerConfig, PredictionMode};
use workflow::runner::Runner;

mod remote;
mod server;
mod upload;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Rule-based retina image analyzer")]
struct Args {
    /// Load analyzer settings from YAML
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the persisted history
    #[arg(long, global = true)]
    history_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze an image and append the result to the history
    Analyze {
        path: PathBuf,
        #[arg(long, value_enum)]
        mode: Option<PredictionMode>,
        /// Seed the random source so results replay
        #[arg(long)]
        seed: Option<u64>,
        /// Store the image as a data URL alongside the result
        #[arg(long, default_value_t = false)]
        embed_image: bool,
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// List stored results, newest first
    History {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Write the text report for a stored result
    Report {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Remove every stored result
    ClearHistory,
    /// Run the HTTP prediction service
    Serve {
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = if let Some(path) = &args.config {
        AnalyzerConfig::load(path)?
    } else {
        AnalyzerConfig::default()
    };
    if let Some(dir) = args.history_dir {
        config.history_dir = dir;
    }

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;

    match args.command {
        Command::Analyze {
            path,
            mode,
            seed,
            embed_image,
            delay_ms,
        } => {
            if let Some(mode) = mode {
                config.mode = mode;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(delay_ms) = delay_ms {
                config.delay_ms = delay_ms;
            }
            config.embed_image |= embed_image;

            let upload = select_file(&path)?;
            let runner = Runner::from_config(config).context("preparing analyzer")?;
            println!("Analyzing {} ...", upload.name);
            let entry = runtime
                .block_on(runner.analyze(upload))
                .with_context(|| format!("analyzing {}", path.display()))?;

            println!("Detected: {}", entry.label);
            println!(
                "Confidence: {:.2}%",
                entry.confidences.get(entry.label) * 100.0
            );
            for label in Label::ALL {
                println!(
                    "  {:<7} {:>6.2}%",
                    label.as_str(),
                    entry.confidences.get(label) * 100.0
                );
            }
            println!(
                "Saved as {} ({} entries in history)",
                entry.id,
                runner.history().len()
            );
            log::info!("session metrics {:?}", runner.metrics());
        }
        Command::History { limit } => {
            let runner = Runner::from_config(config).context("opening history")?;
            let history = runner.history();
            if history.is_empty() {
                println!("No previous results");
            }
            for entry in history.iter().take(limit) {
                println!(
                    "{}  {}  {:<7} {}",
                    entry.id,
                    entry.timestamp,
                    entry.label.as_str(),
                    entry.name
                );
            }
        }
        Command::Report { id, out } => {
            let runner = Runner::from_config(config).context("opening history")?;
            let report = runner
                .report(&id)
                .with_context(|| format!("no history entry with id {id}"))?;
            let dir = out.unwrap_or_else(|| PathBuf::from("."));
            fs::create_dir_all(&dir)
                .with_context(|| format!("creating report directory {}", dir.display()))?;
            let path = dir.join(&report.file_name);
            fs::write(&path, report.text)
                .with_context(|| format!("writing report {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        Command::ClearHistory => {
            let runner = Runner::from_config(config).context("opening history")?;
            runner.clear_history().context("clearing history")?;
            println!("History cleared.");
        }
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            let runner = Arc::new(Runner::from_config(config).context("preparing analyzer")?);
            let bind = runner.config().bind;
            runtime.block_on(server::serve(runner, bind))?;
        }
    }

    Ok(())
}
