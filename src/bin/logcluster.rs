use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::process::ExitCode;
use std::sync::Once;
use std::time::{Duration, Instant};

use logcluster::config::{ClusterOpts, Threshold};
use logcluster::engine::Clusterer;
use logcluster::error::ClusterError;
use logcluster::normalize;
use logcluster::output::{self, Format};
use logcluster::patterns::Cluster;
use logcluster::scheduler::CancelFlag;

fn init_parallelism(threads: Option<usize>) {
    static START: Once = Once::new();
    START.call_once(|| {
        let n = threads.filter(|n| *n > 0).unwrap_or_else(num_cpus::get);
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    });
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let v: f64 = s.trim().parse().map_err(|_| format!("'{}' is not a number", s))?;
    Threshold::new(v).map(Threshold::value).map_err(|e| e.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "logcluster", version, about = "Group near-duplicate log lines by similarity")]
struct Cli {
    /// Similarity threshold in (0, 1]; lines must score above it to join a group
    #[arg(value_parser = parse_threshold)]
    threshold: f64,

    /// Input file (`-` for stdin)
    input: String,

    /// Output file (`-` or omitted for stdout)
    output: Option<String>,

    /// Output format: text | json
    #[arg(long = "format", default_value = "text")]
    format: Format,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(long = "threads")]
    threads: Option<usize>,

    /// Stop scheduling new phases after this many seconds
    #[arg(long = "timeout")]
    timeout_secs: Option<u64>,

    /// Additional exact-match stop words. May be repeated.
    #[arg(long = "stop-word")]
    stop_words: Vec<String>,

    /// Disable the per-bucket progress bar
    #[arg(long = "no-progress", default_value_t = false)]
    no_progress: bool,

    #[arg(long = "verbose", short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long = "quiet", short = 'q', default_value_t = false)]
    quiet: bool,
}

/// Raw bytes of the input. Decoding happens in `normalize::prepare_bytes`.
fn read_input(path: &str) -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if path == "-" {
        io::stdin().lock().read_to_end(&mut bytes).context("reading stdin")?;
    } else {
        File::open(path)
            .and_then(|mut f| f.read_to_end(&mut bytes))
            .with_context(|| format!("reading {}", path))?;
    }
    Ok(bytes)
}

fn write_output(path: Option<&str>, clusters: &[Cluster], format: Format) -> anyhow::Result<()> {
    match path {
        None | Some("-") => {
            let stdout = io::stdout();
            let mut w = BufWriter::new(stdout.lock());
            output::write_clusters(&mut w, clusters, format)?;
            w.flush()?;
        }
        Some(p) => {
            let f = File::create(p).with_context(|| format!("creating {}", p))?;
            let mut w = BufWriter::new(f);
            output::write_clusters(&mut w, clusters, format).with_context(|| format!("writing {}", p))?;
            w.flush()?;
        }
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let opts = ClusterOpts {
        threshold: cli.threshold,
        deadline: cli.timeout_secs.map(Duration::from_secs),
        progress: !cli.no_progress && !cli.quiet && atty::is(atty::Stream::Stderr),
        extra_stop_words: cli.stop_words.iter().map(|w| w.trim().to_lowercase()).collect(),
        ..Default::default()
    };

    let cancel = CancelFlag::new();
    {
        let c = cancel.clone();
        let _ = ctrlc::set_handler(move || c.cancel());
    }

    let started = Instant::now();
    let bytes = read_input(&cli.input)?;
    let (candidates, stats) = normalize::prepare_bytes(&bytes, &opts.extra_stop_words);
    if stats.invalid_utf8 > 0 {
        log::warn!("{}: replaced {} invalid UTF-8 sequence(s)", cli.input, stats.invalid_utf8);
    }
    log::info!("{} raw lines, {} candidates", stats.raw_lines, candidates.len());

    let clusterer = Clusterer::new(opts)?.with_cancel_flag(cancel);
    let clusters = match clusterer.cluster(candidates) {
        Ok(c) => c,
        Err(e @ (ClusterError::WorkerFailure { .. } | ClusterError::Incomplete { .. })) => {
            // keep what was clustered before the run stopped
            let partial = e.partial();
            log::warn!("writing {} partial clusters", partial.len());
            write_output(cli.output.as_deref(), partial, cli.format)?;
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    log::info!("{} groups in {:.3}s", clusters.len(), started.elapsed().as_secs_f64());
    write_output(cli.output.as_deref(), &clusters, cli.format)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logcluster::logging::init_logging(cli.verbose, cli.quiet);
    init_parallelism(cli.threads);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
