use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use prune_rs::common::io::read_file;
use prune_rs::common::{io_error_msg, tool_name};
use prune_rs::prune::{Pruner, Strategy, Width};
use prune_rs::simd::{Backend, Capabilities};
use prune_rs::stream::{PruneStats, prune_reader, prune_slice_parallel};

/// Output buffer for stdout.
const OUT_BUF: usize = 256 * 1024;

#[derive(Parser)]
#[command(
    name = "prune",
    version,
    about = "Remove blanks and control bytes (every byte <= 0x20) from each FILE",
    override_usage = "fprune [OPTION]... [FILE]..."
)]
struct Cli {
    /// Routing strategy: scalar, prefix, sort, cluster or scatter.
    /// prefix needs at most one blank run before the last kept byte of each
    /// 16-byte group; debug builds panic on other input
    #[arg(short = 's', long = "strategy", default_value = "sort")]
    strategy: Strategy,

    /// Batch width in bytes: 16, 32 or 64
    #[arg(short = 'w', long = "width", default_value = "16")]
    width: Width,

    /// Vector backend: portable, ssse3 or neon (default: best available)
    #[arg(short = 'b', long = "backend")]
    backend: Option<Backend>,

    /// Print the number of kept bytes instead of the bytes
    #[arg(short = 'c', long = "count")]
    count: bool,

    /// Log kernel selection and per-input statistics to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Input files; with no FILE, or when FILE is -, read standard input
    files: Vec<String>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("FPRUNE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

/// Capabilities for the requested backend. The scatter strategy defaults
/// to the portable backend, the only one with a scatter store.
fn capabilities(cli: &Cli) -> Capabilities {
    match cli.backend {
        Some(backend) => Capabilities::for_backend(backend),
        None if cli.strategy.needs_scatter() => Capabilities::portable(),
        None => Capabilities::detect(),
    }
}

/// Prunes one input into `out`. Returns the stats for `-c`.
fn prune_one(
    pruner: &Pruner,
    width: Width,
    filename: &str,
    count: bool,
    out: &mut impl Write,
) -> io::Result<PruneStats> {
    if filename == "-" {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        return if count {
            prune_reader(pruner, width, &mut input, &mut io::sink())
        } else {
            prune_reader(pruner, width, &mut input, out)
        };
    }

    let data = read_file(Path::new(filename))?;
    let kept = prune_slice_parallel(pruner, width, &data);
    if !count {
        out.write_all(&kept)?;
    }
    Ok(PruneStats {
        input: data.len() as u64,
        kept: kept.len() as u64,
        batches: (data.len() / width.lanes()) as u64,
    })
}

fn main() {
    prune_rs::common::reset_sigpipe();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let tool = tool_name(env!("CARGO_BIN_NAME"));

    let pruner = match Pruner::new(cli.strategy, capabilities(&cli)) {
        Ok(pruner) => pruner,
        Err(e) => {
            eprintln!("{}: {}", tool, e);
            process::exit(1);
        }
    };
    if !pruner.strategy().is_general() {
        tracing::warn!(
            strategy = %pruner.strategy(),
            "only correct when each 16-byte group has at most one blank run before its last kept byte"
        );
    }
    tracing::debug!(
        strategy = %pruner.strategy(),
        backend = %pruner.backend(),
        width = %cli.width,
        "kernel selected"
    );

    let files: Vec<String> = if cli.files.is_empty() {
        vec!["-".to_string()]
    } else {
        cli.files.clone()
    };

    let stdout = io::stdout();
    let mut out = BufWriter::with_capacity(OUT_BUF, stdout.lock());
    let mut total = PruneStats::default();
    let mut had_error = false;

    for filename in &files {
        match prune_one(&pruner, cli.width, filename, cli.count, &mut out) {
            Ok(stats) => total += stats,
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => process::exit(0),
            Err(e) => {
                let name = if filename == "-" {
                    "standard input"
                } else {
                    filename.as_str()
                };
                eprintln!("{}: {}: {}", tool, name, io_error_msg(&e));
                had_error = true;
            }
        }
    }

    if cli.count {
        let _ = writeln!(out, "{}", total.kept);
    }
    if let Err(e) = out.flush()
        && e.kind() != io::ErrorKind::BrokenPipe
    {
        eprintln!("{}: {}", tool, io_error_msg(&e));
        process::exit(1);
    }
    tracing::debug!(
        input = total.input,
        kept = total.kept,
        discarded = total.discarded(),
        batches = total.batches,
        "done"
    );

    if had_error {
        process::exit(1);
    }
}
