use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

use plotscript::{Plotter, RenderOptions};

#[derive(Parser)]
#[command(
    name = "plotscript",
    about = "Turn a list of segments, arrows and rectangles into a gnuplot script"
)]
struct Cli {
    /// Input file (reads from stdin if not provided)
    file: Option<PathBuf>,

    /// Plot title, replacing any `title` line in the input
    #[arg(long, short = 't')]
    title: Option<String>,

    /// Write the script to this file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Fail when a segment or arrow references an unregistered style
    #[arg(long)]
    strict: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let input = match &cli.file {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("ERROR: failed to read {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).unwrap_or_else(|e| {
                eprintln!("ERROR: failed to read stdin: {e}");
                std::process::exit(1);
            });
            buf
        }
    };

    let options = RenderOptions {
        title: cli.title,
        strict: cli.strict,
    };

    let plotter = match plotscript::load(&input, &options) {
        Ok(plotter) => plotter,
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    };

    let written = match &cli.output {
        Some(path) => write_file(&plotter, path),
        None => plotter.render(&mut io::stdout().lock()),
    };
    if let Err(e) = written {
        debug!(error = %e, "failed to write plot script");
        eprintln!("ERROR: {}", plotscript::Error::from(e));
        std::process::exit(1);
    }
}

fn write_file(plotter: &Plotter, path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    plotter.render(&mut out)?;
    out.flush()?;
    info!(path = %path.display(), "wrote plot script");
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();
}
