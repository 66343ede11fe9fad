use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

use genome_packer::pipeline::{self, Config};
use genome_packer::{seqio, strip_headers, Codec, TripletCodec};

#[derive(Parser)]
#[command(name = "genome-packer")]
#[command(about = "Strip headers from genome FASTA files and pack them three bases per byte")]
struct Cli {
    #[arg(short = 'v', long, global = true, help = "Verbose output showing progress")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every archive under the input directory.
    Run {
        #[arg(
            short = 'i',
            long,
            default_value = "genomes_raw",
            help = "Directory of genome archives (.zip files or extracted directories)"
        )]
        input: PathBuf,

        #[arg(short = 'o', long, default_value = "genomes", help = "Output directory")]
        output: PathBuf,

        #[arg(long, help = "Delete and recreate the output directory first")]
        overwrite: bool,

        #[arg(short = 't', long, default_value = "4", help = "Number of threads")]
        threads: usize,
    },
    /// Pack a single sequence file.
    Encode { input: PathBuf, output: PathBuf },
    /// Unpack a packed file back to bases.
    Decode { input: PathBuf, output: PathBuf },
    /// Remove header lines from a single sequence file.
    Strip { input: PathBuf, output: PathBuf },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_batch(config: Config) -> Result<()> {
    let report = pipeline::run(&config)
        .with_context(|| format!("cannot process {}", config.input_dir.display()))?;

    println!("Processing complete!");
    println!("Archives: {}", report.archives);
    println!("Files written: {}", report.files.len());
    for file in &report.files {
        println!("  {} -> {}", file.source.display(), file.packed.display());
    }
    if !report.is_success() {
        println!("Failed: {}", report.failures.len());
        for failure in &report.failures {
            println!("  {}: {}", failure.path.display(), failure.error);
        }
        bail!("{} item(s) failed", report.failures.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            input,
            output,
            overwrite,
            threads,
        } => run_batch(Config {
            input_dir: input,
            output_dir: output,
            overwrite,
            threads,
        }),
        Commands::Encode { input, output } => {
            let text = seqio::read_all(&input)
                .with_context(|| format!("cannot read {}", input.display()))?;
            let packed = TripletCodec
                .encode(&text)
                .with_context(|| format!("cannot encode {}", input.display()))?;
            seqio::write_all(&output, &packed)
                .with_context(|| format!("cannot write {}", output.display()))?;
            println!("Packed {} bytes into {} bytes", text.len(), packed.len());
            Ok(())
        }
        Commands::Decode { input, output } => {
            let packed = seqio::read_all(&input)
                .with_context(|| format!("cannot read {}", input.display()))?;
            let mut bases = TripletCodec
                .decode(&packed)
                .with_context(|| format!("cannot decode {}", input.display()))?;
            let count = bases.len();
            bases.push(b'\n');
            seqio::write_all(&output, &bases)
                .with_context(|| format!("cannot write {}", output.display()))?;
            println!("Decoded {count} bases");
            Ok(())
        }
        Commands::Strip { input, output } => {
            let reader = seqio::open_reader(&input)
                .with_context(|| format!("cannot read {}", input.display()))?;
            let writer = seqio::create_writer(&output)
                .with_context(|| format!("cannot write {}", output.display()))?;
            let stats = strip_headers(reader, writer)
                .with_context(|| format!("cannot strip {}", input.display()))?;
            println!("Kept {} lines, dropped {} headers", stats.kept, stats.dropped);
            Ok(())
        }
    }
}
