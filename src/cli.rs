// Command-line interface for Oxilzo.
//
// Uses explicit subcommands and long-form options. Decompression is the
// only implemented mode; a `compress` subcommand exists so the invocation
// fails with a clear "unsupported" diagnostic instead of a parse error.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::io::{DecodeStats, IoError, decompress_file};
use crate::lzo1x::decoder::{DecodeError, Lzo1xDecoder};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Raw LZO1X stream decompressor.
#[derive(Parser, Debug)]
#[command(
    name = "oxilzo",
    version,
    about = "Raw LZO1X stream decompressor",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decompress an LZO1X stream.
    Decompress(DecompressArgs),
    /// Decode a file and print its statistics without writing output.
    Info(InfoArgs),
    /// Compress a file (not supported; this tool only decompresses).
    Compress(CompressArgs),
}

#[derive(Args, Debug)]
struct DecompressArgs {
    /// Input file (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output file (default: input without its `.lzo` extension).
    #[arg(value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

#[derive(Args, Debug)]
struct CompressArgs {
    /// Input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run the CLI. Exits the process with a non-zero status on failure.
pub fn run() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Cmd::Decompress(args) => cmd_decompress(&cli, args),
        Cmd::Info(args) => cmd_info(args),
        Cmd::Compress(args) => {
            let name = args
                .input
                .as_deref()
                .map_or_else(|| "stdin".into(), |p| p.display().to_string());
            Err(IoError::Decode(DecodeError::Unsupported(format!(
                "compressing {name}: only decompression is implemented"
            ))))
        }
    };

    if let Err(e) = result {
        eprintln!("oxilzo: {e}");
        process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// decompress
// ---------------------------------------------------------------------------

fn cmd_decompress(cli: &Cli, args: &DecompressArgs) -> Result<(), IoError> {
    let to_stdout = args.stdout || (args.input.is_none() && args.output.is_none());

    match (&args.input, to_stdout) {
        (Some(input), false) => {
            let output = match &args.output {
                Some(path) => path.clone(),
                None => default_output_path(input)?,
            };
            if output.exists() && !cli.force {
                return Err(IoError::Decode(DecodeError::InvalidArgument(format!(
                    "{} already exists (use --force to overwrite)",
                    output.display()
                ))));
            }

            let stats = decompress_file(input, &output)?;
            if !cli.quiet {
                report_stats(&input.display().to_string(), &stats, cli.verbose);
            }
            Ok(())
        }
        (Some(input), true) => {
            let file = File::open(input)?;
            let reader = BufReader::with_capacity(BUF_SIZE, file);
            stream_to_stdout(reader)
        }
        (None, _) => {
            if args.output.is_some() {
                return Err(IoError::Decode(DecodeError::InvalidArgument(
                    "an output file requires an input file (stdin decodes to stdout)".into(),
                )));
            }
            let stdin = io::stdin();
            stream_to_stdout(stdin.lock())
        }
    }
}

fn stream_to_stdout<R: Read>(reader: R) -> Result<(), IoError> {
    let stdout = io::stdout();
    let mut writer = BufWriter::with_capacity(BUF_SIZE, stdout.lock());
    let mut decoder = Lzo1xDecoder::new(reader);
    decoder.decode_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Strip a `.lzo` extension to derive the output path.
fn default_output_path(input: &std::path::Path) -> Result<PathBuf, IoError> {
    match input.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("lzo") => Ok(input.with_extension("")),
        _ => Err(IoError::Decode(DecodeError::InvalidArgument(format!(
            "cannot derive an output name for {}; pass one explicitly",
            input.display()
        )))),
    }
}

fn report_stats(name: &str, stats: &DecodeStats, verbose: u8) {
    let ratio = if stats.output_size > 0 {
        stats.compressed_size as f64 / stats.output_size as f64 * 100.0
    } else {
        0.0
    };
    eprintln!(
        "{name}: {} -> {} bytes ({ratio:.1}%)",
        stats.compressed_size, stats.output_size
    );
    if verbose > 0 && let Some(sha) = stats.output_sha256 {
        eprintln!("{name}: output sha256 {}", hex_string(&sha));
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// info
// ---------------------------------------------------------------------------

fn cmd_info(args: &InfoArgs) -> Result<(), IoError> {
    let file = File::open(&args.input)?;
    let compressed_size = file.metadata()?.len();
    let reader = BufReader::with_capacity(BUF_SIZE, file);

    let mut decoder = Lzo1xDecoder::new(reader);
    let mut sink = io::sink();
    let output_size = decoder.decode_to(&mut sink)?;

    println!("compressed:   {compressed_size} bytes");
    println!("decompressed: {output_size} bytes");
    if output_size > 0 {
        println!(
            "ratio:        {:.1}%",
            compressed_size as f64 / output_size as f64 * 100.0
        );
    }
    Ok(())
}
