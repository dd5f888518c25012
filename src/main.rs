use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use primka_pdf::RenderConfig;

/// Export one goods receipt from a CSV/XLSX spreadsheet as a paginated PDF.
#[derive(Parser)]
#[command(name = "primka-pdf", version, about)]
struct Args {
    /// Input spreadsheet (.csv or .xlsx)
    input: PathBuf,

    /// Receipt number to export (digits only)
    #[arg(long = "primka")]
    receipt_number: String,

    /// Output PDF path (defaults to Primka_<number>.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Regular typeface to embed (TTF); built-in Helvetica otherwise
    #[arg(long)]
    font: Option<PathBuf>,

    /// Bold typeface to embed (TTF); built-in Helvetica-Bold otherwise
    #[arg(long)]
    font_bold: Option<PathBuf>,
}

fn read_font(path: &PathBuf) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("cannot read typeface {}: {e}", path.display()))
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if args.receipt_number.is_empty()
        || !args.receipt_number.chars().all(|c| c.is_ascii_digit())
    {
        eprintln!("error: receipt number must contain digits only");
        return ExitCode::FAILURE;
    }

    let mut config = RenderConfig::default();
    for (path, slot) in [
        (&args.font, &mut config.regular_font),
        (&args.font_bold, &mut config.bold_font),
    ] {
        if let Some(path) = path {
            match read_font(path) {
                Ok(bytes) => *slot = Some(bytes),
                Err(msg) => {
                    eprintln!("error: {msg}");
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("Primka_{}.pdf", args.receipt_number)));

    match primka_pdf::generate_pdf(&args.input, &args.receipt_number, &output, &config) {
        Ok(()) => {
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
