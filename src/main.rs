//! rtl-forge – render a bookkeeping report (JSON) to an Arabic-ready PDF.
//!
//! Usage:
//!   rtl-forge <report.json> [output.pdf] [--fonts fonts.json] [--csv out.csv]
//!             [--title "My Report"] [--landscape]
//!
//! If `output.pdf` is omitted the PDF is written next to the input file with
//! the same stem (e.g. `ledger.json` → `ledger.pdf`).

use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

use rtl_forge::config::{default_candidates, load_candidates};
use rtl_forge::pipeline::{export_csv, export_pdf, ExportConfig, PageOrientation};
use rtl_forge::provision::FontProvisioner;
use rtl_forge::report::Report;

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut fonts_path: Option<PathBuf> = None;
    let mut csv_path: Option<PathBuf> = None;
    let mut landscape = false;
    let mut title: Option<String> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--landscape" | "-l" => landscape = true,
            "--title" | "-t" => title = Some(require_value(&args[0], arg, iter.next())),
            "--fonts" | "-f" => {
                fonts_path = Some(PathBuf::from(require_value(&args[0], arg, iter.next())))
            }
            "--csv" => csv_path = Some(PathBuf::from(require_value(&args[0], arg, iter.next()))),
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let output = output_path.unwrap_or_else(|| {
        let mut o = input.clone();
        o.set_extension("pdf");
        o
    });

    let json = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };
    let report = match Report::from_json(&json) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error parsing report '{}': {e}", input.display());
            process::exit(1);
        }
    };

    let candidates = match &fonts_path {
        Some(path) => match load_candidates(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading font candidates: {e}");
                process::exit(1);
            }
        },
        None => default_candidates(),
    };

    let config = ExportConfig {
        title,
        orientation: if landscape {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        },
        candidates,
        ..ExportConfig::default()
    };

    let outcome = export_pdf(&report, &config, &FontProvisioner::default()).await;
    if !outcome.used_custom_font {
        eprintln!(
            "Warning: no Arabic font could be loaded; using {}. Arabic text will look broken.",
            outcome.font_family
        );
    }

    write_output(&output, &outcome.bytes);
    eprintln!(
        "Wrote '{}' ({} bytes, {} page{}, font {})",
        output.display(),
        outcome.bytes.len(),
        outcome.pages,
        if outcome.pages == 1 { "" } else { "s" },
        outcome.font_family
    );

    if let Some(csv_out) = csv_path {
        match export_csv(&report) {
            Ok(bytes) => {
                write_output(&csv_out, &bytes);
                eprintln!("Wrote '{}' ({} bytes)", csv_out.display(), bytes.len());
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}

fn require_value(prog: &str, flag: &str, value: Option<&String>) -> String {
    match value {
        Some(v) => v.clone(),
        None => {
            eprintln!("Missing value for {flag}");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn write_output(path: &Path, bytes: &[u8]) {
    // Create output directory if necessary.
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating output directory: {e}");
                process::exit(1);
            }
        }
    }
    if let Err(e) = fs::write(path, bytes) {
        eprintln!("Error writing '{}': {e}", path.display());
        process::exit(1);
    }
}

fn print_usage(prog: &str) {
    eprintln!("rtl-forge – Arabic-ready PDF reports");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <report.json> [output.pdf] [--fonts fonts.json] [--csv out.csv] [--title \"My Report\"] [--landscape]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <report.json>  Report with title, columns and typed rows");
    eprintln!("  [output.pdf]   Output path  (default: same stem as input with .pdf)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --fonts, -f    JSON list of font candidates (default: bundled Amiri / Noto Naskh, then remote)");
    eprintln!("  --csv          Also write the rows as UTF-8 CSV with BOM");
    eprintln!("  --title, -t    Document title in PDF metadata (default: report title)");
    eprintln!("  --landscape    Use landscape page orientation (A4 841×595 pt)");
    eprintln!("  --help         Print this message");
}
