//! letter-forge – command-line correspondence → PDF renderer.
//!
//! Usage:
//!   letter-forge <input.json> [output.pdf] [--layout out.json] [--title "Subject"]
//!   letter-forge --sample <name> [output.pdf]
//!
//! If `output.pdf` is omitted the PDF is written next to the input file with
//! the same stem (e.g. `letter.json` → `letter.pdf`).

use std::{env, fs, path::Path, path::PathBuf, process};

use letter_forge::pipeline::{generate_pdf, PipelineConfig};
use letter_forge::{samples, DocumentData};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut layout_path: Option<PathBuf> = None;
    let mut sample: Option<String> = None;
    let mut title: Option<String> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--title" | "-t" => title = Some(value_for(&mut iter, arg, &args[0])),
            "--layout" | "-l" => layout_path = Some(PathBuf::from(value_for(&mut iter, arg, &args[0]))),
            "--sample" | "-s" => sample = Some(value_for(&mut iter, arg, &args[0])),
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
                // With --sample the only positional is the output path.
                if positional == 0 && sample.is_none() {
                    input_path = Some(PathBuf::from(path));
                } else if output_path.is_none() {
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

    let (doc, default_output, default_title) = match (&sample, &input_path) {
        (Some(name), _) => match samples::by_name(name) {
            Some(doc) => (doc, PathBuf::from(format!("{name}.pdf")), name.clone()),
            None => {
                eprintln!(
                    "Error: unknown sample '{name}' (available: {})",
                    samples::NAMES.join(", ")
                );
                process::exit(1);
            }
        },
        (None, Some(input)) => {
            let doc = load_document(input);
            let mut o = input.clone();
            o.set_extension("pdf");
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Correspondence")
                .to_string();
            (doc, o, stem)
        }
        (None, None) => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };
    let output = output_path.unwrap_or(default_output);

    let config = PipelineConfig {
        title: title.unwrap_or(default_title),
        ..PipelineConfig::default()
    };

    match generate_pdf(&doc, &config) {
        Ok((bytes, layout)) => {
            write_file(&output, &bytes);
            if let Some(path) = &layout_path {
                write_file(path, layout.to_json().as_bytes());
            }
            let pages = layout.page_count();
            eprintln!(
                "Wrote '{}' ({} bytes, {} page{})",
                output.display(),
                bytes.len(),
                pages,
                if pages == 1 { "" } else { "s" }
            );
        }
        Err(e) => {
            eprintln!("Error generating PDF: {e}");
            process::exit(1);
        }
    }
}

fn value_for<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str, prog: &str) -> String {
    match iter.next() {
        Some(v) => v.clone(),
        None => {
            eprintln!("Missing value for {flag}");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn load_document(input: &Path) -> DocumentData {
    let json = match fs::read_to_string(input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", input.display());
            process::exit(1);
        }
    };
    match DocumentData::from_json(&json) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error parsing '{}': {e}", input.display());
            process::exit(1);
        }
    }
}

/// Write `bytes`, creating the parent directory if necessary.
fn write_file(path: &Path, bytes: &[u8]) {
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
    eprintln!("letter-forge – naval correspondence to PDF");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <input.json> [output.pdf] [--layout out.json] [--title \"Subject\"]");
    eprintln!("  {prog} --sample <name> [output.pdf]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <input.json>   Document data (seal images must be base64 data URIs)");
    eprintln!("  [output.pdf]   Output path  (default: same stem as input with .pdf)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --layout, -l   Also write the page layout as JSON");
    eprintln!("  --title, -t    Document title in PDF metadata (default: input filename stem)");
    eprintln!("  --sample, -s   Render a built-in sample: {}", samples::NAMES.join(", "));
    eprintln!("  --help         Print this message");
}
