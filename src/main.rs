use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use svgclean::{clean_with_options, Options};

#[derive(Parser)]
#[command(name = "svgclean")]
#[command(about = "Strips editor cruft from SVG files", long_about = None)]
struct Cli {
    /// Input file (use - for stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Output file (use - for stdout)
    #[arg(short, long, default_value = "-")]
    output: PathBuf,

    /// JSON options file, e.g. {"styleToAttributes": false}
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep repaired styles in the style attribute instead of
    /// turning them into presentation attributes
    #[arg(long)]
    keep_style: bool,

    /// Keep elements and attributes with this namespace prefix (repeatable)
    #[arg(long = "allow-prefix", value_name = "PREFIX")]
    allow_prefixes: Vec<String>,

    /// Print size comparison
    #[arg(short, long)]
    stats: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // Read input
    let input = if cli.input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&cli.input)?
    };

    let input_len = input.len();

    // Build options: config file first, flags on top
    let mut options = match &cli.config {
        Some(path) => Options::from_json(&fs::read_to_string(path)?)?,
        None => Options::default(),
    };
    if cli.keep_style {
        options.style_to_attributes = false;
    }
    for prefix in cli.allow_prefixes {
        options.namespaces = options.namespaces.allow(prefix);
    }
    log::debug!("options: {options:?}");

    let output = clean_with_options(&input, &options)?;
    let output_len = output.len();

    // Write output
    if cli.output.as_os_str() == "-" {
        io::stdout().write_all(output.as_bytes())?;
    } else {
        fs::write(&cli.output, &output)?;
    }

    if cli.stats {
        let saved = input_len.saturating_sub(output_len);
        let percent = if input_len > 0 {
            (saved as f64 / input_len as f64) * 100.0
        } else {
            0.0
        };
        eprintln!(
            "{} -> {} bytes ({:.1}% smaller)",
            input_len, output_len, percent
        );
    }

    Ok(())
}
