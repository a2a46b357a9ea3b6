//! Convert a Hobo CSV export into Hobo CSV, JSON records or Parquet.
//!
//! ```text
//! hobo-export logger.csv --celsius --format parquet
//! hobo-export logger.csv --format json --start 2019-07-15 --end 2019-07-16 -o -
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use hobo_viewer::data::convert::convert_all_temperatures;
use hobo_viewer::data::export::{to_hobo_csv, to_json_records, write_parquet};
use hobo_viewer::data::filter::TimeWindow;
use hobo_viewer::{read_hobo_file, HoboDataset, LoadOptions};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
    Parquet,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Parquet => "parquet",
        }
    }

    /// The format a file extension names, if it is one we write.
    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Format::Csv),
            "json" => Some(Format::Json),
            "parquet" | "pq" => Some(Format::Parquet),
            _ => None,
        }
    }
}

/// Load a Hobo logger export and write it in another format
#[derive(Parser, Debug)]
#[command(name = "hobo-export")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Hobo CSV file to read
    input: PathBuf,

    /// Output path [default: <INPUT stem>_export.<format> next to INPUT];
    /// `-` writes CSV or JSON to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Parquet)]
    format: Format,

    /// Mirror every `Temp, °F` column into `Temp, °C`
    #[arg(long)]
    celsius: bool,

    /// First day to keep (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day to keep (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
}

/// Where the converted data goes.
#[derive(Debug, PartialEq, Eq)]
enum Output {
    Stdout,
    File(PathBuf),
}

/// What a run wrote.
#[derive(Debug)]
struct Summary {
    rows: usize,
    columns: usize,
    converted: usize,
    output: Output,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let summary = run(&cli, std::io::stdout().lock())?;

    let target = match &summary.output {
        Output::Stdout => "stdout".to_string(),
        Output::File(path) => path.display().to_string(),
    };
    log::info!(
        "{} -> {}: {} rows, {} columns, {} converted to °C",
        cli.input.display(),
        target,
        summary.rows,
        summary.columns,
        summary.converted
    );
    Ok(())
}

fn run<W: Write>(cli: &Cli, stdout: W) -> Result<Summary> {
    let output = resolve_output(cli)?;

    let mut dataset = read_hobo_file(&cli.input, &LoadOptions::default())?;
    let converted = if cli.celsius {
        convert_all_temperatures(&mut dataset)
            .with_context(|| format!("converting {}", cli.input.display()))?
    } else {
        0
    };

    let window = TimeWindow {
        start: cli.start,
        end: cli.end,
    };
    if !window.is_unbounded() {
        dataset = dataset.take_rows(&window.rows(&dataset));
    }

    match &output {
        Output::Stdout => write_to(&dataset, cli.format, stdout)?,
        Output::File(path) => write_file(&dataset, cli.format, path)
            .with_context(|| format!("exporting to {}", path.display()))?,
    }

    Ok(Summary {
        rows: dataset.len(),
        columns: dataset.columns.len(),
        converted,
        output,
    })
}

/// Pick the output for `cli`. `--format` decides the encoding, so an `-o`
/// path naming another known format is refused, as is any path that
/// resolves to the input file.
fn resolve_output(cli: &Cli) -> Result<Output> {
    let path = match &cli.output {
        Some(p) if p == Path::new("-") => {
            if cli.format == Format::Parquet {
                bail!("parquet output needs a file path, not stdout");
            }
            return Ok(Output::Stdout);
        }
        Some(p) => {
            let named = p
                .extension()
                .and_then(|e| e.to_str())
                .and_then(Format::from_extension);
            if let Some(named) = named.filter(|&f| f != cli.format) {
                bail!(
                    "{} has a .{} extension but --format is {}",
                    p.display(),
                    named.extension(),
                    cli.format.extension()
                );
            }
            p.clone()
        }
        None => {
            let stem = cli
                .input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "hobo".to_string());
            cli.input
                .with_file_name(format!("{stem}_export.{}", cli.format.extension()))
        }
    };

    if same_file(&path, &cli.input) {
        bail!(
            "refusing to overwrite the input file {}",
            cli.input.display()
        );
    }
    Ok(Output::File(path))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn write_to<W: Write>(dataset: &HoboDataset, format: Format, writer: W) -> Result<()> {
    match format {
        Format::Csv => to_hobo_csv(dataset, writer),
        Format::Json => to_json_records(dataset, writer),
        Format::Parquet => bail!("parquet output needs a file path, not stdout"),
    }
}

fn write_file(dataset: &HoboDataset, format: Format, path: &Path) -> Result<()> {
    if format == Format::Parquet {
        return write_parquet(dataset, path);
    }
    let file = File::create(path).context("creating output file")?;
    let mut writer = BufWriter::new(file);
    write_to(dataset, format, &mut writer)?;
    writer.flush().context("flushing output file")?;
    Ok(())
}
