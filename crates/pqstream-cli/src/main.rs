//! pqstream CLI: write, dump and inspect typed row streams.

use clap::{ArgAction, Parser, Subcommand};
use parquet::basic::{ConvertedType, Repetition, Type as ParquetType};
use parquet::schema::types::{Type, TypePtr};
use pqstream_core::{TimestampMicros, Value, WriterConfig};
use pqstream_io::{StreamReader, StreamWriter};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Row-group threshold used by `demo` unless configured otherwise.
const DEMO_ROW_GROUP_SIZE: u64 = 1000;

/// 2019-10-16T14:56:33.919738Z
const BASE_TIMESTAMP_MICROS: i64 = 1_571_237_793_919_738;

#[derive(Parser)]
#[command(name = "pqstream")]
#[command(about = "Typed row-at-a-time streams over Parquet files", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG applies otherwise
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the stock-ticker demo rows, then read them back
    Demo {
        /// Output Parquet file
        #[arg(short, long)]
        path: PathBuf,

        /// Number of rows to write
        #[arg(long, default_value_t = 200)]
        rows: u64,

        /// Row-group threshold in bytes (overrides config; 0 disables rotation)
        #[arg(long)]
        max_row_group_size: Option<u64>,

        /// Writer config YAML file (defaults to PQSTREAM_* environment variables)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print rows as JSON lines
    Dump {
        /// Parquet file to read
        #[arg(short, long)]
        path: PathBuf,

        /// Rows to skip before printing
        #[arg(long, default_value_t = 0)]
        skip: u64,

        /// Maximum rows to print
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Show the bound column descriptors
    Schema {
        /// Parquet file to inspect
        #[arg(short, long)]
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Demo {
            path,
            rows,
            max_row_group_size,
            config,
        } => run_demo(&path, rows, max_row_group_size, config.as_deref()),
        Commands::Dump { path, skip, limit } => dump_rows(&path, skip, limit),
        Commands::Schema { path } => show_schema(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        if let Some(stream_err) = e.downcast_ref::<pqstream_io::Error>() {
            for hint in stream_err.suggestions() {
                eprintln!("  hint: {}", hint);
            }
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug,parquet=warn"),
        _ => EnvFilter::new("trace,parquet=warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(config_path: Option<&Path>) -> Result<WriterConfig, Box<dyn std::error::Error>> {
    match config_path {
        Some(path) => {
            let yaml_content = fs::read_to_string(path)?;
            Ok(serde_yaml::from_str(&yaml_content)?)
        }
        None => Ok(WriterConfig::from_env()?),
    }
}

fn stock_schema() -> parquet::errors::Result<TypePtr> {
    let fields = vec![
        Arc::new(
            Type::primitive_type_builder("string_field", ParquetType::BYTE_ARRAY)
                .with_repetition(Repetition::REQUIRED)
                .with_converted_type(ConvertedType::UTF8)
                .build()?,
        ),
        Arc::new(
            Type::primitive_type_builder("char_field", ParquetType::FIXED_LEN_BYTE_ARRAY)
                .with_repetition(Repetition::REQUIRED)
                .with_length(4)
                .build()?,
        ),
        Arc::new(
            Type::primitive_type_builder("int32_field", ParquetType::INT32)
                .with_repetition(Repetition::REQUIRED)
                .with_converted_type(ConvertedType::INT_32)
                .build()?,
        ),
        Arc::new(
            Type::primitive_type_builder("double_field", ParquetType::DOUBLE)
                .with_repetition(Repetition::REQUIRED)
                .build()?,
        ),
        Arc::new(
            Type::primitive_type_builder("timestamp_field", ParquetType::INT64)
                .with_repetition(Repetition::REQUIRED)
                .with_converted_type(ConvertedType::TIMESTAMP_MICROS)
                .build()?,
        ),
    ];
    Ok(Arc::new(
        Type::group_type_builder("schema").with_fields(fields).build()?,
    ))
}

fn run_demo(
    path: &Path,
    rows: u64,
    max_row_group_size: Option<u64>,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;
    if let Some(size) = max_row_group_size {
        config.max_row_group_size = Some(size);
    } else if config.max_row_group_size.is_none() {
        config.max_row_group_size = Some(DEMO_ROW_GROUP_SIZE);
    }

    let mut writer = StreamWriter::create(path, stock_schema()?, &config)?;
    for i in 0..rows {
        let n = i as i64;
        writer
            .write(format!("Stk #{}", i))?
            .write(*b"ADD\0")?
            .write(3 * n as i32 - 17)?
            .write((n * n) as f64 - 2.23 * n as f64 + 2.131)?
            .write(TimestampMicros(BASE_TIMESTAMP_MICROS + 3_000_000 * n))?;
        writer.end_row()?;
    }
    writer.close()?;
    println!(
        "✓ Wrote {} rows in {} row groups to {}",
        rows,
        writer.num_row_groups(),
        path.display()
    );

    let mut reader = StreamReader::open(path)?;
    while !reader.eof() {
        let name: String = reader.read()?;
        let code: [u8; 4] = reader.read()?;
        let int_value: i32 = reader.read()?;
        let double_value: f64 = reader.read()?;
        let ts: TimestampMicros = reader.read()?;
        reader.end_row()?;
        println!(
            "{}\t{}\t{}\t{:.3}\t{}",
            name,
            String::from_utf8_lossy(&code).trim_end_matches('\0'),
            int_value,
            double_value,
            ts.0
        );
    }
    println!("✓ Read back {} rows", reader.current_row());
    Ok(())
}

fn dump_rows(path: &Path, skip: u64, limit: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = StreamReader::open(path)?;
    let names: Vec<String> = reader
        .schema()
        .columns()
        .iter()
        .map(|c| c.name.clone())
        .collect();

    reader.skip_rows(skip)?;
    let mut printed = 0;
    while !reader.eof() && limit.map_or(true, |l| printed < l) {
        let row = reader.read_row()?;
        let mut object = serde_json::Map::with_capacity(names.len());
        for (name, value) in names.iter().zip(row) {
            let json_value = value.as_ref().map_or(serde_json::Value::Null, to_json);
            object.insert(name.clone(), json_value);
        }
        println!("{}", serde_json::Value::Object(object));
        printed += 1;
    }
    Ok(())
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(v) => json!(v),
        Value::Int8(v) => json!(v),
        Value::Int16(v) => json!(v),
        Value::Int32(v) => json!(v),
        Value::Int64(v) => json!(v),
        Value::UInt8(v) => json!(v),
        Value::UInt16(v) => json!(v),
        Value::UInt32(v) => json!(v),
        Value::UInt64(v) => json!(v),
        Value::Float(v) => json!(v),
        Value::Double(v) => json!(v),
        Value::TimestampMillis(v) | Value::TimestampMicros(v) => json!(v),
        Value::Fixed(bytes) | Value::Bytes(bytes) => json!(bytes),
        Value::Utf8(s) => json!(s),
    }
}

fn show_schema(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let reader = StreamReader::open(path)?;
    println!("Stream Schema");
    println!("=============");
    println!(
        "{} columns, {} rows, {} row groups",
        reader.num_columns(),
        reader.num_rows(),
        reader.num_row_groups()
    );
    println!();
    for (i, column) in reader.schema().columns().iter().enumerate() {
        println!("  {}. {}", i, column);
    }
    Ok(())
}
