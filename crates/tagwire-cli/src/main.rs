//! `tagwire` CLI — write and read tagwire streams from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Build the nested sample tree, write it to example.txt, read it back
//! tagwire demo
//!
//! # Deeper tree, custom file, faster progress dots
//! tagwire demo --layers 14 --output sample.tw --interval-ms 100
//!
//! # Encode JSON to a tagwire file (stdin → file)
//! echo '{"a":1,"b":"x"}' | tagwire encode -o data.tw
//!
//! # Values wider than one digit need delimited fields
//! tagwire --field-mode delimited encode -i data.json -o data.tw
//!
//! # Decode a tagwire file back to pretty-printed JSON
//! tagwire decode -i data.tw
//! ```

mod logging;

use std::future::{self, Future};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tagwire_core::{CodecConfig, FieldMode, Mapping, Value};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "tagwire",
    version,
    about = "Write and read tagged self-describing value streams"
)]
struct Cli {
    #[command(flatten)]
    codec: CodecArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CodecArgs {
    /// Field layout: "compact" (one character per field) or "delimited"
    #[arg(long, global = true, default_value = "compact")]
    field_mode: FieldMode,

    /// Bytes queued before a write waits for the channel to drain
    #[arg(long, global = true, default_value_t = tagwire_core::config::DEFAULT_HIGH_WATER_MARK)]
    high_water_mark: usize,

    /// Deepest mapping nesting accepted when writing or reading
    #[arg(long, global = true, default_value_t = tagwire_core::config::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

impl CodecArgs {
    fn config(&self) -> CodecConfig {
        CodecConfig::default()
            .with_field_mode(self.field_mode)
            .with_high_water_mark(self.high_water_mark)
            .with_max_depth(self.max_depth)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write a nested sample tree, read it back, and compare
    Demo {
        /// Nesting layers of the sample tree
        #[arg(long, default_value_t = 10)]
        layers: i32,
        /// File to write and read
        #[arg(short, long, default_value = "example.txt")]
        output: PathBuf,
        /// Milliseconds between progress dots
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// Encode JSON into a tagwire stream
    Encode {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode a tagwire stream back to JSON
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    let config = cli.codec.config();

    match cli.command {
        Commands::Demo {
            layers,
            output,
            interval_ms,
        } => {
            let interval = Duration::from_millis(interval_ms.max(1));
            let original = sample(layers);

            println!("Writing");
            with_progress(
                tagwire_core::serialize_with(&output, &original, &config),
                interval,
            )
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;

            println!("Writing done, now reading");
            let read = with_progress(tagwire_core::deserialize_with(&output, &config), interval)
                .await
                .with_context(|| format!("Failed to read {}", output.display()))?;

            println!("Reading done");
            println!("check {}", original == read);
        }
        Commands::Encode { input, output } => {
            let json = read_input(input.as_ref())?;
            let json: serde_json::Value =
                serde_json::from_str(&json).context("Input is not valid JSON")?;
            let value = Value::try_from(json).context("Failed to convert JSON to a tagwire value")?;
            match output {
                Some(path) => tagwire_core::serialize_with(&path, &value, &config)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => tagwire_core::serialize_to(
                    tokio::io::stdout(),
                    &value,
                    &config,
                    future::pending(),
                )
                .await
                .context("Failed to write to stdout")?,
            }
        }
        Commands::Decode { input, output } => {
            let value = match input {
                Some(path) => tagwire_core::deserialize_with(&path, &config)
                    .await
                    .with_context(|| format!("Failed to decode {}", path.display()))?,
                None => {
                    tagwire_core::deserialize_from(tokio::io::stdin(), &config, future::pending())
                        .await
                        .context("Failed to decode stdin")?
                }
            };
            let pretty = serde_json::to_string_pretty(&value)?;
            write_output(output.as_ref(), &pretty)?;
        }
    }

    Ok(())
}

/// The nested sample tree: `{a: 1, b: 2, c: "long"}` at the bottom, and a
/// two-entry mapping of the two previous layers above it.
fn sample(layers: i32) -> Value {
    let mut m = Mapping::new();
    if layers <= 0 {
        m.insert("a", 1.0);
        m.insert("b", 2.0);
        m.insert("c", "long");
    } else {
        m.insert("0", sample(layers - 1));
        m.insert("1", sample(layers - 2));
    }
    Value::Mapping(m)
}

/// Drive `fut` to completion, printing a dot every `interval` until it is done.
async fn with_progress<F: Future>(fut: F, interval: Duration) -> F::Output {
    tokio::pin!(fut);
    let mut ticker = tokio::time::interval(interval);
    let mut stdout = io::stdout();
    let mut dots = 0_u64;
    loop {
        tokio::select! {
            out = &mut fut => {
                println!();
                info!(dots, "operation finished");
                return out;
            }
            _ = ticker.tick() => {
                dots += 1;
                print!(".");
                let _ = stdout.flush();
            }
        }
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
        }
        None => {
            println!("{content}");
        }
    }
    Ok(())
}
