//! # Stego Binary Entry Point
//!
//! Command-line front end for hiding and recovering payloads.
//!
//! ## Usage
//!
//! ```bash
//! stego encode --image cover.jpg --output stego.png --text "Secret" --password pw
//! stego encode --image cover.png --output stego.png --file report.pdf --depth 2
//! stego decode --image stego.png --password pw
//! stego inspect --image stego.png
//! stego capacity --image cover.png --depth 2
//! ```
//!
//! Output images are always written as PNG so the embedded bits survive.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::{info, LevelFilter};

use lsb_stego::common::config::StegoConfig;
use lsb_stego::{inspect, payload_capacity, BitDepth, Payload, ServiceCore, StegoMetadata};

/// Command-line arguments for the stego binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (TOML format)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hide a message or file in an image
    Encode {
        /// Cover image (any format the image crate reads)
        #[arg(short, long)]
        image: PathBuf,
        /// Where to write the stego PNG
        #[arg(short, long)]
        output: PathBuf,
        /// Text message to hide
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,
        /// File to hide
        #[arg(long)]
        file: Option<PathBuf>,
        /// Encrypt the payload with this password
        #[arg(short, long)]
        password: Option<String>,
        /// Bits per color channel (1 or 2); defaults to the configured depth
        #[arg(short, long)]
        depth: Option<u8>,
    },
    /// Recover a hidden message or file
    Decode {
        #[arg(short, long)]
        image: PathBuf,
        #[arg(short, long)]
        password: Option<String>,
        /// Where to write a recovered file (defaults to its embedded name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the embedded metadata as JSON
    Inspect {
        #[arg(short, long)]
        image: PathBuf,
    },
    /// Print how many text bytes an image can hold
    Capacity {
        #[arg(short, long)]
        image: PathBuf,
        #[arg(short, long)]
        depth: Option<u8>,
    },
}

/// Initialize the logging system with timestamp, level, and message formatting.
///
/// Format: `[HH:MM:SS] [LEVEL] message`. `RUST_LOG` overrides the configured level.
fn init_logger(level: LevelFilter) {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_carrier(path: &Path) -> Result<image::RgbaImage> {
    let img = image::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(img.to_rgba8())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => StegoConfig::from_file(path)?,
        None => StegoConfig::default(),
    };
    init_logger(config.logging.level_filter()?);

    let core = ServiceCore::new(config.service.max_concurrent_tasks);

    match args.command {
        Command::Encode {
            image,
            output,
            text,
            file,
            password,
            depth,
        } => {
            let payload = match (text, file) {
                (Some(text), _) => Payload::Text(text),
                (None, Some(path)) => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "payload.bin".to_string());
                    Payload::File { name, bytes }
                }
                (None, None) => return Err(anyhow!("either --text or --file is required")),
            };

            let carrier = Arc::new(load_carrier(&image)?);
            let depth = depth.unwrap_or(config.codec.default_bit_depth);
            let stego = core.encode(1, carrier, payload, password, depth).await?;

            stego
                .save_with_format(&output, image::ImageFormat::Png)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!("💾 Stego image written to {}", output.display());
        }
        Command::Decode {
            image,
            password,
            output,
        } => {
            let carrier = Arc::new(load_carrier(&image)?);
            let content = core.decode(1, carrier, password).await?;

            if let Some(text) = content.text {
                println!("{}", text);
            } else if let Some(bytes) = content.file {
                let target = match output {
                    Some(path) => path,
                    None => {
                        // Never trust a path from the carrier; keep only the final component.
                        let name = content.file_name.unwrap_or_else(|| "payload.bin".to_string());
                        Path::new(&name)
                            .file_name()
                            .map(PathBuf::from)
                            .unwrap_or_else(|| PathBuf::from("payload.bin"))
                    }
                };
                std::fs::write(&target, &bytes)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                info!("💾 Recovered {} bytes to {}", bytes.len(), target.display());
            } else {
                info!("Carrier holds an empty payload");
            }
        }
        Command::Inspect { image } => {
            let carrier = load_carrier(&image)?;
            let metadata = inspect(&carrier)?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
        Command::Capacity { image, depth } => {
            let carrier = load_carrier(&image)?;
            let depth = BitDepth::try_from(depth.unwrap_or(config.codec.default_bit_depth))?;
            let capacity = payload_capacity(&carrier, &StegoMetadata::text(depth, None))?;
            println!("{}", capacity);
        }
    }

    Ok(())
}
