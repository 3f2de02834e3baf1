//! nvstore CLI
//!
//! Command-line interface for inspecting and editing an image file.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use nvstore::{Config, FileDevice, ObjectStore, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// nvstore CLI
#[derive(Parser, Debug)]
#[command(name = "nvstore-cli")]
#[command(about = "Save and load objects by id in an EEPROM image")]
#[command(version)]
struct Args {
    /// Image file
    #[arg(short, long, default_value = "./nvstore.img")]
    image: PathBuf,

    /// Image capacity in bytes
    #[arg(short, long, default_value = "1024")]
    capacity: u16,

    /// Allow saves to resize existing objects
    #[arg(short, long)]
    resize: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Format the image unless it already carries the signature
    Init {
        /// Signature marking the image as formatted
        #[arg(short, long, default_value = "42")]
        signature: u16,
    },

    /// Forget every stored object
    Reset,

    /// Save a value under an id
    Save {
        /// Object id
        id: u8,

        /// Value to store (text, or hex with --hex)
        value: String,

        /// Interpret the value as hex
        #[arg(long)]
        hex: bool,
    },

    /// Print the value stored under an id
    Load {
        /// Object id
        id: u8,

        /// Print as hex instead of text
        #[arg(long)]
        hex: bool,
    },

    /// Remove an object
    Remove {
        /// Object id
        id: u8,
    },

    /// List stored objects
    List,

    /// Show space usage
    Info,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nvstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("nvstore CLI v{}", nvstore::VERSION);
    tracing::debug!("Image: {} ({} bytes)", args.image.display(), args.capacity);

    let config = Config::builder()
        .image_path(&args.image)
        .capacity(args.capacity)
        .resize_on_mismatch(args.resize)
        .build();

    let mut store = match ObjectStore::open(config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open image: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&mut store, args.command) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(store: &mut ObjectStore<FileDevice>, command: Commands) -> Result<()> {
    match command {
        Commands::Init { signature } => {
            if store.format_if_needed(signature)? {
                println!("formatted with signature {}", signature);
            } else {
                println!("already formatted");
            }
        }
        Commands::Reset => {
            store.reset()?;
            println!("reset");
        }
        Commands::Save { id, value, hex } => {
            let bytes = if hex {
                hex::decode(value.trim()).map_err(|e| {
                    nvstore::StoreError::Serialization(format!("Invalid hex value: {}", e))
                })?
            } else {
                value.into_bytes()
            };
            store.save(id, &bytes)?;
            println!("saved {} bytes under id {}", bytes.len(), id);
        }
        Commands::Load { id, hex } => {
            let bytes = store.load_vec(id)?;
            if hex {
                println!("{}", hex::encode(&bytes));
            } else {
                println!("{}", String::from_utf8_lossy(&bytes));
            }
        }
        Commands::Remove { id } => {
            if store.remove(id)? {
                println!("removed id {}", id);
            } else {
                println!("id {} not stored", id);
            }
        }
        Commands::List => {
            let entries = store.entries()?;
            println!("{:>4} {:>6} {:>6}", "id", "addr", "size");
            let mut addr = 0usize;
            for entry in entries {
                println!("{:>4} {:>6} {:>6}", entry.id, addr, entry.size);
                addr += entry.size as usize;
            }
        }
        Commands::Info => {
            let count = store.object_count()?;
            let used = store.used_bytes()?;
            let free = store.free_bytes()?;
            println!("capacity: {} bytes", store.capacity());
            println!("objects:  {}", count);
            println!("used:     {} bytes", used);
            println!("free:     {} bytes", free);
        }
    }
    Ok(())
}
