use std::path::PathBuf;

use campus_card::card::fonts::FontQuartet;
use campus_card::{assets, card, config, logging, store, web};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "campus-card")]
#[command(about = "Student registration with QR-linked printable ID cards")]
#[command(long_about = "\
Student registration with QR-linked printable ID cards

Registering a student stores their photo, generates a QR code pointing at
their public viewer page, and persists the record in SQLite. The printable
1100x650 ID card is composited on demand and exported as PNG or PDF.

Run 'campus-card gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Path to config.toml (defaults are used if the file doesn't exist)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Log verbosity (RUST_LOG overrides)
    #[arg(long, value_enum, default_value_t = logging::Verbosity::Normal, global = true)]
    verbosity: logging::Verbosity,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Migrate the database, then serve HTTP traffic
    Serve,
    /// Run the schema migration and exit
    Migrate,
    /// Render one student's card to a local file (.png or .pdf)
    Render {
        /// Record id to render
        #[arg(long)]
        id: i64,
        /// Output file; the extension picks the format
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if matches!(cli.command, Command::GenConfig) {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    logging::init(cli.verbosity);
    let config = config::AppConfig::load(&cli.config)?;

    match cli.command {
        Command::Serve => {
            store::migrate(&config.storage.database_path)?;
            assets::UploadStore::new(&config.storage.upload_dir).ensure_dir()?;
            web::serve(config).await?;
        }
        Command::Migrate => {
            store::migrate(&config.storage.database_path)?;
            println!(
                "Database migrated: {}",
                config.storage.database_path.display()
            );
        }
        Command::Render { id, out } => {
            let store = store::Store::open(&config.storage.database_path)?;
            let record = store
                .find_by_id(id)?
                .ok_or_else(|| format!("no record with id {id}"))?;
            drop(store);

            let fonts = FontQuartet::load(&config.fonts);
            let rendered = card::render(
                &record,
                &config.storage.upload_dir,
                &config.branding,
                &fonts,
            )?;
            match out.extension().and_then(|e| e.to_str()) {
                Some("png") => std::fs::write(&out, card::export::encode_png(&rendered)?)?,
                Some("pdf") => std::fs::write(&out, card::export::encode_pdf(&rendered)?)?,
                _ => return Err("output must end in .png or .pdf".into()),
            }
            println!("Card for record {id} written to {}", out.display());
        }
        Command::GenConfig => unreachable!("handled above"),
    }

    Ok(())
}
