//! Command line front end for GCPAT.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use gcpat::state::is_image_filename;
use gcpat::{AppConfig, GcpList, LoadedImage, Message, Store};

#[derive(Parser)]
#[command(name = "gcpat", version, about = "Ground control point annotation tool")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a GCP list and report its readiness status.
    Status(ImportArgs),
    /// Import a GCP list and print the resulting control points as JSON.
    Import(ImportArgs),
    /// Import a GCP list and write its linked pairs as a WGS84 GCP list.
    Export {
        #[command(flatten)]
        import: ImportArgs,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ImportArgs {
    /// GCP list to read
    list: PathBuf,
    /// Name of a loaded image (repeatable)
    #[arg(long = "image")]
    images: Vec<String>,
    /// Directory whose image files count as loaded
    #[arg(long)]
    image_dir: Option<PathBuf>,
    /// Source projection, overriding the list header
    #[arg(long)]
    projection: Option<String>,
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, gcpat::ConfigError> {
    match path {
        Some(path) => AppConfig::load(path),
        None => Ok(AppConfig::load_from_default_path().unwrap_or_default()),
    }
}

fn loaded_images(args: &ImportArgs) -> std::io::Result<Vec<LoadedImage>> {
    let mut names = args.images.clone();
    if let Some(dir) = &args.image_dir {
        for entry in std::fs::read_dir(dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if is_image_filename(&name) {
                names.push(name);
            }
        }
        names.sort();
    }
    Ok(names
        .into_iter()
        .enumerate()
        .map(|(i, name)| LoadedImage::new(i as u64 + 1, name))
        .collect())
}

fn import(store: &mut Store, args: &ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let list = GcpList::read(&args.list)?;
    let images = loaded_images(args)?;
    let projection = args.projection.clone().unwrap_or(list.projection);
    log::debug!("{} loaded images, source projection '{}'", images.len(), projection);

    store.dispatch(Message::SyncListToImages {
        images,
        rows: list.rows,
        source_projection: Some(projection),
    })?;
    Ok(())
}

fn run(cli: Cli, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = Store::new(config);

    match cli.command {
        Commands::Status(args) => {
            import(&mut store, &args)?;
            let state = store.state();
            println!("{}", state.status.describe());
            for point in &state.points {
                if let Some(name) = point.image_name().filter(|_| !point.has_image()) {
                    println!("  {} on {}: image not loaded", point.id, name);
                }
            }
            if !state.status.is_ready() {
                return Err("not enough linked control points".into());
            }
        }
        Commands::Import(args) => {
            import(&mut store, &args)?;
            println!("{}", store.state().to_json()?);
        }
        Commands::Export { import: args, output } => {
            import(&mut store, &args)?;
            let list = GcpList::from_state(store.state());
            match output {
                Some(path) => list.write(&path)?,
                None => print!("{}", list.to_text()),
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gcpat: {}", e);
            ExitCode::FAILURE
        }
    }
}
