// Krystals CLI entry point.
//
// A thin command-line front end over the `krystals` library. Krystal file
// names are resolved against the krystals folder, taken from `--folder`, the
// JSON config given by `--config`, or the default config, in that order.
//
// Usage:
//   krystals [--config FILE] [--folder DIR] [-v] permute --source NAME
//       --axis NAME --contour NAME --level N [--sort-first]
//   krystals rebuild NAME [--no-overwrite]
//   krystals show NAME [--json]
//   krystals contour DENSITY CONTOUR AXIS

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use krystals::format::KrystalDocument;
use krystals::krystal::Krystal;
use krystals::{KrystalsConfig, KrystalsFolder, PermutationKrystal};

#[derive(Parser)]
#[command(name = "krystals")]
#[command(version)]
#[command(about = "Build and inspect permutation krystals")]
struct Cli {
    /// JSON config file (krystals_folder, filename_suffix)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Krystals folder; overrides the config
    #[arg(long)]
    folder: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a permutation krystal, permute it and save it
    Permute {
        /// Source krystal file name
        #[arg(long)]
        source: String,

        /// Axis krystal file name
        #[arg(long)]
        axis: String,

        /// Contour krystal file name
        #[arg(long)]
        contour: String,

        /// Permutation level
        #[arg(long)]
        level: u32,

        /// Sort values (or inner groups) ascending before applying contours
        #[arg(long)]
        sort_first: bool,
    },

    /// Re-permute a saved permutation krystal against its current inputs
    Rebuild {
        /// Permutation krystal file name
        name: String,

        /// Save changed content under a fresh name instead of replacing the file
        #[arg(long)]
        no_overwrite: bool,
    },

    /// Print a krystal's kind, attributes and shape
    Show {
        /// Krystal file name
        name: String,

        /// Print the strands as JSON instead
        #[arg(long)]
        json: bool,
    },

    /// Print one entry of the contour table
    Contour {
        density: usize,
        contour: u32,
        axis: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut config = match &cli.config {
        Some(path) => KrystalsConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => KrystalsConfig::default(),
    };
    if let Some(folder) = cli.folder {
        config.krystals_folder = folder;
    }
    let folder = KrystalsFolder::from_config(&config);

    match cli.command {
        Commands::Permute {
            source,
            axis,
            contour,
            level,
            sort_first,
        } => {
            let mut krystal = PermutationKrystal::create(
                &folder.path_of(&source),
                &folder.path_of(&axis),
                &folder.path_of(&contour),
                level,
                sort_first,
            )?;
            krystal.permute()?;
            let path = krystal.save(&folder, true)?;
            info!("Shape: {}", krystal.to_krystal()?.shape_string());
            println!("{}", path.display());
        }
        Commands::Rebuild { name, no_overwrite } => {
            let mut krystal = PermutationKrystal::open(&folder, &name)
                .with_context(|| format!("opening {name}"))?;
            let path = krystal.rebuild_with(&folder, !no_overwrite)?;
            if krystal.name() != Some(name.as_str()) {
                info!("{} moved to {}", name, path.display());
            }
            println!("{}", path.display());
        }
        Commands::Show { name, json } => {
            let document = folder
                .read(&name)
                .with_context(|| format!("reading {name}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&document.strands)?);
            } else {
                print_document(&name, document)?;
            }
        }
        Commands::Contour {
            density,
            contour,
            axis,
        } => {
            let perm = krystals::contour::contour(density, contour, axis)?;
            let text: Vec<String> = perm.iter().map(|p| p.to_string()).collect();
            println!("{}", text.join(" "));
        }
    }

    Ok(())
}

fn print_document(name: &str, document: KrystalDocument) -> Result<()> {
    println!("{name}: {}", document.kind);
    for (key, value) in &document.attributes {
        println!("  {key} = {value}");
    }
    let krystal = Krystal::from_strands(document.strands)?;
    println!("  level {}, max value {}", krystal.level(), krystal.max_value());
    println!("  shape {}", krystal.shape_string());
    Ok(())
}
