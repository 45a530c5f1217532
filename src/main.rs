use clap::{Parser, Subcommand};
use folio::{config, content, output, process};
use std::path::PathBuf;

/// Shared flags for commands that produce low-res variants.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Ignore existing low-res variants and re-encode every image
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let hash = env!("GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{} ({hash})", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Asset and gallery pipeline for a static personal site")]
#[command(long_about = "\
Asset and gallery pipeline for a static personal site

Reads a content description, derives low-res variants of every image it
references, builds a newest-first photo gallery, computes a masonry layout
per breakpoint, and writes the result as site.json for a template renderer.

Site structure:

  site/
  ├── config.toml                  # Pipeline config (optional)
  ├── data.json                    # Content description (.json or .toml)
  ├── assets/                      # Managed images (jpg, jpeg, png, gif, svg)
  │   ├── logo.svg
  │   └── photo/                   # Gallery photos, picked up automatically
  │       ├── harbour.jpg
  │       └── dunes.jpg
  └── low_res/                     # Derived variants (created, cached)

Photo timestamps (first available wins):
  EXIF DateTimeOriginal → DateTimeDigitized → file modification time

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site root
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Content description, relative to the site root
    #[arg(long, default_value = "data.json", global = true)]
    data: PathBuf,

    /// Output directory for site.json, relative to the site root
    #[arg(long, default_value = "build", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline and write site.json
    Build(CacheArgs),
    /// Validate config and content, list what a build would touch
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Build(cache_args) => {
            let site_config = config::load_config(&cli.source)?;
            let tree = content::load_content(&process::site_path(&cli.source, &cli.data))?;
            let output_dir = process::site_path(&cli.source, &cli.output);
            init_thread_pool(&site_config.processing);

            println!("==> Processing {}", cli.source.display());
            let result = process::process(&tree, &site_config, &cli.source, !cache_args.no_cache)?;
            let site_file = process::write_site(&output_dir, &result.site)?;
            output::print_process_output(&result, &site_file);
            println!("==> Build complete: {}", output_dir.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site_config = config::load_config(&cli.source)?;
            let tree = content::load_content(&process::site_path(&cli.source, &cli.data))?;
            let report = process::check(&tree, &site_config, &cli.source);
            output::print_check_output(&report, tree.name());
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
