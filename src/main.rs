use clap::{Parser, Subcommand};
use masonry_gal::animation::TimelineDriver;
use masonry_gal::config::{self, GalleryConfig};
use masonry_gal::gallery::MasonryGallery;
use masonry_gal::metrics::{self, ImageFileSource};
use masonry_gal::types::Size;
use masonry_gal::{output, preview, scan};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Shared flags for commands that lay out a directory.
#[derive(clap::Args, Clone)]
struct LayoutArgs {
    /// Directory of images
    #[arg(long, default_value = ".")]
    source: PathBuf,

    /// Container width in pixels
    #[arg(long)]
    width: f64,

    /// Viewport width in pixels, for breakpoint resolution (defaults to --width)
    #[arg(long)]
    viewport: Option<f64>,
}

#[derive(Parser)]
#[command(name = "masonry-gal")]
#[command(about = "Masonry gallery layout engine")]
#[command(long_about = "\
Masonry gallery layout engine

Packs images of varying aspect ratio into uniform-width columns, always
extending the shortest column. The column count follows the viewport width.

Source directory structure:

  photos/
  ├── masonry.toml                 # Gallery config (optional)
  ├── 001-dawn.jpg                 # Ordered by numeric prefix
  ├── 001-dawn.url                 # Link target for 001-dawn.jpg (optional)
  ├── 010-Japan/                   # Subdirectory = group
  │   └── 001-tokyo.jpg
  └── misc.jpg                     # Unnumbered entries sort last

Run 'masonry-gal gen-config' to generate a documented masonry.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: masonry.toml in the source directory, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute placements for a directory of images
    Layout {
        #[command(flatten)]
        args: LayoutArgs,

        /// Print a JSON report instead of the tile inventory
        #[arg(long)]
        json: bool,
    },
    /// Write a static HTML preview of the layout
    Preview {
        #[command(flatten)]
        args: LayoutArgs,

        /// Output HTML file
        #[arg(long, default_value = "masonry-preview.html")]
        output: PathBuf,
    },
    /// Report images whose dimensions cannot be read
    Check {
        /// Directory of images
        #[arg(long, default_value = ".")]
        source: PathBuf,
    },
    /// Print a stock masonry.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Command::Layout { args, json } => {
            let config = resolve_config(cli.config.as_deref(), &args.source)?;
            let gallery = run_layout(config, args)?;
            if *json {
                let report = output::LayoutReport::new(
                    gallery.layout(),
                    gallery.items(),
                    args.width,
                    args.viewport.unwrap_or(args.width),
                );
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_layout_output(
                    gallery.layout(),
                    gallery.items(),
                    gallery.metrics(),
                    args.width,
                );
            }
        }
        Command::Preview { args, output } => {
            let config = resolve_config(cli.config.as_deref(), &args.source)?;
            let gallery = run_layout(config, args)?;
            let title = args
                .source
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
                .unwrap_or_else(|| "Gallery".to_string());
            preview::write_preview(
                output,
                &title,
                gallery.layout(),
                gallery.items(),
                &gallery.config().animation,
            )?;
            println!("==> Preview written to {}", output.display());
        }
        Command::Check { source } => {
            let config = resolve_config(cli.config.as_deref(), source)?;
            init_thread_pool(&config.loading);
            println!("==> Checking {}", source.display());
            let items = scan::scan(source)?;
            let uris: Vec<String> = items.iter().map(|i| i.image_source.clone()).collect();
            let results = metrics::load_all(&ImageFileSource::new(), &uris);
            output::print_check_output(&results);
            let failed = results.iter().filter(|(_, r)| r.is_err()).count();
            if failed > 0 {
                return Err(format!("{failed} image(s) could not be measured").into());
            }
            println!("==> All images measured");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Scan, measure and run a single layout pass.
fn run_layout(
    config: GalleryConfig,
    args: &LayoutArgs,
) -> Result<MasonryGallery<TimelineDriver>, Box<dyn std::error::Error>> {
    let items = scan::scan(&args.source)?;
    let mut gallery = MasonryGallery::new(
        config,
        Arc::new(ImageFileSource::new()),
        TimelineDriver::new(),
    );
    gallery.set_items(items);
    gallery.wait_for_metrics();
    gallery.viewport_resized(Size::new(args.viewport.unwrap_or(args.width), 0.0));
    gallery.container_resized(Size::new(args.width, 0.0));
    gallery.frame();
    Ok(gallery)
}

/// Explicit `--config` must exist; the per-directory default is optional.
fn resolve_config(
    explicit: Option<&Path>,
    source: &Path,
) -> Result<GalleryConfig, Box<dyn std::error::Error>> {
    match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(format!("config file not found: {}", path.display()).into());
            }
            Ok(config::load_config_file(path)?)
        }
        None => Ok(config::load_config(source)?),
    }
}

/// Log to stderr at a level picked by `-v`, unless `RUST_LOG` is set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("masonry_gal={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on loading config.
///
/// Caps at the number of available CPU cores. User can constrain down, not up.
fn init_thread_pool(loading: &config::LoadingConfig) {
    let threads = config::effective_threads(loading);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
