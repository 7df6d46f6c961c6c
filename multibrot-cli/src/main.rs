mod error;
mod export;
mod themes;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;

use clap::Parser;
use tracing::{error, info, warn};

use multibrot_core::{EvalConfig, PlaneRegion};
use multibrot_render::{suggest_seed, SetRenderer, ThemeRegistry};

use crate::error::CliError;
use crate::export::{export_png, ExportMetadata};

#[derive(Debug, Parser)]
#[command(name = "multibrot", version)]
#[command(about = "Render a Multibrot set (z ← zᵃ + c) to a PNG image")]
struct Args {
    /// Image width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 800)]
    height: u32,

    #[arg(long, default_value_t = -2.0, allow_hyphen_values = true)]
    xmin: f64,

    #[arg(long, default_value_t = 2.0, allow_hyphen_values = true)]
    xmax: f64,

    #[arg(long, default_value_t = -2.0, allow_hyphen_values = true)]
    ymin: f64,

    #[arg(long, default_value_t = 2.0, allow_hyphen_values = true)]
    ymax: f64,

    /// Series order a (2 is the Mandelbrot set)
    #[arg(long, default_value_t = EvalConfig::DEFAULT_ORDER)]
    order: f64,

    #[arg(long, default_value_t = EvalConfig::DEFAULT_MAX_ITERATIONS)]
    max_iterations: u32,

    /// Name of the theme to color with
    #[arg(long)]
    theme: Option<String>,

    /// JSON file with extra theme definitions
    #[arg(long, value_name = "JSON")]
    themes: Option<PathBuf>,

    /// Write the loaded theme set to this JSON file
    #[arg(long, value_name = "JSON")]
    dump_themes: Option<PathBuf>,

    /// List available themes and exit
    #[arg(long)]
    list_themes: bool,

    /// Draw a new random seed for the selected theme's palette
    #[arg(long)]
    reseed: bool,

    #[arg(short, long, value_name = "PNG", default_value = "multibrot.png")]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let mut registry = ThemeRegistry::new();
    if let Some(path) = &args.themes {
        themes::merge_into(&mut registry, path)?;
    }
    if let Some(name) = &args.theme {
        if !registry.select(name) {
            return Err(CliError::UnknownTheme(name.clone()));
        }
    }

    if args.reseed {
        let mut info = registry.current_info().clone();
        info.random_seed = suggest_seed(&mut rand::thread_rng());
        info!(theme = %info.name, seed = info.random_seed, "Reseeded palette");
        registry.add_or_update(info);
    }

    if args.list_themes {
        for info in registry.infos() {
            let marker = if info.name == registry.current_name() { '*' } else { ' ' };
            println!(
                "{marker} {:<24} {} / {}",
                info.name, info.theme_kind, info.palette_kind
            );
        }
        return Ok(());
    }
    if let Some(path) = &args.dump_themes {
        themes::save(path, &registry)?;
    }

    let region = PlaneRegion::new(args.xmin, args.xmax, args.ymin, args.ymax)?;
    let config = EvalConfig::new(args.order, args.max_iterations)?;
    let (width, height) = (args.width, args.height);

    info!(
        width,
        height,
        %region,
        order = config.order,
        max_iterations = config.max_iterations,
        theme = registry.current_name(),
        "Starting Multibrot render"
    );

    let (tx, rx) = mpsc::channel::<u8>();
    let renderer = SetRenderer::new().with_progress(move |p| {
        let _ = tx.send(p);
    });

    // The renderer (and with it the sender) is dropped when the worker
    // returns, which ends the progress loop below.
    let worker = thread::Builder::new()
        .name("render".into())
        .spawn(move || {
            let outcome = renderer.render(region, width, height, config, &mut registry);
            (outcome, registry)
        })
        .map_err(CliError::Spawn)?;

    let mut last_decile = None;
    for percent in rx {
        let decile = percent / 10;
        if last_decile != Some(decile) {
            info!(percent, "Rendering");
            last_decile = Some(decile);
        }
    }

    let (outcome, registry) = worker.join().map_err(|_| CliError::WorkerPanicked)?;
    let Some(outcome) = outcome? else {
        warn!("Renderer was busy, nothing rendered");
        return Ok(());
    };
    if !outcome.completed {
        warn!("Render cancelled, nothing written");
        return Ok(());
    }
    if outcome.nan_estimates > 0 {
        warn!(
            nan_estimates = outcome.nan_estimates,
            "Some distance estimates are not finite"
        );
    }

    let metadata = ExportMetadata {
        region,
        config,
        theme: registry.current_info(),
    };
    export_png(&outcome.image, &args.output, &metadata)?;
    info!(
        elapsed_ms = outcome.elapsed.as_millis(),
        "Wrote {}",
        args.output.display()
    );
    Ok(())
}
