use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use scenegen::export::validate_file_stem;
use scenegen::{export_scene, generate, generate_named, PresetKind, SampleIndex};

/// Points per scene when a single preset is requested.
const SINGLE_PRESET_POINTS: usize = 10_000;

/// Generate labeled sample point clouds as Parquet, PLY and JSON.
#[derive(Parser, Debug, Clone)]
#[command(name = "sample_gen", version)]
struct Args {
    /// Output directory.
    #[arg(short, long, env = "SAMPLE_OUTPUT_DIR", default_value = "data/sample")]
    output: PathBuf,

    /// Generate only this preset (no metadata.json). Unknown names produce
    /// the unstructured fallback scene. The name is also the file stem, so
    /// only `[A-Za-z0-9_-]` is accepted.
    #[arg(short, long, value_parser = parse_stem)]
    preset: Option<String>,

    /// Override the point budget of every generated scene.
    #[arg(short, long)]
    num_points: Option<usize>,
}

fn parse_stem(s: &str) -> std::result::Result<String, String> {
    validate_file_stem(s)
        .map(|()| s.to_owned())
        .map_err(|e| e.to_string())
}

fn run_single(out: &Path, name: &str, num_points: usize) -> Result<()> {
    info!("Generating {name} preset ({num_points} pts)...");

    let scene = generate_named(name, num_points, &mut rand::thread_rng());
    export_scene(out, name, &scene).with_context(|| format!("exporting {name}"))?;

    info!("{name} complete");
    Ok(())
}

fn run_all(out: &Path, num_points: Option<usize>) -> Result<()> {
    let presets: &[PresetKind] = &PresetKind::NAMED;
    info!("Generating {} presets into {}...", presets.len(), out.display());

    // Presets are independent; each worker draws from its own thread RNG.
    let failed: Vec<PresetKind> = presets
        .par_iter()
        .filter_map(|&preset| {
            let n = num_points.unwrap_or_else(|| preset.sample_points());
            let scene = generate(preset, n, &mut rand::thread_rng());

            match export_scene(out, preset.id(), &scene) {
                Ok(_) => None,
                Err(err) => {
                    warn!("Error exporting {preset}: {err:#}");
                    Some(preset)
                }
            }
        })
        .collect();

    let index = SampleIndex::for_presets(presets);
    let path = index
        .write(out)
        .with_context(|| format!("writing index into {}", out.display()))?;
    info!("Wrote {}", path.display());

    if !failed.is_empty() {
        let names: Vec<_> = failed.iter().map(|p| p.id()).collect();
        bail!("{} preset(s) failed: {}", failed.len(), names.join(", "));
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let start = Instant::now();

    match &args.preset {
        Some(name) => run_single(
            &args.output,
            name,
            args.num_points.unwrap_or(SINGLE_PRESET_POINTS),
        )?,
        None => run_all(&args.output, args.num_points)?,
    }

    info!(
        "Done in {:.2}s -> {}",
        start.elapsed().as_secs_f64(),
        args.output.display()
    );

    Ok(())
}
