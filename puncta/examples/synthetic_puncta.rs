//! Example: run the full pipeline on a synthetic volume.
//!
//! Builds a noisy 3D volume with Gaussian puncta, a two-cell label plane
//! (one cell touching the border, which is excluded), runs detection,
//! suppression and filtering, and prints the surviving blobs as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example synthetic_puncta
//! cargo run --example synthetic_puncta -- pipeline.yaml
//! ```

use std::env;

use anyhow::Context;
use common::log_setup::setup_logging;
use common::{Buffer3, FileFormat};
use puncta::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WIDTH: usize = 160;
const HEIGHT: usize = 120;
const DEPTH: usize = 12;
const NUM_PUNCTA: usize = 40;

fn main() -> anyhow::Result<()> {
    setup_logging("info", None);

    let config = match env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {}", path))?;
            let format = FileFormat::from_file_name(&path)?;
            PipelineConfig::from_text(&text, format)?
        }
        None => default_config(),
    };
    tracing::info!("Config:\n{}", config.to_text(FileFormat::Yaml)?);

    let (volume, truth) = synthetic_volume(11);
    let labels = synthetic_cells()?;
    let excluded = labels.labels_touching_border();
    let mask = labels.extrude(&excluded, DEPTH);

    let output = Pipeline::new(config).run(&volume, Some(&mask))?;
    println!("{}", serde_json::to_string_pretty(&output.blobs)?);
    println!("{}", serde_json::to_string_pretty(&output.diagnostics)?);

    // Pretend the reviewer confirmed exactly the ground-truth puncta inside
    // the kept cell.
    let detected: Vec<Position> = output.blobs.iter().map(Position::from).collect();
    let curated: Vec<Position> = truth
        .into_iter()
        .filter(|p| mask.get_xyz(p.x as usize, p.y as usize, p.z as usize))
        .collect();
    let records = reconcile(&detected, &curated, 1.0, &Comments::new());
    for label in ["true_positive", "false_positive", "false_negative"] {
        let count = records
            .iter()
            .filter(|r| r.label_for_ml.to_string() == label)
            .count();
        tracing::info!("{}: {}", label, count);
    }

    Ok(())
}

fn default_config() -> PipelineConfig {
    PipelineConfig {
        detector: DetectorConfig {
            threshold_mode: ThresholdMode::Absolute,
            threshold_value: 200.0,
            ..Default::default()
        },
        local_contrast: Some(LocalContrastFilter::default()),
        sharpness: Some(SharpnessFilter::default()),
        mask_boundary: Some(MaskBoundaryFilter::new(3)),
        ..Default::default()
    }
}

/// Noisy background with puncta; returns the volume and the punctum centers.
fn synthetic_volume(seed: u64) -> (Volume, Vec<Position>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let voxels = (0..WIDTH * HEIGHT * DEPTH)
        .map(|_| 60.0 + rng.random::<f32>() * 20.0)
        .collect();
    let mut volume: Volume = Buffer3::new(WIDTH, HEIGHT, DEPTH, voxels);

    let mut truth = Vec::with_capacity(NUM_PUNCTA);
    for _ in 0..NUM_PUNCTA {
        let z = rng.random_range(1..DEPTH - 1);
        let cy = rng.random_range(12..HEIGHT - 12);
        let cx = rng.random_range(12..WIDTH - 12);
        let amplitude = rng.random_range(400.0..1200.0f32);
        let sigma = rng.random_range(1.2..2.2f32);

        for (dz, weight) in [(-1i64, 0.3f32), (0, 1.0), (1, 0.3)] {
            let nz = (z as i64 + dz) as usize;
            for y in cy - 8..=cy + 8 {
                for x in cx - 8..=cx + 8 {
                    let d2 = (y as f32 - cy as f32).powi(2) + (x as f32 - cx as f32).powi(2);
                    volume[(x, y, nz)] += weight * amplitude * (-d2 / (2.0 * sigma * sigma)).exp();
                }
            }
        }
        truth.push(Position::new(z as f32, cy as f32, cx as f32));
    }
    (volume, truth)
}

/// Cell 1 in the middle of the field, cell 2 clipped by the right edge.
fn synthetic_cells() -> puncta::Result<CellLabels> {
    let mut plane = vec![0u16; WIDTH * HEIGHT];
    for y in 10..110 {
        for x in 10..110 {
            plane[y * WIDTH + x] = 1;
        }
        for x in 120..WIDTH {
            plane[y * WIDTH + x] = 2;
        }
    }
    CellLabels::from_shape_vec(&[HEIGHT, WIDTH], &plane)
}
