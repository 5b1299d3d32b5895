//! Full pipeline on synthetic data.

use common::{BitBuffer3, Buffer3, FileFormat};
use puncta::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct Spot {
    z: usize,
    y: f32,
    x: f32,
    amplitude: f32,
}

const SIGMA: f32 = 1.5;

fn synthetic_volume(
    width: usize,
    height: usize,
    depth: usize,
    spots: &[Spot],
    seed: u64,
) -> Volume {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut volume: Volume = Buffer3::new_filled(width, height, depth, 0.0);
    for z in 0..depth {
        for y in 0..height {
            for x in 0..width {
                volume[(x, y, z)] = 40.0 + rng.random::<f32>() * 10.0;
            }
        }
    }
    for spot in spots {
        // Mostly in its own slice, dimmer copies above and below.
        for (dz, weight) in [(-1i64, 0.5f32), (0, 1.0), (1, 0.5)] {
            let z = spot.z as i64 + dz;
            if z < 0 || z >= depth as i64 {
                continue;
            }
            for y in 0..height {
                for x in 0..width {
                    let d2 = (y as f32 - spot.y).powi(2) + (x as f32 - spot.x).powi(2);
                    volume[(x, y, z as usize)] +=
                        weight * spot.amplitude * (-d2 / (2.0 * SIGMA * SIGMA)).exp();
                }
            }
        }
    }
    volume
}

fn spots() -> Vec<Spot> {
    vec![
        Spot { z: 3, y: 30.0, x: 30.0, amplitude: 900.0 },
        Spot { z: 4, y: 80.0, x: 40.0, amplitude: 700.0 },
        Spot { z: 5, y: 50.0, x: 90.0, amplitude: 800.0 },
    ]
}

#[test]
fn pipeline_finds_each_spot_once() {
    let volume = synthetic_volume(128, 128, 9, &spots(), 42);
    let config = PipelineConfig {
        detector: DetectorConfig {
            threshold_mode: ThresholdMode::Absolute,
            threshold_value: 150.0,
            ..Default::default()
        },
        local_contrast: Some(LocalContrastFilter::default()),
        sharpness: Some(SharpnessFilter::new(1.2)),
        ..Default::default()
    };

    let output = Pipeline::new(config).run(&volume, None).unwrap();

    assert_eq!(output.blobs.len(), 3, "{:?}", output.blobs);
    for spot in spots() {
        assert!(
            output.blobs.iter().any(|b| b.z == spot.z
                && (b.y - spot.y).abs() <= 1.0
                && (b.x - spot.x).abs() <= 1.0),
            "missing spot at z={} y={} x={}",
            spot.z,
            spot.y,
            spot.x
        );
    }
    // The dimmer copies in neighboring slices are proximity duplicates.
    assert!(output.diagnostics.proximity_removed >= 6);
    assert!(output
        .blobs
        .windows(2)
        .all(|w| w[0].intensity >= w[1].intensity));
}

#[test]
fn pipeline_mask_excludes_spot_on_mask_edge() {
    let volume = synthetic_volume(128, 128, 9, &spots(), 7);
    // Box mask whose left wall passes through the spot at x = 30.
    let mut mask = BitBuffer3::new_default(128, 128, 9);
    for z in 0..9 {
        for y in 0..128 {
            for x in 29..120 {
                mask.set_xyz(x, y, z, true);
            }
        }
    }
    let config = PipelineConfig {
        detector: DetectorConfig {
            threshold_mode: ThresholdMode::Absolute,
            threshold_value: 150.0,
            ..Default::default()
        },
        mask_boundary: Some(MaskBoundaryFilter::new(2)),
        ..Default::default()
    };

    let output = Pipeline::new(config).run(&volume, Some(&mask)).unwrap();

    assert_eq!(output.diagnostics.mask_boundary_removed, Some(1));
    assert_eq!(output.blobs.len(), 2);
    assert!(output.blobs.iter().all(|b| b.x > 35.0));
    let eroded = output.eroded_mask.unwrap();
    assert!(!eroded.get_xyz(30, 64, 4));
    assert!(eroded.get_xyz(60, 64, 4));
}

#[test]
fn pipeline_config_from_yaml() {
    let yaml = "
detector:
  min_scale: 1.0
  max_scale: 2.5
  num_scales: 4
  threshold_mode: absolute
  threshold_value: 150
proximity:
  radius_xy: 8
bridge:
  dip_threshold: 0.8
sharpness: {}
";
    let config = PipelineConfig::from_text(yaml, FileFormat::Yaml).unwrap();
    assert_eq!(config.detector.scales(), vec![1.0, 1.5, 2.0, 2.5]);
    assert_eq!(config.proximity.radius_xy, 8.0);
    assert_eq!(config.proximity.z_window, 2);
    assert_eq!(config.bridge.dip_threshold, 0.8);
    assert_eq!(config.sharpness, Some(SharpnessFilter::new(1.4)));

    let volume = synthetic_volume(96, 96, 9, &spots()[..1], 3);
    let output = Pipeline::new(config).run(&volume, None).unwrap();
    assert_eq!(output.blobs.len(), 1);
}

#[test]
fn bad_config_text_is_a_config_error() {
    let result = PipelineConfig::from_text("detector: [1, 2", FileFormat::Yaml);
    assert!(matches!(result, Err(Error::Config(_))));
}
