//! Synthetic volumes for tests.

use common::Buffer3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::blob::Blob;
use crate::volume::Volume;

/// A Gaussian spot confined to one slice.
#[derive(Debug, Clone, Copy)]
pub struct Spot {
    pub z: usize,
    pub y: f32,
    pub x: f32,
    pub amplitude: f32,
    pub sigma: f32,
}

impl Spot {
    pub fn new(z: usize, y: f32, x: f32, amplitude: f32, sigma: f32) -> Self {
        Self {
            z,
            y,
            x,
            amplitude,
            sigma,
        }
    }
}

/// Flat background with 2D Gaussian spots added to their slices.
pub fn spot_volume(
    width: usize,
    height: usize,
    depth: usize,
    background: f32,
    spots: &[Spot],
) -> Volume {
    let mut volume = Buffer3::new_filled(width, height, depth, background);
    for spot in spots {
        let two_sigma_sq = 2.0 * spot.sigma * spot.sigma;
        for y in 0..height {
            for x in 0..width {
                let dy = y as f32 - spot.y;
                let dx = x as f32 - spot.x;
                volume[(x, y, spot.z)] +=
                    spot.amplitude * (-(dy * dy + dx * dx) / two_sigma_sq).exp();
            }
        }
    }
    volume
}

/// Add uniform noise in `[0, amplitude)` with a fixed seed.
pub fn add_noise(volume: &Volume, amplitude: f32, seed: u64) -> Volume {
    let mut rng = StdRng::seed_from_u64(seed);
    let voxels = volume
        .iter()
        .map(|&v| v + rng.random::<f32>() * amplitude)
        .collect();
    Buffer3::new(volume.width(), volume.height(), volume.depth(), voxels)
}

/// Random blobs in a `width × height × depth` box with distinct intensities.
pub fn random_blobs(count: usize, width: f32, height: f32, depth: usize, seed: u64) -> Vec<Blob> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            Blob::new(
                rng.random_range(0..depth),
                rng.random_range(0.0..height),
                rng.random_range(0.0..width),
                1.5,
                1000.0 - i as f32 * 0.5,
            )
        })
        .collect()
}

pub fn blob_at(z: usize, y: f32, x: f32, intensity: f32) -> Blob {
    Blob::new(z, y, x, 2.0, intensity)
}
