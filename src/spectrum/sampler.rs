//! Byte spectrum → band averages → mirrored, smoothed scale factors.

use crate::params::SpectrumMapping;

/// Largest value a magnitude byte can take
const MAX_MAGNITUDE: f64 = 255.0;

/// Linear interpolation from `src` to `dst`
pub fn lerp(src: f64, dst: f64, t: f64) -> f64 {
    src + (dst - src) * t
}

/// Average consecutive runs of `factor` bins (the trailing remainder is dropped)
pub fn downsample(raw: &[u8], factor: usize) -> Vec<f64> {
    if factor == 0 {
        return Vec::new();
    }
    raw.chunks_exact(factor)
        .map(|run| run.iter().map(|&m| m as f64).sum::<f64>() / factor as f64)
        .collect()
}

/// In-place circular moving average over `2 * half_width + 1` taps
///
/// The sequence is treated as cyclic, and every output reads the unsmoothed
/// input.
pub fn smooth(data: &mut [f64], half_width: usize) {
    let len = data.len();
    if len == 0 {
        return;
    }

    let snapshot = data.to_vec();
    let window = 2 * half_width + 1;
    for (i, out) in data.iter_mut().enumerate() {
        let start = i as isize - half_width as isize;
        let sum: f64 = (0..window)
            .map(|k| snapshot[(start + k as isize).rem_euclid(len as isize) as usize])
            .sum();
        *out = sum / window as f64;
    }
}

/// Per-vertex scale factors for a rosette with `vertex_count` vertices
///
/// Band `i` drives both vertex `i` and its mirror `vertex_count - 1 - i`, so
/// the outline pulses symmetrically. Vertices with no band stay at rest scale.
pub fn compute_scale_factors(
    bands: &[f64],
    vertex_count: usize,
    mapping: &SpectrumMapping,
) -> Vec<f64> {
    let mut scale = vec![mapping.min_scale; vertex_count];
    for i in 0..vertex_count.div_ceil(2) {
        let magnitude = bands.get(i).copied().unwrap_or(0.0);
        let factor = lerp(mapping.min_scale, mapping.max_scale, magnitude / MAX_MAGNITUDE);
        scale[i] = factor;
        scale[vertex_count - 1 - i] = factor;
    }

    smooth(&mut scale, mapping.smoothing_half_width);
    scale
}
