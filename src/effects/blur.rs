use rayon::prelude::*;

use crate::foundation::error::{ReelError, ReelResult};

/// Kernel radius covering three standard deviations.
pub fn radius_for_sigma(sigma: f32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

/// Separable gaussian blur over a premultiplied RGBA8 buffer. Edges clamp.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> ReelResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| ReelError::validation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(ReelError::validation(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Blur in place with radius derived from `sigma`.
pub fn blur_in_place(pixels: &mut [u8], width: u32, height: u32, sigma: f32) -> ReelResult<()> {
    let radius = radius_for_sigma(sigma);
    if radius == 0 {
        return Ok(());
    }
    let out = blur_rgba8_premul(pixels, width, height, radius, sigma)?;
    pixels.copy_from_slice(&out);
    Ok(())
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> ReelResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ReelError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(ReelError::validation("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = (((wf / sum) * 65536.0).round() as i64).clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Fold rounding drift into the center tap so the kernel sums to exactly 1.0.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let row_bytes = width as usize * 4;
    dst.par_chunks_mut(row_bytes)
        .zip(src.par_chunks(row_bytes))
        .for_each(|(drow, srow)| {
            for x in 0..w {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                    let idx = sx as usize * 4;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(srow[idx + c]);
                    }
                }
                let out_idx = x as usize * 4;
                for c in 0..4 {
                    drow[out_idx + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as usize;
    let h = height as i32;
    dst.par_chunks_mut(w * 4)
        .enumerate()
        .for_each(|(y, drow)| {
            let y = y as i32;
            for x in 0..w {
                let mut acc = [0u64; 4];
                for (ki, &kw) in k.iter().enumerate() {
                    let sy = (y + ki as i32 - radius).clamp(0, h - 1) as usize;
                    let idx = (sy * w + x) * 4;
                    for c in 0..4 {
                        acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                    }
                }
                for c in 0..4 {
                    drow[x * 4 + c] = q16_to_u8(acc[c]);
                }
            }
        });
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
