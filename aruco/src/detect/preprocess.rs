use crate::error::DetectError;

use super::image::{Frame, ImageU8, PixelFormat};

/// Fixed-point BT.601 luma weights, scaled by 256.
const LUMA_R: u32 = 77;
const LUMA_G: u32 = 150;
const LUMA_B: u32 = 29;

/// Convert a frame to single-channel intensity, writing into `dst`.
///
/// `dst` is resized to the frame and reused across calls.
pub fn grayscale(frame: &Frame<'_>, dst: &mut ImageU8) -> Result<(), DetectError> {
    frame.validate()?;
    dst.reset(frame.width, frame.height);

    for y in 0..frame.height {
        let src = frame.row(y);
        let start = (y * dst.stride) as usize;
        let out = &mut dst.buf[start..start + frame.width as usize];
        match frame.format {
            PixelFormat::Gray => out.copy_from_slice(src),
            PixelFormat::Rgb | PixelFormat::Rgba => {
                let ch = frame.format.channels();
                for (o, px) in out.iter_mut().zip(src.chunks_exact(ch)) {
                    *o = luma(px[0], px[1], px[2]);
                }
            }
        }
    }
    Ok(())
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32 + 128) >> 8) as u8
}

/// Separable mean filter over a `(2 * radius + 1)` square window.
///
/// Edge pixels are replicated. `tmp` holds the horizontal pass; both `dst`
/// and `tmp` are resized to match `src`.
pub fn box_blur(src: &ImageU8, dst: &mut ImageU8, tmp: &mut ImageU8, radius: u32) {
    let w = src.width as i64;
    let h = src.height as i64;
    dst.reset(src.width, src.height);
    tmp.reset(src.width, src.height);
    if w == 0 || h == 0 {
        return;
    }

    let r = radius as i64;
    let window = (2 * r + 1) as u32;

    // Horizontal pass with a running sum
    for y in 0..h {
        let row = src.row(y as u32);
        let at = |x: i64| row[x.clamp(0, w - 1) as usize] as u32;
        let mut sum: u32 = (-r..=r).map(at).sum();
        for x in 0..w {
            tmp.set(x as u32, y as u32, (sum / window) as u8);
            sum += at(x + r + 1);
            sum -= at(x - r);
        }
    }

    // Vertical pass
    for x in 0..w {
        let at = |y: i64| tmp.get(x as u32, y.clamp(0, h - 1) as u32) as u32;
        let mut sum: u32 = (-r..=r).map(at).sum();
        for y in 0..h {
            dst.set(x as u32, y as u32, (sum / window) as u8);
            sum += at(y + r + 1);
            sum -= at(y - r);
        }
    }
}
