use super::homography::Homography;
use super::image::ImageU8;
use super::polygon::Point;

/// Resample the quad `corners` of `src` into a `size x size` image.
///
/// Corner 0 lands at the top-left of `dst`, corner 1 at the top-right and so
/// on around the square. Samples are bilinear. Returns `false`, leaving `dst`
/// zeroed, when the quad is degenerate.
pub fn warp(src: &ImageU8, dst: &mut ImageU8, corners: &[Point; 4], size: u32) -> bool {
    dst.reset(size, size);

    let quad: [[f64; 2]; 4] = corners.map(Into::into);
    let Some(h) = Homography::from_square(size, &quad) else {
        dst.buf.fill(0);
        return false;
    };

    for y in 0..size {
        for x in 0..size {
            let (px, py) = h.project(x as f64, y as f64);
            if !px.is_finite() || !py.is_finite() {
                dst.set(x, y, 0);
                continue;
            }
            let v = src.interpolate(px, py);
            dst.set(x, y, v.round().clamp(0.0, 255.0) as u8);
        }
    }
    true
}
