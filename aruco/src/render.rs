use crate::bits::BitMatrix;
use crate::detect::image::ImageU8;
use crate::dictionary::Dimension;

/// Render the marker encoding `id` as a grayscale image.
///
/// The image is `(d + 2) * cell_px` pixels square: a one-cell black border
/// around the `d x d` data cells, white for bit 1 and black for bit 0.
/// Returns `None` when `id` is out of range for `dimension` or `cell_px` is 0.
pub fn render_marker(id: u32, dimension: Dimension, cell_px: u32) -> Option<ImageU8> {
    if cell_px == 0 {
        return None;
    }
    let bits = BitMatrix::from_id(id, dimension)?;
    Some(render_bits(&bits, cell_px))
}

/// Render an arbitrary bit matrix with a black border.
pub fn render_bits(bits: &BitMatrix, cell_px: u32) -> ImageU8 {
    let n = bits.dimension().size();
    let side = (n as u32 + 2) * cell_px;
    let mut img = ImageU8::new(side, side);

    for i in 0..n {
        for j in 0..n {
            if bits.get(i, j) == 0 {
                continue;
            }
            let x0 = (j as u32 + 1) * cell_px;
            let y0 = (i as u32 + 1) * cell_px;
            for y in y0..y0 + cell_px {
                for x in x0..x0 + cell_px {
                    img.set(x, y, 255);
                }
            }
        }
    }
    img
}

/// Surround an image with a `margin` pixel frame of value `fill`.
pub fn pad(img: &ImageU8, margin: u32, fill: u8) -> ImageU8 {
    let mut out = ImageU8::filled(img.width + 2 * margin, img.height + 2 * margin, fill);
    for y in 0..img.height {
        let start = ((y + margin) * out.stride + margin) as usize;
        out.buf[start..start + img.width as usize].copy_from_slice(img.row(y));
    }
    out
}
