use super::image::ImageU8;
use super::preprocess::box_blur;

/// Locally adaptive binarization against a box-blurred background.
///
/// A pixel becomes foreground (255) when it is at least `c` levels darker
/// than the mean of its `(2 * radius + 1)` neighborhood, else 0. Dark marker
/// borders therefore come out as thin foreground rings. `blur` and `tmp` are
/// scratch buffers.
pub fn adaptive_threshold(
    src: &ImageU8,
    dst: &mut ImageU8,
    blur: &mut ImageU8,
    tmp: &mut ImageU8,
    radius: u32,
    c: u8,
) {
    box_blur(src, blur, tmp, radius);
    dst.reset(src.width, src.height);

    let c = c as i32;
    for y in 0..src.height {
        for x in 0..src.width {
            let diff = src.get(x, y) as i32 - blur.get(x, y) as i32;
            dst.set(x, y, if diff <= -c { 255 } else { 0 });
        }
    }
}

/// Binarize at a fixed level: 255 where `src > level`, else 0.
///
/// `src` and `dst` may not alias; use [`threshold_in_place`] for that.
pub fn threshold(src: &ImageU8, dst: &mut ImageU8, level: u8) {
    dst.reset(src.width, src.height);
    for y in 0..src.height {
        for x in 0..src.width {
            dst.set(x, y, if src.get(x, y) > level { 255 } else { 0 });
        }
    }
}

/// Binarize an image at a fixed level, overwriting it.
pub fn threshold_in_place(img: &mut ImageU8, level: u8) {
    for v in img.buf.iter_mut() {
        *v = if *v > level { 255 } else { 0 };
    }
}

/// Otsu's global threshold: the level maximizing between-class variance.
///
/// Pixels `<= level` form the dark class. Returns 0 for an empty or
/// single-valued image.
pub fn otsu(img: &ImageU8) -> u8 {
    let mut hist = [0u64; 256];
    for y in 0..img.height {
        for &v in img.row(y) {
            hist[v as usize] += 1;
        }
    }

    let total: u64 = hist.iter().sum();
    if total == 0 {
        return 0;
    }
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &n)| i as f64 * n as f64)
        .sum();

    let mut best_level = 0u8;
    let mut best_var = 0.0f64;
    let mut w_dark = 0u64;
    let mut sum_dark = 0.0f64;

    for (level, &n) in hist.iter().enumerate() {
        w_dark += n;
        if w_dark == 0 {
            continue;
        }
        let w_light = total - w_dark;
        if w_light == 0 {
            break;
        }
        sum_dark += level as f64 * n as f64;

        let mean_dark = sum_dark / w_dark as f64;
        let mean_light = (sum_all - sum_dark) / w_light as f64;
        let between = w_dark as f64 * w_light as f64 * (mean_dark - mean_light).powi(2);
        if between > best_var {
            best_var = between;
            best_level = level as u8;
        }
    }

    best_level
}
