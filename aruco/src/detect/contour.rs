use super::image::ImageU8;
use super::polygon::Point;

/// A closed boundary traced around a foreground region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    pub points: Vec<Point>,
    /// True when this is the inner boundary of a hole in a region.
    pub hole: bool,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 8-neighborhood offsets, counter-clockwise on screen starting east.
const NEIGHBORHOOD: [(i32, i32); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Trace every outer and hole border of the non-zero regions of `binary`.
///
/// Implements Suzuki-Abe border following with 8-connectivity. `labels` is a
/// scratch buffer holding the padded label image; it is resized as needed
/// and reused across calls. Contours come back in raster discovery order.
pub fn find_contours(binary: &ImageU8, labels: &mut Vec<i32>) -> Vec<Contour> {
    let w = binary.width as usize;
    let h = binary.height as usize;
    if w == 0 || h == 0 {
        return Vec::new();
    }

    // One pixel of background padding on every side.
    let pw = w + 2;
    labels.clear();
    labels.resize(pw * (h + 2), 0);
    for y in 0..h {
        let row = binary.row(y as u32);
        let dst = &mut labels[(y + 1) * pw + 1..(y + 1) * pw + 1 + w];
        for (d, &v) in dst.iter_mut().zip(row) {
            *d = (v != 0) as i32;
        }
    }

    let mut deltas = [0isize; 16];
    for (i, &(dx, dy)) in NEIGHBORHOOD.iter().enumerate() {
        let d = dx as isize + dy as isize * pw as isize;
        deltas[i] = d;
        deltas[i + 8] = d;
    }

    let mut contours = Vec::new();
    let mut nbd = 1i32;

    for y in 0..h {
        for x in 0..w {
            let pos = (y + 1) * pw + x + 1;
            let pix = labels[pos];
            if pix == 0 {
                continue;
            }
            let outer = pix == 1 && labels[pos - 1] == 0;
            let hole = !outer && pix >= 1 && labels[pos + 1] == 0;
            if outer || hole {
                nbd += 1;
                let start = Point::new(x as i32, y as i32);
                contours.push(follow_border(labels, &deltas, pos, start, nbd, hole));
            }
        }
    }

    contours
}

/// Follow one border starting at `pos`, labelling visited pixels with `nbd`.
///
/// Pixels whose east neighbor was examined as background get `-nbd` so they
/// never start another border.
fn follow_border(
    labels: &mut [i32],
    deltas: &[isize; 16],
    pos: usize,
    start: Point,
    nbd: i32,
    hole: bool,
) -> Contour {
    let at = |p: usize, s: usize| (p as isize + deltas[s]) as usize;
    let mut points = Vec::new();

    // The starting background neighbor: west for outer, east for hole borders.
    let first_bg = if hole { 0 } else { 4 };

    // Clockwise search for the first foreground neighbor.
    let found = (1..8)
        .map(|k| (first_bg + 8 - k) & 7)
        .find(|&s| labels[at(pos, s)] != 0);

    let Some(mut s) = found else {
        // Isolated pixel.
        labels[pos] = -nbd;
        points.push(start);
        return Contour { points, hole };
    };

    let pos1 = at(pos, s);
    let mut pos3 = pos;
    let mut point = start;

    loop {
        // Counter-clockwise search from just past the previous pixel.
        let s_end = s;
        let mut pos4;
        loop {
            s += 1;
            pos4 = at(pos3, s);
            if labels[pos4] != 0 {
                break;
            }
        }
        s &= 7;

        if s.wrapping_sub(1) < s_end {
            labels[pos3] = -nbd;
        } else if labels[pos3] == 1 {
            labels[pos3] = nbd;
        }

        points.push(point);
        point.x += NEIGHBORHOOD[s].0;
        point.y += NEIGHBORHOOD[s].1;

        if pos4 == pos && pos3 == pos1 {
            break;
        }
        pos3 = pos4;
        s = (s + 4) & 7;
    }

    Contour { points, hole }
}
