use crate::error::DetectError;

/// Grayscale image with row-major pixel data.
#[derive(Debug, Clone, Default)]
pub struct ImageU8 {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub buf: Vec<u8>,
}

impl ImageU8 {
    /// Create a new image filled with zeros.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = width;
        let buf = vec![0u8; (stride * height) as usize];
        Self { width, height, stride, buf }
    }

    /// Create an image filled with `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        let mut img = Self::new(width, height);
        img.buf.fill(value);
        img
    }

    /// Create an image from existing pixel data.
    ///
    /// `stride` must be >= `width`, and `buf` must contain at least
    /// `stride * height` bytes.
    pub fn from_buf(
        width: u32,
        height: u32,
        stride: u32,
        buf: Vec<u8>,
    ) -> Result<Self, DetectError> {
        if stride < width {
            return Err(DetectError::InvalidInput(format!(
                "stride {stride} is smaller than width {width}"
            )));
        }
        let needed = stride as usize * height as usize;
        if buf.len() < needed {
            return Err(DetectError::InvalidInput(format!(
                "image buffer holds {} bytes, {needed} required",
                buf.len()
            )));
        }
        Ok(Self { width, height, stride, buf })
    }

    /// Resize in place for reuse as a scratch buffer.
    ///
    /// Keeps the allocation when it is already large enough. Pixel contents
    /// are unspecified afterwards.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.stride = width;
        self.buf.resize((width * height) as usize, 0);
    }

    /// Get the pixel value at (x, y).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.buf[(y * self.stride + x) as usize]
    }

    /// Set the pixel value at (x, y).
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, val: u8) {
        self.buf[(y * self.stride + x) as usize] = val;
    }

    /// One row of pixels, without stride padding.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = (y * self.stride) as usize;
        &self.buf[start..start + self.width as usize]
    }

    /// Bilinear interpolation with integer coordinates at pixel centers.
    ///
    /// Coordinates outside the image are clamped to the nearest edge pixel.
    pub fn interpolate(&self, px: f64, py: f64) -> f64 {
        let x0 = px.floor() as i64;
        let y0 = py.floor() as i64;
        let x1 = x0 + 1;
        let y1 = y0 + 1;

        let fx = px - x0 as f64;
        let fy = py - y0 as f64;

        let w = self.width as i64;
        let h = self.height as i64;

        let clamp_x = |v: i64| v.clamp(0, w - 1) as u32;
        let clamp_y = |v: i64| v.clamp(0, h - 1) as u32;

        let v00 = self.get(clamp_x(x0), clamp_y(y0)) as f64;
        let v10 = self.get(clamp_x(x1), clamp_y(y0)) as f64;
        let v01 = self.get(clamp_x(x0), clamp_y(y1)) as f64;
        let v11 = self.get(clamp_x(x1), clamp_y(y1)) as f64;

        v00 * (1.0 - fx) * (1.0 - fy)
            + v10 * fx * (1.0 - fy)
            + v01 * (1.0 - fx) * fy
            + v11 * fx * fy
    }

    /// Count non-zero pixels inside `rect`, clipped to the image.
    pub fn count_non_zero(&self, rect: Rect) -> usize {
        let x_end = (rect.x + rect.width).min(self.width);
        let y_end = (rect.y + rect.height).min(self.height);
        if rect.x >= x_end || rect.y >= y_end {
            return 0;
        }
        (rect.y..y_end)
            .map(|y| {
                self.row(y)[rect.x as usize..x_end as usize]
                    .iter()
                    .filter(|&&v| v != 0)
                    .count()
            })
            .sum()
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// A `size x size` square with top-left corner at (x, y).
    pub fn square(x: u32, y: u32, size: u32) -> Self {
        Self { x, y, width: size, height: size }
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

/// Pixel layout of a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Gray,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Borrowed input image. `stride` is the row pitch in pixels.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub format: PixelFormat,
    pub data: &'a [u8],
}

impl<'a> Frame<'a> {
    /// A frame with tightly packed rows.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: &'a [u8]) -> Self {
        Self { width, height, stride: width, format, data }
    }

    pub fn gray(width: u32, height: u32, data: &'a [u8]) -> Self {
        Self::new(width, height, PixelFormat::Gray, data)
    }

    pub fn rgba(width: u32, height: u32, data: &'a [u8]) -> Self {
        Self::new(width, height, PixelFormat::Rgba, data)
    }

    /// Pixel data of row `y`, `width * channels` bytes.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let ch = self.format.channels();
        let start = y as usize * self.stride as usize * ch;
        &self.data[start..start + self.width as usize * ch]
    }

    /// Reject empty frames and buffers too short for the declared size.
    pub fn validate(&self) -> Result<(), DetectError> {
        if self.width == 0 || self.height == 0 {
            return Err(DetectError::InvalidInput(format!(
                "frame has zero size ({}x{})",
                self.width, self.height
            )));
        }
        if self.stride < self.width {
            return Err(DetectError::InvalidInput(format!(
                "frame stride {} is smaller than width {}",
                self.stride, self.width
            )));
        }
        let pixels = self.stride as usize * (self.height as usize - 1) + self.width as usize;
        let needed = pixels * self.format.channels();
        if self.data.len() < needed {
            return Err(DetectError::InvalidInput(format!(
                "frame buffer holds {} bytes, {needed} required for {}x{} {:?}",
                self.data.len(),
                self.width,
                self.height,
                self.format
            )));
        }
        Ok(())
    }
}

impl<'a> From<&'a ImageU8> for Frame<'a> {
    fn from(img: &'a ImageU8) -> Self {
        Frame {
            width: img.width,
            height: img.height,
            stride: img.stride,
            format: PixelFormat::Gray,
            data: &img.buf,
        }
    }
}
