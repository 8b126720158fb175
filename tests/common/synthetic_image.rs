/// Packed RGB test image.
#[derive(Clone, Debug)]
pub struct SyntheticRgb {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl SyntheticRgb {
    /// Image filled with one color.
    pub fn solid(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        assert!(width > 0 && height > 0, "image dimensions must be positive");
        let data = rgb.iter().copied().cycle().take(width * height * 3).collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Horizontal brightness ramp from `left` to `right` (gray levels).
    pub fn ramp(width: usize, height: usize, left: u8, right: u8) -> Self {
        let mut img = Self::solid(width, height, [0, 0, 0]);
        for y in 0..height {
            for x in 0..width {
                let t = x as f32 / (width - 1).max(1) as f32;
                let v = (left as f32 + t * (right as f32 - left as f32)).round() as u8;
                img.set(x, y, [v, v, v]);
            }
        }
        img
    }

    pub fn set(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Paint the `w × h` rectangle with top-left corner `(x0, y0)`.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, w: usize, h: usize, rgb: [u8; 3]) -> &mut Self {
        assert!(x0 + w <= self.width && y0 + h <= self.height, "rectangle out of bounds");
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                self.set(x, y, rgb);
            }
        }
        self
    }

    /// Scatter `size × size` dots on a regular grid with the given pitch.
    pub fn dots(&mut self, size: usize, pitch: usize, rgb: [u8; 3]) -> &mut Self {
        assert!(pitch > size, "dots must not touch");
        let mut y = pitch / 2;
        while y + size <= self.height {
            let mut x = pitch / 2;
            while x + size <= self.width {
                self.fill_rect(x, y, size, size, rgb);
                x += pitch;
            }
            y += pitch;
        }
        self
    }

    /// Deterministic low-amplitude texture in `[-amplitude, amplitude]`.
    pub fn add_texture(&mut self, amplitude: u8) -> &mut Self {
        let mut state = 0x2545_f491u32;
        for px in self.data.chunks_exact_mut(3) {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let span = 2 * amplitude as i32 + 1;
            let delta = (state % span as u32) as i32 - amplitude as i32;
            for c in px.iter_mut() {
                *c = (*c as i32 + delta).clamp(0, 255) as u8;
            }
        }
        self
    }

    pub fn view(&self) -> dirt_detector::image::RawImage<'_> {
        dirt_detector::image::RawImage::rgb(self.width, self.height, &self.data)
    }
}

pub const WHITE: [u8; 3] = [255, 255, 255];
pub const GRIME: [u8; 3] = [40, 32, 28];
