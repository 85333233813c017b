//! CPU Filter Backend
//!
//! Pure-Rust renditions of the six named primitives the filter catalog uses.
//! All work happens on RGBA8 buffers through the `image` crate; nothing here
//! tries to be fast.

use bridge_traits::{
    error::{BridgeError, Result},
    filter::{FilterBackend, FilterRequest, INPUT_COLOR, INPUT_INTENSITY, INPUT_LEVELS, INPUT_RADIUS},
};
use image::{DynamicImage, Rgba, RgbaImage};
use tracing::trace;

pub const SEPIA_TONE: &str = "CISepiaTone";
pub const PHOTO_EFFECT_TRANSFER: &str = "CIPhotoEffectTransfer";
pub const PHOTO_EFFECT_TONAL: &str = "CIPhotoEffectTonal";
pub const COLOR_MONOCHROME: &str = "CIColorMonochrome";
pub const COLOR_POSTERIZE: &str = "CIColorPosterize";
pub const BOX_BLUR: &str = "CIBoxBlur";

const SUPPORTED: [&str; 6] = [
    SEPIA_TONE,
    PHOTO_EFFECT_TRANSFER,
    PHOTO_EFFECT_TONAL,
    COLOR_MONOCHROME,
    COLOR_POSTERIZE,
    BOX_BLUR,
];

// Primitive defaults when an input is not supplied.
const DEFAULT_INTENSITY: f32 = 1.0;
const DEFAULT_RADIUS: f32 = 10.0;
const DEFAULT_LEVELS: f32 = 6.0;
const DEFAULT_TINT: [f32; 4] = [0.6, 0.45, 0.3, 1.0];

/// Software implementation of [`FilterBackend`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuFilterBackend;

impl CpuFilterBackend {
    pub fn new() -> Self {
        Self
    }
}

impl FilterBackend for CpuFilterBackend {
    fn supports(&self, system_name: &str) -> bool {
        SUPPORTED.contains(&system_name)
    }

    fn render(&self, request: &FilterRequest, image: &DynamicImage) -> Result<Option<DynamicImage>> {
        if !self.supports(&request.system_name) {
            return Err(BridgeError::NotAvailable(format!(
                "unknown filter primitive: {}",
                request.system_name
            )));
        }
        if image.width() == 0 || image.height() == 0 {
            return Ok(None);
        }

        trace!(request = %request, width = image.width(), height = image.height(), "Rendering");

        let source = image.to_rgba8();
        let output = match request.system_name.as_str() {
            SEPIA_TONE => {
                let intensity = request.scalar(INPUT_INTENSITY).unwrap_or(DEFAULT_INTENSITY);
                unit(intensity).map(|t| sepia(&source, t))
            }
            PHOTO_EFFECT_TRANSFER => Some(transfer(&source)),
            PHOTO_EFFECT_TONAL => Some(tonal(&source)),
            COLOR_MONOCHROME => {
                let intensity = request.scalar(INPUT_INTENSITY).unwrap_or(DEFAULT_INTENSITY);
                let tint = request.color(INPUT_COLOR).unwrap_or(DEFAULT_TINT);
                match (unit(intensity), tint.iter().all(|c| c.is_finite())) {
                    (Some(t), true) => Some(monochrome(&source, tint, t)),
                    _ => None,
                }
            }
            COLOR_POSTERIZE => {
                let levels = request.scalar(INPUT_LEVELS).unwrap_or(DEFAULT_LEVELS);
                posterize(&source, levels)
            }
            BOX_BLUR => {
                let radius = request.scalar(INPUT_RADIUS).unwrap_or(DEFAULT_RADIUS);
                if radius.is_finite() && radius >= 0.0 {
                    Some(box_blur(&source, radius.round() as u32))
                } else {
                    None
                }
            }
            _ => None,
        };

        Ok(output.map(DynamicImage::ImageRgba8))
    }
}

fn unit(value: f32) -> Option<f32> {
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

fn to_unit(px: &Rgba<u8>) -> [f32; 4] {
    [
        px[0] as f32 / 255.0,
        px[1] as f32 / 255.0,
        px[2] as f32 / 255.0,
        px[3] as f32 / 255.0,
    ]
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn map_pixels(source: &RgbaImage, f: impl Fn([f32; 4]) -> [f32; 3]) -> RgbaImage {
    let mut out = RgbaImage::new(source.width(), source.height());
    for (x, y, px) in source.enumerate_pixels() {
        let rgba = to_unit(px);
        let [r, g, b] = f(rgba);
        out.put_pixel(x, y, Rgba([to_byte(r), to_byte(g), to_byte(b), px[3]]));
    }
    out
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// BT.709 luma
fn luminance(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

fn sepia(source: &RgbaImage, intensity: f32) -> RgbaImage {
    map_pixels(source, |[r, g, b, _]| {
        let sr = 0.393 * r + 0.769 * g + 0.189 * b;
        let sg = 0.349 * r + 0.686 * g + 0.168 * b;
        let sb = 0.272 * r + 0.534 * g + 0.131 * b;
        [mix(r, sr, intensity), mix(g, sg, intensity), mix(b, sb, intensity)]
    })
}

/// Faded, warm print look: lifted blacks, softened whites, red up, blue down.
fn transfer(source: &RgbaImage) -> RgbaImage {
    map_pixels(source, |[r, g, b, _]| {
        let fade = |c: f32| 0.06 + 0.86 * c;
        [fade(r) * 1.08, fade(g) * 1.02, fade(b) * 0.86]
    })
}

fn tonal(source: &RgbaImage) -> RgbaImage {
    map_pixels(source, |[r, g, b, _]| {
        let y = ((luminance(r, g, b) - 0.5) * 1.12 + 0.5).clamp(0.0, 1.0);
        [y, y, y]
    })
}

fn monochrome(source: &RgbaImage, tint: [f32; 4], intensity: f32) -> RgbaImage {
    map_pixels(source, |[r, g, b, _]| {
        let y = luminance(r, g, b);
        [
            mix(r, y * tint[0], intensity),
            mix(g, y * tint[1], intensity),
            mix(b, y * tint[2], intensity),
        ]
    })
}

/// Quantizes every colour channel to `levels` steps. Fewer than two steps
/// cannot represent an image, so the primitive yields nothing.
fn posterize(source: &RgbaImage, levels: f32) -> Option<RgbaImage> {
    if !levels.is_finite() {
        return None;
    }
    let steps = levels.round();
    if steps < 2.0 {
        return None;
    }
    let scale = steps - 1.0;
    Some(map_pixels(source, |[r, g, b, _]| {
        let q = |c: f32| (c * scale).round() / scale;
        [q(r), q(g), q(b)]
    }))
}

/// Box average over a `(2r + 1)²` window. The canvas grows by `radius` on
/// every side and samples beyond the source are transparent, so edges fade
/// out instead of being clamped.
fn box_blur(source: &RgbaImage, radius: u32) -> RgbaImage {
    if radius == 0 {
        return source.clone();
    }

    let (width, height) = (source.width() as usize, source.height() as usize);
    let r = radius as usize;
    let out_w = width + 2 * r;
    let out_h = height + 2 * r;
    let window = (2 * r + 1) as f32;

    // premultiplied canvas with transparent border
    let mut canvas = vec![[0f32; 4]; out_w * out_h];
    for (x, y, px) in source.enumerate_pixels() {
        let [cr, cg, cb, ca] = to_unit(px);
        canvas[(y as usize + r) * out_w + x as usize + r] = [cr * ca, cg * ca, cb * ca, ca];
    }

    let horizontal = blur_lines(&canvas, out_w, out_h, r, 1, out_w);
    let blurred = blur_lines(&horizontal, out_h, out_w, r, out_w, 1);

    let mut out = RgbaImage::new(out_w as u32, out_h as u32);
    for (i, sum) in blurred.iter().enumerate() {
        let a = sum[3] / (window * window);
        let px = if a > 0.0 {
            let unpremultiply = |c: f32| c / (window * window) / a;
            Rgba([
                to_byte(unpremultiply(sum[0])),
                to_byte(unpremultiply(sum[1])),
                to_byte(unpremultiply(sum[2])),
                to_byte(a),
            ])
        } else {
            Rgba([0, 0, 0, 0])
        };
        out.put_pixel((i % out_w) as u32, (i / out_w) as u32, px);
    }
    out
}

/// Running window sum along one axis. `len` samples per line, `lines` lines,
/// `step` between samples of a line, `stride` between line starts.
fn blur_lines(
    data: &[[f32; 4]],
    len: usize,
    lines: usize,
    r: usize,
    step: usize,
    stride: usize,
) -> Vec<[f32; 4]> {
    let mut out = vec![[0f32; 4]; data.len()];
    for line in 0..lines {
        let base = line * stride;
        let at = |i: usize| data[base + i * step];
        let mut sum = [0f32; 4];
        for i in 0..=r.min(len - 1) {
            add(&mut sum, at(i), 1.0);
        }
        for i in 0..len {
            out[base + i * step] = sum;
            if i + r + 1 < len {
                add(&mut sum, at(i + r + 1), 1.0);
            }
            if i >= r {
                add(&mut sum, at(i - r), -1.0);
            }
        }
    }
    out
}

fn add(sum: &mut [f32; 4], px: [f32; 4], sign: f32) {
    for c in 0..4 {
        sum[c] += sign * px[c];
    }
}
