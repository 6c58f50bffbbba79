//! Color utility functions for box overlays.
//!
//! Every label gets a stable color so the same class looks the same on every
//! image and across sessions.

/// Golden angle in degrees; consecutive class ids land far apart on the hue wheel.
const GOLDEN_ANGLE: f32 = 137.508;

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `v` - Value/brightness (0.0-1.0)
///
/// # Returns
/// RGB tuple with values in range 0.0-1.0
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// Hue for a label: numeric class ids step by the golden angle, other labels are hashed.
pub fn label_hue(label: &str) -> f32 {
    match label.parse::<u32>() {
        Ok(id) => (id as f32 * GOLDEN_ANGLE) % 360.0,
        Err(_) => (fnv1a(label.as_bytes()) % 360) as f32,
    }
}

/// Stable RGB color for a label.
pub fn label_color(label: &str) -> [u8; 3] {
    let (r, g, b) = hsv_to_rgb(label_hue(label), 0.85, 0.95);
    [to_u8(r), to_u8(g), to_u8(b)]
}

fn to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// 32-bit FNV-1a; stable across runs, unlike the std hasher.
fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5_u32, |hash, &b| {
        (hash ^ u32::from(b)).wrapping_mul(0x0100_0193)
    })
}
