//! Categorical color palettes.

/// Base categorical palette, used as-is for up to ten categories.
pub const BASE_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Saturation used for generated palettes.
const SATURATION: f64 = 0.7;
/// Value (brightness) used for generated palettes.
const VALUE: f64 = 0.9;

/// Deterministic palette with `n` colors.
///
/// Up to [`BASE_COLORS`] length the base palette is truncated; beyond that
/// every color is generated by spacing hues evenly around the wheel.
pub fn generate_palette(n: usize) -> Vec<String> {
    if n <= BASE_COLORS.len() {
        return BASE_COLORS[..n].iter().map(|c| c.to_string()).collect();
    }

    (0..n)
        .map(|i| {
            let hue = i as f64 / n as f64;
            let (r, g, b) = hsv_to_rgb(hue, SATURATION, VALUE);
            rgb_to_hex(r, g, b)
        })
        .collect()
}

/// Convert HSV (all components in `[0, 1]`) to RGB in `[0, 1]`.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Hex string for unit-range RGB. Channels are truncated, not rounded.
fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
    let channel = |c: f64| (c * 255.0).clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}
