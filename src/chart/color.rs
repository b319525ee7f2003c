//! Two-color linear gradients for magnitude-coded bars

use serde::Serialize;
use std::fmt;

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A linear gradient between two named colors, sampled through a lookup
/// table of `steps` entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGradient {
    pub low: (&'static str, Rgb),
    pub high: (&'static str, Rgb),
    pub steps: usize,
}

/// Blue at zero, red at the maximum
pub const BLUE_RED: LinearGradient = LinearGradient {
    low: ("blue", Rgb::BLUE),
    high: ("red", Rgb::RED),
    steps: 256,
};

impl LinearGradient {
    /// Color at `t`, clamped to `[0, 1]`. NaN maps to the low end.
    pub fn sample(&self, t: f64) -> Rgb {
        let steps = self.steps.max(2);
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let idx = ((t * steps as f64) as usize).min(steps - 1);
        let frac = idx as f64 / (steps - 1) as f64;

        let lerp = |a: u8, b: u8| -> u8 {
            let v = a as f64 + (b as f64 - a as f64) * frac;
            v.round().clamp(0.0, 255.0) as u8
        };
        let (_, lo) = self.low;
        let (_, hi) = self.high;
        Rgb(lerp(lo.0, hi.0), lerp(lo.1, hi.1), lerp(lo.2, hi.2))
    }

    pub fn hex(&self, t: f64) -> String {
        self.sample(t).to_hex()
    }

    /// Plotly colorscale: `[[0, low], [1, high]]`
    pub fn colorscale(&self) -> Vec<(f64, String)> {
        vec![
            (0.0, self.low.0.to_string()),
            (1.0, self.high.0.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(BLUE_RED.hex(0.0), "#0000ff");
        assert_eq!(BLUE_RED.hex(1.0), "#ff0000");
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(BLUE_RED.hex(-3.0), "#0000ff");
        assert_eq!(BLUE_RED.hex(7.5), "#ff0000");
        assert_eq!(BLUE_RED.hex(f64::NAN), "#0000ff");
    }

    #[test]
    fn test_midpoint() {
        // 0.5 * 256 = 128th entry
        assert_eq!(BLUE_RED.sample(0.5), Rgb(128, 0, 127));
    }

    #[test]
    fn test_monotonic_red_channel() {
        let mut last = 0u8;
        for i in 0..=100 {
            let c = BLUE_RED.sample(i as f64 / 100.0);
            assert!(c.0 >= last);
            assert_eq!(c.0 as u16 + c.2 as u16, 255);
            last = c.0;
        }
    }

    #[test]
    fn test_colorscale() {
        let scale = BLUE_RED.colorscale();
        assert_eq!(scale[0], (0.0, "blue".to_string()));
        assert_eq!(scale[1], (1.0, "red".to_string()));
    }
}
