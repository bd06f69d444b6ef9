// File: src/color_utils.rs
use std::hash::{Hash, Hasher};

/// Deterministic RGB color for a tag name.
///
/// Dark backgrounds get light tints (L: 65-90%), light backgrounds get
/// deeper ones (L: 30-50%) so tags stay readable on either.
pub fn tag_color(tag: &str, dark_background: bool) -> (u8, u8, u8) {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    tag.to_lowercase().hash(&mut hasher);
    let hash = hasher.finish();

    let h = (hash % 360) as f32;
    let s = 0.40 + (((hash >> 16) % 51) as f32 / 100.0);
    let l = if dark_background {
        0.65 + (((hash >> 32) % 26) as f32 / 100.0)
    } else {
        0.30 + (((hash >> 32) % 21) as f32 / 100.0)
    };

    let (r, g, b) = hsl_to_rgb(h, s, l);
    (to_byte(r), to_byte(g), to_byte(b))
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = if (0.0..60.0).contains(&h) {
        (c, x, 0.0)
    } else if (60.0..120.0).contains(&h) {
        (x, c, 0.0)
    } else if (120.0..180.0).contains(&h) {
        (0.0, c, x)
    } else if (180.0..240.0).contains(&h) {
        (0.0, x, c)
    } else if (240.0..300.0).contains(&h) {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brightness((r, g, b): (u8, u8, u8)) -> f32 {
        (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) / 255.0
    }

    #[test]
    fn same_tag_same_color_ignoring_case() {
        assert_eq!(tag_color("Work", true), tag_color("work", true));
    }

    #[test]
    fn tint_follows_background() {
        for tag in ["work", "home", "errands", "health"] {
            assert!(brightness(tag_color(tag, true)) > brightness(tag_color(tag, false)));
        }
    }
}
