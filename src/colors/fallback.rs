//! Deterministic colour naming used when the naming service is unavailable.

/// Channel spread below which a colour counts as achromatic.
pub const ACHROMATIC_SPREAD: u8 = 40;

/// Names a normalized `rrggbb` key from its channel values alone.
pub fn fallback_color_name(key: &str) -> &'static str {
    let Some((r, g, b)) = parse_rgb(key) else {
        return "unknown";
    };

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);

    if max - min < ACHROMATIC_SPREAD {
        let mean = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
        return match mean {
            0..=49 => "black",
            50..=199 => "gray",
            _ => "white",
        };
    }

    if r > g && r > b {
        if g > 100 && b < 100 {
            return "orange";
        }
        if g < 100 && b > 100 {
            return "purple";
        }
        return "red";
    }

    if g > r && g > b {
        if r > 100 && b < 100 {
            return "yellow";
        }
        if r < 100 && b > 100 {
            return "blue";
        }
        return "green";
    }

    if b > r && b > g {
        if r > 100 && g < 100 {
            return "purple";
        }
        return "blue";
    }

    "mixed"
}

fn parse_rgb(key: &str) -> Option<(u8, u8, u8)> {
    if key.len() != 6 || !key.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&key[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
