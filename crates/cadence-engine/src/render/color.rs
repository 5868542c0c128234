/// Straight-alpha 8-bit RGBA color.
///
/// Canvas pixels are stored packed as `0xAARRGGBB`, which is `BGRA` byte order
/// on little-endian targets and matches the presentation texture format.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const LIGHT_GRAY: Color = Color::rgb(192, 192, 192);
    pub const DARK_GRAY: Color = Color::rgb(64, 64, 64);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let byte = |i: usize| -> Option<u8> { u8::from_str_radix(hex.get(i..i + 2)?, 16).ok() };

        match hex.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Packs into the canvas pixel format.
    #[inline]
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    #[inline]
    pub const fn from_argb(px: u32) -> Self {
        Self {
            a: (px >> 24) as u8,
            r: (px >> 16) as u8,
            g: (px >> 8) as u8,
            b: px as u8,
        }
    }

    /// Composites `self` over `dst` with `coverage` (0-255) scaling the alpha.
    ///
    /// The destination is treated as opaque, which holds for every canvas
    /// after its per-frame clear.
    pub fn blend_over(self, dst: u32, coverage: u8) -> u32 {
        let alpha = self.a as u32 * coverage as u32 / 255;
        if alpha == 0 {
            return dst;
        }
        if alpha == 255 {
            return self.to_argb();
        }

        let d = Color::from_argb(dst);
        let mix = |s: u8, d: u8| ((s as u32 * alpha + d as u32 * (255 - alpha)) / 255) as u8;

        Color::rgba(mix(self.r, d.r), mix(self.g, d.g), mix(self.b, d.b), 255).to_argb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb_packing_round_trips() {
        let c = Color::rgba(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.to_argb(), 0x7812_3456);
        assert_eq!(Color::from_argb(0x7812_3456), c);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Color::from_hex("#00ff00"), Some(Color::GREEN));
        assert_eq!(Color::from_hex("ff000080"), Some(Color::RED.with_alpha(0x80)));
        assert_eq!(Color::from_hex("#0f0"), None);
        assert_eq!(Color::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn blending_respects_coverage() {
        let dst = Color::BLACK.to_argb();

        assert_eq!(Color::WHITE.blend_over(dst, 255), Color::WHITE.to_argb());
        assert_eq!(Color::WHITE.blend_over(dst, 0), dst);

        let half = Color::from_argb(Color::WHITE.blend_over(dst, 128));
        assert!(half.r > 120 && half.r < 136);
        assert_eq!(half.a, 255);
    }
}
