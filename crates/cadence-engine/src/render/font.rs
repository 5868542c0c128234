use std::fmt;
use std::path::Path;

/// Error returned by [`Font::from_bytes`] and [`Font::from_file`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/Library/Fonts/Courier New.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

/// Rasterized coverage for one glyph.
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Offset from the pen position to the bitmap's left edge.
    pub xmin: i32,
    /// Offset from the baseline to the bitmap's bottom edge (+Y up).
    pub ymin: i32,
    pub width: usize,
    pub height: usize,
    pub advance: f32,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

/// A parsed TrueType/OpenType font used by `Canvas::draw_text`.
///
/// Fonts are immutable after loading and shared between canvases.
pub struct Font {
    inner: fontdue::Font,
}

impl Font {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FontLoadError> {
        let inner = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        Ok(Self { inner })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FontLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| FontLoadError(format!("{}: {e}", path.display())))?;
        Self::from_bytes(&bytes)
    }

    /// Loads the first usable font from a list of well-known system locations.
    pub fn system() -> Option<Self> {
        SYSTEM_FONT_PATHS.iter().find_map(|p| match Self::from_file(p) {
            Ok(font) => {
                log::debug!("loaded system font {p}");
                Some(font)
            }
            Err(_) => None,
        })
    }

    pub fn rasterize(&self, ch: char, px: f32) -> Glyph {
        let (m, coverage) = self.inner.rasterize(ch, px);
        Glyph {
            xmin: m.xmin,
            ymin: m.ymin,
            width: m.width,
            height: m.height,
            advance: m.advance_width,
            coverage,
        }
    }

    /// Horizontal advance of `text` at `px`, in pixels.
    #[must_use]
    pub fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars()
            .map(|ch| self.inner.metrics(ch, px).advance_width)
            .sum()
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("units_per_em", &self.inner.units_per_em())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_rejected() {
        let err = Font::from_bytes(b"definitely not a font").unwrap_err();
        assert!(err.to_string().starts_with("font load error"));
    }

    #[test]
    fn measure_matches_the_drawn_advance() {
        // Only meaningful where a system font is installed.
        let Some(font) = Font::system() else {
            return;
        };
        let width = font.measure("SCORE", 14.0);
        assert!(width > 0.0);

        let mut canvas = crate::render::Canvas::new(200, 40);
        canvas.set_font(Some(std::sync::Arc::new(font)));
        let advance = canvas.draw_text("SCORE", 0, 20, crate::render::Color::WHITE);
        assert_eq!(advance, width.round() as i32);
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = Font::from_file("/nonexistent/cadence.ttf").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cadence.ttf"));
    }
}
