use crate::paths::TextureAssets;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// RGBA color persisted as a CSS-style hex string (`#rrggbb` or
/// `#rrggbbaa`), the format the legacy config files use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        let parse = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(parse(0)?, parse(2)?, parse(4)?)),
            8 => Some(Self::rgba(parse(0)?, parse(2)?, parse(4)?, parse(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_color32(self) -> eframe::egui::Color32 {
        eframe::egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }

    /// Component-wise midpoint of two colors.
    pub fn blend_midpoint(a: Self, b: Self) -> Self {
        let mid = |x: u8, y: u8| ((x as u16 + y as u16) / 2) as u8;
        Self::rgba(
            mid(a.r, b.r),
            mid(a.g, b.g),
            mid(a.b, b.b),
            mid(a.a, b.a),
        )
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| D::Error::custom(format!("invalid hex color '{s}'")))
    }
}

/// The enumerated theme set. Wire names are the French strings the
/// config files use; `parse` additionally accepts the deprecated
/// `Texture1`/`Texture2` aliases and normalises them to their
/// replacements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Papier,
    Sticky,
    Sombre,
    Notes,
    Calpin,
    Personnalise,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Papier,
        Theme::Sticky,
        Theme::Sombre,
        Theme::Notes,
        Theme::Calpin,
        Theme::Personnalise,
    ];

    pub fn parse(name: &str) -> Option<Theme> {
        match name {
            "Papier" => Some(Theme::Papier),
            "Sticky" => Some(Theme::Sticky),
            "Sombre" => Some(Theme::Sombre),
            "Notes" | "Texture1" => Some(Theme::Notes),
            "Calpin" | "Texture2" => Some(Theme::Calpin),
            "Personnalisé" => Some(Theme::Personnalise),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Papier => "Papier",
            Theme::Sticky => "Sticky",
            Theme::Sombre => "Sombre",
            Theme::Notes => "Notes",
            Theme::Calpin => "Calpin",
            Theme::Personnalise => "Personnalisé",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomStyleMode {
    Color,
    Image,
}

/// User-chosen custom background: a hex color or an absolute image
/// path. An image path that no longer exists falls back to the
/// Papier stylesheet at resolution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomStyle {
    pub mode: CustomStyleMode,
    pub value: String,
}

impl Default for CustomStyle {
    fn default() -> Self {
        Self {
            mode: CustomStyleMode::Color,
            value: "#f7f1dc".into(),
        }
    }
}

/// Static palette behind one of the non-texture themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteStylesheet {
    pub window_fill: Color,
    pub editor_fill: Color,
    pub editor_border: Color,
    pub selection_bg: Color,
    pub text: Color,
}

pub const PAPIER: NoteStylesheet = NoteStylesheet {
    window_fill: Color::rgb(0xf7, 0xf1, 0xdc),
    editor_fill: Color::rgb(0xff, 0xf9, 0xe8),
    editor_border: Color::rgb(0xdc, 0xcf, 0xa8),
    selection_bg: Color::rgb(0xd9, 0xc8, 0x8f),
    text: Color::rgb(0x2f, 0x2a, 0x1f),
};

pub const STICKY: NoteStylesheet = NoteStylesheet {
    window_fill: Color::rgb(0xff, 0xf6, 0xa8),
    editor_fill: Color::rgb(0xff, 0xf9, 0xbe),
    editor_border: Color::rgb(0xd7, 0xcd, 0x63),
    selection_bg: Color::rgb(0xeb, 0xdf, 0x73),
    text: Color::rgb(0x3b, 0x3b, 0x2a),
};

pub const SOMBRE: NoteStylesheet = NoteStylesheet {
    window_fill: Color::rgb(0x23, 0x26, 0x2b),
    editor_fill: Color::rgb(0x12, 0x15, 0x1a),
    editor_border: Color::rgb(0x3f, 0x45, 0x50),
    selection_bg: Color::rgb(0x5b, 0x65, 0x75),
    text: Color::rgb(0xf2, 0xf2, 0xf2),
};

/// Resolved description of what to draw behind the note, independent
/// of how the theme was selected.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderSpec {
    Stylesheet(NoteStylesheet),
    Solid { fill: Color },
    Texture { path: PathBuf },
}

impl RenderSpec {
    /// Foreground used for chrome (buttons, placeholder text) on top
    /// of this background.
    pub fn text_color(&self) -> Color {
        match self {
            RenderSpec::Stylesheet(sheet) => sheet.text,
            // Texture and solid backgrounds keep the Papier ink.
            RenderSpec::Solid { .. } | RenderSpec::Texture { .. } => PAPIER.text,
        }
    }
}

fn stylesheet_for(theme: Theme) -> NoteStylesheet {
    match theme {
        Theme::Sticky => STICKY,
        Theme::Sombre => SOMBRE,
        _ => PAPIER,
    }
}

fn texture_spec(path: &Path) -> RenderSpec {
    if path.exists() {
        RenderSpec::Texture {
            path: path.to_path_buf(),
        }
    } else {
        RenderSpec::Stylesheet(PAPIER)
    }
}

/// Resolve a theme selection into a [`RenderSpec`].
///
/// Deterministic and side-effect free; the fallback rules are:
/// built-in textures fall back to Papier when the bundled file is
/// missing, and `Personnalisé` falls back to Papier when its image is
/// missing or the custom style is unusable.
pub fn resolve(theme: Theme, custom: &CustomStyle, assets: &TextureAssets) -> RenderSpec {
    match theme {
        Theme::Notes => texture_spec(&assets.notes),
        Theme::Calpin => texture_spec(&assets.calpin),
        Theme::Personnalise => match custom.mode {
            CustomStyleMode::Image if !custom.value.is_empty() => {
                texture_spec(Path::new(&custom.value))
            }
            CustomStyleMode::Color => match Color::from_hex(&custom.value) {
                Some(fill) => RenderSpec::Solid { fill },
                None => RenderSpec::Stylesheet(PAPIER),
            },
            _ => RenderSpec::Stylesheet(PAPIER),
        },
        _ => RenderSpec::Stylesheet(stylesheet_for(theme)),
    }
}

/// Whether the theme draws a bitmap background, which is what enables
/// the margin overlay. Built-in texture themes count even when their
/// bundled file is missing; a custom image only counts while the file
/// exists.
pub fn is_image_theme(theme: Theme, custom: &CustomStyle) -> bool {
    match theme {
        Theme::Notes | Theme::Calpin => true,
        Theme::Personnalise => {
            custom.mode == CustomStyleMode::Image
                && !custom.value.is_empty()
                && Path::new(&custom.value).exists()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_assets() -> TextureAssets {
        TextureAssets {
            notes: PathBuf::from("/nonexistent/notes.png"),
            calpin: PathBuf::from("/nonexistent/calpin.png"),
        }
    }

    #[test]
    fn hex_color_round_trip() {
        let c = Color::from_hex("#2f2a1f").expect("parse");
        assert_eq!(c, Color::rgb(0x2f, 0x2a, 0x1f));
        assert_eq!(c.to_hex(), "#2f2a1f");
        assert_eq!(Color::from_hex("#01020304").expect("parse").a, 4);
        assert!(Color::from_hex("2f2a1f").is_none());
        assert!(Color::from_hex("#12345").is_none());
    }

    #[test]
    fn aliases_resolve_to_replacement_themes() {
        assert_eq!(Theme::parse("Texture1"), Some(Theme::Notes));
        assert_eq!(Theme::parse("Texture2"), Some(Theme::Calpin));
        assert_eq!(Theme::parse("Personnalisé"), Some(Theme::Personnalise));
        assert_eq!(Theme::parse("Neon"), None);
    }

    #[test]
    fn missing_builtin_texture_falls_back_to_papier() {
        let spec = resolve(Theme::Notes, &CustomStyle::default(), &missing_assets());
        assert_eq!(spec, RenderSpec::Stylesheet(PAPIER));
    }

    #[test]
    fn custom_color_resolves_to_solid() {
        let custom = CustomStyle {
            mode: CustomStyleMode::Color,
            value: "#112233".into(),
        };
        let spec = resolve(Theme::Personnalise, &custom, &missing_assets());
        assert_eq!(
            spec,
            RenderSpec::Solid {
                fill: Color::rgb(0x11, 0x22, 0x33)
            }
        );
    }

    #[test]
    fn custom_image_missing_on_disk_falls_back_to_papier() {
        let custom = CustomStyle {
            mode: CustomStyleMode::Image,
            value: "/missing.png".into(),
        };
        let spec = resolve(Theme::Personnalise, &custom, &missing_assets());
        assert_eq!(spec, RenderSpec::Stylesheet(PAPIER));
        assert!(!is_image_theme(Theme::Personnalise, &custom));
    }

    #[test]
    fn builtin_textures_count_as_image_themes_even_when_missing() {
        assert!(is_image_theme(Theme::Notes, &CustomStyle::default()));
        assert!(is_image_theme(Theme::Calpin, &CustomStyle::default()));
        assert!(!is_image_theme(Theme::Sombre, &CustomStyle::default()));
    }

    #[test]
    fn custom_image_present_on_disk_is_an_image_theme() {
        let dir = tempfile::tempdir().expect("temp dir");
        let img = dir.path().join("bg.png");
        std::fs::write(&img, b"not really a png").expect("write");
        let custom = CustomStyle {
            mode: CustomStyleMode::Image,
            value: img.to_string_lossy().into_owned(),
        };
        assert!(is_image_theme(Theme::Personnalise, &custom));
        assert_eq!(
            resolve(Theme::Personnalise, &custom, &missing_assets()),
            RenderSpec::Texture { path: img }
        );
    }
}
