use crate::document::{CharFormat, NoteDocument};
use crate::format::ColorMode;
use crate::overlay::Margins;
use crate::theme::{Color, CustomStyle, Theme};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const LAYOUT_FILE: &str = "layout.json";
pub const FONT_FILE: &str = "font.json";
pub const COLOR_FILE: &str = "color.json";
pub const OPACITY_FILE: &str = "opacity.json";
pub const THEME_FILE: &str = "theme.json";
pub const CUSTOM_STYLE_FILE: &str = "custom_style.json";
pub const AUTOSTART_FILE: &str = "autostart.json";
pub const NOTE_RICH_FILE: &str = "note.json";
pub const NOTE_PLAIN_FILE: &str = "note.txt";

pub const OPACITY_MIN: f32 = 0.3;
pub const OPACITY_MAX: f32 = 1.0;

/// Margins per canonical theme name. `BTreeMap` keeps saves in a
/// stable key order.
pub type LayoutConfig = BTreeMap<String, Margins>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Family name or the "Défaut" sentinel.
    pub current: String,
    pub size: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            current: crate::format::DEFAULT_FONT_SENTINEL.to_string(),
            size: crate::fonts::DEFAULT_FONT_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub mode: ColorMode,
    pub colors: [Color; 2],
}

impl Default for ColorConfig {
    fn default() -> Self {
        let ink = Color::rgb(0x2f, 0x2a, 0x1f);
        Self {
            mode: ColorMode::Solid,
            colors: [ink, ink],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct OpacityConfig {
    opacity: f32,
}

impl Default for OpacityConfig {
    fn default() -> Self {
        Self { opacity: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ThemeConfig {
    theme: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Papier.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutostartConfig {
    pub enabled: bool,
}

/// Typed load/save of the per-concern JSON documents.
///
/// Loads never fail: a missing or unparseable file yields the
/// hardcoded default for that concern, and partial documents are
/// merged field-by-field through serde defaults. Saves are
/// best-effort; failures are logged and swallowed.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn load_json<T: DeserializeOwned + Default>(&self, file: &str) -> T {
        let path = self.dir.join(file);
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        if content.trim().is_empty() {
            return T::default();
        }
        match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("ignoring malformed {file}: {e}");
                T::default()
            }
        }
    }

    fn save_json<T: Serialize>(&self, file: &str, value: &T) {
        if let Err(e) = self.try_save_json(file, value) {
            tracing::warn!("failed to save {file}: {e}");
        }
    }

    fn try_save_json<T: Serialize>(&self, file: &str, value: &T) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(self.dir.join(file), json)?;
        Ok(())
    }

    /// Load the per-theme margin map. Legacy `Texture1`/`Texture2`
    /// entries are carried over to `Notes`/`Calpin` when the new keys
    /// are absent; re-running the migration is a no-op.
    pub fn load_layout(&self) -> LayoutConfig {
        let mut layout: LayoutConfig = self.load_json(LAYOUT_FILE);
        migrate_legacy_layout_keys(&mut layout);
        layout
            .entry(Theme::Notes.name().to_string())
            .or_default();
        layout
            .entry(Theme::Calpin.name().to_string())
            .or_default();
        layout
    }

    pub fn save_layout(&self, layout: &LayoutConfig) {
        self.save_json(LAYOUT_FILE, layout);
    }

    pub fn load_font(&self) -> FontConfig {
        self.load_json(FONT_FILE)
    }

    pub fn save_font(&self, font: &FontConfig) {
        self.save_json(FONT_FILE, font);
    }

    pub fn load_color(&self) -> ColorConfig {
        self.load_json(COLOR_FILE)
    }

    pub fn save_color(&self, color: &ColorConfig) {
        self.save_json(COLOR_FILE, color);
    }

    /// Opacity is clamped to `[0.3, 1.0]` on load so a stale or
    /// hand-edited file can never make the note invisible.
    pub fn load_opacity(&self) -> f32 {
        let cfg: OpacityConfig = self.load_json(OPACITY_FILE);
        cfg.opacity.clamp(OPACITY_MIN, OPACITY_MAX)
    }

    pub fn save_opacity(&self, opacity: f32) {
        self.save_json(OPACITY_FILE, &OpacityConfig { opacity });
    }

    pub fn load_theme(&self) -> Theme {
        let cfg: ThemeConfig = self.load_json(THEME_FILE);
        match Theme::parse(&cfg.theme) {
            Some(theme) => theme,
            None => {
                tracing::warn!("unknown saved theme '{}'; using Papier", cfg.theme);
                Theme::Papier
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) {
        self.save_json(
            THEME_FILE,
            &ThemeConfig {
                theme: theme.name().to_string(),
            },
        );
    }

    pub fn load_custom_style(&self) -> CustomStyle {
        self.load_json(CUSTOM_STYLE_FILE)
    }

    pub fn save_custom_style(&self, style: &CustomStyle) {
        self.save_json(CUSTOM_STYLE_FILE, style);
    }

    pub fn load_autostart(&self) -> bool {
        let cfg: AutostartConfig = self.load_json(AUTOSTART_FILE);
        cfg.enabled
    }

    pub fn save_autostart(&self, enabled: bool) {
        self.save_json(AUTOSTART_FILE, &AutostartConfig { enabled });
    }

    /// Load the note content. The rich JSON document is authoritative;
    /// the plain-text file is only used when the rich form is absent
    /// or damaged.
    pub fn load_note(&self, base_format: &CharFormat) -> NoteDocument {
        let rich = self.dir.join(NOTE_RICH_FILE);
        if let Ok(content) = std::fs::read_to_string(&rich) {
            match serde_json::from_str::<NoteDocument>(&content) {
                Ok(doc) if doc.is_consistent() => return doc,
                Ok(_) => tracing::warn!("rich note file is inconsistent; using plain fallback"),
                Err(e) => tracing::warn!("ignoring malformed rich note file: {e}"),
            }
        }
        match std::fs::read_to_string(self.dir.join(NOTE_PLAIN_FILE)) {
            Ok(plain) => NoteDocument::from_plain_text(&plain, base_format),
            Err(_) => NoteDocument::default(),
        }
    }

    /// Persist both note forms: the rich document and the plain-text
    /// fallback.
    pub fn save_note(&self, doc: &NoteDocument) {
        self.save_json(NOTE_RICH_FILE, doc);
        if let Err(e) = std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(self.dir.join(NOTE_PLAIN_FILE), doc.text()))
        {
            tracing::warn!("failed to save plain note fallback: {e}");
        }
    }
}

fn migrate_legacy_layout_keys(layout: &mut LayoutConfig) {
    for (legacy, replacement) in [("Texture1", Theme::Notes), ("Texture2", Theme::Calpin)] {
        if let Some(margins) = layout.get(legacy).copied() {
            layout
                .entry(replacement.name().to_string())
                .or_insert(margins);
        }
    }
}

/// Margins for a theme, falling back to the defaults for themes with
/// no remembered entry.
pub fn margins_for_theme(layout: &LayoutConfig, theme: Theme) -> Margins {
    layout.get(theme.name()).copied().unwrap_or_default()
}
