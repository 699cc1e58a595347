use crate::config::{self, ColorConfig, ConfigStore, FontConfig, LayoutConfig};
use crate::document::NoteDocument;
use crate::format::{ColorMode, SelectionRange, TextFormatter, DEFAULT_FONT_SENTINEL};
use crate::overlay::Margins;
use crate::paths::TextureAssets;
use crate::theme::{self, Color, CustomStyle, CustomStyleMode, RenderSpec, Theme};

/// The single authoritative style state. Every menu check-mark and
/// button visibility is projected from this struct instead of being
/// mirrored into individual controls.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleState {
    pub theme: Theme,
    pub custom: CustomStyle,
    pub layout: LayoutConfig,
    pub font: FontConfig,
    pub color: ColorConfig,
    pub opacity: f32,
    pub overlay_enabled: bool,
    pub autostart: bool,
}

/// Projection of [`StyleState`] onto the user-facing controls,
/// recomputed after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuState {
    pub theme_checks: Vec<(&'static str, bool)>,
    /// "Défaut" first, then the installed families.
    pub font_checks: Vec<(String, bool)>,
    pub color_mode_checks: [(ColorMode, bool); 3],
    /// The margin-overlay toggle only exists for image themes.
    pub overlay_button_visible: bool,
    pub overlay_checked: bool,
    pub autostart_checked: bool,
}

pub fn menu_state(state: &StyleState, families: &[String]) -> MenuState {
    let mut font_checks = vec![(
        DEFAULT_FONT_SENTINEL.to_string(),
        state.font.current == DEFAULT_FONT_SENTINEL,
    )];
    font_checks.extend(
        families
            .iter()
            .map(|f| (f.clone(), state.font.current == *f)),
    );

    MenuState {
        theme_checks: Theme::ALL
            .iter()
            .map(|t| (t.name(), *t == state.theme))
            .collect(),
        font_checks,
        color_mode_checks: [
            (ColorMode::Solid, state.color.mode == ColorMode::Solid),
            (
                ColorMode::Horizontal,
                state.color.mode == ColorMode::Horizontal,
            ),
            (ColorMode::Vertical, state.color.mode == ColorMode::Vertical),
        ],
        overlay_button_visible: theme::is_image_theme(state.theme, &state.custom),
        overlay_checked: state.overlay_enabled,
        autostart_checked: state.autostart,
    }
}

/// Orchestrates theme, font, color, opacity and margin changes:
/// mutates [`StyleState`], recomputes the renderable output, and
/// writes through to the [`ConfigStore`].
pub struct StyleController {
    state: StyleState,
    store: ConfigStore,
    assets: TextureAssets,
    render: RenderSpec,
    margins: Margins,
}

impl StyleController {
    /// Load every concern from the store and resolve the initial
    /// render state. Also re-applies the persisted autostart choice so
    /// the OS registration matches the config file.
    pub fn load(store: ConfigStore, assets: TextureAssets) -> Self {
        let state = StyleState {
            theme: store.load_theme(),
            custom: store.load_custom_style(),
            layout: store.load_layout(),
            font: store.load_font(),
            color: store.load_color(),
            opacity: store.load_opacity(),
            overlay_enabled: false,
            autostart: store.load_autostart(),
        };
        crate::autostart::apply(state.autostart);
        let render = theme::resolve(state.theme, &state.custom, &assets);
        let margins = config::margins_for_theme(&state.layout, state.theme);
        Self {
            state,
            store,
            assets,
            render,
            margins,
        }
    }

    pub fn state(&self) -> &StyleState {
        &self.state
    }

    pub fn render_spec(&self) -> &RenderSpec {
        &self.render
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn is_image_theme_active(&self) -> bool {
        theme::is_image_theme(self.state.theme, &self.state.custom)
    }

    fn refresh_render(&mut self) {
        self.render = theme::resolve(self.state.theme, &self.state.custom, &self.assets);
        self.margins = config::margins_for_theme(&self.state.layout, self.state.theme);
        if !self.is_image_theme_active() {
            self.state.overlay_enabled = false;
        }
    }

    /// Switch themes by wire name. Unknown names are rejected as a
    /// no-op, leaving the previous theme active. Never touches note
    /// content.
    pub fn select_theme(&mut self, name: &str) -> bool {
        let Some(parsed) = Theme::parse(name) else {
            tracing::warn!("ignoring unknown theme '{name}'");
            return false;
        };
        self.state.theme = parsed;
        self.refresh_render();
        self.store.save_theme(parsed);
        true
    }

    /// Enable or disable the margin overlay. Forced off while the
    /// active theme has no image background.
    pub fn set_overlay_enabled(&mut self, enabled: bool) {
        self.state.overlay_enabled = enabled && self.is_image_theme_active();
    }

    /// Commit margins reported by the overlay, keyed by the active
    /// theme so every image theme remembers its own insets.
    pub fn commit_margins(&mut self, margins: Margins) {
        if !self.is_image_theme_active() {
            return;
        }
        self.margins = margins;
        self.state
            .layout
            .insert(self.state.theme.name().to_string(), margins);
        self.store.save_layout(&self.state.layout);
    }

    pub fn select_font(
        &mut self,
        formatter: &mut TextFormatter,
        doc: &mut NoteDocument,
        selection: SelectionRange,
        selection_name: &str,
    ) {
        self.state.font.current = selection_name.to_string();
        formatter.set_family(doc, selection, selection_name);
        self.store.save_font(&self.state.font);
    }

    /// Apply a font size. Previews (`commit = false`) restyle the text
    /// without persisting; the committed size is saved.
    pub fn set_font_size(
        &mut self,
        formatter: &mut TextFormatter,
        doc: &mut NoteDocument,
        selection: SelectionRange,
        size: u32,
        commit: bool,
    ) {
        formatter.set_size(doc, selection, size);
        if commit {
            self.state.font.size = size;
            self.store.save_font(&self.state.font);
        }
    }

    pub fn select_color_mode(
        &mut self,
        formatter: &mut TextFormatter,
        doc: &mut NoteDocument,
        selection: SelectionRange,
        mode: ColorMode,
    ) {
        self.state.color.mode = mode;
        self.store.save_color(&self.state.color);
        formatter.apply_color_scheme(doc, selection, mode, self.state.color.colors);
    }

    /// Set one of the two scheme colors. An out-of-range index is a
    /// no-op.
    pub fn pick_color(
        &mut self,
        formatter: &mut TextFormatter,
        doc: &mut NoteDocument,
        selection: SelectionRange,
        index: usize,
        color: Color,
    ) {
        let Some(slot) = self.state.color.colors.get_mut(index) else {
            tracing::warn!("ignoring out-of-range color index {index}");
            return;
        };
        *slot = color;
        self.store.save_color(&self.state.color);
        formatter.apply_color_scheme(doc, selection, self.state.color.mode, self.state.color.colors);
    }

    /// Live opacity preview; not persisted until committed.
    pub fn preview_opacity(&mut self, opacity: f32) {
        self.state.opacity = opacity.clamp(config::OPACITY_MIN, config::OPACITY_MAX);
    }

    pub fn commit_opacity(&mut self, opacity: f32) {
        self.preview_opacity(opacity);
        self.store.save_opacity(self.state.opacity);
    }

    /// Select a custom background image and switch to Personnalisé.
    pub fn set_custom_image(&mut self, path: &str) {
        self.state.custom = CustomStyle {
            mode: CustomStyleMode::Image,
            value: path.to_string(),
        };
        self.store.save_custom_style(&self.state.custom);
        self.select_theme(Theme::Personnalise.name());
    }

    /// Select a custom background color and switch to Personnalisé.
    pub fn set_custom_color(&mut self, color: Color) {
        self.state.custom = CustomStyle {
            mode: CustomStyleMode::Color,
            value: color.to_hex(),
        };
        self.store.save_custom_style(&self.state.custom);
        self.select_theme(Theme::Personnalise.name());
    }

    /// Persist the autostart preference and mirror it to the OS
    /// (best-effort).
    pub fn set_autostart(&mut self, enabled: bool) {
        self.state.autostart = enabled;
        self.store.save_autostart(enabled);
        crate::autostart::apply(enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::DEFAULT_MARGINS;
    use std::path::PathBuf;

    fn controller() -> (tempfile::TempDir, StyleController) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = ConfigStore::new(dir.path());
        let assets = TextureAssets {
            notes: PathBuf::from("/nonexistent/notes.png"),
            calpin: PathBuf::from("/nonexistent/calpin.png"),
        };
        (dir, StyleController::load(store, assets))
    }

    #[test]
    fn unknown_theme_is_a_no_op() {
        let (_dir, mut ctl) = controller();
        let before = ctl.render_spec().clone();
        assert!(!ctl.select_theme("Neon"));
        assert_eq!(ctl.state().theme, Theme::Papier);
        assert_eq!(ctl.render_spec(), &before);
    }

    #[test]
    fn switching_theme_restores_that_themes_margins() {
        let (_dir, mut ctl) = controller();
        ctl.select_theme("Notes");
        ctl.commit_margins(Margins {
            left: 40.0,
            top: 40.0,
            right: 40.0,
            bottom: 40.0,
        });
        ctl.select_theme("Calpin");
        assert_eq!(ctl.margins(), DEFAULT_MARGINS);
        ctl.select_theme("Notes");
        assert_eq!(ctl.margins().left, 40.0);
    }

    #[test]
    fn overlay_is_forced_off_for_non_image_themes() {
        let (_dir, mut ctl) = controller();
        ctl.select_theme("Notes");
        ctl.set_overlay_enabled(true);
        assert!(ctl.state().overlay_enabled);
        ctl.select_theme("Sombre");
        assert!(!ctl.state().overlay_enabled);
        // cannot be re-enabled while a plain theme is active
        ctl.set_overlay_enabled(true);
        assert!(!ctl.state().overlay_enabled);
    }

    #[test]
    fn margin_commits_are_ignored_for_plain_themes() {
        let (_dir, mut ctl) = controller();
        ctl.select_theme("Papier");
        ctl.commit_margins(Margins {
            left: 1.0,
            top: 1.0,
            right: 1.0,
            bottom: 1.0,
        });
        assert_eq!(ctl.margins(), DEFAULT_MARGINS);
    }

    #[test]
    fn out_of_range_color_index_is_rejected() {
        let (_dir, mut ctl) = controller();
        let mut fmt = TextFormatter::new();
        let mut doc = NoteDocument::default();
        let before = ctl.state().color;
        ctl.pick_color(&mut fmt, &mut doc, None, 5, Color::rgb(1, 2, 3));
        assert_eq!(ctl.state().color, before);
    }

    #[test]
    fn menu_projection_checks_exactly_one_theme() {
        let (_dir, mut ctl) = controller();
        ctl.select_theme("Texture1");
        let menu = menu_state(ctl.state(), &[]);
        let checked: Vec<&str> = menu
            .theme_checks
            .iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| *name)
            .collect();
        // the alias resolved to its replacement
        assert_eq!(checked, vec!["Notes"]);
        assert!(menu.overlay_button_visible);
    }

    #[test]
    fn custom_color_switches_to_personnalise_and_resolves_solid() {
        let (_dir, mut ctl) = controller();
        ctl.set_custom_color(Color::rgb(0x11, 0x22, 0x33));
        assert_eq!(ctl.state().theme, Theme::Personnalise);
        assert_eq!(
            ctl.render_spec(),
            &RenderSpec::Solid {
                fill: Color::rgb(0x11, 0x22, 0x33)
            }
        );
    }
}
