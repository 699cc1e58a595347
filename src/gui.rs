use crate::autosave::AutosaveTimer;
use crate::config::ConfigStore;
use crate::controller::{menu_state, MenuState, StyleController};
use crate::document::{Alignment, Foreground, NoteDocument};
use crate::format::{ColorMode, SelectionRange, TextFormatter};
use crate::overlay::{Margins, MarginOverlay};
use crate::paths::TextureAssets;
use crate::theme::{Color, NoteStylesheet, RenderSpec, PAPIER};
use crate::{fonts, theme};
use eframe::egui;
use std::path::PathBuf;
use std::time::Instant;

pub const BASE_SIZE: egui::Vec2 = egui::Vec2::new(420.0, 420.0);

const OVERLAY_STROKE: egui::Color32 = egui::Color32::from_rgb(38, 118, 255);

struct SizeDialog {
    slider: u32,
    committed: u32,
}

struct OpacityDialog {
    slider: f32,
    previous: f32,
}

struct ResizeDialog {
    width_pct: u32,
    height_pct: u32,
    previous: egui::Vec2,
}

/// The sticky-note window. All state mutation happens here on the UI
/// thread, in response to discrete egui events.
pub struct NoteApp {
    controller: StyleController,
    store: ConfigStore,
    doc: NoteDocument,
    formatter: TextFormatter,
    overlay: MarginOverlay,
    autosave: AutosaveTimer,
    families: Vec<String>,
    /// Plain mirror of the document text driving the text edit.
    editor_text: String,
    last_selection: SelectionRange,
    last_caret: usize,
    /// Margins being previewed during an overlay drag.
    drag_margins: Option<Margins>,
    texture_cache: Option<(PathBuf, egui::TextureHandle)>,
    pinned: bool,
    topbar_collapsed: bool,
    size_dialog: Option<SizeDialog>,
    opacity_dialog: Option<OpacityDialog>,
    resize_dialog: Option<ResizeDialog>,
}

impl NoteApp {
    pub fn new(cc: &eframe::CreationContext<'_>, store: ConfigStore) -> Self {
        let families = fonts::install_bundled_fonts(&cc.egui_ctx);
        let controller = StyleController::load(store.clone(), TextureAssets::bundled());
        let doc = store.load_note(&Default::default());
        let editor_text = doc.text().to_string();
        Self {
            controller,
            store,
            doc,
            formatter: TextFormatter::new(),
            overlay: MarginOverlay::new(),
            autosave: AutosaveTimer::new(),
            families,
            editor_text,
            last_selection: None,
            last_caret: 0,
            drag_margins: None,
            texture_cache: None,
            pinned: true,
            topbar_collapsed: false,
            size_dialog: None,
            opacity_dialog: None,
            resize_dialog: None,
        }
    }

    fn save_note(&mut self) {
        self.store.save_note(&self.doc);
    }

    fn background_texture(
        &mut self,
        ctx: &egui::Context,
        path: &PathBuf,
    ) -> Option<egui::TextureHandle> {
        if let Some((cached, handle)) = &self.texture_cache {
            if cached == path {
                return Some(handle.clone());
            }
        }
        match image::open(path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                let handle =
                    ctx.load_texture("note_background", color_image, egui::TextureOptions::LINEAR);
                self.texture_cache = Some((path.clone(), handle.clone()));
                Some(handle)
            }
            Err(e) => {
                tracing::warn!("failed to decode background image {}: {e}", path.display());
                None
            }
        }
    }

    fn active_stylesheet(&self) -> NoteStylesheet {
        match self.controller.render_spec() {
            RenderSpec::Stylesheet(sheet) => *sheet,
            _ => PAPIER,
        }
    }

    fn with_opacity(&self, color: Color) -> egui::Color32 {
        color.to_color32().gamma_multiply(self.controller.state().opacity)
    }

    fn paint_background(&mut self, ctx: &egui::Context, painter: &egui::Painter, rect: egui::Rect) {
        let spec = self.controller.render_spec().clone();
        match spec {
            RenderSpec::Stylesheet(sheet) => {
                painter.rect_filled(rect, 8.0, self.with_opacity(sheet.window_fill));
            }
            RenderSpec::Solid { fill } => {
                painter.rect_filled(rect, 8.0, self.with_opacity(fill));
            }
            RenderSpec::Texture { path } => match self.background_texture(ctx, &path) {
                Some(handle) => {
                    let tint = egui::Color32::WHITE
                        .gamma_multiply(self.controller.state().opacity);
                    painter.image(
                        handle.id(),
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        tint,
                    );
                }
                // decode failure degrades like a missing file
                None => {
                    painter.rect_filled(rect, 8.0, self.with_opacity(PAPIER.window_fill));
                }
            },
        }
    }

    fn layout_job(&self, text: &str, wrap_width: f32) -> egui::text::LayoutJob {
        let mut job = egui::text::LayoutJob::default();
        job.wrap.max_width = wrap_width;
        match self.doc.block_alignment(0) {
            Alignment::Left => job.halign = egui::Align::LEFT,
            Alignment::Center => job.halign = egui::Align::Center,
            Alignment::Right => job.halign = egui::Align::RIGHT,
            Alignment::Justify => job.justify = true,
        }

        let matches_doc = text == self.doc.text();
        if matches_doc && !self.doc.is_empty() {
            let mut byte = 0;
            for run in self.doc.runs() {
                let run_bytes: usize = text[byte..]
                    .chars()
                    .take(run.len)
                    .map(|c| c.len_utf8())
                    .sum();
                let color = match run.format.foreground {
                    Foreground::Solid { color } => color.to_color32(),
                    // one color per egui section: approximate the
                    // per-run gradient with its midpoint
                    Foreground::Gradient { start, end, .. } => {
                        Color::blend_midpoint(start, end).to_color32()
                    }
                };
                let family = fonts::family_id_weighted(
                    &run.format.family,
                    run.format.weight == crate::document::FontWeight::Bold,
                    &self.families,
                );
                let underline = if run.format.underline {
                    egui::Stroke::new(1.0, color)
                } else {
                    egui::Stroke::NONE
                };
                job.append(
                    &text[byte..byte + run_bytes],
                    0.0,
                    egui::TextFormat {
                        font_id: egui::FontId::new(run.format.size_pt as f32, family),
                        color,
                        italics: run.format.italic,
                        underline,
                        ..Default::default()
                    },
                );
                byte += run_bytes;
            }
        } else {
            let sheet = self.active_stylesheet();
            let size = self.controller.state().font.size as f32;
            job.append(
                text,
                0.0,
                egui::TextFormat {
                    font_id: egui::FontId::new(size, egui::FontFamily::Proportional),
                    color: sheet.text.to_color32(),
                    ..Default::default()
                },
            );
        }
        job
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let selection = self.last_selection;
        let caret = self.last_caret;
        let consume = |key: egui::Key| {
            ctx.input_mut(|i| i.consume_key(egui::Modifiers::CTRL, key))
        };
        if consume(egui::Key::B) {
            self.formatter.toggle_bold(&mut self.doc, selection, caret);
            self.autosave.bump(Instant::now());
        }
        if consume(egui::Key::I) {
            self.formatter.toggle_italic(&mut self.doc, selection, caret);
            self.autosave.bump(Instant::now());
        }
        if consume(egui::Key::U) {
            self.formatter
                .toggle_underline(&mut self.doc, selection, caret);
            self.autosave.bump(Instant::now());
        }
        let alignments = [
            (egui::Key::L, Alignment::Left),
            (egui::Key::E, Alignment::Center),
            (egui::Key::R, Alignment::Right),
            (egui::Key::J, Alignment::Justify),
        ];
        for (key, alignment) in alignments {
            if consume(key) {
                self.formatter
                    .set_alignment(&mut self.doc, selection, caret, alignment);
                self.autosave.bump(Instant::now());
            }
        }
    }

    fn style_menu(&mut self, ui: &mut egui::Ui, menu: &MenuState) {
        for (name, checked) in &menu.theme_checks {
            if ui.selectable_label(*checked, *name).clicked() {
                self.controller.select_theme(name);
                ui.close_menu();
            }
        }
        ui.separator();
        if ui.button("Image personnalisée…").clicked() {
            if let Some(path) = pick_image_file() {
                self.controller.set_custom_image(&path);
            }
            ui.close_menu();
        }
        ui.menu_button("Couleur personnalisée…", |ui| {
            let mut rgb = current_custom_rgb(self.controller.state());
            if ui.color_edit_button_srgb(&mut rgb).changed() {
                self.controller
                    .set_custom_color(Color::rgb(rgb[0], rgb[1], rgb[2]));
            }
        });
        ui.separator();
        let mut autostart = menu.autostart_checked;
        if ui.checkbox(&mut autostart, "Démarrage automatique").changed() {
            self.controller.set_autostart(autostart);
        }
    }

    fn font_menu(&mut self, ui: &mut egui::Ui, menu: &MenuState) {
        for (name, checked) in &menu.font_checks {
            if ui.selectable_label(*checked, name).clicked() {
                self.controller.select_font(
                    &mut self.formatter,
                    &mut self.doc,
                    self.last_selection,
                    name,
                );
                self.autosave.bump(Instant::now());
                ui.close_menu();
            }
        }
    }

    fn color_menu(&mut self, ui: &mut egui::Ui, menu: &MenuState) {
        let labels = [
            (ColorMode::Solid, "Couleur pleine"),
            (ColorMode::Horizontal, "Dégradé horizontal"),
            (ColorMode::Vertical, "Dégradé vertical"),
        ];
        for ((mode, checked), (_, label)) in menu.color_mode_checks.iter().zip(labels) {
            if ui.selectable_label(*checked, label).clicked() {
                self.controller.select_color_mode(
                    &mut self.formatter,
                    &mut self.doc,
                    self.last_selection,
                    *mode,
                );
                self.autosave.bump(Instant::now());
                ui.close_menu();
            }
        }
        ui.separator();
        for index in 0..2 {
            let mut rgb = {
                let c = self.controller.state().color.colors[index];
                [c.r, c.g, c.b]
            };
            ui.horizontal(|ui| {
                ui.label(format!("Couleur {}", index + 1));
                if ui.color_edit_button_srgb(&mut rgb).changed() {
                    self.controller.pick_color(
                        &mut self.formatter,
                        &mut self.doc,
                        self.last_selection,
                        index,
                        Color::rgb(rgb[0], rgb[1], rgb[2]),
                    );
                    self.autosave.bump(Instant::now());
                }
            });
        }
    }

    fn top_bar(&mut self, ui: &mut egui::Ui, menu: &MenuState) {
        ui.horizontal(|ui| {
            let collapse_label = if self.topbar_collapsed { "▸" } else { "▾" };
            if ui
                .button(collapse_label)
                .on_hover_text("Masquer/afficher les commandes")
                .clicked()
            {
                self.topbar_collapsed = !self.topbar_collapsed;
            }
            if self.topbar_collapsed {
                return;
            }

            if ui
                .selectable_label(self.pinned, "📌")
                .on_hover_text("Epingler / Désépingler")
                .clicked()
            {
                self.pinned = !self.pinned;
                let level = if self.pinned {
                    egui::WindowLevel::AlwaysOnTop
                } else {
                    egui::WindowLevel::Normal
                };
                ui.ctx()
                    .send_viewport_cmd(egui::ViewportCommand::WindowLevel(level));
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.menu_button("🎨", |ui| self.style_menu(ui, menu))
                    .response
                    .on_hover_text("Choisir un style");
                ui.menu_button("🖍", |ui| self.color_menu(ui, menu))
                    .response
                    .on_hover_text("Couleur / dégradé");
                if ui.button("👁").on_hover_text("Opacité de la note").clicked() {
                    self.opacity_dialog = Some(OpacityDialog {
                        slider: self.controller.state().opacity,
                        previous: self.controller.state().opacity,
                    });
                }
                if ui
                    .button("⤡")
                    .on_hover_text("Redimensionner la note")
                    .clicked()
                {
                    let size = ui.ctx().input(|i| {
                        i.viewport()
                            .inner_rect
                            .map(|r| r.size())
                            .unwrap_or(BASE_SIZE)
                    });
                    self.resize_dialog = Some(ResizeDialog {
                        width_pct: pct(size.x, BASE_SIZE.x),
                        height_pct: pct(size.y, BASE_SIZE.y),
                        previous: size,
                    });
                }
                if ui.button("🇹").on_hover_text("Taille du texte").clicked() {
                    let committed = self.controller.state().font.size;
                    self.size_dialog = Some(SizeDialog {
                        slider: committed,
                        committed,
                    });
                }
                ui.menu_button("🖋", |ui| self.font_menu(ui, menu))
                    .response
                    .on_hover_text("Choisir une police");
                if menu.overlay_button_visible {
                    let mut enabled = menu.overlay_checked;
                    if ui
                        .selectable_label(enabled, "✏")
                        .on_hover_text("Ajuster la zone de texte")
                        .clicked()
                    {
                        enabled = !enabled;
                        self.controller.set_overlay_enabled(enabled);
                    }
                }
            });
        });
    }

    fn editor(&mut self, ui: &mut egui::Ui) {
        let margins = self.drag_margins.unwrap_or(self.controller.margins());
        let container = ui.available_rect_before_wrap();
        let inner = egui::Rect::from_min_max(
            container.min + egui::vec2(margins.left, margins.top),
            container.max - egui::vec2(margins.right, margins.bottom),
        );

        let sheet = self.active_stylesheet();
        if matches!(self.controller.render_spec(), RenderSpec::Stylesheet(_)) {
            ui.painter()
                .rect_filled(inner, 6.0, self.with_opacity(sheet.editor_fill));
            ui.painter().rect_stroke(
                inner,
                6.0,
                egui::Stroke::new(1.0, self.with_opacity(sheet.editor_border)),
            );
        }

        let mut editor_ui = ui.child_ui(
            inner.shrink(6.0),
            egui::Layout::top_down(egui::Align::Min),
        );
        editor_ui.style_mut().visuals.selection.bg_fill =
            sheet.selection_bg.to_color32();

        // the text buffer is moved out so the layouter can borrow the
        // rest of `self` while the edit runs
        let mut text = std::mem::take(&mut self.editor_text);
        let mut layouter = |ui: &egui::Ui, text: &str, wrap_width: f32| {
            let job = self.layout_job(text, wrap_width);
            ui.fonts(|f| f.layout_job(job))
        };
        let output = egui::TextEdit::multiline(&mut text)
            .frame(false)
            .desired_width(f32::INFINITY)
            .desired_rows(1)
            .hint_text("Écris ici tes notes...")
            .layouter(&mut layouter)
            .show(&mut editor_ui);
        self.editor_text = text;

        let (selection, caret) = match output.cursor_range {
            Some(range) => {
                let a = range.primary.ccursor.index;
                let b = range.secondary.ccursor.index;
                (if a == b { None } else { Some((b.min(a), b.max(a))) }, a)
            }
            None => (self.last_selection, self.last_caret),
        };

        if output.response.changed() {
            let forward = self.formatter.forward_format(&self.doc, self.last_caret);
            self.doc.sync_text(&self.editor_text, &forward);
            self.autosave.bump(Instant::now());
        } else if caret != self.last_caret || selection != self.last_selection {
            self.formatter.caret_moved();
        }
        self.last_selection = selection;
        self.last_caret = caret;

        if self.controller.state().overlay_enabled {
            self.margin_overlay(ui, container);
        }
    }

    fn margin_overlay(&mut self, ui: &mut egui::Ui, container: egui::Rect) {
        let margins = self.drag_margins.unwrap_or(self.controller.margins());
        let size = container.size();
        let inner = margins.inner_rect(size).translate(container.min.to_vec2());

        let painter = ui.painter();
        painter.rect(
            inner,
            0.0,
            OVERLAY_STROKE.gamma_multiply(0.16),
            egui::Stroke::new(2.0, OVERLAY_STROKE),
        );

        let response = ui.interact(
            container,
            ui.id().with("margin_overlay"),
            egui::Sense::drag(),
        );
        let local = |pos: egui::Pos2| pos - container.min.to_vec2();

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.overlay.on_pointer_press(size, margins, local(pos));
            }
        }
        if response.dragged() && self.overlay.is_dragging() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.drag_margins = Some(self.overlay.on_pointer_move(size, margins, local(pos)));
            }
        }
        if response.drag_stopped() {
            self.overlay.on_pointer_release();
            if let Some(committed) = self.drag_margins.take() {
                self.controller.commit_margins(committed);
            }
        }
    }

    fn dialogs(&mut self, ctx: &egui::Context) {
        if let Some(mut dialog) = self.size_dialog.take() {
            let mut keep = true;
            egui::Window::new("Taille du texte")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    if ui
                        .add(egui::Slider::new(&mut dialog.slider, 8..=48).text("pt"))
                        .changed()
                    {
                        self.controller.set_font_size(
                            &mut self.formatter,
                            &mut self.doc,
                            self.last_selection,
                            dialog.slider,
                            false,
                        );
                    }
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            self.controller.set_font_size(
                                &mut self.formatter,
                                &mut self.doc,
                                self.last_selection,
                                dialog.slider,
                                true,
                            );
                            self.autosave.bump(Instant::now());
                            keep = false;
                        }
                        if ui.button("Annuler").clicked() {
                            self.controller.set_font_size(
                                &mut self.formatter,
                                &mut self.doc,
                                self.last_selection,
                                dialog.committed,
                                false,
                            );
                            keep = false;
                        }
                    });
                });
            if keep {
                self.size_dialog = Some(dialog);
            }
        }

        if let Some(mut dialog) = self.opacity_dialog.take() {
            let mut keep = true;
            egui::Window::new("Opacité de la note")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    if ui
                        .add(
                            egui::Slider::new(&mut dialog.slider, 0.3..=1.0)
                                .text("Opacité"),
                        )
                        .changed()
                    {
                        self.controller.preview_opacity(dialog.slider);
                    }
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            self.controller.commit_opacity(dialog.slider);
                            keep = false;
                        }
                        if ui.button("Annuler").clicked() {
                            self.controller.preview_opacity(dialog.previous);
                            keep = false;
                        }
                    });
                });
            if keep {
                self.opacity_dialog = Some(dialog);
            }
        }

        if let Some(mut dialog) = self.resize_dialog.take() {
            let mut keep = true;
            egui::Window::new("Redimensionner la note")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    let mut changed = false;
                    changed |= ui
                        .add(egui::Slider::new(&mut dialog.width_pct, 60..=200).text("Largeur %"))
                        .changed();
                    changed |= ui
                        .add(egui::Slider::new(&mut dialog.height_pct, 60..=200).text("Hauteur %"))
                        .changed();
                    if changed {
                        let size = egui::vec2(
                            BASE_SIZE.x * dialog.width_pct as f32 / 100.0,
                            BASE_SIZE.y * dialog.height_pct as f32 / 100.0,
                        );
                        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(size));
                    }
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            keep = false;
                        }
                        if ui.button("Annuler").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(
                                dialog.previous,
                            ));
                            keep = false;
                        }
                    });
                });
            if keep {
                self.resize_dialog = Some(dialog);
            }
        }
    }
}

impl eframe::App for NoteApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        // transparent clear lets the rounded note corners show through
        [0.0, 0.0, 0.0, 0.0]
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        let menu = menu_state(self.controller.state(), &self.families);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let painter = ui.painter().clone();
                self.paint_background(ctx, &painter, rect);
                ui.add_space(4.0);
                self.top_bar(ui, &menu);
                ui.add_space(4.0);
                self.editor(ui);
            });

        self.dialogs(ctx);

        if self.autosave.take_due(Instant::now()) {
            self.save_note();
        }
        if self.autosave.is_pending() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // final flush regardless of the debounce deadline
        if self.autosave.take_pending() {
            self.save_note();
        }
    }
}

fn pct(value: f32, base: f32) -> u32 {
    ((value / base * 100.0) as u32).clamp(60, 200)
}

fn current_custom_rgb(state: &crate::controller::StyleState) -> [u8; 3] {
    let fallback = theme::PAPIER.window_fill;
    let c = Color::from_hex(&state.custom.value).unwrap_or(fallback);
    [c.r, c.g, c.b]
}

#[cfg(target_os = "windows")]
fn pick_image_file() -> Option<String> {
    rfd::FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "gif"])
        .pick_file()
        .map(|p| p.to_string_lossy().into_owned())
}

#[cfg(not(target_os = "windows"))]
fn pick_image_file() -> Option<String> {
    tracing::info!("image picker is not available on this platform");
    None
}
