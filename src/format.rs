use crate::document::{
    Alignment, CharFormat, FontWeight, FormatPatch, Foreground, GradientAxis, NoteDocument,
};
use crate::theme::Color;
use serde::{Deserialize, Serialize};

/// Menu sentinel meaning "use the default family". Never written into
/// a text run; [`TextFormatter::resolve_family`] translates it first.
pub const DEFAULT_FONT_SENTINEL: &str = "Défaut";

/// Foreground color application mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Solid,
    Horizontal,
    Vertical,
}

impl Default for ColorMode {
    fn default() -> Self {
        ColorMode::Solid
    }
}

/// Build the run foreground for a color mode. Solid uses only the
/// first color; gradients interpolate from `colors[0]` to `colors[1]`
/// along the named axis in run-local coordinates.
pub fn foreground_for(mode: ColorMode, colors: [Color; 2]) -> Foreground {
    match mode {
        ColorMode::Solid => Foreground::Solid { color: colors[0] },
        ColorMode::Horizontal => Foreground::Gradient {
            axis: GradientAxis::Horizontal,
            start: colors[0],
            end: colors[1],
        },
        ColorMode::Vertical => Foreground::Gradient {
            axis: GradientAxis::Vertical,
            start: colors[0],
            end: colors[1],
        },
    }
}

/// Character range of the active selection, if any. A collapsed
/// selection is treated as "no selection".
pub type SelectionRange = Option<(usize, usize)>;

fn normalized(selection: SelectionRange) -> Option<(usize, usize)> {
    match selection {
        Some((a, b)) if a != b => Some((a.min(b), a.max(b))),
        _ => None,
    }
}

/// Applies formatting either to the active selection or to the
/// forward-typing format, the two mutually exclusive modes rich text
/// editors use.
///
/// The forward format is a pending patch over the format at the
/// caret; it survives until text is typed or the caret moves.
#[derive(Debug, Default)]
pub struct TextFormatter {
    forward: FormatPatch,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a menu selection into a concrete family name.
    pub fn resolve_family(selection: &str) -> String {
        if selection == DEFAULT_FONT_SENTINEL {
            crate::fonts::DEFAULT_FAMILY.to_string()
        } else {
            selection.to_string()
        }
    }

    /// Effective format at the caret (or selection start), including
    /// pending forward overrides.
    pub fn effective_format(
        &self,
        doc: &NoteDocument,
        selection: SelectionRange,
        caret: usize,
    ) -> CharFormat {
        let pos = normalized(selection).map(|(s, _)| s.saturating_add(1)).unwrap_or(caret);
        self.forward.apply_to(&doc.format_at(pos))
    }

    /// Format newly typed text should adopt at the caret.
    pub fn forward_format(&self, doc: &NoteDocument, caret: usize) -> CharFormat {
        self.forward.apply_to(&doc.format_at(caret))
    }

    /// The caret moved without typing; pending forward overrides are
    /// dropped.
    pub fn caret_moved(&mut self) {
        self.forward = FormatPatch::default();
    }

    /// Core application rule: with a selection, merge the patch into
    /// every covered run; without one, stash it in the forward format
    /// so existing text stays untouched.
    pub fn apply(
        &mut self,
        doc: &mut NoteDocument,
        selection: SelectionRange,
        patch: FormatPatch,
    ) {
        match normalized(selection) {
            Some((start, end)) => doc.merge_format(start, end, &patch),
            None => {
                self.forward = FormatPatch {
                    family: patch.family.or_else(|| self.forward.family.clone()),
                    size_pt: patch.size_pt.or(self.forward.size_pt),
                    weight: patch.weight.or(self.forward.weight),
                    italic: patch.italic.or(self.forward.italic),
                    underline: patch.underline.or(self.forward.underline),
                    foreground: patch.foreground.or(self.forward.foreground),
                };
            }
        }
    }

    pub fn toggle_bold(&mut self, doc: &mut NoteDocument, selection: SelectionRange, caret: usize) {
        let current = self.effective_format(doc, selection, caret).weight;
        let next = match current {
            FontWeight::Bold => FontWeight::Normal,
            FontWeight::Normal => FontWeight::Bold,
        };
        self.apply(
            doc,
            selection,
            FormatPatch {
                weight: Some(next),
                ..Default::default()
            },
        );
    }

    pub fn toggle_italic(
        &mut self,
        doc: &mut NoteDocument,
        selection: SelectionRange,
        caret: usize,
    ) {
        let current = self.effective_format(doc, selection, caret).italic;
        self.apply(
            doc,
            selection,
            FormatPatch {
                italic: Some(!current),
                ..Default::default()
            },
        );
    }

    pub fn toggle_underline(
        &mut self,
        doc: &mut NoteDocument,
        selection: SelectionRange,
        caret: usize,
    ) {
        let current = self.effective_format(doc, selection, caret).underline;
        self.apply(
            doc,
            selection,
            FormatPatch {
                underline: Some(!current),
                ..Default::default()
            },
        );
    }

    pub fn set_family(
        &mut self,
        doc: &mut NoteDocument,
        selection: SelectionRange,
        family_selection: &str,
    ) {
        self.apply(
            doc,
            selection,
            FormatPatch {
                family: Some(Self::resolve_family(family_selection)),
                ..Default::default()
            },
        );
    }

    pub fn set_size(&mut self, doc: &mut NoteDocument, selection: SelectionRange, size_pt: u32) {
        self.apply(
            doc,
            selection,
            FormatPatch {
                size_pt: Some(size_pt),
                ..Default::default()
            },
        );
    }

    pub fn apply_color_scheme(
        &mut self,
        doc: &mut NoteDocument,
        selection: SelectionRange,
        mode: ColorMode,
        colors: [Color; 2],
    ) {
        self.apply(
            doc,
            selection,
            FormatPatch {
                foreground: Some(foreground_for(mode, colors)),
                ..Default::default()
            },
        );
    }

    /// Alignment is block-scoped: all paragraphs touched by the
    /// selection, or the caret's paragraph.
    pub fn set_alignment(
        &self,
        doc: &mut NoteDocument,
        selection: SelectionRange,
        caret: usize,
        alignment: Alignment,
    ) {
        match normalized(selection) {
            Some((start, end)) => doc.set_alignment(start, end, alignment),
            None => doc.set_alignment(caret, caret, alignment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_with_selection_changes_only_the_selected_run() {
        let mut doc = NoteDocument::from_plain_text("hello world", &CharFormat::default());
        let mut fmt = TextFormatter::new();
        fmt.toggle_bold(&mut doc, Some((0, 5)), 0);

        assert_eq!(doc.format_at(3).weight, FontWeight::Bold);
        assert_eq!(doc.format_at(8).weight, FontWeight::Normal);
    }

    #[test]
    fn bold_without_selection_only_affects_future_typing() {
        let mut doc = NoteDocument::from_plain_text("hello", &CharFormat::default());
        let mut fmt = TextFormatter::new();
        fmt.toggle_bold(&mut doc, None, 5);

        // existing text untouched
        assert_eq!(doc.format_at(3).weight, FontWeight::Normal);
        // typed text adopts the pending format
        let forward = fmt.forward_format(&doc, 5);
        assert_eq!(forward.weight, FontWeight::Bold);
        doc.insert(5, "!", &forward);
        assert_eq!(doc.format_at(6).weight, FontWeight::Bold);
    }

    #[test]
    fn toggles_invert_the_effective_format() {
        let mut doc = NoteDocument::from_plain_text("hi", &CharFormat::default());
        let mut fmt = TextFormatter::new();
        fmt.toggle_italic(&mut doc, Some((0, 2)), 0);
        assert!(doc.format_at(1).italic);
        fmt.toggle_italic(&mut doc, Some((0, 2)), 0);
        assert!(!doc.format_at(1).italic);

        // forward toggle twice cancels out
        fmt.toggle_underline(&mut doc, None, 2);
        fmt.toggle_underline(&mut doc, None, 2);
        assert!(!fmt.forward_format(&doc, 2).underline);
    }

    #[test]
    fn caret_move_drops_pending_forward_overrides() {
        let mut doc = NoteDocument::from_plain_text("hi", &CharFormat::default());
        let mut fmt = TextFormatter::new();
        fmt.toggle_bold(&mut doc, None, 2);
        assert_eq!(fmt.forward_format(&doc, 2).weight, FontWeight::Bold);
        fmt.caret_moved();
        assert_eq!(fmt.forward_format(&doc, 2).weight, FontWeight::Normal);
    }

    #[test]
    fn sentinel_family_never_reaches_a_run() {
        let mut doc = NoteDocument::from_plain_text("abc", &CharFormat::default());
        let mut fmt = TextFormatter::new();
        fmt.set_family(&mut doc, Some((0, 3)), DEFAULT_FONT_SENTINEL);
        assert_eq!(doc.format_at(1).family, crate::fonts::DEFAULT_FAMILY);
        fmt.set_family(&mut doc, Some((0, 3)), "Parisienne");
        assert_eq!(doc.format_at(1).family, "Parisienne");
    }

    #[test]
    fn gradient_mode_builds_per_run_gradient() {
        let colors = [Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)];
        assert_eq!(
            foreground_for(ColorMode::Solid, colors),
            Foreground::Solid { color: colors[0] }
        );
        assert_eq!(
            foreground_for(ColorMode::Vertical, colors),
            Foreground::Gradient {
                axis: GradientAxis::Vertical,
                start: colors[0],
                end: colors[1],
            }
        );
    }

    #[test]
    fn alignment_without_selection_targets_the_caret_block() {
        let mut doc = NoteDocument::from_plain_text("one\ntwo", &CharFormat::default());
        let fmt = TextFormatter::new();
        fmt.set_alignment(&mut doc, None, 5, Alignment::Center);
        assert_eq!(doc.block_alignment(0), Alignment::Left);
        assert_eq!(doc.block_alignment(1), Alignment::Center);
    }
}
