use crate::theme::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientAxis {
    Horizontal,
    Vertical,
}

/// Foreground of a text run. Gradients are expressed in the run's own
/// local coordinate space, so a gradient repeats per run instead of
/// spanning the whole document. Saved notes depend on this, so it is
/// kept on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Foreground {
    Solid {
        color: Color,
    },
    Gradient {
        axis: GradientAxis,
        start: Color,
        end: Color,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment::Left
    }
}

/// Fully resolved character format. `family` always holds a concrete
/// family name; the "Défaut" sentinel is translated before a format
/// ever reaches a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharFormat {
    pub family: String,
    pub size_pt: u32,
    pub weight: FontWeight,
    pub italic: bool,
    pub underline: bool,
    pub foreground: Foreground,
}

impl Default for CharFormat {
    fn default() -> Self {
        Self {
            family: crate::fonts::DEFAULT_FAMILY.to_string(),
            size_pt: 13,
            weight: FontWeight::Normal,
            italic: false,
            underline: false,
            foreground: Foreground::Solid {
                color: Color::rgb(0x2f, 0x2a, 0x1f),
            },
        }
    }
}

/// Partial format; only the set fields overwrite the target when
/// merged, mirroring how merge-style character formats behave in rich
/// text toolkits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatPatch {
    pub family: Option<String>,
    pub size_pt: Option<u32>,
    pub weight: Option<FontWeight>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub foreground: Option<Foreground>,
}

impl FormatPatch {
    pub fn apply_to(&self, base: &CharFormat) -> CharFormat {
        CharFormat {
            family: self.family.clone().unwrap_or_else(|| base.family.clone()),
            size_pt: self.size_pt.unwrap_or(base.size_pt),
            weight: self.weight.unwrap_or(base.weight),
            italic: self.italic.unwrap_or(base.italic),
            underline: self.underline.unwrap_or(base.underline),
            foreground: self.foreground.unwrap_or(base.foreground),
        }
    }
}

/// A maximal span of characters sharing one format. `len` counts
/// characters, matching the char-based cursor indices egui uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub len: usize,
    pub format: CharFormat,
}

/// Rich note content: one text buffer, a run list covering it exactly,
/// and an alignment per paragraph (text split on `\n`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDocument {
    text: String,
    runs: Vec<Run>,
    blocks: Vec<Alignment>,
}

impl Default for NoteDocument {
    fn default() -> Self {
        Self {
            text: String::new(),
            runs: Vec::new(),
            blocks: vec![Alignment::Left],
        }
    }
}

impl NoteDocument {
    pub fn from_plain_text(text: &str, format: &CharFormat) -> Self {
        let mut doc = Self::default();
        doc.insert(0, text, format);
        doc
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_alignment(&self, block: usize) -> Alignment {
        self.blocks.get(block).copied().unwrap_or_default()
    }

    /// Consistency check used when loading persisted documents: the
    /// runs must cover the text exactly and there must be one block
    /// per paragraph.
    pub fn is_consistent(&self) -> bool {
        let run_total: usize = self.runs.iter().map(|r| r.len).sum();
        let newline_count = self.text.chars().filter(|&c| c == '\n').count();
        run_total == self.char_len()
            && self.blocks.len() == newline_count + 1
            && self.runs.iter().all(|r| r.len > 0)
    }

    fn char_to_byte(&self, pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(pos)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    /// Paragraph index containing the given character position.
    pub fn block_index_at(&self, pos: usize) -> usize {
        self.text
            .chars()
            .take(pos)
            .filter(|&c| c == '\n')
            .count()
    }

    /// Ensure a run boundary exists at `pos`; returns the index of the
    /// run starting there.
    fn split_runs_at(&mut self, pos: usize) -> usize {
        let mut consumed = 0;
        for i in 0..self.runs.len() {
            let len = self.runs[i].len;
            if consumed == pos {
                return i;
            }
            if pos < consumed + len {
                let head = pos - consumed;
                let tail = len - head;
                self.runs[i].len = head;
                let format = self.runs[i].format.clone();
                self.runs.insert(i + 1, Run { len: tail, format });
                return i + 1;
            }
            consumed += len;
        }
        self.runs.len()
    }

    fn coalesce_runs(&mut self) {
        self.runs.retain(|r| r.len > 0);
        let mut i = 0;
        while i + 1 < self.runs.len() {
            if self.runs[i].format == self.runs[i + 1].format {
                self.runs[i].len += self.runs[i + 1].len;
                self.runs.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }

    /// Insert text at a character position with the given format.
    /// Newlines in the inserted text create paragraphs inheriting the
    /// alignment of the paragraph they split.
    pub fn insert(&mut self, pos: usize, s: &str, format: &CharFormat) {
        if s.is_empty() {
            return;
        }
        let pos = pos.min(self.char_len());
        let byte = self.char_to_byte(pos);
        let block = self.block_index_at(pos);
        self.text.insert_str(byte, s);

        let run_idx = self.split_runs_at(pos);
        self.runs.insert(
            run_idx,
            Run {
                len: s.chars().count(),
                format: format.clone(),
            },
        );
        self.coalesce_runs();

        let new_paragraphs = s.chars().filter(|&c| c == '\n').count();
        let inherited = self.block_alignment(block);
        for _ in 0..new_paragraphs {
            self.blocks.insert(block + 1, inherited);
        }
    }

    /// Delete a character range. Removing a newline merges the two
    /// paragraphs around it, keeping the first one's alignment.
    pub fn delete(&mut self, start: usize, end: usize) {
        let len = self.char_len();
        let (start, end) = (start.min(len), end.min(len));
        if start >= end {
            return;
        }
        let byte_start = self.char_to_byte(start);
        let byte_end = self.char_to_byte(end);
        let removed_newlines = self.text[byte_start..byte_end]
            .chars()
            .filter(|&c| c == '\n')
            .count();
        let block = self.block_index_at(start);
        self.text.replace_range(byte_start..byte_end, "");

        let first = self.split_runs_at(start);
        let last = self.split_runs_at(end);
        self.runs.drain(first..last);
        self.coalesce_runs();

        for _ in 0..removed_newlines {
            if block + 1 < self.blocks.len() {
                self.blocks.remove(block + 1);
            }
        }
    }

    /// Merge a format patch into every run overlapping the range.
    pub fn merge_format(&mut self, start: usize, end: usize, patch: &FormatPatch) {
        let len = self.char_len();
        let (start, end) = (start.min(len), end.min(len));
        if start >= end {
            return;
        }
        let first = self.split_runs_at(start);
        let last = self.split_runs_at(end);
        for run in &mut self.runs[first..last] {
            run.format = patch.apply_to(&run.format);
        }
        self.coalesce_runs();
    }

    /// Effective format at a caret position: the format of the
    /// character before the caret, or the first run / defaults for an
    /// empty prefix.
    pub fn format_at(&self, pos: usize) -> CharFormat {
        if self.runs.is_empty() {
            return CharFormat::default();
        }
        let target = pos.saturating_sub(1).min(self.char_len().saturating_sub(1));
        let mut consumed = 0;
        for run in &self.runs {
            if target < consumed + run.len {
                return run.format.clone();
            }
            consumed += run.len;
        }
        self.runs[self.runs.len() - 1].format.clone()
    }

    /// Set the alignment of every paragraph touched by the character
    /// range (a collapsed range touches exactly one paragraph).
    pub fn set_alignment(&mut self, start: usize, end: usize, alignment: Alignment) {
        let len = self.char_len();
        let (start, end) = (start.min(len), end.min(len));
        let first = self.block_index_at(start);
        let last = self.block_index_at(end.max(start));
        for block in first..=last {
            if let Some(a) = self.blocks.get_mut(block) {
                *a = alignment;
            }
        }
    }

    /// Fold an externally edited plain-text buffer back into the run
    /// model. The common prefix and suffix are preserved with their
    /// formatting; the replaced middle takes `format` (the
    /// forward-typing format at the edit point).
    pub fn sync_text(&mut self, new_text: &str, format: &CharFormat) {
        if new_text == self.text {
            return;
        }
        let old: Vec<char> = self.text.chars().collect();
        let new: Vec<char> = new_text.chars().collect();

        let mut prefix = 0;
        while prefix < old.len() && prefix < new.len() && old[prefix] == new[prefix] {
            prefix += 1;
        }
        let mut suffix = 0;
        while suffix < old.len() - prefix
            && suffix < new.len() - prefix
            && old[old.len() - 1 - suffix] == new[new.len() - 1 - suffix]
        {
            suffix += 1;
        }

        self.delete(prefix, old.len() - suffix);
        let inserted: String = new[prefix..new.len() - suffix].iter().collect();
        self.insert(prefix, &inserted, format);
    }
}
