use crate::paths;
use eframe::egui;

/// Family name the "Défaut" menu entry resolves to. egui has no
/// platform font lookup, so the default is its bundled proportional
/// face.
pub const DEFAULT_FAMILY: &str = "Ubuntu-Light";

pub const DEFAULT_FONT_SIZE: u32 = 13;

/// Register every `.ttf` under the bundled fonts directory with egui
/// and return the sorted family names that were installed. Families
/// are named after the file stem; unreadable files are skipped.
pub fn install_bundled_fonts(ctx: &egui::Context) -> Vec<String> {
    let mut definitions = egui::FontDefinitions::default();
    let mut families = Vec::new();

    let dir = paths::fonts_dir();
    if let Ok(entries) = std::fs::read_dir(&dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("ttf") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match std::fs::read(&path) {
                Ok(bytes) => {
                    definitions
                        .font_data
                        .insert(name.to_string(), egui::FontData::from_owned(bytes));
                    definitions.families.insert(
                        egui::FontFamily::Name(name.into()),
                        vec![name.to_string(), DEFAULT_FAMILY.to_string()],
                    );
                    families.push(name.to_string());
                }
                Err(e) => {
                    tracing::warn!("skipping font file {}: {e}", path.display());
                }
            }
        }
    }

    families.sort();
    if !families.is_empty() {
        ctx.set_fonts(definitions);
    }
    families
}

/// Map a concrete family name to the egui family used for layout.
/// Unknown names fall back to the proportional default so a stale
/// font config cannot break rendering.
pub fn family_id(family: &str, installed: &[String]) -> egui::FontFamily {
    if family == DEFAULT_FAMILY || !installed.iter().any(|f| f == family) {
        egui::FontFamily::Proportional
    } else {
        egui::FontFamily::Name(family.into())
    }
}

/// Like [`family_id`], but prefers a `<family>-Bold` face when one was
/// bundled. egui has no synthetic bolding, so without a bold variant
/// the regular face is used unchanged.
pub fn family_id_weighted(family: &str, bold: bool, installed: &[String]) -> egui::FontFamily {
    if bold {
        let variant = format!("{family}-Bold");
        if installed.iter().any(|f| *f == variant) {
            return egui::FontFamily::Name(variant.into());
        }
    }
    family_id(family, installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_family_falls_back_to_proportional() {
        let installed = vec!["Parisienne".to_string()];
        assert_eq!(
            family_id("Nope", &installed),
            egui::FontFamily::Proportional
        );
        assert_eq!(
            family_id(DEFAULT_FAMILY, &installed),
            egui::FontFamily::Proportional
        );
        assert_eq!(
            family_id("Parisienne", &installed),
            egui::FontFamily::Name("Parisienne".into())
        );
    }

    #[test]
    fn bold_uses_the_bundled_variant_only_when_present() {
        let installed = vec!["Lora".to_string(), "Lora-Bold".to_string()];
        assert_eq!(
            family_id_weighted("Lora", true, &installed),
            egui::FontFamily::Name("Lora-Bold".into())
        );
        assert_eq!(
            family_id_weighted("Lora", false, &installed),
            egui::FontFamily::Name("Lora".into())
        );
        // no bold face bundled: keep the regular one
        assert_eq!(
            family_id_weighted("Parisienne", true, &["Parisienne".to_string()]),
            egui::FontFamily::Name("Parisienne".into())
        );
    }
}
