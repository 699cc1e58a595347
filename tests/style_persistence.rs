use pin_note::config::ConfigStore;
use pin_note::controller::StyleController;
use pin_note::document::NoteDocument;
use pin_note::format::TextFormatter;
use pin_note::overlay::Margins;
use pin_note::paths::TextureAssets;
use pin_note::theme::{Color, RenderSpec, Theme};
use std::path::PathBuf;

fn missing_assets() -> TextureAssets {
    TextureAssets {
        notes: PathBuf::from("/nonexistent/notes.png"),
        calpin: PathBuf::from("/nonexistent/calpin.png"),
    }
}

fn controller(dir: &std::path::Path) -> StyleController {
    StyleController::load(ConfigStore::new(dir), missing_assets())
}

#[test]
fn every_style_choice_survives_a_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut fmt = TextFormatter::new();
    let mut doc = NoteDocument::default();

    {
        let mut ctl = controller(dir.path());
        ctl.select_theme("Notes");
        ctl.commit_margins(Margins {
            left: 50.0,
            top: 60.0,
            right: 20.0,
            bottom: 30.0,
        });
        ctl.select_font(&mut fmt, &mut doc, None, "Parisienne");
        ctl.set_font_size(&mut fmt, &mut doc, None, 21, true);
        ctl.commit_opacity(0.65);
        ctl.set_autostart(true);
    }

    let ctl = controller(dir.path());
    assert_eq!(ctl.state().theme, Theme::Notes);
    assert_eq!(ctl.margins().left, 50.0);
    assert_eq!(ctl.margins().top, 60.0);
    assert_eq!(ctl.state().font.current, "Parisienne");
    assert_eq!(ctl.state().font.size, 21);
    assert_eq!(ctl.state().opacity, 0.65);
    assert!(ctl.state().autostart);
}

#[test]
fn aliases_render_identically_to_their_replacements() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut ctl = controller(dir.path());

    for (legacy, replacement) in [("Texture1", "Notes"), ("Texture2", "Calpin")] {
        ctl.select_theme(legacy);
        let via_alias = (ctl.render_spec().clone(), ctl.margins());
        ctl.select_theme(replacement);
        assert_eq!((ctl.render_spec().clone(), ctl.margins()), via_alias);
    }
}

#[test]
fn reapplying_a_theme_changes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut ctl = controller(dir.path());

    for name in ["Papier", "Sticky", "Sombre", "Notes", "Calpin", "Personnalisé"] {
        ctl.select_theme(name);
        let once = (ctl.render_spec().clone(), ctl.margins(), ctl.state().clone());
        ctl.select_theme(name);
        assert_eq!(
            (ctl.render_spec().clone(), ctl.margins(), ctl.state().clone()),
            once
        );
    }
}

#[test]
fn font_size_preview_is_not_persisted_until_committed() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut fmt = TextFormatter::new();
    let mut doc = NoteDocument::default();

    {
        let mut ctl = controller(dir.path());
        ctl.set_font_size(&mut fmt, &mut doc, None, 40, false);
    }
    let ctl = controller(dir.path());
    assert_eq!(ctl.state().font.size, 13);
}

#[test]
fn opacity_preview_is_clamped_but_not_saved() {
    let dir = tempfile::tempdir().expect("temp dir");
    {
        let mut ctl = controller(dir.path());
        ctl.preview_opacity(0.1);
        assert_eq!(ctl.state().opacity, 0.3);
    }
    let ctl = controller(dir.path());
    assert_eq!(ctl.state().opacity, 1.0);
}

#[test]
fn legacy_saved_state_loads_through_migration() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(
        dir.path().join("theme.json"),
        r#"{"theme":"Texture2"}"#,
    )
    .expect("write");
    std::fs::write(
        dir.path().join("layout.json"),
        r#"{"Texture2":[10,11,12,13]}"#,
    )
    .expect("write");

    let ctl = controller(dir.path());
    assert_eq!(ctl.state().theme, Theme::Calpin);
    assert_eq!(
        <[f32; 4]>::from(ctl.margins()),
        [10.0, 11.0, 12.0, 13.0]
    );
    // the bundled file is absent, so rendering degrades to Papier
    // while the theme identity stays Calpin
    assert!(matches!(ctl.render_spec(), RenderSpec::Stylesheet(_)));
    assert!(ctl.is_image_theme_active());
}

#[test]
fn custom_image_that_exists_enables_the_overlay_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let img = dir.path().join("bg.png");
    std::fs::write(&img, b"png bytes").expect("write");

    let mut ctl = controller(dir.path());
    ctl.set_custom_image(img.to_str().expect("utf8 path"));
    assert_eq!(ctl.state().theme, Theme::Personnalise);
    assert_eq!(
        ctl.render_spec(),
        &RenderSpec::Texture { path: img.clone() }
    );
    assert!(ctl.is_image_theme_active());

    // deleting the file and reloading falls back to Papier
    std::fs::remove_file(&img).expect("remove");
    let ctl = controller(dir.path());
    assert_eq!(ctl.state().theme, Theme::Personnalise);
    assert!(matches!(ctl.render_spec(), RenderSpec::Stylesheet(_)));
    assert!(!ctl.is_image_theme_active());
}

#[test]
fn custom_color_round_trips_as_hex() {
    let dir = tempfile::tempdir().expect("temp dir");
    {
        let mut ctl = controller(dir.path());
        ctl.set_custom_color(Color::rgb(0xab, 0xcd, 0xef));
    }
    let ctl = controller(dir.path());
    assert_eq!(
        ctl.render_spec(),
        &RenderSpec::Solid {
            fill: Color::rgb(0xab, 0xcd, 0xef)
        }
    );
}
