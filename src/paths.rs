use std::path::PathBuf;

/// Directory holding all writable note and config files.
///
/// Can be overridden with the `PIN_NOTE_DATA_DIR` environment variable,
/// otherwise defaults to `~/.pin_note`.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PIN_NOTE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pin_note")
}

/// Root of the bundled read-only resources, resolved next to the
/// executable. The directory may be absent; callers must tolerate
/// missing files.
pub fn resources_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("resources")
}

/// Bundled background textures for the built-in image themes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureAssets {
    pub notes: PathBuf,
    pub calpin: PathBuf,
}

impl TextureAssets {
    pub fn bundled() -> Self {
        let dir = resources_dir().join("textures");
        Self {
            notes: dir.join("notes.png"),
            calpin: dir.join("calpin.png"),
        }
    }
}

/// Directory scanned for bundled `.ttf` font files.
pub fn fonts_dir() -> PathBuf {
    resources_dir().join("fonts")
}

#[cfg(test)]
mod tests {
    use super::data_dir;
    use serial_test::serial;

    #[test]
    #[serial]
    fn data_dir_honours_env_override() {
        std::env::set_var("PIN_NOTE_DATA_DIR", "/tmp/pin_note_test");
        assert_eq!(data_dir(), std::path::PathBuf::from("/tmp/pin_note_test"));
        std::env::remove_var("PIN_NOTE_DATA_DIR");
    }

    #[test]
    #[serial]
    fn data_dir_defaults_under_home() {
        std::env::remove_var("PIN_NOTE_DATA_DIR");
        let dir = data_dir();
        assert!(dir.ends_with(".pin_note"));
    }
}
