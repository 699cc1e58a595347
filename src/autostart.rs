//! Best-effort mirror of the autostart preference into the OS.
//!
//! The config file owns the user's choice; registration failures are
//! logged and otherwise ignored so they can never surface as a crash.

/// Apply the desired autostart state to the OS registration.
pub fn apply(enabled: bool) {
    if let Err(e) = imp::set_autostart(enabled) {
        tracing::warn!("autostart registration failed: {e}");
    }
}

#[cfg(target_os = "windows")]
mod imp {
    use windows::core::PCWSTR;
    use windows::Win32::System::Registry::{
        RegCloseKey, RegDeleteValueW, RegOpenKeyExW, RegSetValueExW, HKEY, HKEY_CURRENT_USER,
        KEY_SET_VALUE, REG_SZ,
    };

    const RUN_KEY: &str = "Software\\Microsoft\\Windows\\CurrentVersion\\Run";
    const VALUE_NAME: &str = "PinNote";

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    pub fn set_autostart(enabled: bool) -> anyhow::Result<()> {
        let subkey = wide(RUN_KEY);
        let value_name = wide(VALUE_NAME);
        let mut key = HKEY::default();
        unsafe {
            RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR(subkey.as_ptr()),
                0,
                KEY_SET_VALUE,
                &mut key,
            )
            .ok()?;
        }

        let result = if enabled {
            let exe = std::env::current_exe()?;
            let command = wide(&format!("\"{}\"", exe.display()));
            let bytes: &[u8] = unsafe {
                std::slice::from_raw_parts(command.as_ptr() as *const u8, command.len() * 2)
            };
            unsafe {
                RegSetValueExW(key, PCWSTR(value_name.as_ptr()), 0, REG_SZ, Some(bytes)).ok()
            }
        } else {
            // deleting an absent value is fine
            let status = unsafe { RegDeleteValueW(key, PCWSTR(value_name.as_ptr())) };
            let _ = status;
            Ok(())
        };

        unsafe {
            let _ = RegCloseKey(key);
        }
        result.map_err(Into::into)
    }
}

#[cfg(not(target_os = "windows"))]
mod imp {
    pub fn set_autostart(_enabled: bool) -> anyhow::Result<()> {
        // no registration mechanism on this platform
        Ok(())
    }
}
