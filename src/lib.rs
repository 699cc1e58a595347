pub mod autosave;
pub mod autostart;
pub mod config;
pub mod controller;
pub mod document;
pub mod fonts;
pub mod format;
pub mod gui;
pub mod logging;
pub mod overlay;
pub mod paths;
pub mod theme;
