use std::{
    path::Path,
    fs::File,
    io::{
        BufReader,
        BufWriter,
    },
};
use serde::{Serialize, Deserialize};
use anyhow::*;
use vek::*;


pub const THEME_FILE_NAME: &'static str = "theme.json";


/// Widget color scheme and metrics. Loaded from a JSON file next to the
/// executable, falling back to the built-in dark palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub background: [f32; 4],
    pub panel: [f32; 4],
    pub button: [f32; 4],
    pub button_hover: [f32; 4],
    pub popup: [f32; 4],
    pub highlight: [f32; 4],
    pub text: [f32; 4],
    pub font_size: f32,
    pub corner_radius: f32,
    pub padding: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: [0.10, 0.10, 0.12, 1.0],
            panel: [0.16, 0.16, 0.19, 1.0],
            button: [0.25, 0.25, 0.28, 1.0],
            button_hover: [0.35, 0.35, 0.40, 1.0],
            popup: [0.13, 0.13, 0.16, 1.0],
            highlight: [0.25, 0.35, 0.55, 1.0],
            text: [0.92, 0.92, 0.92, 1.0],
            font_size: 16.0,
            corner_radius: 3.0,
            padding: 8.0,
        }
    }
}

impl Theme {
    pub fn read(path: impl AsRef<Path>) -> Self {
        Self::try_read(path).unwrap_or_default()
    }

    pub fn try_read(path: impl AsRef<Path>) -> Result<Self> {
        Ok(serde_json::from_reader(BufReader::new(File::open(path)?))?)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), self)?;
        Ok(())
    }

    /// Convert a stored color into the renderer color type.
    pub fn color(rgba: [f32; 4]) -> Rgba<f32> {
        Rgba::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }
}


#[test]
fn test_theme_roundtrip() {
    let path = std::env::temp_dir().join("gui-theme-roundtrip.json");
    let mut theme = Theme::default();
    theme.font_size = 19.0;
    theme.write(&path).unwrap();

    let read = Theme::try_read(&path).unwrap();
    assert_eq!(read.font_size, 19.0);
    assert_eq!(read.button, Theme::default().button);
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_missing_theme_file_falls_back_to_default() {
    let theme = Theme::read("does-not-exist/theme.json");
    assert_eq!(theme.font_size, Theme::default().font_size);
}
