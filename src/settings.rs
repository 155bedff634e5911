use std::path::PathBuf;

/// Persistent engine configuration, stored as `key=value` lines.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineSettings {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Height of the status strip along the bottom edge. Pointer presses and
    /// drags over it are not painted.
    pub ui_strip_height: u32,
    pub max_undo_steps: usize,
    pub font_family: String,
    pub font_size: f32,
    /// Where saved drawings go.
    pub output_dir: PathBuf,
    pub log_level: log::LevelFilter,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            canvas_width: 1024,
            canvas_height: 768,
            ui_strip_height: 60,
            max_undo_steps: 50,
            font_family: "Arial".to_string(),
            font_size: 24.0,
            output_dir: PathBuf::from("."),
            log_level: log::LevelFilter::Info,
        }
    }
}

impl EngineSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/freakdraw/freakdraw_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\FreakDraw\freakdraw_settings.cfg
    /// On macOS:   ~/Library/Application Support/FreakDraw/freakdraw_settings.cfg
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").or_else(|_| std::env::var("USERPROFILE")).ok()?;
            return Some(PathBuf::from(appdata).join("FreakDraw").join("freakdraw_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("FreakDraw")
                    .join("freakdraw_settings.cfg"),
            );
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let config_dir = match std::env::var("XDG_CONFIG_HOME") {
                Ok(xdg) => PathBuf::from(xdg),
                Err(_) => PathBuf::from(std::env::var("HOME").ok()?).join(".config"),
            };
            Some(config_dir.join("freakdraw").join("freakdraw_settings.cfg"))
        }
    }

    /// Height of the paintable region above the status strip.
    pub fn drawable_height(&self) -> u32 {
        self.canvas_height.saturating_sub(self.ui_strip_height)
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "canvas_width={}\n\
             canvas_height={}\n\
             ui_strip_height={}\n\
             max_undo_steps={}\n\
             font_family={}\n\
             font_size={}\n\
             output_dir={}\n\
             log_level={}\n",
            self.canvas_width,
            self.canvas_height,
            self.ui_strip_height,
            self.max_undo_steps,
            self.font_family,
            self.font_size,
            self.output_dir.display(),
            self.log_level,
        )
    }

    /// Parse `key=value` lines on top of the defaults. Unknown keys and
    /// unparsable values are skipped.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            match key {
                "canvas_width" => {
                    if let Ok(v) = val.parse::<u32>() {
                        s.canvas_width = v.max(1);
                    }
                }
                "canvas_height" => {
                    if let Ok(v) = val.parse::<u32>() {
                        s.canvas_height = v.max(1);
                    }
                }
                "ui_strip_height" => {
                    if let Ok(v) = val.parse() {
                        s.ui_strip_height = v;
                    }
                }
                "max_undo_steps" => {
                    if let Ok(v) = val.parse::<usize>() {
                        s.max_undo_steps = v.max(1);
                    }
                }
                "font_family" if !val.is_empty() => s.font_family = val.to_string(),
                "font_size" => {
                    if let Ok(v) = val.parse::<f32>() {
                        if v.is_finite() && v > 0.0 {
                            s.font_size = v;
                        }
                    }
                }
                "output_dir" if !val.is_empty() => s.output_dir = PathBuf::from(val),
                "log_level" => {
                    if let Ok(v) = val.parse() {
                        s.log_level = v;
                    }
                }
                _ => {}
            }
        }
        s
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        let Ok(content) = std::fs::read_to_string(&path) else { return Self::default() };
        Self::parse(&content)
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(&path, self.to_config_string()) {
            log::warn!("Could not write settings to {}: {}", path.display(), e);
        }
    }
}
