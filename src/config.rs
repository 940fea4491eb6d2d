use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::highlight::HighlightBackground;
use crate::pane::DEFAULT_SPLIT_PERCENT;
use crate::session::{DEFAULT_AUTOSAVE_DELAY, DEFAULT_RENDER_DELAY, SessionConfig};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    /// The highlighter override for this mode; `Auto` detects from the
    /// terminal.
    pub const fn highlight_background(self) -> Option<HighlightBackground> {
        match self {
            Self::Auto => None,
            Self::Light => Some(HighlightBackground::Light),
            Self::Dark => Some(HighlightBackground::Dark),
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Startup defaults, from the config files and the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub render_delay_ms: Option<u64>,
    pub autosave_delay_ms: Option<u64>,
    pub no_autosave: bool,
    /// Editor width in percent.
    pub split: Option<u8>,
    pub preview_only: bool,
    pub theme: Option<ThemeMode>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches are or-ed, values from `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            render_delay_ms: other.render_delay_ms.or(self.render_delay_ms),
            autosave_delay_ms: other.autosave_delay_ms.or(self.autosave_delay_ms),
            no_autosave: self.no_autosave || other.no_autosave,
            split: other.split.or(self.split),
            preview_only: self.preview_only || other.preview_only,
            theme: other.theme.or(self.theme),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        let render_delay = self
            .render_delay_ms
            .map_or(DEFAULT_RENDER_DELAY, Duration::from_millis);
        let autosave_delay = if self.no_autosave {
            None
        } else {
            Some(
                self.autosave_delay_ms
                    .map_or(DEFAULT_AUTOSAVE_DELAY, Duration::from_millis),
            )
        };
        SessionConfig {
            render_delay,
            autosave_delay,
        }
    }

    pub fn split_percent(&self) -> f64 {
        self.split
            .map_or(DEFAULT_SPLIT_PERCENT, |percent| f64::from(percent.min(100)))
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("marksplit").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("marksplit")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("marksplit").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("marksplit")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".marksplitrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# marksplit defaults (saved with --save)".to_string()];
    if let Some(ms) = flags.render_delay_ms {
        lines.push(format!("--render-delay {ms}"));
    }
    if let Some(ms) = flags.autosave_delay_ms {
        lines.push(format!("--autosave-delay {ms}"));
    }
    if flags.no_autosave {
        lines.push("--no-autosave".to_string());
    }
    if let Some(percent) = flags.split {
        lines.push(format!("--split {percent}"));
    }
    if flags.preview_only {
        lines.push("--preview-only".to_string());
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.as_str()));
    }
    if let Some(log) = &flags.log_file {
        lines.push(format!("--log-file {}", log.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list. Unknown tokens and malformed
/// values are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let mut value = || {
            inline.map(ToOwned::to_owned).or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--no-autosave" => flags.no_autosave = true,
            "--preview-only" => flags.preview_only = true,
            "--render-delay" => {
                flags.render_delay_ms = value().and_then(|v| v.parse().ok());
            }
            "--autosave-delay" => {
                flags.autosave_delay_ms = value().and_then(|v| v.parse().ok());
            }
            "--split" => {
                flags.split = value()
                    .and_then(|v| v.parse::<u8>().ok())
                    .filter(|percent| *percent <= 100);
            }
            "--theme" => flags.theme = value().as_deref().and_then(parse_theme),
            "--log-file" => flags.log_file = value().map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}
