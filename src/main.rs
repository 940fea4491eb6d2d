//! marksplit - A terminal markdown editor with a live preview.
//!
//! # Usage
//!
//! ```bash
//! marksplit notes.md
//! marksplit --split 40 --no-autosave notes.md
//! marksplit --html notes.md > notes.html
//! ```

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use marksplit::app::App;
use marksplit::config::{
    ConfigFlags, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, save_config_flags,
};
use marksplit::highlight::set_background_mode;
use marksplit::render::{render, standalone_html};

/// A terminal markdown editor with a live side-by-side preview
#[derive(Parser, Debug)]
#[command(name = "marksplit", version, about, long_about = None)]
struct Cli {
    /// Markdown file to edit (created on first save if missing)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print FILE as a standalone HTML page and exit
    #[arg(long, requires = "file")]
    html: bool,

    /// Milliseconds of idle typing before the preview re-renders
    #[arg(long, value_name = "MS")]
    render_delay: Option<u64>,

    /// Milliseconds of idle typing before a saved file is written again
    #[arg(long, value_name = "MS")]
    autosave_delay: Option<u64>,

    /// Disable auto-save
    #[arg(long)]
    no_autosave: bool,

    /// Initial editor width in percent of the window
    #[arg(long, value_name = "PERCENT", value_parser = clap::value_parser!(u8).range(0..=100))]
    split: Option<u8>,

    /// Start with only the preview visible
    #[arg(long)]
    preview_only: bool,

    /// Force syntax highlight theme background (light or dark)
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Append log output to this file (the editor logs nothing otherwise)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            render_delay_ms: self.render_delay,
            autosave_delay_ms: self.autosave_delay,
            no_autosave: self.no_autosave,
            split: self.split,
            preview_only: self.preview_only,
            theme: self.theme,
            log_file: self.log_file.clone(),
        }
    }
}

/// Where log output goes.
#[derive(Debug, PartialEq, Eq)]
enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    /// The terminal belongs to the editor, so nothing is logged.
    Off,
}

/// Logs never go to the terminal while the editor owns it.
fn log_target(log_file: Option<&Path>, interactive: bool) -> LogTarget<'_> {
    match (log_file, interactive) {
        (Some(path), _) => LogTarget::File(path),
        (None, true) => LogTarget::Off,
        (None, false) => LogTarget::Stderr,
    }
}

fn init_logging(target: LogTarget<'_>) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            subscriber
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        LogTarget::Stderr => subscriber.with_writer(std::io::stderr).init(),
        LogTarget::Off => {}
    }
    Ok(())
}

fn print_html(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let rendered = render(&text).context("Failed to render markdown")?;
    let title = path
        .file_stem()
        .map_or_else(|| "marksplit".to_string(), |s| s.to_string_lossy().into_owned());
    print!("{}", standalone_html(&rendered, &title));
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(log_target(effective.log_file.as_deref(), !cli.html))?;
    tracing::debug!(?effective, "effective configuration");

    set_background_mode(
        effective
            .theme
            .unwrap_or(ThemeMode::Auto)
            .highlight_background(),
    );

    if cli.html
        && let Some(path) = &cli.file
    {
        return print_html(path);
    }

    let mut app = App::new()
        .with_file(cli.file)
        .with_session_config(effective.session_config())
        .with_split_percent(effective.split_percent())
        .with_preview_only(effective.preview_only);

    app.run().context("Application error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_without_log_file_logs_nothing() {
        assert_eq!(log_target(None, true), LogTarget::Off);
    }

    #[test]
    fn test_html_export_logs_to_stderr() {
        assert_eq!(log_target(None, false), LogTarget::Stderr);
    }

    #[test]
    fn test_log_file_wins_in_both_modes() {
        let path = Path::new("marksplit.log");
        assert_eq!(log_target(Some(path), true), LogTarget::File(path));
        assert_eq!(log_target(Some(path), false), LogTarget::File(path));
    }

    #[test]
    fn test_cli_parses_log_file() {
        let cli = Cli::parse_from(["marksplit", "--log-file", "out.log", "notes.md"]);
        assert_eq!(cli.flags().log_file, Some(PathBuf::from("out.log")));
        assert!(!cli.html);
    }
}
