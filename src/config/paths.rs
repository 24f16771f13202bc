//! Where chartdeck keeps its files
//!
//! `CHARTDECK_CONFIG_DIR` and `CHARTDECK_DATA_DIR` always win. Otherwise Unix
//! follows XDG (`~/.config`, `~/.local/share`) and Windows uses the
//! platform's known folders.

use directories::{BaseDirs, ProjectDirs};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "chartdeck";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirKind {
    Config,
    Data,
}

impl DirKind {
    fn override_var(self) -> &'static str {
        match self {
            DirKind::Config => "CHARTDECK_CONFIG_DIR",
            DirKind::Data => "CHARTDECK_DATA_DIR",
        }
    }

    fn xdg_var(self) -> &'static str {
        match self {
            DirKind::Config => "XDG_CONFIG_HOME",
            DirKind::Data => "XDG_DATA_HOME",
        }
    }

    /// Home-relative location used when the XDG variable is unset
    fn home_relative(self) -> &'static [&'static str] {
        match self {
            DirKind::Config => &[".config"],
            DirKind::Data => &[".local", "share"],
        }
    }
}

fn resolve(
    kind: DirKind,
    env: impl Fn(&str) -> Option<String>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = env(kind.override_var()) {
        return PathBuf::from(dir);
    }

    if cfg!(windows) {
        if let Some(dirs) = ProjectDirs::from("", "", APP_DIR) {
            let dir = match kind {
                DirKind::Config => dirs.config_dir(),
                DirKind::Data => dirs.data_dir(),
            };
            return dir.to_path_buf();
        }
    } else if let Some(xdg) = env(kind.xdg_var()) {
        return PathBuf::from(xdg).join(APP_DIR);
    }

    let home = home.unwrap_or_else(|| PathBuf::from("."));
    kind.home_relative()
        .iter()
        .fold(home, |dir, part| dir.join(part))
        .join(APP_DIR)
}

fn resolve_from_process(kind: DirKind) -> PathBuf {
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    resolve(kind, |key| std::env::var(key).ok(), home)
}

/// Directory holding the root `config.yaml`
pub fn config_dir() -> PathBuf {
    resolve_from_process(DirKind::Config)
}

/// Directory holding per-context state
pub fn data_dir() -> PathBuf {
    resolve_from_process(DirKind::Data)
}

pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// `config.yaml` layered over the root file when `context` is active
pub fn context_config_path(context: &str) -> PathBuf {
    data_dir().join("contexts").join(context).join("config.yaml")
}

pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}
