use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Persisted defaults for global CLI options.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub edit: bool,
    pub preview: bool,
    pub perf: bool,
    pub storage_dir: Option<PathBuf>,
    pub origin: Option<String>,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` (normally the command line) over `self`.
    ///
    /// Booleans are OR-ed; options prefer `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            edit: self.edit || other.edit,
            preview: self.preview || other.preview,
            perf: self.perf || other.perf,
            storage_dir: other
                .storage_dir
                .clone()
                .or_else(|| self.storage_dir.clone()),
            origin: other.origin.clone().or_else(|| self.origin.clone()),
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }
}

fn app_dir(base: PathBuf) -> PathBuf {
    base.join("blockpage")
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return app_dir(PathBuf::from(appdata)).join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return app_dir(PathBuf::from(home).join("Library").join("Application Support"))
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return app_dir(PathBuf::from(xdg)).join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return app_dir(PathBuf::from(home).join(".config")).join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".blockpagerc")
}

/// Where the local document cache lives when no `--storage-dir` is given.
pub fn default_storage_dir() -> PathBuf {
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            return app_dir(PathBuf::from(xdg));
        }
        if let Some(home) = std::env::var_os("HOME") {
            return app_dir(PathBuf::from(home).join(".local").join("share"));
        }
    }

    global_config_path()
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from(".blockpage"), Path::to_path_buf)
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
    let mut lines = vec!["# blockpage defaults (saved with --save)".to_string()];
    if flags.edit {
        lines.push("--edit".to_string());
    }
    if flags.preview {
        lines.push("--preview".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(dir) = &flags.storage_dir {
        lines.push(format!("--storage-dir {}", dir.display()));
    }
    if let Some(origin) = &flags.origin {
        lines.push(format!("--origin {origin}"));
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
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

/// Value of `--name VALUE` or `--name=VALUE` at `tokens[*i]`, advancing `i`
/// past a separate value.
fn option_value(tokens: &[String], i: &mut usize, name: &str) -> Option<String> {
    let token = &tokens[*i];
    if token == name {
        let value = tokens.get(*i + 1)?.clone();
        *i += 1;
        return Some(value);
    }
    token
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('='))
        .map(ToOwned::to_owned)
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i].as_str() {
            "--edit" => flags.edit = true,
            "--preview" => flags.preview = true,
            "--perf" => flags.perf = true,
            _ => {
                if let Some(dir) = option_value(tokens, &mut i, "--storage-dir") {
                    flags.storage_dir = Some(PathBuf::from(dir));
                } else if let Some(origin) = option_value(tokens, &mut i, "--origin") {
                    flags.origin = Some(origin);
                } else if let Some(path) = option_value(tokens, &mut i, "--render-debug-log") {
                    flags.render_debug_log = Some(PathBuf::from(path));
                }
            }
        }
        i += 1;
    }
    flags
}
