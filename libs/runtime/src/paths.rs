use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the server home directory to an absolute path.
///
/// - `None` or empty => platform default: `%APPDATA%\<subdir>` on Windows,
///   `$HOME/<subdir>` elsewhere.
/// - A leading `~` is expanded against the platform home directory.
/// - Relative paths are resolved against the current working directory.
///
/// When `create` is set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let raw = configured.filter(|s| !s.trim().is_empty());

    let resolved = match raw {
        None => platform_home()?.join(default_subdir),
        Some(p) if p == "~" => platform_home()?,
        Some(p) if p.starts_with("~/") || p.starts_with("~\\") => {
            platform_home()?.join(&p[2..])
        }
        Some(p) => {
            let pb = PathBuf::from(p);
            if pb.is_absolute() {
                pb
            } else {
                std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(pb)
            }
        }
    };

    if create {
        std::fs::create_dir_all(&resolved)
            .with_context(|| format!("failed to create {}", resolved.display()))?;
    }

    Ok(resolved)
}

fn platform_home() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    std::env::var_os(var)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("{} is not set", var))
}

/// Resolve a possibly-relative path against `base_dir`.
pub fn resolve_against(path: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
