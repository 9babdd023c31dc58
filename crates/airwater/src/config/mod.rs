use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::query::TableLayout;

pub const ENV_PREFIX: &str = "AIRWATER_";
pub const DEFAULT_DATABASE_FILE: &str = "air-water-pollution.sqlite";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EnvConfig {
    #[serde(default)]
    pub db: Option<PathBuf>,
    #[serde(default)]
    pub table: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Result<Self> {
        envy::prefixed(ENV_PREFIX)
            .from_env::<Self>()
            .context("failed to parse AIRWATER_* environment variables")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides<'a> {
    pub database: Option<&'a Path>,
    pub table: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub home_dir: PathBuf,
    pub cwd: PathBuf,
    pub database_path: PathBuf,
    pub layout: TableLayout,
}

pub fn resolve_runtime_config(
    home_dir: &Path,
    cwd: &Path,
    overrides: &ConfigOverrides<'_>,
    env: &EnvConfig,
) -> Result<RuntimeConfig> {
    if !home_dir.is_absolute() {
        bail!("home_dir must be absolute: {}", home_dir.display());
    }
    if !cwd.is_absolute() {
        bail!("cwd must be absolute: {}", cwd.display());
    }

    let home_dir = normalize_lexical(home_dir);
    let cwd = normalize_lexical(cwd);
    let database_path = match overrides.database.or(env.db.as_deref()) {
        Some(path) => resolve_user_path(path, &home_dir, &cwd)?,
        None => home_dir.join(".airwater").join(DEFAULT_DATABASE_FILE),
    };

    let table = overrides
        .table
        .map(str::to_string)
        .or_else(|| env.table.clone())
        .filter(|table| !table.trim().is_empty());
    let layout = match table {
        Some(table) => TableLayout::default().with_table(table),
        None => TableLayout::default(),
    };

    Ok(RuntimeConfig {
        home_dir,
        cwd,
        database_path: normalize_lexical(&database_path),
        layout,
    })
}

fn resolve_user_path(path: &Path, home_dir: &Path, cwd: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(path, home_dir)?;
    let resolved = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };

    Ok(normalize_lexical(&resolved))
}

fn expand_tilde(path: &Path, home_dir: &Path) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let mut expanded = home_dir.to_path_buf();
            for component in components {
                expanded.push(component.as_os_str());
            }
            Ok(expanded)
        }
        Some(Component::Normal(first))
            if first
                .to_str()
                .is_some_and(|segment| segment.starts_with('~')) =>
        {
            bail!(
                "unsupported home expansion syntax (only `~` and `~/...` are supported): {}",
                path.display()
            )
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            _ => normalized.push(component.as_os_str()),
        }
    }

    normalized
}
