//! The Configure stage: assemble the platform app dir from the project's
//! template, assets and per-app overrides, then render `config.xml`.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::layout::PlatformLayout;

const CONFIG_FILE: &str = "config.xml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigureError {
    #[error("template {} has no config.xml", .0.display())]
    MissingTemplateConfig(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ConfigureError + '_ {
    move |source| ConfigureError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Values substituted into the template `config.xml`.
#[derive(Debug, Clone, Copy)]
pub struct TemplateValues<'a> {
    pub package: &'a str,
    pub id: &'a str,
    pub app_name: &'a str,
}

impl TemplateValues<'_> {
    pub fn render(&self, template: &str) -> String {
        template
            .replace("{{PACKAGE}}", self.package)
            .replace("{{ID}}", self.id)
            .replace("{{APP_NAME}}", self.app_name)
    }
}

/// Copies everything below `src` into `dst`, skipping entries `skip` rejects.
/// A missing `src` copies nothing. Returns the number of files copied.
pub fn copy_dir_contents(
    src: &Path,
    dst: &Path,
    skip: impl Fn(&Path) -> bool,
) -> Result<usize, ConfigureError> {
    if !src.is_dir() {
        debug!("nothing to copy from {}", src.display());
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| ConfigureError::Walk {
            path: src.to_path_buf(),
            source,
        })?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        if skip(rel) {
            continue;
        }

        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_error(&target))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::copy(entry.path(), &target).map_err(io_error(&target))?;
        copied += 1;
    }
    Ok(copied)
}

/// Runs the Configure stage and returns the configured app dir.
///
/// Later sources win: template, then assets, then overrides.
pub fn configure_project(
    layout: &PlatformLayout,
    values: &TemplateValues<'_>,
) -> Result<PathBuf, ConfigureError> {
    info!("configureProject:{} - starting", layout.platform());
    let app_dir = layout.app_dir();
    let template_dir = layout.template_dir();
    let template_config = template_dir.join(CONFIG_FILE);
    if !template_config.is_file() {
        return Err(ConfigureError::MissingTemplateConfig(template_dir));
    }

    fs::create_dir_all(&app_dir).map_err(io_error(&app_dir))?;
    let from_template = copy_dir_contents(&template_dir, &app_dir, |rel| {
        rel == Path::new(CONFIG_FILE)
    })?;
    let from_assets = copy_dir_contents(&layout.assets_dir(), &app_dir, |_| false)?;
    let from_overrides = copy_dir_contents(&layout.overrides_dir(), &app_dir, |_| false)?;
    debug!(
        "copied {from_template} template, {from_assets} asset and {from_overrides} override files"
    );

    let template = fs::read_to_string(&template_config).map_err(io_error(&template_config))?;
    let config_path = app_dir.join(CONFIG_FILE);
    fs::write(&config_path, values.render(&template)).map_err(io_error(&config_path))?;
    Ok(app_dir)
}
