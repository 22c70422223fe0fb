//! Template environment over several root directories

use crate::filters::{tex_safe, TEX_SAFE_FILTER};
use crate::{Result, TemplateError};
use minijinja::{Environment, ErrorKind};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Jinja environment resolving template names against an ordered list of
/// root directories; the first root containing the name wins
pub struct TemplateEnv {
    env: Environment<'static>,
    roots: Vec<PathBuf>,
}

impl TemplateEnv {
    /// Create an environment searching `roots` in the given order
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let roots: Vec<PathBuf> = roots.into_iter().map(Into::into).collect();

        let mut env = Environment::new();
        let search = roots.clone();
        env.set_loader(move |name| load_first(&search, name));
        env.add_filter(TEX_SAFE_FILTER, tex_safe);

        Self { env, roots }
    }

    /// Template roots in search order
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Render the template `name` with the given variables
    ///
    /// # Errors
    /// [`TemplateError::NotFoundError`] if no root contains `name`
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String> {
        log::debug!("Rendering template {}", name);
        let template = self.env.get_template(name).map_err(|err| match err.kind() {
            ErrorKind::TemplateNotFound => TemplateError::NotFoundError(name.to_string()),
            _ => err.into(),
        })?;
        Ok(template.render(ctx)?)
    }

    /// Render an inline template string with the given variables
    ///
    /// The string can `include` or `extends` templates from the roots.
    pub fn render_str<S: Serialize>(&self, source: &str, ctx: S) -> Result<String> {
        Ok(self.env.render_str(source, ctx)?)
    }

    /// Relative names of all files below all roots, sorted, `/` separated
    pub fn list_templates(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for root in &self.roots {
            let files = WalkDir::new(root)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file());
            for entry in files {
                if let Ok(relative) = entry.path().strip_prefix(root) {
                    names.insert(template_name(relative));
                }
            }
        }
        names.into_iter().collect()
    }
}

/// Read `name` from the first root that has it
fn load_first(roots: &[PathBuf], name: &str) -> std::result::Result<Option<String>, minijinja::Error> {
    let Some(relative) = relative_path(name) else {
        return Ok(None);
    };

    for root in roots {
        let path = root.join(&relative);
        if !path.is_file() {
            continue;
        }
        return fs::read_to_string(&path).map(Some).map_err(|err| {
            minijinja::Error::new(
                ErrorKind::InvalidOperation,
                format!("could not read template {}", path.display()),
            )
            .with_source(err)
        });
    }

    Ok(None)
}

/// Turn a template name into a path below a root; `None` if it would escape
fn relative_path(name: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            segment => path.push(segment),
        }
    }
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

fn template_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
