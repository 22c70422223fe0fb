//! Template to PDF in one call

use crate::Result;
use serde::Serialize;
use std::path::Path;
use template::TemplateEnv;
use typeset::{Compiled, Compiler};

/// A template environment paired with a compiler
///
/// Build one per set of template roots and reuse it; it holds no per-call
/// state.
pub struct Pipeline {
    templates: TemplateEnv,
    compiler: Compiler,
}

impl Pipeline {
    pub fn new(templates: TemplateEnv, compiler: Compiler) -> Self {
        Self {
            templates,
            compiler,
        }
    }

    pub fn templates(&self) -> &TemplateEnv {
        &self.templates
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Render the template `name` with `ctx` and typeset the result
    ///
    /// `auxiliaries` are linked next to the source by base name, so the
    /// template can refer to them without a directory.
    pub fn render_pdf<S, P>(&self, name: &str, ctx: S, auxiliaries: &[P]) -> Result<Compiled>
    where
        S: Serialize,
        P: AsRef<Path>,
    {
        let source = self.templates.render(name, ctx)?;
        log::debug!("Rendered {} into {} bytes of source", name, source.len());
        Ok(self.compiler.compile(&source, auxiliaries)?)
    }

    /// Same as [`Pipeline::render_pdf`] for an inline template string
    pub fn render_pdf_str<S, P>(&self, text: &str, ctx: S, auxiliaries: &[P]) -> Result<Compiled>
    where
        S: Serialize,
        P: AsRef<Path>,
    {
        let source = self.templates.render_str(text, ctx)?;
        Ok(self.compiler.compile(&source, auxiliaries)?)
    }
}
