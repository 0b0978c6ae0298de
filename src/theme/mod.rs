//! Theme engine
//!
//! Renders widgets with Tera. Default widget templates are embedded in the
//! binary; the active theme can override any of them by shipping a file with
//! the same name under `themes/<active>/widgets/`.

use anyhow::{Context, Result};
use rust_embed::RustEmbed;
use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context as TeraContext, Tera};

mod error;

pub use error::ThemeError;

/// Directory (inside a theme and inside the embedded defaults) holding widget templates
pub const WIDGETS_DIR: &str = "widgets";

/// Embedded default widget templates
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "widgets/*.html"]
#[include = "widgets/*.xml"]
struct DefaultTemplates;

/// Theme engine for rendering widget templates
pub struct ThemeEngine {
    tera: Tera,
    themes_path: PathBuf,
    current_theme: String,
    /// Templates that came from the theme directory rather than the defaults
    overrides: Vec<String>,
}

impl std::fmt::Debug for ThemeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeEngine")
            .field("themes_path", &self.themes_path)
            .field("current_theme", &self.current_theme)
            .field("overrides", &self.overrides)
            .finish()
    }
}

impl ThemeEngine {
    /// Create a theme engine for the given theme
    ///
    /// A missing theme directory is not an error: the embedded defaults are
    /// used on their own.
    pub fn new(themes_path: &Path, theme_name: &str) -> Result<Self> {
        let mut engine = Self {
            tera: Tera::default(),
            themes_path: themes_path.to_path_buf(),
            current_theme: theme_name.to_string(),
            overrides: Vec::new(),
        };
        engine.load_templates()?;
        Ok(engine)
    }

    /// Engine with only the embedded default templates
    pub fn with_defaults() -> Result<Self> {
        let mut engine = Self {
            tera: Tera::default(),
            themes_path: PathBuf::new(),
            current_theme: "default".to_string(),
            overrides: Vec::new(),
        };
        engine.load_templates()?;
        Ok(engine)
    }

    fn load_templates(&mut self) -> Result<()> {
        let mut templates = default_templates()?;

        let theme_widgets = self.themes_path.join(&self.current_theme).join(WIDGETS_DIR);
        let overrides = if theme_widgets.is_dir() {
            collect_templates_from_dir(&theme_widgets)?
        } else {
            if !self.themes_path.as_os_str().is_empty() {
                tracing::debug!(
                    "Theme '{}' has no {} directory, using default widget templates",
                    self.current_theme,
                    WIDGETS_DIR
                );
            }
            Vec::new()
        };

        self.overrides = overrides.iter().map(|(name, _)| name.clone()).collect();
        for (name, content) in overrides {
            tracing::info!("Theme '{}' overrides template {}", self.current_theme, name);
            match templates.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = content,
                None => templates.push((name, content)),
            }
        }

        // Base templates first so child templates can extend them
        templates.sort_by(|a, b| is_base(&b.0).cmp(&is_base(&a.0)));

        let mut tera = Tera::default();
        for (name, content) in &templates {
            tera.add_raw_template(name, content).map_err(|e| {
                ThemeError::TemplateError(format!("Failed to add template {}: {}", name, error_chain(&e)))
            })?;
        }
        tera.build_inheritance_chains().map_err(|e| {
            ThemeError::TemplateError(format!("Failed to build template inheritance: {}", e))
        })?;

        self.tera = tera;
        Ok(())
    }

    /// Render a template with context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        if !self.has_template(template) {
            return Err(ThemeError::NotFound(template.to_string()).into());
        }
        self.tera.render(template, context).map_err(|e| {
            ThemeError::TemplateError(format!("Failed to render '{}': {}", template, error_chain(&e)))
                .into()
        })
    }

    pub fn has_template(&self, template: &str) -> bool {
        self.tera.get_template_names().any(|name| name == template)
    }

    pub fn current_theme(&self) -> &str {
        &self.current_theme
    }

    /// Names of the templates supplied by the active theme
    pub fn overrides(&self) -> &[String] {
        &self.overrides
    }
}

fn is_base(name: &str) -> bool {
    name.ends_with("/base.html") || name == "base.html"
}

fn error_chain(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

fn default_templates() -> Result<Vec<(String, String)>> {
    let mut templates = Vec::new();
    for name in DefaultTemplates::iter() {
        let file = DefaultTemplates::get(&name)
            .ok_or_else(|| ThemeError::NotFound(name.to_string()))?;
        let content = String::from_utf8(file.data.into_owned())
            .with_context(|| format!("Embedded template {} is not UTF-8", name))?;
        templates.push((name.to_string(), content));
    }
    Ok(templates)
}

/// Collect `.html` and `.xml` templates of a theme's widgets directory,
/// named `widgets/<file>` like the embedded defaults
fn collect_templates_from_dir(dir: &Path) -> Result<Vec<(String, String)>> {
    let mut templates = Vec::new();

    for entry in fs::read_dir(dir).map_err(ThemeError::from)? {
        let path = entry.map_err(ThemeError::from)?.path();
        let is_template = path
            .extension()
            .map_or(false, |ext| ext == "html" || ext == "xml");
        if !path.is_file() || !is_template {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| ThemeError::TemplateError(format!("Invalid template path: {:?}", path)))?;
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read template: {:?}", path))?;

        templates.push((format!("{}/{}", WIDGETS_DIR, file_name), content));
    }

    Ok(templates)
}

#[cfg(test)]
mod tests;
