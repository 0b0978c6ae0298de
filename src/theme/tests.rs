//! Tests for the theme engine

use super::*;
use tempfile::TempDir;

/// Helper to create a theme directory with the given widget templates
fn create_test_theme(themes_dir: &Path, theme_name: &str, files: &[(&str, &str)]) -> PathBuf {
    let widgets_path = themes_dir.join(theme_name).join(WIDGETS_DIR);
    fs::create_dir_all(&widgets_path).unwrap();
    for (name, content) in files {
        fs::write(widgets_path.join(name), content).unwrap();
    }
    widgets_path
}

#[test]
fn test_embedded_defaults_are_loaded() {
    let engine = ThemeEngine::with_defaults().unwrap();

    for template in [
        "widgets/base.html",
        "widgets/categories.html",
        "widgets/tags.html",
        "widgets/recent_posts.html",
        "widgets/comments.html",
        "widgets/archive.html",
        "widgets/feed.xml",
    ] {
        assert!(engine.has_template(template), "missing {}", template);
    }
    assert!(engine.overrides().is_empty());
}

#[test]
fn test_missing_theme_directory_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();

    let engine = ThemeEngine::new(temp_dir.path(), "nonexistent").unwrap();

    assert_eq!(engine.current_theme(), "nonexistent");
    assert!(engine.has_template("widgets/tags.html"));
    assert!(engine.overrides().is_empty());
}

#[test]
fn test_theme_overrides_default_template() {
    let temp_dir = TempDir::new().unwrap();
    create_test_theme(
        temp_dir.path(),
        "custom",
        &[("tags.html", "custom tags: {{ tags | length }}")],
    );

    let engine = ThemeEngine::new(temp_dir.path(), "custom").unwrap();

    let mut context = TeraContext::new();
    context.insert("tags", &vec![1, 2, 3]);
    let html = engine.render("widgets/tags.html", &context).unwrap();

    assert_eq!(html, "custom tags: 3");
    assert_eq!(engine.overrides(), ["widgets/tags.html"]);
}

#[test]
fn test_theme_override_can_extend_default_base() {
    let temp_dir = TempDir::new().unwrap();
    create_test_theme(
        temp_dir.path(),
        "custom",
        &[(
            "archive.html",
            r#"{% extends "widgets/base.html" %}{% block title %}Older{% endblock title %}"#,
        )],
    );

    let engine = ThemeEngine::new(temp_dir.path(), "custom").unwrap();
    let html = engine.render("widgets/archive.html", &TeraContext::new()).unwrap();

    assert!(html.contains("<h3 class=\"widget-title\">Older</h3>"));
}

#[test]
fn test_theme_can_add_new_template() {
    let temp_dir = TempDir::new().unwrap();
    create_test_theme(temp_dir.path(), "custom", &[("extra.html", "extra")]);

    let engine = ThemeEngine::new(temp_dir.path(), "custom").unwrap();

    assert_eq!(engine.render("widgets/extra.html", &TeraContext::new()).unwrap(), "extra");
}

#[test]
fn test_non_template_files_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    create_test_theme(temp_dir.path(), "custom", &[("notes.txt", "{{ broken")]);

    let engine = ThemeEngine::new(temp_dir.path(), "custom").unwrap();

    assert!(!engine.has_template("widgets/notes.txt"));
}

#[test]
fn test_invalid_override_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    create_test_theme(temp_dir.path(), "broken", &[("tags.html", "{% if %}")]);

    let result = ThemeEngine::new(temp_dir.path(), "broken");

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("widgets/tags.html"));
}

#[test]
fn test_render_unknown_template() {
    let engine = ThemeEngine::with_defaults().unwrap();

    let err = engine.render("widgets/missing.html", &TeraContext::new()).unwrap_err();

    assert!(matches!(err.downcast_ref::<ThemeError>(), Some(ThemeError::NotFound(_))));
}

#[test]
fn test_html_templates_autoescape() {
    let temp_dir = TempDir::new().unwrap();
    create_test_theme(temp_dir.path(), "custom", &[("echo.html", "{{ value }}")]);
    let engine = ThemeEngine::new(temp_dir.path(), "custom").unwrap();

    let mut context = TeraContext::new();
    context.insert("value", "<b>");

    assert_eq!(engine.render("widgets/echo.html", &context).unwrap(), "&lt;b&gt;");
}
