//! Per-request template view

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tera::Context as TeraContext;

use crate::theme::ThemeEngine;

/// Variables assigned by one widget action, rendered with the shared theme
pub struct WidgetView {
    theme: Arc<ThemeEngine>,
    context: TeraContext,
}

impl WidgetView {
    pub fn new(theme: Arc<ThemeEngine>) -> Self {
        Self {
            theme,
            context: TeraContext::new(),
        }
    }

    pub fn assign<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.context.insert(key, value);
    }

    pub fn render(&self, template: &str) -> Result<String> {
        self.theme.render(template, &self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_and_render() {
        let theme = Arc::new(ThemeEngine::with_defaults().unwrap());
        let mut view = WidgetView::new(theme);

        view.assign("categories", &Vec::<String>::new());
        view.assign("current_category", &0);

        let html = view.render("widgets/categories.html").unwrap();
        assert!(html.contains("No categories yet."));
    }
}
