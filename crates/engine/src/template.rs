// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Templates
//!
//! Tooltip text and link-action queries are rendered from Jinja templates
//! through the [`TemplateService`] seam. [`JinjaTemplates`] is the built-in
//! implementation on top of MiniJinja.
//!
//! Missing keys render as nothing, including attribute chains on them
//! (`{{ table.schema }}` with no `table`). Block tags swallow the newline
//! that follows them, so templates can put `{% for %}` on its own line.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use tsql_insight_engine::{JinjaTemplates, TemplateService};
//!
//! let text = JinjaTemplates::new().render(
//!     "example",
//!     "{{ name }}: {% for c in columns %}{{ c }} {% endfor %}",
//!     &json!({"name": "Orders", "columns": ["Id", "Total"]}),
//! );
//! assert_eq!(text, "Orders: Id Total ");
//! ```

use std::collections::BTreeMap;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde_json::Value;
use tracing::{trace, warn};
use tsql_insight_ir::ObjectKind;

use crate::config::object_kind;

/// Nesting limit for template rendering
const RECURSION_LIMIT: usize = 100;

/// Renders a named template against a JSON model
pub trait TemplateService: Send + Sync {
    /// Render `template`; `name` identifies it in logs and errors
    fn render(&self, name: &str, template: &str, model: &Value) -> String;
}

/// Environment shared by rendering and template checks
fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Chainable);
    env.set_recursion_limit(RECURSION_LIMIT);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    // Output is markdown or SQL, never HTML
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env
}

/// Built-in MiniJinja renderer
#[derive(Debug, Clone)]
pub struct JinjaTemplates {
    env: Environment<'static>,
}

impl JinjaTemplates {
    pub fn new() -> Self {
        Self {
            env: environment(),
        }
    }

    /// Compile a template without rendering it
    ///
    /// # Errors
    ///
    /// Returns the MiniJinja syntax error for a malformed template.
    pub fn check(name: &str, source: &str) -> Result<(), minijinja::Error> {
        let env = environment();
        env.template_from_named_str(name, source)?;
        Ok(())
    }

    /// Render, reporting template errors
    pub fn try_render(&self, name: &str, template: &str, model: &Value) -> Result<String, minijinja::Error> {
        self.env.render_named_str(name, template, model)
    }
}

impl Default for JinjaTemplates {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateService for JinjaTemplates {
    /// Render a template; a template error renders as an empty string
    fn render(&self, name: &str, template: &str, model: &Value) -> String {
        trace!(template = name, "Rendering template");
        match self.try_render(name, template, model) {
            Ok(text) => text,
            Err(err) => {
                warn!(template = name, error = %err, "Template failed to render");
                String::new()
            }
        }
    }
}

/// Default tooltip template for tables and views
pub const TABLE_TOOLTIP: &str = "\
**{{ kind }}** `{{ database }}.{{ schema }}.{{ name }}`
{% if comment %}

{{ comment }}
{% endif %}

| Column | Type | Nullable |
|---|---|---|
{% for column in columns %}
| {{ column.name }}{{ \" (PK)\" if column.primary_key }} | {{ column.data_type }} | {{ \"yes\" if column.nullable else \"no\" }} |
{% endfor %}
{% if indices %}

**Indices**
{% for index in indices %}
- {{ index.name }} ({{ index.columns }}){{ \" unique\" if index.unique }}{{ \" clustered\" if index.clustered }}
{% endfor %}
{% endif %}
{% if foreign_keys %}

**Foreign keys**
{% for fk in foreign_keys %}
- {{ fk.name }}: ({{ fk.columns }}) -> {{ fk.referenced_table }} ({{ fk.referenced_columns }})
{% endfor %}
{% endif %}
{% if constraints %}

**Constraints**
{% for constraint in constraints %}
- {{ constraint.name }} {{ constraint.constraint_type }}{{ \" \" ~ constraint.definition if constraint.definition }}
{% endfor %}
{% endif %}
";

/// Default tooltip template for procedures and functions
pub const ROUTINE_TOOLTIP: &str = "\
**{{ kind }}** `{{ signature }}`
{% if comment %}

{{ comment }}
{% endif %}
{% if result_columns %}

| Column | Type |
|---|---|
{% for column in result_columns %}
| {{ column.name }} | {{ column.data_type }} |
{% endfor %}
{% endif %}
";

/// Tooltip templates per object kind, defaults merged with overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipTemplates {
    templates: BTreeMap<&'static str, String>,
}

impl Default for TooltipTemplates {
    fn default() -> Self {
        let mut templates = BTreeMap::new();
        templates.insert(ObjectKind::Table.as_str(), TABLE_TOOLTIP.to_string());
        templates.insert(ObjectKind::View.as_str(), TABLE_TOOLTIP.to_string());
        templates.insert(ObjectKind::Procedure.as_str(), ROUTINE_TOOLTIP.to_string());
        templates.insert(ObjectKind::Function.as_str(), ROUTINE_TOOLTIP.to_string());
        Self { templates }
    }
}

impl TooltipTemplates {
    /// Defaults with configured overrides applied
    ///
    /// Keys that do not name an object kind are ignored; configuration
    /// validation rejects them earlier.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut templates = Self::default();
        for (key, template) in overrides {
            if let Some(kind) = object_kind(key) {
                templates.set(kind, template.clone());
            }
        }
        templates
    }

    pub fn set(&mut self, kind: ObjectKind, template: impl Into<String>) {
        self.templates.insert(kind.as_str(), template.into());
    }

    pub fn template_for(&self, kind: ObjectKind) -> &str {
        self.templates
            .get(kind.as_str())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(template: &str, model: Value) -> String {
        JinjaTemplates::new().render("test", template, &model)
    }

    #[test]
    fn test_variables_and_paths() {
        let model = json!({"name": "Orders", "table": {"schema": "dbo"}, "rows": 12, "view": false});
        assert_eq!(
            render("{{ table.schema }}.{{name}} ({{ rows }}, {{ view }})", model),
            "dbo.Orders (12, false)"
        );
    }

    #[test]
    fn test_unknown_keys_render_empty() {
        assert_eq!(
            render("[{{ missing }}][{{ name.deeper }}][{{ a.b.c }}]", json!({"name": "x"})),
            "[][][]"
        );
    }

    #[test]
    fn test_loops_see_outer_context() {
        let model = json!({
            "table": "Orders",
            "columns": [{"name": "Id"}, {"name": "Total"}]
        });
        assert_eq!(
            render("{% for c in columns %}{{ table }}.{{ c.name }};{% endfor %}", model),
            "Orders.Id;Orders.Total;"
        );
    }

    #[test]
    fn test_block_tags_swallow_their_newline() {
        let template = "a\n{% if flag %}\nyes\n{% endif %}\nb";
        assert_eq!(render(template, json!({"flag": true})), "a\nyes\nb");
        assert_eq!(render(template, json!({"flag": false})), "a\nb");
    }

    #[test]
    fn test_no_html_escaping() {
        assert_eq!(
            render("{{ q }}", json!({"q": "a <> 'b' & [c]"})),
            "a <> 'b' & [c]"
        );
    }

    #[test]
    fn test_malformed_templates_are_rejected() {
        assert!(JinjaTemplates::check("ok", "{% if a %}x{% endif %}{{ b.c }}").is_ok());
        // Unclosed block, orphan end tag, unterminated expression
        assert!(JinjaTemplates::check("t", "{% if a %}x").is_err());
        assert!(JinjaTemplates::check("t", "{% endfor %}").is_err());
        assert!(JinjaTemplates::check("t", "{{ b.c").is_err());

        let err = JinjaTemplates::new()
            .try_render("broken", "{% for x in %}", &json!({}))
            .unwrap_err();
        assert!(err.to_string().contains("syntax error"), "{}", err);
    }

    #[test]
    fn test_render_errors_render_empty() {
        assert_eq!(render("{{ nope( }}", json!({})), "");
    }

    #[test]
    fn test_default_templates_compile() {
        assert!(JinjaTemplates::check("table", TABLE_TOOLTIP).is_ok());
        assert!(JinjaTemplates::check("routine", ROUTINE_TOOLTIP).is_ok());
    }

    #[test]
    fn test_routine_template_without_result_columns() {
        let text = render(
            ROUTINE_TOOLTIP,
            json!({"kind": "procedure", "signature": "dbo.P()", "comment": null, "result_columns": []}),
        );
        assert_eq!(text, "**procedure** `dbo.P()`\n");
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let mut overrides = BTreeMap::new();
        overrides.insert("VIEW".to_string(), "view {{ name }}".to_string());
        overrides.insert("trigger".to_string(), "ignored".to_string());
        let templates = TooltipTemplates::with_overrides(&overrides);
        assert_eq!(templates.template_for(ObjectKind::View), "view {{ name }}");
        assert_eq!(templates.template_for(ObjectKind::Table), TABLE_TOOLTIP);
    }
}
