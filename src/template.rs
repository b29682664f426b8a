//! Template parsing and rendering.
//!
//! Parse once, render many times: a [`Template`] owns its compiled form and
//! is never consumed or mutated by rendering, so one handle can serve
//! concurrent read-only renders against independent contexts.

use minijinja::Environment;
use tracing::debug;

use crate::context::Context;
use crate::error::Error;

/// Name the single template is registered under in its environment. It never
/// surfaces to callers; there is no template-by-name lookup at this layer.
const TEMPLATE_NAME: &str = "template";

/// A parsed template.
#[derive(Debug)]
pub struct Template {
    env: Environment<'static>,
}

impl Template {
    /// Parse template source into a reusable compiled template.
    ///
    /// Keeps the engine's default lenient undefined handling: printing an
    /// undefined variable renders as empty output, while attribute access on
    /// one is a render-time error.
    pub fn parse(source: &str) -> Result<Self, Error> {
        let mut env = Environment::new();
        env.add_template_owned(TEMPLATE_NAME.to_string(), source.to_string())
            .map_err(Error::TemplateParse)?;
        debug!(bytes = source.len(), "parsed template");
        Ok(Self { env })
    }

    /// Render against a prebuilt context. The context stays valid and
    /// reusable afterwards, also on failure.
    pub fn render(&self, ctx: &Context) -> Result<String, Error> {
        self.render_root(ctx.root())
    }

    /// Parse `json` and render against the resulting value tree.
    pub fn render_json(&self, json: &str) -> Result<String, Error> {
        let data: serde_json::Value = serde_json::from_str(json)?;
        let ctx = Context::from_json(&data);
        self.render_root(ctx.root())
    }

    fn render_root(&self, root: &minijinja::value::Value) -> Result<String, Error> {
        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(Error::TemplateRender)?;
        let output = template.render(root).map_err(Error::TemplateRender)?;
        debug!(bytes = output.len(), "rendered template");
        Ok(canonicalize_booleans(&output))
    }
}

/// Rewrite Python-style boolean literals to JSON casing.
///
/// The boundary promises callers `true`/`false` in rendered output no matter
/// how the engine spells booleans. This is a plain substring rewrite: user
/// text containing these words is rewritten too, a known imprecision kept
/// for compatibility with existing callers.
fn canonicalize_booleans(input: &str) -> String {
    input.replace("True", "true").replace("False", "false")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn parse_accepts_well_formed_source() {
        assert!(Template::parse("Hello, {{ name }}!").is_ok());
        assert!(Template::parse("").is_ok());
        assert!(Template::parse("{% for x in xs %}{{ x }}{% endfor %}").is_ok());
    }

    #[test]
    fn parse_reports_syntax_errors() {
        for source in ["{% if %}", "Hello, {{ name", "{% for item in items %}{{ item }}"] {
            let err = Template::parse(source).unwrap_err();
            assert!(matches!(err, Error::TemplateParse(_)), "source: {source}");
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn renders_with_context_and_json_identically() {
        let template = Template::parse("{{ a }} and {{ b }}").unwrap();

        let mut root = Value::object();
        root.insert("a", Value::Bool(true)).unwrap();
        root.insert("b", Value::Bool(false)).unwrap();
        let from_ctx = template.render(&Context::new(&root)).unwrap();

        let from_json = template.render_json(r#"{"a": true, "b": false}"#).unwrap();

        assert_eq!(from_ctx, "true and false");
        assert_eq!(from_ctx, from_json);
    }

    #[test]
    fn render_json_rejects_malformed_json() {
        let template = Template::parse("Hello, {{ name }}!").unwrap();
        let err = template.render_json("{ invalid json }").unwrap_err();
        assert!(matches!(err, Error::JsonParse(_)));
    }

    #[test]
    fn render_failure_leaves_template_reusable() {
        let template = Template::parse("{{ missing.attr }}").unwrap();
        let err = template.render_json("{}").unwrap_err();
        assert!(matches!(err, Error::TemplateRender(_)));

        // Same handle, now with the variable defined.
        let output = template
            .render_json(r#"{"missing": {"attr": "found"}}"#)
            .unwrap();
        assert_eq!(output, "found");
    }

    #[test]
    fn canonicalizes_boolean_tokens() {
        assert_eq!(canonicalize_booleans("True and False"), "true and false");
        assert_eq!(canonicalize_booleans("true and false"), "true and false");
        // Substring semantics, deliberately: embedded words are rewritten.
        assert_eq!(canonicalize_booleans("TrueNorth"), "trueNorth");
        assert_eq!(canonicalize_booleans("Falsehood"), "falsehood");
        assert_eq!(canonicalize_booleans("no booleans here"), "no booleans here");
    }

    #[test]
    fn user_text_is_canonicalized_too() {
        let template = Template::parse("{{ word }}").unwrap();
        let output = template.render_json(r#"{"word": "True"}"#).unwrap();
        assert_eq!(output, "true");
    }
}
