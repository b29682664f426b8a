//! Rendering contexts: an evaluation environment wrapping one root value.

use tracing::trace;

use crate::value::Value;

/// The variable namespace a template is rendered against.
///
/// Construction deep-copies the root into the engine's value type, so later
/// mutation of the source [`Value`] never shows up in renders against an
/// already-built context. One context can serve any number of renders.
#[derive(Debug, Clone)]
pub struct Context {
    root: minijinja::value::Value,
}

impl Context {
    /// Wrap `root` as a render context.
    pub fn new(root: &Value) -> Self {
        trace!(root = root.type_name(), "built render context");
        Self {
            root: minijinja::value::Value::from_serialize(root),
        }
    }

    /// Internal path for JSON-supplied contexts; never crosses the boundary
    /// as a handle.
    pub(crate) fn from_json(data: &serde_json::Value) -> Self {
        Self {
            root: minijinja::value::Value::from_serialize(data),
        }
    }

    pub(crate) fn root(&self) -> &minijinja::value::Value {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_copies_the_root() {
        let mut root = Value::object();
        root.insert("n", Value::Int(1)).unwrap();
        let ctx = Context::new(&root);
        root.insert("n", Value::Int(2)).unwrap();
        assert_eq!(
            ctx.root().get_attr("n").unwrap(),
            minijinja::value::Value::from(1)
        );
    }

    #[test]
    fn non_object_roots_are_accepted() {
        // The engine treats a non-dict root as an empty namespace rather than
        // rejecting it; wrapping must not fail.
        let ctx = Context::new(&Value::Int(42));
        assert_eq!(ctx.root(), &minijinja::value::Value::from(42));
    }
}
