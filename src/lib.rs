//! gabarit - a C ABI for driving a Jinja-style template engine
//!
//! Lets a foreign runtime (anything that can call C) parse templates, build
//! dynamically-typed context values, and render, without linking against the
//! engine's object model. The template grammar, evaluation semantics, and
//! JSON parsing are delegated to `minijinja` and `serde_json`; this crate
//! owns the boundary: handle lifecycles, the error-code protocol, and output
//! conventions.
//!
//! # Surface
//!
//! ```text
//! gb_parse / gb_template_free         - parse once, render many times
//! gb_render_json / gb_render_ctx      - render with raw JSON or a context
//! gb_value_* / gb_array_push /
//!   gb_object_set / gb_value_free     - build value trees behind handles
//! gb_context_make / gb_context_free   - wrap a root value for rendering
//! gb_get_last_error / gb_str_free     - diagnostics and string ownership
//! ```
//!
//! Every creating or mutating call returns a numeric code (0 = success); on
//! failure a diagnostic is retrievable once, per thread, through
//! `gb_get_last_error`. Handles are single-owner: one creation call, one
//! matching free call. Inserting a value into a compound stores a copy, so
//! parent and child handles never alias. Rendered output always spells
//! booleans `true`/`false`, whatever the engine's native casing.
//!
//! The same functionality is exposed as a safe Rust API:
//!
//! ```
//! use gabarit::{Context, Template, Value};
//!
//! let template = Template::parse("Hello, {{ name }}!")?;
//! let mut root = Value::object();
//! root.insert("name", Value::from("World"))?;
//! let ctx = Context::new(&root);
//! assert_eq!(template.render(&ctx)?, "Hello, World!");
//! # Ok::<(), gabarit::Error>(())
//! ```

pub mod capi;
mod context;
mod error;
mod template;
mod value;

pub use context::Context;
pub use error::{Error, ErrorCode};
pub use template::Template;
pub use value::Value;
