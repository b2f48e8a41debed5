//! Script execution against a fresh PDF canvas
//!
//! Rendering resolves all names through an explicit environment built from
//! the invocation: scope entries first, overlaid by locals. There is no
//! late-bound reflection; a scope object is serialized to a JSON object up
//! front and read like a map.

use crate::diagnostics::{Location, SourceMap};
use crate::parser::{Argument, Expr, Script, Segment, StatementKind, StringTemplate};
use crate::{Result, TemplateError};
use pdf_canvas::PdfCanvas;
use serde::Serialize;
use serde_json::{Map, Value};

/// Name the drawing context is bound to inside scripts
const CANVAS_BINDING: &str = "pdf";

/// Parameters for a single render call
///
/// Transient: built per call, consumed by
/// [`Template::render_with`](crate::Template::render_with).
///
/// ```ignore
/// let invocation = Invocation::new()
///     .scope(&customer)?
///     .local("name", "Joe")
///     .block(|| "yielded".to_string());
/// ```
#[derive(Default)]
pub struct Invocation<'a> {
    scope: Map<String, Value>,
    locals: Map<String, Value>,
    block: Option<Box<dyn Fn() -> String + 'a>>,
}

impl std::fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("scope", &self.scope)
            .field("locals", &self.locals)
            .field("block", &self.block.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl<'a> Invocation<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the script against `scope`'s fields
    ///
    /// The scope must serialize to a JSON object; its entries are visible to
    /// `@name` lookups and, unless shadowed by a local, to bare names.
    pub fn scope<S: Serialize>(mut self, scope: &S) -> Result<Self> {
        match serde_json::to_value(scope)? {
            Value::Object(map) => {
                self.scope = map;
                Ok(self)
            }
            other => Err(TemplateError::InvalidScope(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    /// Bind a named local value, visible to bare names in the script
    pub fn local(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.locals.insert(name.into(), value.into());
        self
    }

    /// Supply the block invoked by `yield`
    pub fn block(mut self, block: impl Fn() -> String + 'a) -> Self {
        self.block = Some(Box::new(block));
        self
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.locals.get(name).or_else(|| self.scope.get(name))
    }

    fn lookup_scope(&self, name: &str) -> Option<&Value> {
        self.scope.get(name)
    }
}

/// Execute a compiled script and serialize the resulting document
///
/// A fresh canvas is created for every call, so successive renders of the
/// same script are fully independent.
pub(crate) fn execute(
    script: &Script,
    map: &SourceMap,
    invocation: &Invocation<'_>,
) -> Result<Vec<u8>> {
    let mut canvas = PdfCanvas::new();

    for stmt in &script.statements {
        let location = map.locate(stmt.line);
        match &stmt.kind {
            StatementKind::Fail(message) => {
                return Err(TemplateError::Failed {
                    message: eval_string(message, invocation, &location)?,
                    location,
                });
            }
            StatementKind::Call {
                receiver,
                method,
                args,
            } => {
                if receiver != CANVAS_BINDING {
                    return Err(TemplateError::UndefinedName {
                        location,
                        name: receiver.clone(),
                    });
                }
                dispatch(&mut canvas, method, args, invocation, location)?;
            }
        }
    }

    Ok(canvas.to_bytes()?)
}

/// Apply one canvas call
fn dispatch(
    canvas: &mut PdfCanvas,
    method: &str,
    args: &[Argument],
    invocation: &Invocation<'_>,
    location: Location,
) -> Result<()> {
    match method {
        "text" => {
            let text = string_arg(method, args, invocation, &location)?;
            canvas.text(&text);
        }
        "move_down" => {
            canvas.move_down(number_arg(method, args, invocation, &location)?);
        }
        "move_up" => {
            canvas.move_up(number_arg(method, args, invocation, &location)?);
        }
        "font_size" => {
            canvas.set_font_size(number_arg(method, args, invocation, &location)?)?;
        }
        "start_new_page" => {
            if !args.is_empty() {
                return Err(bad_arguments(method, "no arguments", location));
            }
            canvas.start_new_page();
        }
        other => {
            return Err(TemplateError::UnknownMethod {
                location,
                name: other.to_string(),
            });
        }
    }
    Ok(())
}

fn string_arg(
    method: &str,
    args: &[Argument],
    invocation: &Invocation<'_>,
    location: &Location,
) -> Result<String> {
    let [arg] = args else {
        return Err(bad_arguments(method, "one argument", location.clone()));
    };
    match arg {
        Argument::Str(tpl) => eval_string(tpl, invocation, location),
        Argument::Expr(expr) => Ok(value_to_string(&eval_expr(expr, invocation, location)?)),
        Argument::Number(n) => Ok(format_number(*n)),
    }
}

fn number_arg(
    method: &str,
    args: &[Argument],
    invocation: &Invocation<'_>,
    location: &Location,
) -> Result<f64> {
    let [arg] = args else {
        return Err(bad_arguments(method, "one numeric argument", location.clone()));
    };
    match arg {
        Argument::Number(n) => Ok(*n),
        Argument::Expr(expr) => {
            let value = eval_expr(expr, invocation, location)?;
            value.as_f64().ok_or_else(|| {
                bad_arguments(method, "a numeric argument", location.clone())
            })
        }
        Argument::Str(_) => Err(bad_arguments(method, "a numeric argument", location.clone())),
    }
}

fn bad_arguments(method: &str, expected: &str, location: Location) -> TemplateError {
    TemplateError::BadArguments {
        location,
        message: format!("`{method}` expects {expected}"),
    }
}

/// Evaluate a string template, resolving interpolations
fn eval_string(
    tpl: &StringTemplate,
    invocation: &Invocation<'_>,
    location: &Location,
) -> Result<String> {
    let mut out = String::new();
    for segment in &tpl.segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Interpolation(expr) => {
                out.push_str(&value_to_string(&eval_expr(expr, invocation, location)?));
            }
        }
    }
    Ok(out)
}

/// Resolve an expression against the invocation's environment
fn eval_expr(expr: &Expr, invocation: &Invocation<'_>, location: &Location) -> Result<Value> {
    match expr {
        Expr::Name(name) => invocation.lookup(name).cloned().ok_or_else(|| {
            TemplateError::UndefinedName {
                location: location.clone(),
                name: name.clone(),
            }
        }),
        Expr::ScopeAttr(name) => invocation.lookup_scope(name).cloned().ok_or_else(|| {
            TemplateError::UndefinedName {
                location: location.clone(),
                name: format!("@{name}"),
            }
        }),
        Expr::Yield => match &invocation.block {
            Some(block) => Ok(Value::String(block())),
            None => Err(TemplateError::MissingBlock {
                location: location.clone(),
            }),
        },
    }
}

/// Convert a JSON value to its interpolated string form
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Render a numeric argument the way it would interpolate
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_script;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run(source: &str, invocation: &Invocation<'_>) -> Result<Vec<u8>> {
        let map = SourceMap::new("(template)", 1);
        let script = parse_script(source, &map)?;
        execute(&script, &map, invocation)
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("hello")), "hello");
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&json!(null)), "");
    }

    #[test]
    fn test_locals_shadow_scope() {
        let invocation = Invocation::new()
            .scope(&json!({ "name": "Scope" }))
            .unwrap()
            .local("name", "Local");
        assert_eq!(invocation.lookup("name"), Some(&json!("Local")));
        assert_eq!(invocation.lookup_scope("name"), Some(&json!("Scope")));
    }

    #[test]
    fn test_scope_must_be_object() {
        let err = Invocation::new().scope(&json!(42)).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidScope(_)));
    }

    #[test]
    fn test_execute_empty_script() {
        let bytes = run("", &Invocation::new()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_unknown_receiver_is_name_error() {
        let err = run("canvas.text('x')", &Invocation::new()).unwrap_err();
        let TemplateError::UndefinedName { name, .. } = err else {
            panic!("expected undefined name");
        };
        assert_eq!(name, "canvas");
    }

    #[test]
    fn test_unknown_method() {
        let err = run("pdf.texxt('x')", &Invocation::new()).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::UnknownMethod { ref name, .. } if name == "texxt"
        ));
        assert!(err.is_name_error());
    }

    #[test]
    fn test_text_wrong_arity() {
        let err = run("pdf.text('a', 'b')", &Invocation::new()).unwrap_err();
        assert!(matches!(err, TemplateError::BadArguments { .. }));
    }

    #[test]
    fn test_move_down_rejects_string() {
        let err = run("pdf.move_down('a lot')", &Invocation::new()).unwrap_err();
        assert!(matches!(err, TemplateError::BadArguments { .. }));
    }

    #[test]
    fn test_move_down_accepts_local_number() {
        let invocation = Invocation::new().local("gap", 24);
        run("pdf.move_down(gap)", &invocation).unwrap();
    }

    #[test]
    fn test_fail_message_interpolates() {
        let invocation = Invocation::new().local("id", 7);
        let err = run(r#"fail "bad record #{id}""#, &invocation).unwrap_err();
        let TemplateError::Failed { message, .. } = err else {
            panic!("expected runtime failure");
        };
        assert_eq!(message, "bad record 7");
    }

    #[test]
    fn test_yield_without_block() {
        let err = run(r#"pdf.text("Hey #{yield}!")"#, &Invocation::new()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingBlock { .. }));
        assert!(!err.is_name_error());
    }

    #[test]
    fn test_statements_after_fail_do_not_run() {
        let err = run("fail \"stop\"\npdf.text('unreached')", &Invocation::new()).unwrap_err();
        let TemplateError::Failed { location, .. } = err else {
            panic!("expected runtime failure");
        };
        assert_eq!(location.line, 1);
    }
}
