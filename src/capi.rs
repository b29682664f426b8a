//! The `extern "C"` boundary.
//!
//! Contracts shared by every entry point:
//!
//! - Every creating or mutating operation returns a result code
//!   ([`ErrorCode`] as `c_int`) and, on failure, parks a diagnostic in the
//!   calling thread's error slot for [`gb_get_last_error`].
//! - An operation with an out parameter first validates it (null out pointer
//!   is itself invalid-argument, reported without clearing the slot), nulls
//!   it, then clears the slot so no stale diagnostic from an earlier call can
//!   leak into this one.
//! - Handles are boxed crate objects; each kind has exactly one free
//!   function. Freeing null is a no-op. Double-free and use-after-free are
//!   the caller's contract, not detected here.
//! - Nothing unwinds across the ABI: every body runs under `catch_unwind`
//!   and a contained panic reports [`ErrorCode::Generic`].
//! - All inbound text must be NUL-terminated UTF-8; all outbound strings are
//!   NUL-terminated, owned by the caller, and released with [`gb_str_free`].

use std::ffi::{CStr, CString, c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use crate::context::Context;
use crate::error::{Error, ErrorCode, clear_last_error, set_last_error, take_last_error};
use crate::template::Template;
use crate::value::Value;

const INVALID_ARGUMENT: c_int = ErrorCode::InvalidArgument as c_int;

/// Flatten a failure into the error slot and its numeric code.
fn report(operation: &str, err: &Error) -> c_int {
    set_last_error(format!("{operation}: {err}"));
    err.code() as c_int
}

/// Run `body`, converting reported failures and contained panics into codes.
fn guarded(operation: &str, body: impl FnOnce() -> Result<(), Error>) -> c_int {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => ErrorCode::Ok as c_int,
        Ok(Err(err)) => report(operation, &err),
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_owned()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_owned()
            };
            report(operation, &Error::Generic(message))
        }
    }
}

/// Validate and prime an out parameter.
///
/// Nulls the slot the caller handed us, so a failing call can never leave a
/// stale or garbage handle behind.
unsafe fn out_param<'a, T>(out: *mut *mut T, operation: &str) -> Option<&'a mut *mut T> {
    if out.is_null() {
        set_last_error(format!("{operation}: output parameter is null"));
        return None;
    }
    let out = unsafe { &mut *out };
    *out = ptr::null_mut();
    Some(out)
}

unsafe fn required_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, Error> {
    if ptr.is_null() {
        return Err(Error::InvalidArgument(format!("{what} is null")));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| Error::InvalidArgument(format!("{what} is not valid UTF-8")))
}

unsafe fn required_ref<'a, T>(ptr: *const T, what: &str) -> Result<&'a T, Error> {
    if ptr.is_null() {
        return Err(Error::InvalidArgument(format!("{what} is null")));
    }
    Ok(unsafe { &*ptr })
}

unsafe fn required_mut<'a, T>(ptr: *mut T, what: &str) -> Result<&'a mut T, Error> {
    if ptr.is_null() {
        return Err(Error::InvalidArgument(format!("{what} is null")));
    }
    Ok(unsafe { &mut *ptr })
}

/// Hand a string across the boundary. The caller owns the result and must
/// release it with [`gb_str_free`].
fn export_string(text: &str) -> Result<*mut c_char, Error> {
    Ok(CString::new(text)?.into_raw())
}

// --- Error retrieval ---

/// Retrieve and clear the calling thread's pending diagnostic.
///
/// Returns null when no message is pending; a second consecutive call always
/// returns null. The returned string must be released with [`gb_str_free`].
/// The slot is cleared before the outbound copy is made, so even a failed
/// copy leaves the next call with a clean slate.
#[unsafe(no_mangle)]
pub extern "C" fn gb_get_last_error() -> *mut c_char {
    let Some(message) = take_last_error() else {
        return ptr::null_mut();
    };
    match CString::new(message) {
        Ok(s) => s.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// --- Templates ---

/// Parse template source into a template handle.
///
/// On success returns [`ErrorCode::Ok`] and stores a non-null handle in
/// `out_template`; on failure returns an error code and stores null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_parse(source: *const c_char, out_template: *mut *mut Template) -> c_int {
    let Some(out) = (unsafe { out_param(out_template, "gb_parse") }) else {
        return INVALID_ARGUMENT;
    };
    clear_last_error();
    guarded("gb_parse", || {
        let source = unsafe { required_str(source, "template source") }?;
        *out = Box::into_raw(Box::new(Template::parse(source)?));
        Ok(())
    })
}

/// Release a template handle. Null is a no-op. Rendering never consumes the
/// template, so it is released exactly once, by its owner.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_template_free(template: *mut Template) {
    if template.is_null() {
        return;
    }
    let _ = panic::catch_unwind(AssertUnwindSafe(|| drop(unsafe { Box::from_raw(template) })));
}

// --- Rendering ---

/// Render a template against a JSON context string.
///
/// The JSON is parsed and wrapped as a context internally; no context handle
/// is created. The rendered string in `out_string` must be released with
/// [`gb_str_free`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_render_json(
    template: *const Template,
    json: *const c_char,
    out_string: *mut *mut c_char,
) -> c_int {
    let Some(out) = (unsafe { out_param(out_string, "gb_render_json") }) else {
        return INVALID_ARGUMENT;
    };
    clear_last_error();
    guarded("gb_render_json", || {
        let template = unsafe { required_ref(template, "template handle") }?;
        let json = unsafe { required_str(json, "context JSON") }?;
        *out = export_string(&template.render_json(json)?)?;
        Ok(())
    })
}

/// Render a template against a prebuilt context handle.
///
/// Both handles stay valid and reusable afterwards, also on failure. The
/// rendered string in `out_string` must be released with [`gb_str_free`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_render_ctx(
    template: *const Template,
    context: *const Context,
    out_string: *mut *mut c_char,
) -> c_int {
    let Some(out) = (unsafe { out_param(out_string, "gb_render_ctx") }) else {
        return INVALID_ARGUMENT;
    };
    clear_last_error();
    guarded("gb_render_ctx", || {
        let template = unsafe { required_ref(template, "template handle") }?;
        let context = unsafe { required_ref(context, "context handle") }?;
        *out = export_string(&template.render(context)?)?;
        Ok(())
    })
}

// --- Values ---

unsafe fn make_value(
    operation: &str,
    out_value: *mut *mut Value,
    build: impl FnOnce() -> Value,
) -> c_int {
    let Some(out) = (unsafe { out_param(out_value, operation) }) else {
        return INVALID_ARGUMENT;
    };
    clear_last_error();
    guarded(operation, || {
        *out = Box::into_raw(Box::new(build()));
        Ok(())
    })
}

/// Create a null value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_value_null(out_value: *mut *mut Value) -> c_int {
    unsafe { make_value("gb_value_null", out_value, || Value::Null) }
}

/// Create a boolean value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_value_bool(value: bool, out_value: *mut *mut Value) -> c_int {
    unsafe { make_value("gb_value_bool", out_value, || Value::Bool(value)) }
}

/// Create a 64-bit integer value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_value_int(value: i64, out_value: *mut *mut Value) -> c_int {
    unsafe { make_value("gb_value_int", out_value, || Value::Int(value)) }
}

/// Create a 64-bit float value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_value_float(value: f64, out_value: *mut *mut Value) -> c_int {
    unsafe { make_value("gb_value_float", out_value, || Value::Float(value)) }
}

/// Create a string value. The text is copied; the input stays caller-owned.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_value_string(value: *const c_char, out_value: *mut *mut Value) -> c_int {
    let Some(out) = (unsafe { out_param(out_value, "gb_value_string") }) else {
        return INVALID_ARGUMENT;
    };
    clear_last_error();
    guarded("gb_value_string", || {
        let value = unsafe { required_str(value, "string value") }?;
        *out = Box::into_raw(Box::new(Value::String(value.to_owned())));
        Ok(())
    })
}

/// Create an empty array value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_value_array(out_value: *mut *mut Value) -> c_int {
    unsafe { make_value("gb_value_array", out_value, Value::array) }
}

/// Create an empty object value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_value_object(out_value: *mut *mut Value) -> c_int {
    unsafe { make_value("gb_value_object", out_value, Value::object) }
}

/// Append a copy of `value` to `array`.
///
/// The source handle stays independently alive and is still released by its
/// own caller; parent and child never alias.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_array_push(array: *mut Value, value: *const Value) -> c_int {
    clear_last_error();
    guarded("gb_array_push", || {
        // Copy out of the source before borrowing the target mutably; the
        // caller may pass the same handle for both.
        let value = unsafe { required_ref(value, "value handle") }?.clone();
        let array = unsafe { required_mut(array, "array handle") }?;
        array.push(value)
    })
}

/// Insert or overwrite a copy of `value` at `key` in `object`. Last write
/// for a given key wins.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_object_set(
    object: *mut Value,
    key: *const c_char,
    value: *const Value,
) -> c_int {
    clear_last_error();
    guarded("gb_object_set", || {
        let key = unsafe { required_str(key, "key") }?.to_owned();
        let value = unsafe { required_ref(value, "value handle") }?.clone();
        let object = unsafe { required_mut(object, "object handle") }?;
        object.insert(&key, value)
    })
}

/// Release a value handle. Null is a no-op. Copies previously pushed or set
/// into compounds are unaffected.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_value_free(value: *mut Value) {
    if value.is_null() {
        return;
    }
    let _ = panic::catch_unwind(AssertUnwindSafe(|| drop(unsafe { Box::from_raw(value) })));
}

// --- Contexts ---

/// Create a render context from a root value.
///
/// The context takes a private copy of the root; the original value handle is
/// untouched and still released by its owner.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_context_make(root: *const Value, out_context: *mut *mut Context) -> c_int {
    let Some(out) = (unsafe { out_param(out_context, "gb_context_make") }) else {
        return INVALID_ARGUMENT;
    };
    clear_last_error();
    guarded("gb_context_make", || {
        let root = unsafe { required_ref(root, "root value handle") }?;
        *out = Box::into_raw(Box::new(Context::new(root)));
        Ok(())
    })
}

/// Release a context handle. Null is a no-op.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_context_free(context: *mut Context) {
    if context.is_null() {
        return;
    }
    let _ = panic::catch_unwind(AssertUnwindSafe(|| drop(unsafe { Box::from_raw(context) })));
}

// --- Strings ---

/// Release a string produced by this boundary (rendered output or an error
/// message). Null is a no-op. Pointers from any other allocator are undefined
/// behavior.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn gb_str_free(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    let _ = panic::catch_unwind(AssertUnwindSafe(|| drop(unsafe { CString::from_raw(s) })));
}
