//! Result codes, the internal failure type, and the per-thread error slot.
//!
//! Every boundary operation reports failures twice: as a numeric result code
//! returned directly to the caller, and as a message parked in a thread-local
//! slot retrievable (once) through `gb_get_last_error`. Inside the crate,
//! failures travel as [`Error`] values and are flattened to a (code, message)
//! pair at the `extern "C"` layer.

use std::cell::RefCell;

/// Result codes returned by every mutating or creating boundary operation.
///
/// The numeric values are part of the ABI contract with foreign callers and
/// must never be renumbered.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Success.
    Ok = 0,
    /// Unclassified failure, including contained panics.
    Generic = 1,
    /// Null required pointer or string, or non-UTF-8 text.
    InvalidArgument = 2,
    /// An output string could not be materialized.
    AllocationFailed = 3,
    /// Malformed context JSON.
    JsonParse = 4,
    /// The engine rejected the template at evaluation time.
    TemplateRender = 5,
    /// A value mutation was rejected, e.g. pushing into a non-array.
    OperationFailed = 6,
    /// Malformed template text.
    TemplateParse = 7,
}

/// Internal failure type.
///
/// Collaborator diagnostics are kept verbatim so the retrievable message
/// carries the engine's own wording (row/column pointers included).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("template parsing failed: {0}")]
    TemplateParse(minijinja::Error),

    #[error("template rendering failed: {0}")]
    TemplateRender(minijinja::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("failed to allocate output string: {0}")]
    StringAlloc(#[from] std::ffi::NulError),

    #[error("{0}")]
    Operation(String),

    #[error("{0}")]
    Generic(String),
}

impl Error {
    /// The numeric code reported to foreign callers for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::TemplateParse(_) => ErrorCode::TemplateParse,
            Error::TemplateRender(_) => ErrorCode::TemplateRender,
            Error::JsonParse(_) => ErrorCode::JsonParse,
            Error::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Error::StringAlloc(_) => ErrorCode::AllocationFailed,
            Error::Operation(_) => ErrorCode::OperationFailed,
            Error::Generic(_) => ErrorCode::Generic,
        }
    }
}

thread_local! {
    // At most one pending diagnostic per thread; overwritten, never appended.
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Overwrite the calling thread's pending diagnostic.
pub(crate) fn set_last_error(message: impl Into<String>) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message.into()));
}

/// Drop the calling thread's pending diagnostic, if any.
pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|slot| slot.borrow_mut().take());
}

/// Read and clear the calling thread's pending diagnostic.
pub(crate) fn take_last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_abi_stable() {
        assert_eq!(ErrorCode::Ok as i32, 0);
        assert_eq!(ErrorCode::Generic as i32, 1);
        assert_eq!(ErrorCode::InvalidArgument as i32, 2);
        assert_eq!(ErrorCode::AllocationFailed as i32, 3);
        assert_eq!(ErrorCode::JsonParse as i32, 4);
        assert_eq!(ErrorCode::TemplateRender as i32, 5);
        assert_eq!(ErrorCode::OperationFailed as i32, 6);
        assert_eq!(ErrorCode::TemplateParse as i32, 7);
    }

    #[test]
    fn slot_overwrites_and_takes_once() {
        set_last_error("first");
        set_last_error("second");
        assert_eq!(take_last_error().as_deref(), Some("second"));
        assert_eq!(take_last_error(), None);
    }

    #[test]
    fn clear_empties_the_slot() {
        set_last_error("pending");
        clear_last_error();
        assert_eq!(take_last_error(), None);
    }

    #[test]
    fn slot_is_thread_scoped() {
        set_last_error("main thread message");
        std::thread::spawn(|| {
            assert_eq!(take_last_error(), None);
            set_last_error("worker thread message");
        })
        .join()
        .unwrap();
        assert_eq!(take_last_error().as_deref(), Some("main thread message"));
    }
}
