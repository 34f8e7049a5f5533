//! Error types for the render pipeline.

use thiserror::Error;

/// Errors surfaced by the render loop and the reactive runtime.
///
/// Layout never fails (bad values clamp) and buffer access is bounds-checked
/// by returning `Option`, so these cover I/O and caught panics.
#[derive(Error, Debug)]
pub enum Error {
    /// Writing to the output sink or talking to the terminal failed
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A frame panicked during layout, paint or diff; the previous frame stays on screen
    #[error("frame skipped after panic: {0}")]
    FramePanicked(String),

    /// An effect panicked and has been disabled
    #[error("effect {effect} panicked and was disabled: {message}")]
    EffectPanicked { effect: u64, message: String },

    /// The terminal could not be queried or configured
    #[error("terminal unavailable: {0}")]
    Terminal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Best-effort text for a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EffectPanicked { effect: 7, message: "boom".into() };
        assert_eq!(err.to_string(), "effect 7 panicked and was disabled: boom");

        let err: Error = std::io::Error::other("closed").into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_panic_message() {
        let payload = std::panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static");

        let payload = std::panic::catch_unwind(|| panic!("fmt {}", 1)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "fmt 1");
    }
}
