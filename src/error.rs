//! # Error Types
//!
//! This module defines all error types for the keybed engine.
//!
//! ## Error Types
//! - `ParseError` - Malformed pitch name (e.g. `"H4"`, `"C"`, `"Db4"`) or unknown instrument
//! - `ImportError` - Recording payload that is not a valid recording
//! - `ExportError` - Recording could not be serialized
//! - `UnsupportedInput` - Release for an identifier that was never pressed
//! - `LessonError` - Lesson content that cannot be scheduled
//! - `ConfigError` - Invalid engine configuration
//! - `DeviceError` - The sound device refused to actuate
//!
//! ## Propagation
//! Parse, import, lesson and config errors are returned to the caller.
//! `UnsupportedInput` and `DeviceError` are produced internally and absorbed by
//! the engine: spurious releases are expected from real hardware, and a failed
//! device only switches the engine into silent mode.
//!
//! ## Usage
//! ```rust
//! use keybed::{KeybedError, Pitch};
//!
//! match "H4".parse::<Pitch>() {
//!     Ok(pitch) => println!("pitch {}", pitch),
//!     Err(KeybedError::ParseError { input, message }) => {
//!         eprintln!("bad pitch '{}': {}", input, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeybedError {
    /// Malformed pitch name or unknown instrument name.
    ///
    /// # Example
    /// ```
    /// # use keybed::KeybedError;
    /// let err = KeybedError::ParseError {
    ///     input: "H4".to_string(),
    ///     message: "unknown note letter 'H'".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Cannot parse 'H4': unknown note letter 'H'");
    /// ```
    #[error("Cannot parse '{input}': {message}")]
    ParseError { input: String, message: String },

    /// Recording payload is not a structurally valid recording.
    ///
    /// Import is atomic: when this is returned the previous recording is untouched.
    #[error("Import failed: {0}")]
    ImportError(String),

    /// Recording could not be written out.
    #[error("Export failed: {0}")]
    ExportError(String),

    /// Release for an identifier with no current binding.
    #[error("No active binding for input '{0}'")]
    UnsupportedInput(String),

    /// Lesson content that cannot be scheduled.
    ///
    /// # Example
    /// ```
    /// # use keybed::KeybedError;
    /// let err = KeybedError::LessonError("tempo must be positive".to_string());
    /// assert_eq!(err.to_string(), "Invalid lesson: tempo must be positive");
    /// ```
    #[error("Invalid lesson: {0}")]
    LessonError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Sound device error: {0}")]
    DeviceError(String),
}
