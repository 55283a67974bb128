//! Error reporting for the CLI
//!
//! An error the user can fix (bad target, bad configuration value) is shown
//! as its own message. Anything else is shown under the operation that
//! failed, followed by its chain of causes, so a refused connection buried
//! inside an HTTP error still reaches the log.

use std::error::Error;

pub trait ContextualError: Error {
    /// True for errors the user can fix directly
    fn is_user_actionable(&self) -> bool {
        self.user_message().is_some()
    }

    /// The message to show for actionable errors
    fn user_message(&self) -> Option<&str> {
        None
    }
}

/// Messages of every `source()` below `error`, outermost first
pub fn error_causes(error: &dyn Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut next = error.source();
    while let Some(cause) = next {
        let message = cause.to_string();
        // thiserror wrappers often repeat their source verbatim
        if causes.last() != Some(&message) {
            causes.push(message);
        }
        next = cause.source();
    }
    causes
}

/// The single line logged for a fatal error
pub fn describe_error<E: ContextualError>(error: &E, operation: &str) -> String {
    if let Some(message) = error.user_message().filter(|_| error.is_user_actionable()) {
        return message.to_string();
    }

    let mut line = format!("{}: {}", operation, error);
    let top = error.to_string();
    for cause in error_causes(error) {
        if !top.contains(&cause) {
            line.push_str(&format!(" (caused by: {})", cause));
        }
    }
    line
}

/// Log a fatal error with the detail the user needs
///
/// ```rust,no_run
/// use vulnguard::core::error_handling::log_error_with_context;
/// use vulnguard::core::validation::ValidationError;
///
/// let err = ValidationError::new("'not-a-url' is not a valid URL");
/// log_error_with_context(&err, "Target validation");
/// // Logs: "FATAL: 'not-a-url' is not a valid URL"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(error: &E, operation: &str) {
    log::error!("FATAL: {}", describe_error(error, operation));
    log::debug!("Error details: {:?}", error);
}
