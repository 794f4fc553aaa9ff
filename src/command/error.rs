use thiserror::Error;

/// Everything that can keep the dispatcher from running a command.
///
/// None of these reach the transport: the dispatcher turns each one into a
/// user-visible reply.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The payload is not a well-formed event.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// No registered processor accepts the command or card action.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// A processor returned an error or panicked.
    #[error("command '{command}' failed: {diagnostic}")]
    HandlerFailure { command: String, diagnostic: String },
}
