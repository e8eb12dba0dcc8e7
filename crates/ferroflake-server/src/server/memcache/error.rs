use std::io;

/// A command line that could not be turned into a command.
///
/// Recovered at the connection level: the client gets `ERROR\r\n` and the
/// connection stays open.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("no command")]
    EmptyCommand,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("command line exceeds {0} bytes")]
    LineTooLong(usize),
}

/// A failure on the socket itself. Ends the affected connection only.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("connection I/O error: {0}")]
    Io(#[from] io::Error),
}
