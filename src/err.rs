use std::io;
use std::path::PathBuf;

/// Anything that stops the server from starting, or keeps it from accepting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Cannot serve directory {}: {source}", .path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Port {port} is already in use.{}", next_port_hint(.port))]
    AddrInUse { port: u16 },
    #[error("Failed to bind: {0}")]
    Bind(#[source] io::Error),
    #[error("Failed to accept connections: {0}")]
    Serve(#[source] io::Error),
}

fn next_port_hint(port: &u16) -> String {
    match port.checked_add(1) {
        Some(next) => format!(" Try a different port:\n   reserved {}", next),
        None => String::from(" Try a different port."),
    }
}

pub trait IoErrorExt {
    fn applies_to(&self) -> AppliesTo;
}

impl IoErrorExt for io::Error {
    fn applies_to(&self) -> AppliesTo {
        match self.kind() {
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::TimedOut => AppliesTo::Connection,
            io::ErrorKind::InvalidInput | io::ErrorKind::NotConnected => AppliesTo::Listener,
            // EMFILE, ENFILE, ENOBUFS, ENOMEM: the listener itself is still usable
            _ => AppliesTo::Resources,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum AppliesTo {
    Connection,
    /// Temporary exhaustion (file descriptors, buffers, memory), worth retrying.
    Resources,
    Listener,
}
