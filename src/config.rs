use crate::err::StartupError;
use std::env;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Everything the listener needs, resolved once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    /// Canonical path of the directory being served.
    pub root: PathBuf,
}

impl Config {
    pub fn new(addr: SocketAddr, directory: Option<PathBuf>) -> Result<Self, StartupError> {
        let path = match directory {
            Some(dir) => dir,
            None => executable_dir().map_err(|source| StartupError::Root {
                path: PathBuf::from("<executable directory>"),
                source,
            })?,
        };
        let root = canonical_dir(&path).map_err(|source| StartupError::Root { path, source })?;
        Ok(Self { addr, root })
    }
}

fn executable_dir() -> Result<PathBuf, io::Error> {
    let exe = env::current_exe()?;
    match exe.parent() {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Err(io::Error::new(
            io::ErrorKind::NotFound,
            "Executable has no parent directory",
        )),
    }
}

fn canonical_dir(path: &Path) -> Result<PathBuf, io::Error> {
    let canonical = path.canonicalize()?;
    if canonical.is_dir() {
        Ok(canonical)
    } else {
        Err(io::Error::new(io::ErrorKind::InvalidInput, "Not a directory"))
    }
}
