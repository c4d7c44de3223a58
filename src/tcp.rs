use crate::err::{AppliesTo, IoErrorExt, StartupError};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// Pause after running out of descriptors, so the accept loop doesn't spin.
const RESOURCE_BACKOFF: Duration = Duration::from_millis(100);

pub async fn bind(addr: SocketAddr) -> Result<TcpListener, StartupError> {
    TcpListener::bind(addr).await.map_err(|e| match e.kind() {
        io::ErrorKind::AddrInUse => StartupError::AddrInUse { port: addr.port() },
        _ => StartupError::Bind(e),
    })
}

pub async fn accept(listener: &mut TcpListener) -> Result<TcpStream, io::Error> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                if let Err(e) = stream.set_nodelay(true) {
                    log::debug!("Failed to set nodelay for {}: {}", addr, e);
                }
                return Ok(stream);
            }
            Err(e) => recover(e).await?,
        }
    }
}

/// Decides whether the accept loop can continue after `e`.
async fn recover(e: io::Error) -> Result<(), io::Error> {
    match e.applies_to() {
        AppliesTo::Connection => log::debug!("Aborted connection dropped: {}", e),
        AppliesTo::Resources => {
            log::error!("Failed to accept, retrying in {:?}: {}", RESOURCE_BACKOFF, e);
            tokio::time::sleep(RESOURCE_BACKOFF).await;
        }
        AppliesTo::Listener => return Err(e),
    }
    Ok(())
}
