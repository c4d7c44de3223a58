use crate::body::ResponseBody;
use crate::config::Config;
use crate::cors;
use crate::err::StartupError;
use crate::http::run_simple_server;
use crate::routes::{self, State};
use crate::tcp;
use hyper::body::Incoming;
use hyper::{Request, Response};
use std::future::Future;
use std::path::PathBuf;
use tokio::net::TcpListener;

pub async fn run(config: Config, shutdown: impl Future<Output = ()>) -> Result<(), StartupError> {
    let Config { addr, root } = config;

    let listener = tcp::bind(addr).await?;
    serve(listener, root, shutdown).await
}

/// Serves `root` on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    root: PathBuf,
    shutdown: impl Future<Output = ()>,
) -> Result<(), StartupError> {
    let port = listener.local_addr().map_err(StartupError::Bind)?.port();
    log::info!("Server running at http://localhost:{}/", port);
    log::info!("Serving directory: {}", root.display());
    log::info!("Press Ctrl+C to stop the server");

    run_simple_server(listener, State { root }, respond, shutdown)
        .await
        .map_err(StartupError::Serve)?;

    log::info!("Server stopped");
    Ok(())
}

async fn respond(req: Request<Incoming>, state: &State) -> Response<ResponseBody> {
    let mut resp = routes::respond_to_request(req, state).await;
    cors::inject_headers(resp.headers_mut());
    resp
}
