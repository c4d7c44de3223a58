use crate::tcp;
use hyper::body::{Body, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::server::graceful::GracefulShutdown;
use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// How long in-flight connections may keep running once shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Serve connections from `listener` until `shutdown` resolves.
///
/// The listener is closed as soon as `shutdown` fires; open connections are then
/// given `SHUTDOWN_GRACE` to finish before this returns.
pub async fn run_simple_server<S, F, B>(
    mut listener: TcpListener,
    state: S,
    handle_req: F,
    shutdown: impl Future<Output = ()>,
) -> Result<(), io::Error>
where
    S: Send + Sync + 'static,
    F: for<'s> ServiceFn<'s, Request<Incoming>, S, Response<B>> + Copy + Send + 'static,
    B: Body + Send + 'static,
    <B as Body>::Data: Send,
    <B as Body>::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let state = Arc::new(state);
    let builder = auto::Builder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        let tcp = tokio::select! {
            tcp = tcp::accept(&mut listener) => tcp?,
            () = &mut shutdown => break,
        };
        let io = TokioIo::new(tcp);

        let state = Arc::clone(&state);
        let serve = service_fn(move |req| {
            let state = Arc::clone(&state);
            async move { Ok::<_, Infallible>(handle_req(req, &state).await) }
        });

        let conn = builder.serve_connection_with_upgrades(io, serve);
        let conn = graceful.watch(conn.into_owned());
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                log::debug!("Error serving connection: {}", e);
            }
        });
    }

    drop(listener);
    if tokio::time::timeout(SHUTDOWN_GRACE, graceful.shutdown())
        .await
        .is_err()
    {
        log::warn!("Open connections did not close in time, dropping them");
    }

    Ok(())
}

// Work around the lack of HKT bounds.
// Because the future will borrow from the state argument, we need to write bounds like this:
// ```
// where
//     F: for<'s> FnOnce(Request<Body>, &'s S) -> Fut<'s>
//     Fut<'s>: Future<Output = Result<Response<B>, E>> + 's
// ```
// Which can't currently be done. Instead, factor both bounds out to a dedicated trait,
// which is implemented for all matching functions.
pub trait ServiceFn<'s, T, S, R>
where
    Self: FnOnce(T, &'s S) -> Self::Fut,
    Self::Fut: Future<Output = R> + Send + 's,
    S: 's,
{
    type Fut;
}

impl<'s, T, S, R, F, Fut> ServiceFn<'s, T, S, R> for F
where
    F: FnOnce(T, &'s S) -> Fut,
    Fut: Future<Output = R> + Send + 's,
    S: 's,
{
    type Fut = Fut;
}
