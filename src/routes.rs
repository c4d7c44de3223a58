use crate::body::{self, ResponseBody};
use crate::routes::path::Rejection;
use headers::{ContentLength, ContentType, HeaderMapExt};
use http::request::Parts;
use http::{header, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use mime_guess::mime;
use std::path::{Path, PathBuf};
use tokio::fs;

mod file;
mod listing;
mod path;

const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

pub struct State {
    /// Canonical path of the served directory.
    pub root: PathBuf,
}

pub async fn respond_to_request<B>(req: Request<B>, state: &State) -> Response<ResponseBody> {
    let (parts, _) = req.into_parts();
    match parts.method {
        Method::GET => get(&parts, state, true).await,
        Method::HEAD => get(&parts, state, false).await,
        Method::OPTIONS => {
            log::info!("{} {} -> [preflight response]", parts.method, parts.uri);
            Response::new(body::empty())
        }
        _ => {
            log::warn!("{} {} -> [unsupported method]", parts.method, parts.uri);
            let message = format!("Unsupported method ('{}')", parts.method);
            error_page(StatusCode::NOT_IMPLEMENTED, &message, true)
        }
    }
}

async fn get(parts: &Parts, state: &State, include_body: bool) -> Response<ResponseBody> {
    let method = &parts.method;
    let uri = &parts.uri;
    let uri_path = uri.path();

    let relative = match path::resolve(uri_path) {
        Ok(relative) => relative,
        Err(Rejection::Malformed) => {
            log::warn!("{} {} -> [malformed path]", method, uri);
            return error_page(StatusCode::BAD_REQUEST, "Bad request path", include_body);
        }
        Err(Rejection::Traversal) => {
            log::warn!("{} {} -> [traversal blocked]", method, uri);
            return error_page(StatusCode::FORBIDDEN, "Forbidden", include_body);
        }
    };

    let target = match locate(&state.root, &state.root.join(relative)).await {
        Ok(target) => target,
        Err(status) => {
            log::info!("{} {} -> [{}]", method, uri, status);
            return error_page(status, message_for(status), include_body);
        }
    };

    if !target.metadata.is_dir() {
        if uri_path.ends_with('/') {
            log::info!("{} {} -> [file with trailing slash]", method, uri);
            return error_page(StatusCode::NOT_FOUND, "File not found", include_body);
        }
        return serve_file(parts, &target, include_body).await;
    }

    if !uri_path.ends_with('/') {
        // a leading `//` would make the location point at another host
        let local_path = uri_path.trim_start_matches('/');
        let location = match uri.query() {
            Some(query) => format!("/{}/?{}", local_path, query),
            None => format!("/{}/", local_path),
        };
        return match HeaderValue::try_from(location) {
            Ok(location) => {
                log::info!("{} {} -> [redirect] {:?}", method, uri, location);
                let mut resp = Response::new(body::empty());
                *resp.status_mut() = StatusCode::MOVED_PERMANENTLY;
                resp.headers_mut().insert(header::LOCATION, location);
                resp.headers_mut().typed_insert(ContentLength(0));
                resp
            }
            Err(e) => {
                log::warn!("{} {} -> [bad redirect] {}", method, uri, e);
                error_page(StatusCode::BAD_REQUEST, "Bad request path", include_body)
            }
        };
    }

    for index in INDEX_FILES {
        if let Ok(index) = locate(&state.root, &target.path.join(index)).await {
            if index.metadata.is_file() {
                return serve_file(parts, &index, include_body).await;
            }
        }
    }

    match listing::render(&target.path, &path::decode_lossy(uri_path)).await {
        Ok(html) => {
            log::info!("{} {} -> [listing]", method, uri);
            html_response(StatusCode::OK, html, include_body)
        }
        Err(e) => {
            log::warn!("{} {} -> [listing error] {}", method, uri, e);
            error_page(
                StatusCode::NOT_FOUND,
                "No permission to list directory",
                include_body,
            )
        }
    }
}

struct Target {
    path: PathBuf,
    metadata: std::fs::Metadata,
}

/// Looks up `path`, refusing anything that resolves outside of `root`.
async fn locate(root: &Path, path: &Path) -> Result<Target, StatusCode> {
    let canonical = fs::canonicalize(path)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    if !canonical.starts_with(root) {
        return Err(StatusCode::FORBIDDEN);
    }
    let metadata = fs::metadata(&canonical)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(Target {
        path: canonical,
        metadata,
    })
}

async fn serve_file(
    parts: &Parts,
    target: &Target,
    include_body: bool,
) -> Response<ResponseBody> {
    match file::serve(&target.path, &target.metadata, &parts.headers, include_body).await {
        Ok(resp) => {
            log::info!(
                "{} {} -> [{} {} bytes]",
                parts.method,
                parts.uri,
                resp.status(),
                target.metadata.len()
            );
            resp
        }
        Err(e) => {
            log::warn!(
                "{} {} -> [file error] {} : {}",
                parts.method,
                parts.uri,
                target.path.display(),
                e
            );
            error_page(StatusCode::NOT_FOUND, "File not found", include_body)
        }
    }
}

fn message_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::FORBIDDEN => "Forbidden",
        _ => "File not found",
    }
}

fn error_page(status: StatusCode, message: &str, include_body: bool) -> Response<ResponseBody> {
    let html = format!(
        concat!(
            "<!DOCTYPE HTML>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<title>Error response</title>\n",
            "</head>\n",
            "<body>\n",
            "<h1>Error response</h1>\n",
            "<p>Error code: {code}</p>\n",
            "<p>Message: {message}.</p>\n",
            "</body>\n",
            "</html>\n",
        ),
        code = status.as_u16(),
        message = listing::escape(message),
    );
    html_response(status, html, include_body)
}

fn html_response(status: StatusCode, html: String, include_body: bool) -> Response<ResponseBody> {
    let len = html.len() as u64;
    let mut resp = Response::new(if include_body {
        body::full(html)
    } else {
        body::empty()
    });
    *resp.status_mut() = status;
    resp.headers_mut()
        .typed_insert(ContentType::from(mime::TEXT_HTML_UTF_8));
    resp.headers_mut().typed_insert(ContentLength(len));
    resp
}
