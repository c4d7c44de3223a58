use crate::body::{self, ResponseBody};
use headers::{
    ContentLength, ContentType, HeaderMapExt, IfModifiedSince, IfNoneMatch, LastModified,
};
use http::HeaderMap;
use hyper::{Response, StatusCode};
use std::fs::Metadata;
use std::io;
use std::path::Path;
use tokio::fs::File;

/// Responds with the contents of the regular file at `path`.
pub async fn serve(
    path: &Path,
    metadata: &Metadata,
    req_headers: &HeaderMap,
    include_body: bool,
) -> Result<Response<ResponseBody>, io::Error> {
    let modified = metadata.modified().ok();

    if let Some(modified) = modified {
        if is_fresh(req_headers, modified) {
            let mut resp = Response::new(body::empty());
            *resp.status_mut() = StatusCode::NOT_MODIFIED;
            resp.headers_mut().typed_insert(LastModified::from(modified));
            return Ok(resp);
        }
    }

    let file = File::open(path).await?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    let mut resp = Response::new(if include_body {
        body::from_file(file)
    } else {
        body::empty()
    });
    let headers = resp.headers_mut();
    headers.typed_insert(ContentType::from(mime));
    headers.typed_insert(ContentLength(metadata.len()));
    if let Some(modified) = modified {
        headers.typed_insert(LastModified::from(modified));
    }
    Ok(resp)
}

/// `If-None-Match` takes precedence, and this server never sends an ETag.
fn is_fresh(req_headers: &HeaderMap, modified: std::time::SystemTime) -> bool {
    if req_headers.typed_get::<IfNoneMatch>().is_some() {
        return false;
    }
    match req_headers.typed_get::<IfModifiedSince>() {
        Some(since) => !since.is_modified(modified),
        None => false,
    }
}
