use futures::TryStreamExt;
use http_body_util::combinators::BoxBody;
use http_body_util::StreamBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Bytes, Frame};
use std::io;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Body type of every response the server produces.
pub type ResponseBody = BoxBody<Bytes, io::Error>;

pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}

pub fn full(bytes: impl Into<Bytes>) -> ResponseBody {
    Full::new(bytes.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn from_file(file: File) -> ResponseBody {
    let stream = ReaderStream::with_capacity(file, 64 * 1024);
    StreamBody::new(stream.map_ok(Frame::data)).boxed()
}
