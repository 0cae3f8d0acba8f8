use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;

/// Fetched artifact content: the bytes plus where they came from. If the source announced
///  checksums, the data stream fails on its last chunk when they do not match.
pub struct Blob {
    pub location: String,
    pub data: Pin<Box<dyn Stream<Item = anyhow::Result<Bytes>> + Send + 'static>>,
}
