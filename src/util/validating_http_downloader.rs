use anyhow::anyhow;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hex::FromHex;
use hyper::{Body, Client, Request, Uri};
use hyper::client::HttpConnector;
use hyper::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use hyper_tls::HttpsConnector;
use tracing::{trace, warn};

use crate::util::blob::Blob;
use crate::util::validating_http_body::{HttpBodyValidator, Md5HttpBodyValidator, Sha1HttpBodyValidator, ValidatingHttpBody};

// some repositories (e.g. Maven Central) return a 403 without a user agent
const USER_AGENT_VALUE: &str = concat!("arti-query/", env!("CARGO_PKG_VERSION"));

/// Username / password for HTTP basic authentication
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}
impl BasicCredentials {
    pub fn header_value(&self) -> anyhow::Result<HeaderValue> {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        Ok(HeaderValue::from_str(&format!("Basic {}", encoded))?)
    }
}

/// Performs (optionally authenticated) GET requests, checking the body's integrity against a
///  hashcode if one is returned in a header.
///
/// Instances do HTTP connection caching internally, so keeping them alive has performance benefits.
pub struct ValidatingHttpDownloader {
    client: Client<HttpsConnector<HttpConnector>>,
    credentials: Option<BasicCredentials>,
}
impl ValidatingHttpDownloader {
    pub fn new(credentials: Option<BasicCredentials>) -> ValidatingHttpDownloader {
        ValidatingHttpDownloader {
            client: Client::builder()
                .build::<_, Body>(HttpsConnector::new()),
            credentials,
        }
    }

    fn request(&self, uri: &str, accept: Option<&str>) -> anyhow::Result<Request<Body>> {
        let mut builder = Request::builder()
            .method("GET")
            .uri(Uri::try_from(uri)?)
            .header(USER_AGENT, USER_AGENT_VALUE);
        if let Some(accept) = accept {
            builder = builder.header("accept", accept);
        }
        if let Some(credentials) = &self.credentials {
            builder = builder.header(AUTHORIZATION, credentials.header_value()?);
        }
        Ok(builder.body(Body::empty())?)
    }

    /// GET a (small) document and return its body as a whole
    pub async fn get_document(&self, uri: &str, accept: &str) -> anyhow::Result<bytes::Bytes> {
        let request = self.request(uri, Some(accept))?;
        trace!("getting {:?}", request);

        let response = self.client.request(request)
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!("request to {} failed: {}", uri, response.status()));
        }
        Ok(hyper::body::to_bytes(response.into_body()).await?)
    }

    pub async fn get(&self, uri: &str) -> anyhow::Result<Blob> {
        let request = self.request(uri, None)?;
        trace!("getting {:?}", request);

        let artifact_response = self.client.request(request)
            .await?;
        if !artifact_response.status().is_success() {
            return Err(anyhow!("request to {} failed: {}", uri, artifact_response.status()));
        }

        let headers = artifact_response.headers();
        let expected_sha1 = header_hash::<20>(headers, &["x-checksum-sha1", "x-goog-meta-checksum-sha1"]);
        let expected_md5 = header_hash::<16>(headers, &["x-checksum-md5", "x-goog-meta-checksum-md5"]);

        let mut validators: Vec<Box<dyn HttpBodyValidator>> = vec![];
        if let Some(expected_hash) = expected_sha1 {
            validators.push(Box::new(Sha1HttpBodyValidator::new(expected_hash)));
        }
        if let Some(expected_hash) = expected_md5 {
            validators.push(Box::new(Md5HttpBodyValidator::new(expected_hash)));
        }
        Ok(Blob {
            location: uri.to_string(),
            data: Box::pin(ValidatingHttpBody::new(artifact_response.into_body(), validators)),
        })
    }
}

/// The first of the given headers that is present. A header that does not contain a hex hash of
///  the right length is skipped rather than failing the download.
fn header_hash<const N: usize>(headers: &HeaderMap, names: &[&str]) -> Option<[u8; N]>
    where [u8; N]: FromHex
{
    for name in names {
        if let Some(value) = headers.get(*name) {
            let text = value.to_str().unwrap_or("").trim().trim_matches('"');
            match <[u8; N]>::from_hex(text) {
                Ok(hash) => return Some(hash),
                Err(_) => warn!("ignoring invalid checksum header {}: {:?}", name, text),
            }
        }
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_basic_credentials() {
        let credentials = BasicCredentials { username: "Aladdin".to_string(), password: "open sesame".to_string() };
        assert_eq!(credentials.header_value().unwrap(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }

    #[test]
    fn test_header_hash() {
        let mut headers = HeaderMap::new();
        headers.insert("x-checksum-sha1", HeaderValue::from_static("not hex"));
        headers.insert("x-goog-meta-checksum-sha1", HeaderValue::from_static("\"2aae6c35c94fcfb415dbe95f408b9ce91ee846ed\""));
        headers.insert("x-checksum-md5", HeaderValue::from_static("5eb63bbbe01eeed093cb22bb8f5acdc3"));

        let sha1 = header_hash::<20>(&headers, &["x-checksum-sha1", "x-goog-meta-checksum-sha1"]);
        assert_eq!(sha1.map(hex::encode).as_deref(), Some("2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"));

        let md5 = header_hash::<16>(&headers, &["x-checksum-md5"]);
        assert_eq!(md5.map(hex::encode).as_deref(), Some("5eb63bbbe01eeed093cb22bb8f5acdc3"));

        assert_eq!(header_hash::<16>(&headers, &["x-missing"]), None);
    }
}
