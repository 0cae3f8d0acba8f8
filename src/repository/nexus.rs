use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::maven::artifact::Artifact;
use crate::maven::paths::as_maven_path;
use crate::query::SearchCriteria;
use crate::repository::{Fetcher, Searcher};
use crate::util::blob::Blob;
use crate::util::validating_http_downloader::{BasicCredentials, ValidatingHttpDownloader};

const SEARCH_PATH: &str = "service/local/lucene/search";
const CONTENT_PATH: &str = "content/repositories";

/// A Nexus 2 server, searched through its lucene search REST endpoint. Artifacts are fetched from
///  the content URL of the repository that hosts them.
pub struct NexusRepository {
    downloader: ValidatingHttpDownloader,
    base_uri: String, // with trailing '/'
    default_repository: String,
}
impl NexusRepository {
    pub fn new(base_uri: String, credentials: Option<BasicCredentials>, default_repository: String) -> anyhow::Result<NexusRepository> {
        let mut base_uri = base_uri;
        if !base_uri.ends_with('/') {
            base_uri.push('/');
        }

        // check that the base URI is valid
        hyper::Uri::try_from(base_uri.clone())?;

        Ok(NexusRepository {
            downloader: ValidatingHttpDownloader::new(credentials),
            base_uri,
            default_repository,
        })
    }

    pub fn search_uri(&self, criteria: &SearchCriteria) -> String {
        let query = search_parameters(criteria).iter()
            .map(|(k, v)| format!("{}={}", k, encode_query_value(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}{}?{}", self.base_uri, SEARCH_PATH, query)
    }

    /// artifacts without a repository id are looked up in the default repository (group)
    pub fn content_uri(&self, artifact: &Artifact) -> String {
        let repository_id = match artifact.repository_id() {
            "" => self.default_repository.as_str(),
            r => r,
        };
        format!("{}{}/{}/{}", self.base_uri, CONTENT_PATH, repository_id, as_maven_path(artifact))
    }
}

#[async_trait]
impl Searcher for NexusRepository {
    async fn search(&self, criteria: &SearchCriteria) -> anyhow::Result<Vec<Artifact>> {
        let uri = self.search_uri(criteria);
        debug!("searching {}", uri);

        let body = self.downloader.get_document(&uri, "application/json").await?;
        let response: SearchResponse = serde_json::from_slice(&body)?;
        Ok(response.into_artifacts())
    }
}

#[async_trait]
impl Fetcher for NexusRepository {
    async fn fetch(&self, artifact: &Artifact) -> anyhow::Result<Blob> {
        let uri = self.content_uri(artifact);
        debug!("fetching {} from {}", artifact, uri);
        self.downloader.get(&uri).await
    }
}

fn search_parameters(criteria: &SearchCriteria) -> Vec<(&'static str, String)> {
    let mut result = Vec::new();
    if let Some(repository_id) = criteria.repository_id() {
        result.push(("repositoryId", repository_id.to_string()));
    }

    match criteria.unscoped() {
        SearchCriteria::All => result.push(("q", "*".to_string())),
        SearchCriteria::ByKeyword(keyword) => result.push(("q", keyword.clone())),
        SearchCriteria::ByCoordinates(coordinates) => {
            result.push(("g", coordinates.group_id.clone()));
            result.push(("a", coordinates.artifact_id.clone()));
            result.push(("v", coordinates.version.clone()));
            if let Some(extension) = &coordinates.extension {
                result.push(("p", extension.clone()));
            }
            if let Some(classifier) = &coordinates.classifier {
                result.push(("c", classifier.clone()));
            }
        }
        SearchCriteria::InRepository { .. } => unreachable!("unscoped criteria are never scoped"),
    }
    result
}

/// percent-encodes everything except RFC 3986 unreserved characters
fn encode_query_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => result.push(b as char),
            _ => result.push_str(&format!("%{:02X}", b)),
        }
    }
    result
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    group_id: String,
    artifact_id: String,
    version: String,
    #[serde(default)]
    artifact_hits: Vec<ArtifactHit>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ArtifactHit {
    #[serde(default)]
    repository_id: String,
    #[serde(default)]
    artifact_links: Vec<ArtifactLink>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ArtifactLink {
    #[serde(default)]
    extension: String,
    #[serde(default)]
    classifier: Option<String>,
}

impl SearchResponse {
    /// one artifact per (repository, file) combination
    fn into_artifacts(self) -> Vec<Artifact> {
        let mut result = Vec::new();
        for hit in self.data {
            for artifact_hit in &hit.artifact_hits {
                for link in &artifact_hit.artifact_links {
                    result.push(
                        Artifact::new(hit.group_id.as_str(), hit.artifact_id.as_str(), hit.version.as_str())
                            .with_extension(link.extension.as_str())
                            .with_classifier(link.classifier.clone().unwrap_or_default())
                            .with_repository_id(artifact_hit.repository_id.as_str())
                    );
                }
            }
        }
        result
    }
}
