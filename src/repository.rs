pub mod in_memory;
pub mod nexus;

use async_trait::async_trait;

use crate::maven::artifact::Artifact;
use crate::query::SearchCriteria;
use crate::util::blob::Blob;

/// Executes search criteria against a repository.
///
/// Implementations should populate the repository id of the returned artifacts whenever it is
///  known: it is part of the identity used for grouping versions.
#[async_trait]
pub trait Searcher: Send + Sync {
    async fn search(&self, criteria: &SearchCriteria) -> anyhow::Result<Vec<Artifact>>;
}

/// Resolves a fully qualified artifact (typically from a previous search) to its content.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, artifact: &Artifact) -> anyhow::Result<Blob>;
}
