use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;

use crate::maven::artifact::Artifact;
use crate::maven::coordinates::Coordinates;
use crate::maven::paths::as_maven_path;
use crate::query::SearchCriteria;
use crate::repository::{Fetcher, Searcher};
use crate::util::blob::Blob;

/// in-memory repository, neither optimized nor particularly robust - for testing purposes
///
/// Keywords match as substrings of group or artifact id, coordinates match exactly on the fields
///  they carry.
#[derive(Default)]
pub struct InMemoryRepository {
    entries: Vec<(Artifact, Bytes)>,
    fail_search: bool,
    failing_fetches: HashSet<String>,
    search_count: AtomicUsize,
}
impl InMemoryRepository {
    pub fn new() -> InMemoryRepository {
        Default::default()
    }

    pub fn with_artifact(mut self, artifact: Artifact, data: impl Into<Bytes>) -> InMemoryRepository {
        self.entries.push((artifact, data.into()));
        self
    }

    /// every search fails with an error
    pub fn failing_search(mut self) -> InMemoryRepository {
        self.fail_search = true;
        self
    }

    /// fetching this artifact (by its display string) fails with an error
    pub fn failing_fetch(mut self, artifact: &Artifact) -> InMemoryRepository {
        self.failing_fetches.insert(artifact.to_string());
        self
    }

    pub fn search_count(&self) -> usize {
        self.search_count.load(Ordering::SeqCst)
    }

    fn matches(criteria: &SearchCriteria, artifact: &Artifact) -> bool {
        match criteria {
            SearchCriteria::All => true,
            SearchCriteria::ByKeyword(keyword) => {
                artifact.group_id().contains(keyword.as_str()) || artifact.artifact_id().contains(keyword.as_str())
            }
            SearchCriteria::ByCoordinates(coordinates) => Self::matches_coordinates(coordinates, artifact),
            SearchCriteria::InRepository { repository_id, criteria } => {
                artifact.repository_id() == repository_id.as_str() && Self::matches(criteria, artifact)
            }
        }
    }

    fn matches_coordinates(coordinates: &Coordinates, artifact: &Artifact) -> bool {
        coordinates.group_id == artifact.group_id()
            && coordinates.artifact_id == artifact.artifact_id()
            && coordinates.version == artifact.version()
            && coordinates.extension.as_deref().map_or(true, |e| e == artifact.extension())
            && coordinates.classifier.as_deref().map_or(true, |c| c == artifact.classifier())
    }
}

#[async_trait]
impl Searcher for InMemoryRepository {
    async fn search(&self, criteria: &SearchCriteria) -> anyhow::Result<Vec<Artifact>> {
        self.search_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(anyhow!("search for {} failed", criteria));
        }

        Ok(self.entries.iter()
            .filter(|(artifact, _)| Self::matches(criteria, artifact))
            .map(|(artifact, _)| artifact.clone())
            .collect())
    }
}

#[async_trait]
impl Fetcher for InMemoryRepository {
    async fn fetch(&self, artifact: &Artifact) -> anyhow::Result<Blob> {
        if self.failing_fetches.contains(&artifact.to_string()) {
            return Err(anyhow!("fetching {} failed", artifact));
        }

        let (_, data) = self.entries.iter()
            .find(|(a, _)| a == artifact)
            .ok_or_else(|| anyhow!("{} not found", artifact))?;

        let bytes = data.clone();
        let stream = futures::stream::once(async move { Ok::<_, anyhow::Error>(bytes) });
        Ok(Blob {
            location: format!("memory://{}/{}", artifact.repository_id(), as_maven_path(artifact)),
            data: Box::pin(stream),
        })
    }
}

#[cfg(test)]
mod test {
    use futures::StreamExt;
    use super::*;

    fn repo() -> InMemoryRepository {
        InMemoryRepository::new()
            .with_artifact(Artifact::new("org.example", "lib", "1.0").with_extension("jar").with_repository_id("releases"), "jar")
            .with_artifact(Artifact::new("org.example", "lib", "1.0").with_extension("jar").with_classifier("sources").with_repository_id("releases"), "src")
            .with_artifact(Artifact::new("org.example", "lib", "1.1-SNAPSHOT").with_extension("jar").with_repository_id("snapshots"), "snap")
            .with_artifact(Artifact::new("com.other", "tool", "2.0").with_extension("pom").with_repository_id("releases"), "pom")
    }

    #[tokio::test]
    async fn test_search() {
        let repo = repo();
        assert_eq!(repo.search(&SearchCriteria::All).await.unwrap().len(), 4);
        assert_eq!(repo.search(&SearchCriteria::resolve("example")).await.unwrap().len(), 3);
        assert_eq!(repo.search(&SearchCriteria::resolve("lib@snapshots")).await.unwrap().len(), 1);
        assert_eq!(repo.search(&SearchCriteria::resolve("org.example:lib:1.0")).await.unwrap().len(), 2);
        assert_eq!(repo.search(&SearchCriteria::resolve("org.example:lib:jar:sources:1.0")).await.unwrap().len(), 1);
        assert_eq!(repo.search(&SearchCriteria::resolve("nothing")).await.unwrap().len(), 0);
        assert_eq!(repo.search_count(), 6);
    }

    #[tokio::test]
    async fn test_failing_search() {
        assert!(repo().failing_search().search(&SearchCriteria::All).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch() {
        let artifact = Artifact::new("org.example", "lib", "1.0").with_extension("jar").with_classifier("sources").with_repository_id("releases");
        let mut blob = repo().fetch(&artifact).await.unwrap();
        assert_eq!(blob.location, "memory://releases/org/example/lib/1.0/lib-1.0-sources.jar");
        assert_eq!(blob.data.next().await.unwrap().unwrap(), Bytes::from("src"));
        assert!(blob.data.next().await.is_none());

        assert!(repo().fetch(&Artifact::new("x", "y", "1")).await.is_err());
        assert!(repo().failing_fetch(&artifact).fetch(&artifact).await.is_err());
    }
}
