use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::download::write_blob;
use crate::error::QueryError;
use crate::filter::FilterOptions;
use crate::maven::artifact::Artifact;
use crate::maven::coordinates::CoordinateQuery;
use crate::maven::paths::{download_path, file_name_from_location};
use crate::query::SearchCriteria;
use crate::repository::{Fetcher, Searcher};

/// What to do when one artifact of a multi-artifact download fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchPolicy {
    /// stop at the first failure and return it as the error
    #[default]
    #[serde(alias = "abort-on-first-failure")]
    Abort,
    /// download everything possible and list the failures in the report
    #[serde(alias = "continue-and-report")]
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// exactly one artifact, written to this file
    File(PathBuf),
    /// any number of artifacts, each written to `<root>/<groupId>/<artifactId>/<version>/<file name>`
    Layout(PathBuf),
}

#[derive(Debug, Clone)]
pub struct GetOptions {
    pub filter: FilterOptions,
    pub destination: Destination,
    pub batch_policy: BatchPolicy,
}

/// Result of a search. A failed search has no artifacts *and* an error, a search without
///  matches has no artifacts and no error.
#[derive(Debug)]
pub struct SearchOutcome {
    pub criteria: SearchCriteria,
    pub artifacts: Vec<Artifact>,
    pub error: Option<QueryError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub artifact: Artifact,
    pub path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Default)]
pub struct DownloadReport {
    pub downloaded: Vec<Downloaded>,
    pub failed: Vec<(Artifact, QueryError)>,
}
impl DownloadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs queries against a repository backend: query string -> criteria -> search -> filter, and
///  for `get` fetching and writing the surviving artifacts. Searching only requires a `Searcher`,
///  getting requires a `Fetcher` as well.
pub struct QueryOrchestrator<R> {
    repository: R,
}

impl<R> QueryOrchestrator<R> {
    pub fn new(repository: R) -> QueryOrchestrator<R> {
        QueryOrchestrator { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

impl<R: Searcher> QueryOrchestrator<R> {
    /// Backend failures do not fail the search: they are logged and reported in the outcome
    ///  together with an empty result.
    pub async fn search(&self, query: &str, filter: &FilterOptions) -> SearchOutcome {
        let criteria = SearchCriteria::resolve(query);
        info!("searching for {}", criteria);

        match self.repository.search(&criteria).await {
            Ok(artifacts) => SearchOutcome {
                artifacts: filter.apply(&artifacts),
                criteria,
                error: None,
            },
            Err(source) => {
                let e = QueryError::Backend {
                    operation: format!("search for {}", criteria),
                    source,
                };
                error!("{}", e);
                SearchOutcome {
                    criteria,
                    artifacts: Vec::new(),
                    error: Some(e),
                }
            }
        }
    }

    /// Parses a full coordinate string and returns the filtered matches, at least one.
    pub async fn resolve(&self, gav: &str, filter: &FilterOptions) -> Result<Vec<Artifact>, QueryError> {
        let criteria = CoordinateQuery::parse(gav)?.to_criteria();
        info!("resolving {}", criteria);

        let artifacts = self.repository.search(&criteria).await
            .map_err(|source| QueryError::Backend {
                operation: format!("search for {}", criteria),
                source,
            })?;

        let artifacts = filter.apply(&artifacts);
        if artifacts.is_empty() {
            return Err(QueryError::NoMatchingArtifact { query: gav.to_string() });
        }
        Ok(artifacts)
    }
}

impl<R: Searcher + Fetcher> QueryOrchestrator<R> {
    pub async fn get(&self, gav: &str, options: &GetOptions) -> Result<DownloadReport, QueryError> {
        let artifacts = self.resolve(gav, &options.filter).await?;
        info!("{} matching artifact(s) for {}", artifacts.len(), gav);

        match &options.destination {
            Destination::File(path) => {
                if artifacts.len() != 1 {
                    return Err(QueryError::AmbiguousMatch { query: gav.to_string(), count: artifacts.len() });
                }
                let downloaded = self.download(&artifacts[0], |_| path.clone()).await?;
                Ok(DownloadReport { downloaded: vec![downloaded], failed: Vec::new() })
            }
            Destination::Layout(root) => {
                let mut report = DownloadReport::default();
                for artifact in artifacts {
                    let result = self.download(&artifact, |location| {
                        download_path(root, &artifact, file_name_from_location(location))
                    }).await;

                    match result {
                        Ok(downloaded) => report.downloaded.push(downloaded),
                        Err(e) => match options.batch_policy {
                            BatchPolicy::Abort => return Err(e),
                            BatchPolicy::Continue => {
                                error!("{}", e);
                                report.failed.push((artifact, e));
                            }
                        },
                    }
                }
                Ok(report)
            }
        }
    }

    async fn download(&self, artifact: &Artifact, destination: impl FnOnce(&str) -> PathBuf) -> Result<Downloaded, QueryError> {
        let blob = self.repository.fetch(artifact).await
            .map_err(|source| QueryError::Backend {
                operation: format!("fetch of {}", artifact),
                source,
            })?;
        info!("downloading {}", blob.location);

        let path = destination(&blob.location);
        let bytes = write_blob(blob, &path).await?;
        Ok(Downloaded {
            artifact: artifact.clone(),
            path,
            bytes,
        })
    }
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::*;
    use crate::repository::in_memory::InMemoryRepository;

    fn jar(version: &str) -> Artifact {
        Artifact::new("org.example", "lib", version).with_extension("jar").with_repository_id("releases")
    }

    fn repo() -> InMemoryRepository {
        InMemoryRepository::new()
            .with_artifact(jar("1.0.0"), "one")
            .with_artifact(jar("1.2.0"), "one-two")
            .with_artifact(jar("1.2.0").with_classifier("sources"), "one-two-sources")
            .with_artifact(Artifact::new("org.example", "lib", "1.2.0").with_extension("pom").with_repository_id("releases"), "<project/>")
            .with_artifact(jar("2.0.0-SNAPSHOT").with_repository_id("snapshots"), "snapshot")
    }

    fn layout(root: &Path) -> GetOptions {
        GetOptions {
            filter: FilterOptions::default(),
            destination: Destination::Layout(root.to_path_buf()),
            batch_policy: BatchPolicy::Abort,
        }
    }

    #[tokio::test]
    async fn test_search_filters() {
        let orchestrator = QueryOrchestrator::new(repo());

        let outcome = orchestrator.search("lib", &FilterOptions::default()).await;
        assert!(outcome.error.is_none());
        assert_eq!(outcome.artifacts.len(), 4);

        let outcome = orchestrator.search("lib", &FilterOptions { latest: true, ..Default::default() }).await;
        assert_eq!(outcome.artifacts, vec![jar("1.2.0"), jar("1.2.0").with_classifier("sources")]);

        let outcome = orchestrator.search("lib@snapshots", &FilterOptions::default()).await;
        assert_eq!(outcome.criteria, SearchCriteria::in_repository("snapshots", SearchCriteria::ByKeyword("lib".to_string())));
        assert_eq!(outcome.artifacts, vec![jar("2.0.0-SNAPSHOT").with_repository_id("snapshots")]);
    }

    #[tokio::test]
    async fn test_search_failure_is_reported_not_fatal() {
        let orchestrator = QueryOrchestrator::new(repo().failing_search());

        let outcome = orchestrator.search("lib", &FilterOptions::default()).await;
        assert!(outcome.artifacts.is_empty());
        assert!(matches!(outcome.error, Some(QueryError::Backend { .. })));

        let outcome = QueryOrchestrator::new(repo()).search("nothing-matches", &FilterOptions::default()).await;
        assert!(outcome.artifacts.is_empty());
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_get_invalid_coordinates_does_not_search() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = QueryOrchestrator::new(repo());

        let result = orchestrator.get("org.example:lib", &layout(dir.path())).await;
        assert!(matches!(result, Err(QueryError::InvalidCoordinateString { .. })));
        assert_eq!(orchestrator.repository().search_count(), 0);
    }

    #[tokio::test]
    async fn test_get_search_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = QueryOrchestrator::new(repo().failing_search());

        let result = orchestrator.get("org.example:lib:1.0.0", &layout(dir.path())).await;
        assert!(matches!(result, Err(QueryError::Backend { .. })));
    }

    #[tokio::test]
    async fn test_get_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = QueryOrchestrator::new(repo());

        let result = orchestrator.get("org.example:lib:9.9.9", &layout(dir.path())).await;
        assert!(matches!(result, Err(QueryError::NoMatchingArtifact { .. })));

        // only a pom matches, and poms are excluded by default
        let result = orchestrator.get("org.example:lib:pom:1.2.0", &layout(dir.path())).await;
        assert!(matches!(result, Err(QueryError::NoMatchingArtifact { .. })));
    }

    #[tokio::test]
    async fn test_get_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("lib.jar");
        let options = GetOptions {
            destination: Destination::File(out.clone()),
            ..layout(dir.path())
        };

        let report = QueryOrchestrator::new(repo()).get("org.example:lib:jar:1.0.0@releases", &options).await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.downloaded, vec![Downloaded { artifact: jar("1.0.0"), path: out.clone(), bytes: 3 }]);
        assert_eq!(std::fs::read(&out).unwrap(), b"one");
    }

    #[tokio::test]
    async fn test_get_single_file_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("lib.jar");
        let options = GetOptions {
            destination: Destination::File(out.clone()),
            ..layout(dir.path())
        };

        let result = QueryOrchestrator::new(repo()).get("org.example:lib:1.2.0", &options).await;
        assert!(matches!(result, Err(QueryError::AmbiguousMatch { count: 2, .. })));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_get_layout() {
        let dir = tempfile::tempdir().unwrap();

        let report = QueryOrchestrator::new(repo()).get("org.example:lib:1.2.0", &layout(dir.path())).await.unwrap();
        assert_eq!(report.downloaded.len(), 2);

        let version_dir = dir.path().join("org.example").join("lib").join("1.2.0");
        assert_eq!(std::fs::read(version_dir.join("lib-1.2.0.jar")).unwrap(), b"one-two");
        assert_eq!(std::fs::read(version_dir.join("lib-1.2.0-sources.jar")).unwrap(), b"one-two-sources");
        assert!(!version_dir.join("lib-1.2.0.pom").exists());
    }

    #[tokio::test]
    async fn test_get_batch_abort() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = QueryOrchestrator::new(repo().failing_fetch(&jar("1.2.0")));

        let result = orchestrator.get("org.example:lib:1.2.0", &layout(dir.path())).await;
        assert!(matches!(result, Err(QueryError::Backend { .. })));
        assert!(!dir.path().join("org.example").join("lib").join("1.2.0").join("lib-1.2.0-sources.jar").exists());
    }

    #[tokio::test]
    async fn test_get_batch_continue() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = QueryOrchestrator::new(repo().failing_fetch(&jar("1.2.0")));
        let options = GetOptions {
            batch_policy: BatchPolicy::Continue,
            ..layout(dir.path())
        };

        let report = orchestrator.get("org.example:lib:1.2.0", &options).await.unwrap();
        assert!(!report.is_complete());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, jar("1.2.0"));
        assert_eq!(report.downloaded.len(), 1);
        assert_eq!(report.downloaded[0].artifact, jar("1.2.0").with_classifier("sources"));
    }
}
