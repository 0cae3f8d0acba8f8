use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use crate::error::QueryError;
use crate::maven::coordinates::CoordinateQuery;
use crate::maven::version::ParsedVersion;

pub const POM_EXTENSION: &str = "pom";
pub const SNAPSHOT_SUFFIX: &str = "SNAPSHOT";

/// A single artifact as reported by a repository. The semantic version is derived once when the
///  artifact is created; artifacts are never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    group_id: String,
    artifact_id: String,
    version: String,
    classifier: String,
    extension: String,
    repository_id: String,
    parsed_version: ParsedVersion,
}

/// Identity of all versions of "the same" artifact, used for finding the latest version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordinateGroupKey<'a> {
    pub group_id: &'a str,
    pub artifact_id: &'a str,
    pub extension: &'a str,
    pub classifier: &'a str,
    pub repository_id: &'a str,
}

impl Artifact {
    /// Surrounding whitespace is stripped from the version, so snapshot detection and the
    ///  semantic version always see the same string.
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>, version: impl Into<String>) -> Artifact {
        let version = version.into().trim().to_string();
        let parsed_version = ParsedVersion::parse(&version);
        Artifact {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version,
            classifier: String::new(),
            extension: String::new(),
            repository_id: String::new(),
            parsed_version,
        }
    }

    pub fn with_extension(self, extension: impl Into<String>) -> Artifact {
        Artifact { extension: extension.into(), ..self }
    }

    pub fn with_classifier(self, classifier: impl Into<String>) -> Artifact {
        Artifact { classifier: classifier.into(), ..self }
    }

    pub fn with_repository_id(self, repository_id: impl Into<String>) -> Artifact {
        Artifact { repository_id: repository_id.into(), ..self }
    }

    /// Builds an artifact from a `g:a[:e[:c]]:v[@repository]` string; fields that the string does
    ///  not carry are left empty.
    pub fn parse(raw: &str) -> Result<Artifact, QueryError> {
        let query = CoordinateQuery::parse(raw)?;
        let coordinates = query.coordinates;
        Ok(Artifact::new(coordinates.group_id, coordinates.artifact_id, coordinates.version)
            .with_extension(coordinates.extension.unwrap_or_default())
            .with_classifier(coordinates.classifier.unwrap_or_default())
            .with_repository_id(query.repository_id.unwrap_or_default()))
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }
    pub fn version(&self) -> &str {
        &self.version
    }
    pub fn classifier(&self) -> &str {
        &self.classifier
    }
    pub fn extension(&self) -> &str {
        &self.extension
    }
    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }
    pub fn parsed_version(&self) -> &ParsedVersion {
        &self.parsed_version
    }

    pub fn is_snapshot(&self) -> bool {
        self.version.ends_with(SNAPSHOT_SUFFIX)
    }

    pub fn is_pom(&self) -> bool {
        self.extension == POM_EXTENSION
    }

    pub fn group_key(&self) -> CoordinateGroupKey<'_> {
        CoordinateGroupKey {
            group_id: &self.group_id,
            artifact_id: &self.artifact_id,
            extension: &self.extension,
            classifier: &self.classifier,
            repository_id: &self.repository_id,
        }
    }

    /// compares the semantic versions only, unparseable versions last
    pub fn cmp_version(&self, other: &Artifact) -> Ordering {
        self.parsed_version.cmp(&other.parsed_version)
    }

    pub fn less_than(&self, other: &Artifact) -> bool {
        self.cmp_version(other) == Ordering::Less
    }

    pub fn greater_than(&self, other: &Artifact) -> bool {
        self.cmp_version(other) == Ordering::Greater
    }

    /// Equality of the semantic version, nothing else.
    pub fn version_eq(&self, other: &Artifact) -> bool {
        self.cmp_version(other) == Ordering::Equal
    }
}

/// Maven style coordinates (http://maven.apache.org/pom.html#Maven_Coordinates) plus the
///  repository
impl Display for Artifact {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}@{}", self.version, self.repository_id)
    }
}
