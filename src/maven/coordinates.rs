use std::fmt::{Display, Formatter};

use crate::error::QueryError;
use crate::query::SearchCriteria;

/// Coordinates as supplied by a user. Extension and classifier are only present if the
///  coordinate string had enough segments to carry them.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Coordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub extension: Option<String>,
    pub classifier: Option<String>,
    pub version: String,
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if let Some(extension) = &self.extension {
            write!(f, ":{}", extension)?;
        }
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

/// A parsed `g:a[:e[:c]]:v[@repository]` string.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct CoordinateQuery {
    pub coordinates: Coordinates,
    pub repository_id: Option<String>,
}

impl CoordinateQuery {
    /// Accepts 3 (g:a:v), 4 (g:a:e:v) or 5 (g:a:e:c:v) colon separated segments, optionally
    ///  followed by '@' and a repository id. The string is split at the *last* '@'.
    pub fn parse(raw: &str) -> Result<CoordinateQuery, QueryError> {
        let (coords, repository_id) = split_repository_suffix(raw);

        let parts: Vec<&str> = coords.split(':').collect();
        let coordinates = match parts.as_slice() {
            [group_id, artifact_id, version] => Coordinates {
                group_id: group_id.to_string(),
                artifact_id: artifact_id.to_string(),
                extension: None,
                classifier: None,
                version: version.to_string(),
            },
            [group_id, artifact_id, extension, version] => Coordinates {
                group_id: group_id.to_string(),
                artifact_id: artifact_id.to_string(),
                extension: Some(extension.to_string()),
                classifier: None,
                version: version.to_string(),
            },
            [group_id, artifact_id, extension, classifier, version] => Coordinates {
                group_id: group_id.to_string(),
                artifact_id: artifact_id.to_string(),
                extension: Some(extension.to_string()),
                classifier: Some(classifier.to_string()),
                version: version.to_string(),
            },
            _ => {
                return Err(QueryError::InvalidCoordinateString {
                    input: raw.to_string(),
                    segments: parts.len(),
                });
            }
        };

        Ok(CoordinateQuery {
            coordinates,
            repository_id: repository_id.map(|s| s.to_string()),
        })
    }

    pub fn to_criteria(&self) -> SearchCriteria {
        let criteria = SearchCriteria::ByCoordinates(self.coordinates.clone());
        match &self.repository_id {
            Some(repository_id) => SearchCriteria::in_repository(repository_id, criteria),
            None => criteria,
        }
    }
}

/// Splits `text@repository` at the last '@'. An empty repository id counts as absent.
pub fn split_repository_suffix(raw: &str) -> (&str, Option<&str>) {
    match raw.rfind('@') {
        Some(pos) => {
            let repository_id = &raw[pos + 1..];
            if repository_id.is_empty() {
                (&raw[..pos], None)
            }
            else {
                (&raw[..pos], Some(repository_id))
            }
        }
        None => (raw, None),
    }
}
