use std::fmt::{Display, Formatter};

use crate::maven::coordinates::{split_repository_suffix, CoordinateQuery, Coordinates};

/// What to ask a repository for.
///
/// `InRepository` always wraps a criterion that is not itself `InRepository`; use
///  `SearchCriteria::in_repository` to build it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    All,
    ByKeyword(String),
    ByCoordinates(Coordinates),
    InRepository {
        repository_id: String,
        criteria: Box<SearchCriteria>,
    },
}

impl SearchCriteria {
    /// Scopes `criteria` to a repository. Nested scopes are flattened: the outermost repository
    ///  id wins and the innermost unscoped criterion is kept.
    pub fn in_repository(repository_id: impl Into<String>, criteria: SearchCriteria) -> SearchCriteria {
        SearchCriteria::InRepository {
            repository_id: repository_id.into(),
            criteria: Box::new(criteria.unscoped().clone()),
        }
    }

    /// Turns a free-form search query into criteria; this never fails:
    ///  * "" -> All
    ///  * "@repo" -> All in repo
    ///  * a valid g:a[:e[:c]]:v string (with optional @repo) -> coordinates
    ///  * anything else -> keyword, scoped if there is an '@' suffix
    ///
    /// NB: the query is split at its last '@', so a keyword containing '@' is read as having a
    ///  repository suffix.
    pub fn resolve(query: &str) -> SearchCriteria {
        if query.is_empty() {
            return SearchCriteria::All;
        }

        if query.contains(':') {
            if let Ok(coordinate_query) = CoordinateQuery::parse(query) {
                return coordinate_query.to_criteria();
            }
        }

        let (keyword, repository_id) = split_repository_suffix(query);
        let criteria = if keyword.is_empty() {
            SearchCriteria::All
        }
        else {
            SearchCriteria::ByKeyword(keyword.to_string())
        };

        match repository_id {
            Some(repository_id) => SearchCriteria::in_repository(repository_id, criteria),
            None => criteria,
        }
    }

    pub fn repository_id(&self) -> Option<&str> {
        match self {
            SearchCriteria::InRepository { repository_id, .. } => Some(repository_id),
            _ => None,
        }
    }

    /// the criterion without any repository scope
    pub fn unscoped(&self) -> &SearchCriteria {
        match self {
            SearchCriteria::InRepository { criteria, .. } => criteria.unscoped(),
            other => other,
        }
    }
}

impl Display for SearchCriteria {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchCriteria::All => write!(f, "*"),
            SearchCriteria::ByKeyword(keyword) => write!(f, "{}", keyword),
            SearchCriteria::ByCoordinates(coordinates) => write!(f, "{}", coordinates),
            SearchCriteria::InRepository { repository_id, criteria } => write!(f, "{}@{}", criteria, repository_id),
        }
    }
}
