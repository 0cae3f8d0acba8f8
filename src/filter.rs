use std::collections::HashMap;

use clap::Args;
use tracing::warn;

use crate::maven::artifact::Artifact;

/// Narrowing and ordering of a search result.
///
/// The reductions are always applied in the same order: POM exclusion, latest, release,
///  snapshot. Every step returns a new list; the input is never modified.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Only show snapshots
    #[arg(long)]
    pub snapshot: bool,

    /// Only show releases
    #[arg(long)]
    pub release: bool,

    /// Only show the latest (semver) version of each artifact, implies release versions
    #[arg(long)]
    pub latest: bool,

    /// Show pom results
    #[arg(long)]
    pub pom: bool,
}

impl FilterOptions {
    pub fn apply(&self, artifacts: &[Artifact]) -> Vec<Artifact> {
        let mut result = if self.pom {
            artifacts.to_vec()
        }
        else {
            exclude_pom(artifacts)
        };

        if self.latest {
            result = latest(&result);
        }
        if self.release {
            result = releases(&result);
        }
        if self.snapshot {
            result = snapshots(&result);
        }
        result
    }
}

pub fn exclude_pom(artifacts: &[Artifact]) -> Vec<Artifact> {
    artifacts.iter()
        .filter(|a| !a.is_pom())
        .cloned()
        .collect()
}

/// Release versions, sorted by semantic version. Release versions that are not semantic versions
///  are dropped since they can not be ordered.
pub fn releases(artifacts: &[Artifact]) -> Vec<Artifact> {
    let result = artifacts.iter()
        .filter(|a| !a.is_snapshot())
        .filter(|a| {
            if a.parsed_version().is_valid() {
                true
            }
            else {
                warn!("could not parse version from {}", a);
                false
            }
        })
        .cloned()
        .collect();
    sort_by_version(result)
}

/// Snapshot versions in input order - snapshot identifiers are not ordered by semver.
pub fn snapshots(artifacts: &[Artifact]) -> Vec<Artifact> {
    artifacts.iter()
        .filter(|a| a.is_snapshot())
        .cloned()
        .collect()
}

/// The highest release version for each coordinate group, sorted by semantic version. Groups
///  are collected in order of first appearance so that ties keep a deterministic order.
pub fn latest(artifacts: &[Artifact]) -> Vec<Artifact> {
    let candidates = releases(artifacts);

    let mut group_index = HashMap::new();
    let mut groups: Vec<Vec<&Artifact>> = Vec::new();
    for artifact in &candidates {
        let idx = *group_index.entry(artifact.group_key())
            .or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
        groups[idx].push(artifact);
    }

    let result = groups.into_iter()
        .filter_map(|mut group| {
            group.sort_by(|a, b| a.cmp_version(b));
            group.last().map(|a| (*a).clone())
        })
        .collect();
    sort_by_version(result)
}

/// stable sort by semantic version, unparseable versions last
pub fn sort_by_version(mut artifacts: Vec<Artifact>) -> Vec<Artifact> {
    artifacts.sort_by(|a, b| a.cmp_version(b));
    artifacts
}
