use std::path::{Path, PathBuf};

use crate::maven::artifact::Artifact;

/// The artifact's path relative to the root of a maven repository, i.e. something like
///  "org/example/lib/1.0/lib-1.0-sources.jar"
pub fn as_maven_path(artifact: &Artifact) -> String {
    format!(
        "{}/{}/{}/{}",
        artifact.group_id().replace('.', "/"),
        artifact.artifact_id(),
        artifact.version(),
        maven_file_name(artifact),
    )
}

/// <artifactId>-<version>[-<classifier>][.<extension>]
pub fn maven_file_name(artifact: &Artifact) -> String {
    let classifier_string = match artifact.classifier() {
        "" => "".to_string(),
        c => format!("-{}", c),
    };
    let extension_string = match artifact.extension() {
        "" => "".to_string(),
        e => format!(".{}", e),
    };

    format!("{}-{}{}{}",
            artifact.artifact_id(),
            artifact.version(),
            classifier_string,
            extension_string,
    )
}

/// Local destination for an artifact when several are downloaded at once:
///  `<root>/<groupId>/<artifactId>/<version>/<file name>`. NB: the group id is *not* split at
///  '.' here, in contrast to a repository layout.
pub fn download_path(root: &Path, artifact: &Artifact, file_name: &str) -> PathBuf {
    let mut result = root.to_path_buf();
    result.push(artifact.group_id());
    result.push(artifact.artifact_id());
    result.push(artifact.version());
    result.push(file_name);
    result
}

/// last path segment of a download location (URL or path), without any query string
pub fn file_name_from_location(location: &str) -> &str {
    let without_query = match location.find(['?', '#']) {
        Some(pos) => &location[..pos],
        None => location,
    };
    let trimmed = without_query.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(last_slash) => &trimmed[last_slash + 1..],
        None => trimmed,
    }
}
