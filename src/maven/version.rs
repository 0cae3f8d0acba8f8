use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;
use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};

lazy_static! {
    // any number of numeric segments, then an optional pre-release (after '-' or starting with a
    //  letter) and optional build metadata
    static ref LENIENT_VERSION_REGEX: Regex = Regex::new(
        r"^v?(\d+(?:\.\d+)*)(?:-([0-9A-Za-z][0-9A-Za-z.\-]*)|([A-Za-z][0-9A-Za-z.\-]*))?(?:\+([0-9A-Za-z][0-9A-Za-z.\-]*))?$"
    ).unwrap();
}

/// The semantic version derived from an artifact's raw version string.
///
/// Artifact repositories happily host versions that are not semantic versions at all
///  (e.g. "4.1.3.RELEASE"), so failing to parse is an expected outcome rather than an error.
///  An unparseable version sorts after every valid version and compares equal to every other
///  unparseable version.
///
/// Versions with more than three numeric segments ("1.2.3.4") are valid: the segments beyond
///  patch are kept separately and take part in precedence after patch, with trailing zeros
///  dropped so that "1.2.3.0" equals "1.2.3".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedVersion {
    Valid(Version, Vec<u64>),
    Unparseable,
}

impl ParsedVersion {
    pub fn parse(raw: &str) -> ParsedVersion {
        match parse_lenient(raw) {
            Some((version, extra)) => ParsedVersion::Valid(version, extra),
            None => ParsedVersion::Unparseable,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ParsedVersion::Valid(..))
    }
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ParsedVersion::Valid(a, a_extra), ParsedVersion::Valid(b, b_extra)) => cmp_precedence(a, a_extra, b, b_extra),
            (ParsedVersion::Valid(..), ParsedVersion::Unparseable) => Ordering::Less,
            (ParsedVersion::Unparseable, ParsedVersion::Valid(..)) => Ordering::Greater,
            (ParsedVersion::Unparseable, ParsedVersion::Unparseable) => Ordering::Equal,
        }
    }
}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for ParsedVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParsedVersion::Valid(v, extra) => {
                write!(f, "{}.{}.{}", v.major, v.minor, v.patch)?;
                for segment in extra {
                    write!(f, ".{}", segment)?;
                }
                if !v.pre.is_empty() {
                    write!(f, "-{}", v.pre)?;
                }
                if !v.build.is_empty() {
                    write!(f, "+{}", v.build)?;
                }
                Ok(())
            }
            ParsedVersion::Unparseable => write!(f, "<unparseable>"),
        }
    }
}

/// build metadata does not take part in precedence
fn cmp_precedence(a: &Version, a_extra: &[u64], b: &Version, b_extra: &[u64]) -> Ordering {
    (a.major, a.minor, a.patch, a_extra, &a.pre).cmp(&(b.major, b.minor, b.patch, b_extra, &b.pre))
}

fn parse_lenient(raw: &str) -> Option<(Version, Vec<u64>)> {
    let captures = LENIENT_VERSION_REGEX.captures(raw)?;

    let mut segments = captures.get(1)?.as_str()
        .split('.')
        .map(|s| s.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    if segments.len() < 3 {
        segments.resize(3, 0);
    }
    let mut extra = segments.split_off(3);
    while extra.last() == Some(&0) {
        extra.pop();
    }

    let pre = match captures.get(2).or_else(|| captures.get(3)) {
        Some(m) => Prerelease::new(m.as_str()).ok()?,
        None => Prerelease::EMPTY,
    };
    let build = match captures.get(4) {
        Some(m) => BuildMetadata::new(m.as_str()).ok()?,
        None => BuildMetadata::EMPTY,
    };

    Some((Version {
        major: segments[0],
        minor: segments[1],
        patch: segments[2],
        pre,
        build,
    }, extra))
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    #[rstest]
    #[case::full("1.2.3", Some("1.2.3"))]
    #[case::major_minor("1.0", Some("1.0.0"))]
    #[case::major_only("7", Some("7.0.0"))]
    #[case::v_prefix("v2.1.0", Some("2.1.0"))]
    #[case::leading_zero("1.02.3", Some("1.2.3"))]
    #[case::pre_release("2.0.0-SNAPSHOT", Some("2.0.0-SNAPSHOT"))]
    #[case::pre_release_dotted("1.0.0-rc.1", Some("1.0.0-rc.1"))]
    #[case::pre_release_without_dash("1.0.0RC1", Some("1.0.0-RC1"))]
    #[case::short_with_pre_release("1.0-SNAPSHOT", Some("1.0.0-SNAPSHOT"))]
    #[case::build_metadata("1.0.0+build.5", Some("1.0.0+build.5"))]
    #[case::four_segments("4.1.3.RELEASE", None)]
    #[case::garbage("not-a-version", None)]
    #[case::empty("", None)]
    #[case::surrounding_whitespace(" 1.0.0 ", None)]
    #[case::pre_release_leading_zero("1.0.0-01", None)]
    fn test_parse(#[case] raw: &str, #[case] expected: Option<&str>) {
        let actual = ParsedVersion::parse(raw);
        match expected {
            Some(expected) => assert_eq!(actual, ParsedVersion::Valid(Version::parse(expected).unwrap(), vec![])),
            None => assert_eq!(actual, ParsedVersion::Unparseable),
        }
    }

    #[rstest]
    #[case::four_numeric("1.2.3.4", "1.2.3.4")]
    #[case::five_numeric("1.2.3.4.5", "1.2.3.4.5")]
    #[case::trailing_zeros_dropped("1.2.3.4.0", "1.2.3.4")]
    #[case::all_extra_zero("1.2.3.0", "1.2.3")]
    #[case::with_pre_release("1.2.3.4-SNAPSHOT", "1.2.3.4-SNAPSHOT")]
    fn test_parse_many_segments(#[case] raw: &str, #[case] expected_display: &str) {
        let actual = ParsedVersion::parse(raw);
        assert!(actual.is_valid());
        assert_eq!(actual.to_string(), expected_display);
    }

    #[rstest]
    #[case::patch("1.0.0", "1.0.1", Ordering::Less)]
    #[case::numeric_not_lexical("1.10.0", "1.9.0", Ordering::Greater)]
    #[case::snapshot_before_release("2.0.0-SNAPSHOT", "2.0.0", Ordering::Less)]
    #[case::padded_equal("1.0", "1.0.0", Ordering::Equal)]
    #[case::build_ignored("1.0.0+a", "1.0.0+b", Ordering::Equal)]
    #[case::unparseable_last("not-a-version", "999.0.0", Ordering::Greater)]
    #[case::valid_before_unparseable("0.0.1", "x.y", Ordering::Less)]
    #[case::unparseable_equal("foo", "bar", Ordering::Equal)]
    #[case::fourth_segment("1.2.3.4", "1.2.3", Ordering::Greater)]
    #[case::fourth_segment_numeric("1.2.3.10", "1.2.3.9", Ordering::Greater)]
    #[case::fourth_segment_below_patch("1.2.3.9", "1.2.4", Ordering::Less)]
    #[case::trailing_zero_equal("1.2.3.0", "1.2.3", Ordering::Equal)]
    #[case::fourth_segment_pre_release("1.2.3.4-SNAPSHOT", "1.2.3.4", Ordering::Less)]
    fn test_ordering(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(ParsedVersion::parse(a).cmp(&ParsedVersion::parse(b)), expected);
        assert_eq!(ParsedVersion::parse(b).cmp(&ParsedVersion::parse(a)), expected.reverse());
    }
}
