use crate::api::errors::RankingError;

/// Decoded path patterns, each confirmed to compile as a regular expression.
///
/// Only the confirmed strings are forwarded to the reporting service, so what
/// was validated is exactly what gets sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    patterns: Vec<String>,
}

impl PathFilter {
    /// Split `includes_paths` on `,`, percent-decode each segment and check it compiles.
    ///
    /// Empty segments are skipped; an absent or empty parameter yields an empty
    /// filter, which means "no path restriction".
    pub fn parse(includes_paths: &str) -> Result<Self, RankingError> {
        let patterns = includes_paths
            .split(',')
            .filter(|segment| !segment.is_empty())
            .map(confirm_pattern)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn confirm_pattern(segment: &str) -> Result<String, RankingError> {
    if let Some(at) = malformed_escape(segment) {
        return Err(RankingError::PathFilter(format!(
            "{segment:?} has a malformed percent escape at byte {at}"
        )));
    }
    let decoded = urlencoding::decode(segment)
        .map_err(|e| RankingError::PathFilter(format!("{segment:?} is not valid UTF-8: {e}")))?
        .into_owned();
    regex::Regex::new(&decoded)
        .map_err(|e| RankingError::PathFilter(format!("{decoded:?}: {e}")))?;
    Ok(decoded)
}

/// Position of the first `%` not followed by two hex digits.
fn malformed_escape(segment: &str) -> Option<usize> {
    let bytes = segment.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'%')
        .map(|(i, _)| i)
        .find(|&i| {
            !matches!(
                bytes.get(i + 1..i + 3),
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
            )
        })
}
