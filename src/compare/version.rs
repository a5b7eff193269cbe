// src/compare/version.rs
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

static VERSION_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{12}").expect("Failed to compile VERSION_TOKEN_RE"));

/// Reads the `YYYYMMDDHHMM` token out of a version filename.
/// `None` when there is no token or it is not a valid date.
pub fn parse_version_timestamp(filename: &str) -> Option<NaiveDateTime> {
    let token = VERSION_TOKEN_RE.find(filename)?;
    NaiveDateTime::parse_from_str(token.as_str(), "%Y%m%d%H%M").ok()
}

/// Display form used in listings, e.g. "2024-05-06 15:30".
pub fn format_version_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Sorts oldest to newest by filename token. Untimestamped entries count as
/// the earliest; equal timestamps keep their original order.
pub fn sort_chronologically<T, F>(items: &mut [T], filename: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|item| parse_version_timestamp(filename(item)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token() {
        let ts = parse_version_timestamp("C-1/Output/202405061530-C-1-LCP.pdf").unwrap();
        assert_eq!(format_version_timestamp(&ts), "2024-05-06 15:30");
        assert_eq!(parse_version_timestamp("C-1-LCP.pdf"), None);
        // 13th month is not a date
        assert_eq!(parse_version_timestamp("202413061530-LCP.pdf"), None);
    }

    #[test]
    fn test_sort_is_stable_and_missing_first() {
        let mut names = vec![
            "202402011200-b-LCP.pdf",
            "202401011200-a-LCP.pdf",
            "undated-LCP.pdf",
            "202402011200-c-LCP.pdf",
        ];
        sort_chronologically(&mut names, |n| *n);
        assert_eq!(
            names,
            vec![
                "undated-LCP.pdf",
                "202401011200-a-LCP.pdf",
                "202402011200-b-LCP.pdf",
                "202402011200-c-LCP.pdf",
            ]
        );
    }
}
