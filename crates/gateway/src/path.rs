//! Bundle URL parsing.
//!
//! `GET /aws-sdk-<version>[.min].js?<query>` where `<version>` is `latest`
//! or `v<digit>...`, and the query lists services.

/// Version and flavour named by a bundle file name, e.g.
/// `aws-sdk-v2.0.0.min.js` → `("v2.0.0", true)`.
pub fn parse_bundle_path(file: &str) -> Option<(&str, bool)> {
    let stem = file.strip_prefix("aws-sdk-")?.strip_suffix(".js")?;

    if let Some(version) = stem.strip_suffix(".min")
        && is_version(version)
    {
        return Some((version, true));
    }
    is_version(stem).then_some((stem, false))
}

fn is_version(version: &str) -> bool {
    if version == sdkpack_core::LATEST {
        return true;
    }
    let mut chars = version.chars();
    chars.next() == Some('v')
        && chars.next().is_some_and(|c| c.is_ascii_digit())
        && chars.next().is_some()
}

/// Turn a query string into a request spec.
///
/// `s3&dynamodb=2012-08-10` → `s3,dynamodb-2012-08-10`. A bare key or an
/// empty value names the service alone. `None` when nothing is named, so the
/// default list applies.
pub fn query_to_spec(query: Option<&str>) -> Option<String> {
    let tokens: Vec<String> = query?
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, "")) => key.to_string(),
            Some((key, value)) => format!("{key}-{value}"),
            None => pair.to_string(),
        })
        .collect();

    (!tokens.is_empty()).then(|| tokens.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_paths() {
        assert_eq!(parse_bundle_path("aws-sdk-latest.js"), Some(("latest", false)));
        assert_eq!(parse_bundle_path("aws-sdk-latest.min.js"), Some(("latest", true)));
        assert_eq!(parse_bundle_path("aws-sdk-v2.0.0.js"), Some(("v2.0.0", false)));
        assert_eq!(parse_bundle_path("aws-sdk-v2.0.0.min.js"), Some(("v2.0.0", true)));
    }

    #[test]
    fn rejects_other_paths() {
        assert_eq!(parse_bundle_path("aws-sdk-2.0.0.js"), None);
        assert_eq!(parse_bundle_path("aws-sdk-vx.js"), None);
        assert_eq!(parse_bundle_path("aws-sdk-v2.js"), None);
        assert_eq!(parse_bundle_path("aws-sdk-latest.css"), None);
        assert_eq!(parse_bundle_path("favicon.ico"), None);
    }

    #[test]
    fn short_version_absorbs_min_suffix() {
        // `v2` alone is too short, so `.min` stays part of the version
        assert_eq!(parse_bundle_path("aws-sdk-v2.min.js"), Some(("v2.min", false)));
    }

    #[test]
    fn query_conversion() {
        assert_eq!(
            query_to_spec(Some("s3&dynamodb=2012-08-10")).as_deref(),
            Some("s3,dynamodb-2012-08-10")
        );
        assert_eq!(query_to_spec(Some("sqs=&&sns")).as_deref(), Some("sqs,sns"));
        assert_eq!(query_to_spec(Some("")), None);
        assert_eq!(query_to_spec(None), None);
    }

    #[test]
    fn query_passes_through_unvalidated() {
        // Validation is the engine's job
        assert_eq!(query_to_spec(Some("s3;rm")).as_deref(), Some("s3;rm"));
    }
}
