//! Request specs: the `service[-version](,service[-version])*` grammar.

use crate::error::{Error, Result};

/// Version sentinel meaning "the service's current version".
pub const LATEST: &str = "latest";

/// Pseudo-service expanding to every known service and stable version.
pub const ALL_SERVICES: &str = "all";

/// Why a service ended up in the build. Drives the failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    /// Named by the caller; a miss fails the build.
    Explicit,
    /// Filled in from the default service list; a miss is dropped.
    Default,
    /// The dependency every bundle must carry.
    Mandatory,
}

/// One parsed `(service, version)` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub service: String,
    pub version: String,
    pub origin: RequestOrigin,
    token: String,
}

impl BuildRequest {
    pub fn new(service: impl Into<String>, version: impl Into<String>, origin: RequestOrigin) -> Self {
        let service = service.into();
        let version = version.into();
        let token = if version == LATEST {
            service.clone()
        } else {
            format!("{service}-{version}")
        };
        Self {
            service,
            version,
            origin,
            token,
        }
    }

    /// Parse `service` or `service-version`.
    ///
    /// The version is everything after the first `-`; without one the
    /// version is [`LATEST`]. A token with nothing on one side of the dash
    /// is kept whole as the service name and will not resolve.
    pub fn parse(token: &str, origin: RequestOrigin) -> Self {
        let (service, version) = match token.split_once('-') {
            Some((service, version)) if !service.is_empty() && !version.is_empty() => {
                (service, version)
            }
            _ => (token, LATEST),
        };
        Self {
            service: service.to_string(),
            version: version.to_string(),
            origin,
            token: token.to_string(),
        }
    }

    /// The token as the caller spelled it; used in missing-module reports.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_latest(&self) -> bool {
        self.version == LATEST
    }
}

/// A validated, sorted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    tokens: Vec<String>,
    origin: RequestOrigin,
}

impl RequestSpec {
    /// Validate and normalize a raw request.
    ///
    /// An absent or empty request falls back to `defaults` and is marked as
    /// [`RequestOrigin::Default`]. Tokens are sorted so that the output does
    /// not depend on the order the caller listed them in.
    pub fn parse(raw: Option<&str>, defaults: &[String]) -> Result<Self> {
        let raw = raw.unwrap_or_default();
        validate(raw)?;

        let (tokens, origin) = if raw.is_empty() {
            (defaults.to_vec(), RequestOrigin::Default)
        } else {
            (
                raw.split(',').map(str::to_string).collect(),
                RequestOrigin::Explicit,
            )
        };

        let mut tokens: Vec<String> = tokens.into_iter().filter(|t| !t.is_empty()).collect();
        tokens.sort();

        Ok(Self { tokens, origin })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn origin(&self) -> RequestOrigin {
        self.origin
    }

    pub fn is_default(&self) -> bool {
        self.origin == RequestOrigin::Default
    }
}

/// Reject anything outside `[A-Za-z0-9,-]`.
pub fn validate(raw: &str) -> Result<()> {
    if raw
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b',' || b == b'-')
    {
        Ok(())
    } else {
        Err(Error::InvalidServiceSpec(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        ["dynamodb", "s3", "sqs", "sns", "sts"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn parse_service_only_means_latest() {
        let req = BuildRequest::parse("s3", RequestOrigin::Explicit);
        assert_eq!(req.service, "s3");
        assert_eq!(req.version, LATEST);
        assert!(req.is_latest());
        assert_eq!(req.token(), "s3");
    }

    #[test]
    fn parse_splits_on_first_dash() {
        let req = BuildRequest::parse("dynamodb-2014-06-30-preview", RequestOrigin::Explicit);
        assert_eq!(req.service, "dynamodb");
        assert_eq!(req.version, "2014-06-30-preview");
        assert_eq!(req.token(), "dynamodb-2014-06-30-preview");
    }

    #[test]
    fn parse_keeps_degenerate_tokens_whole() {
        assert_eq!(BuildRequest::parse("s3-", RequestOrigin::Explicit).service, "s3-");
        assert_eq!(BuildRequest::parse("-2006", RequestOrigin::Explicit).service, "-2006");
    }

    #[test]
    fn new_builds_display_token() {
        let req = BuildRequest::new("sts", LATEST, RequestOrigin::Mandatory);
        assert_eq!(req.token(), "sts");
        let req = BuildRequest::new("s3", "2006-03-01", RequestOrigin::Explicit);
        assert_eq!(req.token(), "s3-2006-03-01");
    }

    #[test]
    fn spec_sorts_tokens() {
        let a = RequestSpec::parse(Some("sqs,dynamodb"), &defaults()).unwrap();
        let b = RequestSpec::parse(Some("dynamodb,sqs"), &defaults()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.tokens(), &["dynamodb".to_string(), "sqs".to_string()]);
        assert_eq!(a.origin(), RequestOrigin::Explicit);
    }

    #[test]
    fn empty_spec_uses_defaults() {
        for raw in [None, Some("")] {
            let spec = RequestSpec::parse(raw, &defaults()).unwrap();
            assert!(spec.is_default());
            assert_eq!(spec.tokens().len(), 5);
        }
    }

    #[test]
    fn whitespace_is_not_trimmed_away() {
        for raw in [" s3\n", "  ", "s3, sqs"] {
            let err = RequestSpec::parse(Some(raw), &defaults()).unwrap_err();
            assert!(matches!(err, Error::InvalidServiceSpec(ref s) if s == raw));
        }
    }

    #[test]
    fn empty_tokens_are_ignored() {
        let spec = RequestSpec::parse(Some("s3,,sqs,"), &defaults()).unwrap();
        assert_eq!(spec.tokens(), &["s3".to_string(), "sqs".to_string()]);
    }

    #[test]
    fn malformed_spec_rejected() {
        let err = RequestSpec::parse(Some("s3;rm -rf"), &defaults()).unwrap_err();
        assert!(matches!(err, Error::InvalidServiceSpec(ref s) if s == "s3;rm -rf"));
        assert!(validate("s3=2006").is_err());
        assert!(validate("S3,sqs-2012-11-05").is_ok());
    }
}
