//! URL-segment API versioning.
//!
//! Routes are mounted twice: under `/api` (the configured default version is
//! assumed) and under `/api/:version` where the segment reads `v1`, `v1.0` or
//! `v1.1`. Each mounted route resolves a [`RequestedVersion`] into the request
//! extensions; mutation routes additionally pass through [`require_version`].

use std::fmt;
use std::str::FromStr;

use axum::{
    extract::{Extension, RawPathParams, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use thiserror::Error;

use crate::app::errors::ApiError;

/// Response header listing every version this server answers to.
pub const SUPPORTED_VERSIONS_HEADER: HeaderName = HeaderName::from_static("api-supported-versions");

const SUPPORTED_VERSIONS_VALUE: &str = "1.0, 1.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    major: u16,
    minor: u16,
}

impl ApiVersion {
    pub const V1_0: ApiVersion = ApiVersion { major: 1, minor: 0 };
    pub const V1_1: ApiVersion = ApiVersion { major: 1, minor: 1 };

    pub const SUPPORTED: [ApiVersion; 2] = [Self::V1_0, Self::V1_1];

    /// Minimum version for routes that change data.
    pub const MUTATIONS: ApiVersion = Self::V1_1;

    pub fn is_supported(self) -> bool {
        Self::SUPPORTED.contains(&self)
    }

    /// Parse a URL segment such as `v1` or `v1.1`.
    pub fn from_segment(segment: &str) -> Result<Self, ApiVersionError> {
        let raw = segment
            .strip_prefix('v')
            .or_else(|| segment.strip_prefix('V'))
            .ok_or_else(|| ApiVersionError::Malformed(segment.to_string()))?;
        raw.parse()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiVersionError {
    #[error("malformed api version '{0}'")]
    Malformed(String),

    #[error("api version '{0}' is not supported (supported: {SUPPORTED_VERSIONS_VALUE})")]
    Unsupported(String),
}

/// `major[.minor]`; a missing minor reads as `0`. Only supported versions parse.
impl FromStr for ApiVersion {
    type Err = ApiVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ApiVersionError::Malformed(s.to_string());
        let (major, minor) = match s.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s, "0"),
        };
        let version = ApiVersion {
            major: major.parse().map_err(|_| malformed())?,
            minor: minor.parse().map_err(|_| malformed())?,
        };
        if !version.is_supported() {
            return Err(ApiVersionError::Unsupported(s.to_string()));
        }
        Ok(version)
    }
}

/// Version resolved for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedVersion {
    pub version: ApiVersion,
    /// `true` when the URL carried the version segment.
    pub explicit: bool,
}

impl RequestedVersion {
    /// Path prefix under which this request was routed.
    pub fn api_prefix(&self) -> String {
        if self.explicit {
            format!("/api/v{}", self.version)
        } else {
            "/api".to_string()
        }
    }
}

/// Mark requests on unversioned routes with the default version.
pub async fn assume_default(State(default): State<ApiVersion>, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(RequestedVersion {
        version: default,
        explicit: false,
    });
    next.run(req).await
}

/// Read the `:version` path segment; malformed or unsupported versions are rejected.
pub async fn read_url_segment(params: RawPathParams, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let segment = params
        .iter()
        .find(|(name, _)| *name == "version")
        .map(|(_, value)| value.to_string())
        .ok_or_else(|| ApiError::Internal("version segment missing from route".to_string()))?;

    let version = ApiVersion::from_segment(&segment).map_err(|e| ApiError::UnsupportedVersion(e.to_string()))?;
    req.extensions_mut().insert(RequestedVersion {
        version,
        explicit: true,
    });
    Ok(next.run(req).await)
}

/// Reject requests resolved to a version older than `minimum`.
pub async fn require_version(
    State(minimum): State<ApiVersion>,
    Extension(requested): Extension<RequestedVersion>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if requested.version < minimum {
        return Err(ApiError::UnsupportedVersion(format!(
            "this operation requires api version {minimum} or later (requested {})",
            requested.version
        )));
    }
    Ok(next.run(req).await)
}

pub async fn report_supported_versions(mut response: Response) -> Response {
    response.headers_mut().insert(
        SUPPORTED_VERSIONS_HEADER,
        HeaderValue::from_static(SUPPORTED_VERSIONS_VALUE),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_url_segments() {
        assert_eq!(ApiVersion::from_segment("v1").unwrap(), ApiVersion::V1_0);
        assert_eq!(ApiVersion::from_segment("v1.0").unwrap(), ApiVersion::V1_0);
        assert_eq!(ApiVersion::from_segment("v1.1").unwrap(), ApiVersion::V1_1);
    }

    #[test]
    fn rejects_bad_segments() {
        assert!(matches!(ApiVersion::from_segment("1.1"), Err(ApiVersionError::Malformed(_))));
        assert!(matches!(ApiVersion::from_segment("vx"), Err(ApiVersionError::Malformed(_))));
        assert!(matches!(ApiVersion::from_segment("v2.0"), Err(ApiVersionError::Unsupported(_))));
    }

    #[test]
    fn versions_order_by_major_then_minor() {
        assert!(ApiVersion::V1_0 < ApiVersion::V1_1);
        assert!(ApiVersion::V1_0 < ApiVersion::MUTATIONS);
    }

    #[test]
    fn header_lists_every_supported_version() {
        let listed = ApiVersion::SUPPORTED
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        assert_eq!(listed, SUPPORTED_VERSIONS_VALUE);
    }

    #[test]
    fn prefix_follows_how_the_version_was_given() {
        let implicit = RequestedVersion {
            version: ApiVersion::V1_1,
            explicit: false,
        };
        let explicit = RequestedVersion {
            version: ApiVersion::V1_1,
            explicit: true,
        };
        assert_eq!(implicit.api_prefix(), "/api");
        assert_eq!(explicit.api_prefix(), "/api/v1.1");
    }
}
