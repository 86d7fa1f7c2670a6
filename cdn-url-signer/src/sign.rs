/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::canonical::{ParsedUrl, StringToSign};
use crate::error::SigningError;
use crate::secret::SharedSecret;
use aws_smithy_async::time::SharedTimeSource;
use aws_smithy_types::DateTime;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Expiration {
    DateTime(DateTime),
    Duration(Duration),
}

/// Request to sign a URL for CDN token authentication.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    pub(crate) url: String,
    pub(crate) secret: SharedSecret,
    pub(crate) expires_at: DateTime,
}

impl SigningRequest {
    /// Creates a new builder for constructing a signing request.
    pub fn builder() -> SigningRequestBuilder {
        SigningRequestBuilder::default()
    }

    /// Returns the URL that will be signed.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the time after which the signed URL is rejected by the CDN edge.
    pub fn expires_at(&self) -> DateTime {
        self.expires_at
    }
}

/// Builder for [`SigningRequest`].
#[derive(Default, Debug)]
pub struct SigningRequestBuilder {
    url: Option<String>,
    secret: Option<SharedSecret>,
    expiration: Option<Expiration>,
    time_source: Option<SharedTimeSource>,
}

impl SigningRequestBuilder {
    /// Sets the URL to sign: an absolute URL, a protocol-relative `//host/path`, or a path.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the secret shared with the CDN edge.
    pub fn secret(mut self, secret: impl Into<SharedSecret>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Sets an absolute expiration time.
    pub fn expires_at(mut self, time: DateTime) -> Self {
        self.expiration = Some(Expiration::DateTime(time));
        self
    }

    /// Sets or clears an absolute expiration time.
    pub fn set_expires_at(&mut self, time: Option<DateTime>) -> &mut Self {
        self.expiration = time.map(Expiration::DateTime);
        self
    }

    /// Sets a relative expiration time from now.
    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.expiration = Some(Expiration::Duration(duration));
        self
    }

    /// Sets the clock used to resolve [`expires_in`](Self::expires_in). Defaults to the system clock.
    pub fn time_source(mut self, time_source: SharedTimeSource) -> Self {
        self.time_source = Some(time_source);
        self
    }

    /// Builds the signing request.
    ///
    /// Checks, in order, that the URL is non-empty, the secret is non-empty and an
    /// expiration was supplied. The URL itself is parsed when signing.
    pub fn build(self) -> Result<SigningRequest, SigningError> {
        let url = self
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(SigningError::empty_url)?;

        let secret = self
            .secret
            .filter(|secret| !secret.is_empty())
            .ok_or_else(SigningError::empty_secret)?;

        let expires_at = match self.expiration.ok_or_else(SigningError::missing_expiration)? {
            Expiration::DateTime(dt) => dt,
            Expiration::Duration(dur) => {
                let time_source = self.time_source.unwrap_or_default();
                let now = DateTime::from(time_source.now());
                let ttl = i64::try_from(dur.as_secs()).unwrap_or(i64::MAX);
                DateTime::from_secs(now.secs().saturating_add(ttl))
            }
        };

        Ok(SigningRequest {
            url,
            secret,
            expires_at,
        })
    }
}

/// A URL carrying an expiration (`e`) and signature (`st`) query parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedUrl {
    url: String,
    signature: String,
    expires_at: DateTime,
}

impl SignedUrl {
    pub(crate) fn new(url: String, signature: String, expires_at: DateTime) -> Self {
        Self {
            url,
            signature,
            expires_at,
        }
    }

    /// Returns the complete signed URL as a string.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Alias for [`url`](Self::url).
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Returns the signature as a lowercase hex string
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Returns the expiration encoded in the `e` parameter.
    pub fn expires_at(&self) -> DateTime {
        self.expires_at
    }

    /// Consumes the `SignedUrl`, returning the URL string.
    pub fn into_string(self) -> String {
        self.url
    }
}

impl fmt::Display for SignedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl From<SignedUrl> for String {
    fn from(signed: SignedUrl) -> Self {
        signed.url
    }
}

impl AsRef<str> for SignedUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

// Internal signing implementation
impl SigningRequest {
    pub(crate) fn sign_url(&self) -> Result<SignedUrl, SigningError> {
        let parsed = ParsedUrl::parse(&self.url)?;
        if parsed.has_empty_query_value() {
            tracing::debug!(
                query = parsed.raw_query(),
                "refusing to sign URL with an empty query parameter value"
            );
            return Err(SigningError::empty_query_value());
        }

        let expires = self.expires_at.secs();
        let string_to_sign = StringToSign::new(&parsed, expires, &self.secret);
        tracing::trace!(string_to_sign = %string_to_sign, "signing URL");
        let signature = string_to_sign.signature();

        let url = parsed.with_signature(expires, &signature);
        Ok(SignedUrl::new(url, signature, self.expires_at))
    }
}
