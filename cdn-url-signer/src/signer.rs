/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::SigningError;
use crate::secret::SharedSecret;
use crate::sign::{SignedUrl, SigningRequest, SigningRequestBuilder};
use aws_smithy_async::time::SharedTimeSource;
use aws_smithy_types::DateTime;
use std::time::Duration;

/// Signs URLs with a fixed shared secret.
///
/// `UrlSigner` holds no mutable state, so one instance can be cloned or shared across
/// threads and used for any number of concurrent signing calls.
///
/// ```
/// use aws_smithy_types::DateTime;
/// use cdn_url_signer::UrlSigner;
///
/// let signer = UrlSigner::new("supersecret");
/// let signed = signer
///     .sign("https://www.example.com/foo?bar=1", DateTime::from_secs(1544720086))
///     .unwrap();
/// assert_eq!(
///     signed.url(),
///     "https://www.example.com/foo?bar=1&e=1544720086&st=b805320d706d8501124ad907a505fbeb"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct UrlSigner {
    secret: SharedSecret,
    time_source: SharedTimeSource,
}

impl UrlSigner {
    /// Creates a signer using the system clock for relative expirations.
    pub fn new(secret: impl Into<SharedSecret>) -> Self {
        Self {
            secret: secret.into(),
            time_source: SharedTimeSource::default(),
        }
    }

    /// Replaces the clock used by [`sign_for`](Self::sign_for).
    pub fn time_source(mut self, time_source: SharedTimeSource) -> Self {
        self.time_source = time_source;
        self
    }

    /// Signs `url` so that it expires at `expires_at`.
    pub fn sign(&self, url: &str, expires_at: DateTime) -> Result<SignedUrl, SigningError> {
        self.request(url)
            .expires_at(expires_at)
            .build()?
            .sign_url()
    }

    /// Signs `url` so that it expires `ttl` from now.
    pub fn sign_for(&self, url: &str, ttl: Duration) -> Result<SignedUrl, SigningError> {
        self.request(url)
            .expires_in(ttl)
            .time_source(self.time_source.clone())
            .build()?
            .sign_url()
    }

    fn request(&self, url: &str) -> SigningRequestBuilder {
        SigningRequest::builder()
            .url(url)
            .secret(self.secret.clone())
    }
}
