/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_cfg))]
/* End of automatically managed default lints */
//! URL signing for CDN edge token authentication.
//!
//! A signed URL carries two extra query parameters: `e`, the expiration as Unix epoch
//! seconds, and `st`, the lowercase hex MD5 digest of
//!
//! ```text
//! <decoded path>?[<raw query>&]e=<expiration>&secret=<shared secret>
//! ```
//!
//! The CDN edge recomputes the digest from the incoming request and rejects it when the
//! digest differs or the expiration has passed. The original query string is hashed and
//! emitted exactly as written, so the parameters are never reordered or re-encoded.
//!
//! ```
//! use aws_smithy_types::DateTime;
//!
//! let signed = cdn_url_signer::sign(
//!     "https://www.example.com/foo?bar=1",
//!     "supersecret",
//!     Some(DateTime::from_secs(1544720086)),
//! )
//! .unwrap();
//! assert_eq!(
//!     signed.url(),
//!     "https://www.example.com/foo?bar=1&e=1544720086&st=b805320d706d8501124ad907a505fbeb"
//! );
//! ```

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

/// Error types for URL signing operations.
pub mod error;
mod canonical;
mod secret;
mod sign;
mod signer;

use aws_smithy_types::DateTime;

pub use secret::SharedSecret;
pub use sign::{SignedUrl, SigningRequest, SigningRequestBuilder};
pub use signer::UrlSigner;

/// Sign a URL described by a [`SigningRequest`]
pub fn sign_url(request: SigningRequest) -> Result<SignedUrl, error::SigningError> {
    request.sign_url()
}

/// Sign `url` with `secret` so that it expires at `expires_at`.
///
/// Inputs are checked in order and the first failure is returned: an empty URL, an
/// empty secret, a missing expiration, a URL that does not parse, and finally a query
/// string containing an empty parameter value.
pub fn sign(
    url: &str,
    secret: &str,
    expires_at: Option<DateTime>,
) -> Result<SignedUrl, error::SigningError> {
    let mut builder = SigningRequest::builder().url(url).secret(secret);
    builder.set_expires_at(expires_at);
    builder.build()?.sign_url()
}
