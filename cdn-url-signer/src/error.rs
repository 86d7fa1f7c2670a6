/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::error::Error as StdError;
use std::fmt;

/// The precondition that caused signing to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The URL to sign was empty.
    EmptyUrl,
    /// The shared secret was empty.
    EmptySecret,
    /// No expiration time was supplied.
    MissingExpiration,
    /// The URL could not be parsed. The parser's error is available via [`StdError::source`].
    UrlParse,
    /// The query string contains a parameter with an empty value (`a=&b=1` or `a=`).
    EmptyQueryValue,
}

/// Error type for URL signing operations
#[derive(Debug)]
pub struct SigningError {
    kind: ErrorKind,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl SigningError {
    fn new(kind: ErrorKind, source: Option<Box<dyn StdError + Send + Sync>>) -> Self {
        Self { kind, source }
    }

    pub(crate) fn empty_url() -> Self {
        ErrorKind::EmptyUrl.into()
    }

    pub(crate) fn empty_secret() -> Self {
        ErrorKind::EmptySecret.into()
    }

    pub(crate) fn missing_expiration() -> Self {
        ErrorKind::MissingExpiration.into()
    }

    pub(crate) fn url_parse(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(ErrorKind::UrlParse, Some(source.into()))
    }

    pub(crate) fn empty_query_value() -> Self {
        ErrorKind::EmptyQueryValue.into()
    }

    /// Returns the kind of precondition that failed.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::EmptyUrl => {
                write!(f, "URL was empty, expected a non-empty URL for signing")
            }
            ErrorKind::EmptySecret => {
                write!(f, "secret was empty, expected a non-empty secret for signing")
            }
            ErrorKind::MissingExpiration => {
                write!(f, "expiration time was not set, expected an expiration time for signing")
            }
            ErrorKind::UrlParse => write!(f, "failed to parse URL prior to signing"),
            ErrorKind::EmptyQueryValue => write!(
                f,
                "query string contains a parameter with an empty value, which cannot be signed unambiguously"
            ),
        }
    }
}

impl StdError for SigningError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<ErrorKind> for SigningError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind, None)
    }
}

/// A URL that is not a signable shape, or that carries a control character or a
/// malformed percent-escape.
#[derive(Debug)]
pub(crate) struct InvalidUrl {
    reason: &'static str,
}

impl InvalidUrl {
    pub(crate) fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

impl fmt::Display for InvalidUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl StdError for InvalidUrl {}
