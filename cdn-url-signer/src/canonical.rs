/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::{InvalidUrl, SigningError};
use crate::secret::SharedSecret;
use http_1x::uri::Authority;
use md5::{Digest, Md5};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::io::Write as _;
use zeroize::Zeroizing;

const EXPIRES_PARAM: &str = "e";
const SIGNATURE_PARAM: &str = "st";
const SECRET_PARAM: &str = "secret";

/// A URL split into the pieces that take part in signing.
///
/// Nothing is re-encoded: `prefix`, `raw_query` and `fragment` are slices of the input,
/// so reassembly reproduces the original bytes apart from the rewritten query.
#[derive(Debug, PartialEq)]
pub(crate) struct ParsedUrl<'a> {
    /// Scheme, authority and path exactly as written.
    prefix: &'a str,
    /// The percent-decoded path, which is what gets hashed.
    path: Cow<'a, [u8]>,
    raw_query: &'a str,
    fragment: Option<&'a str>,
}

impl<'a> ParsedUrl<'a> {
    /// Parses a URL reference: absolute (`scheme://authority/path`), protocol-relative
    /// (`//authority/path`) or a bare path (`/path`, `path`). The query is kept raw and
    /// a trailing `#fragment` is carried through untouched.
    ///
    /// Only the authority goes through a URI parser. The path and query are split by
    /// hand so that raw query bytes and long URLs survive intact.
    pub(crate) fn parse(url: &'a str) -> Result<Self, SigningError> {
        if url.bytes().any(|b| b.is_ascii_control()) {
            return Err(invalid("invalid control character in URL"));
        }
        let (base, fragment) = match url.split_once('#') {
            Some((base, fragment)) => (base, Some(fragment)),
            None => (url, None),
        };
        if let Some(fragment) = fragment {
            check_escapes(fragment, "malformed percent-escape in URL fragment")?;
        }

        let (prefix, raw_query) = base.split_once('?').unwrap_or((base, ""));
        let path = match split_scheme(prefix) {
            Some(rest) => {
                let rest = rest
                    .strip_prefix("//")
                    .ok_or_else(|| invalid("URL with a scheme must have an authority"))?;
                split_authority(rest)?
            }
            None => match prefix.strip_prefix("//") {
                Some(rest) if !rest.starts_with('/') => split_authority(rest)?,
                _ => {
                    let first_segment =
                        prefix.split_once('/').map_or(prefix, |(first, _)| first);
                    if first_segment.contains(':') {
                        return Err(invalid("first path segment in URL cannot contain colon"));
                    }
                    prefix
                }
            },
        };
        check_escapes(path, "malformed percent-escape in URL path")?;

        Ok(Self {
            prefix,
            path: percent_decode_str(path).into(),
            raw_query,
            fragment,
        })
    }

    pub(crate) fn raw_query(&self) -> &'a str {
        self.raw_query
    }

    /// `true` when a parameter has an empty value at a boundary the verifier cannot tell
    /// apart from the appended `e=` pair: `a=&b=1` or a trailing `a=`.
    pub(crate) fn has_empty_query_value(&self) -> bool {
        self.raw_query.contains("=&") || self.raw_query.ends_with('=')
    }

    /// Reassembles the URL with its query replaced by `<raw query&>e=<expires>&st=<signature>`.
    pub(crate) fn with_signature(&self, expires: i64, signature: &str) -> String {
        let mut out = String::with_capacity(
            self.prefix.len()
                + self.raw_query.len()
                + self.fragment.map_or(0, str::len)
                + signature.len()
                + 32,
        );
        out.push_str(self.prefix);
        out.push('?');
        if !self.raw_query.is_empty() {
            out.push_str(self.raw_query);
            out.push('&');
        }
        // Writing to a `String` cannot fail.
        let _ = write!(out, "{EXPIRES_PARAM}={expires}&{SIGNATURE_PARAM}={signature}");
        if let Some(fragment) = self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

fn invalid(reason: &'static str) -> SigningError {
    SigningError::url_parse(InvalidUrl::new(reason))
}

/// Returns what follows `scheme:` when `reference` starts with a scheme.
///
/// A scheme is a letter followed by letters, digits, `+`, `-` or `.`, terminated by `:`.
/// Anything else before the first `:` makes the reference a path.
fn split_scheme(reference: &str) -> Option<&str> {
    let end =
        reference.find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')))?;
    let (scheme, rest) = reference.split_at(end);
    let starts_with_letter = scheme.starts_with(|c: char| c.is_ascii_alphabetic());
    match rest.strip_prefix(':') {
        Some(rest) if starts_with_letter => Some(rest),
        _ => None,
    }
}

/// Validates the authority at the start of `rest` and returns the path that follows it.
fn split_authority(rest: &str) -> Result<&str, SigningError> {
    let (authority, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));
    if !authority.is_empty() {
        authority
            .parse::<Authority>()
            .map_err(SigningError::url_parse)?;
    }
    Ok(path)
}

/// Every `%` must introduce two hex digits.
fn check_escapes(component: &str, reason: &'static str) -> Result<(), SigningError> {
    let well_formed = component.split('%').skip(1).all(|rest| {
        rest.as_bytes()
            .get(..2)
            .map_or(false, |hex| hex.iter().all(u8::is_ascii_hexdigit))
    });
    if well_formed {
        Ok(())
    } else {
        Err(invalid(reason))
    }
}

/// StringToSign = DecodedPath + "?" + [RawQuery + "&"] + "e=" + Expires + "&secret=" + Secret
pub(crate) struct StringToSign<'a> {
    path: &'a [u8],
    raw_query: &'a str,
    expires: i64,
    secret: &'a SharedSecret,
}

impl<'a> StringToSign<'a> {
    pub(crate) fn new(url: &'a ParsedUrl<'_>, expires: i64, secret: &'a SharedSecret) -> Self {
        Self {
            path: &url.path,
            raw_query: url.raw_query,
            expires,
            secret,
        }
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            self.path.len() + self.raw_query.len() + self.secret.as_str().len() + 40,
        );
        out.extend_from_slice(self.path);
        out.push(b'?');
        if !self.raw_query.is_empty() {
            out.extend_from_slice(self.raw_query.as_bytes());
            out.push(b'&');
        }
        let _ = write!(out, "{EXPIRES_PARAM}={}&{SECRET_PARAM}=", self.expires);
        out.extend_from_slice(self.secret.as_str().as_bytes());
        out
    }

    /// Signature = Lowercase(HexEncode(MD5(StringToSign)))
    pub(crate) fn signature(&self) -> String {
        let bytes = Zeroizing::new(self.to_bytes());
        let mut hasher = Md5::new();
        hasher.update(bytes.as_slice());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for StringToSign<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?", String::from_utf8_lossy(self.path))?;
        if !self.raw_query.is_empty() {
            write!(f, "{}&", self.raw_query)?;
        }
        write!(
            f,
            "{EXPIRES_PARAM}={}&{SECRET_PARAM}=** redacted **",
            self.expires
        )
    }
}

impl fmt::Debug for StringToSign<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringToSign")
            .field("path", &String::from_utf8_lossy(self.path))
            .field("raw_query", &self.raw_query)
            .field("expires", &self.expires)
            .field("secret", &"** redacted **")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::error::Error as _;

    const EXPIRES: i64 = 1544720086;

    fn string_to_sign(url: &str, secret: &str) -> String {
        let parsed = ParsedUrl::parse(url).expect("valid URL");
        let secret = SharedSecret::new(secret);
        let sts = StringToSign::new(&parsed, EXPIRES, &secret);
        String::from_utf8(sts.to_bytes()).expect("utf-8")
    }

    #[test]
    fn parse_absolute_url() {
        let parsed = ParsedUrl::parse("https://www.example.com/foo?bar=1").unwrap();
        assert_eq!(parsed.prefix, "https://www.example.com/foo");
        assert_eq!(parsed.path.as_ref(), b"/foo");
        assert_eq!(parsed.raw_query(), "bar=1");
        assert_eq!(parsed.fragment, None);
    }

    #[test]
    fn parse_origin_form() {
        let parsed = ParsedUrl::parse("/foo/bar.mp4?a=1&b=2").unwrap();
        assert_eq!(parsed.prefix, "/foo/bar.mp4");
        assert_eq!(parsed.raw_query(), "a=1&b=2");
    }

    #[test]
    fn parse_keeps_port_and_userinfo_in_prefix() {
        let parsed = ParsedUrl::parse("https://user:pw@cdn.example.com:8443/v/1.ts?token=a").unwrap();
        assert_eq!(parsed.prefix, "https://user:pw@cdn.example.com:8443/v/1.ts");
        assert_eq!(parsed.path.as_ref(), b"/v/1.ts");
    }

    #[test]
    fn parse_absolute_url_without_path() {
        let parsed = ParsedUrl::parse("https://www.example.com?x=1").unwrap();
        assert_eq!(parsed.prefix, "https://www.example.com");
        assert_eq!(parsed.path.as_ref(), b"");
        assert_eq!(parsed.raw_query(), "x=1");
    }

    #[test]
    fn parse_splits_fragment() {
        let parsed = ParsedUrl::parse("/foo?bar=1#section-2").unwrap();
        assert_eq!(parsed.raw_query(), "bar=1");
        assert_eq!(parsed.fragment, Some("section-2"));
    }

    #[test]
    fn parse_decodes_path_only() {
        let parsed = ParsedUrl::parse("/foo%20bar+baz?q=a%20b").unwrap();
        assert_eq!(parsed.prefix, "/foo%20bar+baz");
        assert_eq!(parsed.path.as_ref(), b"/foo bar+baz");
        assert_eq!(parsed.raw_query(), "q=a%20b");
    }

    #[test]
    fn parse_protocol_relative_url() {
        let parsed = ParsedUrl::parse("//www.example.com/foo?bar=1").unwrap();
        assert_eq!(parsed.prefix, "//www.example.com/foo");
        assert_eq!(parsed.path.as_ref(), b"/foo");
        assert_eq!(parsed.raw_query(), "bar=1");

        let parsed = ParsedUrl::parse("//cdn.example.com:8443").unwrap();
        assert_eq!(parsed.prefix, "//cdn.example.com:8443");
        assert_eq!(parsed.path.as_ref(), b"");
    }

    #[test]
    fn parse_three_slashes_is_a_path() {
        let parsed = ParsedUrl::parse("///foo").unwrap();
        assert_eq!(parsed.prefix, "///foo");
        assert_eq!(parsed.path.as_ref(), b"///foo");
    }

    #[test]
    fn parse_relative_references_as_paths() {
        for (url, path, query) in [
            ("foo", "foo", ""),
            ("foo?bar=1", "foo", "bar=1"),
            ("foo/bar.mp4?x=1", "foo/bar.mp4", "x=1"),
            ("www.example.com", "www.example.com", ""),
            ("*", "*", ""),
            ("./a:b", "./a:b", ""),
        ] {
            let parsed = ParsedUrl::parse(url).unwrap();
            assert_eq!(parsed.prefix, path, "{url}");
            assert_eq!(parsed.path.as_ref(), path.as_bytes(), "{url}");
            assert_eq!(parsed.raw_query(), query, "{url}");
        }
    }

    #[test]
    fn parse_keeps_raw_query_bytes() {
        let parsed = ParsedUrl::parse("/foo?a=\"b\"&c=<d>|{e}").unwrap();
        assert_eq!(parsed.raw_query(), "a=\"b\"&c=<d>|{e}");

        let parsed = ParsedUrl::parse("/foo?q=caf\u{e9}&r=a b").unwrap();
        assert_eq!(parsed.raw_query(), "q=caf\u{e9}&r=a b");
    }

    #[test]
    fn parse_accepts_long_urls() {
        let url = format!("https://www.example.com/foo?q={}", "a".repeat(70_000));
        let parsed = ParsedUrl::parse(&url).unwrap();
        assert_eq!(parsed.path.as_ref(), b"/foo");
        assert_eq!(parsed.raw_query().len(), 70_002);
    }

    #[test]
    fn parse_rejects_unsignable_shapes() {
        for url in [
            "*&#$%",
            "/foo%zz",
            "/foo%2",
            "/foo#bad%",
            "https://exa mple.com/",
            "//exa mple.com/foo",
            "https:/foo",
            "mailto:someone@example.com",
            ":foo",
            "1foo:bar/baz",
            "/foo\nbar",
            "/foo?bar=1\t",
        ] {
            let err = ParsedUrl::parse(url).expect_err(url);
            assert_eq!(err.kind(), ErrorKind::UrlParse, "{url}");
            assert!(err.source().is_some(), "{url}");
        }
    }

    #[test]
    fn empty_query_values() {
        let cases = [
            ("/foo", false),
            ("/foo?", false),
            ("/foo?bar=1", false),
            ("/foo?bar", false),
            ("/foo?bar=&baz=ok", true),
            ("/foo?bar=ok&baz=", true),
            ("/foo?bar=", true),
            ("/foo?a==b", false),
        ];
        for (url, expected) in cases {
            let parsed = ParsedUrl::parse(url).unwrap();
            assert_eq!(parsed.has_empty_query_value(), expected, "{url}");
        }
    }

    #[test]
    fn string_to_sign_with_query() {
        assert_eq!(
            string_to_sign("https://www.example.com/foo?bar=1", "supersecret"),
            "/foo?bar=1&e=1544720086&secret=supersecret"
        );
    }

    #[test]
    fn string_to_sign_without_query() {
        assert_eq!(
            string_to_sign("/foo", "supersecret"),
            "/foo?e=1544720086&secret=supersecret"
        );
        assert_eq!(
            string_to_sign("/foo?", "supersecret"),
            "/foo?e=1544720086&secret=supersecret"
        );
    }

    #[test]
    fn string_to_sign_uses_decoded_path() {
        assert_eq!(
            string_to_sign("/foo%20bar", "supersecret"),
            "/foo bar?e=1544720086&secret=supersecret"
        );
    }

    #[test]
    fn signature_matches_known_digests() {
        let secret = SharedSecret::new("supersecret");
        let with_query = ParsedUrl::parse("/foo?bar=1").unwrap();
        assert_eq!(
            StringToSign::new(&with_query, EXPIRES, &secret).signature(),
            "b805320d706d8501124ad907a505fbeb"
        );
        let without_query = ParsedUrl::parse("https://www.example.com/foo").unwrap();
        assert_eq!(
            StringToSign::new(&without_query, EXPIRES, &secret).signature(),
            "f08d6d9904adfd6a4f6287b695b68a8e"
        );
        let protocol_relative = ParsedUrl::parse("//www.example.com/foo").unwrap();
        assert_eq!(
            StringToSign::new(&protocol_relative, EXPIRES, &secret).signature(),
            "f08d6d9904adfd6a4f6287b695b68a8e"
        );
        let relative = ParsedUrl::parse("foo?bar=1").unwrap();
        assert_eq!(
            StringToSign::new(&relative, EXPIRES, &secret).signature(),
            "6e538ce0d958984dd4410e7ee7f02d66"
        );
        let quoted = ParsedUrl::parse("/foo?a=\"b\"").unwrap();
        assert_eq!(
            StringToSign::new(&quoted, EXPIRES, &secret).signature(),
            "d4e14e3b08944ee12dcde68dd011d5aa"
        );
    }

    #[test]
    fn display_and_debug_redact_secret() {
        let parsed = ParsedUrl::parse("/foo?bar=1").unwrap();
        let secret = SharedSecret::new("supersecret");
        let sts = StringToSign::new(&parsed, EXPIRES, &secret);
        assert_eq!(
            sts.to_string(),
            "/foo?bar=1&e=1544720086&secret=** redacted **"
        );
        assert!(!format!("{sts:?}").contains("supersecret"));
    }

    #[test]
    fn with_signature_preserves_everything_but_query() {
        let parsed = ParsedUrl::parse("https://www.example.com/a%2Fb?x=1&y=2#top").unwrap();
        assert_eq!(
            parsed.with_signature(-5, "abc"),
            "https://www.example.com/a%2Fb?x=1&y=2&e=-5&st=abc#top"
        );
    }
}
