/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Secret shared between the signer and the CDN edge that verifies signed URLs.
///
/// Clones share the same buffer, which is zeroed when the last clone is dropped. The
/// secret is never printed by `Debug`.
#[derive(Clone)]
pub struct SharedSecret(Arc<Zeroizing<String>>);

impl SharedSecret {
    /// Creates a new shared secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::new(Zeroizing::new(secret.into())))
    }

    /// Returns `true` if the secret has no characters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedSecret").field(&"** redacted **").finish()
    }
}

impl From<&str> for SharedSecret {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl From<String> for SharedSecret {
    fn from(secret: String) -> Self {
        Self::new(secret)
    }
}

impl From<&String> for SharedSecret {
    fn from(secret: &String) -> Self {
        Self::new(secret.as_str())
    }
}
