// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::Deserialize;

/// Claims read from a caller token.
///
/// Tokens issued by the account service carry the user id as `UserID`.
/// `user_id` and the standard `sub` are fallbacks, in that order.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default, rename = "UserID")]
    pub account_user_id: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub sub: Option<String>,

    /// Expiration timestamp (required)
    pub exp: u64,
}

impl TokenClaims {
    /// First non-blank user id claim.
    pub fn resolved_user_id(&self) -> Option<&str> {
        [&self.account_user_id, &self.user_id, &self.sub]
            .into_iter()
            .flatten()
            .map(|id| id.trim())
            .find(|id| !id.is_empty())
    }
}

/// The caller a request is acting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}
