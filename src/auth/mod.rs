// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Resolves the caller of a registry request to a user id.
//!
//! ## Auth Flow
//!
//! 1. The account service issues an HS256 JWT signed with `JWT_KEY`
//! 2. Clients send it as `Authorization: Bearer <jwt>` or in the `token` cookie
//! 3. The registry:
//!    - Verifies the signature and `exp` (60 second clock skew)
//!    - Extracts `UserID` (or `user_id` / `sub`) → `user_id`
//!
//! Token issuance happens elsewhere. The generator role has no
//! authenticated endpoints.

pub mod claims;
pub mod error;
pub mod extractor;

pub use claims::{AuthenticatedUser, TokenClaims};
pub use error::AuthError;
pub use extractor::{Auth, AuthConfig, TOKEN_COOKIE};
