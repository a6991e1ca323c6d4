//! Claim layout of access and refresh tokens and the checks run on them.

use chrono::{DateTime, Duration, Utc};

use crate::errors::{ServiceError, ServiceResult};
use crate::utils::jwt::ClaimSet;
use crate::utils::timestamp::{format_timestamp, parse_timestamp};

pub const USER_ID_CLAIM: &str = "userId";
pub const CREATED_AT_CLAIM: &str = "createdAt";
pub const EXPIRES_AT_CLAIM: &str = "expiresAt";
pub const TYPE_CLAIM: &str = "type";
pub const REFRESH_TYPE: &str = "refresh";

pub fn access_claims(user_id: i64, now: DateTime<Utc>, lifetime: Duration) -> ClaimSet {
    ClaimSet::new()
        .with(USER_ID_CLAIM, user_id.to_string())
        .with(CREATED_AT_CLAIM, format_timestamp(now))
        .with(EXPIRES_AT_CLAIM, format_timestamp(now + lifetime))
}

/// Same layout as an access token plus `type=refresh`.
pub fn refresh_claims(user_id: i64, now: DateTime<Utc>, lifetime: Duration) -> ClaimSet {
    access_claims(user_id, now, lifetime).with(TYPE_CLAIM, REFRESH_TYPE)
}

/// Fails unless `claims` carry a parsable `expiresAt` that is not before `now`.
pub fn ensure_not_expired(claims: &ClaimSet, now: DateTime<Utc>) -> ServiceResult<()> {
    let expires_at = claims
        .get(EXPIRES_AT_CLAIM)
        .ok_or_else(|| ServiceError::unauthenticated("Token's expiration not set."))?;

    let expires_at = parse_timestamp(expires_at)
        .map_err(|_| ServiceError::unauthenticated("Date parsing failed."))?;

    if expires_at < now {
        return Err(ServiceError::unauthenticated("Provided token is expired."));
    }

    Ok(())
}

/// Numeric subject id carried in `userId`.
pub fn subject_id(claims: &ClaimSet) -> ServiceResult<i64> {
    claims
        .get(USER_ID_CLAIM)
        .and_then(|value| value.trim().parse::<i64>().ok())
        .ok_or_else(|| ServiceError::unauthenticated("Token does not carry an user id."))
}
