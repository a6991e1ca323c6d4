use serde::Deserialize;

/// Replacement role set for a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRolesRequest {
    pub role_ids: Vec<i64>,
}
