use serde::{Deserialize, Serialize};

/// A resolved request identity. The email is the stable identifier used by
/// every authorization predicate; the display name is only carried for
/// human-readable fields such as `Approval.approved_by`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthedUser {
    pub email: String,
    pub display_name: String,
}
