use serde::{Deserialize, Serialize};

/// The `users/{userId}` document: the fields collected at account creation
/// and shown on the profile screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: String,
    /// Inches.
    pub height: f64,
    /// Pounds.
    pub weight: f64,
    pub sex: String,
    pub phone: String,
}
