use std::sync::Arc;

use tracing::debug;

use crate::error::{ServiceError, ValidationError};
use crate::profile::dto::UserProfile;
use crate::remote::RemoteProfileStore;
use crate::session::SessionContext;

/// Reads and writes the per-user profile document. Profiles live only in
/// the remote store; there is no local copy to reconcile.
pub struct ProfileService {
    remote: Arc<dyn RemoteProfileStore>,
    session: Arc<dyn SessionContext>,
}

impl ProfileService {
    pub fn new(remote: Arc<dyn RemoteProfileStore>, session: Arc<dyn SessionContext>) -> Self {
        Self { remote, session }
    }

    pub async fn fetch(&self, user_id: &str) -> Result<Option<UserProfile>, ServiceError> {
        self.check_session(user_id).await?;
        let profile = self.remote.fetch_profile(user_id).await?;
        debug!(%user_id, found = profile.is_some(), "profile fetched");
        Ok(profile)
    }

    pub async fn save(&self, user_id: &str, profile: &UserProfile) -> Result<(), ServiceError> {
        self.check_session(user_id).await?;
        validate_profile(profile)?;
        self.remote.put_profile(user_id, profile).await?;
        Ok(())
    }

    async fn check_session(&self, user_id: &str) -> Result<(), ValidationError> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        if !self.session.is_live(user_id).await {
            return Err(ValidationError::StaleSession(user_id.to_string()));
        }
        Ok(())
    }
}

/// Every account field is required, as on the create-account form.
fn validate_profile(profile: &UserProfile) -> Result<(), ValidationError> {
    let required: [(&'static str, &str); 6] = [
        ("firstName", &profile.first_name),
        ("lastName", &profile.last_name),
        ("email", &profile.email),
        ("birthday", &profile.birthday),
        ("sex", &profile.sex),
        ("phone", &profile.phone),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyProfileField(field));
        }
    }
    if !profile.height.is_finite() || profile.height <= 0.0 {
        return Err(ValidationError::InvalidProfileField("height"));
    }
    if !profile.weight.is_finite() || profile.weight <= 0.0 {
        return Err(ValidationError::InvalidProfileField("weight"));
    }
    Ok(())
}
