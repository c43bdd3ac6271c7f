use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::services::assessment::TeacherProfile;

/// Editable profile fields. Unknown keys are ignored, so ids and role can never be
/// rewritten through this route.
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileUpdate {
    #[serde(default)]
    #[serde(alias = "firstName")]
    pub(crate) first_name: Option<String>,
    #[serde(default)]
    #[serde(alias = "lastName")]
    pub(crate) last_name: Option<String>,
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    pub(crate) password: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileUserResponse {
    pub(crate) id: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) section: String,
    pub(crate) class_name: String,
    pub(crate) is_verified: bool,
    pub(crate) role: String,
    pub(crate) created_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TeacherProfileResponse {
    pub(crate) id: String,
    pub(crate) profile_info: ProfileUserResponse,
    pub(crate) created_at: String,
}

impl TeacherProfileResponse {
    pub(crate) fn from_profile(profile: TeacherProfile) -> Self {
        let user = profile.user;
        Self {
            id: profile.id,
            profile_info: ProfileUserResponse {
                id: user.id,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                phone: user.phone,
                section: user.section,
                class_name: user.class_name,
                is_verified: user.is_verified,
                role: user.role,
                created_at: format_primitive(user.created_at),
            },
            created_at: format_primitive(profile.created_at),
        }
    }
}
