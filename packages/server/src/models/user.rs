use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::format_name_with_initials;

/// A person who has logged in, keyed by display name in the state document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub lastname: String,
    pub firstname: String,
    #[serde(default)]
    pub patronymic: String,
    /// Local time of the most recent login, `%Y-%m-%d %H:%M:%S`.
    pub last_login: String,
    /// Source address of the most recent login.
    pub ip: String,
    /// Stable identifier issued at the first login under this name.
    pub account_id: Uuid,
}

impl User {
    /// `"Lastname F.P."` form of this user's name.
    pub fn formatted_name(&self) -> String {
        format_name_with_initials(&self.lastname, &self.firstname, &self.patronymic)
    }
}
