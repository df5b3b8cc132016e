//! Display names, owner designation and stable account ids.

use uuid::Uuid;

use crate::db::Documents;
use crate::models::user::User;

/// Placeholder shown when a name cannot be determined.
pub const UNKNOWN_NAME: &str = "Неизвестно";

/// Timestamp format used for logins and upload records.
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Trimmed name fields of a login request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFields {
    pub lastname: String,
    pub firstname: String,
    pub patronymic: String,
}

impl NameFields {
    pub fn new(lastname: &str, firstname: &str, patronymic: &str) -> Self {
        Self {
            lastname: lastname.trim().to_string(),
            firstname: firstname.trim().to_string(),
            patronymic: patronymic.trim().to_string(),
        }
    }

    /// `"Lastname Firstname[ Patronymic]"`, the key a user is stored under.
    pub fn display_name(&self) -> String {
        display_name(&self.lastname, &self.firstname, &self.patronymic)
    }
}

pub fn display_name(lastname: &str, firstname: &str, patronymic: &str) -> String {
    let mut name = format!("{lastname} {firstname}");
    if !patronymic.is_empty() {
        name.push(' ');
        name.push_str(patronymic);
    }
    name
}

/// Format a name as `"Lastname F.P."`.
pub fn format_name_with_initials(lastname: &str, firstname: &str, patronymic: &str) -> String {
    let Some(first_initial) = firstname.chars().next() else {
        return UNKNOWN_NAME.to_string();
    };
    if lastname.is_empty() {
        return UNKNOWN_NAME.to_string();
    }

    let mut initials = format!("{first_initial}.");
    if let Some(p) = patronymic.chars().next() {
        initials.push(p);
        initials.push('.');
    }
    format!("{lastname} {initials}")
}

/// Result of recording a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub account_id: Uuid,
    pub display_name: String,
    pub formatted_name: String,
    pub is_owner: bool,
    /// Whether this was the first login under this display name.
    pub first_login: bool,
}

/// Record a login under `fields` from `ip` at `login_time`.
///
/// The user entry is overwritten except for its account id, which is issued
/// on the first login and kept afterwards. The first user ever to log in
/// becomes the owner.
pub fn register_login(
    docs: &mut Documents,
    fields: &NameFields,
    ip: &str,
    login_time: String,
) -> LoginOutcome {
    let name = fields.display_name();
    docs.set_owner_if_absent(&name);

    let existing = docs.users.get(&name).map(|u| u.account_id);
    let account_id = existing.unwrap_or_else(Uuid::now_v7);

    let user = User {
        lastname: fields.lastname.clone(),
        firstname: fields.firstname.clone(),
        patronymic: fields.patronymic.clone(),
        last_login: login_time,
        ip: ip.to_string(),
        account_id,
    };
    let formatted_name = user.formatted_name();
    docs.users.insert(name.clone(), user);

    LoginOutcome {
        account_id,
        is_owner: docs.is_owner(&name),
        display_name: name,
        formatted_name,
        first_login: existing.is_none(),
    }
}

/// Formatted name of the user holding `account_id`, or [`UNKNOWN_NAME`].
pub fn formatted_name_for_account(docs: &Documents, account_id: Uuid) -> String {
    docs.find_user_by_account(account_id)
        .map(User::formatted_name)
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

/// Formatted name of the user stored under `display_name`, or [`UNKNOWN_NAME`].
pub fn formatted_name_for_user(docs: &Documents, display_name: &str) -> String {
    docs.users
        .get(display_name)
        .map(User::formatted_name)
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}
