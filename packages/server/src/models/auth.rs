use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::identity::NameFields;

/// Form body for logging in under a display name.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetUsernameRequest {
    #[serde(default)]
    #[schema(example = "Иванов")]
    pub lastname: String,
    #[serde(default)]
    #[schema(example = "Иван")]
    pub firstname: String,
    #[serde(default)]
    #[schema(example = "Иванович")]
    pub patronymic: String,
    /// Access password, required only when one is configured.
    pub password: Option<String>,
}

pub fn validate_set_username_request(payload: &SetUsernameRequest) -> Result<NameFields, AppError> {
    let fields = NameFields::new(&payload.lastname, &payload.firstname, &payload.patronymic);
    if fields.lastname.is_empty() || fields.firstname.is_empty() {
        return Err(AppError::Validation(
            "Укажите фамилию и имя".into(),
        ));
    }
    if fields.display_name().chars().count() > 256 {
        return Err(AppError::Validation("Слишком длинное имя".into()));
    }
    Ok(fields)
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SetUsernameResponse {
    #[schema(example = true)]
    pub success: bool,
    /// Full display name the session is bound to.
    #[schema(example = "Иванов Иван Иванович")]
    pub username: String,
    #[schema(example = "Иванов И.И.")]
    pub formatted_name: String,
    /// Whether this user is the designated owner.
    pub is_owner: bool,
}

/// What a client needs to render the login form.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginPageResponse {
    /// Form fields accepted by `POST /set_username`.
    #[schema(example = json!(["lastname", "firstname", "patronymic"]))]
    pub fields: Vec<&'static str>,
    /// Whether an owner has already been designated.
    pub owner_exists: bool,
    /// Whether `password` must be supplied.
    pub password_required: bool,
    /// Display name of the current session, if any.
    pub logged_in_as: Option<String>,
}
