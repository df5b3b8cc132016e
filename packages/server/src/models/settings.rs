use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::AppError;

/// Unit of the configured upload size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub enum SizeUnit {
    #[serde(rename = "KB")]
    Kb,
    #[default]
    #[serde(rename = "MB")]
    Mb,
    #[serde(rename = "GB")]
    Gb,
}

impl SizeUnit {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "KB" => Some(Self::Kb),
            "MB" => Some(Self::Mb),
            "GB" => Some(Self::Gb),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kb => "KB",
            Self::Mb => "MB",
            Self::Gb => "GB",
        }
    }

    pub fn multiplier(self) -> u64 {
        match self {
            Self::Kb => 1024,
            Self::Mb => 1024 * 1024,
            Self::Gb => 1024 * 1024 * 1024,
        }
    }

    /// Largest value accepted for this unit (1 GiB in every unit).
    pub fn max_value(self) -> u64 {
        match self {
            Self::Kb => 1024 * 1024,
            Self::Mb => 1024,
            Self::Gb => 1,
        }
    }
}

/// Global settings persisted in the state document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Argon2 hash of the access password required at login.
    #[serde(default)]
    pub password_hash: Option<String>,
    /// Session signing key overriding the configured one.
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default)]
    pub file_size_unit: SizeUnit,
}

fn default_max_file_size() -> u64 {
    16
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            password_hash: None,
            secret_key: None,
            max_file_size: default_max_file_size(),
            file_size_unit: SizeUnit::default(),
        }
    }
}

impl Settings {
    /// Upload size limit in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_file_size.saturating_mul(self.file_size_unit.multiplier())
    }
}

/// Request body for updating settings.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SaveSettingsRequest {
    /// Upload size limit, in `file_size_unit`. Defaults to 16.
    #[serde(default = "default_requested_size", deserialize_with = "size_from_number_or_string")]
    #[schema(example = 64)]
    pub max_file_size: i64,
    /// One of `KB`, `MB`, `GB`. Defaults to `MB`.
    #[serde(default = "default_requested_unit")]
    #[schema(example = "MB")]
    pub file_size_unit: String,
    /// New access password. Empty string removes it; absent leaves it unchanged.
    pub password: Option<String>,
    /// New session signing key. Empty string removes it; absent leaves it unchanged.
    pub secret_key: Option<String>,
}

fn default_requested_size() -> i64 {
    16
}
fn default_requested_unit() -> String {
    "MB".into()
}

/// Accepts `16` as well as `"16"`.
fn size_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("max_file_size is not an integer: {s}"))),
    }
}

/// Validate the requested size limit and return it in typed form.
pub fn validate_size_limit(payload: &SaveSettingsRequest) -> Result<(u64, SizeUnit), AppError> {
    let unit = SizeUnit::parse(&payload.file_size_unit).ok_or_else(|| {
        AppError::Validation(format!(
            "Неизвестная единица измерения: {}",
            payload.file_size_unit
        ))
    })?;

    if payload.max_file_size < 1 {
        return Err(AppError::Validation(
            "Размер файла должен быть больше 0".into(),
        ));
    }

    let size = payload.max_file_size as u64;
    if size > unit.max_value() {
        return Err(AppError::Validation(format!(
            "Максимальный размер для {}: {}",
            unit.as_str(),
            unit.max_value()
        )));
    }

    Ok((size, unit))
}
