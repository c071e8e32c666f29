//! # Typed Init Data
//!
//! Read-only typed view over a parsed payload. The nested `user`, `receiver`
//! and `chat` objects are JSON; they are decoded here only, never during
//! canonicalization.

use super::entities::{FieldSet, HASH_FIELD, SIGNATURE_FIELD};
use super::errors::InitDataError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A Telegram user as embedded in init data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAppUser {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_bot: Option<bool>,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_to_attachment_menu: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allows_write_to_pm: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// A chat the Mini App was opened from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAppChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Typed init data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitData {
    pub auth_date: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<WebAppUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<WebAppUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<WebAppChat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_instance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_send_after: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl InitData {
    /// Build the typed view. Unknown fields are ignored.
    pub fn from_fields(fields: &FieldSet) -> Result<Self, InitDataError> {
        Ok(Self {
            auth_date: fields.auth_date()?,
            query_id: text(fields, "query_id"),
            user: json(fields, "user")?,
            receiver: json(fields, "receiver")?,
            chat: json(fields, "chat")?,
            chat_type: text(fields, "chat_type"),
            chat_instance: text(fields, "chat_instance"),
            start_param: text(fields, "start_param"),
            can_send_after: number(fields, "can_send_after")?,
            hash: text(fields, HASH_FIELD),
            signature: text(fields, SIGNATURE_FIELD),
        })
    }

    /// Unix time after which the bot may message the user via
    /// `answerWebAppQuery`, if the issuer provided a delay.
    pub fn can_send_at(&self) -> Option<u64> {
        self.can_send_after
            .map(|delay| self.auth_date.saturating_add(delay))
    }
}

fn text(fields: &FieldSet, key: &str) -> Option<String> {
    fields.get(key).map(str::to_owned)
}

fn json<T: DeserializeOwned>(fields: &FieldSet, key: &str) -> Result<Option<T>, InitDataError> {
    fields
        .get(key)
        .map(|raw| {
            serde_json::from_str(raw).map_err(|e| InitDataError::InvalidField {
                field: key.to_string(),
                detail: e.to_string(),
            })
        })
        .transpose()
}

fn number(fields: &FieldSet, key: &str) -> Result<Option<u64>, InitDataError> {
    fields
        .get(key)
        .map(|raw| {
            raw.parse().map_err(|_| InitDataError::InvalidField {
                field: key.to_string(),
                detail: "expected unsigned integer".to_string(),
            })
        })
        .transpose()
}
