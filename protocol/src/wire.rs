//! JSON payloads exchanged with the inspection backend.
//!
//! Every response is wrapped in a `{success, data}` envelope. Decoding is
//! deliberately tolerant of scalar types (see `lenient`); structural problems
//! such as `data` not being a list still fail to decode.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::lenient;
use crate::models::CommentId;
use crate::models::InspectionResult;
use crate::models::SectionId;
use crate::models::SubSectionId;

/// Login body for the token endpoint.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response of `POST users/token.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenEnvelope {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub success: bool,
    #[serde(default)]
    pub data: Value,
}

impl TokenEnvelope {
    /// The issued token, when the envelope carries one as a string.
    pub fn token(&self) -> Option<&str> {
        self.data.get("token").and_then(Value::as_str)
    }
}

/// Response of `GET sections.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HierarchyPayload {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<SectionPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionPayload {
    #[serde(default, deserialize_with = "lenient::int")]
    pub id: SectionId,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub subsections: Vec<SubSectionPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubSectionPayload {
    #[serde(default, deserialize_with = "lenient::int")]
    pub id: SubSectionId,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub sec_id: SectionId,
    #[serde(default)]
    pub comments: Vec<CommentPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPayload {
    #[serde(default, deserialize_with = "lenient::int")]
    pub id: CommentId,
    #[serde(default, deserialize_with = "lenient::int")]
    pub subsec_id: SubSectionId,
    #[serde(default, deserialize_with = "lenient::int")]
    pub rank: i64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "lenient::active")]
    pub active: bool,
}

/// A result as the backend stores it; body of `POST results/add` and element
/// of the `GET results.json` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(default, deserialize_with = "lenient::int")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub insp_id: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub com_id: CommentId,
    #[serde(default)]
    pub variant_id: Option<i64>,
    /// Free-text note.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub add_on: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub severity: i64,
}

impl From<&InspectionResult> for ResultRecord {
    fn from(result: &InspectionResult) -> Self {
        Self {
            id: result.id as i64,
            insp_id: result.inspection_id,
            com_id: result.comment_id,
            variant_id: result.variant_id,
            add_on: Some(result.note.clone()),
            severity: i64::from(result.severity),
        }
    }
}

/// Response of `GET results.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsPayload {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<ResultRecord>,
}

/// Generic acknowledgement envelope (`POST results/add`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Ack {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub message: Option<String>,
}
