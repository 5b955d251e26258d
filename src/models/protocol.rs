use serde::{Deserialize, Deserializer, Serialize, de};

use super::query::Term;
use crate::auth::validate::FormErrors;
use crate::backend::encode_segment;

/// Provider kinds the editor offers.
pub const PROTOCOL_KINDS: [(&str, &str); 3] = [("jar", "Jar"), ("script", "Script"), ("local", "Local")];

/// Publication state, carried as 0/1 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProtocolState {
    #[default]
    Unpublished,
    Published,
}

impl TryFrom<u8> for ProtocolState {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(ProtocolState::Unpublished),
            1 => Ok(ProtocolState::Published),
            other => Err(format!("unknown protocol state {other}")),
        }
    }
}

impl From<ProtocolState> for u8 {
    fn from(s: ProtocolState) -> u8 {
        match s {
            ProtocolState::Unpublished => 0,
            ProtocolState::Published => 1,
        }
    }
}

impl ProtocolState {
    pub fn label(&self) -> &'static str {
        match self {
            ProtocolState::Unpublished => "Unpublished",
            ProtocolState::Published => "Published",
        }
    }
}

/// A device communication protocol definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolItem {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<serde_json::Value>,
    #[serde(default)]
    pub state: ProtocolState,
}

impl ProtocolItem {
    pub fn is_published(&self) -> bool {
        self.state == ProtocolState::Published
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn kind_text(&self) -> &str {
        self.kind.as_deref().unwrap_or("")
    }

    /// The id as one percent-encoded path segment, for console links.
    pub fn path_id(&self) -> String {
        encode_segment(&self.id)
    }
}

/// Ids arrive as strings from most deployments and as numbers from some.
fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!("invalid id: {other}"))),
    }
}

/// Publish/unpublish toggle, named after the backend path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployAction {
    Deploy,
    Undeploy,
}

impl DeployAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "_deploy" => Some(DeployAction::Deploy),
            "_un-deploy" => Some(DeployAction::Undeploy),
            _ => None,
        }
    }

    pub fn path_segment(&self) -> &'static str {
        match self {
            DeployAction::Deploy => "_deploy",
            DeployAction::Undeploy => "_un-deploy",
        }
    }
}

/// Search form on the protocol list.
#[derive(Debug, Deserialize, Default)]
pub struct ProtocolSearchForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    pub csrf_token: String,
}

impl ProtocolSearchForm {
    pub fn to_terms(&self) -> Vec<Term> {
        let mut terms = vec![];
        if !self.name.trim().is_empty() {
            terms.push(Term::new("name$LIKE", self.name.trim()));
        }
        if self.state == "0" || self.state == "1" {
            terms.push(Term::new("state", &self.state));
        }
        terms
    }
}

/// Editor ("Save" modal) form. Also used to prefill the editor.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProtocolForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub configuration: String,
    #[serde(default)]
    pub state: u8,
    /// "update" when editing an existing record, anything else creates.
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl ProtocolForm {
    pub fn from_item(item: &ProtocolItem) -> Self {
        ProtocolForm {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description_text().to_string(),
            kind: item.kind_text().to_string(),
            configuration: item
                .configuration
                .as_ref()
                .and_then(|c| serde_json::to_string_pretty(c).ok())
                .unwrap_or_default(),
            state: item.state.into(),
            mode: "update".to_string(),
            csrf_token: String::new(),
        }
    }

    pub fn is_update(&self) -> bool {
        self.mode == "update"
    }

    /// Validate and convert to the record sent to the backend. A blank id
    /// means "create" and is left for the backend to assign.
    pub fn validate(&self) -> Result<ProtocolItem, Vec<String>> {
        let mut errors = FormErrors::new();
        let id = self.id.trim();
        if id.is_empty() && self.is_update() {
            errors.push("ID is required");
        }
        if !id.is_empty() {
            if id.len() > 64 {
                errors.push("ID must be at most 64 characters");
            }
            if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
                errors.push("ID may only contain letters, numbers, '-' and '_'");
            }
        }
        errors.required("Name", &self.name, 64);
        errors.optional("Description", &self.description, 255);

        let kind = self.kind.trim();
        if !kind.is_empty() && !PROTOCOL_KINDS.iter().any(|(k, _)| *k == kind) {
            errors.push(format!("Unknown protocol type '{kind}'"));
        }

        let configuration = match self.configuration.trim() {
            "" => None,
            raw => match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(v) if v.is_object() => Some(v),
                Ok(_) => {
                    errors.push("Configuration must be a JSON object");
                    None
                }
                Err(e) => {
                    errors.push(format!("Configuration is not valid JSON: {e}"));
                    None
                }
            },
        };

        let state = match ProtocolState::try_from(self.state) {
            Ok(state) => state,
            Err(_) => {
                errors.push("State must be 0 (unpublished) or 1 (published)");
                ProtocolState::default()
            }
        };

        errors.finish(ProtocolItem {
            id: id.to_string(),
            name: self.name.trim().to_string(),
            description: Some(self.description.trim().to_string()).filter(|d| !d.is_empty()),
            kind: Some(kind.to_string()).filter(|k| !k.is_empty()),
            configuration,
            state,
        })
    }
}
