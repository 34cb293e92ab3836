use crate::domain::TokenError;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Inbound action delivered by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    /// Action name, e.g. `Transfer`.
    pub action: String,
    /// Account that sent the action, as delivered by the host.
    pub caller: String,
    /// Host transaction / item id.
    #[serde(default)]
    pub item_id: Option<String>,
    /// Named string parameters.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl ActionEnvelope {
    /// Envelope without parameters.
    pub fn new(action: impl Into<String>, caller: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            caller: caller.into(),
            item_id: None,
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set the item id.
    pub fn with_item_id(mut self, item_id: impl Into<String>) -> Self {
        self.item_id = Some(item_id.into());
        self
    }

    /// Non-empty parameter value. Empty strings read as absent.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Whether the action only reads state.
    pub fn is_query(&self) -> bool {
        matches!(
            self.action.as_str(),
            "Info" | "Total-Supply" | "TotalSupply" | "Balance"
        )
    }

    /// Parameters whose name starts with `X-`, forwarded onto notices.
    pub fn forwarded_params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .filter(|(k, _)| k.starts_with("X-"))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Named string tag on an outbound message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Tag value.
    pub value: String,
}

impl Tag {
    /// Create a tag.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Notification produced by an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Recipient account id.
    pub target: String,
    /// Ordered tags.
    pub tags: Vec<Tag>,
    /// Optional payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl OutboundMessage {
    /// Message to `target` with no tags.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            tags: Vec::new(),
            data: None,
        }
    }

    /// Append a tag.
    pub fn tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(name, value));
        self
    }

    /// Set the payload.
    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// First tag named `name`.
    pub fn get_tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }
}

/// Everything an applied action produced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ApplyResult {
    /// Outbound notifications, in emission order.
    pub messages: Vec<OutboundMessage>,
    /// Cache entries to overwrite.
    pub cache: BTreeMap<String, String>,
    /// Set when the action was rejected. Serialized as its wire code.
    #[serde(serialize_with = "serialize_error_code")]
    pub error: Option<TokenError>,
}

impl ApplyResult {
    /// Whether the action committed.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Messages addressed to `target`.
    pub fn messages_to<'a, 'b>(
        &'a self,
        target: &'b str,
    ) -> impl Iterator<Item = &'a OutboundMessage> + 'b
    where
        'a: 'b,
    {
        self.messages.iter().filter(move |m| m.target == target)
    }
}

fn serialize_error_code<S: Serializer>(
    error: &Option<TokenError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_some(err.code()),
        None => serializer.serialize_none(),
    }
}

/// Spawn-time parameters of a new instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnParams {
    /// Instance id.
    pub id: String,
    /// Account that spawned the instance; default owner of every role.
    pub creator: String,
    /// Named string parameters (`Name`, `Ticker`, `Decimals`, ...).
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}
