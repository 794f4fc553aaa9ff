//! Typed inbound chat events.
//!
//! Events arrive as JSON objects discriminated by their `type` field. Parsing
//! happens once at the HTTP boundary; everything downstream works with the
//! structs below instead of poking at raw JSON.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::command::DispatchError;

pub const ADDED_TO_SPACE: &str = "ADDED_TO_SPACE";
pub const MESSAGE: &str = "MESSAGE";
pub const CARD_CLICKED: &str = "CARD_CLICKED";
pub const REMOVED_FROM_SPACE: &str = "REMOVED_FROM_SPACE";

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    AddedToSpace(AddedToSpaceEvent),
    Message(MessageEvent),
    CardClicked(CardClickedEvent),
    RemovedFromSpace(RemovedFromSpaceEvent),
}

impl Event {
    /// Validates a raw JSON payload and turns it into an [`Event`].
    pub fn from_value(value: Value) -> Result<Self, DispatchError> {
        let event_type = match value.get("type") {
            Some(Value::String(event_type)) => event_type.clone(),
            Some(_) => return Err(DispatchError::InvalidEvent("type is not a string".into())),
            None => return Err(DispatchError::InvalidEvent("missing type".into())),
        };
        match event_type.as_str() {
            ADDED_TO_SPACE | MESSAGE | CARD_CLICKED | REMOVED_FROM_SPACE => {}
            other => {
                return Err(DispatchError::InvalidEvent(format!(
                    "unsupported event type '{other}'"
                )))
            }
        }
        serde_json::from_value(value)
            .map_err(|e| DispatchError::InvalidEvent(format!("malformed {event_type} event: {e}")))
    }

    pub fn from_slice(body: &[u8]) -> Result<Self, DispatchError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| DispatchError::InvalidEvent(format!("body is not JSON: {e}")))?;
        if !value.is_object() {
            return Err(DispatchError::InvalidEvent("body is not a JSON object".into()));
        }
        Self::from_value(value)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Event::AddedToSpace(_) => ADDED_TO_SPACE,
            Event::Message(_) => MESSAGE,
            Event::CardClicked(_) => CARD_CLICKED,
            Event::RemovedFromSpace(_) => REMOVED_FROM_SPACE,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Event::AddedToSpace(e) => e.user.as_ref(),
            Event::Message(e) => e.user.as_ref(),
            Event::CardClicked(e) => e.user.as_ref(),
            Event::RemovedFromSpace(e) => e.user.as_ref(),
        }
    }

    /// The event space, falling back to the space embedded in the message.
    pub fn space(&self) -> Option<&Space> {
        match self {
            Event::AddedToSpace(e) => Some(&e.space),
            Event::Message(e) => e
                .space
                .as_ref()
                .or_else(|| e.message.as_ref().and_then(|m| m.space.as_ref())),
            Event::CardClicked(e) => e
                .space
                .as_ref()
                .or_else(|| e.message.as_ref().and_then(|m| m.space.as_ref())),
            Event::RemovedFromSpace(e) => e.space.as_ref(),
        }
    }

    pub fn thread(&self) -> Option<&Thread> {
        let message = match self {
            Event::AddedToSpace(e) => e.message.as_ref(),
            Event::Message(e) => e.message.as_ref(),
            Event::CardClicked(e) => e.message.as_ref(),
            Event::RemovedFromSpace(_) => None,
        };
        message.and_then(|m| m.thread.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedToSpaceEvent {
    pub space: Space,
    pub user: Option<User>,
    pub message: Option<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub space: Option<Space>,
    pub user: Option<User>,
    pub message: Option<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardClickedEvent {
    pub space: Option<Space>,
    pub user: Option<User>,
    pub message: Option<ChatMessage>,
    pub action: Option<FormAction>,
    pub common: Option<CommonEventObject>,
}

impl CardClickedEvent {
    /// Legacy `action.actionMethodName`, else the cardsV2 `common.invokedFunction`.
    pub fn action_name(&self) -> Option<&str> {
        self.action
            .as_ref()
            .map(|a| a.action_method_name.as_str())
            .filter(|name| !name.is_empty())
            .or_else(|| {
                self.common
                    .as_ref()
                    .and_then(|c| c.invoked_function.as_deref())
                    .filter(|name| !name.is_empty())
            })
    }

    /// Action parameters in declaration order.
    pub fn parameters(&self) -> Vec<(String, String)> {
        if let Some(action) = &self.action {
            if !action.parameters.is_empty() {
                return action
                    .parameters
                    .iter()
                    .map(|p| (p.key.clone(), p.value.clone()))
                    .collect();
            }
        }
        self.common
            .as_ref()
            .map(|c| {
                c.parameters
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedFromSpaceEvent {
    pub space: Option<Space>,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpaceType {
    Room,
    Dm,
    #[default]
    #[serde(other)]
    Unspecified,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub space_type: SpaceType,
    /// Newer form of `type`: `SPACE`, `GROUP_CHAT` or `DIRECT_MESSAGE`.
    #[serde(rename = "spaceType")]
    pub kind: Option<String>,
    #[serde(default)]
    pub single_user_bot_dm: bool,
}

impl Space {
    pub fn is_direct_message(&self) -> bool {
        self.space_type == SpaceType::Dm
            || self.single_user_bot_dm
            || self.kind.as_deref() == Some("DIRECT_MESSAGE")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default)]
    pub text: String,
    pub argument_text: Option<String>,
    pub thread: Option<Thread>,
    pub space: Option<Space>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub slash_command: Option<SlashCommand>,
}

impl ChatMessage {
    /// Slash command id from `slashCommand`, or from a `SLASH_COMMAND` annotation.
    pub fn slash_command_id(&self) -> Option<&str> {
        self.slash_command
            .as_ref()
            .and_then(|s| s.command_id.as_deref())
            .or_else(|| {
                self.slash_command_annotation()
                    .and_then(|s| s.command_id.as_deref())
            })
    }

    pub fn slash_command_annotation(&self) -> Option<&SlashCommand> {
        self.annotations
            .iter()
            .filter(|a| a.annotation_type == "SLASH_COMMAND")
            .find_map(|a| a.slash_command.as_ref())
    }

    pub fn is_slash_command(&self) -> bool {
        self.slash_command.is_some() || self.slash_command_annotation().is_some()
    }

    /// Whether the message opens with a mention of some user (usually the app).
    pub fn starts_with_mention(&self) -> bool {
        self.annotations
            .first()
            .map(|a| a.annotation_type == "USER_MENTION" && a.user_mention.is_some())
            .unwrap_or(false)
    }

    /// Text after the leading mention or slash command token.
    ///
    /// Without `argumentText` the span of the first annotation is cut out of
    /// `text`, so multi-word app names are stripped whole.
    pub fn arguments_text(&self) -> String {
        if let Some(argument_text) = &self.argument_text {
            return argument_text.trim().to_string();
        }
        if let Some(end) = self.leading_annotation_end() {
            let rest: String = self.text.chars().skip(end).collect();
            return rest.trim().to_string();
        }
        let text = self.text.trim();
        match text.split_once(char::is_whitespace) {
            Some((_, rest)) => rest.trim().to_string(),
            None => String::new(),
        }
    }

    /// Character offset just past the annotation that opens the message.
    fn leading_annotation_end(&self) -> Option<usize> {
        let first = self.annotations.first()?;
        let start = first.start_index?;
        if !self.text.chars().take(start).all(char::is_whitespace) {
            return None;
        }
        Some(start + first.length?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(rename = "type", default)]
    pub annotation_type: String,
    /// Offsets into the message text, in characters.
    pub start_index: Option<usize>,
    pub length: Option<usize>,
    pub user_mention: Option<UserMention>,
    pub slash_command: Option<SlashCommand>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserMention {
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlashCommand {
    #[serde(default, deserialize_with = "id_as_string")]
    pub command_id: Option<String>,
    pub command_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormAction {
    #[serde(default)]
    pub action_method_name: String,
    #[serde(default)]
    pub parameters: Vec<ActionParameter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionParameter {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonEventObject {
    pub invoked_function: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

/// Command ids are int64 on the wire and usually JSON strings, but accept numbers too.
fn id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
