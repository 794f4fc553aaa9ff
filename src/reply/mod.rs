//! Outbound reply payloads.

use serde::Serialize;

pub use card::{Button, Card, CardHeader, CardWithId, Icon, ImageStyle, OnClick, Section, Widget};

mod card;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<Card>,
    #[serde(rename = "cardsV2", skip_serializing_if = "Vec::is_empty")]
    pub cards_v2: Vec<CardWithId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_response: Option<ActionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<ThreadRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionResponseType {
    NewMessage,
    UpdateMessage,
    RequestConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ActionResponseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadRef {
    pub name: String,
}

impl Reply {
    /// The `{}` acknowledgement.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text<T: Into<String>>(text: T) -> Self {
        Reply {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn cards(cards: Vec<Card>) -> Self {
        Reply {
            cards,
            ..Self::default()
        }
    }

    pub fn cards_v2(cards: Vec<CardWithId>) -> Self {
        Reply {
            cards_v2: cards,
            ..Self::default()
        }
    }

    pub fn request_config<T: Into<String>>(url: T) -> Self {
        Reply {
            action_response: Some(ActionResponse {
                response_type: ActionResponseType::RequestConfig,
                url: Some(url.into()),
            }),
            ..Self::default()
        }
    }

    pub fn with_action_response(mut self, response_type: ActionResponseType) -> Self {
        self.action_response = Some(ActionResponse {
            response_type,
            url: None,
        });
        self
    }

    pub fn in_thread<T: Into<String>>(mut self, thread_name: T) -> Self {
        self.thread = Some(ThreadRef {
            name: thread_name.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Standard error card used for commands nobody registered.
    pub fn invalid_command(command: &str) -> Self {
        let card = Card::new(CardHeader::titled("Error")).with_section(Section::new(vec![
            Widget::DecoratedText {
                top_label: Some("ERROR.".to_string()),
                text: format!("'{command}' is not a valid command."),
                start_icon: Some(Icon::known("STAR")),
            },
        ]));
        Reply::cards_v2(vec![CardWithId::new("error", card)])
    }
}
