use lazy_static::lazy_static;

use crate::command::Command;
use crate::reply::{ActionResponseType, Card, CardHeader, ImageStyle, Reply, Section, Widget};

use super::card::{HEADER_IMAGE, IMAGE_BUTTON_ACTION, ORIGINAL_MESSAGE_KEY, TEXT_BUTTON_ACTION};
use super::{CommandContext, CommandProcessor};

/// Answers clicks on the interactive buttons of the keyword card by
/// rewriting that card in place.
pub struct CardClickProcessor {}

lazy_static! {
    static ref INSTANCE: CardClickProcessor = CardClickProcessor {};
}

impl CardClickProcessor {
    pub fn static_new() -> &'static Self {
        &INSTANCE
    }
}

impl CommandProcessor for CardClickProcessor {
    fn process(
        &'static self,
        context: &CommandContext,
        command: &Command,
    ) -> anyhow::Result<Reply> {
        let clicked = if command.name == TEXT_BUTTON_ACTION {
            "a text button"
        } else {
            "an image button"
        };
        let original = command
            .parameter(ORIGINAL_MESSAGE_KEY)
            .unwrap_or("<i>Cannot determine original message</i>");
        let header = CardHeader::titled(context.app_name)
            .with_subtitle("Interactive card clicked")
            .with_image(HEADER_IMAGE, ImageStyle::Image);
        let card = Card::new(header).with_section(Section::new(vec![
            Widget::TextParagraph {
                text: format!("You clicked {clicked}"),
            },
            Widget::KeyValue {
                top_label: Some("Original message".to_string()),
                content: original.to_string(),
                bottom_label: None,
                icon: None,
            },
        ]));
        Ok(Reply::cards(vec![card]).with_action_response(ActionResponseType::UpdateMessage))
    }

    fn matches(&'static self, command: &Command) -> bool {
        command.is_card_action()
            && (command.name == TEXT_BUTTON_ACTION || command.name == IMAGE_BUTTON_ACTION)
    }
}
