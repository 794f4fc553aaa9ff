use lazy_static::lazy_static;

use crate::command::Command;
use crate::reply::{Button, Card, CardHeader, ImageStyle, OnClick, Reply, Section, Widget};

use super::{CommandContext, CommandProcessor};

pub const TEXT_BUTTON_ACTION: &str = "doTextButtonAction";
pub const IMAGE_BUTTON_ACTION: &str = "doImageButtonAction";
pub const ORIGINAL_MESSAGE_KEY: &str = "originalMessage";
pub const HEADER_IMAGE: &str = "https://goo.gl/5obRKj";
const WIDGET_IMAGE: &str = "https://goo.gl/Bpa3Y5";
const LINK_URL: &str = "https://developers.google.com";

/// Builds a legacy card from keywords, one widget per recognised word, in
/// the order the words were typed. Unrecognised words are ignored.
pub struct CardCommandProcessor {}

lazy_static! {
    static ref INSTANCE: CardCommandProcessor = CardCommandProcessor {};
}

impl CardCommandProcessor {
    pub fn static_new() -> &'static Self {
        &INSTANCE
    }
}

impl CommandProcessor for CardCommandProcessor {
    fn process(
        &'static self,
        context: &CommandContext,
        command: &Command,
    ) -> anyhow::Result<Reply> {
        let original = command.args_line();
        let mut header = None;
        let mut widgets = Vec::new();
        for word in command.args.iter().map(|w| w.to_lowercase()) {
            match word.as_str() {
                "header" => {
                    header = Some(
                        CardHeader::titled(context.app_name)
                            .with_subtitle("Card header")
                            .with_image(HEADER_IMAGE, ImageStyle::Image),
                    )
                }
                "textparagraph" => widgets.push(Widget::TextParagraph {
                    text: "<b>This</b> is a <i>text paragraph</i>.".to_string(),
                }),
                "keyvalue" => widgets.push(Widget::KeyValue {
                    top_label: Some("KeyValue Widget".to_string()),
                    content: "This is a KeyValue widget".to_string(),
                    bottom_label: Some("The bottom label".to_string()),
                    icon: Some("STAR".to_string()),
                }),
                "interactivetextbutton" => {
                    widgets.push(Widget::Buttons(vec![Button::TextButton {
                        text: "INTERACTIVE BUTTON".to_string(),
                        on_click: OnClick::action(
                            TEXT_BUTTON_ACTION,
                            ORIGINAL_MESSAGE_KEY,
                            &original,
                        ),
                    }]))
                }
                "interactiveimagebutton" => {
                    widgets.push(Widget::Buttons(vec![Button::ImageButton {
                        icon: "EVENT_SEAT".to_string(),
                        on_click: OnClick::action(
                            IMAGE_BUTTON_ACTION,
                            ORIGINAL_MESSAGE_KEY,
                            &original,
                        ),
                    }]))
                }
                "textbutton" => widgets.push(Widget::Buttons(vec![Button::TextButton {
                    text: "TEXT BUTTON".to_string(),
                    on_click: OnClick::open_link(LINK_URL),
                }])),
                "imagebutton" => widgets.push(Widget::Buttons(vec![Button::ImageButton {
                    icon: "EVENT_SEAT".to_string(),
                    on_click: OnClick::open_link(LINK_URL),
                }])),
                "image" => widgets.push(Widget::Image {
                    image_url: WIDGET_IMAGE.to_string(),
                    on_click: Some(OnClick::open_link(LINK_URL)),
                }),
                _ => {}
            }
        }
        let card = Card {
            header,
            sections: vec![Section::new(widgets)],
            ..Card::default()
        };
        Ok(Reply::cards(vec![card]))
    }

    fn matches(&'static self, command: &Command) -> bool {
        command.is_text_command(&["card"])
    }

    fn usage(&'static self) -> Option<&'static str> {
        Some(
            "`card <header|textparagraph|keyvalue|image|textbutton|imagebutton|\
             interactivetextbutton|interactiveimagebutton>...`: build a card",
        )
    }
}
