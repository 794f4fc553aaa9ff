use lazy_static::lazy_static;

use crate::command::Command;
use crate::reply::{Card, CardHeader, CardWithId, Icon, Reply, Section, Widget};

use super::{CommandContext, CommandProcessor};

pub struct HelloCommandProcessor {}

lazy_static! {
    static ref INSTANCE: HelloCommandProcessor = HelloCommandProcessor {};
}

impl HelloCommandProcessor {
    pub fn static_new() -> &'static Self {
        &INSTANCE
    }
}

impl CommandProcessor for HelloCommandProcessor {
    fn process(
        &'static self,
        _context: &CommandContext,
        _command: &Command,
    ) -> anyhow::Result<Reply> {
        let card = Card::new(CardHeader::titled("GREETING app")).with_section(Section::new(vec![
            Widget::DecoratedText {
                top_label: None,
                text: "Hello world!".to_string(),
                start_icon: Some(Icon::known("MULTIPLE_PEOPLE")),
            },
        ]));
        Ok(Reply::cards_v2(vec![CardWithId::new("hello", card)]))
    }

    fn matches(&'static self, command: &Command) -> bool {
        command.is_text_command(&["hello", "hello_world"])
    }

    fn usage(&'static self) -> Option<&'static str> {
        Some("`hello`: say hello")
    }
}
