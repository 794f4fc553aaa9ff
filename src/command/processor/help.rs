use lazy_static::lazy_static;

use crate::command::Command;
use crate::reply::{Card, CardHeader, CardWithId, Reply, Section, Widget};

use super::{CommandContext, CommandProcessor};

/// Lists the usage line of every registered typed command.
pub struct HelpCommandProcessor {}

lazy_static! {
    static ref INSTANCE: HelpCommandProcessor = HelpCommandProcessor {};
}

impl HelpCommandProcessor {
    pub fn static_new() -> &'static Self {
        &INSTANCE
    }
}

impl CommandProcessor for HelpCommandProcessor {
    fn process(
        &'static self,
        context: &CommandContext,
        _command: &Command,
    ) -> anyhow::Result<Reply> {
        let widgets = context
            .usages
            .iter()
            .map(|usage| Widget::TextParagraph {
                text: usage.to_string(),
            })
            .collect();
        let header = CardHeader::titled(context.app_name).with_subtitle("Supported commands");
        let card = Card::new(header).with_section(Section::new(widgets));
        Ok(Reply::cards_v2(vec![CardWithId::new("help", card)]))
    }

    fn matches(&'static self, command: &Command) -> bool {
        command.is_text_command(&["help"])
    }

    fn usage(&'static self) -> Option<&'static str> {
        Some("`help`: show this list")
    }
}
