use anyhow::bail;
use lazy_static::lazy_static;

use crate::command::Command;
use crate::reply::Reply;

use super::{CommandContext, CommandProcessor};

/// Repeats whatever follows the command name.
pub struct EchoCommandProcessor {}

lazy_static! {
    static ref INSTANCE: EchoCommandProcessor = EchoCommandProcessor::new();
}

impl EchoCommandProcessor {
    fn new() -> Self {
        EchoCommandProcessor {}
    }

    pub fn static_new() -> &'static Self {
        &INSTANCE
    }
}

impl CommandProcessor for EchoCommandProcessor {
    fn process(
        &'static self,
        _context: &CommandContext,
        command: &Command,
    ) -> anyhow::Result<Reply> {
        if command.args.is_empty() {
            bail!("nothing to echo, try `echo <text>`");
        }
        Ok(Reply::text(command.args_line()))
    }

    fn matches(&'static self, command: &Command) -> bool {
        command.is_text_command(&["echo"])
    }

    fn usage(&'static self) -> Option<&'static str> {
        Some("`echo <text>`: repeat the text back")
    }
}
