use lib_utils::text::snake_case;

pub use error::DispatchError;
pub use processor::{CommandDispatcher, NOT_UNDERSTOOD};

mod error;
mod processor;

/// Where a command came from. Card actions live in their own namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOrigin {
    SlashCommand { id: String },
    Mention,
    DirectMessage,
    CardAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
    /// Key/value parameters attached to a card action.
    pub parameters: Vec<(String, String)>,
    pub origin: CommandOrigin,
}

impl Command {
    /// Splits a typed command line into a canonical name and its arguments.
    ///
    /// `/Hello world` becomes name `hello`, args `["world"]`. Returns `None`
    /// when nothing is left to use as a name.
    pub fn parse(line: &str, origin: CommandOrigin) -> Option<Self> {
        let line = line.trim();
        let line = line.strip_prefix('/').unwrap_or(line);
        let mut words = line.split_whitespace();
        let name = snake_case(words.next()?);
        if name.is_empty() {
            return None;
        }
        Some(Command {
            name,
            args: words.map(str::to_string).collect(),
            parameters: Vec::new(),
            origin,
        })
    }

    pub fn card_action<T: Into<String>>(name: T, parameters: Vec<(String, String)>) -> Self {
        Command {
            name: name.into(),
            args: Vec::new(),
            parameters,
            origin: CommandOrigin::CardAction,
        }
    }

    pub fn is_card_action(&self) -> bool {
        self.origin == CommandOrigin::CardAction
    }

    /// A typed command (slash, mention or DM) named one of `names`.
    pub fn is_text_command(&self, names: &[&str]) -> bool {
        !self.is_card_action() && names.contains(&self.name.as_str())
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn args_line(&self) -> String {
        self.args.join(" ")
    }
}
