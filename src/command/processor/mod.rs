use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use lib_utils::text::truncate;
use lib_utils::times::{current_timestamp, elapsed_millis};
use tracing::{debug, error, info, warn};

use account::AccountCommandProcessor;
use card::CardCommandProcessor;
use card_click::CardClickProcessor;
use echo::EchoCommandProcessor;
use hello::HelloCommandProcessor;
use help::HelpCommandProcessor;
use vote::VoteCommandProcessor;

use crate::auth::CredentialStore;
use crate::config::{AppConfig, AuthConfig};
use crate::event::{
    AddedToSpaceEvent, CardClickedEvent, ChatMessage, Event, MessageEvent, Space, User,
};
use crate::reply::Reply;

use super::{Command, CommandOrigin, DispatchError};

mod account;
mod card;
mod card_click;
mod echo;
mod hello;
mod help;
#[cfg(test)]
mod tests;
mod vote;

pub const NOT_UNDERSTOOD: &str = "Sorry, I did not understand that event.";

/// What a processor gets to see while it runs.
pub struct CommandContext<'a> {
    pub event: &'a Event,
    pub app_name: &'a str,
    /// Usage lines of every typed command, in registration order.
    pub usages: &'a [&'static str],
    pub credentials: &'a dyn CredentialStore,
    pub auth: &'a AuthConfig,
}

impl CommandContext<'_> {
    pub fn user(&self) -> Option<&User> {
        self.event.user()
    }
}

/// A registered command handler. Instances are `'static` singletons.
trait CommandProcessor: Send + Sync {
    /// Builds the reply for a command this processor matched.
    fn process(&'static self, context: &CommandContext, command: &Command)
        -> anyhow::Result<Reply>;
    /// Whether this processor handles the command.
    fn matches(&'static self, command: &Command) -> bool;
    /// Line shown by `help`; card actions have none.
    fn usage(&'static self) -> Option<&'static str> {
        None
    }
}

pub struct CommandDispatcher {
    processors: Vec<&'static dyn CommandProcessor>,
    usages: Vec<&'static str>,
    slash_commands: HashMap<String, String>,
    app_name: String,
    max_diagnostic_chars: usize,
    auth: AuthConfig,
    credentials: Arc<dyn CredentialStore>,
}

impl CommandDispatcher {
    pub fn new(config: &AppConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        let mut processors: Vec<&'static dyn CommandProcessor> = Vec::new();
        processors.push(HelpCommandProcessor::static_new());
        processors.push(HelloCommandProcessor::static_new());
        processors.push(EchoCommandProcessor::static_new());
        processors.push(CardCommandProcessor::static_new());
        processors.push(AccountCommandProcessor::static_new());
        processors.push(VoteCommandProcessor::static_new());
        processors.push(CardClickProcessor::static_new());
        let usages = processors.iter().filter_map(|p| p.usage()).collect();
        CommandDispatcher {
            processors,
            usages,
            slash_commands: config.slash_commands.clone(),
            app_name: config.app_name.clone(),
            max_diagnostic_chars: config.max_diagnostic_chars,
            auth: config.auth.clone(),
            credentials,
        }
    }
}

impl CommandDispatcher {
    /// Always produces a reply; failures become user-visible error replies.
    pub fn handle(&self, event: &Event) -> Reply {
        match self.dispatch(event) {
            Ok(reply) => reply,
            Err(err) => self.error_reply(err),
        }
    }

    pub fn dispatch(&self, event: &Event) -> Result<Reply, DispatchError> {
        match event {
            Event::AddedToSpace(added) => self.on_added_to_space(added),
            Event::Message(message) => self.on_message(event, message),
            Event::CardClicked(clicked) => self.on_card_clicked(event, clicked),
            Event::RemovedFromSpace(removed) => {
                let space = removed.space.as_ref().map(|s| s.name.as_str());
                info!(space = space.unwrap_or("unknown"), "[Dispatcher]Removed from space");
                Ok(Reply::empty())
            }
        }
    }

    pub fn error_reply(&self, err: DispatchError) -> Reply {
        match err {
            DispatchError::InvalidEvent(reason) => {
                warn!(%reason, "[Dispatcher]Invalid event");
                Reply::text(NOT_UNDERSTOOD)
            }
            DispatchError::UnknownCommand(name) => {
                info!(command = %name, "[Dispatcher]Unknown command");
                Reply::invalid_command(&name)
            }
            DispatchError::HandlerFailure {
                command,
                diagnostic,
            } => {
                error!(%command, %diagnostic, "[Dispatcher]Command failed");
                Reply::text(format!(
                    "Command '{command}' failed: {}",
                    truncate(&diagnostic, self.max_diagnostic_chars)
                ))
            }
        }
    }

    fn on_added_to_space(&self, added: &AddedToSpaceEvent) -> Result<Reply, DispatchError> {
        if added.space.is_direct_message() {
            let user = added.user.as_ref().ok_or_else(|| {
                DispatchError::InvalidEvent("ADDED_TO_SPACE in a DM without user".into())
            })?;
            Ok(Reply::text(format!(
                "Thanks for adding me to a DM, {}!",
                user.display_name
            )))
        } else {
            Ok(Reply::text(format!(
                "Thanks for adding me to \"{}\"!",
                added.space.display_name
            )))
        }
    }

    fn on_message(&self, event: &Event, message: &MessageEvent) -> Result<Reply, DispatchError> {
        let chat_message = message
            .message
            .as_ref()
            .ok_or_else(|| DispatchError::InvalidEvent("MESSAGE without message".into()))?;

        if chat_message.is_slash_command() {
            let command = self.resolve_slash_command(chat_message)?;
            return self.execute(event, &command);
        }

        if chat_message.starts_with_mention() {
            // A bare mention gets the help card.
            let command = Command::parse(&chat_message.arguments_text(), CommandOrigin::Mention)
                .unwrap_or_else(|| Command {
                    name: "help".to_string(),
                    args: Vec::new(),
                    parameters: Vec::new(),
                    origin: CommandOrigin::Mention,
                });
            return self.execute(event, &command);
        }

        if event.space().map(Space::is_direct_message).unwrap_or(false) {
            if let Some(command) = Command::parse(&chat_message.text, CommandOrigin::DirectMessage)
            {
                if let Some(processor) = self.find(&command) {
                    return self.run(processor, event, &command);
                }
                debug!(command = %command.name, "[Dispatcher]No command for direct message text");
            }
        }

        Ok(Reply::text(format!("Your message: \"{}\"", chat_message.text)))
    }

    fn on_card_clicked(
        &self,
        event: &Event,
        clicked: &CardClickedEvent,
    ) -> Result<Reply, DispatchError> {
        let name = clicked
            .action_name()
            .ok_or_else(|| DispatchError::InvalidEvent("CARD_CLICKED without action".into()))?;
        let command = Command::card_action(name, clicked.parameters());
        self.execute(event, &command)
    }

    /// Maps the slash command id through the configured table, falling back
    /// to the command name carried by the annotation.
    fn resolve_slash_command(&self, message: &ChatMessage) -> Result<Command, DispatchError> {
        let id = message.slash_command_id().unwrap_or_default().to_string();
        let annotated_name = message
            .slash_command_annotation()
            .and_then(|s| s.command_name.clone());
        let name = self
            .slash_commands
            .get(&id)
            .cloned()
            .or_else(|| annotated_name.clone())
            .ok_or_else(|| DispatchError::UnknownCommand(format!("/{id}")))?;
        let mut command = Command::parse(&name, CommandOrigin::SlashCommand { id: id.clone() })
            .ok_or_else(|| DispatchError::UnknownCommand(annotated_name.unwrap_or(name)))?;
        command.args = message
            .arguments_text()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Ok(command)
    }

    fn find(&self, command: &Command) -> Option<&'static dyn CommandProcessor> {
        self.processors
            .iter()
            .copied()
            .find(|processor| processor.matches(command))
    }

    fn execute(&self, event: &Event, command: &Command) -> Result<Reply, DispatchError> {
        let processor = self
            .find(command)
            .ok_or_else(|| DispatchError::UnknownCommand(command.name.clone()))?;
        self.run(processor, event, command)
    }

    fn run(
        &self,
        processor: &'static dyn CommandProcessor,
        event: &Event,
        command: &Command,
    ) -> Result<Reply, DispatchError> {
        let context = CommandContext {
            event,
            app_name: &self.app_name,
            usages: &self.usages,
            credentials: self.credentials.as_ref(),
            auth: &self.auth,
        };
        let started = current_timestamp();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| processor.process(&context, command)));
        let elapsed_ms = elapsed_millis(started) as u64;
        debug!(
            command = %command.name,
            elapsed_ms,
            "[Dispatcher]Command processed"
        );
        match outcome {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(err)) => Err(DispatchError::HandlerFailure {
                command: command.name.clone(),
                diagnostic: format!("{err:#}"),
            }),
            Err(payload) => Err(DispatchError::HandlerFailure {
                command: command.name.clone(),
                diagnostic: panic_message(payload.as_ref()),
            }),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
