use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::CredentialStore;
use crate::command::CommandDispatcher;
use crate::config::AppConfig;
use crate::event::Event;
use crate::reply::Reply;

use super::messenger::Messenger;
use super::verifier::{RequestVerifier, FAILED_VERIFICATION};

pub struct ChatAppBackend {
    command_dispatcher: CommandDispatcher,
    messenger: Arc<dyn Messenger>,
    verifier: Option<RequestVerifier>,
    async_replies: bool,
}

impl ChatAppBackend {
    pub fn new(
        config: &AppConfig,
        credentials: Arc<dyn CredentialStore>,
        messenger: Arc<dyn Messenger>,
        verifier: Option<RequestVerifier>,
    ) -> &'static Self {
        let backend = ChatAppBackend {
            command_dispatcher: CommandDispatcher::new(config, credentials),
            messenger,
            verifier,
            async_replies: config.async_replies,
        };
        Box::leak(Box::new(backend))
    }

    /// Turns a request body into the HTTP reply.
    ///
    /// When a verifier is configured, requests without a valid bearer token
    /// get the failed-verification text and are not dispatched.
    ///
    /// With asynchronous replies enabled the reply is posted to the event's
    /// space (in the originating thread) and the HTTP reply is `{}`. Replies
    /// carrying an `actionResponse` are never posted. If the messenger refuses
    /// the message the reply goes back synchronously.
    pub fn handle_event(&self, authorization: Option<&str>, body: &[u8]) -> Reply {
        if let Some(verifier) = &self.verifier {
            if let Err(err) = verifier.verify(authorization) {
                warn!(%err, "[Backend]Request failed verification");
                return Reply::text(FAILED_VERIFICATION);
            }
        }
        let event = match Event::from_slice(body) {
            Ok(event) => event,
            Err(err) => return self.command_dispatcher.error_reply(err),
        };
        let space = event.space().map(|s| s.name.as_str()).unwrap_or_default();
        info!(event_type = event.type_name(), space, "[Backend]Event received");

        let reply = self.command_dispatcher.handle(&event);
        // Action responses only take effect as the synchronous answer.
        if !self.async_replies
            || reply.is_empty()
            || reply.action_response.is_some()
            || space.is_empty()
        {
            return reply;
        }
        let outbound = match event.thread() {
            Some(thread) => reply.clone().in_thread(thread.name.as_str()),
            None => reply.clone(),
        };
        match self.messenger.create_message(space, outbound) {
            Ok(()) => Reply::empty(),
            Err(err) => {
                warn!(space, %err, "[Backend]Asynchronous reply failed, answering inline");
                reply
            }
        }
    }
}
