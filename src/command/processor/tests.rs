use std::sync::Arc;

use serde_json::{json, Value};

use super::*;
use crate::auth::{Credentials, InMemoryCredentialStore};
use crate::reply::{ActionResponseType, Widget};

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.app_name = "Test App".to_string();
    config.max_diagnostic_chars = 12;
    config.slash_commands.insert("1".to_string(), "hello".to_string());
    config.slash_commands.insert("2".to_string(), "echo".to_string());
    config.slash_commands.insert("7".to_string(), "deploy".to_string());
    config
}

fn dispatcher_with(store: Arc<InMemoryCredentialStore>) -> CommandDispatcher {
    CommandDispatcher::new(&config(), store)
}

fn dispatcher() -> CommandDispatcher {
    dispatcher_with(Arc::new(InMemoryCredentialStore::new()))
}

fn event(value: Value) -> Event {
    Event::from_value(value).expect("valid event")
}

fn handle_body(dispatcher: &CommandDispatcher, body: &[u8]) -> Reply {
    match Event::from_slice(body) {
        Ok(event) => dispatcher.handle(&event),
        Err(err) => dispatcher.error_reply(err),
    }
}

fn reply_json(dispatcher: &CommandDispatcher, value: Value) -> Value {
    serde_json::to_value(dispatcher.handle(&event(value))).expect("serialize reply")
}

fn dm_message(text: &str) -> Value {
    json!({
        "type": "MESSAGE",
        "space": {"name": "spaces/dm", "type": "DM"},
        "user": {"name": "users/1", "displayName": "Ann"},
        "message": {"text": text}
    })
}

fn mention(argument_text: &str) -> Value {
    json!({
        "type": "MESSAGE",
        "space": {"name": "spaces/eng", "type": "ROOM", "displayName": "Eng"},
        "user": {"name": "users/1", "displayName": "Ann", "email": "ann@example.com"},
        "message": {
            "text": format!("@Bot {argument_text}"),
            "argumentText": format!(" {argument_text}"),
            "annotations": [{
                "type": "USER_MENTION",
                "startIndex": 0,
                "length": 4,
                "userMention": {"user": {"name": "users/app", "type": "BOT"}, "type": "MENTION"}
            }]
        }
    })
}

fn slash_command(id: &str, name: &str, argument_text: &str) -> Value {
    json!({
        "type": "MESSAGE",
        "space": {"name": "spaces/eng", "type": "ROOM"},
        "user": {"name": "users/1", "displayName": "Ann"},
        "message": {
            "text": format!("{name} {argument_text}"),
            "argumentText": argument_text,
            "slashCommand": {"commandId": id},
            "annotations": [{
                "type": "SLASH_COMMAND",
                "slashCommand": {"commandId": id, "commandName": name, "type": "INVOKE"}
            }]
        }
    })
}

fn card_click(action: &str, value: &str) -> Value {
    json!({
        "type": "CARD_CLICKED",
        "space": {"name": "spaces/eng", "type": "ROOM"},
        "user": {"name": "users/1", "displayName": "Ann"},
        "action": {
            "actionMethodName": action,
            "parameters": [{"key": "originalMessage", "value": value}]
        }
    })
}

#[test]
fn added_to_room_thanks_the_space() {
    let reply = reply_json(
        &dispatcher(),
        json!({"type": "ADDED_TO_SPACE", "space": {"type": "ROOM", "displayName": "Eng"}}),
    );
    assert_eq!(reply, json!({"text": "Thanks for adding me to \"Eng\"!"}));
}

#[test]
fn added_to_dm_thanks_the_user() {
    let reply = reply_json(
        &dispatcher(),
        json!({
            "type": "ADDED_TO_SPACE",
            "space": {"type": "DM"},
            "user": {"displayName": "Ann"}
        }),
    );
    assert_eq!(reply, json!({"text": "Thanks for adding me to a DM, Ann!"}));
}

#[test]
fn added_to_dm_without_user_is_not_understood() {
    let dispatcher = dispatcher();
    let added = event(json!({"type": "ADDED_TO_SPACE", "space": {"type": "DM"}}));
    assert!(matches!(
        dispatcher.dispatch(&added),
        Err(DispatchError::InvalidEvent(_))
    ));
    assert_eq!(dispatcher.handle(&added), Reply::text(NOT_UNDERSTOOD));
}

#[test]
fn plain_message_is_echoed() {
    let reply = reply_json(
        &dispatcher(),
        json!({"type": "MESSAGE", "message": {"text": "hello"}, "user": {"displayName": "Ann"}}),
    );
    assert_eq!(reply, json!({"text": "Your message: \"hello\""}));
}

#[test]
fn room_message_without_mention_is_echoed() {
    let reply = reply_json(
        &dispatcher(),
        json!({
            "type": "MESSAGE",
            "space": {"type": "ROOM", "displayName": "Eng"},
            "message": {"text": "help"}
        }),
    );
    assert_eq!(reply, json!({"text": "Your message: \"help\""}));
}

#[test]
fn message_without_message_body_is_invalid() {
    let dispatcher = dispatcher();
    let reply = dispatcher.handle(&event(json!({"type": "MESSAGE"})));
    assert_eq!(reply, Reply::text(NOT_UNDERSTOOD));
}

#[test]
fn slash_command_matches_registered_handler_output() {
    let dispatcher = dispatcher();
    let slash = event(slash_command("1", "/greet", ""));
    let via_dispatcher = dispatcher.handle(&slash);

    let command = Command {
        name: "hello".to_string(),
        args: Vec::new(),
        parameters: Vec::new(),
        origin: CommandOrigin::SlashCommand { id: "1".to_string() },
    };
    let context = CommandContext {
        event: &slash,
        app_name: "Test App",
        usages: &dispatcher.usages,
        credentials: dispatcher.credentials.as_ref(),
        auth: &dispatcher.auth,
    };
    let direct = HelloCommandProcessor::static_new()
        .process(&context, &command)
        .expect("hello never fails");
    assert_eq!(via_dispatcher, direct);
}

#[test]
fn slash_command_passes_argument_text() {
    let reply = reply_json(&dispatcher(), slash_command("2", "/echo", "ship it"));
    assert_eq!(reply, json!({"text": "ship it"}));
}

#[test]
fn slash_command_falls_back_to_annotation_name() {
    let reply = reply_json(&dispatcher(), slash_command("99", "/echo", "fallback"));
    assert_eq!(reply, json!({"text": "fallback"}));
}

#[test]
fn slash_command_mapped_to_unregistered_name_is_unknown() {
    let dispatcher = dispatcher();
    let reply = dispatcher.handle(&event(slash_command("7", "/deploy", "")));
    assert_eq!(reply, Reply::invalid_command("deploy"));
}

#[test]
fn slash_command_without_any_name_is_unknown() {
    let dispatcher = dispatcher();
    let unnamed = event(json!({
        "type": "MESSAGE",
        "message": {"text": "/x", "slashCommand": {"commandId": "42"}}
    }));
    assert_eq!(
        dispatcher.dispatch(&unnamed),
        Err(DispatchError::UnknownCommand("/42".to_string()))
    );
}

#[test]
fn mention_runs_the_named_command() {
    let reply = reply_json(&dispatcher(), mention("echo  good   news"));
    assert_eq!(reply, json!({"text": "good news"}));
}

#[test]
fn mention_normalizes_command_names() {
    let dispatcher = dispatcher();
    let camel = dispatcher.handle(&event(mention("HelloWorld")));
    let plain = dispatcher.handle(&event(mention("hello")));
    assert_eq!(camel, plain);
    assert_eq!(camel.cards_v2[0].card_id, "hello");
}

#[test]
fn mention_with_unknown_command_gets_error_card() {
    let dispatcher = dispatcher();
    let reply = dispatcher.handle(&event(mention("frobnicate now")));
    assert_eq!(reply, Reply::invalid_command("frobnicate"));
}

#[test]
fn bare_mention_shows_help() {
    let dispatcher = dispatcher();
    let reply = dispatcher.handle(&event(mention("")));
    let card = &reply.cards_v2[0];
    assert_eq!(card.card_id, "help");
    assert_eq!(card.card.sections[0].widgets.len(), dispatcher.usages.len());
    let header = card.card.header.as_ref().expect("header");
    assert_eq!(header.title, "Test App");
}

#[test]
fn direct_message_strips_slash_and_runs_command() {
    let dispatcher = dispatcher();
    let reply = dispatcher.handle(&event(dm_message("/hello")));
    assert_eq!(reply.cards_v2[0].card_id, "hello");
}

#[test]
fn direct_message_free_text_is_echoed() {
    let reply = reply_json(&dispatcher(), dm_message("good morning"));
    assert_eq!(reply, json!({"text": "Your message: \"good morning\""}));
}

#[test]
fn card_keywords_build_widgets_in_order() {
    let dispatcher = dispatcher();
    let reply = dispatcher.handle(&event(mention("card header keyword textparagraph image")));
    let card = &reply.cards[0];
    assert_eq!(
        card.header.as_ref().map(|h| h.title.as_str()),
        Some("Test App")
    );
    let widgets = &card.sections[0].widgets;
    assert_eq!(widgets.len(), 2);
    assert!(matches!(widgets[0], Widget::TextParagraph { .. }));
    assert!(matches!(widgets[1], Widget::Image { .. }));
}

#[test]
fn interactive_button_click_updates_message() {
    let reply = reply_json(&dispatcher(), card_click("doTextButtonAction", "card header"));
    assert_eq!(reply["actionResponse"], json!({"type": "UPDATE_MESSAGE"}));
    let widgets = &reply["cards"][0]["sections"][0]["widgets"];
    assert_eq!(widgets[0]["textParagraph"]["text"], "You clicked a text button");
    assert_eq!(widgets[1]["keyValue"]["content"], "card header");
}

#[test]
fn image_button_click_without_parameter_says_so() {
    let dispatcher = dispatcher();
    let click = event(json!({
        "type": "CARD_CLICKED",
        "action": {"actionMethodName": "doImageButtonAction", "parameters": []}
    }));
    let reply = dispatcher.handle(&click);
    assert_eq!(
        reply.action_response.as_ref().map(|a| a.response_type),
        Some(ActionResponseType::UpdateMessage)
    );
    let value = serde_json::to_value(&reply).expect("serialize");
    let widgets = &value["cards"][0]["sections"][0]["widgets"];
    assert_eq!(widgets[0]["textParagraph"]["text"], "You clicked an image button");
    assert_eq!(
        widgets[1]["keyValue"]["content"],
        "<i>Cannot determine original message</i>"
    );
}

#[test]
fn unknown_card_action_gets_standard_error() {
    let dispatcher = dispatcher();
    for name in ["doNothing", "help", "echo"] {
        let reply = dispatcher.handle(&event(card_click(name, "x")));
        assert_eq!(reply, Reply::invalid_command(name));
    }
}

#[test]
fn unknown_common_invoked_function_gets_standard_error() {
    let dispatcher = dispatcher();
    let click = event(json!({
        "type": "CARD_CLICKED",
        "common": {"invokedFunction": "openDialog"}
    }));
    assert_eq!(dispatcher.handle(&click), Reply::invalid_command("openDialog"));
}

#[test]
fn card_click_without_action_is_invalid() {
    let dispatcher = dispatcher();
    let click = event(json!({"type": "CARD_CLICKED", "action": {"actionMethodName": ""}}));
    assert!(matches!(
        dispatcher.dispatch(&click),
        Err(DispatchError::InvalidEvent(_))
    ));
}

#[test]
fn removed_from_space_acknowledges_with_empty_object() {
    let dispatcher = dispatcher();
    let removed = event(json!({"type": "REMOVED_FROM_SPACE", "space": {"name": "spaces/eng"}}));
    let body = serde_json::to_string(&dispatcher.handle(&removed)).expect("serialize");
    assert_eq!(body, "{}");
}

#[test]
fn handler_errors_become_truncated_text() {
    let dispatcher = dispatcher();
    let reply = dispatcher.handle(&event(mention("echo")));
    assert_eq!(reply, Reply::text("Command 'echo' failed: nothing to e..."));
}

struct PanickingProcessor;

impl CommandProcessor for PanickingProcessor {
    fn process(
        &'static self,
        _context: &CommandContext,
        _command: &Command,
    ) -> anyhow::Result<Reply> {
        panic!("kaboom");
    }

    fn matches(&'static self, command: &Command) -> bool {
        command.is_text_command(&["explode"])
    }
}

#[test]
fn handler_panics_are_contained() {
    let mut dispatcher = dispatcher();
    let processor: &'static PanickingProcessor = Box::leak(Box::new(PanickingProcessor));
    dispatcher.processors.push(processor);
    let explode = event(mention("explode"));
    assert_eq!(
        dispatcher.dispatch(&explode),
        Err(DispatchError::HandlerFailure {
            command: "explode".to_string(),
            diagnostic: "kaboom".to_string(),
        })
    );
    assert_eq!(
        dispatcher.handle(&explode),
        Reply::text("Command 'explode' failed: kaboom")
    );
}

#[test]
fn profile_requests_config_until_credentials_exist() {
    let store = Arc::new(InMemoryCredentialStore::new());
    let dispatcher = dispatcher_with(store.clone());

    let reply = reply_json(&dispatcher, mention("profile"));
    assert_eq!(reply["actionResponse"]["type"], "REQUEST_CONFIG");
    let url = reply["actionResponse"]["url"].as_str().expect("url");
    assert!(url.contains("state=users%2F1"));

    store.put_credentials(
        "users/1",
        Credentials {
            access_token: "token".to_string(),
            refresh_token: None,
            scopes: vec!["profile".to_string()],
        },
    );
    let reply = dispatcher.handle(&event(mention("login")));
    let card = &reply.cards_v2[0];
    assert_eq!(card.card_id, "profile");
    assert_eq!(card.card.header.as_ref().map(|h| h.title.as_str()), Some("Ann"));
    assert_eq!(card.card.sections[0].widgets.len(), 2);
}

#[test]
fn logout_forgets_credentials() {
    let store = Arc::new(InMemoryCredentialStore::new());
    store.put_credentials(
        "users/1",
        Credentials {
            access_token: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
            scopes: Vec::new(),
        },
    );
    let dispatcher = dispatcher_with(store.clone());
    let reply = dispatcher.handle(&event(mention("logout")));
    assert_eq!(reply, Reply::text("Logged out."));
    assert!(store.get_credentials("users/1").is_none());
}

#[test]
fn malformed_bodies_are_not_understood() {
    let dispatcher = dispatcher();
    let bodies: [&[u8]; 4] = [b"{", b"[]", b"{\"type\": 3}", b"{\"type\": \"APP_HOME\"}"];
    for body in bodies {
        assert_eq!(handle_body(&dispatcher, body), Reply::text(NOT_UNDERSTOOD));
    }
}

#[test]
fn identical_bodies_give_identical_replies() {
    let dispatcher = dispatcher();
    let bodies = [
        serde_json::to_vec(&mention("card header interactivetextbutton")).expect("body"),
        serde_json::to_vec(&card_click("doTextButtonAction", "x")).expect("body"),
        serde_json::to_vec(&mention("frobnicate")).expect("body"),
    ];
    for body in bodies {
        let first = serde_json::to_vec(&handle_body(&dispatcher, &body)).expect("serialize");
        let second = serde_json::to_vec(&handle_body(&dispatcher, &body)).expect("serialize");
        assert_eq!(first, second);
    }
}

#[test]
fn card_click_without_method_name_falls_back_to_invoked_function() {
    let reply = reply_json(
        &dispatcher(),
        json!({
            "type": "CARD_CLICKED",
            "action": {"parameters": [{"key": "originalMessage", "value": "card header"}]},
            "common": {"invokedFunction": "doTextButtonAction"}
        }),
    );
    assert_eq!(reply["actionResponse"], json!({"type": "UPDATE_MESSAGE"}));
    let widgets = &reply["cards"][0]["sections"][0]["widgets"];
    assert_eq!(widgets[1]["keyValue"]["content"], "card header");
}

#[test]
fn mention_without_argument_text_strips_multi_word_app_name() {
    let reply = reply_json(
        &dispatcher(),
        json!({
            "type": "MESSAGE",
            "space": {"name": "spaces/eng", "type": "ROOM"},
            "message": {
                "text": "@Card Bot echo hi",
                "annotations": [{
                    "type": "USER_MENTION",
                    "startIndex": 0,
                    "length": 9,
                    "userMention": {"user": {"name": "users/app", "displayName": "Card Bot"}}
                }]
            }
        }),
    );
    assert_eq!(reply, json!({"text": "hi"}));
}

fn upvote_click(count: &str) -> Value {
    json!({
        "type": "CARD_CLICKED",
        "space": {"name": "spaces/eng", "type": "ROOM"},
        "user": {"name": "users/1", "displayName": "Ann"},
        "action": {
            "actionMethodName": "upvote",
            "parameters": [
                {"key": "voteId", "value": "vote-1"},
                {"key": "statement", "value": "Tabs over spaces"},
                {"key": "count", "value": count}
            ]
        }
    })
}

#[test]
fn vote_command_posts_a_fresh_vote_card() {
    let reply = reply_json(&dispatcher(), mention("vote Tabs over spaces"));
    assert_eq!(reply["actionResponse"], json!({"type": "NEW_MESSAGE"}));
    let card = &reply["cards"][0];
    assert_eq!(card["header"]["title"], "Vote: Tabs over spaces");
    assert!(card["name"].as_str().is_some_and(|name| !name.is_empty()));
    assert_eq!(
        card["sections"][0]["widgets"][0]["textParagraph"]["text"],
        "0 votes, last vote was by nobody!"
    );
}

#[test]
fn upvote_rewrites_the_card_with_one_more_vote() {
    let reply = reply_json(&dispatcher(), upvote_click("2"));
    assert_eq!(reply["actionResponse"], json!({"type": "UPDATE_MESSAGE"}));
    let card = &reply["cards"][0];
    assert_eq!(card["name"], "vote-1");
    let widgets = &card["sections"][0]["widgets"];
    assert_eq!(widgets[0]["textParagraph"]["text"], "3 votes, last vote was by Ann!");
    let upvote = &widgets[2]["buttons"][0]["textButton"]["onClick"]["action"];
    assert_eq!(upvote["actionMethodName"], "upvote");
    assert_eq!(
        upvote["parameters"],
        json!([
            {"key": "voteId", "value": "vote-1"},
            {"key": "statement", "value": "Tabs over spaces"},
            {"key": "count", "value": "3"}
        ])
    );
}

#[test]
fn upvote_with_bad_count_is_a_handler_failure() {
    let dispatcher = dispatcher();
    let result = dispatcher.dispatch(&event(upvote_click("many")));
    assert!(matches!(
        result,
        Err(DispatchError::HandlerFailure { ref command, .. }) if command == "upvote"
    ));
}

#[test]
fn new_vote_button_starts_another_vote() {
    let reply = reply_json(
        &dispatcher(),
        json!({"type": "CARD_CLICKED", "action": {"actionMethodName": "newvote"}}),
    );
    assert_eq!(reply["actionResponse"], json!({"type": "NEW_MESSAGE"}));
    assert_eq!(reply["cards"][0]["header"]["title"], "Vote: I like voting");
}
