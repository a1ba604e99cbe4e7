//! Tests for configuration and request records.

use gai_core::{
    ChatCompleteRequest, Config, Context, Message, Schema, StepLimit, Temperature, ThinkingLevel,
    Tool,
    testing::{ScriptedCompleter, ScriptedTurn},
};
use serde_json::json;
use std::io::Write;

fn echo() -> Tool {
    Tool::new("echo", "Echoes the text back", Schema::object(), |_ctx, args| async move {
        Ok(args["text"].as_str().unwrap_or_default().to_owned())
    })
}

const CONFIG: &str = r#"
system = "You are terse."
temperature = 0.7
thinking_level = "xhigh"
max_completion_tokens = 256
max_tool_steps = 1
"#;

#[test]
fn parse_config() {
    let config = Config::from_toml(CONFIG).unwrap();
    assert_eq!(config.system.as_deref(), Some("You are terse."));
    assert_eq!(config.temperature.unwrap().to_string(), "0.70");
    assert_eq!(config.thinking_level, Some(ThinkingLevel::XHigh));
    assert_eq!(config.max_completion_tokens, Some(256));
    assert_eq!(config.max_tool_steps, Some(1));
}

#[test]
fn empty_config_is_default() {
    assert_eq!(Config::from_toml("").unwrap(), Config::default());
}

#[test]
fn reject_unknown_keys_and_bad_temperatures() {
    assert!(Config::from_toml("model = \"x\"").is_err());
    assert!(Config::from_toml("temperature = 2.5").is_err());
    assert!(Config::from_toml("thinking_level = \"extreme\"").is_err());
}

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.max_completion_tokens, Some(256));

    let rendered = config.to_toml().unwrap();
    assert_eq!(Config::from_toml(&rendered).unwrap(), config);
}

#[test]
fn load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::load(dir.path().join("missing.toml")).is_err());
}

#[test]
fn config_fills_requests() {
    let config = Config::from_toml(CONFIG).unwrap();
    let request = config.request(vec![Message::user("hi")]);
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.system.as_deref(), Some("You are terse."));
    assert_eq!(request.temperature.unwrap().as_f64(), 0.7);
    assert_eq!(request.max_completion_tokens, Some(256));
    assert!(request.tools.is_empty());

    let request = ChatCompleteRequest::from(Config::default());
    assert!(request.system.is_none());
    assert!(request.temperature.is_none());
}

#[tokio::test]
async fn config_bounds_tool_round_trips() {
    let completer = ScriptedCompleter::new([
        ScriptedTurn::tool_call("1", "echo", json!({ "text": "hi" })),
        ScriptedTurn::text(["done"]),
        ScriptedTurn::tool_call("2", "echo", json!({ "text": "once" })),
        ScriptedTurn::tool_call("3", "echo", json!({ "text": "twice" })),
    ]);
    let config = Config::from_toml(CONFIG).unwrap();
    let ctx = Context::new();

    let mut round_trip = config
        .round_trip(&completer, vec![Message::user("hi")])
        .with_tools([echo()]);
    assert_eq!(round_trip.request().system.as_deref(), Some("You are terse."));
    assert_eq!(round_trip.run(&ctx).await.unwrap().text().unwrap(), "done");
    assert_eq!(round_trip.messages().len(), 4);

    round_trip.push(Message::user("again"));
    let err = round_trip.run(&ctx).await.unwrap_err();
    assert_eq!(err.downcast_ref::<StepLimit>(), Some(&StepLimit(1)));
    assert_eq!(completer.remaining(), 0);
}

#[test]
fn temperature_bounds() {
    assert!(Temperature::new(0.0).is_ok());
    assert!(Temperature::new(2.0).is_ok());
    assert!(Temperature::new(-0.1).is_err());
    assert!(Temperature::new(2.01).is_err());
    assert!(Temperature::new(f64::NAN).is_err());
    assert_eq!(Temperature::new(1.0).unwrap().to_string(), "1.00");
    assert_eq!(Temperature::try_from(0.25).unwrap().as_f64(), 0.25);
}

#[test]
fn thinking_levels() {
    for level in ThinkingLevel::ALL {
        assert_eq!(level.as_str().parse::<ThinkingLevel>().unwrap(), level);
        assert_eq!(
            serde_json::to_value(level).unwrap(),
            json!(level.to_string())
        );
    }
    assert!("extreme".parse::<ThinkingLevel>().is_err());

    let openai = &ThinkingLevel::ALL[..6];
    ThinkingLevel::XHigh.ensure_supported(openai);
}

#[test]
#[should_panic(expected = "unsupported thinking level: max")]
fn unsupported_thinking_level_panics() {
    let gemini = [
        ThinkingLevel::Minimal,
        ThinkingLevel::Low,
        ThinkingLevel::Medium,
        ThinkingLevel::High,
    ];
    ThinkingLevel::Max.ensure_supported(&gemini);
}

#[test]
fn request_builders() {
    let request = ChatCompleteRequest::new(vec![Message::user("hi")])
        .with_system("Be brief.")
        .with_temperature(Temperature::new(0.2).unwrap())
        .with_thinking_level(ThinkingLevel::Low)
        .with_response_schema(Schema::string())
        .with_max_completion_tokens(64);
    assert_eq!(request.system.as_deref(), Some("Be brief."));
    assert_eq!(request.thinking_level, Some(ThinkingLevel::Low));
    assert_eq!(request.response_schema, Some(Schema::string()));
    assert_eq!(request.max_completion_tokens, Some(64));
    assert!(request.tool("anything").is_none());
}
