//! Round trip example: a weather tool answered by a scripted model.
//!
//! The scripted completer stands in for a real backend adapter: its first
//! turn calls the `weather` tool, its second turn answers with text. Watch
//! the debug logs to follow every request and tool call. Run with:
//! ```sh
//! RUST_LOG=debug cargo run -p gai-core --example round_trip
//! ```

use gai_core::{
    ChatCompleteRequest, Context, Message, Schematic, Tool,
    testing::{ScriptedCompleter, ScriptedTurn},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Look up the weather
#[derive(Deserialize, Schematic)]
struct WeatherArgs {
    /// The city to look up
    city: String,
    /// Number of days to forecast
    #[schema(minimum = 1, maximum = 7)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    days: Option<u8>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let weather = Tool::typed(
        "weather",
        "Returns the weather for a city.",
        |_ctx, args: WeatherArgs| async move {
            let days = args.days.unwrap_or(1);
            Ok(format!("{}: sunny for the next {days} day(s), 21°C", args.city))
        },
    )
    .with_summarize(|_ctx, args: Value| async move {
        Ok(format!("looking up the weather in {}", args["city"]))
    });

    println!(
        "weather schema: {}",
        serde_json::to_string_pretty(&weather.declaration())?
    );

    let completer = ScriptedCompleter::new([
        ScriptedTurn::tool_call("call_1", "weather", json!({ "city": "Lisbon", "days": 2 })),
        ScriptedTurn::text(["It will be sunny ", "in Lisbon for two days."]),
    ]);

    let request = ChatCompleteRequest::new(vec![Message::user("How is the weather in Lisbon?")])
        .with_system("You are a helpful assistant with a weather tool.")
        .with_tool(weather);
    let mut round_trip = gai_core::RoundTrip::new(&completer, request).with_max_steps(4);

    let turn = round_trip.run(&Context::new()).await?;
    println!("answer: {}", turn.text()?);
    println!("conversation: {}", serde_json::to_string_pretty(round_trip.messages())?);
    Ok(())
}
