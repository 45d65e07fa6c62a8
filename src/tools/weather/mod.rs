//! Weather Tool Implementations
//!
//! Four tools backed by the mock tables in [`data`]: current conditions,
//! a multi-day forecast, active alerts, and a two-city comparison. City
//! names are title-cased before lookup and unknown cities get a default
//! record, so every call succeeds for any string input.

pub mod data;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{json, Number, Value};
use std::collections::HashMap;
use std::fmt::Write;

use crate::core::error::ToolError;
use crate::core::server::{MCPTool, ToolHandler, ToolRegistry};
use crate::tools::parse_args;
use data::{title_case, DAY_LABELS, FORECAST_TEMPLATES};

/// Forecast length used when the caller omits `days`.
pub const DEFAULT_FORECAST_DAYS: i64 = 3;
/// Longest forecast the server will produce.
pub const MAX_FORECAST_DAYS: i64 = 7;

fn rule(width: usize) -> String {
    "━".repeat(width)
}

/// Current weather snapshot for a city.
pub fn get_current_weather(city: &str) -> String {
    let city = title_case(city);
    let weather = data::lookup_weather(&city);

    format!(
        "🌤️ Current Weather in {city}:\n\
         {rule}\n\
         🌡️  Temperature: {}°C\n\
         ☁️  Condition: {}\n\
         💧 Humidity: {}%\n\
         💨 Wind Speed: {} km/h\n\
         {rule}\n",
        weather.temp_c,
        weather.condition,
        weather.humidity_pct,
        weather.wind_kmh,
        rule = rule(32),
    )
}

/// Multi-day forecast. `days` is clamped to `1..=7`.
pub fn get_weather_forecast(city: &str, days: i64) -> String {
    let city = title_case(city);
    let days = days.clamp(1, MAX_FORECAST_DAYS) as usize;

    let mut text = format!("📅 {days}-Day Weather Forecast for {city}:\n{}\n", rule(47));

    for i in 0..days {
        let day = DAY_LABELS[i];
        let forecast = FORECAST_TEMPLATES[i % FORECAST_TEMPLATES.len()];

        let _ = writeln!(text, "📆 {day}:");
        let _ = writeln!(
            text,
            "   🌡️  High: {}°C | Low: {}°C",
            forecast.high_c, forecast.low_c
        );
        let _ = writeln!(text, "   ☁️  {}", forecast.condition);
        let _ = writeln!(text, "   🌧️  Rain Chance: {}%", forecast.rain_chance_pct);

        if i + 1 < days {
            let _ = writeln!(text, "   {}", "─".repeat(40));
        }
    }

    text.push_str(&rule(47));
    text
}

/// Active weather alerts for a city, or a "no alerts" notice.
pub fn get_weather_alerts(city: &str) -> String {
    let city = title_case(city);
    let alerts = data::lookup_alerts(&city);

    if alerts.is_empty() {
        return format!("✅ No weather alerts for {city} at this time.");
    }

    let mut text = format!("⚠️  Weather Alerts for {city}:\n{}\n", rule(39));
    for (i, alert) in alerts.iter().enumerate() {
        let _ = writeln!(text, "{}. {}", i + 1, alert);
    }
    let _ = writeln!(text, "{}", rule(39));
    text.push_str("🔔 Stay informed and follow local authorities' guidance.");
    text
}

/// Side-by-side comparison of current conditions in two cities.
pub fn compare_weather(city1: &str, city2: &str) -> String {
    let city1 = title_case(city1);
    let city2 = title_case(city2);
    let weather1 = data::lookup_weather(&city1);
    let weather2 = data::lookup_weather(&city2);

    let temp_diff = weather1.temp_c - weather2.temp_c;
    let humidity_diff = weather1.humidity_pct - weather2.humidity_pct;

    let mut text = format!("🌍 Weather Comparison: {city1} vs {city2}\n");
    let _ = writeln!(text, "{}", rule(62));
    let _ = writeln!(text, "📍 {city1:<15} | 📍 {city2}");
    let _ = writeln!(
        text,
        "🌡️  {}°C{:<12} | 🌡️  {}°C",
        weather1.temp_c, "", weather2.temp_c
    );
    let _ = writeln!(
        text,
        "☁️  {:<15} | ☁️  {}",
        weather1.condition, weather2.condition
    );
    let _ = writeln!(
        text,
        "💧 {}% humidity{:<5} | 💧 {}% humidity",
        weather1.humidity_pct, "", weather2.humidity_pct
    );
    let _ = writeln!(text, "{}", rule(62));

    if temp_diff > 0 {
        let _ = writeln!(text, "🔥 {city1} is {}°C warmer than {city2}", temp_diff.abs());
    } else if temp_diff < 0 {
        let _ = writeln!(text, "❄️  {city2} is {}°C warmer than {city1}", temp_diff.abs());
    } else {
        let _ = writeln!(text, "🌡️  Both cities have the same temperature");
    }

    if humidity_diff > 0 {
        let _ = write!(text, "💧 {city1} is {}% more humid than {city2}", humidity_diff.abs());
    } else if humidity_diff < 0 {
        let _ = write!(text, "💧 {city2} is {}% more humid than {city1}", humidity_diff.abs());
    } else {
        text.push_str("💧 Both cities have the same humidity level");
    }

    text
}

#[derive(Deserialize)]
struct CityArgs {
    city: String,
}

#[derive(Deserialize)]
struct ForecastArgs {
    city: String,
    #[serde(default, deserialize_with = "lenient_days")]
    days: Option<i64>,
}

/// Accept any whole number for `days`: JSON integers of any size, integral
/// floats like `5.0`, and numeric strings like `"5"`. Values outside `i64`
/// saturate, since they are clamped afterwards anyway.
fn lenient_days<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => whole_number(&n)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("days must be a whole number, got {n}"))),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            let parsed = match trimmed.parse::<i64>() {
                Ok(days) => Some(days),
                Err(_) => trimmed.parse::<f64>().ok().and_then(whole_float),
            };
            parsed
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("days must be a whole number, got {s:?}")))
        }
        Some(other) => Err(de::Error::custom(format!(
            "days must be a whole number, got {other}"
        ))),
    }
}

fn whole_number(n: &Number) -> Option<i64> {
    if let Some(days) = n.as_i64() {
        return Some(days);
    }
    if n.as_u64().is_some() {
        return Some(i64::MAX);
    }
    n.as_f64().and_then(whole_float)
}

// `as` saturates at the i64 bounds
fn whole_float(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

#[derive(Deserialize)]
struct CompareArgs {
    city1: String,
    city2: String,
}

fn city_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "city": {
                "type": "string",
                "description": description
            }
        },
        "required": ["city"]
    })
}

/// Register the weather tools with the tool registry.
///
/// Honors `default_forecast_days` from the `tools.weather` config section;
/// the configured value is clamped like any requested day count.
pub fn register(registry: &mut ToolRegistry, config: &HashMap<String, Value>) {
    let default_days = config
        .get("default_forecast_days")
        .and_then(|v| v.as_i64())
        .unwrap_or(DEFAULT_FORECAST_DAYS)
        .clamp(1, MAX_FORECAST_DAYS);

    let current: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let args: CityArgs = parse_args(args)?;
        Ok(Value::String(get_current_weather(&args.city)))
    });
    registry.register(
        MCPTool {
            name: "get_current_weather".to_string(),
            description: "Get the current weather for a specified city.".to_string(),
            input_schema: city_schema("The name of the city to get weather for"),
        },
        current,
    );

    let forecast: ToolHandler = Box::new(move |args: Value| -> Result<Value, ToolError> {
        let args: ForecastArgs = parse_args(args)?;
        let days = args.days.unwrap_or(default_days);
        Ok(Value::String(get_weather_forecast(&args.city, days)))
    });
    registry.register(
        MCPTool {
            name: "get_weather_forecast".to_string(),
            description: "Get a multi-day weather forecast for a specified city.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "The name of the city to get forecast for"
                    },
                    "days": {
                        "type": "integer",
                        "description": "Number of days to forecast (max: 7)",
                        "default": default_days
                    }
                },
                "required": ["city"]
            }),
        },
        forecast,
    );

    let alerts: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let args: CityArgs = parse_args(args)?;
        Ok(Value::String(get_weather_alerts(&args.city)))
    });
    registry.register(
        MCPTool {
            name: "get_weather_alerts".to_string(),
            description: "Get weather alerts and warnings for a specified city.".to_string(),
            input_schema: city_schema("The name of the city to check for alerts"),
        },
        alerts,
    );

    let compare: ToolHandler = Box::new(|args: Value| -> Result<Value, ToolError> {
        let args: CompareArgs = parse_args(args)?;
        Ok(Value::String(compare_weather(&args.city1, &args.city2)))
    });
    registry.register(
        MCPTool {
            name: "compare_weather".to_string(),
            description: "Compare current weather between two cities.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "city1": { "type": "string", "description": "First city to compare" },
                    "city2": { "type": "string", "description": "Second city to compare" }
                },
                "required": ["city1", "city2"]
            }),
        },
        compare,
    );
}
