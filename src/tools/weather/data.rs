//! Mock weather tables shared by every weather tool.

/// Current conditions for a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityWeather {
    pub temp_c: i32,
    pub condition: &'static str,
    pub humidity_pct: i32,
    pub wind_kmh: u32,
}

/// Record returned for any city missing from [`CITY_WEATHER`].
pub const DEFAULT_WEATHER: CityWeather = CityWeather {
    temp_c: 20,
    condition: "Unknown",
    humidity_pct: 60,
    wind_kmh: 10,
};

pub const CITY_WEATHER: &[(&str, CityWeather)] = &[
    ("Tokyo", CityWeather { temp_c: 22, condition: "Partly Cloudy", humidity_pct: 65, wind_kmh: 12 }),
    ("Paris", CityWeather { temp_c: 18, condition: "Light Rain", humidity_pct: 80, wind_kmh: 8 }),
    ("New York", CityWeather { temp_c: 25, condition: "Sunny", humidity_pct: 55, wind_kmh: 15 }),
    ("London", CityWeather { temp_c: 16, condition: "Overcast", humidity_pct: 75, wind_kmh: 10 }),
    ("Sydney", CityWeather { temp_c: 28, condition: "Clear", humidity_pct: 60, wind_kmh: 20 }),
];

/// One day of the canned forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastDay {
    pub high_c: i32,
    pub low_c: i32,
    pub condition: &'static str,
    pub rain_chance_pct: u32,
}

pub const FORECAST_TEMPLATES: [ForecastDay; 7] = [
    ForecastDay { high_c: 24, low_c: 18, condition: "Sunny", rain_chance_pct: 10 },
    ForecastDay { high_c: 22, low_c: 16, condition: "Partly Cloudy", rain_chance_pct: 25 },
    ForecastDay { high_c: 20, low_c: 14, condition: "Light Rain", rain_chance_pct: 70 },
    ForecastDay { high_c: 26, low_c: 20, condition: "Clear", rain_chance_pct: 5 },
    ForecastDay { high_c: 19, low_c: 13, condition: "Overcast", rain_chance_pct: 40 },
    ForecastDay { high_c: 23, low_c: 17, condition: "Scattered Showers", rain_chance_pct: 60 },
    ForecastDay { high_c: 25, low_c: 19, condition: "Sunny", rain_chance_pct: 15 },
];

pub const DAY_LABELS: [&str; 7] = ["Today", "Tomorrow", "Day 3", "Day 4", "Day 5", "Day 6", "Day 7"];

pub const CITY_ALERTS: &[(&str, &[&str])] = &[
    ("Miami", &["🌀 Tropical Storm Watch in effect", "🌊 Coastal Flood Advisory"]),
    ("Phoenix", &["🔥 Excessive Heat Warning", "💨 Dust Storm Advisory"]),
    ("Denver", &["❄️ Winter Weather Advisory", "🌨️ Heavy Snow Warning"]),
    ("San Francisco", &["🌫️ Dense Fog Advisory"]),
];

/// Look up current conditions, falling back to [`DEFAULT_WEATHER`].
///
/// `city` must already be title-cased.
pub fn lookup_weather(city: &str) -> CityWeather {
    CITY_WEATHER
        .iter()
        .find(|(name, _)| *name == city)
        .map(|(_, weather)| *weather)
        .unwrap_or(DEFAULT_WEATHER)
}

/// Active alerts for a title-cased city; empty when it has none.
pub fn lookup_alerts(city: &str) -> &'static [&'static str] {
    CITY_ALERTS
        .iter()
        .find(|(name, _)| *name == city)
        .map(|(_, alerts)| *alerts)
        .unwrap_or(&[])
}

/// Title-case a city name: the first letter of every run of letters is
/// upper-cased and the rest lower-cased ("new york" -> "New York",
/// "SAN FRANCISCO" -> "San Francisco").
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;

    for c in input.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_normalizes_words() {
        assert_eq!(title_case("tokyo"), "Tokyo");
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("SAN FRANCISCO"), "San Francisco");
        assert_eq!(title_case("o'hare"), "O'Hare");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn known_and_unknown_cities() {
        assert_eq!(lookup_weather("Sydney").temp_c, 28);
        assert_eq!(lookup_weather("Atlantis"), DEFAULT_WEATHER);
        // lookups are exact; callers title-case first
        assert_eq!(lookup_weather("tokyo"), DEFAULT_WEATHER);
    }

    #[test]
    fn alerts_lookup() {
        assert_eq!(lookup_alerts("San Francisco").len(), 1);
        assert_eq!(lookup_alerts("Miami").len(), 2);
        assert!(lookup_alerts("Tokyo").is_empty());
    }
}
