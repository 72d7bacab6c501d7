//! Intent classification for incoming chat messages
//!
//! One ordered classifier replaces the scattered substring flags of the
//! UI prototype: the first matching rule wins, so precedence (help over
//! greetings over task intents over the refusal) is explicit and testable.
//! Temp-marker and current-location references are orthogonal to intent
//! and exposed as separate predicates.

use regex::Regex;
use std::sync::LazyLock;

/// What the user is asking for, in match-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Exact "help": static usage guide, no model call
    Help,
    Greeting,
    HowAreYou,
    Thanks,
    /// "Plan a trip to ..."
    TripPlanning,
    /// "Things to do in/near ..."
    ThingsToDo,
    /// "Tell me about ..."
    TellMeAbout,
    /// "What are the updates regarding ..." / "Any recent news from ..."
    NewsUpdate,
    /// "How's the air quality ..."
    AirQuality,
    /// "... 5-day forecast ..."
    Forecast,
    /// "What should I wear ..."
    Clothing,
    /// "Somewhere cold", "What are some rainy places ..."
    WeatherPreference,
    /// Meta-questions about weather terminology ("what does AQI mean?")
    WeatherInfo,
    /// Questions about the assistant itself ("what can you do?")
    AppFeature,
    /// Anything else: refused unless the message references a marker
    Unsupported,
}

static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(hello|hi|hey|good (morning|afternoon|evening|night))\b").unwrap()
});
static HOW_ARE_YOU: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(how are you|how's it going|how have you been)\b").unwrap());
static THANKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(thank you|thanks|appreciate it)\b").unwrap());
static WEATHER_INFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"what (does|is) .*(aqi|air quality index|humidity|dew point|uv index|pm2)").unwrap()
});

/// Hard-refused topics, checked before the task intents.
const UNSUPPORTED_TOPICS: [&str; 3] = ["what happened", "events coming up", "restaurants"];

impl Intent {
    /// Classify a message. First matching rule wins.
    #[must_use]
    pub fn classify(message: &str) -> Self {
        let text = message.trim().to_lowercase();

        if text == "help" {
            return Self::Help;
        }
        if GREETING.is_match(&text) {
            return Self::Greeting;
        }
        if HOW_ARE_YOU.is_match(&text) {
            return Self::HowAreYou;
        }
        if THANKS.is_match(&text) {
            return Self::Thanks;
        }
        if UNSUPPORTED_TOPICS.iter().any(|topic| text.contains(topic)) {
            return Self::Unsupported;
        }
        if text.contains("plan a trip to") {
            return Self::TripPlanning;
        }
        if text.contains("things i can do in")
            || text.contains("things to do in")
            || text.contains("things to do near")
        {
            return Self::ThingsToDo;
        }
        if text.contains("tell me about") {
            return Self::TellMeAbout;
        }
        if text.contains("what are the updates regarding") || text.contains("any recent news from")
        {
            return Self::NewsUpdate;
        }
        if text.contains("how's the air quality") {
            return Self::AirQuality;
        }
        if text.contains("5-day forecast") {
            return Self::Forecast;
        }
        if text.contains("what should i wear") {
            return Self::Clothing;
        }
        if text.contains("someplace")
            || text.contains("somewhere")
            || text.contains("place where")
            || text.contains("what are some")
        {
            return Self::WeatherPreference;
        }
        if WEATHER_INFO.is_match(&text) {
            return Self::WeatherInfo;
        }
        if text.contains("what can you do")
            || text.contains("what can you help")
            || text.contains("how do i use")
        {
            return Self::AppFeature;
        }
        Self::Unsupported
    }

    /// Canned conversational intents answered without any enrichment or
    /// model call.
    #[must_use]
    pub fn is_canned(&self) -> bool {
        matches!(
            self,
            Self::Help | Self::Greeting | Self::HowAreYou | Self::Thanks
        )
    }

    /// Intents that cannot proceed without a resolved location.
    #[must_use]
    pub fn requires_location(&self) -> bool {
        matches!(
            self,
            Self::ThingsToDo
                | Self::TellMeAbout
                | Self::TripPlanning
                | Self::NewsUpdate
                | Self::AirQuality
                | Self::Forecast
                | Self::Clothing
                | Self::WeatherPreference
        )
    }
}

/// Whether the message points at the temporary map marker.
#[must_use]
pub fn references_temp_marker(message: &str) -> bool {
    let text = message.to_lowercase();
    text.contains("temporary marker") || text.contains("this location")
}

/// Whether the message points at the user's current location.
#[must_use]
pub fn references_current_location(message: &str) -> bool {
    message.to_lowercase().contains("current location")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("help", Intent::Help)]
    #[case("  HELP  ", Intent::Help)]
    #[case("hello there", Intent::Greeting)]
    #[case("Good morning!", Intent::Greeting)]
    #[case("hey, how are you?", Intent::Greeting)]
    #[case("so, how are you today?", Intent::HowAreYou)]
    #[case("thanks a lot", Intent::Thanks)]
    #[case("Plan a trip to Paris", Intent::TripPlanning)]
    #[case("What are the things to do in Rome within 10 km?", Intent::ThingsToDo)]
    #[case("things to do near this location", Intent::ThingsToDo)]
    #[case("Tell me about London", Intent::TellMeAbout)]
    #[case("What are the updates regarding Berlin?", Intent::NewsUpdate)]
    #[case("Any recent news from Tokyo?", Intent::NewsUpdate)]
    #[case("How's the air quality in Madrid?", Intent::AirQuality)]
    #[case("What's the 5-day forecast for Oslo?", Intent::Forecast)]
    #[case("What should I wear in Vienna today?", Intent::Clothing)]
    #[case("I want to go someplace rainy", Intent::WeatherPreference)]
    #[case("What are some colder places I can go to?", Intent::WeatherPreference)]
    #[case("what does AQI mean?", Intent::WeatherInfo)]
    #[case("what can you do?", Intent::AppFeature)]
    #[case("What's the meaning of life?", Intent::Unsupported)]
    #[case("what happened in 1789?", Intent::Unsupported)]
    #[case("best restaurants in Lyon", Intent::Unsupported)]
    fn test_classification(#[case] message: &str, #[case] expected: Intent) {
        assert_eq!(Intent::classify(message), expected);
    }

    #[test]
    fn test_help_must_be_exact() {
        assert_eq!(Intent::classify("help"), Intent::Help);
        assert_ne!(Intent::classify("help me plan"), Intent::Help);
    }

    #[test]
    fn test_greeting_outranks_task_intents() {
        // Leading greeting wins even when a task phrase follows.
        assert_eq!(Intent::classify("hi, tell me about Paris"), Intent::Greeting);
    }

    #[test]
    fn test_marker_references() {
        assert!(references_temp_marker("Tell me about this location"));
        assert!(references_temp_marker("use the temporary marker"));
        assert!(!references_temp_marker("Tell me about Paris"));
        assert!(references_current_location("weather at my current location"));
    }

    #[test]
    fn test_canned_and_location_requirements() {
        assert!(Intent::Help.is_canned());
        assert!(!Intent::TellMeAbout.is_canned());
        assert!(Intent::TellMeAbout.requires_location());
        assert!(Intent::WeatherPreference.requires_location());
        assert!(!Intent::WeatherInfo.requires_location());
        assert!(!Intent::Unsupported.requires_location());
    }
}
