//! Natural-language snippets embedded into the model prompt

use chrono::DateTime;

use crate::clients::{AirPollutionSample, CurrentConditions, ForecastBundle};
use crate::models::Article;
use crate::models::weather::aqi_label;

fn plural(days: u32) -> &'static str {
    if days == 1 { "" } else { "s" }
}

/// Rundown of the latest articles, top 5, publication dates spelled out.
#[must_use]
pub fn news_summary(articles: &[Article], location: &str, days_back: u32) -> String {
    if articles.is_empty() {
        return format!(
            "No news found for {location} in the past {days_back} day{}.",
            plural(days_back)
        );
    }

    let mut summary = format!(
        "Here's a detailed rundown of the latest news for {location} from the past {days_back} day{}:\n\n",
        plural(days_back)
    );
    for (index, article) in articles.iter().take(5).enumerate() {
        let published = DateTime::parse_from_rfc3339(&article.published_at)
            .map(|date| date.format("%A, %B %-d, %Y").to_string())
            .unwrap_or_else(|_| article.published_at.clone());
        summary.push_str(&format!(
            "**{}. {}** (Published by *{}* on {})\n{}\n\n",
            index + 1,
            article.title,
            article.source.name,
            published,
            article
                .description
                .as_deref()
                .unwrap_or("No description available.")
        ));
    }
    summary
}

/// 5-day forecast text from the first five forecast slots.
#[must_use]
pub fn forecast_text(forecast: &ForecastBundle, location: &str) -> String {
    if forecast.list.is_empty() {
        return format!("No forecast data available for {location}.");
    }

    let mut text = format!("Here's the 5-day weather forecast for {location}:\n\n");
    for entry in forecast.list.iter().take(5) {
        let date = DateTime::from_timestamp(entry.dt, 0)
            .map(|date| date.format("%A, %b %-d").to_string())
            .unwrap_or_else(|| entry.dt.to_string());
        let description = entry
            .weather
            .first()
            .map_or("unknown", |tag| tag.description.as_str());
        text.push_str(&format!(
            "**{date}**: {}°C, {description}, Humidity: {}%\n",
            entry.main.temp, entry.main.humidity
        ));
    }
    text
}

/// Temperature-banded clothing suggestion with rain/sun add-ons.
#[must_use]
pub fn clothing_suggestion(current: &CurrentConditions, location: &str) -> String {
    let temp = current.main.temp;
    let description = current
        .weather
        .first()
        .map_or(String::new(), |tag| tag.description.to_lowercase());

    let mut suggestion = format!(
        "Here's what to wear in {location} today (currently {temp}°C, {description}):\n"
    );

    if temp < 5.0 {
        suggestion.push_str("- Bundle up with a heavy coat, scarf, gloves, and warm layers.");
    } else if temp < 15.0 {
        suggestion.push_str("- A jacket or sweater with long pants should do the trick.");
    } else if temp < 25.0 {
        suggestion.push_str("- Light clothing like a t-shirt and jeans works well.");
    } else {
        suggestion.push_str("- Go for shorts, a t-shirt, and maybe some sunglasses!");
    }

    if description.contains("rain") {
        suggestion.push_str("\n- Don't forget an umbrella or raincoat, it's wet out there!");
    } else if description.contains("clear") || description.contains("sun") {
        suggestion.push_str("\n- Sunscreen might be a good idea with all that sunshine.");
    }

    suggestion
}

/// One-sentence air quality summary for the prompt.
#[must_use]
pub fn air_quality_sentence(sample: &AirPollutionSample, location: &str) -> String {
    format!(
        "The air quality in {location} is at AQI {} ({}). PM2.5: {} µg/m³, O3: {} µg/m³.",
        sample.main.aqi,
        aqi_label(sample.main.aqi),
        sample.components.pm2_5,
        sample.components.o3
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::weather::{
        AqiBlock, CloudsBlock, ConditionTag, MainMeasurements, PollutantComponents, SysBlock,
        WindBlock,
    };
    use crate::models::ArticleSource;

    fn current(temp: f64, description: &str) -> CurrentConditions {
        CurrentConditions {
            main: MainMeasurements {
                temp,
                feels_like: temp,
                temp_min: temp,
                temp_max: temp,
                pressure: 1013.0,
                humidity: 50.0,
            },
            weather: vec![ConditionTag {
                id: 800,
                main: "Clear".to_string(),
                description: description.to_string(),
                icon: "01d".to_string(),
            }],
            wind: WindBlock {
                speed: 2.0,
                deg: 90.0,
            },
            clouds: CloudsBlock { all: 10.0 },
            sys: SysBlock {
                country: Some("FR".to_string()),
                sunrise: 0,
                sunset: 0,
            },
            timezone: 0,
            visibility: 10_000.0,
            name: None,
        }
    }

    #[test]
    fn test_news_summary_empty() {
        let summary = news_summary(&[], "Paris", 1);
        assert_eq!(summary, "No news found for Paris in the past 1 day.");
    }

    #[test]
    fn test_news_summary_lists_top_articles() {
        let articles: Vec<Article> = (0..7)
            .map(|i| Article {
                title: format!("Story {i}"),
                description: Some(format!("Detail {i}")),
                url: "https://example.com".to_string(),
                url_to_image: None,
                published_at: "2025-05-01T08:00:00Z".to_string(),
                source: ArticleSource {
                    name: "Example Times".to_string(),
                },
            })
            .collect();

        let summary = news_summary(&articles, "Paris", 3);
        assert!(summary.contains("past 3 days"));
        assert!(summary.contains("**1. Story 0**"));
        assert!(summary.contains("**5. Story 4**"));
        assert!(!summary.contains("Story 5"), "only five articles are listed");
        assert!(summary.contains("Thursday, May 1, 2025"));
    }

    #[test]
    fn test_clothing_bands() {
        assert!(clothing_suggestion(&current(0.0, "snow"), "Oslo").contains("heavy coat"));
        assert!(clothing_suggestion(&current(10.0, "cloudy"), "Paris").contains("jacket"));
        assert!(clothing_suggestion(&current(20.0, "cloudy"), "Rome").contains("t-shirt and jeans"));
        assert!(clothing_suggestion(&current(30.0, "clear sky"), "Cairo").contains("shorts"));
    }

    #[test]
    fn test_clothing_addons() {
        let rainy = clothing_suggestion(&current(12.0, "light rain"), "London");
        assert!(rainy.contains("umbrella"));

        let sunny = clothing_suggestion(&current(28.0, "clear sky"), "Lisbon");
        assert!(sunny.contains("Sunscreen"));
    }

    #[test]
    fn test_air_quality_sentence() {
        let sample = AirPollutionSample {
            dt: 0,
            main: AqiBlock { aqi: 4 },
            components: PollutantComponents {
                co: 200.0,
                no2: 11.0,
                o3: 70.0,
                pm2_5: 12.5,
                pm10: 20.0,
            },
        };
        let sentence = air_quality_sentence(&sample, "Milan");
        assert!(sentence.contains("AQI 4 (Poor)"));
        assert!(sentence.contains("PM2.5: 12.5"));
    }
}
