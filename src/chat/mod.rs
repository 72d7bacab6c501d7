//! Chat orchestration pipeline
//!
//! One turn runs as: classify intent, resolve the target location, fan out
//! to the enrichment clients, compose the model prompt, call the hosted
//! model, and shape the reply plus map payload for the UI. Every failure
//! path resolves to a user-visible chat message; nothing here crashes a
//! turn.

pub mod format;
pub mod intent;
pub mod parse;
pub mod trip_plan;

pub use intent::{Intent, references_current_location, references_temp_marker};

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::clients::{
    AirPollutionSample, ChatModel, CurrentConditions, FetchError, ForecastBundle, Geocoder,
    NewsApi, NewsQuota, NewsService, PlacesApi, WeatherApi,
};
use crate::config::TripScoutConfig;
use crate::models::chat::WeatherPayload;
use crate::models::weather::{
    AirQuality, AirQualityComponents, CityInfo, Clouds, DayCondition, DayForecast, DayTemperature,
    Humidity, Pressure, Temperature, Visibility, WeatherCard, Wind, WindDirection, WindSpeed,
    wind_direction_code, wind_direction_name,
};
use crate::models::{Article, ChatReply, ChatResponseData, ChatTurn, Location, PointOfInterest};
use crate::spiral::{SpiralWeatherLocator, format_point, suggestion_pois};
use crate::store::Cache;

const GREETING_REPLY: &str = "Hey there! Hope you're having a great day. How can I help you?";
const HOW_ARE_YOU_REPLY: &str = "I'm doing great, thanks for asking! How about you?";
const THANKS_REPLY: &str = "You're very welcome! Let me know if you need anything else.";
const REFUSAL_REPLY: &str = "Sorry, I can't answer that! I'm built to help with weather, air quality, news updates, nearby activities, and travel planning. What else can I assist you with?";
const NEED_SPOT_REPLY: &str = "Hmm, I need a spot to work with! Drop a marker or give me a place name like 'Paris', and I'll get going!";
const APOLOGY_REPLY: &str = "Yikes, something went off the rails. Let's try again soon!";
const EMPTY_MODEL_REPLY: &str = "Hey, I've got nothing yet - give me a place or a nudge!";

const HELP_REPLY: &str = "Here's what I can do:\n\
1. Plan travel, e.g. \"Plan a trip to Paris\" or \"Plan a trip to this location for 7 days\".\n\
2. Share weather, air quality, and news info, e.g. \"Tell me about London\" or \"Tell me about this location\".\n\
3. List nearby activities, e.g. \"What are the things to do in Paris within 15 km?\".\n\
4. Provide news updates, e.g. \"What are the updates regarding London?\".\n\
5. Answer specific questions like \"How's the air quality in this location?\", \"What's the 5-day forecast?\", or \"What should I wear today?\".\n\
6. Suggest nearby places matching a weather preference, e.g. \"What are some colder places I can go to?\".";

/// Radius reported with spiral weather suggestions, in kilometers
const SPIRAL_RADIUS_KM: f64 = 200.0;

/// A resolved target: coordinates plus the display name used in prompts.
#[derive(Debug, Clone)]
struct ResolvedPlace {
    location: Location,
    name: String,
}

fn ok_or_none<T>(what: &str, result: Result<T, FetchError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{what} fetch failed, continuing without it: {e}");
            None
        }
    }
}

/// The conversational core: one instance serves all turns.
pub struct ChatOrchestrator {
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherApi>,
    places: Arc<dyn PlacesApi>,
    news: NewsService,
    quota: NewsQuota,
    model: Arc<dyn ChatModel>,
    spiral: SpiralWeatherLocator,
    default_radius_km: f64,
    news_days_back_default: u32,
}

impl ChatOrchestrator {
    #[must_use]
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        weather: Arc<dyn WeatherApi>,
        places: Arc<dyn PlacesApi>,
        news_api: Arc<dyn NewsApi>,
        model: Arc<dyn ChatModel>,
        cache: Cache,
        config: &TripScoutConfig,
    ) -> Self {
        let news = NewsService::new(news_api, cache.clone(), &config.news);
        let quota = NewsQuota::new(cache.clone(), config.news.daily_limit);
        let spiral = SpiralWeatherLocator::new(weather.clone(), geocoder.clone(), cache);
        Self {
            geocoder,
            weather,
            places,
            news,
            quota,
            model,
            spiral,
            default_radius_km: config.chat.default_radius_km,
            news_days_back_default: config.news.default_days_back,
        }
    }

    /// Handle one user turn. Never fails: unexpected errors collapse into
    /// a generic apology with no map payload.
    #[instrument(skip(self, message), fields(message_len = message.len()))]
    pub async fn respond(
        &self,
        message: &str,
        temp_marker: Option<Location>,
        current_location: Option<Location>,
    ) -> ChatReply {
        match self
            .respond_inner(message, temp_marker, current_location)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Chat turn failed: {e:#}");
                ChatReply::text(APOLOGY_REPLY)
            }
        }
    }

    async fn respond_inner(
        &self,
        message: &str,
        temp_marker: Option<Location>,
        current_location: Option<Location>,
    ) -> Result<ChatReply> {
        let intent = Intent::classify(message);
        debug!("Classified intent: {intent:?}");

        match intent {
            Intent::Help => return Ok(ChatReply::text(HELP_REPLY)),
            Intent::Greeting => return Ok(ChatReply::text(GREETING_REPLY)),
            Intent::HowAreYou => return Ok(ChatReply::text(HOW_ARE_YOU_REPLY)),
            Intent::Thanks => return Ok(ChatReply::text(THANKS_REPLY)),
            _ => {}
        }

        let refs_marker = references_temp_marker(message);
        let refs_current = references_current_location(message);

        if intent == Intent::Unsupported && !refs_marker && !refs_current {
            return Ok(ChatReply::text(REFUSAL_REPLY));
        }

        let resolved = match self
            .resolve_location(message, intent, refs_marker, refs_current, temp_marker, current_location)
            .await?
        {
            Resolution::Place(place) => Some(place),
            Resolution::NoTarget => None,
            Resolution::Failed(reply) => return Ok(reply),
        };

        let history = build_history(temp_marker, current_location, self.quota.daily_limit());

        let Some(resolved) = resolved else {
            // Conversational turns with no target: terminology questions,
            // app-feature questions, marker references without coordinates.
            let content = self.model.send(&history, message).await?;
            return Ok(finish_content(content, None));
        };

        if intent == Intent::WeatherPreference {
            return self
                .respond_weather_preference(message, &history, current_location, &resolved)
                .await;
        }

        self.respond_enriched(message, intent, &history, &resolved)
            .await
    }

    /// Spiral path: survey around the user's own location and suggest the
    /// top-ranked points. Never touches the generic enrichment clients.
    async fn respond_weather_preference(
        &self,
        message: &str,
        history: &[ChatTurn],
        current_location: Option<Location>,
        resolved: &ResolvedPlace,
    ) -> Result<ChatReply> {
        let center = current_location.unwrap_or(resolved.location);
        let points = self.spiral.locate(center, message).await;
        info!("Spiral survey suggested {} points", points.len());

        let pois = suggestion_pois(&points);
        let cards: Vec<WeatherCard> = points.iter().map(format_point).collect();

        let prompt = format!(
            "{message}\nSpiral Weather Data (top 5 locations within {SPIRAL_RADIUS_KM} km):\n{}\n\
             Provide a friendly response listing these locations with their weather details, \
             matching the user's preference: \"{message}\".",
            serde_json::to_string(&pois)?
        );
        let content = self.model.send(history, &prompt).await?;

        Ok(ChatReply {
            content: trimmed_or_fallback(content),
            data: Some(ChatResponseData {
                pois,
                center,
                radius_km: SPIRAL_RADIUS_KM,
                weather_data: (!cards.is_empty()).then(|| WeatherPayload::Many(cards)),
            }),
        })
    }

    /// Generic path: weather-family fan-out, optional forecast and news,
    /// prompt assembly, model call, card construction.
    async fn respond_enriched(
        &self,
        message: &str,
        intent: Intent,
        history: &[ChatTurn],
        resolved: &ResolvedPlace,
    ) -> Result<ChatReply> {
        let ResolvedPlace { location, name } = resolved;
        let (lat, lng) = (location.lat, location.lng);

        let radius_km = if intent == Intent::ThingsToDo {
            parse::parse_radius_km(message).unwrap_or(self.default_radius_km)
        } else {
            self.default_radius_km
        };
        let news_days_back =
            parse::parse_news_days_back(message).unwrap_or(self.news_days_back_default);

        // The four base fetches are independent of each other.
        let (current_w, current_air, forecast_air, pois) = tokio::join!(
            self.weather.current(lat, lng),
            self.weather.air_pollution(lat, lng),
            self.weather.air_pollution_forecast(lat, lng),
            self.places.nearby(lat, lng, radius_km),
        );
        let current_w = ok_or_none("current weather", current_w);
        let current_air = ok_or_none("current air pollution", current_air);
        let mut forecast_air = ok_or_none("forecast air pollution", forecast_air);
        let mut pois = ok_or_none("nearby POIs", pois);

        let mut forecast_w: Option<ForecastBundle> = None;
        if matches!(
            intent,
            Intent::TellMeAbout | Intent::TripPlanning | Intent::Forecast
        ) {
            forecast_w = ok_or_none("forecast weather", self.weather.forecast(lat, lng).await);
        }

        if matches!(intent, Intent::TellMeAbout | Intent::TripPlanning) {
            // Same parameters as the base fetches above; the duplication is
            // idempotent and kept from the original flow.
            forecast_air = ok_or_none(
                "forecast air pollution",
                self.weather.air_pollution_forecast(lat, lng).await,
            );
            pois = ok_or_none("nearby POIs", self.places.nearby(lat, lng, radius_km).await);
        }

        let mut news_articles: Option<Vec<Article>> = None;
        let mut quota_exceeded = false;
        if matches!(
            intent,
            Intent::TellMeAbout | Intent::TripPlanning | Intent::NewsUpdate
        ) {
            if self.quota.check().await {
                news_articles = self.news.location_news(name, news_days_back).await;
                if news_articles.is_some() {
                    self.quota.increment().await;
                }
            } else {
                info!("Daily news quota exhausted, embedding notice instead");
                quota_exceeded = true;
            }
        }

        let prompt = assemble_prompt(&PromptParts {
            message,
            intent,
            location: *location,
            name,
            radius_km,
            news_days_back,
            current_w: current_w.as_ref(),
            current_air: current_air.as_ref(),
            forecast_air: forecast_air.as_deref(),
            pois: pois.as_deref(),
            forecast_w: forecast_w.as_ref(),
            news_articles: news_articles.as_deref(),
            quota_exceeded,
            daily_limit: self.quota.daily_limit(),
        })?;

        let mut content = self.model.send(history, &prompt).await?;
        if intent == Intent::TripPlanning {
            content = trip_plan::flatten_trip_plan(&content);
        }

        let card = matches!(
            intent,
            Intent::TellMeAbout | Intent::TripPlanning | Intent::AirQuality | Intent::Clothing
        )
        .then(|| build_weather_card(name, current_w.as_ref(), current_air.as_ref(), forecast_w.as_ref()))
        .flatten();

        let data = pois.filter(|pois| !pois.is_empty()).map(|pois| ChatResponseData {
            pois,
            center: *location,
            radius_km,
            weather_data: card.map(|card| WeatherPayload::Single(Box::new(card))),
        });

        Ok(finish_content(content, data))
    }

    /// Location precedence: explicit marker reference, then explicit
    /// current-location reference, then a geocoded place name, then the
    /// supplied current location as a default for intents that need one.
    async fn resolve_location(
        &self,
        message: &str,
        intent: Intent,
        refs_marker: bool,
        refs_current: bool,
        temp_marker: Option<Location>,
        current_location: Option<Location>,
    ) -> Result<Resolution> {
        if refs_marker {
            if let Some(location) = temp_marker {
                let name = self
                    .reverse_name(location)
                    .await
                    .unwrap_or_else(|| "that spot you marked".to_string());
                return Ok(Resolution::Place(ResolvedPlace { location, name }));
            }
        }

        if refs_current {
            if let Some(location) = current_location {
                let name = self
                    .reverse_name(location)
                    .await
                    .unwrap_or_else(|| "your current spot".to_string());
                return Ok(Resolution::Place(ResolvedPlace { location, name }));
            }
        }

        let place_name = parse::extract_place_name(message).filter(|place| {
            let lower = place.to_lowercase();
            lower != "current location" && lower != "this location"
        });

        if let Some(place) = place_name {
            return match self.geocoder.forward(&place).await {
                Ok(Some(hit)) => Ok(Resolution::Place(ResolvedPlace {
                    location: Location::new(hit.lat, hit.lng),
                    name: place,
                })),
                Ok(None) | Err(_) => Ok(Resolution::Failed(ChatReply::text(format!(
                    "Oops, I couldn't find \"{place}\" on the map. Try another spot or drop a marker!"
                )))),
            };
        }

        if intent.requires_location() {
            return match current_location {
                Some(location) => {
                    let name = self
                        .reverse_name(location)
                        .await
                        .unwrap_or_else(|| "your current spot".to_string());
                    Ok(Resolution::Place(ResolvedPlace { location, name }))
                }
                None => Ok(Resolution::Failed(ChatReply::text(NEED_SPOT_REPLY))),
            };
        }

        Ok(Resolution::NoTarget)
    }

    async fn reverse_name(&self, location: Location) -> Option<String> {
        match self.geocoder.reverse(location.lat, location.lng).await {
            Ok(name) => name,
            Err(e) => {
                debug!("Reverse geocoding failed, falling back to a stock name: {e}");
                None
            }
        }
    }
}

enum Resolution {
    Place(ResolvedPlace),
    NoTarget,
    Failed(ChatReply),
}

fn trimmed_or_fallback(content: String) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        EMPTY_MODEL_REPLY.to_string()
    } else {
        trimmed.to_string()
    }
}

fn finish_content(content: String, data: Option<ChatResponseData>) -> ChatReply {
    ChatReply {
        content: trimmed_or_fallback(content),
        data,
    }
}

/// Fixed capability preamble sent as conversation history ahead of every
/// model call.
fn build_history(
    temp_marker: Option<Location>,
    current_location: Option<Location>,
    daily_news_limit: u32,
) -> Vec<ChatTurn> {
    let coords_or = |location: Option<Location>| {
        location.map_or_else(
            || "not provided".to_string(),
            |l| format!("{}, {}", l.lng, l.lat),
        )
    };
    let today = Utc::now().format("%Y-%m-%d");

    let preamble = format!(
        "You're a friendly, chatty Map assistant who loves helping out with a warm, natural tone. You can:\n\
         1. Plan travel (e.g., \"Plan a trip to Paris\" for 7 days).\n\
         2. Share weather, air quality, and news info (e.g., \"Tell me about London\" or \"Tell me about this location\").\n\
         3. List nearby activities (e.g., \"What are the things I can do in Paris (within 15 km)?\").\n\
         4. Provide news updates (e.g., \"What are the updates regarding London?\").\n\
         5. Answer specific queries about air quality, the 5-day forecast, and what to wear.\n\
         6. Suggest nearby locations based on weather preferences (e.g., \"What are some colder places I can go to?\").\n\
         When parsing commands:\n\
         - Use temporary marker coordinates [{marker}] only when \"temporary marker\" or \"this location\" is explicitly mentioned.\n\
         - Use current location coordinates [{current}] for \"current location\" or as the default when no specific place is mentioned.\n\
         - Format naturally with bold text and bullet points.\n\
         - Use location names instead of coordinates in responses.\n\
         - Assume current date is {today}.\n\
         - Limit news requests to {daily_news_limit} per day; if exceeded, say \"You've hit the daily news limit of {daily_news_limit} requests - check back tomorrow!\"",
        marker = coords_or(temp_marker),
        current = coords_or(current_location),
    );

    vec![
        ChatTurn::user(preamble),
        ChatTurn::model(
            "Hey there! I'm your go-to buddy for weather, trips, news, and fun stuff to do. \
             Give me a place or a question, and I'll help out!",
        ),
    ]
}

struct PromptParts<'a> {
    message: &'a str,
    intent: Intent,
    location: Location,
    name: &'a str,
    radius_km: f64,
    news_days_back: u32,
    current_w: Option<&'a CurrentConditions>,
    current_air: Option<&'a AirPollutionSample>,
    forecast_air: Option<&'a [AirPollutionSample]>,
    pois: Option<&'a [PointOfInterest]>,
    forecast_w: Option<&'a ForecastBundle>,
    news_articles: Option<&'a [Article]>,
    quota_exceeded: bool,
    daily_limit: u32,
}

/// Concatenate the message with the resolved target and whichever
/// enrichment data was fetched, in a fixed order.
fn assemble_prompt(parts: &PromptParts<'_>) -> Result<String> {
    let mut prompt = format!(
        "{}\nCoordinates: [{}, {}]\nLocation name: {}",
        parts.message, parts.location.lng, parts.location.lat, parts.name
    );

    if let Some(current) = parts.current_w {
        prompt.push_str(&format!(
            "\nWeather data: {}",
            serde_json::to_string(current)?
        ));
    }
    if let Some(air) = parts.current_air {
        prompt.push_str(&format!(
            "\nCurrent air pollution data: {}",
            serde_json::to_string(air)?
        ));
    }
    if let Some(air_forecast) = parts.forecast_air {
        let window = &air_forecast[..air_forecast.len().min(24)];
        prompt.push_str(&format!(
            "\nForecast air pollution data: {}",
            serde_json::to_string(window)?
        ));
    }
    if let Some(pois) = parts.pois {
        prompt.push_str(&format!(
            "\nNearby POIs (within {} km): {}",
            parts.radius_km,
            serde_json::to_string(pois)?
        ));
    }
    if let Some(forecast) = parts.forecast_w {
        prompt.push_str(&format!(
            "\n5-day weather forecast: {}",
            serde_json::to_string(forecast)?
        ));
    }

    if parts.intent == Intent::AirQuality {
        if let Some(air) = parts.current_air {
            prompt.push_str(&format!(
                "\nAir quality response: {}",
                format::air_quality_sentence(air, parts.name)
            ));
        }
    }
    if parts.intent == Intent::Forecast {
        if let Some(forecast) = parts.forecast_w {
            prompt.push_str(&format!(
                "\nForecast response: {}",
                format::forecast_text(forecast, parts.name)
            ));
        }
    }
    if parts.intent == Intent::Clothing {
        if let Some(current) = parts.current_w {
            prompt.push_str(&format!(
                "\nClothing response: {}",
                format::clothing_suggestion(current, parts.name)
            ));
        }
    }

    if let Some(articles) = parts.news_articles {
        prompt.push_str(&format!(
            "\nRecent news (past {} days):\n{}",
            parts.news_days_back,
            format::news_summary(articles, parts.name, parts.news_days_back)
        ));
    } else if parts.quota_exceeded {
        prompt.push_str(&format!(
            "\nNews: You've hit the daily news limit of {} requests - check back tomorrow!",
            parts.daily_limit
        ));
    }

    Ok(prompt)
}

/// Build the widget card from the three provider payloads. All three must
/// be present (and the forecast non-empty) or no card is produced.
fn build_weather_card(
    name: &str,
    current: Option<&CurrentConditions>,
    air: Option<&AirPollutionSample>,
    forecast: Option<&ForecastBundle>,
) -> Option<WeatherCard> {
    let current = current?;
    let air = air?;
    let forecast = forecast?;
    let first = forecast.list.first()?;

    let description = current
        .weather
        .first()
        .map_or_else(|| "unknown".to_string(), |tag| tag.description.clone());

    Some(WeatherCard {
        city: CityInfo {
            name: name.to_string(),
            country: current
                .sys
                .country
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            sunrise: current.sys.sunrise,
            sunset: current.sys.sunset,
            timezone: current.timezone,
        },
        temperature: Temperature {
            value: current.main.temp,
            min: first.main.temp_min,
            max: first.main.temp_max,
            feels_like: current.main.feels_like,
            unit: "C".to_string(),
        },
        humidity: Humidity {
            value: current.main.humidity,
            unit: "%".to_string(),
        },
        pressure: Pressure {
            value: current.main.pressure,
            unit: "hPa".to_string(),
        },
        wind: Wind {
            speed: WindSpeed {
                value: current.wind.speed,
                unit: "m/s".to_string(),
                name: "Light Breeze".to_string(),
            },
            direction: WindDirection {
                value: current.wind.deg,
                code: wind_direction_code(current.wind.deg).to_string(),
                name: wind_direction_name(current.wind.deg).to_string(),
            },
        },
        clouds: Clouds {
            value: current.clouds.all,
            name: description,
        },
        visibility: Visibility {
            value: current.visibility / 1000.0,
        },
        air_quality: AirQuality {
            index: air.main.aqi,
            components: AirQualityComponents {
                co: air.components.co,
                no2: air.components.no2,
                o3: air.components.o3,
                pm2_5: air.components.pm2_5,
                pm10: air.components.pm10,
            },
        },
        forecast: forecast
            .list
            .iter()
            .take(5)
            .map(|entry| DayForecast {
                dt: entry.dt,
                temp: DayTemperature {
                    day: entry.main.temp,
                    min: entry.main.temp_min,
                    max: entry.main.temp_max,
                    night: entry.main.temp,
                },
                weather: entry.weather.first().map_or_else(
                    || DayCondition {
                        id: 0,
                        main: "Unknown".to_string(),
                        description: "unknown".to_string(),
                        icon: String::new(),
                    },
                    |tag| DayCondition {
                        id: tag.id,
                        main: tag.main.clone(),
                        description: tag.description.clone(),
                        icon: tag.icon.clone(),
                    },
                ),
                pop: entry.pop,
                humidity: entry.main.humidity,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::weather::{
        AqiBlock, CityBlock, CloudsBlock, ConditionTag, ForecastEntry, MainMeasurements,
        PollutantComponents, SysBlock, WindBlock,
    };

    fn current_conditions() -> CurrentConditions {
        CurrentConditions {
            main: MainMeasurements {
                temp: 18.0,
                feels_like: 17.2,
                temp_min: 15.0,
                temp_max: 21.0,
                pressure: 1015.0,
                humidity: 55.0,
            },
            weather: vec![ConditionTag {
                id: 802,
                main: "Clouds".to_string(),
                description: "scattered clouds".to_string(),
                icon: "03d".to_string(),
            }],
            wind: WindBlock {
                speed: 4.1,
                deg: 250.0,
            },
            clouds: CloudsBlock { all: 40.0 },
            sys: SysBlock {
                country: Some("GB".to_string()),
                sunrise: 1_700_000_000,
                sunset: 1_700_040_000,
            },
            timezone: 0,
            visibility: 9_000.0,
            name: Some("London".to_string()),
        }
    }

    fn air_sample() -> AirPollutionSample {
        AirPollutionSample {
            dt: 1_700_000_000,
            main: AqiBlock { aqi: 2 },
            components: PollutantComponents {
                co: 230.0,
                no2: 15.0,
                o3: 55.0,
                pm2_5: 8.0,
                pm10: 12.0,
            },
        }
    }

    fn forecast_bundle(entries: usize) -> ForecastBundle {
        ForecastBundle {
            list: (0..entries)
                .map(|i| ForecastEntry {
                    dt: 1_700_000_000 + i as i64 * 10_800,
                    main: MainMeasurements {
                        temp: 16.0,
                        feels_like: 15.0,
                        temp_min: 14.0,
                        temp_max: 19.0,
                        pressure: 1014.0,
                        humidity: 60.0,
                    },
                    weather: vec![ConditionTag {
                        id: 500,
                        main: "Rain".to_string(),
                        description: "light rain".to_string(),
                        icon: "10d".to_string(),
                    }],
                    wind: WindBlock {
                        speed: 3.0,
                        deg: 200.0,
                    },
                    clouds: CloudsBlock { all: 70.0 },
                    pop: 0.4,
                    rain: None,
                    visibility: 10_000.0,
                })
                .collect(),
            city: CityBlock {
                name: Some("London".to_string()),
                country: Some("GB".to_string()),
                sunrise: 1_700_000_000,
                sunset: 1_700_040_000,
                timezone: 0,
            },
        }
    }

    #[test]
    fn test_card_needs_all_three_payloads() {
        let current = current_conditions();
        let air = air_sample();
        let forecast = forecast_bundle(8);

        assert!(build_weather_card("London", Some(&current), Some(&air), Some(&forecast)).is_some());
        assert!(build_weather_card("London", None, Some(&air), Some(&forecast)).is_none());
        assert!(build_weather_card("London", Some(&current), None, Some(&forecast)).is_none());
        assert!(build_weather_card("London", Some(&current), Some(&air), None).is_none());
        assert!(
            build_weather_card("London", Some(&current), Some(&air), Some(&forecast_bundle(0)))
                .is_none()
        );
    }

    #[test]
    fn test_card_mixes_current_value_with_forecast_min_max() {
        let card = build_weather_card(
            "London",
            Some(&current_conditions()),
            Some(&air_sample()),
            Some(&forecast_bundle(8)),
        )
        .unwrap();

        assert_eq!(card.city.name, "London");
        assert_eq!(card.temperature.value, 18.0);
        assert_eq!(card.temperature.min, 14.0);
        assert_eq!(card.temperature.max, 19.0);
        assert_eq!(card.wind.direction.code, "WSW");
        assert_eq!(card.visibility.value, 9.0);
        assert_eq!(card.forecast.len(), 5);
        assert_eq!(card.air_quality.index, 2);
    }

    #[test]
    fn test_prompt_assembly_order_and_sections() {
        let current = current_conditions();
        let air = air_sample();
        let prompt = assemble_prompt(&PromptParts {
            message: "How's the air quality in London?",
            intent: Intent::AirQuality,
            location: Location::new(51.5, -0.12),
            name: "London",
            radius_km: 5.0,
            news_days_back: 7,
            current_w: Some(&current),
            current_air: Some(&air),
            forecast_air: None,
            pois: None,
            forecast_w: None,
            news_articles: None,
            quota_exceeded: false,
            daily_limit: 10,
        })
        .unwrap();

        assert!(prompt.starts_with("How's the air quality in London?\nCoordinates: [-0.12, 51.5]"));
        assert!(prompt.contains("Location name: London"));
        assert!(prompt.contains("Weather data: {"));
        assert!(prompt.contains("Air quality response: The air quality in London is at AQI 2 (Good)."));
    }

    #[test]
    fn test_prompt_embeds_quota_notice_when_exceeded() {
        let prompt = assemble_prompt(&PromptParts {
            message: "Any recent news from London?",
            intent: Intent::NewsUpdate,
            location: Location::new(51.5, -0.12),
            name: "London",
            radius_km: 5.0,
            news_days_back: 7,
            current_w: None,
            current_air: None,
            forecast_air: None,
            pois: None,
            forecast_w: None,
            news_articles: None,
            quota_exceeded: true,
            daily_limit: 10,
        })
        .unwrap();

        assert!(prompt.contains("You've hit the daily news limit of 10 requests"));
    }

    #[test]
    fn test_prompt_truncates_forecast_air_to_24_samples() {
        let samples: Vec<AirPollutionSample> = (0..48).map(|_| air_sample()).collect();
        let prompt = assemble_prompt(&PromptParts {
            message: "Tell me about London",
            intent: Intent::TellMeAbout,
            location: Location::new(51.5, -0.12),
            name: "London",
            radius_km: 5.0,
            news_days_back: 7,
            current_w: None,
            current_air: None,
            forecast_air: Some(&samples),
            pois: None,
            forecast_w: None,
            news_articles: None,
            quota_exceeded: false,
            daily_limit: 10,
        })
        .unwrap();

        let section = prompt
            .split("Forecast air pollution data: ")
            .nth(1)
            .unwrap();
        let parsed: Vec<AirPollutionSample> = serde_json::from_str(section.trim()).unwrap();
        assert_eq!(parsed.len(), 24);
    }

    #[test]
    fn test_history_carries_coordinates_and_limit() {
        let history = build_history(
            Some(Location::new(48.85, 2.35)),
            None,
            10,
        );
        assert_eq!(history.len(), 2);
        assert!(history[0].parts.contains("[2.35, 48.85]"));
        assert!(history[0].parts.contains("[not provided]"));
        assert!(history[0].parts.contains("news requests to 10 per day"));
    }

    #[test]
    fn test_empty_model_output_gets_fallback_text() {
        assert_eq!(trimmed_or_fallback("  ".to_string()), EMPTY_MODEL_REPLY);
        assert_eq!(trimmed_or_fallback(" hi ".to_string()), "hi");
    }
}
