//! Spiral weather survey around a center point
//!
//! Samples up to 30 points on a golden-angle spiral within a 200 km budget,
//! fetches forecast and air-pollution-forecast data for each, aggregates
//! the first 40 forecast slots, ranks the points by the user's stated
//! weather preference and keeps the top 5. The surveyed set is cached for
//! 24 hours under a single slot that is not keyed by center: a fresh
//! survey for one center answers queries from another until it expires.

use futures::StreamExt;
use geo::{Destination, Haversine, Point};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clients::{AirPollutionSample, ForecastBundle, ForecastEntry, Geocoder, WeatherApi};
use crate::models::weather::{
    AirQuality, AirQualityComponents, CityInfo, Clouds, DayCondition, DayForecast, DayTemperature,
    Humidity, Pressure, Temperature, Visibility, WeatherCard, Wind, WindDirection, WindSpeed,
    wind_direction_code, wind_direction_name,
};
use crate::models::{Location, PoiCategory, PointOfInterest};
use crate::store::Cache;

/// Spiral radius budget in kilometers
const RADIUS_KM: f64 = 200.0;
/// Number of sample points generated before the budget cut-off
const NUM_POINTS: usize = 30;
/// Golden-angle step between consecutive points, in degrees
const ANGLE_STEP_DEG: f64 = 137.5;
/// Forecast/pollution slots averaged per point
const SAMPLE_WINDOW: usize = 40;
/// Ranked points returned to the caller
const TOP_POINTS: usize = 5;
/// Concurrent per-point fetch pairs in flight
const FETCH_CONCURRENCY: usize = 8;

const CACHE_KEY: &str = "spiral_weather_cache";
const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Aggregated survey result for one sampled point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiralWeatherPoint {
    pub location: Location,
    pub name: String,
    pub forecast: ForecastBundle,
    pub air_pollution: Vec<AirPollutionSample>,
    pub avg_temp: f64,
    pub avg_aqi: f64,
    pub avg_wind_speed: f64,
    pub avg_cloud_cover: f64,
    pub avg_humidity: f64,
}

/// Ranking rule selected from the free-text preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherPreference {
    Rainy,
    Cool,
    Warm,
    CleanAir,
    Windy,
    Sunny,
    Humid,
    Calm,
}

impl WeatherPreference {
    /// First matching keyword set wins; no match falls back to coolest-first.
    #[must_use]
    pub fn parse(preference: &str) -> Self {
        let text = preference.to_lowercase();
        if text.contains("rainy") || text.contains("precipitation") {
            Self::Rainy
        } else if text.contains("cool") || text.contains("cold") || text.contains("not hot") {
            Self::Cool
        } else if text.contains("warm") || text.contains("hot") {
            Self::Warm
        } else if text.contains("air pollution less")
            || text.contains("clean air")
            || text.contains("good air")
        {
            Self::CleanAir
        } else if text.contains("windy") {
            Self::Windy
        } else if text.contains("sunny") {
            Self::Sunny
        } else if text.contains("humid") {
            Self::Humid
        } else if text.contains("calm") || text.contains("low wind") {
            Self::Calm
        } else {
            Self::Cool
        }
    }
}

fn total_rain(point: &SpiralWeatherPoint) -> f64 {
    point
        .forecast
        .list
        .iter()
        .map(|entry| entry.rain.as_ref().map_or(0.0, |rain| rain.three_hour))
        .sum()
}

fn compare_for(preference: WeatherPreference) -> impl Fn(&SpiralWeatherPoint, &SpiralWeatherPoint) -> Ordering {
    move |a, b| match preference {
        WeatherPreference::Rainy => total_rain(b).total_cmp(&total_rain(a)),
        WeatherPreference::Cool => a.avg_temp.total_cmp(&b.avg_temp),
        WeatherPreference::Warm => b.avg_temp.total_cmp(&a.avg_temp),
        WeatherPreference::CleanAir => a.avg_aqi.total_cmp(&b.avg_aqi),
        WeatherPreference::Windy => b.avg_wind_speed.total_cmp(&a.avg_wind_speed),
        WeatherPreference::Sunny => a.avg_cloud_cover.total_cmp(&b.avg_cloud_cover),
        WeatherPreference::Humid => b.avg_humidity.total_cmp(&a.avg_humidity),
        WeatherPreference::Calm => a.avg_wind_speed.total_cmp(&b.avg_wind_speed),
    }
}

/// Sort the surveyed points by the stated preference and keep the top 5.
#[must_use]
pub fn rank_points(
    mut points: Vec<SpiralWeatherPoint>,
    preference: &str,
) -> Vec<SpiralWeatherPoint> {
    let rule = WeatherPreference::parse(preference);
    points.sort_by(compare_for(rule));
    points.truncate(TOP_POINTS);
    points
}

/// Generate sample coordinates on a golden-angle spiral around the center.
/// Stops early once the running radius exceeds the budget.
#[must_use]
pub fn generate_spiral_points(center: Location) -> Vec<Location> {
    let distance_step = (RADIUS_KM * RADIUS_KM / NUM_POINTS as f64).sqrt();
    let mut points = Vec::with_capacity(NUM_POINTS);

    for i in 0..NUM_POINTS {
        let r = distance_step * (i as f64).sqrt();
        if r > RADIUS_KM {
            break;
        }
        let bearing = (i as f64 * ANGLE_STEP_DEG) % 360.0;
        let destination =
            Haversine.destination(Point::new(center.lng, center.lat), bearing, r * 1000.0);
        points.push(Location::new(destination.y(), destination.x()));
    }

    points
}

fn window(entries: &[ForecastEntry]) -> &[ForecastEntry] {
    &entries[..entries.len().min(SAMPLE_WINDOW)]
}

fn average<T, F: Fn(&T) -> f64>(items: &[T], f: F) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    items.iter().map(f).sum::<f64>() / items.len() as f64
}

fn first_condition(entry: &ForecastEntry) -> DayCondition {
    entry.weather.first().map_or_else(
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
    )
}

/// Surveys weather over an area by spiral sampling.
pub struct SpiralWeatherLocator {
    weather: Arc<dyn WeatherApi>,
    geocoder: Arc<dyn Geocoder>,
    cache: Cache,
}

impl SpiralWeatherLocator {
    #[must_use]
    pub fn new(weather: Arc<dyn WeatherApi>, geocoder: Arc<dyn Geocoder>, cache: Cache) -> Self {
        Self {
            weather,
            geocoder,
            cache,
        }
    }

    /// Survey the spiral around `center` and return the top 5 points for
    /// the stated preference. A fresh cached survey is re-ranked and
    /// returned without refetching.
    pub async fn locate(&self, center: Location, preference: &str) -> Vec<SpiralWeatherPoint> {
        match self.cache.get::<Vec<SpiralWeatherPoint>>(CACHE_KEY).await {
            Ok(Some(points)) if !points.is_empty() => {
                debug!("Using cached spiral survey ({} points)", points.len());
                return rank_points(points, preference);
            }
            Ok(_) => {}
            Err(e) => warn!("Spiral cache read failed: {e}"),
        }

        let sample_points = generate_spiral_points(center);
        let surveyed: Vec<Option<SpiralWeatherPoint>> = futures::stream::iter(sample_points)
            .map(|point| self.survey_point(point))
            .buffer_unordered(FETCH_CONCURRENCY)
            .collect()
            .await;
        let valid: Vec<SpiralWeatherPoint> = surveyed.into_iter().flatten().collect();

        info!(
            "Spiral survey around {} kept {} points",
            center.format_coordinates(),
            valid.len()
        );

        if !valid.is_empty() {
            if let Err(e) = self.cache.put(CACHE_KEY, valid.clone(), CACHE_TTL).await {
                warn!("Spiral cache write failed: {e}");
            }
        }

        rank_points(valid, preference)
    }

    /// Fetch and aggregate one sample point. Returns `None` when either
    /// feed fails or comes back empty; the point is dropped entirely.
    async fn survey_point(&self, point: Location) -> Option<SpiralWeatherPoint> {
        let (forecast, air_pollution) = tokio::join!(
            self.weather.forecast(point.lat, point.lng),
            self.weather.air_pollution_forecast(point.lat, point.lng),
        );

        let forecast = match forecast {
            Ok(bundle) if !bundle.list.is_empty() => bundle,
            Ok(_) => return None,
            Err(e) => {
                debug!("Dropping spiral point {}: {e}", point.format_coordinates());
                return None;
            }
        };
        let air_pollution = match air_pollution {
            Ok(samples) if !samples.is_empty() => samples,
            _ => return None,
        };

        let name = match self.geocoder.reverse(point.lat, point.lng).await {
            Ok(Some(name)) => name,
            _ => "Unknown Location".to_string(),
        };

        let slots = window(&forecast.list);
        let pollution_slots = &air_pollution[..air_pollution.len().min(SAMPLE_WINDOW)];

        Some(SpiralWeatherPoint {
            avg_temp: average(slots, |entry| entry.main.temp),
            avg_aqi: average(pollution_slots, |sample| f64::from(sample.main.aqi)),
            avg_wind_speed: average(slots, |entry| entry.wind.speed),
            avg_cloud_cover: average(slots, |entry| entry.clouds.all),
            avg_humidity: average(slots, |entry| entry.main.humidity),
            location: point,
            name,
            forecast,
            air_pollution,
        })
    }
}

/// Map ranked spiral points to weather-suggestion markers, rank encoded as
/// `priority` starting at 1.
#[must_use]
pub fn suggestion_pois(points: &[SpiralWeatherPoint]) -> Vec<PointOfInterest> {
    points
        .iter()
        .enumerate()
        .map(|(index, point)| PointOfInterest {
            id: format!("spiral-{index}"),
            lat: point.location.lat,
            lng: point.location.lng,
            name: point.name.clone(),
            category: PoiCategory::WeatherSuggestion,
            priority: Some(index as u8 + 1),
        })
        .collect()
}

/// Build the widget card for one surveyed point.
#[must_use]
pub fn format_point(point: &SpiralWeatherPoint) -> WeatherCard {
    let slots = window(&point.forecast.list);
    let first = &slots[0];
    let first_pollution = &point.air_pollution[0];
    let city = &point.forecast.city;

    WeatherCard {
        city: CityInfo {
            name: point.name.clone(),
            country: city.country.clone().unwrap_or_else(|| "Unknown".to_string()),
            sunrise: city.sunrise,
            sunset: city.sunset,
            timezone: city.timezone,
        },
        temperature: Temperature {
            value: first.main.temp,
            min: slots
                .iter()
                .map(|entry| entry.main.temp_min)
                .fold(f64::INFINITY, f64::min),
            max: slots
                .iter()
                .map(|entry| entry.main.temp_max)
                .fold(f64::NEG_INFINITY, f64::max),
            feels_like: first.main.feels_like,
            unit: "C".to_string(),
        },
        humidity: Humidity {
            value: first.main.humidity,
            unit: "%".to_string(),
        },
        pressure: Pressure {
            value: first.main.pressure,
            unit: "hPa".to_string(),
        },
        wind: Wind {
            speed: WindSpeed {
                value: first.wind.speed,
                unit: "m/s".to_string(),
                name: "Light Breeze".to_string(),
            },
            direction: WindDirection {
                value: first.wind.deg,
                code: wind_direction_code(first.wind.deg).to_string(),
                name: wind_direction_name(first.wind.deg).to_string(),
            },
        },
        clouds: Clouds {
            value: first.clouds.all,
            name: first_condition(first).description,
        },
        visibility: Visibility {
            value: first.visibility / 1000.0,
        },
        air_quality: AirQuality {
            index: first_pollution.main.aqi,
            components: AirQualityComponents {
                co: first_pollution.components.co,
                no2: first_pollution.components.no2,
                o3: first_pollution.components.o3,
                pm2_5: first_pollution.components.pm2_5,
                pm10: first_pollution.components.pm10,
            },
        },
        forecast: slots
            .iter()
            .enumerate()
            .filter(|(index, _)| index % 8 == 0)
            .map(|(_, entry)| DayForecast {
                dt: entry.dt,
                temp: DayTemperature {
                    day: entry.main.temp,
                    min: entry.main.temp_min,
                    max: entry.main.temp_max,
                    night: entry.main.temp,
                },
                weather: first_condition(entry),
                pop: entry.pop,
                humidity: entry.main.humidity,
            })
            .collect(),
    }
}
