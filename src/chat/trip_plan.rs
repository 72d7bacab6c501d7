//! Structured trip-plan extraction from model replies
//!
//! Trip-planning replies may embed a JSON object describing the itinerary
//! (`front`/`second` overview lines plus a `daily` array). The first brace
//! through the last brace is taken as the candidate block; a reply whose
//! block fails to parse is passed through unmodified.

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct TripPlan {
    #[serde(default)]
    pub front: Option<String>,
    #[serde(default)]
    pub second: Option<String>,
    #[serde(default)]
    pub daily: Vec<DailyItem>,
}

/// One `daily` element. The model sometimes emits plain strings and
/// sometimes structured objects; both are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DailyItem {
    Text(String),
    Structured {
        #[serde(default)]
        day: Option<u32>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        activities: Vec<String>,
    },
}

/// Slice out the first-brace-to-last-brace block, if any.
fn embedded_json(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

fn render(plan: &TripPlan) -> String {
    let mut lines = Vec::new();
    if let Some(front) = plan.front.as_deref() {
        lines.push(front.to_string());
    }
    if let Some(second) = plan.second.as_deref() {
        lines.push(second.to_string());
    }
    for (index, item) in plan.daily.iter().enumerate() {
        match item {
            DailyItem::Text(text) => lines.push(format!("Day {}: {text}", index + 1)),
            DailyItem::Structured {
                day,
                title,
                activities,
            } => {
                let day = day.unwrap_or(index as u32 + 1);
                let mut line = match title.as_deref() {
                    Some(title) => format!("Day {day}: {title}"),
                    None => format!("Day {day}"),
                };
                if !activities.is_empty() {
                    line.push_str(&format!(" - {}", activities.join(", ")));
                }
                lines.push(line);
            }
        }
    }
    lines.join("\n")
}

/// Flatten an embedded itinerary block into readable text. Replies without
/// a parseable block come back unchanged.
#[must_use]
pub fn flatten_trip_plan(reply: &str) -> String {
    let Some(block) = embedded_json(reply) else {
        return reply.to_string();
    };

    match serde_json::from_str::<TripPlan>(block) {
        Ok(plan) => render(&plan),
        Err(e) => {
            warn!("Trip plan block failed to parse, passing reply through: {e}");
            reply.to_string()
        }
    }
}
