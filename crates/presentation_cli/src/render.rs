//! Terminal rendering of API responses

use application::{
    DashboardSnapshot, ForecastPanel, LightningPanel, MetricPanel, NearestForecast, Section,
    WbgtPanel, WindPanel,
};
use chrono::{DateTime, FixedOffset};
use domain::AreaForecast;

const AREA_WIDTH: usize = 24;

fn time(ts: Option<DateTime<FixedOffset>>) -> String {
    ts.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

fn opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

/// Heading line plus either the panel body or the reason it is missing
fn section<T>(title: &str, section: &Section<T>, body: impl FnOnce(&T) -> Vec<String>) -> Vec<String> {
    match section {
        Section::Ready { data } => {
            let mut lines = vec![title.to_string()];
            lines.extend(body(data).into_iter().map(|l| format!("  {l}")));
            lines
        },
        Section::NoData { message } => vec![format!("{title}: no data ({message})")],
        Section::Failed { error } => vec![format!("{title}: unavailable ({error})")],
    }
}

/// One line per area: name, forecast text, condition
pub fn area_forecasts(forecasts: &[AreaForecast]) -> Vec<String> {
    if forecasts.is_empty() {
        return vec!["No matching areas".to_string()];
    }
    forecasts
        .iter()
        .map(|f| {
            let mut line = format!("{:<AREA_WIDTH$} {}", f.area, f.forecast);
            if f.condition.is_wet() {
                line.push_str("  [wet]");
            }
            line
        })
        .collect()
}

fn forecast_body(panel: &ForecastPanel) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(period) = &panel.valid_period {
        lines.push(format!("Valid {} (updated {})", period.text, time(panel.updated_at)));
    }
    lines.extend(area_forecasts(&panel.areas));
    lines
}

fn metric_body(panel: &MetricPanel) -> Vec<String> {
    let unit = panel.unit.as_deref().unwrap_or("");
    let summary = panel.stats.map_or_else(
        || "no readings".to_string(),
        |s| {
            format!(
                "mean {:.1} {unit}, min {:.1}, max {:.1} across {} stations",
                s.mean, s.min, s.max, s.count
            )
        },
    );
    vec![format!("{summary} at {}", time(panel.observed_at))]
}

fn wind_body(panel: &WindPanel) -> Vec<String> {
    let speed = format!(
        "{} kn ({} km/h)",
        opt(panel.mean_speed_knots, 1),
        opt(panel.mean_speed_kmh, 1)
    );
    let direction = match (panel.compass.as_deref(), panel.mean_direction_deg) {
        (Some(compass), Some(deg)) => format!(" from {compass} ({deg:.0}°)"),
        _ => String::new(),
    };
    vec![format!(
        "{speed}{direction} at {}, {} stations",
        time(panel.observed_at),
        panel.stations.len()
    )]
}

fn lightning_body(panel: &LightningPanel) -> Vec<String> {
    let mut lines = vec![format!(
        "{} strike(s) at {}",
        panel.strike_count,
        time(panel.observed_at)
    )];
    lines.extend(panel.strikes.iter().map(|s| {
        format!(
            "{} {}",
            s.location,
            s.text.as_deref().or(s.kind.as_deref()).unwrap_or("")
        )
        .trim_end()
        .to_string()
    }));
    lines
}

fn wbgt_body(panel: &WbgtPanel) -> Vec<String> {
    let stress = panel
        .highest_heat_stress
        .map_or_else(|| "-".to_string(), |h| h.to_string());
    vec![format!(
        "max {} °C, heat stress {stress} at {}",
        opt(panel.max_wbgt, 1),
        time(panel.observed_at)
    )]
}

/// Full dashboard as text panels
pub fn dashboard(snapshot: &DashboardSnapshot) -> String {
    let mut heading = format!(
        "SgWeather dashboard ({})",
        snapshot.date.map_or_else(|| "latest".to_string(), |d| d.to_string())
    );
    if let Some(area) = &snapshot.area {
        heading.push_str(&format!(" for {area}"));
    }

    let mut lines = vec![heading, String::new()];
    lines.extend(section("Forecast", &snapshot.forecast, forecast_body));
    lines.extend(section("Temperature", &snapshot.temperature, metric_body));
    lines.extend(section("Humidity", &snapshot.humidity, metric_body));
    lines.extend(section("Wind", &snapshot.wind, wind_body));
    lines.extend(section("Lightning", &snapshot.lightning, lightning_body));
    lines.extend(section("WBGT", &snapshot.wbgt, wbgt_body));

    let failed = snapshot.failed_sections();
    if failed > 0 {
        lines.push(String::new());
        lines.push(format!("{failed} section(s) failed; re-run to retry"));
    }
    lines.join("\n")
}

pub fn nearest(nearest: &NearestForecast) -> String {
    let mut lines = vec![format!(
        "Nearest area to {}: {} ({:.1} km)",
        nearest.location, nearest.forecast.area, nearest.distance_km
    )];
    if let Some(period) = &nearest.valid_period {
        lines.push(format!("Valid {}", period.text));
    }
    lines.push(format!(
        "{} ({})",
        nearest.forecast.forecast, nearest.forecast.condition
    ));
    lines.join("\n")
}
