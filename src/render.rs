//! Terminal output for searches and history.

use skylog_history::SearchRecord;
use skylog_weather::{CurrentWeather, DailySummary, DateRange, Location};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ForecastRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "High")]
    high: String,
    #[tabled(rename = "Low")]
    low: String,
    #[tabled(rename = "Weather")]
    description: String,
    #[tabled(rename = "In range")]
    in_range: &'static str,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Dates")]
    dates: String,
    #[tabled(rename = "Temp")]
    temperature: String,
    #[tabled(rename = "Weather")]
    description: String,
    #[tabled(rename = "Saved")]
    saved_at: String,
}

fn celsius(value: f64) -> String {
    format!("{:.1}°C", value)
}

/// Current conditions block printed after a search.
pub fn current_block(location: &Location, range: &DateRange, current: &CurrentWeather) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", location.display_name));
    out.push_str(&format!(
        "  {:.4}, {:.4}  |  {} to {} ({} days)\n\n",
        location.latitude,
        location.longitude,
        range.start,
        range.end,
        range.num_days()
    ));
    out.push_str(&format!("  Temperature: {}\n", celsius(current.temperature)));
    out.push_str(&format!("  Feels like:  {}\n", celsius(current.feels_like)));
    out.push_str(&format!("  Humidity:    {}%\n", current.humidity));
    out.push_str(&format!("  Pressure:    {} hPa\n", current.pressure));
    out.push_str(&format!("  Wind:        {:.1} m/s\n", current.wind_speed));
    out.push_str(&format!("  Conditions:  {}\n", current.description));
    out
}

/// Daily forecast table; days inside `range` are marked.
pub fn forecast_table(days: &[DailySummary], range: &DateRange) -> String {
    if days.is_empty() {
        return "No forecast available.\n".to_string();
    }

    let rows = days.iter().map(|day| ForecastRow {
        date: day.date.format("%a %Y-%m-%d").to_string(),
        high: celsius(day.high),
        low: celsius(day.low),
        description: day.description.clone(),
        in_range: if range.contains(day.date) { "*" } else { "" },
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{}\n", table)
}

/// Saved searches as a table, in the order given.
pub fn history_table(records: &[SearchRecord]) -> String {
    if records.is_empty() {
        return "No saved searches.\n".to_string();
    }

    let rows = records.iter().map(|r| HistoryRow {
        id: r.id,
        location: r.location.clone(),
        dates: if r.start_date == r.end_date {
            r.start_date.to_string()
        } else {
            format!("{} to {}", r.start_date, r.end_date)
        },
        temperature: celsius(r.temperature),
        description: r.description.clone(),
        saved_at: r.saved_at_text(),
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{}\n", table)
}
