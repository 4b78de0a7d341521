//! Command handlers.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use skylog_core::Config;
use skylog_history::{ExportFormat, HistoryClient, NewSearch, SearchRecord, SearchUpdate};
use skylog_weather::{
    validate, CurrentWeather, DailySummary, DateRange, Geocoder, Location, RetryConfig,
    WeatherProvider, DATE_FORMAT,
};

use crate::cli::Command;
use crate::error::{AppError, AppResult};
use crate::render;

/// Everything a successful search produced.
#[derive(Debug)]
pub struct SearchOutcome {
    pub location: Location,
    pub range: DateRange,
    pub current: CurrentWeather,
    pub forecast: Vec<DailySummary>,
    pub record: SearchRecord,
}

impl SearchOutcome {
    pub fn render(&self) -> String {
        format!(
            "{}\nForecast\n{}\nSaved as search #{}\n",
            render::current_block(&self.location, &self.range, &self.current),
            render::forecast_table(&self.forecast, &self.range),
            self.record.id
        )
    }
}

/// Application state shared by all commands.
pub struct App {
    config: Config,
    history: HistoryClient,
}

impl App {
    pub fn new(config: Config) -> AppResult<Self> {
        let db_path = config.database_path();
        tracing::debug!("Using history database {}", db_path.display());
        let history = HistoryClient::open(&db_path)?;

        Ok(Self { config, history })
    }

    pub async fn run(&self, command: Command) -> AppResult<()> {
        let today = Local::now().date_naive();

        match command {
            Command::Search {
                location,
                start,
                end,
            } => {
                let outcome = self
                    .search(&location, start.as_deref(), end.as_deref(), today)
                    .await?;
                print!("{}", outcome.render());
            }
            Command::List => {
                let records = self.history.list().await?;
                print!("{}", render::history_table(&records));
            }
            Command::Edit {
                id,
                location,
                start,
                end,
            } => {
                let record = self.edit(id, &location, &start, &end, today).await?;
                println!(
                    "Updated search #{}: {} ({} to {})",
                    record.id, record.location, record.start_date, record.end_date
                );
            }
            Command::Delete { id, yes } => {
                let record = self.history.get(id).await?;
                let prompt = format!("Delete search #{} ({})?", record.id, record.location);
                if !yes && !confirm(&prompt)? {
                    println!("Cancelled.");
                    return Ok(());
                }
                self.history.delete(id).await?;
                println!("Deleted search #{}.", id);
            }
            Command::Export { format, output } => {
                let (count, path) = self.export(&format, output).await?;
                println!("Exported {} searches to {}", count, path.display());
            }
        }

        Ok(())
    }

    fn retry(&self) -> RetryConfig {
        RetryConfig::with_max_retries(self.config.weather.max_retries)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.weather.request_timeout_secs)
    }

    /// Validate the dates, look the place up, fetch weather and save the search.
    ///
    /// `start` defaults to `today` and `end` to `start`.
    pub async fn search(
        &self,
        location: &str,
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> AppResult<SearchOutcome> {
        let start = start
            .map(str::to_string)
            .unwrap_or_else(|| today.format(DATE_FORMAT).to_string());
        let end = end.map(str::to_string).unwrap_or_else(|| start.clone());
        let range = validate(&start, &end, today)?;

        let provider = WeatherProvider::new(
            self.config.weather.api_key.clone(),
            &self.config.weather.base_url,
            self.timeout(),
            self.retry(),
        )?;
        let geocoder = Geocoder::new(
            &self.config.geocoding.base_url,
            &self.config.geocoding.user_agent,
            self.timeout(),
            self.retry(),
        )?;

        let location = geocoder.resolve(location).await?;
        tracing::info!(
            "Resolved '{}' to {:.4}, {:.4}",
            location.display_name,
            location.latitude,
            location.longitude
        );

        let (current, forecast) =
            tokio::join!(provider.current(&location), provider.forecast(&location));
        let current = current?;
        // Only current conditions are saved; a missing forecast isn't fatal.
        let forecast = forecast.unwrap_or_else(|e| {
            tracing::warn!("Forecast unavailable for {}: {}", location.display_name, e);
            Vec::new()
        });

        let record = self
            .history
            .create(NewSearch {
                location: location.display_name.clone(),
                latitude: location.latitude,
                longitude: location.longitude,
                start_date: range.start,
                end_date: range.end,
                temperature: current.temperature,
                feels_like: current.feels_like,
                humidity: current.humidity,
                description: current.description.clone(),
                wind_speed: current.wind_speed,
            })
            .await?;

        Ok(SearchOutcome {
            location,
            range,
            current,
            forecast,
            record,
        })
    }

    /// Replace a saved search's location and dates after re-validating them.
    pub async fn edit(
        &self,
        id: i64,
        location: &str,
        start: &str,
        end: &str,
        today: NaiveDate,
    ) -> AppResult<SearchRecord> {
        if [location, start, end].iter().any(|f| f.trim().is_empty()) {
            return Err(AppError::Input("All fields are required.".to_string()));
        }

        let range = validate(start, end, today)?;
        let record = self
            .history
            .update(
                id,
                SearchUpdate {
                    location: location.trim().to_string(),
                    start_date: range.start,
                    end_date: range.end,
                },
            )
            .await?;

        Ok(record)
    }

    /// Export all saved searches; returns the count and the file written.
    pub async fn export(
        &self,
        format: &str,
        output: Option<PathBuf>,
    ) -> AppResult<(usize, PathBuf)> {
        let format: ExportFormat = format.parse()?;
        let path = output.unwrap_or_else(|| default_export_path(format));

        if let Some(inferred) = ExportFormat::from_path(&path) {
            if inferred != format {
                tracing::warn!(
                    "Writing {} to {}, which looks like a {} file",
                    format,
                    path.display(),
                    inferred
                );
            }
        }

        let count = self.history.export_to_file(format, path.clone()).await?;
        Ok((count, path))
    }
}

/// `weather_history.<ext>` in the working directory.
fn default_export_path(format: ExportFormat) -> PathBuf {
    PathBuf::from(format!("weather_history.{}", format.extension()))
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
