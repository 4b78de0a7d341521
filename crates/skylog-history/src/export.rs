//! Export saved searches to JSON, CSV, XML or Markdown.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;

use crate::backend::{HistoryError, HistoryResult};
use crate::record::SearchRecord;

const CSV_HEADER: [&str; 8] = [
    "ID",
    "Location",
    "Start Date",
    "End Date",
    "Temperature",
    "Humidity",
    "Description",
    "Timestamp",
];

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Xml,
    Markdown,
}

impl ExportFormat {
    /// Default file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Xml => "xml",
            Self::Markdown => "md",
        }
    }

    /// Infer the format from a file's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for ExportFormat {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "xml" => Ok(Self::Xml),
            "md" | "markdown" => Ok(Self::Markdown),
            other => Err(HistoryError::validation(format!(
                "Unsupported export format '{}'. Use json, csv, xml or md.",
                other
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "JSON",
            Self::Csv => "CSV",
            Self::Xml => "XML",
            Self::Markdown => "Markdown",
        };
        f.write_str(name)
    }
}

/// JSON shape of one exported search.
#[derive(Serialize)]
struct JsonSearch<'a> {
    id: i64,
    location: &'a str,
    lat: f64,
    lon: f64,
    start_date: String,
    end_date: String,
    temp: f64,
    feels_like: f64,
    humidity: u8,
    description: &'a str,
    wind_speed: f64,
    timestamp: String,
}

impl<'a> From<&'a SearchRecord> for JsonSearch<'a> {
    fn from(r: &'a SearchRecord) -> Self {
        Self {
            id: r.id,
            location: &r.location,
            lat: r.latitude,
            lon: r.longitude,
            start_date: r.start_date.to_string(),
            end_date: r.end_date.to_string(),
            temp: r.temperature,
            feels_like: r.feels_like,
            humidity: r.humidity,
            description: &r.description,
            wind_speed: r.wind_speed,
            timestamp: r.saved_at_text(),
        }
    }
}

/// Write `records` to `writer` in the given format.
///
/// # Errors
/// `NothingToExport` if `records` is empty.
pub fn export<W: Write>(
    records: &[SearchRecord],
    format: ExportFormat,
    writer: W,
) -> HistoryResult<()> {
    if records.is_empty() {
        return Err(HistoryError::NothingToExport);
    }

    match format {
        ExportFormat::Json => write_json(records, writer),
        ExportFormat::Csv => write_csv(records, writer),
        ExportFormat::Xml => write_xml(records, writer),
        ExportFormat::Markdown => write_markdown(records, writer),
    }
}

/// Export to a file, replacing it if it exists.
///
/// Nothing is created when there are no records.
pub fn export_to_file(
    records: &[SearchRecord],
    format: ExportFormat,
    path: &Path,
) -> HistoryResult<()> {
    if records.is_empty() {
        return Err(HistoryError::NothingToExport);
    }

    let mut writer = BufWriter::new(File::create(path)?);
    export(records, format, &mut writer)?;
    writer.flush()?;

    tracing::info!(
        "Exported {} searches as {} to {}",
        records.len(),
        format,
        path.display()
    );
    Ok(())
}

fn write_json<W: Write>(records: &[SearchRecord], mut writer: W) -> HistoryResult<()> {
    let rows: Vec<JsonSearch<'_>> = records.iter().map(JsonSearch::from).collect();
    serde_json::to_writer_pretty(&mut writer, &rows)
        .map_err(|e| HistoryError::Export(e.to_string()))?;
    writeln!(writer)?;
    Ok(())
}

fn write_csv<W: Write>(records: &[SearchRecord], writer: W) -> HistoryResult<()> {
    let export_err = |e: csv::Error| HistoryError::Export(e.to_string());
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(CSV_HEADER).map_err(export_err)?;
    for r in records {
        csv.write_record([
            r.id.to_string(),
            r.location.clone(),
            r.start_date.to_string(),
            r.end_date.to_string(),
            r.temperature.to_string(),
            r.humidity.to_string(),
            r.description.clone(),
            r.saved_at_text(),
        ])
        .map_err(export_err)?;
    }

    csv.flush()?;
    Ok(())
}

fn write_xml<W: Write>(records: &[SearchRecord], writer: W) -> HistoryResult<()> {
    let mut xml = quick_xml::Writer::new_with_indent(writer, b' ', 2);

    write_event(&mut xml, Event::Decl(BytesDecl::new("1.0", None, None)))?;
    write_event(&mut xml, Event::Start(BytesStart::new("searches")))?;

    for r in records {
        write_event(&mut xml, Event::Start(BytesStart::new("search")))?;

        let fields = [
            ("id", r.id.to_string()),
            ("location", r.location.clone()),
            ("start_date", r.start_date.to_string()),
            ("end_date", r.end_date.to_string()),
            ("temperature", r.temperature.to_string()),
            ("humidity", r.humidity.to_string()),
            ("description", r.description.clone()),
            ("timestamp", r.saved_at_text()),
        ];
        for (name, value) in &fields {
            write_event(&mut xml, Event::Start(BytesStart::new(*name)))?;
            write_event(&mut xml, Event::Text(BytesText::new(value)))?;
            write_event(&mut xml, Event::End(BytesEnd::new(*name)))?;
        }

        write_event(&mut xml, Event::End(BytesEnd::new("search")))?;
    }

    write_event(&mut xml, Event::End(BytesEnd::new("searches")))?;

    writeln!(xml.get_mut())?;
    Ok(())
}

fn write_event<W: Write>(xml: &mut quick_xml::Writer<W>, event: Event<'_>) -> HistoryResult<()> {
    xml.write_event(event)
        .map_err(|e| HistoryError::Export(e.to_string()))
}

fn write_markdown<W: Write>(records: &[SearchRecord], mut writer: W) -> HistoryResult<()> {
    writeln!(writer, "# Weather Search History")?;
    writeln!(writer)?;

    for r in records {
        writeln!(writer, "## Search #{}", r.id)?;
        writeln!(writer)?;
        let fields = [
            ("Location", r.location.clone()),
            ("Date Range", format!("{} to {}", r.start_date, r.end_date)),
            ("Temperature", format!("{}°C", r.temperature)),
            ("Humidity", format!("{}%", r.humidity)),
            ("Weather", r.description.clone()),
            ("Saved", r.saved_at_text()),
        ];
        for (label, value) in fields {
            writeln!(writer, "**{}:** {}", label, value)?;
            writeln!(writer)?;
        }
        writeln!(writer, "---")?;
        writeln!(writer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn record(id: i64, location: &str, description: &str) -> SearchRecord {
        SearchRecord {
            id,
            location: location.to_string(),
            latitude: 51.5074,
            longitude: -0.1278,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            temperature: 9.5,
            feels_like: 7.0,
            humidity: 72,
            description: description.to_string(),
            wind_speed: 5.2,
            saved_at: Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap(),
        }
    }

    fn render(records: &[SearchRecord], format: ExportFormat) -> String {
        let mut out = Vec::new();
        export(records, format, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("xml".parse::<ExportFormat>().unwrap(), ExportFormat::Xml);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!(
            "markdown".parse::<ExportFormat>().unwrap(),
            ExportFormat::Markdown
        );
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(HistoryError::Validation(_))
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out/history.csv")),
            Some(ExportFormat::Csv)
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("notes.md")),
            Some(ExportFormat::Markdown)
        );
        assert_eq!(ExportFormat::from_path(Path::new("history")), None);
        assert_eq!(ExportFormat::from_path(Path::new("history.txt")), None);
    }

    #[test]
    fn test_empty_export_fails() {
        for format in [
            ExportFormat::Json,
            ExportFormat::Csv,
            ExportFormat::Xml,
            ExportFormat::Markdown,
        ] {
            let mut out = Vec::new();
            assert!(matches!(
                export(&[], format, &mut out),
                Err(HistoryError::NothingToExport)
            ));
            assert!(out.is_empty());
        }
    }

    #[test]
    fn test_json_keys() {
        let text = render(&[record(3, "London", "overcast clouds")], ExportFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let first = &value.as_array().unwrap()[0];

        assert_eq!(first["id"], 3);
        assert_eq!(first["location"], "London");
        assert_eq!(first["lat"], 51.5074);
        assert_eq!(first["lon"], -0.1278);
        assert_eq!(first["start_date"], "2025-03-10");
        assert_eq!(first["end_date"], "2025-03-12");
        assert_eq!(first["temp"], 9.5);
        assert_eq!(first["feels_like"], 7.0);
        assert_eq!(first["humidity"], 72);
        assert_eq!(first["description"], "overcast clouds");
        assert_eq!(first["wind_speed"], 5.2);
        assert_eq!(first["timestamp"], "2025-03-10 14:30:00");
    }

    #[test]
    fn test_csv_header_and_quoting() {
        let text = render(
            &[record(1, "Portland, OR", "light rain")],
            ExportFormat::Csv,
        );
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ID,Location,Start Date,End Date,Temperature,Humidity,Description,Timestamp"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,\"Portland, OR\",2025-03-10,2025-03-12,9.5,72,light rain,2025-03-10 14:30:00"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_xml_structure_and_escaping() {
        let text = render(&[record(2, "Fish & <Chips>", "clear sky")], ExportFormat::Xml);

        assert!(text.starts_with("<?xml version=\"1.0\"?>"));
        assert!(text.contains("<searches>"));
        assert!(text.contains("<search>"));
        assert!(text.contains("<id>2</id>"));
        assert!(text.contains("<location>Fish &amp; &lt;Chips&gt;</location>"));
        assert!(text.contains("<humidity>72</humidity>"));
        assert!(text.contains("<timestamp>2025-03-10 14:30:00</timestamp>"));
        assert!(text.trim_end().ends_with("</searches>"));
    }

    #[test]
    fn test_markdown_sections() {
        let text = render(
            &[record(5, "Oslo", "snow"), record(4, "Bergen", "rain")],
            ExportFormat::Markdown,
        );

        assert!(text.starts_with("# Weather Search History\n"));
        assert!(text.contains("## Search #5"));
        assert!(text.contains("## Search #4"));
        assert!(text.contains("\n**Location:** Oslo\n\n**Date Range:** 2025-03-10 to 2025-03-12\n\n"));
        assert!(text.contains("**Temperature:** 9.5°C\n\n"));
        assert!(text.contains("**Humidity:** 72%\n\n"));
        assert!(text.contains("**Weather:** rain\n\n"));
        assert!(text.contains("**Saved:** 2025-03-10 14:30:00\n\n---\n"));
        assert!(!text.contains("- **"));
        assert_eq!(text.matches("---").count(), 2);
        assert!(text.find("#5").unwrap() < text.find("#4").unwrap());
    }
}
