//! Rollup of a multi-point forecast feed into per-day summaries.

use chrono::NaiveDate;

use crate::types::{DailySummary, ForecastSample};

/// Maximum number of days kept by [`aggregate`].
pub const MAX_FORECAST_DAYS: usize = 5;

struct DayGroup<'a> {
    date: NaiveDate,
    high: f64,
    low: f64,
    /// Distinct descriptions with their counts, in first-seen order.
    descriptions: Vec<(&'a str, usize)>,
}

impl<'a> DayGroup<'a> {
    fn new(sample: &'a ForecastSample) -> Self {
        Self {
            date: sample.timestamp.date(),
            high: sample.temperature,
            low: sample.temperature,
            descriptions: vec![(sample.description.as_str(), 1)],
        }
    }

    fn push(&mut self, sample: &'a ForecastSample) {
        self.high = self.high.max(sample.temperature);
        self.low = self.low.min(sample.temperature);

        match self
            .descriptions
            .iter_mut()
            .find(|(text, _)| *text == sample.description)
        {
            Some((_, count)) => *count += 1,
            None => self.descriptions.push((sample.description.as_str(), 1)),
        }
    }

    /// Most frequent description; ties go to the one seen first.
    fn dominant_description(&self) -> &'a str {
        let mut best: Option<(&'a str, usize)> = None;
        for &(text, count) in &self.descriptions {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((text, count));
            }
        }
        best.map(|(text, _)| text).unwrap_or_default()
    }

    fn into_summary(self) -> DailySummary {
        DailySummary {
            date: self.date,
            high: self.high,
            low: self.low,
            description: self.dominant_description().to_string(),
        }
    }
}

/// Reduce forecast samples to one summary per calendar day.
///
/// Days appear in the order their first sample appears in `samples`, and only
/// the first [`MAX_FORECAST_DAYS`] days are returned. Samples whose day would
/// fall past that limit are skipped.
pub fn aggregate(samples: &[ForecastSample]) -> Vec<DailySummary> {
    let mut groups: Vec<DayGroup<'_>> = Vec::with_capacity(MAX_FORECAST_DAYS);

    for sample in samples {
        let date = sample.timestamp.date();
        if let Some(group) = groups.iter_mut().find(|g| g.date == date) {
            group.push(sample);
        } else if groups.len() < MAX_FORECAST_DAYS {
            groups.push(DayGroup::new(sample));
        }
    }

    groups.into_iter().map(DayGroup::into_summary).collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::NaiveDateTime;

    fn sample(timestamp: &str, temperature: f64, description: &str) -> ForecastSample {
        ForecastSample {
            timestamp: NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").unwrap(),
            temperature,
            description: description.to_string(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_single_day_high_low_and_majority() {
        let samples = vec![
            sample("2025-03-10 10:00:00", 5.0, "clear"),
            sample("2025-03-10 14:00:00", 9.0, "clear"),
            sample("2025-03-10 18:00:00", 7.0, "rain"),
        ];

        let days = aggregate(&samples);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, date("2025-03-10"));
        assert_eq!(days[0].high, 9.0);
        assert_eq!(days[0].low, 5.0);
        assert_eq!(days[0].description, "clear");
    }

    #[test]
    fn test_single_sample_high_equals_low() {
        let days = aggregate(&[sample("2025-03-10 12:00:00", -3.5, "snow")]);
        assert_eq!(days[0].high, -3.5);
        assert_eq!(days[0].low, -3.5);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let days = aggregate(&[
            sample("2025-03-10 09:00:00", 4.0, "cloudy"),
            sample("2025-03-10 12:00:00", 6.0, "rain"),
        ]);
        assert_eq!(days[0].description, "cloudy");

        let days = aggregate(&[
            sample("2025-03-10 09:00:00", 4.0, "rain"),
            sample("2025-03-10 12:00:00", 6.0, "cloudy"),
        ]);
        assert_eq!(days[0].description, "rain");
    }

    #[test]
    fn test_tie_among_leaders_only() {
        // "mist" is seen first but only once; the two-count leaders tie and
        // the earlier of them wins.
        let days = aggregate(&[
            sample("2025-03-10 00:00:00", 1.0, "mist"),
            sample("2025-03-10 03:00:00", 2.0, "rain"),
            sample("2025-03-10 06:00:00", 3.0, "clear"),
            sample("2025-03-10 09:00:00", 4.0, "clear"),
            sample("2025-03-10 12:00:00", 5.0, "rain"),
        ]);
        assert_eq!(days[0].description, "rain");
    }

    #[test]
    fn test_empty_description_is_a_value() {
        let days = aggregate(&[
            sample("2025-03-10 09:00:00", 4.0, ""),
            sample("2025-03-10 12:00:00", 6.0, ""),
            sample("2025-03-10 15:00:00", 6.0, "rain"),
        ]);
        assert_eq!(days[0].description, "");
    }

    #[test]
    fn test_keeps_first_five_days() {
        let samples: Vec<_> = (1..=7)
            .flat_map(|day| {
                [
                    sample(&format!("2025-03-{:02} 06:00:00", day), day as f64, "clear"),
                    sample(&format!("2025-03-{:02} 15:00:00", day), day as f64 + 10.0, "clear"),
                ]
            })
            .collect();

        let days = aggregate(&samples);
        assert_eq!(days.len(), MAX_FORECAST_DAYS);
        let dates: Vec<_> = days.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![
                date("2025-03-01"),
                date("2025-03-02"),
                date("2025-03-03"),
                date("2025-03-04"),
                date("2025-03-05"),
            ]
        );
        assert_eq!(days[4].low, 5.0);
        assert_eq!(days[4].high, 15.0);
    }

    #[test]
    fn test_first_seen_order_not_chronological() {
        // Later samples for an earlier-seen day still land in that day.
        let days = aggregate(&[
            sample("2025-03-12 00:00:00", 1.0, "clear"),
            sample("2025-03-11 21:00:00", 8.0, "rain"),
            sample("2025-03-12 03:00:00", -2.0, "clear"),
        ]);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date("2025-03-12"));
        assert_eq!(days[0].low, -2.0);
        assert_eq!(days[1].date, date("2025-03-11"));
    }

    #[test]
    fn test_samples_for_early_day_after_limit_still_count() {
        let mut samples: Vec<_> = (1..=6)
            .map(|day| sample(&format!("2025-03-{:02} 12:00:00", day), 10.0, "clear"))
            .collect();
        samples.push(sample("2025-03-01 18:00:00", 20.0, "clear"));

        let days = aggregate(&samples);
        assert_eq!(days.len(), 5);
        assert_eq!(days[0].high, 20.0);
    }
}
