use crate::domain::ClassifiedRecord;
use chrono::{DateTime, Datelike, Timelike, Weekday};
use serde::Serialize;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub day: String,
    pub count: u64,
}

/// Invocation counts by UTC hour of day and day of week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationPatterns {
    pub total: u64,
    /// Always 24 entries, hour 0 first.
    pub hourly: Vec<HourCount>,
    /// Always 7 entries, Monday first.
    pub daily: Vec<DayCount>,
    pub peak_hour: Option<u32>,
    pub peak_day: Option<String>,
}

/// Count completed invocations (execution reports) by hour and weekday.
///
/// Peaks are `None` when there are no invocations; ties go to the earlier
/// hour or day.
pub fn invocation_patterns(records: &[ClassifiedRecord]) -> InvocationPatterns {
    let mut hourly = [0u64; 24];
    let mut daily = [0u64; 7];
    let mut total = 0;

    for record in records.iter().filter(|r| r.is_execution_report()) {
        let Some(at) = DateTime::from_timestamp_millis(record.record.timestamp) else {
            continue;
        };
        hourly[at.hour() as usize] += 1;
        daily[at.weekday().num_days_from_monday() as usize] += 1;
        total += 1;
    }

    let peak_hour = peak_index(&hourly).map(|index| index as u32);
    let peak_day = peak_index(&daily).map(|index| weekday_name(WEEKDAYS[index]).to_string());

    InvocationPatterns {
        total,
        hourly: hourly
            .iter()
            .enumerate()
            .map(|(hour, count)| HourCount {
                hour: hour as u32,
                count: *count,
            })
            .collect(),
        daily: WEEKDAYS
            .iter()
            .zip(daily)
            .map(|(day, count)| DayCount {
                day: weekday_name(*day).to_string(),
                count,
            })
            .collect(),
        peak_hour,
        peak_day,
    }
}

fn peak_index(counts: &[u64]) -> Option<usize> {
    let mut peak: Option<(usize, u64)> = None;
    for (index, count) in counts.iter().copied().enumerate() {
        if count > 0 && peak.is_none_or(|(_, best)| count > best) {
            peak = Some((index, count));
        }
    }
    peak.map(|(index, _)| index)
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
