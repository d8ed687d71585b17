//! GlobalSettings, Court and ServiceWindow: the tournament window and the courts it can use.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Default match length in minutes.
pub const DEFAULT_MATCH_DURATION: u32 = 20;

/// Minutes since midnight at the end of the day (24:00).
pub const END_OF_DAY: u32 = 24 * 60;

/// Minutes since midnight for a wall-clock time (seconds are dropped).
pub fn minutes_of_day(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

/// Minutes since midnight for a closing time: midnight closes at the end of the day, not its start.
pub fn closing_minute(time: NaiveTime) -> u32 {
    match minutes_of_day(time) {
        0 => END_OF_DAY,
        minutes => minutes,
    }
}

/// "HH:MM" label for a minute-of-day value. End of day renders as "24:00".
pub fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Serde helpers: wall-clock times travel as "HH:MM" (also accepts "HH:MM:SS").
pub(crate) mod clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn parse(s: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(s, FORMAT).or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(s.trim()).map_err(serde::de::Error::custom)
    }

    /// Closing times: "24:00" is accepted and stored as midnight, and midnight is written back
    /// as "24:00".
    pub mod closing {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        const END_OF_DAY: &str = "24:00";

        pub fn parse(s: &str) -> Result<NaiveTime, chrono::ParseError> {
            if s == END_OF_DAY || s == "24:00:00" {
                return Ok(NaiveTime::MIN);
            }
            super::parse(s)
        }

        pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
            if *time == NaiveTime::MIN {
                serializer.serialize_str(END_OF_DAY)
            } else {
                super::serialize(time, serializer)
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
            let s = String::deserialize(deserializer)?;
            parse(s.trim()).map_err(serde::de::Error::custom)
        }

        pub mod option {
            use chrono::NaiveTime;
            use serde::{Deserialize, Deserializer, Serializer};

            pub fn serialize<S: Serializer>(
                time: &Option<NaiveTime>,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                match time {
                    Some(t) => super::serialize(t, serializer),
                    None => serializer.serialize_none(),
                }
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Option<NaiveTime>, D::Error> {
                let s: Option<String> = Option::deserialize(deserializer)?;
                match s.as_deref().map(str::trim) {
                    None | Some("") => Ok(None),
                    Some(s) => super::parse(s).map(Some).map_err(serde::de::Error::custom),
                }
            }
        }
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            let s: Option<String> = Option::deserialize(deserializer)?;
            match s.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => super::parse(s).map(Some).map_err(serde::de::Error::custom),
            }
        }
    }
}

/// A contiguous interval during which a court accepts matches.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceWindow {
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    /// "24:00" (or midnight) closes at the end of the day.
    #[serde(with = "clock::closing")]
    pub end_time: NaiveTime,
}

impl ServiceWindow {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    pub fn start_minute(&self) -> u32 {
        minutes_of_day(self.start_time)
    }

    pub fn end_minute(&self) -> u32 {
        closing_minute(self.end_time)
    }

    /// True if `[start, end)` (minutes of day) lies entirely inside this window.
    pub fn covers(&self, start: u32, end: u32) -> bool {
        start >= self.start_minute() && end <= self.end_minute()
    }

    /// A window whose end is not after its start can never hold a match.
    pub fn is_malformed(&self) -> bool {
        self.end_minute() <= self.start_minute()
    }
}

/// A court (or board / table) matches are played on.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    /// Unique key.
    pub name: String,
    /// Lower values are filled first. Courts without a priority come after all prioritized ones.
    #[serde(default)]
    pub priority: Option<i32>,
    /// Open intervals of the day. A court with no windows is never in service.
    #[serde(default)]
    pub service_windows: Vec<ServiceWindow>,
}

impl Court {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: None,
            service_windows: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_window(mut self, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        self.service_windows.push(ServiceWindow::new(start_time, end_time));
        self
    }

    /// True if some service window covers `[start, end)`.
    pub fn is_open(&self, start: u32, end: u32) -> bool {
        self.service_windows.iter().any(|w| w.covers(start, end))
    }
}

fn default_match_duration() -> u32 {
    DEFAULT_MATCH_DURATION
}

fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default()
}

/// Tournament-wide scheduling settings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    #[serde(with = "clock", default = "default_start_time")]
    pub start_time: NaiveTime,
    /// None, "24:00" or midnight mean end of day.
    #[serde(with = "clock::closing::option", default)]
    pub end_time: Option<NaiveTime>,
    /// Minutes per match; also the time grid step.
    #[serde(default = "default_match_duration")]
    pub estimated_match_duration: u32,
    /// Changeover gap in minutes between a prerequisite's end and its dependent's earliest start.
    #[serde(default)]
    pub dependency_buffer: u32,
    #[serde(default)]
    pub courts: Vec<Court>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            start_time: default_start_time(),
            end_time: None,
            estimated_match_duration: DEFAULT_MATCH_DURATION,
            dependency_buffer: 0,
            courts: Vec::new(),
        }
    }
}

impl GlobalSettings {
    pub fn new(start_time: NaiveTime, end_time: Option<NaiveTime>) -> Self {
        Self {
            start_time,
            end_time,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.estimated_match_duration = minutes;
        self
    }

    pub fn with_dependency_buffer(mut self, minutes: u32) -> Self {
        self.dependency_buffer = minutes;
        self
    }

    pub fn with_court(mut self, court: Court) -> Self {
        self.courts.push(court);
        self
    }

    pub fn start_minute(&self) -> u32 {
        minutes_of_day(self.start_time)
    }

    pub fn end_minute(&self) -> u32 {
        self.end_time.map(closing_minute).unwrap_or(END_OF_DAY)
    }

    pub fn court(&self, name: &str) -> Option<&Court> {
        self.courts.iter().find(|c| c.name == name)
    }

    /// Courts in scan order: ascending priority (unprioritized last), then declaration order.
    pub fn courts_in_priority_order(&self) -> Vec<&Court> {
        let mut courts: Vec<&Court> = self.courts.iter().collect();
        // sort_by_key is stable, so equal priorities keep declaration order
        courts.sort_by_key(|c| (c.priority.is_none(), c.priority.unwrap_or(0)));
        courts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn courts_sorted_by_priority_then_declaration() {
        let settings = GlobalSettings::default()
            .with_court(Court::new("A"))
            .with_court(Court::new("B").with_priority(2))
            .with_court(Court::new("C").with_priority(1))
            .with_court(Court::new("D").with_priority(2));
        let names: Vec<&str> = settings
            .courts_in_priority_order()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["C", "B", "D", "A"]);
    }

    #[test]
    fn missing_end_time_means_end_of_day() {
        let settings = GlobalSettings::new(hm(9, 0), None);
        assert_eq!(settings.start_minute(), 540);
        assert_eq!(settings.end_minute(), END_OF_DAY);
    }

    #[test]
    fn settings_json_uses_clock_strings() {
        let json = r#"{
            "startTime": "08:00",
            "endTime": "12:30",
            "courts": [{ "name": "Quadra 1", "serviceWindows": [{ "startTime": "08:00", "endTime": "10:00:00" }] }]
        }"#;
        let settings: GlobalSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.estimated_match_duration, DEFAULT_MATCH_DURATION);
        assert_eq!(settings.dependency_buffer, 0);
        assert_eq!(settings.end_time, Some(hm(12, 30)));
        assert_eq!(settings.courts[0].service_windows[0].end_time, hm(10, 0));

        let out = serde_json::to_value(&settings).unwrap();
        assert_eq!(out["startTime"], "08:00");
        assert_eq!(out["courts"][0]["serviceWindows"][0]["endTime"], "10:00");
    }

    #[test]
    fn windows_may_close_at_end_of_day() {
        let json = r#"{
            "endTime": "24:00",
            "courts": [{ "name": "Q1", "serviceWindows": [{ "startTime": "18:00", "endTime": "24:00" }] }]
        }"#;
        let settings: GlobalSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.end_minute(), END_OF_DAY);
        let window = settings.courts[0].service_windows[0];
        assert_eq!(window.end_minute(), END_OF_DAY);
        assert!(!window.is_malformed());
        assert!(settings.courts[0].is_open(23 * 60 + 40, END_OF_DAY));

        let out = serde_json::to_value(&settings).unwrap();
        assert_eq!(out["endTime"], "24:00");
        assert_eq!(out["courts"][0]["serviceWindows"][0]["endTime"], "24:00");
    }

    #[test]
    fn window_from_midnight_to_midnight_spans_the_day() {
        let window = ServiceWindow::new(hm(0, 0), hm(0, 0));
        assert_eq!(window.start_minute(), 0);
        assert_eq!(window.end_minute(), END_OF_DAY);
        assert!(!window.is_malformed());
    }

    #[test]
    fn window_covers_whole_slot_only() {
        let court = Court::new("A").with_window(hm(8, 0), hm(9, 0));
        assert!(court.is_open(480, 500));
        assert!(court.is_open(520, 540));
        assert!(!court.is_open(530, 550));
        assert!(!Court::new("B").is_open(480, 500));
    }

    #[test]
    fn format_minutes_pads() {
        assert_eq!(format_minutes(0), "00:00");
        assert_eq!(format_minutes(620), "10:20");
        assert_eq!(format_minutes(END_OF_DAY), "24:00");
    }
}
