//! Calendar invite builder.
//!
//! Produces a single-event `VCALENDAR` block with a fixed line order and the
//! same block as a `data:text/calendar;base64,` URI for download links.
//!
//! Start and end times are floating local times (no `Z`, no `TZID`) so the
//! event lands at 19:00 in whatever zone the recipient's calendar uses.
//! `DTSTAMP` is UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::asset;

/// Default event length.
pub const DEFAULT_DURATION_MINUTES: u32 = 120;

/// Default `LOCATION` value.
pub const DEFAULT_LOCATION: &str = "To Be Announced";

const PRODID: &str = "-//HeartHeist//EN";
const UID_PREFIX: &str = "heartheist";
const UID_DOMAIN: &str = "meow";
const LOCAL_FORMAT: &str = "%Y%m%dT%H%M00";
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Longest content line before folding (RFC 5545 §3.1).
const MAX_LINE_OCTETS: usize = 75;

/// A fully resolved calendar event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// `heartheist-<unix seconds>@meow`.
    pub uid: String,
    /// When the invite was generated.
    pub dtstamp: DateTime<Utc>,
    /// Floating local start time.
    pub start: NaiveDateTime,
    /// Floating local end time.
    pub end: NaiveDateTime,
    pub summary: String,
    pub description: String,
    pub location: String,
}

/// An invite ready to embed or download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invite {
    /// The `VCALENDAR` text.
    pub text: String,
    /// `text` as a base64 data URI.
    pub data_uri: String,
}

/// Builder for a [`CalendarEvent`].
#[derive(Debug, Clone)]
pub struct EventBuilder {
    summary: String,
    description: String,
    start: Option<NaiveDateTime>,
    duration_minutes: u32,
    location: String,
}

impl EventBuilder {
    /// Start a builder with the two required text fields.
    pub fn new(summary: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            description: description.into(),
            start: None,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            location: DEFAULT_LOCATION.to_owned(),
        }
    }

    /// Set the start time. Without one, the next February 14 at 19:00 is used.
    #[must_use]
    pub fn start(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Resolve the event against an explicit "now".
    #[must_use]
    pub fn build_at(self, now: DateTime<Utc>) -> CalendarEvent {
        let start = self
            .start
            .unwrap_or_else(|| next_valentines(now.naive_utc()));
        let end = start
            .checked_add_signed(Duration::minutes(i64::from(self.duration_minutes)))
            .unwrap_or(NaiveDateTime::MAX);

        CalendarEvent {
            uid: format!("{UID_PREFIX}-{}@{UID_DOMAIN}", now.timestamp()),
            dtstamp: now,
            start,
            end,
            summary: self.summary,
            description: self.description,
            location: self.location,
        }
    }

    /// Resolve the event against the current UTC time.
    #[must_use]
    pub fn build(self) -> CalendarEvent {
        self.build_at(Utc::now())
    }
}

impl CalendarEvent {
    /// Serialize to the fixed `VCALENDAR` block, CRLF line endings.
    ///
    /// Lines longer than 75 octets are folded with `CRLF` + space.
    #[must_use]
    pub fn to_ics(&self) -> String {
        let lines = [
            "BEGIN:VCALENDAR".to_owned(),
            "VERSION:2.0".to_owned(),
            format!("PRODID:{PRODID}"),
            "BEGIN:VEVENT".to_owned(),
            format!("UID:{}", self.uid),
            format!("DTSTAMP:{}", self.dtstamp.format(UTC_FORMAT)),
            format!("DTSTART:{}", self.start.format(LOCAL_FORMAT)),
            format!("DTEND:{}", self.end.format(LOCAL_FORMAT)),
            format!("SUMMARY:{}", escape_text(&self.summary)),
            format!("LOCATION:{}", escape_text(&self.location)),
            format!("DESCRIPTION:{}", escape_text(&self.description)),
            "END:VEVENT".to_owned(),
            "END:VCALENDAR".to_owned(),
        ];

        let mut out = String::new();
        for line in &lines {
            fold_into(&mut out, line);
            out.push_str("\r\n");
        }
        out
    }

    /// Serialize and wrap as a data URI.
    #[must_use]
    pub fn invite(&self) -> Invite {
        let text = self.to_ics();
        let data_uri = asset::data_uri("text/calendar", text.as_bytes());
        Invite { text, data_uri }
    }
}

/// The invite every session offers: date night on `date` at 19:00.
#[must_use]
pub fn valentine_event(sender: &str, recipient: &str, date: NaiveDate) -> EventBuilder {
    EventBuilder::new(
        format!("Valentine Date Night with {recipient}"),
        format!("Valentine Date Night with {recipient} — sent by {sender}."),
    )
    .start(evening_of(date))
}

/// 19:00 on the given date.
#[must_use]
pub fn evening_of(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(19, 0, 0).unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN))
}

/// The next February 14 at 19:00 at or after `now`.
#[must_use]
pub fn next_valentines(now: NaiveDateTime) -> NaiveDateTime {
    let at = |year: i32| NaiveDate::from_ymd_opt(year, 2, 14).map(evening_of);
    match at(now.year()) {
        Some(this_year) if this_year >= now => this_year,
        _ => at(now.year() + 1).unwrap_or(now),
    }
}

/// Append `line`, breaking it every 75 octets without splitting a character.
fn fold_into(out: &mut String, line: &str) {
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }
}

/// Escape a TEXT property value (RFC 5545 §3.3.11).
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 20, 8, 30, 5).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn field<'a>(ics: &'a str, name: &str) -> &'a str {
        ics.lines()
            .find_map(|l| l.strip_prefix(&format!("{name}:")))
            .unwrap()
    }

    #[test]
    fn parth_and_sneha_on_valentines_day() {
        let ics = valentine_event("Parth", "Sneha", date(2025, 2, 14))
            .build_at(fixed_now())
            .to_ics();

        assert!(ics.contains("\r\nSUMMARY:Valentine Date Night with Sneha\r\n"));
        assert!(ics.contains("\r\nDTSTART:20250214T190000\r\n"));
        assert!(ics.contains("\r\nDTEND:20250214T210000\r\n"));
        assert!(ics.contains("DESCRIPTION:Valentine Date Night with Sneha — sent by Parth."));
        assert!(ics.contains("\r\nLOCATION:To Be Announced\r\n"));
    }

    #[test]
    fn line_order_is_fixed() {
        let ics = EventBuilder::new("s", "d")
            .start(evening_of(date(2025, 2, 14)))
            .build_at(fixed_now())
            .to_ics();
        let names: Vec<&str> = ics
            .lines()
            .map(|l| l.split(':').next().unwrap())
            .collect();
        assert_eq!(
            names,
            [
                "BEGIN", "VERSION", "PRODID", "BEGIN", "UID", "DTSTAMP", "DTSTART", "DTEND",
                "SUMMARY", "LOCATION", "DESCRIPTION", "END", "END",
            ]
        );
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn uid_and_dtstamp_come_from_now() {
        let event = EventBuilder::new("s", "d").build_at(fixed_now());
        assert_eq!(event.uid, format!("heartheist-{}@meow", fixed_now().timestamp()));
        assert_eq!(field(&event.to_ics(), "DTSTAMP"), "20250120T083005Z");
    }

    #[test]
    fn dtend_is_start_plus_duration_for_many_inputs() {
        let starts = [
            evening_of(date(2025, 2, 14)),
            evening_of(date(2024, 12, 31)),
            date(2024, 2, 28).and_hms_opt(23, 30, 0).unwrap(),
        ];
        for start in starts {
            for minutes in [0, 1, 59, 120, 300, 1440] {
                let event = EventBuilder::new("s", "d")
                    .start(start)
                    .duration_minutes(minutes)
                    .build_at(fixed_now());
                assert_eq!(event.end - event.start, Duration::minutes(i64::from(minutes)));

                let ics = event.to_ics();
                let parse = |v: &str| NaiveDateTime::parse_from_str(v, "%Y%m%dT%H%M%S").unwrap();
                let dtstart = parse(field(&ics, "DTSTART"));
                let dtend = parse(field(&ics, "DTEND"));
                assert_eq!(dtend - dtstart, Duration::minutes(i64::from(minutes)));
            }
        }
    }

    #[test]
    fn leap_day_crossing_rolls_the_date() {
        let event = EventBuilder::new("s", "d")
            .start(date(2024, 2, 28).and_hms_opt(23, 30, 0).unwrap())
            .build_at(fixed_now());
        assert_eq!(field(&event.to_ics(), "DTEND"), "20240229T013000");
    }

    #[test]
    fn data_uri_decodes_to_exact_text() {
        let invite = valentine_event("Parth", "Sneha; \"the one\", ✨", date(2026, 2, 14))
            .location("Café\nRooftop")
            .build_at(fixed_now())
            .invite();

        let b64 = invite
            .data_uri
            .strip_prefix("data:text/calendar;base64,")
            .unwrap();
        let decoded = STANDARD.decode(b64).unwrap();
        assert_eq!(decoded, invite.text.as_bytes());
    }

    #[test]
    fn text_values_are_escaped() {
        let ics = EventBuilder::new("a,b;c\\d", "line1\r\nline2")
            .location("x")
            .build_at(fixed_now())
            .to_ics();
        assert_eq!(field(&ics, "SUMMARY"), "a\\,b\\;c\\\\d");
        assert_eq!(field(&ics, "DESCRIPTION"), "line1\\nline2");
    }

    #[test]
    fn default_start_is_this_years_valentines_when_still_ahead() {
        let event = EventBuilder::new("s", "d").build_at(fixed_now());
        assert_eq!(event.start, evening_of(date(2025, 2, 14)));
        assert_eq!(event.end, date(2025, 2, 14).and_hms_opt(21, 0, 0).unwrap());
    }

    #[test]
    fn default_start_rolls_to_next_year_once_past() {
        let after = Utc.with_ymd_and_hms(2025, 2, 14, 19, 0, 1).unwrap();
        assert_eq!(
            next_valentines(after.naive_utc()),
            evening_of(date(2026, 2, 14))
        );

        let november = date(2025, 11, 2).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(next_valentines(november), evening_of(date(2026, 2, 14)));
    }

    #[test]
    fn end_past_the_calendar_limit_saturates() {
        let event = EventBuilder::new("s", "d")
            .start(evening_of(NaiveDate::MAX))
            .duration_minutes(u32::MAX)
            .build_at(fixed_now());
        assert_eq!(event.end, NaiveDateTime::MAX);
    }

    #[test]
    fn long_lines_are_folded_at_75_octets() {
        let recipient = "Ä".repeat(64);
        let ics = valentine_event("Parth", &recipient, date(2026, 2, 14))
            .build_at(fixed_now())
            .to_ics();

        for line in ics.split("\r\n") {
            assert!(line.len() <= 75, "{} octets: {line}", line.len());
        }
        let unfolded = ics.replace("\r\n ", "");
        let summary = format!("\r\nSUMMARY:Valentine Date Night with {recipient}\r\n");
        assert!(unfolded.contains(&summary));
        assert!(unfolded.contains("— sent by Parth.\r\n"));
    }

    #[test]
    fn exactly_at_valentines_evening_stays_this_year() {
        let at = evening_of(date(2025, 2, 14));
        assert_eq!(next_valentines(at), at);
    }
}
