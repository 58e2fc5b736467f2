//! Session input model.
//!
//! [`SessionInput`] holds what the operator typed into the form. Every
//! setter normalizes on the way in (trim, cap, fall back to a default), so a
//! `SessionInput` is always renderable.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::asset::{self, Photo, PhotoSlot};
use crate::calendar::{self, Invite};
use crate::compat;
use crate::template::Context;

pub const DEFAULT_SENDER: &str = "Parth";
pub const DEFAULT_RECIPIENT: &str = "Sneha";
pub const DEFAULT_ACCENT: &str = "#ff6b8a";

/// The line the poem puzzle falls back to.
pub const DEFAULT_POEM_LINE: &str = "In a world of noise, you are my favourite melody.";

/// Caught-star messages for the rain scene, in award order.
pub const COMPLIMENTS: [&str; 7] = [
    "Your laugh",
    "The way you listen",
    "Your kind heart",
    "Your style",
    "How you make time for people",
    "Your curiosity",
    "That grin at 2 AM",
];

/// Background track for the finale.
pub const AUDIO_URL: &str = "https://cdn.simplecast.com/audio/6a2bbd/lofi-chill-beats.mp3";

/// Maximum length of a name, in characters.
pub const MAX_NAME_CHARS: usize = 64;
/// Maximum length of the free-text line, in characters.
pub const MAX_LINE_CHARS: usize = 280;

const DATE_HUMAN_FORMAT: &str = "%A, %B %d, %Y at %I:%M %p";

/// A CSS hex color, stored as lowercase `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccentColor(String);

impl AccentColor {
    /// Parse a hex color. `#rgb` is expanded to `#rrggbb`; anything else
    /// yields the default accent.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let Some(hex) = s.trim().strip_prefix('#') else {
            return Self::default();
        };
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Self::default();
        }
        let hex = hex.to_ascii_lowercase();
        match hex.len() {
            6 => Self(format!("#{hex}")),
            3 => Self(hex.chars().fold(String::from("#"), |mut out, c| {
                out.push(c);
                out.push(c);
                out
            })),
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AccentColor {
    fn default() -> Self {
        Self(DEFAULT_ACCENT.to_owned())
    }
}

impl std::fmt::Display for AccentColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What one visitor has entered so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInput {
    sender: String,
    recipient: String,
    accent: AccentColor,
    date: NaiveDate,
    photo_a: Option<Photo>,
    photo_b: Option<Photo>,
    line: Option<String>,
}

impl SessionInput {
    /// Defaults, with the date set to the next February 14 after `now`.
    #[must_use]
    pub fn default_at(now: NaiveDateTime) -> Self {
        Self {
            sender: DEFAULT_SENDER.to_owned(),
            recipient: DEFAULT_RECIPIENT.to_owned(),
            accent: AccentColor::default(),
            date: calendar::next_valentines(now).date(),
            photo_a: None,
            photo_b: None,
            line: None,
        }
    }

    /// Defaults relative to the current UTC time.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default_at(Utc::now().naive_utc())
    }

    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    #[must_use]
    pub fn accent(&self) -> &AccentColor {
        &self.accent
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The free-text line as entered, if any.
    #[must_use]
    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    #[must_use]
    pub fn photo(&self, slot: PhotoSlot) -> Option<&Photo> {
        match slot {
            PhotoSlot::A => self.photo_a.as_ref(),
            PhotoSlot::B => self.photo_b.as_ref(),
        }
    }

    pub fn set_sender(&mut self, name: &str) {
        self.sender = clean_name(name, DEFAULT_SENDER);
    }

    pub fn set_recipient(&mut self, name: &str) {
        self.recipient = clean_name(name, DEFAULT_RECIPIENT);
    }

    pub fn set_accent(&mut self, accent: &str) {
        self.accent = AccentColor::parse(accent);
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    /// Set the free-text line. Blank clears it.
    pub fn set_line(&mut self, line: &str) {
        let line = cap(line.trim(), MAX_LINE_CHARS);
        self.line = (!line.is_empty()).then_some(line);
    }

    /// Store or clear a photo. Empty uploads clear the slot.
    pub fn set_photo(&mut self, slot: PhotoSlot, photo: Option<Photo>) {
        let photo = photo.filter(|p| !p.bytes.is_empty());
        match slot {
            PhotoSlot::A => self.photo_a = photo,
            PhotoSlot::B => self.photo_b = photo,
        }
    }

    /// 19:00 on the proposed date.
    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        calendar::evening_of(self.date)
    }

    /// The proposed start, e.g. `Friday, February 14, 2025 at 07:00 PM`.
    #[must_use]
    pub fn date_human(&self) -> String {
        self.start().format(DATE_HUMAN_FORMAT).to_string()
    }

    /// The free-text line, or the default poem line.
    #[must_use]
    pub fn poem_line(&self) -> &str {
        self.line.as_deref().unwrap_or(DEFAULT_POEM_LINE)
    }

    /// Words of the poem puzzle, in solution order.
    #[must_use]
    pub fn poem_words(&self) -> Vec<String> {
        self.poem_line()
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }

    #[must_use]
    pub fn compat_score(&self) -> u8 {
        compat::compatibility_score(&self.sender, &self.recipient)
    }

    /// The date-night invite, stamped at `now`.
    #[must_use]
    pub fn invite_at(&self, now: DateTime<Utc>) -> Invite {
        calendar::valentine_event(&self.sender, &self.recipient, self.date)
            .build_at(now)
            .invite()
    }

    /// `heart_heist_<r>.html`
    #[must_use]
    pub fn page_filename(&self) -> String {
        format!("heart_heist_{}.html", file_stem(&self.recipient))
    }

    /// `valentine_for_<r>.html`
    #[must_use]
    pub fn bundle_filename(&self) -> String {
        format!("valentine_for_{}.html", file_stem(&self.recipient))
    }

    /// `valentine_<r>.ics`
    #[must_use]
    pub fn ics_filename(&self) -> String {
        format!("valentine_{}.ics", file_stem(&self.recipient))
    }
}

/// Parse a `YYYY-MM-DD` date. Years outside `1..=9999` are rejected since
/// they cannot be written as an iCalendar `DATE-TIME`.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()?;
    (1..=9999).contains(&date.year()).then_some(date)
}

/// Reduce a name to `[A-Za-z0-9_-]` for use in a file name.
#[must_use]
pub fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Every value the scene templates can ask for.
#[must_use]
pub fn context_for(input: &SessionInput, invite: &Invite, background: &str) -> Context {
    let compliments: Vec<String> = COMPLIMENTS.iter().map(|&c| c.to_owned()).collect();
    Context::new()
        .with("SENDER", input.sender())
        .with("RECIPIENT", input.recipient())
        .with("ACCENT", input.accent().as_str())
        .with("AUDIO_URL", AUDIO_URL)
        .with("POEM_WORDS", input.poem_words())
        .with("COMPLIMENTS", compliments)
        .with("ICS_URI", invite.data_uri.as_str())
        .with("DATE_HUMAN", input.date_human())
        .with(
            "PHOTO_A",
            asset::encode_photo(PhotoSlot::A, input.photo(PhotoSlot::A)),
        )
        .with(
            "PHOTO_B",
            asset::encode_photo(PhotoSlot::B, input.photo(PhotoSlot::B)),
        )
        .with("FREE_TEXT", input.poem_line())
        .with("COMPAT_SCORE", input.compat_score())
        .with("BACKGROUND", background)
}

fn clean_name(name: &str, fallback: &str) -> String {
    let name = cap(name.trim(), MAX_NAME_CHARS);
    if name.is_empty() {
        fallback.to_owned()
    } else {
        name
    }
}

fn cap(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
