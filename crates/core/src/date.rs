//! Locale-fixed date formatting.
//!
//! Patterns use the letter-run convention (`yyyy-MM-dd`, `EEE, d MMM yyyy`,
//! `hh:mm a`). Month and weekday names are always US English and digits are
//! always ASCII, whatever the host locale says. Values carry no time zone and
//! are rendered as UTC.
//!
//! The free functions never fail loudly: a missing value, a malformed pattern
//! or a value the pattern cannot express all come back as `None`. Use
//! [`DatePattern`] directly when the reason matters.

use core::fmt::Write as _;
use core::str::FromStr;

use chrono::format::{Fixed, Item, Numeric, Pad, Parsed};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;

/// Canonical pattern for stored dates.
pub const YYYY_MM_DD_DATE_FORMAT: &str = "yyyy-MM-dd";

/// Widest zero padding a single field may ask for.
const MAX_FIELD_WIDTH: usize = 16;

/// Reason a pattern could not be compiled or applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateFormatError {
    #[error("unknown pattern letter '{0}'")]
    UnknownField(char),

    #[error("unterminated quote in pattern")]
    UnterminatedQuote,

    #[error("field '{field}' does not support width {width}")]
    UnsupportedWidth { field: char, width: usize },

    #[error("value cannot be rendered with this pattern")]
    Unrenderable,
}

/// Numbers chrono has no format item for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Derived {
    /// `k`: 1-24
    HourOfDay,
    /// `K`: 0-11
    HourOfHalfDay,
    /// `W`: weeks start on Monday; the week holding the 1st is week 1
    WeekOfMonth,
    /// `F`: 1 for days 1-7, 2 for days 8-14, ...
    WeekdayOrdinal,
    /// `S`
    Millisecond,
}

impl Derived {
    fn of(self, value: &NaiveDateTime) -> u32 {
        match self {
            Derived::HourOfDay => match value.hour() {
                0 => 24,
                hour => hour,
            },
            Derived::HourOfHalfDay => value.hour12().1 % 12,
            Derived::WeekOfMonth => {
                let day0 = value.day0();
                let first = (value.weekday().num_days_from_monday() + 7 - day0 % 7) % 7;
                (day0 + first) / 7 + 1
            }
            Derived::WeekdayOrdinal => value.day0() / 7 + 1,
            // Leap seconds carry nanoseconds past 1e9.
            Derived::Millisecond => value.nanosecond() / 1_000_000 % 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// Rendered and parsed by chrono.
    Chrono(Item<'static>),
    /// `G`
    Era,
    /// `y`: year of era, two digits when the run is `yy`.
    YearOfEra { width: usize },
    Derived { field: Derived, width: usize },
}

impl Token {
    fn render(&self, value: &NaiveDateTime) -> Item<'static> {
        match self {
            Token::Chrono(item) => item.clone(),
            Token::Era => Item::Literal(if value.year_ce().0 { "AD" } else { "BC" }),
            Token::YearOfEra { width: 2 } => zero_padded(value.year_ce().1 % 100, 2),
            Token::YearOfEra { width } => zero_padded(value.year_ce().1, *width),
            Token::Derived { field, width } => zero_padded(field.of(value), *width),
        }
    }

    /// Item used to read this token back; `None` when it cannot be parsed.
    fn parse_item(&self) -> Option<Item<'static>> {
        match self {
            Token::Chrono(item) => Some(item.clone()),
            Token::YearOfEra { width: 2 } => Some(Item::Numeric(Numeric::YearMod100, Pad::Zero)),
            Token::YearOfEra { .. } => Some(Item::Numeric(Numeric::Year, Pad::Zero)),
            Token::Era | Token::Derived { .. } => None,
        }
    }
}

fn zero_padded(value: u32, width: usize) -> Item<'static> {
    Item::OwnedLiteral(format!("{value:0width$}").into())
}

/// A compiled date pattern.
///
/// Compile once and [`render`](Self::render) many values when formatting in
/// a loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    tokens: Vec<Token>,
}

impl DatePattern {
    pub fn compile(pattern: &str) -> Result<Self, DateFormatError> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '\'' {
                // `''` outside a quoted section is an escaped quote.
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    literal.push('\'');
                    continue;
                }

                let mut closed = false;
                while let Some(q) = chars.next() {
                    if q == '\'' {
                        if chars.peek() == Some(&'\'') {
                            chars.next();
                            literal.push('\'');
                            continue;
                        }
                        closed = true;
                        break;
                    }
                    literal.push(q);
                }
                if !closed {
                    return Err(DateFormatError::UnterminatedQuote);
                }
            } else if c.is_ascii_alphabetic() {
                let mut width = 1;
                while chars.peek() == Some(&c) {
                    chars.next();
                    width += 1;
                }
                if width > MAX_FIELD_WIDTH {
                    return Err(DateFormatError::UnsupportedWidth { field: c, width });
                }
                if !literal.is_empty() {
                    tokens.push(literal_token(core::mem::take(&mut literal)));
                }
                push_field(&mut tokens, c, width)?;
            } else {
                literal.push(c);
            }
        }

        if !literal.is_empty() {
            tokens.push(literal_token(literal));
        }

        Ok(Self { tokens })
    }

    /// Apply the pattern to a date-time value.
    pub fn render(&self, value: &NaiveDateTime) -> Result<String, DateFormatError> {
        let items: Vec<Item<'static>> = self.tokens.iter().map(|t| t.render(value)).collect();
        let mut out = String::new();
        write!(out, "{}", value.and_utc().format_with_items(items.iter()))
            .map_err(|_| DateFormatError::Unrenderable)?;
        Ok(out)
    }

    /// Parse a date written with this pattern.
    ///
    /// Era, millisecond and other derived fields cannot be read back;
    /// patterns containing them always yield `None`.
    pub fn parse_day(&self, text: &str) -> Option<NaiveDate> {
        let items = self
            .tokens
            .iter()
            .map(Token::parse_item)
            .collect::<Option<Vec<_>>>()?;
        let mut parsed = Parsed::new();
        chrono::format::parse(&mut parsed, text, items.iter()).ok()?;
        parsed.to_naive_date().ok()
    }
}

impl FromStr for DatePattern {
    type Err = DateFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

fn literal_token(text: String) -> Token {
    Token::Chrono(Item::OwnedLiteral(text.into()))
}

fn push_field(tokens: &mut Vec<Token>, letter: char, width: usize) -> Result<(), DateFormatError> {
    let fixed = |fixed: Fixed| Token::Chrono(Item::Fixed(fixed));
    let derived = |field: Derived| Token::Derived { field, width };

    match letter {
        'G' => tokens.push(Token::Era),
        'y' => tokens.push(Token::YearOfEra { width }),
        'Y' if width == 2 => numeric(tokens, Numeric::IsoYearMod100, 2, width),
        'Y' => numeric(tokens, Numeric::IsoYear, 4, width),
        'M' | 'L' if width >= 4 => tokens.push(fixed(Fixed::LongMonthName)),
        'M' | 'L' if width == 3 => tokens.push(fixed(Fixed::ShortMonthName)),
        'M' | 'L' => numeric(tokens, Numeric::Month, 2, width),
        'w' => numeric(tokens, Numeric::IsoWeek, 2, width),
        'W' => tokens.push(derived(Derived::WeekOfMonth)),
        'D' => numeric(tokens, Numeric::Ordinal, 3, width),
        'd' => numeric(tokens, Numeric::Day, 2, width),
        'F' => tokens.push(derived(Derived::WeekdayOrdinal)),
        'E' if width >= 4 => tokens.push(fixed(Fixed::LongWeekdayName)),
        'E' => tokens.push(fixed(Fixed::ShortWeekdayName)),
        'u' => numeric(tokens, Numeric::WeekdayFromMon, 1, width),
        'a' => tokens.push(fixed(Fixed::UpperAmPm)),
        'H' => numeric(tokens, Numeric::Hour, 2, width),
        'k' => tokens.push(derived(Derived::HourOfDay)),
        'K' => tokens.push(derived(Derived::HourOfHalfDay)),
        'h' => numeric(tokens, Numeric::Hour12, 2, width),
        'm' => numeric(tokens, Numeric::Minute, 2, width),
        's' => numeric(tokens, Numeric::Second, 2, width),
        'S' => tokens.push(derived(Derived::Millisecond)),
        'z' => tokens.push(fixed(Fixed::TimezoneName)),
        'Z' => tokens.push(fixed(Fixed::TimezoneOffset)),
        'X' if width < 3 => tokens.push(fixed(Fixed::TimezoneOffsetZ)),
        'X' => tokens.push(fixed(Fixed::TimezoneOffsetColonZ)),
        _ => return Err(DateFormatError::UnknownField(letter)),
    }
    Ok(())
}

/// A single letter prints the bare number. Longer runs pad to the field's
/// natural width (`natural`), with leading zeros beyond that.
fn numeric(tokens: &mut Vec<Token>, field: Numeric, natural: usize, width: usize) {
    if width == 1 {
        tokens.push(Token::Chrono(Item::Numeric(field, Pad::None)));
        return;
    }
    if width > natural {
        tokens.push(literal_token("0".repeat(width - natural)));
    }
    tokens.push(Token::Chrono(Item::Numeric(field, Pad::Zero)));
}

/// Format an optional date-time with `pattern`.
///
/// Returns `None` when `date` is `None` or when the pattern cannot be
/// applied.
pub fn format_date(pattern: &str, date: Option<NaiveDateTime>) -> Option<String> {
    let date = date?;
    DatePattern::compile(pattern)
        .and_then(|compiled| compiled.render(&date))
        .ok()
}

/// Format an optional calendar day; time fields render as midnight.
pub fn format_day(pattern: &str, date: Option<NaiveDate>) -> Option<String> {
    format_date(pattern, date.map(|day| day.and_time(NaiveTime::MIN)))
}

/// Parse `text` written with `pattern` back into a calendar day.
pub fn parse_day(pattern: &str, text: &str) -> Option<NaiveDate> {
    DatePattern::compile(pattern).ok()?.parse_day(text)
}
