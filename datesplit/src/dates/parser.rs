//! Permissive date/time string parser.
//!
//! Accepts the loose formats found in exported spreadsheets:
//!
//! - ISO 8601: `2023-05-14`, `2023-05-14T09:15:00.250+02:00`
//! - Separated numeric dates: `05/14/2023`, `14.05.2023`, `2023/05/14`
//! - Compact digit runs: `20230514`, `230514`, `20230514091500`
//! - Month and weekday names: `Sunday, May 14th 2023 at 3:30 PM`
//! - Bare times: `09:15`, `3pm`
//!
//! Components that are not present are taken from a reference date (today at
//! midnight unless a fixed one is given). Numeric dates are read month-first
//! unless the first field is a year or cannot be a month.
//!
//! With `fuzzy` set, tokens that are not part of a date are skipped instead of
//! failing the parse, so `"created on May 5 by admin"` is accepted.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DateParseError, DateResult};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<num>[0-9]+)|(?P<word>[^\W\d_]+)|(?P<sep>\S)").expect("token pattern is valid")
});

const MONTH_WORDS: [(&[&str], u32); 12] = [
    (&["jan", "january"], 1),
    (&["feb", "february"], 2),
    (&["mar", "march"], 3),
    (&["apr", "april"], 4),
    (&["may"], 5),
    (&["jun", "june"], 6),
    (&["jul", "july"], 7),
    (&["aug", "august"], 8),
    (&["sep", "sept", "september"], 9),
    (&["oct", "october"], 10),
    (&["nov", "november"], 11),
    (&["dec", "december"], 12),
];

const WEEKDAY_WORDS: [(&[&str], Weekday); 7] = [
    (&["mon", "monday"], Weekday::Mon),
    (&["tue", "tues", "tuesday"], Weekday::Tue),
    (&["wed", "wednesday"], Weekday::Wed),
    (&["thu", "thur", "thurs", "thursday"], Weekday::Thu),
    (&["fri", "friday"], Weekday::Fri),
    (&["sat", "saturday"], Weekday::Sat),
    (&["sun", "sunday"], Weekday::Sun),
];

/// Words that may sit between date components.
const JUMP_WORDS: [&str; 10] = ["at", "on", "and", "ad", "m", "of", "st", "nd", "rd", "th"];

/// Separators that may sit between date components.
const JUMP_SEPS: [char; 6] = [',', '.', '/', '-', ';', '\''];

/// Time zone designators. The offset is dropped; wall-clock time is kept.
const TZ_WORDS: [&str; 3] = ["z", "utc", "gmt"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(String),
    Word(String),
    Sep(char),
}

fn tokenize(input: &str) -> Vec<Token> {
    TOKEN_RE
        .captures_iter(input)
        .filter_map(|caps| {
            if let Some(m) = caps.name("num") {
                Some(Token::Number(m.as_str().to_string()))
            } else if let Some(m) = caps.name("word") {
                Some(Token::Word(m.as_str().to_lowercase()))
            } else {
                caps.name("sep")
                    .and_then(|m| m.as_str().chars().next())
                    .map(Token::Sep)
            }
        })
        .collect()
}

fn month_from_word(word: &str) -> Option<u32> {
    MONTH_WORDS
        .iter()
        .find(|(names, _)| names.contains(&word))
        .map(|(_, month)| *month)
}

fn weekday_from_word(word: &str) -> Option<Weekday> {
    WEEKDAY_WORDS
        .iter()
        .find(|(names, _)| names.contains(&word))
        .map(|(_, weekday)| *weekday)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

fn meridiem(word: &str) -> Option<Meridiem> {
    match word {
        "am" => Some(Meridiem::Am),
        "pm" => Some(Meridiem::Pm),
        _ => None,
    }
}

/// A numeric token with its written width. The width tells `5` from `05`
/// from `2005` when deciding which component a number is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Num {
    value: u32,
    digits: usize,
}

impl Num {
    fn is_year_like(&self) -> bool {
        self.digits > 2 || self.value > 31
    }
}

/// Date-ish tokens whose role depends on their neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum YmdPart {
    Num(Num),
    Month(u32),
}

#[derive(Debug, Default)]
struct Fields {
    year: Option<Num>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    micro: Option<u32>,
    meridiem: Option<Meridiem>,
    weekday: Option<Weekday>,
    ymd: Vec<YmdPart>,
}

impl Fields {
    fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.month.is_none()
            && self.day.is_none()
            && self.hour.is_none()
            && self.minute.is_none()
            && self.weekday.is_none()
            && self.ymd.is_empty()
    }

    fn has_date(&self) -> bool {
        self.year.is_some() || self.month.is_some() || self.day.is_some() || !self.ymd.is_empty()
    }
}

/// Date/time parser with a fixed reference date for missing components.
#[derive(Debug, Clone, Copy)]
pub struct DateParser {
    reference: NaiveDateTime,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DateParser {
    /// Parser whose missing components default to today at midnight.
    pub fn new() -> Self {
        Self::with_reference(Local::now().date_naive().and_time(NaiveTime::MIN))
    }

    /// Parser whose missing components default to `reference`.
    pub fn with_reference(reference: NaiveDateTime) -> Self {
        Self { reference }
    }

    /// Parse `input` into a naive date-time.
    pub fn parse(&self, input: &str, fuzzy: bool) -> DateResult<NaiveDateTime> {
        let mut scan = Scan {
            input,
            fuzzy,
            tokens: tokenize(input),
            pos: 0,
            fields: Fields::default(),
            after_t: false,
            after_time: false,
        };
        scan.run()?;
        scan.resolve(self.reference)
    }

    /// Whether `input` parses as a date/time. Failures are `false`, never errors.
    pub fn is_date_like(&self, input: &str, fuzzy: bool) -> bool {
        self.parse(input, fuzzy).is_ok()
    }
}

struct Scan<'a> {
    input: &'a str,
    fuzzy: bool,
    tokens: Vec<Token>,
    pos: usize,
    fields: Fields,
    // Set for exactly one token after an ISO `T`.
    after_t: bool,
    // Set for exactly one token after a clock time.
    after_time: bool,
}

impl<'a> Scan<'a> {
    fn run(&mut self) -> DateResult<()> {
        while self.pos < self.tokens.len() {
            let after_t = std::mem::take(&mut self.after_t);
            let after_time = std::mem::take(&mut self.after_time);

            match self.tokens[self.pos].clone() {
                Token::Number(digits) => self.number(&digits, after_t)?,
                Token::Word(word) => self.word(&word)?,
                Token::Sep(c) => self.sep(c, after_time)?,
            }
        }
        Ok(())
    }

    fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn unknown(&self, token: impl Into<String>) -> DateParseError {
        DateParseError::UnknownToken {
            input: self.input.to_string(),
            token: token.into(),
        }
    }

    fn out_of_range(&self, message: impl Into<String>) -> DateParseError {
        DateParseError::OutOfRange {
            input: self.input.to_string(),
            message: message.into(),
        }
    }

    fn set_year(&mut self, year: Num) -> DateResult<()> {
        assign(&mut self.fields.year, year, "year", self.input)
    }

    fn set_month(&mut self, month: u32) -> DateResult<()> {
        assign(&mut self.fields.month, month, "month", self.input)
    }

    fn set_day(&mut self, day: u32) -> DateResult<()> {
        assign(&mut self.fields.day, day, "day", self.input)
    }

    fn set_clock(&mut self, hour: u32, minute: u32, second: Option<u32>) -> DateResult<()> {
        assign(&mut self.fields.hour, hour, "hour", self.input)?;
        self.fields.minute = Some(minute);
        self.fields.second = second;
        Ok(())
    }

    fn number(&mut self, digits: &str, after_t: bool) -> DateResult<()> {
        if matches!(self.peek(1), Some(Token::Sep(':'))) {
            if digits.len() > 2 {
                return Err(self.out_of_range(format!("hour {digits}")));
            }
            return self.clock(slice(digits, 0, digits.len()));
        }

        if after_t && self.fields.hour.is_none() && matches!(digits.len(), 4 | 6) {
            self.pos += 1;
            return self.set_clock(
                slice(digits, 0, 2),
                slice(digits, 2, 4),
                (digits.len() == 6).then(|| slice(digits, 4, 6)),
            );
        }

        match digits.len() {
            6 if self.fields.has_date() && self.fields.hour.is_none() => {
                self.pos += 1;
                return self.set_clock(
                    slice(digits, 0, 2),
                    slice(digits, 2, 4),
                    Some(slice(digits, 4, 6)),
                );
            }
            6 => {
                self.pos += 1;
                self.set_year(Num { value: slice(digits, 0, 2), digits: 2 })?;
                self.set_month(slice(digits, 2, 4))?;
                return self.set_day(slice(digits, 4, 6));
            }
            8 | 12 | 14 => {
                self.pos += 1;
                self.set_year(Num { value: slice(digits, 0, 4), digits: 4 })?;
                self.set_month(slice(digits, 4, 6))?;
                self.set_day(slice(digits, 6, 8))?;
                if digits.len() > 8 {
                    self.set_clock(
                        slice(digits, 8, 10),
                        slice(digits, 10, 12),
                        (digits.len() == 14).then(|| slice(digits, 12, 14)),
                    )?;
                }
                return Ok(());
            }
            n if n > 4 => return Err(self.out_of_range(format!("unrecognized number {digits}"))),
            _ => {}
        }
        let value = slice(digits, 0, digits.len());

        // "3pm", "11 am"
        if let Some(Token::Word(next)) = self.peek(1) {
            if let Some(m) = meridiem(next) {
                self.pos += 2;
                self.set_clock(value, 0, None)?;
                self.fields.meridiem = Some(m);
                return Ok(());
            }
        }

        self.pos += 1;
        self.fields.ymd.push(YmdPart::Num(Num {
            value,
            digits: digits.len(),
        }));
        Ok(())
    }

    /// `HH:MM[:SS[.ffffff]] [am|pm]`, positioned on the hour.
    fn clock(&mut self, hour: u32) -> DateResult<()> {
        self.pos += 2;
        let minute = match self.peek(0) {
            Some(Token::Number(d)) if d.len() <= 2 => slice(d, 0, d.len()),
            _ => return Err(self.out_of_range("incomplete time")),
        };
        self.pos += 1;

        let mut second = None;
        if let (Some(Token::Sep(':')), Some(Token::Number(d))) = (self.peek(0), self.peek(1)) {
            if d.len() <= 2 {
                second = Some(slice(d, 0, d.len()));
                self.pos += 2;
                if let (Some(Token::Sep('.')), Some(Token::Number(frac))) =
                    (self.peek(0), self.peek(1))
                {
                    self.fields.micro = Some(micros(frac));
                    self.pos += 2;
                }
            }
        }
        self.set_clock(hour, minute, second)?;

        if let Some(Token::Word(next)) = self.peek(0) {
            if let Some(m) = meridiem(next) {
                self.fields.meridiem = Some(m);
                self.pos += 1;
            }
        }
        self.after_time = true;
        Ok(())
    }

    fn word(&mut self, word: &str) -> DateResult<()> {
        self.pos += 1;

        if let Some(month) = month_from_word(word) {
            self.fields.ymd.push(YmdPart::Month(month));
        } else if let Some(weekday) = weekday_from_word(word) {
            assign(&mut self.fields.weekday, weekday, "weekday", self.input)?;
        } else if let Some(m) = meridiem(word) {
            if self.fields.hour.is_some() && self.fields.meridiem.is_none() {
                self.fields.meridiem = Some(m);
            } else if !self.fuzzy {
                return Err(self.unknown(word));
            }
        } else if word == "t" {
            self.after_t = true;
        } else if TZ_WORDS.contains(&word) || JUMP_WORDS.contains(&word) {
            // skip
        } else if !self.fuzzy {
            return Err(self.unknown(word));
        }
        Ok(())
    }

    fn sep(&mut self, c: char, after_time: bool) -> DateResult<()> {
        self.pos += 1;

        // UTC offset right after a clock time: +02:00, -0500
        if after_time && (c == '+' || c == '-') {
            if let Some(Token::Number(_)) = self.peek(0) {
                self.pos += 1;
                if let (Some(Token::Sep(':')), Some(Token::Number(_))) =
                    (self.peek(0), self.peek(1))
                {
                    self.pos += 2;
                }
                return Ok(());
            }
        }

        if JUMP_SEPS.contains(&c) || self.fuzzy {
            Ok(())
        } else {
            Err(self.unknown(c.to_string()))
        }
    }

    /// Decide which loose numbers and month names are year, month and day.
    fn resolve_ymd(&mut self) -> DateResult<()> {
        let parts = std::mem::take(&mut self.fields.ymd);
        if parts.len() > 3 {
            return Err(DateParseError::Conflict {
                input: self.input.to_string(),
                component: "date",
            });
        }

        let month_positions: Vec<usize> = parts
            .iter()
            .enumerate()
            .filter(|(_, p)| matches!(p, YmdPart::Month(_)))
            .map(|(i, _)| i)
            .collect();
        if month_positions.len() > 1 {
            return Err(DateParseError::Conflict {
                input: self.input.to_string(),
                component: "month",
            });
        }

        let nums: Vec<Num> = parts
            .iter()
            .filter_map(|p| match p {
                YmdPart::Num(n) => Some(*n),
                YmdPart::Month(_) => None,
            })
            .collect();

        match (month_positions.first().copied(), nums.as_slice()) {
            (None, []) => {}
            (Some(mi), rest) => {
                if let YmdPart::Month(month) = parts[mi] {
                    self.set_month(month)?;
                }
                match rest {
                    [] => {}
                    [n] if n.is_year_like() => self.set_year(*n)?,
                    [n] => self.set_day(n.value)?,
                    // "May 2023 14", "2023 May 14"
                    [a, b] if mi < 2 && a.is_year_like() => {
                        self.set_year(*a)?;
                        self.set_day(b.value)?;
                    }
                    // "14 2023 May"
                    [a, b] if mi == 2 && b.is_year_like() => {
                        self.set_day(a.value)?;
                        self.set_year(*b)?;
                    }
                    [a, b] if mi == 2 => {
                        self.set_year(*a)?;
                        self.set_day(b.value)?;
                    }
                    [a, b] => {
                        self.set_day(a.value)?;
                        self.set_year(*b)?;
                    }
                    _ => unreachable!("at most two numbers accompany a month name"),
                }
            }
            (None, [n]) if n.is_year_like() => self.set_year(*n)?,
            (None, [n]) => self.set_day(n.value)?,
            (None, [a, b]) => {
                if a.is_year_like() {
                    self.set_year(*a)?;
                    self.set_month(b.value)?;
                } else if b.is_year_like() {
                    self.set_month(a.value)?;
                    self.set_year(*b)?;
                } else {
                    self.set_month(a.value)?;
                    self.set_day(b.value)?;
                }
            }
            (None, [a, b, c]) => {
                if a.is_year_like() {
                    self.set_year(*a)?;
                    self.set_month(b.value)?;
                    self.set_day(c.value)?;
                } else if a.value > 12 {
                    self.set_day(a.value)?;
                    self.set_month(b.value)?;
                    self.set_year(*c)?;
                } else {
                    self.set_month(a.value)?;
                    self.set_day(b.value)?;
                    self.set_year(*c)?;
                }
            }
            (None, _) => unreachable!("at most three date parts"),
        }
        Ok(())
    }

    fn resolve(mut self, reference: NaiveDateTime) -> DateResult<NaiveDateTime> {
        if self.fields.is_empty() {
            return Err(DateParseError::NoDate(self.input.to_string()));
        }
        self.resolve_ymd()?;
        let fields = &self.fields;

        let year = match fields.year {
            Some(n) => expand_year(n, reference.year()),
            None => reference.year(),
        };
        let month = fields.month.unwrap_or_else(|| reference.month());
        if !(1..=12).contains(&month) {
            return Err(self.out_of_range(format!("month {month}")));
        }
        let day = match fields.day {
            Some(day) => day,
            None => reference.day().min(days_in_month(year, month)),
        };
        let mut date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| self.out_of_range(format!("day {day} of {year}-{month:02}")))?;

        if let (Some(weekday), None) = (fields.weekday, fields.day) {
            let ahead = (7 + weekday.num_days_from_monday()
                - date.weekday().num_days_from_monday())
                % 7;
            date += Duration::days(i64::from(ahead));
        }

        let mut hour = fields.hour.unwrap_or(0);
        match fields.meridiem {
            Some(_) if hour > 12 => {
                return Err(self.out_of_range(format!("hour {hour} with am/pm")));
            }
            Some(Meridiem::Pm) if hour < 12 => hour += 12,
            Some(Meridiem::Am) if hour == 12 => hour = 0,
            _ => {}
        }

        let time = NaiveTime::from_hms_micro_opt(
            hour,
            fields.minute.unwrap_or(0),
            fields.second.unwrap_or(0),
            fields.micro.unwrap_or(0),
        )
        .ok_or_else(|| self.out_of_range("invalid time of day"))?;

        Ok(date.and_time(time))
    }
}

fn assign<T>(
    slot: &mut Option<T>,
    value: T,
    component: &'static str,
    input: &str,
) -> DateResult<()> {
    if slot.is_some() {
        return Err(DateParseError::Conflict {
            input: input.to_string(),
            component,
        });
    }
    *slot = Some(value);
    Ok(())
}

/// Numeric value of `digits[start..end]`. Callers only pass ASCII digit runs
/// whose length covers the range.
fn slice(digits: &str, start: usize, end: usize) -> u32 {
    digits[start..end]
        .bytes()
        .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

/// Fractional seconds as microseconds, truncated to six digits.
fn micros(frac: &str) -> u32 {
    let mut padded: String = frac.chars().take(6).collect();
    while padded.len() < 6 {
        padded.push('0');
    }
    slice(&padded, 0, 6)
}

/// Two-digit years land within 50 years of the reference year.
fn expand_year(year: Num, reference_year: i32) -> i32 {
    let value = year.value as i32;
    if year.digits > 2 || value >= 100 {
        return value;
    }
    let mut expanded = value + reference_year / 100 * 100;
    if expanded >= reference_year + 50 {
        expanded -= 100;
    } else if expanded < reference_year - 50 {
        expanded += 100;
    }
    expanded
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}
