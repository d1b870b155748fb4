use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::guide::parse::{parse_line, ParsedLine};

pub mod parse;

/// One scheduled broadcast on a virtual channel.
///
/// Equality ignores `station`: dvbtee repeats the same event with differently
/// formatted station names, and those should collapse into a single entry.
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub channel: String,
    pub station: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub title: String,
}

impl Program {
    /// Build a program, pushing `end` into the next day when the guide's
    /// end-of-day time falls at or before `start`.
    pub fn new(
        channel: impl Into<String>,
        station: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        title: impl Into<String>,
    ) -> Self {
        let end = if end <= start {
            end + TimeDelta::days(1)
        } else {
            end
        };

        Self {
            channel: channel.into(),
            station: station.into(),
            start,
            end,
            title: title.into(),
        }
    }

    pub fn is_airing(&self, now: NaiveDateTime) -> bool {
        self.start <= now && now <= self.end
    }
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.channel == other.channel
            && self.start == other.start
            && self.end == other.end
            && self.title == other.title
    }
}

impl Eq for Program {}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} | {} {} | {}",
            self.start, self.end, self.channel, self.station, self.title
        )
    }
}

/// Programs for a single virtual channel, in the order the guide listed them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schedule {
    programs: Vec<Program>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless an equal program is already present. Returns whether it was added.
    pub fn push(&mut self, program: Program) -> bool {
        if self.programs.contains(&program) {
            return false;
        }
        self.programs.push(program);

        true
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Program> {
        self.programs.iter()
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn find_current(&self, now: NaiveDateTime) -> Option<&Program> {
        find_current(self, now)
    }
}

impl FromIterator<Program> for Schedule {
    fn from_iter<T: IntoIterator<Item = Program>>(iter: T) -> Self {
        let mut schedule = Schedule::new();
        for program in iter {
            schedule.push(program);
        }

        schedule
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Program;
    type IntoIter = std::slice::Iter<'a, Program>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The first program in listing order whose window contains `now`, bounds inclusive.
/// Overlaps are not resolved beyond that.
pub fn find_current(schedule: &Schedule, now: NaiveDateTime) -> Option<&Program> {
    schedule.iter().find(|program| program.is_airing(now))
}

/// Build the schedule for `virtual_channel` out of dvbtee's diagnostic output.
/// Anything that isn't a guide event is noise and gets skipped.
pub fn parse_guide<'a, I>(lines: I, virtual_channel: &str) -> Schedule
where
    I: IntoIterator<Item = &'a str>,
{
    let mut schedule = Schedule::new();
    for line in lines {
        let event = match parse_line(line) {
            ParsedLine::Event(event) => event,
            ParsedLine::Unrecognized => continue,
        };

        // Only the tuned virtual channel.
        if event.channel != virtual_channel {
            continue;
        }

        schedule.push(event.into_program());
    }

    schedule
}
