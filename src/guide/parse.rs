//! Line grammar for dvbtee's guide dump.
//!
//! With `-E`, dvbtee logs every EIT event it sees on stderr, one per line:
//!
//! ```text
//! dump_epg_event: id:3 - 55.3: Movies!	2023-01-26 07:35-09:15 Danger Signal
//! ```
//!
//! The station name is terminated by a tab. Times are local, minute resolution,
//! and the end time shares the start's date.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::guide::Program;

const EVENT_TAG: &str = "dump_epg_event:";

lazy_static! {
    static ref EVENT_LINE: Regex = Regex::new(concat!(
        r"^dump_epg_event: id:\d+\s+-\s+",
        r"(?P<channel>\d+\.\d+):\s+",
        r"(?P<station>[^\t]+)\t",
        r"(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})\s",
        r"(?P<s_hour>\d{2}):(?P<s_minute>\d{2})-",
        r"(?P<e_hour>\d{2}):(?P<e_minute>\d{2})\s+",
        r"(?P<title>.+)$",
    ))
    .expect("guide event pattern should compile");
}

/// A guide event as announced on one line, before channel filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideEvent {
    pub channel: String,
    pub station: String,
    pub start: NaiveDateTime,
    /// Same calendar day as `start`; rollover is applied by [GuideEvent::into_program].
    pub end: NaiveDateTime,
    pub title: String,
}

impl GuideEvent {
    pub fn into_program(self) -> Program {
        Program::new(self.channel, self.station, self.start, self.end, self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Event(GuideEvent),
    Unrecognized,
}

pub fn parse_line(line: &str) -> ParsedLine {
    let line = line.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
    if !line.starts_with(EVENT_TAG) {
        return ParsedLine::Unrecognized;
    }

    EVENT_LINE
        .captures(line)
        .and_then(|captures| event_from(&captures))
        .map_or(ParsedLine::Unrecognized, ParsedLine::Event)
}

fn event_from(captures: &Captures) -> Option<GuideEvent> {
    let number = |name: &str| -> Option<u32> { captures.name(name)?.as_str().parse().ok() };

    let date = NaiveDate::from_ymd_opt(number("year")? as i32, number("month")?, number("day")?)?;
    let start = NaiveTime::from_hms_opt(number("s_hour")?, number("s_minute")?, 0)?;
    let end = NaiveTime::from_hms_opt(number("e_hour")?, number("e_minute")?, 0)?;

    Some(GuideEvent {
        channel: captures["channel"].to_string(),
        station: captures["station"].to_string(),
        start: date.and_time(start),
        end: date.and_time(end),
        title: captures["title"].to_string(),
    })
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use crate::guide::parse::{parse_line, ParsedLine};

    #[test]
    pub fn test_recognized_line() {
        let line = "  dump_epg_event: id:12 - 55.3: Movies!\t2023-01-26 07:35-09:15 Danger Signal\r\n";
        let ParsedLine::Event(event) = parse_line(line) else {
            panic!("line should be recognized");
        };

        let day = NaiveDate::from_ymd_opt(2023, 1, 26).unwrap();
        assert_eq!(event.channel, "55.3");
        assert_eq!(event.station, "Movies!");
        assert_eq!(event.start, day.and_hms_opt(7, 35, 0).unwrap());
        assert_eq!(event.end, day.and_hms_opt(9, 15, 0).unwrap());
        assert_eq!(event.title, "Danger Signal");
    }

    #[test]
    pub fn test_station_with_spaces_and_title_with_colon() {
        let line = "dump_epg_event: id:1 - 7.1: KXYZ HD\t2023-02-01 20:00-21:00 Star Trek: The Next Generation";
        let ParsedLine::Event(event) = parse_line(line) else {
            panic!("line should be recognized");
        };

        assert_eq!(event.station, "KXYZ HD");
        assert_eq!(event.title, "Star Trek: The Next Generation");
    }

    #[test]
    pub fn test_unrecognized_lines() {
        let lines = [
            "",
            "tune_channel: 17",
            "dump_epg_event: id:3",
            // missing tab after station
            "dump_epg_event: id:3 - 55.3: Movies! 2023-01-26 07:35-09:15 Danger Signal",
            // missing title
            "dump_epg_event: id:3 - 55.3: Movies!\t2023-01-26 07:35-09:15",
            // impossible month
            "dump_epg_event: id:3 - 55.3: Movies!\t2023-13-26 07:35-09:15 Danger Signal",
            // impossible hour
            "dump_epg_event: id:3 - 55.3: Movies!\t2023-01-26 25:35-09:15 Danger Signal",
        ];

        for line in lines {
            assert_eq!(parse_line(line), ParsedLine::Unrecognized, "{line:?}");
        }
    }
}
