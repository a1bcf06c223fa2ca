//! Warnings on field values of a validated submission
//!
//! These run after structural validation and only on accepted fields.
//! None of them is fatal: the ECF may accept a file that fails them.

use std::collections::HashMap;

use chrono::NaiveDate;
use pest::Span;

use crate::config::Config;
use crate::lib::{
    document::{Document, Field, Status},
    tag::{Part, Tag},
    value,
};
use crate::load::error;

/// Record a warning for each suspicious value of `doc`
pub fn check_values(path: &str, errs: &mut error::Record, config: &Config, contents: &str, doc: &Document) {
    let loc = |field: &Field| {
        let span = Span::new(contents, field.span.0, field.span.1);
        span.map(|span| (path, span))
    };
    let accepted = doc.fields().iter().filter(|f| f.status == Status::Ok);

    for field in accepted.clone() {
        let (tag, text) = match (field.tag, &field.value) {
            (Some(tag), Some(text)) => (tag, text),
            _ => continue,
        };
        if let Err(err) = value::check(tag, text, &config.date_format) {
            if let Some(loc) = loc(field) {
                errs.make("Invalid value")
                    .nonfatal()
                    .span(&loc, format!("in {}", tag))
                    .text(err.to_string())
                    .hint(err.hint());
            }
        }
    }

    // event period
    let date_of = |tag: Tag| {
        doc.values_of(tag)
            .next()
            .and_then(|v| value::parse_date(v, &config.date_format).ok())
    };
    let start = date_of(Tag::EventDate);
    let end = date_of(Tag::FinalResultDate);
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            if let Some(loc) = accepted.clone().find(|f| f.is(Tag::FinalResultDate)).and_then(loc) {
                errs.make("Event dates")
                    .nonfatal()
                    .span(&loc, format!("before EVENT DATE {}", start.format(&config.date_format)))
                    .hint("FINAL RESULT DATE is the date of the last game");
            }
        }
    }
    for field in accepted.clone().filter(|f| f.is(Tag::GameDate) || f.is(Tag::ResultsDate)) {
        let date = match field.value.as_deref().map(|v| value::parse_date(v, &config.date_format)) {
            Some(Ok(date)) => date,
            _ => continue,
        };
        if outside(date, start, end) {
            if let Some(loc) = loc(field) {
                errs.make("Date outside event")
                    .nonfatal()
                    .span(&loc, "game played outside the event")
                    .text("Games are played between EVENT DATE and FINAL RESULT DATE");
            }
        }
    }

    // player references
    let in_players = |f: &&Field| f.part.map(|p| doc.parts()[p].part == Part::PlayerList).unwrap_or(false);
    let mut pins = HashMap::new();
    for field in accepted.clone().filter(|f| f.is(Tag::Pin)).filter(in_players) {
        let pin = field.value.as_deref().unwrap_or("").trim();
        if pin.is_empty() {
            continue;
        }
        if let Some(first) = pins.insert(pin, field) {
            if let (Some(loc), Some(first)) = (loc(field), loc(first)) {
                errs.make("Duplicate PIN")
                    .nonfatal()
                    .span(&loc, format!("PIN {} is given again", pin))
                    .span(&first, "first given here")
                    .hint("each player has a distinct PIN");
            }
        }
    }
    if doc.stopped_at().map(|part| part <= Part::PlayerList).unwrap_or(false) {
        // results were not read
        return;
    }
    let mut pin1 = None;
    for field in accepted.filter(|f| f.is(Tag::Pin1) || f.is(Tag::Pin2)) {
        let pin = field.value.as_deref().unwrap_or("").trim();
        if pin.is_empty() {
            if field.is(Tag::Pin1) {
                pin1 = None;
            }
            continue;
        }
        if !pins.contains_key(pin) {
            if let Some(loc) = loc(field) {
                errs.make("Unknown player")
                    .nonfatal()
                    .span(&loc, format!("no PIN {} in the PLAYER LIST", pin))
                    .hint("add the player to the PLAYER LIST");
            }
        }
        if field.is(Tag::Pin1) {
            pin1 = Some(pin);
        } else if pin1 == Some(pin) {
            if let Some(loc) = loc(field) {
                errs.make("Player against themselves")
                    .nonfatal()
                    .span(&loc, "PIN2 is the same as PIN1")
                    .hint("check the pairing");
            }
        }
    }
}

fn outside(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.map(|s| date < s).unwrap_or(false) || end.map(|e| date > e).unwrap_or(false)
}
