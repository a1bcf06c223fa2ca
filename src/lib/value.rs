//! Checks on the values of individual fields
//!
//! The submission format constrains few values structurally; these checks
//! catch typing mistakes and are reported as warnings.

use chrono::NaiveDate;
use thiserror::Error;

use crate::lib::tag::Tag;

/// Check letters of an ECF grading code
const CHECK_LETTERS: &str = "ABCDEFGHJKL";

const SCORES: &[&str] = &["10", "01", "55", "0D", "D0"];
const COLOURS: &[&str] = &["WHITE", "BLACK", "W", "B"];
const WHITE_ON: &[&str] = &["ALL", "EVEN", "ODD", "NONE", "UNKNOWN"];
const GENDERS: &[&str] = &["M", "F"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("'{value}' is not a date")]
    Date { value: String, format: String },
    #[error("'{0}' is not an ECF grading code")]
    EcfCode(String),
    #[error("'{0}' is not an ECF membership number")]
    EcfNo(String),
    #[error("'{0}' is not a number")]
    Digits(String),
    #[error("'{value}' is not one of {}", .allowed.join(", "))]
    OneOf {
        value: String,
        allowed: &'static [&'static str],
    },
}

impl ValueError {
    /// Suggestion on how to write the value
    pub fn hint(&self) -> String {
        match self {
            ValueError::Date { format, .. } => {
                format!("write dates as '{}'", format)
            }
            ValueError::EcfCode(_) => {
                "an ECF code is 6 digits followed by a letter, as in '123456A'".to_string()
            }
            ValueError::EcfNo(_) => "a membership number is made of digits, optionally after 'ME'".to_string(),
            ValueError::Digits(_) => "use digits only".to_string(),
            ValueError::OneOf { allowed, .. } => format!("choose among {}", allowed.join(", ")),
        }
    }
}

/// Fields whose value is a date
pub fn is_date_field(tag: Tag) -> bool {
    use Tag::*;
    matches!(
        tag,
        EventDate | FinalResultDate | GameDate | ResultsDate | DateOfBirth
    )
}

pub fn parse_date(value: &str, format: &str) -> Result<NaiveDate, ValueError> {
    NaiveDate::parse_from_str(value.trim(), format).map_err(|_| ValueError::Date {
        value: value.to_string(),
        format: format.to_string(),
    })
}

fn one_of(value: &str, allowed: &'static [&'static str]) -> Result<(), ValueError> {
    let upper = value.trim().to_uppercase();
    if allowed.contains(&upper.as_str()) {
        Ok(())
    } else {
        Err(ValueError::OneOf {
            value: value.to_string(),
            allowed,
        })
    }
}

fn digits(value: &str) -> Result<(), ValueError> {
    let value = value.trim();
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValueError::Digits(value.to_string()))
    }
}

fn ecf_code(value: &str) -> Result<(), ValueError> {
    let code = value.trim().to_uppercase();
    let mut chars = code.chars();
    let letter = chars.next_back();
    let number = chars.as_str();
    let ok = number.len() == 6
        && number.chars().all(|c| c.is_ascii_digit())
        && letter.map(|c| CHECK_LETTERS.contains(c)).unwrap_or(false);
    if ok {
        Ok(())
    } else {
        Err(ValueError::EcfCode(value.to_string()))
    }
}

fn ecf_no(value: &str) -> Result<(), ValueError> {
    let no = value.trim().to_uppercase();
    let number = no.strip_prefix("ME").unwrap_or(&no);
    if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValueError::EcfNo(value.to_string()))
    }
}

/// Check a value of field `tag`
///
/// Fields with free text or no specific format always pass.
/// Empty values pass as well: absence of information is not a typo.
pub fn check(tag: Tag, value: &str, date_format: &str) -> Result<(), ValueError> {
    use Tag::*;
    if value.trim().is_empty() {
        return Ok(());
    }
    match tag {
        _ if is_date_field(tag) => parse_date(value, date_format).map(|_| ()),
        EcfCode | BcfCode => ecf_code(value),
        EcfNo | BcfNo => ecf_no(value),
        Pin | Pin1 | Pin2 | FideNo | Board | Round | SubmissionIndex | MinutesForGame
        | MovesFirstSession | MinutesFirstSession | MovesSecondSession | MinutesSecondSession
        | MinutesRestOfGame | SecondsPerMove => digits(value),
        Score => one_of(value, SCORES),
        Colour => one_of(value, COLOURS),
        WhiteOn => one_of(value, WHITE_ON),
        Gender => one_of(value, GENDERS),
        _ => Ok(()),
    }
}
