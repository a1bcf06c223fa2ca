//! Diagnostics for a submission file
//!
//! Each problem is an `Error` made from a `Record`, then given source
//! blocks, notes and hints. Source blocks are drawn by pest from the
//! span of the offending field and recoloured when printed.
//!
//! # Example
//!
//! ```rust
//! errs.make("Unexpected field")
//!     .span(&loc, "BOARD is not allowed here")
//!     .text("Expected one of COLOUR, COMMENT, GAME DATE, PIN2, SCORE")
//!     .hint("BOARD only appears in MATCH RESULTS")
//! ```
//!
//! ```txt
//! --> Error: Unexpected field
//!  |     --> league.txt:12:9
//!  |      |
//!  |   12 | #PIN1=3#BOARD=1#PIN2=4#SCORE=10
//!  |      |        ^------^
//!  |      |
//!  |      = BOARD is not allowed here
//!  |  Expected one of COLOUR, COMMENT, GAME DATE, PIN2, SCORE
//!  |      ? hint: BOARD only appears in MATCH RESULTS
//! ```

/// File name and span of the offending text
pub type Loc<'i> = (&'i str, pest::Span<'i>);

use crate::load::parse::Rule;

/// One problem: a label followed by blocks, notes and hints, each on one line
#[must_use]
#[derive(Debug)]
pub struct Error {
    /// errors are red and make the file invalid, warnings are yellow
    fatal: bool,
    label: String,
    items: Vec<Item>,
}

#[derive(Debug)]
enum Item {
    /// source excerpt with a message under the span
    Block(pest::error::Error<Rule>),
    Text(String),
    Hint(String),
}

/// Every problem found in one submission, in the order found
#[must_use]
#[derive(Debug, Default)]
pub struct Record {
    /// fatal errors among all but the last one, which `nonfatal` may
    /// still downgrade
    fatal: usize,
    contents: Vec<Error>,
}

impl Error {
    /// Attach a lexing error reported by pest
    pub fn from(&mut self, err: pest::error::Error<Rule>) -> &mut Self {
        self.items.push(Item::Block(err.renamed_rules(rule_rename)));
        self
    }

    pub fn new<S>(msg: S) -> Self
    where
        S: ToString,
    {
        Self {
            fatal: true,
            label: msg.to_string(),
            items: Vec::new(),
        }
    }

    /// Downgrade to a warning
    pub fn nonfatal(&mut self) -> &mut Self {
        self.fatal = false;
        self
    }

    /// Show the text at `loc` with `msg` under it
    pub fn span<S>(&mut self, loc: &Loc, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Block(
            pest::error::Error::new_from_span(
                pest::error::ErrorVariant::CustomError {
                    message: msg.to_string(),
                },
                loc.1.clone(),
            )
            .with_path(loc.0),
        ));
        self
    }

    pub fn text<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Text(msg.to_string()));
        self
    }

    /// Suggest a fix
    pub fn hint<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Hint(msg.to_string()));
        self
    }
}

#[cfg(test)]
impl Error {
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the submission is invalid
    pub fn is_fatal(&self) -> bool {
        self.fatal > 0 || self.last_is_fatal()
    }

    fn last_is_fatal(&self) -> bool {
        self.contents.last().map(|e| e.fatal).unwrap_or(false)
    }

    pub fn count_errors(&self) -> usize {
        self.fatal + if self.last_is_fatal() { 1 } else { 0 }
    }

    pub fn count_warnings(&self) -> usize {
        self.contents.len() - self.count_errors()
    }

    /// Start a fatal error, to be filled in by the caller
    pub fn make<S>(&mut self, msg: S) -> &mut Error
    where
        S: ToString,
    {
        if self.last_is_fatal() {
            self.fatal += 1;
        }
        let idx = self.contents.len();
        self.contents.push(Error::new(msg));
        &mut self.contents[idx]
    }
}

#[cfg(test)]
impl Record {
    /// All errors in the order they were made
    pub fn errors(&self) -> impl Iterator<Item = &Error> {
        self.contents.iter()
    }
}

const RED: &str = "\x1b[0;91;1m";
const YELLOW: &str = "\x1b[0;93;1m";
const BLUE: &str = "\x1b[0;96;1m";
const WHITE: &str = "\x1b[0;1m";
const NONE: &str = "\x1b[0m";

/// At most this many errors are printed
const TRUNC: usize = 10;

use std::fmt;

/// Recolour the excerpt drawn by pest, indented under the error label
fn write_block(f: &mut fmt::Formatter<'_>, block: &pest::error::Error<Rule>, color: &str) -> fmt::Result {
    // pest right-aligns the gutter to the widest line number, and the
    // first line ("-->") sets how far the following ones are shifted
    let mut indent = String::from("   ");
    let mut gutter_seen = false;
    for line in block.to_string().lines() {
        let shift = if gutter_seen { indent.as_str() } else { "" };
        write!(f, " {}|{}  {}", color, shift, BLUE)?;
        for c in line.chars() {
            match c {
                '-' if !gutter_seen => {
                    gutter_seen = true;
                    write!(f, "{}-", indent)?;
                }
                ' ' if !gutter_seen => {
                    indent.pop();
                    f.write_str(" ")?;
                }
                '|' | '=' => write!(f, "{}{}", c, NONE)?,
                '^' => write!(f, "{}^", color)?,
                // pest marks line endings inside a span
                '␊' => (),
                _ => write!(f, "{}", c)?,
            }
        }
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (color, kind) = if self.fatal { (RED, "Error") } else { (YELLOW, "Warning") };
        writeln!(f, "{}--> {}:{} {}{}", color, kind, WHITE, self.label, NONE)?;
        for item in &self.items {
            match item {
                Item::Block(block) => write_block(f, block, color)?,
                Item::Text(txt) => writeln!(f, " {}|  {}{}{}", color, WHITE, txt, NONE)?,
                Item::Hint(txt) => writeln!(f, " {}|      {}? hint: {}{}", color, BLUE, NONE, txt)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contents.is_empty() {
            return Ok(());
        }
        let fatal = self.is_fatal();
        let (count, color, kind, noun) = if fatal {
            (self.count_errors(), RED, "Fatal", "error")
        } else {
            (self.count_warnings(), YELLOW, "Nonfatal", "warning")
        };
        // warnings are hidden while there are errors
        for err in self.contents.iter().filter(|err| err.fatal == fatal).take(TRUNC) {
            writeln!(f, "{}", err)?;
        }
        if count > TRUNC {
            writeln!(f, "{} And {} more.", color, count - TRUNC)?;
        }
        let plural = if count > 1 { "s" } else { "" };
        writeln!(f, "{}{}: {}{} {}{} emitted{}", color, kind, WHITE, count, noun, plural, NONE)
    }
}

fn rule_rename(r: &Rule) -> String {
    String::from(match r {
        Rule::EOI => "EOF",
        Rule::submission => "a results submission",
        Rule::leading => "text before the first field",
        Rule::field => "a field '#NAME=value'",
        Rule::body => "the name and value of a field",
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn loc(text: &str) -> Loc<'_> {
        ("test.txt", pest::Span::new(text, 0, text.len()).unwrap())
    }

    #[test]
    fn counts_follow_last_error() {
        let text = "#PIN=1";
        let mut errs = Record::new();
        assert!(!errs.is_fatal());
        errs.make("Player name").span(&loc(text), "here");
        assert!(errs.is_fatal());
        errs.make("Invalid score").nonfatal();
        errs.make("Unidentified club").nonfatal().hint("add CLUB CODE");
        assert_eq!(errs.count_errors(), 1);
        assert_eq!(errs.count_warnings(), 2);
        let labels = errs.errors().map(|e| (e.label(), e.is_fatal())).collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec![("Player name", true), ("Invalid score", false), ("Unidentified club", false)]
        );
    }

    #[test]
    fn only_most_severe_printed() {
        let text = "#SCORE=2";
        let mut errs = Record::new();
        errs.make("Invalid score").nonfatal().span(&loc(text), "here");
        let printed = errs.to_string();
        assert!(printed.contains("Invalid score"));
        assert!(printed.contains("1 warning emitted"));
        errs.make("Missing FINISH");
        let printed = errs.to_string();
        assert!(!printed.contains("Invalid score"));
        assert!(printed.contains("1 error emitted"));
    }

    #[test]
    fn block_shows_source() {
        let text = "#PIN=1";
        let mut errs = Record::new();
        errs.make("Unknown field").span(&loc(text), "here").hint("remove it");
        let printed = errs.to_string();
        assert!(printed.contains("--> Error:"));
        assert!(printed.contains("#PIN="));
        assert!(printed.contains("? hint: "));
        assert!(printed.contains("1 error emitted"));
    }

    #[test]
    fn truncated() {
        let mut errs = Record::new();
        for _ in 0..12 {
            errs.make("Unknown field");
        }
        assert!(errs.to_string().contains("And 2 more."));
    }
}
