//! Check the structure of a submission field by field
//!
//! The validator keeps the set of fields expected next (see `lib::expected`).
//! Part and record fields open a new set after checking that the previous one
//! is complete. Tables are collected then replayed as ordinary records, so
//! that they go through the same checks.

use pest::{Position, Span};
use tracing::{debug, trace};

use crate::config::Config;
use crate::lib::{
    document::{Document, Field, Status},
    expected::{Context, Expected},
    table::Table,
    tag::{normalise, Part, Tag},
};
use crate::load::{error, parse::RawField};

/// What to do after a field
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    /// reached the part validation should stop at
    Stop,
    /// the text is not a submission at all
    Abort,
}

/// A field with a known name
#[derive(Debug, Clone)]
struct Item<'i> {
    tag: Tag,
    /// as typed
    name: &'i str,
    value: Option<&'i str>,
    span: Span<'i>,
}

struct Validator<'i, 'r> {
    path: &'i str,
    contents: &'i str,
    errs: &'r mut error::Record,
    config: &'r Config,
    stop_at: Option<Part>,
    doc: Document,
    expected: Expected,
    table: Option<Table<'i>>,
    /// offset of the first COLUMN of the current table
    table_start: usize,
    /// field that opened the current set, if its closing checks apply
    set_loc: Option<Span<'i>>,
    finished: bool,
}

/// Validate the fields of file `path`
///
/// Returns `None` if the text turns out not to be a submission file.
/// Otherwise the document holds every field, including those in error,
/// and problems are recorded in `errs`.
pub fn validate<'i>(
    path: &'i str,
    errs: &mut error::Record,
    config: &Config,
    contents: &'i str,
    fields: &[RawField<'i>],
    stop_at: Option<Part>,
) -> Option<Document> {
    let mut validator = Validator {
        path,
        contents,
        errs,
        config,
        stop_at,
        doc: Document::new(),
        expected: Expected::new(Context::Start),
        table: None,
        table_start: 0,
        set_loc: None,
        finished: false,
    };
    for raw in fields {
        match validator.field(raw) {
            Flow::Continue => (),
            Flow::Stop => {
                validator.close();
                return Some(validator.doc);
            }
            Flow::Abort => return None,
        }
    }
    Some(validator.finish())
}

impl<'i, 'r> Validator<'i, 'r> {
    fn field(&mut self, raw: &RawField<'i>) -> Flow {
        if raw.leading {
            if raw.is_blank() {
                return Flow::Continue;
            }
            return self.leading(raw.body.trim(), raw.span.clone());
        }
        let (name, value) = raw.split();
        if self.expected.context() == Context::TableValues {
            if name.parse::<Tag>() == Ok(Tag::TableEnd) {
                self.table_end(raw.span.end());
            } else if let Some(table) = &mut self.table {
                table.add_value(raw.body, raw.range());
            }
            return Flow::Continue;
        }
        if raw.is_blank() {
            return Flow::Continue;
        }
        let tag = name.parse::<Tag>().ok();
        if self.expected.context() == Context::Columns
            && !matches!(tag, Some(Tag::Column) | Some(Tag::TableStart))
        {
            self.break_table(raw.span.start());
        }
        let tag = match tag {
            Some(tag) => tag,
            None => return self.unknown(name, value, raw.span.clone()),
        };
        if let Some(part) = Part::from_tag(tag) {
            if self.stop_at == Some(part) {
                debug!(part = %part, "stopping before part");
                self.doc.set_stopped_at(part);
                return Flow::Stop;
            }
        }
        self.known(Item {
            tag,
            name,
            value,
            span: raw.span.clone(),
        });
        Flow::Continue
    }

    fn known(&mut self, item: Item<'i>) {
        match (self.expected.context(), item.tag) {
            (Context::Columns, Tag::Column) => self.add_column(item),
            (Context::Columns, Tag::TableStart) => self.table_values(),
            (_, Tag::Column) => self.open_table(item),
            (_, Tag::Pin) | (_, Tag::Pin1) => self.record(item),
            (_, tag) => match Part::from_tag(tag) {
                Some(part) => self.part(part, item),
                None => self.plain(item),
            },
        }
    }

    /// A field that opens a part
    fn part(&mut self, part: Part, item: Item<'i>) {
        if !self.expected.contains(item.tag) {
            return self.unexpected(item);
        }
        self.close();
        debug!(part = %part, "opening part");
        self.expected = Expected::new(Context::of_part(part));
        self.doc.open_part(part);
        self.set_loc = Some(item.span.clone());
        if part == Part::Finish {
            self.finished = true;
        }
        self.accept(item);
    }

    /// PIN or PIN1, which open a record
    fn record(&mut self, item: Item<'i>) {
        if !self.expected.contains(item.tag) {
            return self.unexpected(item);
        }
        let context = match (item.tag, self.expected.context()) {
            (Tag::Pin, _) => Context::Pin,
            (Tag::Pin1, Context::Results(kind)) | (Tag::Pin1, Context::Pin1(kind)) => Context::Pin1(kind),
            _ => return self.unexpected(item),
        };
        self.close();
        self.expected = Expected::new(context);
        self.doc.count_record();
        self.set_loc = Some(item.span.clone());
        self.accept(item);
    }

    /// Any field that neither opens a set nor belongs to a table
    fn plain(&mut self, item: Item<'i>) {
        use Tag::*;
        let exp = &mut self.expected;
        let accepted = match item.tag {
            EcfCode | BcfCode | EcfNo | BcfNo | ClubName | Club => exp.remove_aliased(item.tag),
            ResultsOfficerAddress | TreasurerAddress => exp.remove_repeatable(item.tag),
            MinutesForGame => exp.remove_minutes_for_game(),
            MovesFirstSession | MinutesFirstSession | MovesSecondSession | MinutesSecondSession => {
                exp.remove_session_field(item.tag)
            }
            MinutesRestOfGame => exp.remove_minutes_rest_of_game(),
            tag => exp.remove(tag),
        };
        if accepted {
            self.accept(item);
        } else {
            self.unexpected(item);
        }
    }

    fn accept(&mut self, item: Item<'i>) {
        trace!(field = %item.tag, "accepted");
        let loc = (self.path, item.span.clone());
        let has_value = item.value.map(|v| !v.is_empty()).unwrap_or(false);
        if item.tag.without_value() && has_value {
            self.errs
                .make("Unused value")
                .nonfatal()
                .span(&loc, format!("{} takes no value", item.tag))
                .hint(format!("write '#{}#'", item.tag));
        } else if !item.tag.without_value() && Part::from_tag(item.tag).is_none() && item.value.is_none() {
            self.errs
                .make("Missing value")
                .nonfatal()
                .span(&loc, format!("{} has no value", item.tag))
                .hint(format!("write '#{}=value#'", item.tag));
        }
        self.push(Some(item.tag), item.tag.name().to_string(), item.value, Status::Ok, &item.span);
    }

    fn unexpected(&mut self, item: Item<'i>) {
        let loc = (self.path, item.span.clone());
        let expected = self.expected.names();
        let err = self
            .errs
            .make("Unexpected field")
            .span(&loc, format!("{} is not allowed here", item.tag));
        if expected.is_empty() {
            err.text("Nothing may follow FINISH");
        } else {
            err.text(format!("Expected one of {}", expected.join(", ")));
        }
        err.hint(hint_for(item.tag, self.expected.context()));
        self.push(Some(item.tag), item.name.to_string(), item.value, Status::Unexpected, &item.span);
        self.reset();
    }

    fn unknown(&mut self, name: &'i str, value: Option<&'i str>, span: Span<'i>) -> Flow {
        let loc = (self.path, span.clone());
        let too_long = normalise(name).chars().count() > self.config.max_name_length
            || value.map(|v| v.chars().count() > self.config.max_value_length).unwrap_or(false);
        if too_long {
            self.errs
                .make("Not an ECF results submission file")
                .span(&loc, "this is not a field")
                .text(format!(
                    "Field names have at most {} characters and values at most {}",
                    self.config.max_name_length, self.config.max_value_length
                ))
                .hint("check that the right file was given");
            return Flow::Abort;
        }
        self.errs
            .make("Unknown field")
            .span(&loc, format!("'{}' is not a field name", name))
            .hint("check the spelling, or remove the field");
        self.push(None, name.to_string(), value, Status::Unknown, &span);
        self.reset();
        Flow::Continue
    }

    /// Text before the first field, commonly the start of an email
    fn leading(&mut self, text: &'i str, span: Span<'i>) -> Flow {
        if normalise(text).chars().count() <= self.config.max_name_length {
            return self.unknown(text, None, span);
        }
        let loc = (self.path, span.clone());
        self.errs
            .make("Text before EVENT DETAILS")
            .span(&loc, "this is not a field")
            .hint("remove everything before '#EVENT DETAILS'");
        self.push(None, text.to_string(), None, Status::Unknown, &span);
        Flow::Continue
    }

    /// Forget what was seen in the current set after an error
    ///
    /// The closing checks of the set are skipped: the set is already in error
    /// and the fields seen before the reset are no longer known.
    fn reset(&mut self) {
        self.expected.reset();
        self.set_loc = None;
    }

    /// Run the checks that apply once the current set is complete
    fn close(&mut self) {
        let span = match self.set_loc.take() {
            Some(span) => span,
            None => return,
        };
        let loc = (self.path, span);
        match self.expected.context() {
            Context::EventDetails => {
                let problems = self.expected.event_problems();
                if problems.is_empty() {
                    return;
                }
                if !problems.missing.is_empty() {
                    let names = problems.missing.iter().map(|t| t.name()).collect::<Vec<_>>();
                    self.errs
                        .make("Incomplete event details")
                        .span(&loc, "in this part")
                        .text(format!("Missing {}", names.join(", ")))
                        .hint("every one of these fields is mandatory");
                }
                if problems.bad_time_limit {
                    self.errs
                        .make("Invalid time limit")
                        .span(&loc, "in this part")
                        .text("The time limit fields do not describe a time control")
                        .hint("use MINUTES FOR GAME alone, or MOVES and MINUTES for each session")
                        .hint("MINUTES REST OF GAME ends a time control with sessions");
                }
            }
            Context::Pin => {
                let problems = self.expected.pin_problems();
                if problems.name {
                    self.errs
                        .make("Player name")
                        .span(&loc, "in this record")
                        .text("A player has exactly one of NAME and SURNAME")
                        .hint("write 'NAME=Surname, Forenames' or use SURNAME with FORENAME or INITIALS");
                }
                if problems.name_parts {
                    self.errs
                        .make("Player name parts")
                        .span(&loc, "in this record")
                        .text("FORENAME and INITIALS only go with SURNAME")
                        .hint("replace NAME by SURNAME");
                }
                if problems.unidentified_club {
                    self.errs
                        .make("Unidentified club")
                        .nonfatal()
                        .span(&loc, "in this record")
                        .text("A player without ECF CODE or CLUB CODE should have CLUB NAME and CLUB COUNTY")
                        .hint("add ECF CODE or CLUB CODE");
                }
            }
            Context::Pin1(_) => {
                let missing = self.expected.pin1_missing();
                if !missing.is_empty() {
                    let names = missing.iter().map(|t| t.name()).collect::<Vec<_>>();
                    self.errs
                        .make("Incomplete result")
                        .span(&loc, "in this record")
                        .text(format!("Missing {}", names.join(", ")))
                        .hint("a game result needs both players and the score");
                }
            }
            _ => (),
        }
    }

    /// First COLUMN of a table
    fn open_table(&mut self, item: Item<'i>) {
        if !self.expected.contains(Tag::Column) {
            return self.unexpected(item);
        }
        let table = match Table::for_context(self.expected.context()) {
            Some(table) => table,
            None => return self.unexpected(item),
        };
        self.close();
        debug!(part = %table.part(), "opening table");
        self.table = Some(table);
        self.table_start = item.span.start();
        self.expected = Expected::new(Context::Columns);
        self.add_column(item);
    }

    fn add_column(&mut self, item: Item<'i>) {
        if let Some(table) = &mut self.table {
            table.add_column(item.value.unwrap_or(""));
        }
    }

    fn table_values(&mut self) {
        if let Some(table) = &mut self.table {
            table.start();
        }
        self.expected = Expected::new(Context::TableValues);
    }

    fn table_end(&mut self, end: usize) {
        if let Some(table) = &mut self.table {
            table.end();
        }
        self.flush_table(end);
    }

    /// Another field interrupted the column definitions
    fn break_table(&mut self, end: usize) {
        if let Some(table) = &mut self.table {
            table.set_broken();
        }
        self.flush_table(end);
    }

    /// Turn the current table into records, or keep it as written if it
    /// cannot be
    fn flush_table(&mut self, end: usize) {
        let table = match self.table.take() {
            Some(table) => table,
            None => return,
        };
        let context = table.part_context();
        self.expected = Expected::new(context);
        let range = (self.table_start, end);
        match table.check_layout() {
            Ok(()) => {
                let records = table.records();
                debug!(part = %table.part(), records = records.len(), "converting table");
                for record in records {
                    for (idx, cell) in record.into_iter().enumerate() {
                        // the key cell always opens the record
                        if idx > 0 && cell.value.is_empty() {
                            continue;
                        }
                        let span = self.span_of(cell.span);
                        self.known(Item {
                            tag: cell.tag,
                            name: cell.tag.name(),
                            value: Some(cell.value),
                            span,
                        });
                    }
                }
                self.close();
                self.expected = Expected::new(context);
            }
            Err(layout) => {
                debug!(part = %table.part(), ?layout, "table kept as written");
                let loc = (self.path, self.span_of(range));
                self.errs
                    .make("Table layout")
                    .span(&loc, "in this table")
                    .text(layout.describe())
                    .hint("each row needs one value per COLUMN, and one column must be a PIN or PIN1");
                for (tag, value) in table.verbatim() {
                    let name = tag.map(|t| t.name().to_string()).unwrap_or_default();
                    let part = self.doc.current_part();
                    self.doc.push(Field {
                        tag,
                        name,
                        value,
                        status: Status::Layout,
                        span: range,
                        part,
                    });
                }
            }
        }
    }

    fn finish(mut self) -> Document {
        if self.table.is_some() {
            self.flush_table(self.contents.len());
        }
        self.close();
        // a file checked up to a part need not be complete
        if !self.finished && self.stop_at.is_none() {
            let loc = (self.path, self.eof());
            self.errs
                .make("Missing FINISH")
                .span(&loc, "text ends here")
                .text("A submission ends with a FINISH field")
                .hint("add '#FINISH#' at the end of the file");
        }
        self.doc
    }

    fn push(&mut self, tag: Option<Tag>, name: String, value: Option<&str>, status: Status, span: &Span<'i>) {
        let part = self.doc.current_part();
        self.doc.push(Field {
            tag,
            name,
            value: value.map(String::from),
            status,
            span: (span.start(), span.end()),
            part,
        });
    }

    fn span_of(&self, (start, end): (usize, usize)) -> Span<'i> {
        Span::new(self.contents, start, end).unwrap_or_else(|| self.eof())
    }

    fn eof(&self) -> Span<'i> {
        let end = Position::new(self.contents, self.contents.len())
            .unwrap_or_else(|| Position::from_start(self.contents));
        end.span(&end)
    }
}

/// Why `tag` could be out of place in `context`
fn hint_for(tag: Tag, context: Context) -> String {
    match (tag, context) {
        (_, Context::Start) => "a submission starts with EVENT DETAILS".to_string(),
        (_, Context::Finish) => "remove everything after FINISH".to_string(),
        (Tag::Pin1, _) => "PIN1 records go in MATCH RESULTS, OTHER RESULTS or SECTION RESULTS".to_string(),
        (Tag::Pin, _) => "PIN records go in the PLAYER LIST".to_string(),
        (tag, _) if Part::from_tag(tag).is_some() => {
            "parts come in the order EVENT DETAILS, PLAYER LIST, results, FINISH".to_string()
        }
        (Tag::Board, Context::Pin1(_)) => "BOARD only appears in MATCH RESULTS".to_string(),
        (Tag::Round, Context::Pin1(_)) => "ROUND only appears in SECTION RESULTS".to_string(),
        (Tag::TableStart, _) | (Tag::TableEnd, _) => "a table starts with COLUMN fields".to_string(),
        _ => "each field appears at most once per part or record".to_string(),
    }
}
