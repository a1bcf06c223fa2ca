//! Split the contents of a submission file into raw fields

#![allow(clippy::upper_case_acronyms)]

use pest::Parser;
use pest_derive::*;

use crate::load::error;

/// Wrapper around Pest's `Pair`
type Pair<'i> = pest::iterators::Pair<'i, Rule>;

/// Pest-generated parser
#[derive(Parser)]
#[grammar = "load/ecf.pest"]
pub struct EcfParser;

/// The text between two `#`, not yet interpreted
#[derive(Debug, Clone)]
pub struct RawField<'i> {
    pub body: &'i str,
    /// includes the leading `#`
    pub span: pest::Span<'i>,
    /// text before the first `#`
    pub leading: bool,
}

impl<'i> RawField<'i> {
    /// Name and value of a `NAME=value` body, both trimmed
    pub fn split(&self) -> (&'i str, Option<&'i str>) {
        let body = self.body;
        match body.find('=') {
            Some(idx) => (body[..idx].trim(), Some(body[idx + 1..].trim())),
            None => (body.trim(), None),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Byte range in the source text
    pub fn range(&self) -> (usize, usize) {
        (self.span.start(), self.span.end())
    }
}

// extract contents of wrapper rule
macro_rules! subrule {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No subrule"));
        if items.next().is_some() {
            panic!("Several subrules");
        }
        fst
    }};
}

/// Get the fields of file `path`
///
/// The grammar accepts any text, so a failure here can only come from pest
/// itself. It is recorded in `errs` like any other error.
pub fn extract<'i>(path: &'i str, errs: &mut error::Record, contents: &'i str) -> Vec<RawField<'i>> {
    match EcfParser::parse(Rule::submission, contents) {
        Ok(mut pairs) => match pairs.next() {
            Some(submission) => read_fields(submission),
            None => Vec::new(),
        },
        Err(e) => {
            errs.make("Parsing failure").from(e.with_path(path));
            Vec::new()
        }
    }
}

fn read_fields(submission: Pair<'_>) -> Vec<RawField<'_>> {
    let mut fields = Vec::new();
    for pair in submission.into_inner() {
        match pair.as_rule() {
            Rule::leading => fields.push(RawField {
                body: pair.as_str(),
                span: pair.as_span(),
                leading: true,
            }),
            Rule::field => {
                let span = pair.as_span();
                let body = subrule!(pair);
                assert_eq!(body.as_rule(), Rule::body);
                fields.push(RawField {
                    body: body.as_str(),
                    span,
                    leading: false,
                });
            }
            Rule::EOI => break,
            _ => unreachable!(),
        }
    }
    fields
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! lex {
        ( $text:expr ) => {{
            let mut errs = error::Record::new();
            let fields = extract("test.txt", &mut errs, $text);
            assert!(!errs.is_fatal());
            fields
        }};
    }

    #[test]
    fn bodies_between_hashes() {
        let fields = lex!("#EVENT DETAILS\n#EVENT CODE= ABC 123 #\n#FINISH#\n");
        let bodies = fields.iter().map(|f| f.body).collect::<Vec<_>>();
        assert_eq!(bodies, vec!["EVENT DETAILS\n", "EVENT CODE= ABC 123 ", "\n", "FINISH", "\n"]);
        assert_eq!(fields[1].split(), ("EVENT CODE", Some("ABC 123")));
        assert_eq!(fields[0].split(), ("EVENT DETAILS", None));
        assert!(fields[2].is_blank());
        assert_eq!(fields[1].range(), (15, 36));
    }

    #[test]
    fn leading_text() {
        let fields = lex!("Results for the league\n#EVENT DETAILS");
        assert!(fields[0].leading);
        assert_eq!(fields[0].body, "Results for the league\n");
        assert!(!fields[1].leading);
        assert!(lex!("").is_empty());
        assert_eq!(lex!("##").len(), 2);
    }

    #[test]
    fn value_keeps_later_equals() {
        let fields = lex!("#COMMENT=a=b");
        assert_eq!(fields[0].split(), ("COMMENT", Some("a=b")));
    }
}
