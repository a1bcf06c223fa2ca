pub mod check;
pub mod error;
pub mod parse;
pub mod validate;

use tracing::info;

use crate::config::Config;
use crate::lib::{document::Document, tag::Part};

/// Read, lex and validate the submission in `filename`
///
/// As with `parse_document`, success is told by `errs` rather than by
/// the return value.
pub fn read_document(filename: &str, errs: &mut error::Record, config: &Config, stop_at: Option<Part>) -> Option<Document> {
    let bytes = match std::fs::read(filename) {
        Ok(bytes) => bytes,
        Err(e) => {
            errs.make("File not found")
                .text(format!("Could not read '{}': {}", filename, e))
                .hint("check the path of the submission file");
            return None;
        }
    };
    let contents = match String::from_utf8(bytes) {
        Ok(contents) => contents,
        Err(e) => {
            errs.make("Not UTF-8")
                .nonfatal()
                .text(format!("'{}' is not valid UTF-8, it was read as Latin-1", filename))
                .hint("save the file as UTF-8 if accented names look wrong");
            latin1(e.as_bytes())
        }
    };
    info!(file = filename, bytes = contents.len(), "loaded submission");
    parse_document(filename, errs, config, &contents, stop_at)
}

/// Validate `contents`, the text of file `path`
///
/// The document is returned even if fatal errors were found: it keeps the
/// fields in error with their status. It is `None` only when `contents`
/// is not a submission at all.
pub fn parse_document(
    path: &str,
    errs: &mut error::Record,
    config: &Config,
    contents: &str,
    stop_at: Option<Part>,
) -> Option<Document> {
    let fields = parse::extract(path, errs, contents);
    let doc = validate::validate(path, errs, config, contents, &fields, stop_at)?;
    if config.check_values {
        check::check_values(path, errs, config, contents, &doc);
    }
    Some(doc)
}

/// Every byte is the code point of the same value
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    const SUBMISSION: &[u8] = b"#EVENT DETAILS
#EVENT CODE=ABC123#SUBMISSION INDEX=1#EVENT NAME=Anytown League
#EVENT DATE=01/09/2021#FINAL RESULT DATE=30/06/2022
#RESULTS OFFICER=J Smith#RESULTS OFFICER ADDRESS=Anytown
#TREASURER=K Jones#TREASURER ADDRESS=Anytown
#MINUTES FOR GAME=90
#PLAYER LIST
#PIN=1#NAME=M\xfcller, Hans#ECF CODE=123456A
#PIN=2#NAME=Jones, Kate#ECF CODE=234567B
#OTHER RESULTS
#PIN1=1#PIN2=2#SCORE=1-0
#FINISH#
";

    #[test]
    fn latin1_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SUBMISSION).unwrap();
        let path = file.path().to_str().unwrap();
        let mut errs = error::Record::new();
        let doc = read_document(path, &mut errs, &Config::default(), None).unwrap();
        assert!(!errs.is_fatal(), "{}", errs);
        let labels = errs.errors().map(|e| e.label()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["Not UTF-8", "Invalid value"]);
        assert_eq!(doc.values_of(crate::lib::tag::Tag::Name).next(), Some("Müller, Hans"));
    }

    #[test]
    fn values_unchecked_on_request() {
        let text = String::from_utf8_lossy(SUBMISSION).replace("M\u{fffd}ller", "Muller");
        let config = Config {
            check_values: false,
            ..Config::default()
        };
        let mut errs = error::Record::new();
        let doc = parse_document("test.txt", &mut errs, &config, &text, None);
        assert!(doc.is_some());
        assert_eq!(errs.count_warnings(), 0);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.txt");
        let mut errs = error::Record::new();
        assert!(read_document(path.to_str().unwrap(), &mut errs, &Config::default(), None).is_none());
        assert!(errs.is_fatal());
    }
}
