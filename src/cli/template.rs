//! Skeleton submission files to fill in

use std::str::FromStr;

use crate::lib::{
    document::{Document, Field, Status},
    tag::{self, Part, Results, Tag},
};

/// Form of the time control, which decides the time limit fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    One,
    Two,
    Three,
    Multi,
}

impl Session {
    fn fields(self) -> &'static [Tag] {
        match self {
            Session::One => tag::ONE_SESSION,
            Session::Two => tag::TWO_SESSION,
            Session::Three => tag::THREE_SESSION,
            Session::Multi => tag::MULTI_SESSION,
        }
    }
}

impl FromStr for Session {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, ()> {
        match s.to_lowercase().as_str() {
            "1" | "one" => Ok(Session::One),
            "2" | "two" => Ok(Session::Two),
            "3" | "three" => Ok(Session::Three),
            "multi" => Ok(Session::Multi),
            _ => Err(()),
        }
    }
}

fn record_fields(kind: Results) -> &'static [Tag] {
    use Tag::*;
    match kind {
        Results::Match => &[Pin1, Board, Score, Pin2],
        Results::Other => &[Pin1, Score, Pin2],
        Results::Section => &[Pin1, Round, Score, Pin2],
    }
}

fn push(doc: &mut Document, tag: Tag) {
    let value = if tag.without_value() || Part::from_tag(tag).is_some() {
        None
    } else {
        Some(String::new())
    };
    let part = doc.current_part();
    doc.push(Field {
        tag: Some(tag),
        name: tag.name().to_string(),
        value,
        status: Status::Ok,
        span: (0, 0),
        part,
    });
}

fn open(doc: &mut Document, part: Part) {
    doc.open_part(part);
    push(doc, part.tag());
}

/// A submission with every mandatory field left blank, one player and
/// one game
pub fn skeleton(session: Session, kind: Results) -> Document {
    let mut doc = Document::new();
    open(&mut doc, Part::EventDetails);
    for tag in tag::MANDATORY_EVENT_FIELDS.iter().chain(session.fields()) {
        push(&mut doc, *tag);
    }
    open(&mut doc, Part::PlayerList);
    doc.count_record();
    for tag in &[Tag::Pin, Tag::Name, Tag::EcfCode] {
        push(&mut doc, *tag);
    }
    open(&mut doc, kind.part());
    doc.count_record();
    for tag in record_fields(kind) {
        push(&mut doc, *tag);
    }
    open(&mut doc, Part::Finish);
    doc
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::load::{error::Record, parse_document};

    #[test]
    fn skeletons_validate() {
        for session in &[Session::One, Session::Two, Session::Three, Session::Multi] {
            for kind in &[Results::Match, Results::Other, Results::Section] {
                let text = skeleton(*session, *kind).to_string();
                let mut errs = Record::new();
                let doc = parse_document("template", &mut errs, &Config::default(), &text, None).unwrap();
                assert_eq!(errs.count_errors() + errs.count_warnings(), 0, "{}\n{}", text, errs);
                assert_eq!(doc.parts().len(), 4);
            }
        }
    }

    #[test]
    fn skeleton_text() {
        let text = skeleton(Session::One, Results::Other).to_string();
        assert!(text.starts_with("#EVENT DETAILS\n#EVENT CODE=\n#SUBMISSION INDEX=\n"));
        assert!(text.ends_with("#MINUTES FOR GAME=\n#PLAYER LIST\n#PIN=#NAME=#ECF CODE=\n#OTHER RESULTS\n#PIN1=#SCORE=#PIN2=\n#FINISH#\n"));
    }

    #[test]
    fn session_names() {
        assert_eq!("multi".parse::<Session>(), Ok(Session::Multi));
        assert_eq!("3".parse::<Session>(), Ok(Session::Three));
        assert!("4".parse::<Session>().is_err());
    }
}
