//! A validated submission: its fields, their status and the parts they form
//!
//! `Display` writes the canonical text of the submission: one line per part
//! or record, field names spelled as in the ECF field definitions.

use std::fmt;

use crate::lib::tag::{Part, Tag};

/// Verdict of the validator on a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    /// name is not a field of the submission format
    Unknown,
    /// known field out of place
    Unexpected,
    /// part of a table that cannot be read as records
    Layout,
}

impl Status {
    pub fn is_error(self) -> bool {
        self != Status::Ok
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    /// `None` for unknown names and rows of a broken table
    pub tag: Option<Tag>,
    /// name as displayed: canonical for known fields, as typed otherwise
    pub name: String,
    pub value: Option<String>,
    pub status: Status,
    /// byte range in the source text
    pub span: (usize, usize),
    /// index in `Document::parts`
    pub part: Option<usize>,
}

impl Field {
    pub fn is(&self, tag: Tag) -> bool {
        self.tag == Some(tag)
    }

    fn starts_line(&self) -> bool {
        match self.tag {
            Some(tag) => tag.starts_line(),
            None => self.name.is_empty(),
        }
    }
}

/// One occurrence of a part in the submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartInfo {
    pub part: Part,
    /// 1 for the first MATCH RESULTS, 2 for the second, ...
    pub ordinal: usize,
    pub records: usize,
}

impl fmt::Display for PartInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.part {
            Part::MatchResults | Part::OtherResults | Part::SectionResults => {
                write!(f, "{} {}", self.part, self.ordinal)
            }
            _ => write!(f, "{}", self.part),
        }
    }
}

#[derive(Debug, Default)]
pub struct Document {
    fields: Vec<Field>,
    parts: Vec<PartInfo>,
    /// validation stopped at a requested part rather than at end of text
    stopped_at: Option<Part>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn parts(&self) -> &[PartInfo] {
        &self.parts
    }

    pub fn stopped_at(&self) -> Option<Part> {
        self.stopped_at
    }

    pub fn set_stopped_at(&mut self, part: Part) {
        self.stopped_at = Some(part);
    }

    /// Index of the part new fields belong to
    pub fn current_part(&self) -> Option<usize> {
        self.parts.len().checked_sub(1)
    }

    /// Start a new part, returning its index
    pub fn open_part(&mut self, part: Part) -> usize {
        let ordinal = 1 + self.parts.iter().filter(|p| p.part == part).count();
        self.parts.push(PartInfo {
            part,
            ordinal,
            records: 0,
        });
        self.parts.len() - 1
    }

    pub fn count_record(&mut self) {
        if let Some(info) = self.parts.last_mut() {
            info.records += 1;
        }
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// All fields were accepted
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|f| !f.status.is_error())
    }

    pub fn count_errors(&self) -> usize {
        self.fields.iter().filter(|f| f.status.is_error()).count()
    }

    /// Fields of the part with index `idx`
    pub fn part_fields(&self, idx: usize) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.part == Some(idx))
    }

    /// Values of every accepted field named `tag`
    pub fn values_of(&self, tag: Tag) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(move |f| f.is(tag) && f.status == Status::Ok)
            .filter_map(|f| f.value.as_deref())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return Ok(());
        }
        for (idx, field) in self.fields.iter().enumerate() {
            if idx > 0 && field.starts_line() {
                writeln!(f)?;
            }
            write!(f, "#{}", field.name)?;
            if let Some(value) = &field.value {
                if field.name.is_empty() {
                    write!(f, "{}", value)?;
                } else {
                    write!(f, "={}", value)?;
                }
            }
        }
        match self.fields.last() {
            // a closing '#' would read back as one more table value
            Some(last) if last.tag.is_none() && last.name.is_empty() => writeln!(f),
            _ => writeln!(f, "#"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn field(tag: Tag, value: Option<&str>) -> Field {
        Field {
            tag: Some(tag),
            name: tag.name().to_string(),
            value: value.map(String::from),
            status: Status::Ok,
            span: (0, 0),
            part: None,
        }
    }

    #[test]
    fn parts_are_numbered_by_kind() {
        let mut doc = Document::new();
        assert_eq!(doc.current_part(), None);
        doc.open_part(Part::EventDetails);
        doc.open_part(Part::MatchResults);
        doc.count_record();
        doc.count_record();
        doc.open_part(Part::OtherResults);
        assert_eq!(doc.open_part(Part::MatchResults), 3);
        let names = doc.parts().iter().map(|p| p.to_string()).collect::<Vec<_>>();
        assert_eq!(names, vec!["EVENT DETAILS", "MATCH RESULTS 1", "OTHER RESULTS 1", "MATCH RESULTS 2"]);
        assert_eq!(doc.parts()[1].records, 2);
    }

    #[test]
    fn canonical_text() {
        let mut doc = Document::new();
        doc.push(field(Tag::EventDetails, None));
        doc.push(field(Tag::EventCode, Some("ABC")));
        doc.push(field(Tag::PlayerList, None));
        doc.push(field(Tag::Pin, Some("1")));
        doc.push(field(Tag::Name, Some("Smith, J")));
        doc.push(Field {
            tag: None,
            name: "CLUBB".to_string(),
            value: Some("x".to_string()),
            status: Status::Unknown,
            span: (0, 0),
            part: None,
        });
        doc.push(Field {
            tag: None,
            name: String::new(),
            value: Some("2#Jones".to_string()),
            status: Status::Layout,
            span: (0, 0),
            part: None,
        });
        doc.push(field(Tag::Finish, None));
        assert_eq!(
            doc.to_string(),
            "#EVENT DETAILS\n#EVENT CODE=ABC\n#PLAYER LIST\n#PIN=1#NAME=Smith, J#CLUBB=x\n#2#Jones\n#FINISH#\n"
        );
        assert!(!doc.is_valid());
        doc.fields.pop();
        assert!(doc.to_string().ends_with("#CLUBB=x\n#2#Jones\n"));
        assert_eq!(doc.count_errors(), 2);
        assert_eq!(doc.values_of(Tag::Name).collect::<Vec<_>>(), vec!["Smith, J"]);
    }
}
