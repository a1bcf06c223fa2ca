//! The `#COLUMN=..#TABLE START#..#TABLE END#` construct
//!
//! A table stands for a run of PIN records in the player list, or PIN1
//! records in a results part. Values fill the columns row by row, so
//! `#COLUMN=PIN#COLUMN=NAME#TABLE START#1#Smith, J#2#Jones, K#TABLE END#`
//! is the same as `#PIN=1#NAME=Smith, J#PIN=2#NAME=Jones, K#`.

use std::collections::HashSet;

use crate::lib::{
    expected::Context,
    tag::{self, Part, Results, Tag},
};

/// Reasons a table cannot be converted to records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// a field other than COLUMN interrupted the column definitions
    Broken,
    /// not a record field of the part, or already a column
    BadColumn(String),
    NoColumns,
    /// no PIN or PIN1 column to start each record
    NoKeyColumn(Tag),
    NoValues,
    /// value count is not a multiple of the column count
    Ragged { values: usize, columns: usize },
    /// text ended before TABLE END
    Unterminated,
}

impl Layout {
    pub fn describe(&self) -> String {
        match self {
            Layout::Broken => "Column definitions were interrupted by another field".to_string(),
            Layout::BadColumn(name) => {
                format!("Column '{}' is not a record field of this part, or is repeated", name)
            }
            Layout::NoColumns => "No COLUMN field precedes TABLE START".to_string(),
            Layout::NoKeyColumn(tag) => format!("No column is named {}", tag),
            Layout::NoValues => "The table holds no values".to_string(),
            Layout::Ragged { values, columns } => format!(
                "{} value{} do not fill rows of {} column{}",
                values,
                if *values == 1 { "" } else { "s" },
                columns,
                if *columns == 1 { "" } else { "s" },
            ),
            Layout::Unterminated => "The table has no TABLE END".to_string(),
        }
    }
}

/// One value of a converted table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell<'i> {
    pub tag: Tag,
    pub value: &'i str,
    /// byte range of the value field in the source text
    pub span: (usize, usize),
}

#[derive(Debug)]
pub struct Table<'i> {
    /// PIN or PIN1
    key: Tag,
    part: Part,
    allowed: HashSet<Tag>,
    /// column names as typed, with the field they name if valid
    headers: Vec<(Option<Tag>, &'i str)>,
    columns: Vec<Tag>,
    values: Vec<(&'i str, (usize, usize))>,
    broken: bool,
    started: bool,
    ended: bool,
}

impl<'i> Table<'i> {
    /// A table replacing the records of the part `context` is in
    ///
    /// `None` if the context holds no records.
    pub fn for_context(context: Context) -> Option<Self> {
        let (key, part, allowed) = match context {
            Context::PlayerList | Context::Pin => (Tag::Pin, Part::PlayerList, tag::FIELDS_IN_PLAYERS),
            Context::Results(kind) | Context::Pin1(kind) => (Tag::Pin1, kind.part(), kind.record_fields()),
            _ => return None,
        };
        Some(Self {
            key,
            part,
            allowed: allowed.iter().copied().collect(),
            headers: Vec::new(),
            columns: Vec::new(),
            values: Vec::new(),
            broken: false,
            started: false,
            ended: false,
        })
    }

    pub fn part(&self) -> Part {
        self.part
    }

    /// Context in force once the table is over
    pub fn part_context(&self) -> Context {
        match Results::from_part(self.part) {
            Some(kind) => Context::Results(kind),
            None => Context::PlayerList,
        }
    }

    /// Define the next column, `false` if `name` is not a field allowed
    /// here or already has a column
    pub fn add_column(&mut self, name: &'i str) -> bool {
        let tag = name.parse::<Tag>().ok().filter(|tag| self.allowed.remove(tag));
        self.headers.push((tag, name.trim()));
        match tag {
            Some(tag) => {
                self.columns.push(tag);
                true
            }
            None => false,
        }
    }

    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn end(&mut self) {
        self.ended = true;
    }

    /// Line breaks around a value only serve to lay the table out
    pub fn add_value(&mut self, value: &'i str, span: (usize, usize)) {
        self.values.push((value.trim_matches(&['\n', '\r'][..]), span));
    }

    pub fn set_broken(&mut self) {
        self.broken = true;
    }

    pub fn check_layout(&self) -> Result<(), Layout> {
        if self.broken {
            return Err(Layout::Broken);
        }
        if !self.ended {
            return Err(Layout::Unterminated);
        }
        if let Some((_, name)) = self.headers.iter().find(|(tag, _)| tag.is_none()) {
            return Err(Layout::BadColumn(name.to_string()));
        }
        if self.columns.is_empty() {
            Err(Layout::NoColumns)
        } else if !self.columns.contains(&self.key) {
            Err(Layout::NoKeyColumn(self.key))
        } else if self.values.is_empty() {
            Err(Layout::NoValues)
        } else if self.values.len() % self.columns.len() != 0 {
            Err(Layout::Ragged {
                values: self.values.len(),
                columns: self.columns.len(),
            })
        } else {
            Ok(())
        }
    }

    /// Rows as records, the PIN or PIN1 cell first
    ///
    /// Only meaningful when `check_layout` succeeds.
    pub fn records(&self) -> Vec<Vec<Cell<'i>>> {
        let width = self.columns.len().max(1);
        self.values
            .chunks(width)
            .map(|row| {
                let mut record = self
                    .columns
                    .iter()
                    .zip(row.iter())
                    .map(|(tag, &(value, span))| Cell {
                        tag: *tag,
                        value: value.trim(),
                        span,
                    })
                    .collect::<Vec<_>>();
                if let Some(idx) = record.iter().position(|cell| cell.tag == self.key) {
                    let key = record.remove(idx);
                    record.insert(0, key);
                }
                record
            })
            .collect()
    }

    /// The table as written, for tables that cannot be converted
    ///
    /// Items are (field, value): `None` as field is a row of `#`-joined values.
    pub fn verbatim(&self) -> Vec<(Option<Tag>, Option<String>)> {
        let mut items = self
            .headers
            .iter()
            .map(|(tag, name)| {
                let name = tag.map(|t| t.name()).unwrap_or(*name);
                (Some(Tag::Column), Some(name.to_string()))
            })
            .collect::<Vec<_>>();
        if self.started {
            items.push((Some(Tag::TableStart), None));
            let width = self.columns.len().max(1);
            for row in self.values.chunks(width) {
                let row = row.iter().map(|(value, _)| *value).collect::<Vec<_>>();
                items.push((None, Some(row.join("#"))));
            }
            if self.ended {
                items.push((Some(Tag::TableEnd), None));
            }
        }
        items
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn players(columns: &[&'static str], values: &[&'static str]) -> Table<'static> {
        let mut table = Table::for_context(Context::PlayerList).unwrap();
        for col in columns {
            table.add_column(col);
        }
        table.start();
        for (i, v) in values.iter().enumerate() {
            table.add_value(v, (i, i + 1));
        }
        table.end();
        table
    }

    #[test]
    fn context_decides_key() {
        assert!(Table::for_context(Context::EventDetails).is_none());
        assert!(Table::for_context(Context::Columns).is_none());
        let t = Table::for_context(Context::Pin1(Results::Section)).unwrap();
        assert_eq!(t.part(), Part::SectionResults);
        assert_eq!(t.part_context(), Context::Results(Results::Section));
        let t = Table::for_context(Context::Pin).unwrap();
        assert_eq!(t.part_context(), Context::PlayerList);
    }

    #[test]
    fn columns_are_restricted() {
        let mut t = Table::for_context(Context::Results(Results::Other)).unwrap();
        assert!(t.add_column("PIN1"));
        assert!(!t.add_column("pin 1"));
        assert!(!t.add_column("BOARD"));
        assert!(!t.add_column("NAME"));
        assert!(t.add_column("score"));
        t.start();
        t.end();
        assert_eq!(t.check_layout(), Err(Layout::BadColumn("pin 1".to_string())));
    }

    #[test]
    fn rows_become_records() {
        let t = players(&["NAME", "PIN"], &["Smith, J", "1", "\nJones, K", "2\n"]);
        assert_eq!(t.check_layout(), Ok(()));
        let records = t.records();
        let fields = records
            .iter()
            .map(|r| r.iter().map(|c| (c.tag, c.value)).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(
            fields,
            vec![
                vec![(Tag::Pin, "1"), (Tag::Name, "Smith, J")],
                vec![(Tag::Pin, "2"), (Tag::Name, "Jones, K")],
            ]
        );
        assert_eq!(records[1][0].span, (3, 4));
    }

    #[test]
    fn empty_cells_are_values() {
        let t = players(&["PIN", "NAME", "ECF CODE"], &["1", "Smith, J", "", "2", "Jones, K", "123456A"]);
        assert_eq!(t.check_layout(), Ok(()));
        assert_eq!(t.records()[0][2].value, "");
    }

    #[test]
    fn bad_layouts() {
        let t = players(&["PIN", "Name"], &["1", "Smith, J", "2"]);
        assert_eq!(t.check_layout(), Err(Layout::Ragged { values: 3, columns: 2 }));
        assert_eq!(
            t.verbatim(),
            vec![
                (Some(Tag::Column), Some("PIN".to_string())),
                (Some(Tag::Column), Some("NAME".to_string())),
                (Some(Tag::TableStart), None),
                (None, Some("1#Smith, J".to_string())),
                (None, Some("2".to_string())),
                (Some(Tag::TableEnd), None),
            ]
        );
        let t = players(&["NAME"], &["Smith, J"]);
        assert_eq!(t.check_layout(), Err(Layout::NoKeyColumn(Tag::Pin)));
        let t = players(&[], &[]);
        assert_eq!(t.check_layout(), Err(Layout::NoColumns));
        let t = players(&["PIN"], &[]);
        assert_eq!(t.check_layout(), Err(Layout::NoValues));
        let mut t = players(&["PIN"], &["1"]);
        t.set_broken();
        assert_eq!(t.check_layout(), Err(Layout::Broken));
        let mut t = Table::for_context(Context::Pin).unwrap();
        t.add_column("PIN");
        t.start();
        t.add_value("1", (0, 1));
        assert_eq!(t.check_layout(), Err(Layout::Unterminated));
        assert_eq!(t.verbatim().len(), 3);
    }
}
