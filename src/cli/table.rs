//! Box-drawn summary of the parts of a submission

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;

use crate::lib::document::{Document, Field};

pub struct Table<'d> {
    doc: &'d Document,
    title: Option<String>,
}

/// Columns of the summary, in display order
#[derive(Debug, Clone, Copy, FromPrimitive)]
enum Column {
    Records,
    Fields,
    Errors,
}

impl Column {
    const COUNT: usize = 3;

    fn count<'f>(self, fields: impl Iterator<Item = &'f Field>, records: usize) -> usize {
        match self {
            Column::Records => records,
            Column::Fields => fields.count(),
            Column::Errors => fields.filter(|f| f.status.is_error()).count(),
        }
    }
}

struct BoxFmt {
    width: usize,
    text: String,
}

struct ColFmt {
    width: usize,
    label: BoxFmt,
    boxes: Vec<BoxFmt>,
}

struct GridFmt {
    title: Option<BoxFmt>,
    labels: ColFmt,
    columns: Vec<ColFmt>,
}

impl<'d> Table<'d> {
    pub fn from(doc: &'d Document) -> Self {
        Self { doc, title: None }
    }

    pub fn with_title<S>(mut self, title: S) -> Self
    where
        S: ToString,
    {
        self.title = Some(title.to_string());
        self
    }

    fn to_formatter(&self) -> GridFmt {
        let columns = (0..Column::COUNT)
            .filter_map(Column::from_usize)
            .collect::<Vec<_>>();
        let cols = columns
            .iter()
            .map(|c| ColFmt::with_label(BoxFmt::from(format!("{:?}", c))))
            .collect::<Vec<_>>();
        let mut grid = GridFmt::with_columns(cols);
        grid.title = self.title.clone().map(BoxFmt::from);
        // text before EVENT DETAILS belongs to no part
        let outside = self.doc.fields().iter().filter(|f| f.part.is_none());
        if outside.clone().next().is_some() {
            grid.push_line(
                BoxFmt::from(String::from("(no part)")),
                columns
                    .iter()
                    .map(|c| BoxFmt::count(c.count(outside.clone(), 0)))
                    .collect(),
            );
        }
        for (idx, info) in self.doc.parts().iter().enumerate() {
            grid.push_line(
                BoxFmt::from(info.to_string()),
                columns
                    .iter()
                    .map(|c| BoxFmt::count(c.count(self.doc.part_fields(idx), info.records)))
                    .collect(),
            );
        }
        grid
    }
}

impl BoxFmt {
    fn from(text: String) -> Self {
        let width = text.chars().count();
        Self { text, width }
    }

    fn count(n: usize) -> Self {
        if n > 0 {
            Self::from(n.to_string())
        } else {
            Self::from(String::new())
        }
    }
}

impl ColFmt {
    fn with_label(label: BoxFmt) -> Self {
        Self {
            width: label.width,
            label,
            boxes: Vec::new(),
        }
    }

    fn push(&mut self, b: BoxFmt) {
        self.width = self.width.max(b.width);
        self.boxes.push(b);
    }
}

impl GridFmt {
    fn with_columns(columns: Vec<ColFmt>) -> Self {
        Self {
            title: None,
            labels: ColFmt::with_label(BoxFmt::from(String::new())),
            columns,
        }
    }

    fn push_line(&mut self, label: BoxFmt, boxes: Vec<BoxFmt>) {
        self.labels.push(label);
        for (i, b) in boxes.into_iter().enumerate() {
            self.columns[i].push(b);
        }
    }
}

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_formatter())
    }
}

impl fmt::Display for GridFmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(title) = &self.title {
            writeln!(f, " {}", title.text)?;
        }
        // upper border
        write!(f, "{}", ULCORNER)?;
        self.labels.hline(f)?;
        for c in &self.columns {
            write!(f, "{}", LOJOIN)?;
            c.hline(f)?;
        }
        writeln!(f, "{}", URCORNER)?;
        // title line
        write!(f, "{}", VLINE)?;
        self.labels.write_label(f)?;
        for c in &self.columns {
            write!(f, "{}", VLINE)?;
            c.write_label(f)?;
        }
        writeln!(f, "{}", VLINE)?;
        // separator
        write!(f, "{}", RTJOIN)?;
        self.labels.hline(f)?;
        for c in &self.columns {
            write!(f, "{}", CROSS)?;
            c.hline(f)?;
        }
        writeln!(f, "{}", LTJOIN)?;

        // main block
        for idx in 0..self.labels.len() {
            write!(f, "{}", VLINE)?;
            self.labels.write_item(f, idx, false)?;
            for c in &self.columns {
                write!(f, "{}", VLINE)?;
                c.write_item(f, idx, true)?;
            }
            writeln!(f, "{}", VLINE)?;
        }
        // lower border
        write!(f, "{}", DLCORNER)?;
        self.labels.hline(f)?;
        for c in &self.columns {
            write!(f, "{}", HIJOIN)?;
            c.hline(f)?;
        }
        writeln!(f, "{}", DRCORNER)?;
        Ok(())
    }
}

impl ColFmt {
    fn write_label(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.label.write(f, self.width, true)
    }

    fn write_item(&self, f: &mut fmt::Formatter, idx: usize, right: bool) -> fmt::Result {
        self.boxes[idx].write(f, self.width, right)
    }

    fn len(&self) -> usize {
        self.boxes.len()
    }

    fn hline(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", HLINE.repeat(self.width + 2))
    }
}

const HLINE: &str = "─";
const VLINE: &str = "│";
const ULCORNER: &str = "┌";
const URCORNER: &str = "┐";
const DLCORNER: &str = "└";
const DRCORNER: &str = "┘";
const LTJOIN: &str = "┤";
const RTJOIN: &str = "├";
const HIJOIN: &str = "┴";
const LOJOIN: &str = "┬";
const CROSS: &str = "┼";

impl BoxFmt {
    fn write(&self, f: &mut fmt::Formatter, width: usize, right: bool) -> fmt::Result {
        let pad = " ".repeat(width.saturating_sub(self.width));
        if right {
            write!(f, " {}{} ", pad, self.text)
        } else {
            write!(f, " {}{} ", self.text, pad)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::load::{error::Record, parse_document};

    #[test]
    fn one_row_per_part() {
        let text = "#EVENT DETAILS#EVENT CODE=A#BOARD=1
#PLAYER LIST#PIN=1#NAME=Smith, J#ECF CODE=123456A
#OTHER RESULTS#PIN1=1#PIN2=1#SCORE=55
#OTHER RESULTS
#FINISH#";
        let mut errs = Record::new();
        let doc = parse_document("test.txt", &mut errs, &Config::default(), text, None).unwrap();
        let table = Table::from(&doc).with_title("test.txt").to_string();
        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], " test.txt");
        assert_eq!(lines[1], "┌─────────────────┬─────────┬────────┬────────┐");
        assert_eq!(lines[2], "│                 │ Records │ Fields │ Errors │");
        assert_eq!(lines[4], "│ EVENT DETAILS   │         │      3 │      1 │");
        assert_eq!(lines[5], "│ PLAYER LIST     │       1 │      4 │        │");
        assert_eq!(lines[6], "│ OTHER RESULTS 1 │       1 │      4 │        │");
        assert_eq!(lines[7], "│ OTHER RESULTS 2 │         │      1 │        │");
        assert_eq!(lines.len(), 10);
    }
}
