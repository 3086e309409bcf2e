use chrono::NaiveDate;

use super::layout;
use super::values;

/// One data row of an import sheet, cells trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based line in the source file, for log context.
    pub line: usize,
    cells: Vec<String>,
}

impl SheetRow {
    pub fn new<I, S>(line: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            line,
            cells: cells
                .into_iter()
                .map(|c| c.as_ref().trim().to_string())
                .collect(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }

    /// The cell's text, or `None` when empty or past the end of the row.
    pub fn text(&self, col: usize) -> Option<&str> {
        self.cells
            .get(col)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Like `text`, but placeholder names such as "n/a" read as empty.
    pub fn name(&self, col: usize) -> Option<&str> {
        self.text(col).filter(|s| !values::is_placeholder(s))
    }

    pub fn date(&self, col: usize) -> Option<NaiveDate> {
        self.text(col).and_then(values::parse_sheet_date)
    }

    pub fn flag(&self, col: usize) -> bool {
        self.text(col).map(values::is_true).unwrap_or(false)
    }
}

/// Unit and organization inherited from earlier rows of a merged-cell sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarryForward {
    pub unit: Option<String>,
    pub organization: Option<String>,
}

impl CarryForward {
    /// The context in effect for `row`. A new unit clears the organization.
    pub fn advance(self, row: &SheetRow) -> Self {
        let mut next = self;
        if let Some(unit) = row.text(layout::UNIT) {
            next.unit = Some(unit.to_string());
            next.organization = None;
        }
        if let Some(org) = row.text(layout::ORGANIZATION) {
            next.organization = Some(org.to_string());
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> SheetRow {
        SheetRow::new(4, cells.iter().copied())
    }

    #[test]
    fn cells_are_trimmed_and_bounded() {
        let r = row(&["  Twin Falls 1st Ward ", "", "Clerk"]);
        assert_eq!(r.text(0), Some("Twin Falls 1st Ward"));
        assert_eq!(r.text(1), None);
        assert_eq!(r.text(40), None);
    }

    #[test]
    fn whitespace_row_is_blank() {
        assert!(row(&["", "  ", ""]).is_blank());
        assert!(!row(&["", "x"]).is_blank());
    }

    #[test]
    fn placeholder_names_are_empty() {
        let r = row(&["", "", "", "N/A", "", "", "vacant"]);
        assert_eq!(r.name(3), None);
        assert_eq!(r.name(6), None);
        assert_eq!(r.text(3), Some("N/A"));
    }

    #[test]
    fn carry_forward_inherits_blank_cells() {
        let first = CarryForward::default().advance(&row(&["Twin Falls 2nd Ward", "Primary", "President"]));
        let second = first.clone().advance(&row(&["", "", "Secretary"]));
        assert_eq!(second, first);
    }

    #[test]
    fn new_unit_resets_organization() {
        let carry = CarryForward::default()
            .advance(&row(&["Twin Falls 1st Ward", "Primary", "President"]))
            .advance(&row(&["Twin Falls 2nd Ward", "", "Clerk"]));
        assert_eq!(carry.unit.as_deref(), Some("Twin Falls 2nd Ward"));
        assert_eq!(carry.organization, None);
    }
}
