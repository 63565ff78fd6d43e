use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::result::DocumentResult;

/// Aligned, position-tagged view of a document's matches.
///
/// ```text
/// Fairness means distributive justice.
/// ╰──────╯Fairness @0..8
///                ╰──────────────────╯Distributive Justice @15..35
///                ╰──────────╯Distribution @15..27
///                             ╰─────╯Justice @28..35
/// ```
///
/// Control characters in the text are shown as spaces so every marker line
/// stays aligned with the single text line.
pub struct DocumentResultDisplay<'a> {
    result: &'a DocumentResult,
    text: &'a str,
    show_positions: bool,
}

impl<'a> DocumentResultDisplay<'a> {
    /// `text` must be the text `result` was scanned from; see
    /// [`DocumentResult::check_text`].
    pub fn new(result: &'a DocumentResult, text: &'a str) -> Self {
        DocumentResultDisplay {
            result,
            text,
            show_positions: true,
        }
    }

    /// Takes self
    pub fn without_positions(mut self) -> Self {
        self.show_positions = false;
        self
    }
}

impl<'a> std::fmt::Display for DocumentResultDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // display column of every char boundary, plus one past the end
        let mut opening_line = String::with_capacity(self.text.len());
        let mut columns = Vec::with_capacity(self.text.len() + 1);
        for c in self.text.chars() {
            columns.push(UnicodeWidthStr::width(&*opening_line));
            opening_line.push(if c.is_control() { ' ' } else { c });
        }
        columns.push(UnicodeWidthStr::width(&*opening_line));
        let column = |offset: usize| columns.get(offset).copied().unwrap_or(columns[columns.len() - 1]);

        f.write_str(opening_line.trim_end())?;

        for span in self.result.iter() {
            f.write_char('\n')?;

            let start_col = column(span.start);
            let end_col = column(span.end);
            for _ in 0..start_col {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;
            for _ in (start_col + 1)..end_col.saturating_sub(1) {
                f.write_char('─')?;
            }
            if end_col - start_col > 1 {
                f.write_char('╯')?;
            }

            f.write_str(span.concept())?;
            if self.show_positions {
                write!(f, " @{}..{}", span.start, span.end)?;
            }
        }

        Ok(())
    }
}
