//! Plain-text rendering of matrices (tile grid, rewards, Q-table).

use qlearn_path_core::map::Grid;

/// Formatting options for [`TableStyle::render`].
#[derive(Debug, Clone)]
pub struct TableStyle {
    /// Cell width; `None` sizes cells to the widest value.
    pub pad: Option<usize>,
    pub separator: String,
    /// Digits after the decimal point.
    pub precision: usize,
    pub row_header: bool,
    pub col_header: bool,
}

impl Default for TableStyle {
    fn default() -> Self {
        TableStyle {
            pad: None,
            separator: " ".to_string(),
            precision: 2,
            row_header: true,
            col_header: true,
        }
    }
}

impl TableStyle {
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn headers(mut self, row: bool, col: bool) -> Self {
        self.row_header = row;
        self.col_header = col;
        self
    }

    /// Renders `grid` as text, one line per row, ending with a newline.
    pub fn render(&self, grid: &Grid<f64>) -> String {
        let (rows, cols) = (grid.rows(), grid.cols());
        let prec = self.precision;
        let label_width = if self.col_header {
            digit_count(cols.saturating_sub(1))
        } else {
            0
        };
        let pad = self.pad.unwrap_or_else(|| {
            grid.iter()
                .map(|v| format!("{v:.prec$}").len())
                .fold(label_width, usize::max)
        });
        let row_label_width = digit_count(rows.saturating_sub(1));
        let row_prefix_width = if self.row_header {
            row_label_width + 2
        } else {
            0
        };

        let mut lines = Vec::with_capacity(rows + 2);
        if self.col_header {
            let labels: Vec<String> = (0..cols).map(|c| format!("{c:>pad$}")).collect();
            let numbers = format!(
                "{}{}",
                " ".repeat(row_prefix_width),
                labels.join(&self.separator)
            );
            // The divider runs under the row labels too.
            let divider = "-".repeat(numbers.len());
            lines.push(numbers);
            lines.push(divider);
        }
        for r in 0..rows {
            let cells: Vec<String> = grid
                .row(r)
                .iter()
                .map(|v| format!("{v:>pad$.prec$}"))
                .collect();
            let body = cells.join(&self.separator);
            if self.row_header {
                lines.push(format!("{r:>row_label_width$} |{body}"));
            } else {
                lines.push(body);
            }
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

fn digit_count(n: usize) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}
