use std::borrow::Cow;
use std::fmt::Write as _;

// Numeric cells are right-aligned.
pub fn render_table<H, C>(headers: &[H], rows: &[Vec<C>]) -> String
where
    H: AsRef<str>,
    C: AsRef<str>,
{
    let column_count = headers.len();
    let mut widths = headers
        .iter()
        .map(|h| h.as_ref().chars().count().max(1))
        .collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(sanitize_cell(cell.as_ref()).chars().count());
        }
    }

    let mut output = String::new();
    let header_cells = headers.iter().map(|h| Cow::Borrowed(h.as_ref()));
    let _ = writeln!(output, "{}", format_row(header_cells, &widths, false));
    let separator = widths.iter().map(|w| Cow::Owned("-".repeat(*w)));
    let _ = writeln!(output, "{}", format_row(separator, &widths, false));
    for row in rows {
        let cells = row.iter().map(|cell| sanitize_cell(cell.as_ref()));
        let _ = writeln!(output, "{}", format_row(cells, &widths, true));
    }
    output
}

pub fn print_table<H, C>(headers: &[H], rows: &[Vec<C>])
where
    H: AsRef<str>,
    C: AsRef<str>,
{
    print!("{}", render_table(headers, rows));
}

fn format_row<'a, I>(cells: I, widths: &[usize], align_numbers: bool) -> String
where
    I: Iterator<Item = Cow<'a, str>>,
{
    let mut line = cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| {
            if align_numbers && looks_numeric(&cell) {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn looks_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.parse::<f64>().is_ok()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
