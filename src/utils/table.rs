// Column-aligned plain text tables for CLI output

/// A value that can be printed as one row of a table.
pub trait TableRow {
    fn headers() -> Vec<&'static str>;
    fn cells(&self) -> Vec<String>;
}

/// Renders rows under their headers, columns padded to the widest cell.
///
/// Returns an empty string when there are no rows.
pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_line = |cells: Vec<String>| -> String {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ");
        line.trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&format_line(headers.iter().map(|h| h.to_string()).collect()));
    out.push('\n');
    out.push_str(&format_line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    out.push('\n');
    for row in rows {
        let padded: Vec<String> = (0..headers.len())
            .map(|i| row.get(i).cloned().unwrap_or_default())
            .collect();
        out.push_str(&format_line(padded));
        out.push('\n');
    }
    out
}

pub fn render_rows<T: TableRow>(rows: &[T]) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(|row| row.cells()).collect();
    render(&T::headers(), &cells)
}

pub fn print_rows<T: TableRow>(rows: &[T]) {
    let rendered = render_rows(rows);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
}

/// Empty cell for `None`.
pub fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}
