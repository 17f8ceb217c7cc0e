use std::ops::Range;

/// Renders a table of integers with one centered column per name.
///
/// When there are more than `max_entries` rows (and `max_entries` is not negative), only
/// the first and last rows are shown around a `...` line. The first line is never
/// indented, so callers can put it after their own prefix.
pub(crate) fn print_table<N: AsRef<str>>(
    names: &[N],
    count: usize,
    value: impl Fn(usize, usize) -> i32,
    max_entries: isize,
    indent: usize,
) -> String {
    let (before, after): (Range<usize>, Range<usize>) =
        if max_entries < 0 || count <= max_entries as usize {
            (0..count, count..count)
        } else {
            let max_entries = max_entries.max(2) as usize;
            let n_after = max_entries / 2;
            let n_before = max_entries - n_after;
            (0..n_before, (count - n_after)..count)
        };

    let format_rows = |rows: Range<usize>| -> Vec<Vec<String>> {
        rows.map(|i| (0..names.len()).map(|d| value(i, d).to_string()).collect())
            .collect()
    };
    let before = format_rows(before);
    let after = format_rows(after);

    let mut widths: Vec<usize> = names.iter().map(|n| n.as_ref().len() + 2).collect();
    for row in before.iter().chain(&after) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len() + 2);
        }
    }

    let indent = " ".repeat(indent);
    let mut output = String::new();
    push_row(&mut output, names.iter().map(AsRef::as_ref), &widths);
    output.push('\n');

    for row in &before {
        output.push_str(&indent);
        push_row(&mut output, row.iter().map(String::as_str), &widths);
        output.push('\n');
    }

    if !after.is_empty() {
        let mut half = widths.iter().sum::<usize>() / 2;
        if half > 3 {
            half -= 3;
        }
        output.push_str(&indent);
        output.push_str(&" ".repeat(half + 1));
        output.push_str("...\n");

        for row in &after {
            output.push_str(&indent);
            push_row(&mut output, row.iter().map(String::as_str), &widths);
            output.push('\n');
        }
    }

    output.pop();
    output
}

fn push_row<'a>(output: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    for (i, (cell, width)) in cells.zip(widths).enumerate() {
        let delta = width.saturating_sub(cell.len());
        let n_before = delta / 2;
        output.push_str(&" ".repeat(n_before));
        output.push_str(cell);
        // no trailing spaces after the last column
        if i + 1 != widths.len() {
            output.push_str(&" ".repeat(delta - n_before));
        }
    }
}
