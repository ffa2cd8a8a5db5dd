use std::cmp;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    pub name: &'a str,
    pub align: Align,
}

impl<'a> Column<'a> {
    pub const fn left(name: &'a str) -> Self {
        Self {
            name,
            align: Align::Left,
        }
    }

    pub const fn right(name: &'a str) -> Self {
        Self {
            name,
            align: Align::Right,
        }
    }
}

const INDENT: usize = 2;
const COLUMN_GAP: usize = 2;
const MIN_TABLE_COLUMN_WIDTH: usize = 6;

pub fn terminal_width() -> usize {
    let from_env = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(120);
    cmp::max(from_env, 40)
}

// Widths count chars, which is what `format!` padding counts. Hebrew letters
// are two bytes each, so byte lengths would over-pad every cell.
fn width_of(value: &str) -> usize {
    value.chars().count()
}

pub fn key_value_rows(entries: &[(&str, String)], indent: usize) -> Vec<String> {
    if entries.is_empty() {
        return Vec::new();
    }

    let label_width = entries
        .iter()
        .map(|(label, _)| width_of(label))
        .max()
        .unwrap_or(0);
    let padding = " ".repeat(indent);

    entries
        .iter()
        .map(|(label, value)| format!("{padding}{label:<label_width$}  {value}"))
        .collect()
}

pub fn render_table_or_blocks(
    columns: &[Column<'_>],
    rows: &[Vec<String>],
    max_width: usize,
    block_label: &str,
) -> Vec<String> {
    if columns.is_empty() {
        return Vec::new();
    }

    if should_fallback_to_blocks(columns.len(), max_width) {
        return render_blocks(columns, rows, block_label);
    }

    let natural = natural_column_widths(columns, rows);
    let minimums = columns
        .iter()
        .map(|column| cmp::max(width_of(column.name), MIN_TABLE_COLUMN_WIDTH))
        .collect::<Vec<usize>>();
    let available = max_width.saturating_sub(INDENT);
    let gap_total = COLUMN_GAP * columns.len().saturating_sub(1);
    let budget = available.saturating_sub(gap_total);

    let Some(widths) = fit_widths_to_budget(&natural, &minimums, budget) else {
        return render_blocks(columns, rows, block_label);
    };

    let header = columns
        .iter()
        .map(|column| column.name.to_string())
        .collect::<Vec<String>>();
    let mut output = vec![format_row(columns, &header, &widths)];

    for row in rows {
        let wrapped = wrap_row(row, &widths);
        let max_lines = wrapped.iter().map(Vec::len).max().unwrap_or(1);

        for line_index in 0..max_lines {
            let line_cells = (0..columns.len())
                .map(|column_index| {
                    wrapped
                        .get(column_index)
                        .and_then(|chunks| chunks.get(line_index))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect::<Vec<String>>();
            output.push(format_row(columns, &line_cells, &widths));
        }
    }

    output
}

fn should_fallback_to_blocks(column_count: usize, max_width: usize) -> bool {
    let minimum = INDENT
        + (MIN_TABLE_COLUMN_WIDTH * column_count)
        + (COLUMN_GAP * column_count.saturating_sub(1));
    max_width < minimum
}

fn natural_column_widths(columns: &[Column<'_>], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths = columns
        .iter()
        .map(|column| width_of(column.name))
        .collect::<Vec<usize>>();

    for row in rows {
        for (index, value) in row.iter().enumerate() {
            if let Some(slot) = widths.get_mut(index) {
                *slot = cmp::max(*slot, width_of(value));
            }
        }
    }

    widths
}

fn fit_widths_to_budget(
    natural: &[usize],
    minimums: &[usize],
    budget: usize,
) -> Option<Vec<usize>> {
    if natural.len() != minimums.len() {
        return None;
    }

    if minimums.iter().sum::<usize>() > budget {
        return None;
    }

    let mut widths = natural.to_vec();
    let mut total = widths.iter().sum::<usize>();
    while total > budget {
        // Shrink the widest column first so short columns keep their text.
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(index, width)| **width > minimums.get(*index).copied().unwrap_or(0))
            .max_by_key(|(_, width)| **width)
            .map(|(index, _)| index)?;
        widths[widest] -= 1;
        total -= 1;
    }

    Some(widths)
}

fn wrap_row(row: &[String], widths: &[usize]) -> Vec<Vec<String>> {
    widths
        .iter()
        .enumerate()
        .map(|(index, width)| {
            let value = row.get(index).map(String::as_str).unwrap_or("");
            wrap_text(value, *width)
        })
        .collect()
}

fn format_row(columns: &[Column<'_>], cells: &[String], widths: &[usize]) -> String {
    let pieces = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let width = widths.get(index).copied().unwrap_or(MIN_TABLE_COLUMN_WIDTH);
            let value = cells.get(index).map(String::as_str).unwrap_or("");
            match column.align {
                Align::Left => format!("{value:<width$}"),
                Align::Right => format!("{value:>width$}"),
            }
        })
        .collect::<Vec<String>>();

    format!("{}{}", " ".repeat(INDENT), pieces.join("  ").trim_end())
}

fn wrap_text(value: &str, width: usize) -> Vec<String> {
    if width == 0 || width_of(value) <= width {
        return vec![value.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in value.split_whitespace() {
        if !current.is_empty() && width_of(&current) + 1 + width_of(word) <= width {
            current.push(' ');
            current.push_str(word);
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if width_of(word) <= width {
            current.push_str(word);
        } else {
            lines.extend(split_long_token(word, width));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        return split_long_token(value, width);
    }

    lines
}

fn split_long_token(token: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![token.to_string()];
    }

    let chars = token.chars().collect::<Vec<char>>();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect()
}

fn render_blocks(columns: &[Column<'_>], rows: &[Vec<String>], block_label: &str) -> Vec<String> {
    if rows.is_empty() {
        return Vec::new();
    }

    let labels = columns
        .iter()
        .map(|column| format!("{}:", column.name))
        .collect::<Vec<String>>();
    let label_width = labels.iter().map(|label| width_of(label)).max().unwrap_or(0);

    let mut output = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        output.push(format!("  {block_label} {}:", row_index + 1));

        for (column_index, label) in labels.iter().enumerate() {
            let value = row.get(column_index).cloned().unwrap_or_default();
            output.push(format!("    {label:<label_width$}  {value}"));
        }

        if row_index + 1 < rows.len() {
            output.push(String::new());
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::{
        Column, fit_widths_to_budget, key_value_rows, render_table_or_blocks, split_long_token,
    };

    #[test]
    fn key_value_rows_align_labels() {
        let rows = key_value_rows(
            &[
                ("Rows read:", "100".to_string()),
                ("Rows excluded:", "2".to_string()),
            ],
            2,
        );

        assert_eq!(rows[0], "  Rows read:      100");
        assert_eq!(rows[1], "  Rows excluded:  2");
    }

    #[test]
    fn hebrew_cells_align_by_character_count() {
        let columns = [Column::left("Bucket"), Column::right("Rows")];
        let rows = vec![
            vec!["דורון פלק".to_string(), "12".to_string()],
            vec!["לא מזוהה".to_string(), "3".to_string()],
        ];

        let rendered = render_table_or_blocks(&columns, &rows, 80, "Bucket");
        assert_eq!(rendered[0], "  Bucket     Rows");
        assert_eq!(rendered[1], "  דורון פלק    12");
        assert_eq!(rendered[2], "  לא מזוהה      3");
    }

    #[test]
    fn table_renderer_wraps_without_truncating() {
        let columns = [Column::left("Description"), Column::right("Rows")];
        let rows = vec![vec![
            "ליווי עוסק מורשה חודשי - רו\"ח אילן קאופמן".to_string(),
            "7".to_string(),
        ]];

        let rendered = render_table_or_blocks(&columns, &rows, 30, "Row");
        assert!(rendered[0].contains("Description"));
        assert!(rendered.iter().any(|line| line.contains("קאופמן")));
        assert!(rendered.iter().any(|line| line.contains("ליווי")));
        assert!(rendered.iter().any(|line| line.trim_end().ends_with('7')));
    }

    #[test]
    fn narrow_width_falls_back_to_blocks() {
        let columns = [
            Column::left("Business"),
            Column::left("Person"),
            Column::left("Description"),
        ];
        let rows = vec![vec![
            "I.D Cyber Solutions".to_string(),
            "רון לוי".to_string(),
            "ליווי משפטי".to_string(),
        ]];

        let rendered = render_table_or_blocks(&columns, &rows, 20, "Excluded");
        assert_eq!(rendered[0], "  Excluded 1:");
        assert!(rendered[1].contains("Business:"));
        assert!(rendered[2].contains("Person:"));
        assert!(rendered[3].contains("Description:"));
    }

    #[test]
    fn fit_widths_shrinks_widest_column_first() {
        let fitted = fit_widths_to_budget(&[20, 12], &[8, 10], 25);
        assert_eq!(fitted, Some(vec![13, 12]));

        let impossible = fit_widths_to_budget(&[20, 12], &[8, 10], 17);
        assert_eq!(impossible, None);
    }

    #[test]
    fn split_long_token_counts_characters() {
        let chunks = split_long_token("קאופמן", 4);
        assert_eq!(chunks, vec!["קאופ".to_string(), "מן".to_string()]);
    }
}
