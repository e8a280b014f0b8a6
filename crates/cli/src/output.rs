//! Plain-text tables on stdout

use nanostore_core::Row;
use nanostore_core::format::value_text;
use std::fmt::Write as _;

fn push_line<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    let rendered: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", rendered.join("  ").trim_end());
}

/// Render rows under headers with columns padded to their widest cell
pub fn render_table<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.as_ref().chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &widths, headers.iter().map(|h| h.as_ref()));
    let rule: Vec<String> = widths.iter().map(|&width| "-".repeat(width)).collect();
    push_line(&mut out, &widths, rule.iter().map(String::as_str));
    for row in rows {
        push_line(&mut out, &widths, row.iter().map(String::as_str));
    }
    out
}

pub fn print_table<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

/// Untyped rows as a table, one column per key seen in any row
pub fn rows_table(rows: &[Row]) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    let cells = rows
        .iter()
        .map(|row| headers.iter().map(|key| value_text(row.get(key))).collect())
        .collect();
    (headers, cells)
}

pub fn print_rows(rows: &[Row]) {
    let (headers, cells) = rows_table(rows);
    print_table(&headers, &cells);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_pad_to_widest_cell() {
        let table = render_table(
            &["Rack", "Occupied"],
            &[
                vec!["R1".to_string(), "12".to_string()],
                vec!["R10-long".to_string(), "3".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Rack      Occupied");
        assert_eq!(lines[1], "--------  --------");
        assert_eq!(lines[2], "R1        12");
        assert_eq!(lines[3], "R10-long  3");
    }

    #[test]
    fn test_rows_table_unions_keys() {
        let rows: Vec<Row> = serde_json::from_value(serde_json::json!([
            {"task_id": "T-1", "task_status": "failed"},
            {"task_id": "T-2", "tray_id": null, "station": "S1"}
        ]))
        .unwrap();
        let (headers, cells) = rows_table(&rows);
        assert_eq!(headers.len(), 4);
        assert!(headers.contains(&"station".to_string()));
        let station = headers.iter().position(|h| h == "station").unwrap();
        let tray = headers.iter().position(|h| h == "tray_id").unwrap();
        assert_eq!(cells[0][station], "N/A");
        assert_eq!(cells[1][station], "S1");
        assert_eq!(cells[1][tray], "N/A");
    }

    #[test]
    fn test_headers_only() {
        let table = render_table(&["Task"], &[]);
        assert_eq!(table, "Task\n----\n");
    }
}
