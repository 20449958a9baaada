//! Markdown building blocks for report rendering.

/// Render a markdown table from a header row and data rows.
///
/// Rows shorter than the header are padded with empty cells so the table
/// stays well-formed.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let header_row = format!("| {} |", headers.join(" | "));
    let separator_row = format!("| {} |", headers.iter().map(|_| "---").collect::<Vec<_>>().join(" | "));
    let data_rows = rows
        .iter()
        .map(|row| {
            let mut cells: Vec<&str> = row.iter().map(String::as_str).collect();
            cells.resize(headers.len(), "");
            format!("| {} |", cells.join(" | "))
        })
        .collect::<Vec<_>>()
        .join("\n");

    if data_rows.is_empty() {
        format!("{header_row}\n{separator_row}")
    } else {
        format!("{header_row}\n{separator_row}\n{data_rows}")
    }
}

/// Render a fenced code block with an optional language tag.
pub fn code_block(language: Option<&str>, body: &str) -> String {
    format!("```{}\n{}\n```", language.unwrap_or(""), body.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_renders_header_separator_and_rows() {
        let rendered = format_table(&["key", "value"], &[vec!["name".into(), "demo".into()], vec!["version".into(), "1.0.0".into()]]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "| key | value |");
        assert_eq!(lines[1], "| --- | --- |");
        assert_eq!(lines[2], "| name | demo |");
        assert_eq!(lines[3], "| version | 1.0.0 |");
    }

    #[test]
    fn short_rows_are_padded_to_the_header_width() {
        let rendered = format_table(&["a", "b", "c"], &[vec!["only".into()]]);
        assert!(rendered.ends_with("| only |  |  |"));
    }

    #[test]
    fn empty_tables_render_header_and_separator_only() {
        let rendered = format_table(&["a", "b"], &[]);
        assert_eq!(rendered, "| a | b |\n| --- | --- |");
    }

    #[test]
    fn code_block_trims_trailing_whitespace() {
        assert_eq!(code_block(Some("sh"), "echo hi\n\n"), "```sh\necho hi\n```");
        assert_eq!(code_block(None, "plain"), "```\nplain\n```");
    }
}
