use crate::error::{AppError, AppResult};

/// Insert a table row right after the opening `<tbody>` of the first table.
pub fn prepend_row_after_tbody(body: &str, row: &str) -> AppResult<String> {
    splice_after(body, "<tbody>", row)
}

/// Insert a table row right after the header row of the first table.
pub fn insert_row_after_header(body: &str, row: &str) -> AppResult<String> {
    splice_after(body, "</tr>", row)
}

/// Append a table row at the bottom of the first table.
pub fn append_row_to_first_table(body: &str, row: &str) -> AppResult<String> {
    let position = body
        .find("</table>")
        .ok_or_else(|| AppError::Template("no table in page body".to_string()))?;
    let mut spliced = String::with_capacity(body.len() + row.len());
    spliced.push_str(&body[..position]);
    spliced.push_str(row);
    spliced.push_str(&body[position..]);
    Ok(spliced)
}

fn splice_after(body: &str, marker: &str, row: &str) -> AppResult<String> {
    let position = body
        .find(marker)
        .ok_or_else(|| AppError::Template(format!("no {marker} in page body")))?
        + marker.len();
    let mut spliced = String::with_capacity(body.len() + row.len());
    spliced.push_str(&body[..position]);
    spliced.push_str(row);
    spliced.push_str(&body[position..]);
    Ok(spliced)
}

/// Confluence storage-format link to an attachment of the current page.
pub fn attachment_link(file_name: &str, label: &str) -> String {
    format!(
        concat!(
            r#"<ac:link><ri:attachment ri:filename="{file}"/>"#,
            r#"<ac:plain-text-link-body><![CDATA[{label}]]></ac:plain-text-link-body>"#,
            "</ac:link>"
        ),
        file = file_name,
        label = label
    )
}

/// Amounts are printed the Italian way, with a comma before the cents.
pub fn format_euro_amount(amount: f64) -> String {
    format!("{amount:.2}").replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepends_right_after_the_tbody() {
        let body = "<table><tbody><tr><td>old</td></tr></tbody></table>";
        let spliced = prepend_row_after_tbody(body, "<tr><td>new</td></tr>").unwrap();
        assert_eq!(
            spliced,
            "<table><tbody><tr><td>new</td></tr><tr><td>old</td></tr></tbody></table>"
        );
    }

    #[test]
    fn inserts_after_the_header_row() {
        let body = "<table><tbody><tr><th>h</th></tr><tr><td>old</td></tr></tbody></table>";
        let spliced = insert_row_after_header(body, "<tr><td>new</td></tr>").unwrap();
        assert_eq!(
            spliced,
            "<table><tbody><tr><th>h</th></tr><tr><td>new</td></tr><tr><td>old</td></tr></tbody></table>"
        );
    }

    #[test]
    fn appends_before_the_table_end() {
        let body = "<table><tbody><tr><td>old</td></tr></tbody></table><p>after</p>";
        let spliced = append_row_to_first_table(body, "<tr><td>new</td></tr>").unwrap();
        assert_eq!(
            spliced,
            "<table><tbody><tr><td>old</td></tr></tbody><tr><td>new</td></tr></table><p>after</p>"
        );
    }

    #[test]
    fn complains_when_the_page_has_no_table() {
        let err = prepend_row_after_tbody("<p>prose only</p>", "<tr/>").unwrap_err();
        assert!(err.to_string().contains("tbody"));
    }

    #[test]
    fn builds_an_attachment_link() {
        let link = attachment_link("paycheck-2026-08.pdf", "august");
        assert!(link.contains(r#"ri:filename="paycheck-2026-08.pdf""#));
        assert!(link.contains("<![CDATA[august]]>"));
    }

    #[test]
    fn formats_amounts_with_a_comma() {
        assert_eq!(format_euro_amount(1234.5), "1234,50");
        assert_eq!(format_euro_amount(0.333), "0,33");
    }
}
