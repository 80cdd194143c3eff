use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{AppError, AppResult};

/// Substitute `${key}` placeholders. Unknown placeholders are left alone so
/// a bad template is visible in the rendered document.
pub fn render_str(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in values {
        rendered = rendered.replace(&format!("${{{key}}}"), value);
    }
    rendered
}

/// Render a text-based template (flat ODT, HTML, plain text) into a new
/// file.
pub fn render_file(
    template: &Path,
    output: &Path,
    values: &BTreeMap<String, String>,
) -> AppResult<()> {
    info!(
        "rendering template {} into {}",
        template.display(),
        output.display()
    );
    let contents = fs::read_to_string(template).map_err(|err| {
        AppError::Template(format!("cannot read template {}: {err}", template.display()))
    })?;
    fs::write(output, render_str(&contents, values))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn round_trips_values_into_the_output() {
        let rendered = render_str(
            "<p>${date}: ${description} (${date})</p>",
            &values(&[("date", "2026-08-24"), ("description", "dentist visit")]),
        );
        assert_eq!(rendered, "<p>2026-08-24: dentist visit (2026-08-24)</p>");
    }

    #[test]
    fn leaves_unknown_placeholders_visible() {
        let rendered = render_str("${known} ${unknown}", &values(&[("known", "yes")]));
        assert_eq!(rendered, "yes ${unknown}");
    }

    #[test]
    fn renders_into_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("request.fodt");
        fs::write(&template, "<text:p>${p_day}</text:p>").unwrap();
        let output = dir.path().join("rendered.fodt");
        render_file(&template, &output, &values(&[("p_day", "monday 24/08/2026")])).unwrap();
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "<text:p>monday 24/08/2026</text:p>"
        );
    }
}
