use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use tracing::info;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::render::markup::{format_euro_amount, insert_row_after_header};

/// Regular monthly paycheck or one of the extra yearly installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaycheckVariant {
    Monthly,
    Thirteenth,
    Fourteenth,
}

impl PaycheckVariant {
    fn file_suffix(&self) -> &'static str {
        match self {
            PaycheckVariant::Monthly => "",
            PaycheckVariant::Thirteenth => "_13th",
            PaycheckVariant::Fourteenth => "_14th",
        }
    }

    fn day_label(&self, day: NaiveDate) -> String {
        match self {
            PaycheckVariant::Monthly => day.format("%b %Y").to_string().to_lowercase(),
            PaycheckVariant::Thirteenth => format!("13th {}", day.year()),
            PaycheckVariant::Fourteenth => format!("14th {}", day.year()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaycheckUpload {
    pub day: NaiveDate,
    pub variant: PaycheckVariant,
    pub hours: f64,
    pub overtime: f64,
    pub gross: f64,
    pub net: f64,
    /// Accrued holiday, festivity and permit balances, in hours.
    pub holidays: f64,
    pub festivities: f64,
    pub permits: f64,
    pub pdf: PathBuf,
}

pub fn file_name(upload: &PaycheckUpload, prefix: &str) -> String {
    format!(
        "{prefix}paycheck_{}{}.pdf",
        upload.day.format("%Y-%m"),
        upload.variant.file_suffix()
    )
}

pub fn table_row(upload: &PaycheckUpload, file_handle: &str) -> String {
    let overtime = if upload.overtime > 0.0 {
        format_euro_amount(upload.overtime)
    } else {
        "-".to_string()
    };
    format!(
        concat!(
            "<tr><td>{day}</td><td>{hours}</td><td>{overtime}</td>",
            "<td>€ {gross}</td><td>€ {net}</td>",
            "<td>{holidays}</td><td>{festivities}</td><td>{permits}</td>",
            "<td>[[ /{handle} | Download ]]</td></tr>"
        ),
        day = upload.variant.day_label(upload.day),
        hours = format_euro_amount(upload.hours),
        overtime = overtime,
        gross = format_euro_amount(upload.gross),
        net = format_euro_amount(upload.net),
        holidays = format_euro_amount(upload.holidays),
        festivities = format_euro_amount(upload.festivities),
        permits = format_euro_amount(upload.permits),
        handle = file_handle,
    )
}

/// Archive a paycheck on the forge: upload the PDF to the file store and add
/// a row under the header of the paycheck wiki page. Returns the stored file
/// name.
pub async fn upload(
    ctx: &AppContext,
    helper_name: Option<&str>,
    request: PaycheckUpload,
) -> AppResult<String> {
    let helper = ctx.helper("paycheck", helper_name)?;
    let org = ctx.organization_for(helper)?;
    let forge = org.forge()?;

    let page_path = helper.param("paycheck_page")?;
    let name = file_name(&request, helper.param("pdf_prefix")?);
    let remote_name = format!("{}/{name}", page_path.trim_end_matches('/'));
    let file_phid = forge.upload_file(&request.pdf, &remote_name).await?;
    let file = forge
        .file_by_phid(&file_phid)
        .await?
        .ok_or_else(|| AppError::Forge(format!("uploaded file {file_phid} not found")))?;

    let page = forge
        .find_document(page_path, true)
        .await?
        .ok_or_else(|| AppError::Forge(format!("wiki page not found: {page_path}")))?;
    let body = page
        .body
        .ok_or_else(|| AppError::Forge(format!("wiki page {page_path} has no body")))?;
    let body = insert_row_after_header(&body, &table_row(&request, &file.handle()))?;
    forge.update_document(page_path, &page.title, &body).await?;
    info!(file = name, page = page_path, "paycheck archived");
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(variant: PaycheckVariant) -> PaycheckUpload {
        PaycheckUpload {
            day: NaiveDate::from_ymd_opt(2026, 8, 27).unwrap(),
            variant,
            hours: 168.0,
            overtime: 0.0,
            gross: 2600.0,
            net: 1850.5,
            holidays: 12.5,
            festivities: 2.0,
            permits: 8.0,
            pdf: PathBuf::from("/tmp/paycheck.pdf"),
        }
    }

    #[test]
    fn file_names_mark_the_extra_installments() {
        assert_eq!(
            file_name(&upload(PaycheckVariant::Monthly), "acme_"),
            "acme_paycheck_2026-08.pdf"
        );
        assert_eq!(
            file_name(&upload(PaycheckVariant::Thirteenth), "acme_"),
            "acme_paycheck_2026-08_13th.pdf"
        );
        assert_eq!(
            file_name(&upload(PaycheckVariant::Fourteenth), "acme_"),
            "acme_paycheck_2026-08_14th.pdf"
        );
    }

    #[test]
    fn row_formats_amounts_and_the_download_handle() {
        let row = table_row(&upload(PaycheckVariant::Monthly), "F45");
        assert!(row.starts_with("<tr><td>aug 2026</td><td>168,00</td><td>-</td>"));
        assert!(row.contains("<td>€ 2600,00</td><td>€ 1850,50</td>"));
        assert!(row.ends_with("<td>[[ /F45 | Download ]]</td></tr>"));
    }

    #[test]
    fn overtime_shows_only_when_positive() {
        let mut with_overtime = upload(PaycheckVariant::Monthly);
        with_overtime.overtime = 3.5;
        assert!(table_row(&with_overtime, "F1").contains("<td>3,50</td>"));
    }

    #[test]
    fn installment_rows_use_the_year_label() {
        let row = table_row(&upload(PaycheckVariant::Thirteenth), "F1");
        assert!(row.contains("<td>13th 2026</td>"));
    }
}
