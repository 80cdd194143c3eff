use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::info;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::render::markup::{attachment_link, format_euro_amount, prepend_row_after_tbody};
use crate::render::office::concatenate_pdfs;

/// Which household utility the bill is for. Each one has its own archive
/// page and file naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utility {
    Telephone,
    Electricity,
    Gas,
    Water,
}

impl Utility {
    pub fn page_param(&self) -> &'static str {
        match self {
            Utility::Telephone => "telephone_page",
            Utility::Electricity => "electricity_page",
            Utility::Gas => "gas_page",
            Utility::Water => "water_page",
        }
    }

    pub fn file_name(&self, month: NaiveDate) -> String {
        let month = month.format("%Y-%m");
        match self {
            Utility::Telephone | Utility::Electricity => format!("bill_{month}.pdf"),
            Utility::Gas => format!("bill_gas_{month}.pdf"),
            Utility::Water => format!("bill_water_{month}.pdf"),
        }
    }
}

/// One bill to archive: the wiki table row data plus the scanned documents.
#[derive(Debug, Clone)]
pub struct BillUpload {
    pub utility: Utility,
    /// Due date (or reading date for metered utilities).
    pub date: NaiveDate,
    /// Billing period shown in the table: a month for telephone bills, a
    /// free-form interval for the others.
    pub period: String,
    pub amount: f64,
    /// Metered consumption, only used for gas bills.
    pub cubic_meters: Option<u32>,
    pub notes: String,
    pub documents: Vec<PathBuf>,
}

pub fn table_row(upload: &BillUpload, file_name: &str) -> String {
    let mut cells = vec![
        upload.date.format("%d/%m/%Y").to_string(),
        upload.period.clone(),
        format!("€ {}", format_euro_amount(upload.amount)),
    ];
    if let Some(cubic_meters) = upload.cubic_meters {
        cells.push(cubic_meters.to_string());
    }
    cells.push(attachment_link(file_name, "Download"));
    cells.push(upload.notes.clone());
    let cells: String = cells
        .into_iter()
        .map(|cell| format!("<td>{cell}</td>"))
        .collect();
    format!("<tr>{cells}</tr>")
}

/// Archive a bill: prepend a row to the utility's wiki page and attach the
/// scanned PDF (concatenated first when the scan came in parts). Returns the
/// attached file name.
pub async fn upload(
    ctx: &AppContext,
    helper_name: Option<&str>,
    request: BillUpload,
) -> AppResult<String> {
    if request.documents.is_empty() {
        return Err(AppError::Document("no bill documents given".to_string()));
    }
    let helper = ctx.helper("bills", helper_name)?;
    let org = ctx.organization_for(helper)?;
    let wiki = org.wiki()?;

    let space = helper.param("confluence_space")?;
    let title = helper.param(request.utility.page_param())?;
    let page_id = wiki
        .page_id(space, title)
        .await?
        .ok_or_else(|| AppError::Wiki(format!("page not found: {space} / {title}")))?;

    let file_name = request.utility.file_name(request.date);
    let body = wiki.page_body(&page_id).await?;
    let body = prepend_row_after_tbody(&body, &table_row(&request, &file_name))?;
    wiki.update_page(&page_id, title, &body).await?;

    let first = &request.documents[0];
    let target = first.with_file_name(&file_name);
    if request.documents.len() > 1 {
        concatenate_pdfs(&request.documents, &target).await?;
    } else {
        fs::rename(first, &target)?;
    }
    wiki.attach_file(&target, "application/pdf", &page_id).await?;
    info!(file = %target.display(), page = title, "bill archived");
    Ok(file_name)
}
