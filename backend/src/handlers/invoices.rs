//! HTTP handlers for invoice endpoints

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use shared::{Action, Resource};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::invoice::{export_to_csv, Invoice, InvoiceDetail};
use crate::services::pdf::{archive_pdf, invoice_file_name, render_invoice_pdf};
use crate::services::InvoiceService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub format: Option<String>, // "json" or "csv"
}

/// List invoices visible to the caller
pub async fn list_invoices(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    current_user.0.require(Resource::Invoice, Action::View)?;

    let service = InvoiceService::new(state.db.clone(), &state.config);
    let invoices = service.list_invoices(current_user.0.invoice_scope()).await?;

    if query.format.as_deref() == Some("csv") {
        current_user.0.require(Resource::Invoice, Action::Export)?;
        let csv = export_to_csv(&invoices)?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"invoices.csv\""),
            ],
            csv,
        )
            .into_response());
    }

    Ok(Json(invoices).into_response())
}

/// Invoice detail with customer and items
pub async fn get_invoice(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(number): Path<String>,
) -> AppResult<Json<InvoiceDetail>> {
    current_user.0.require(Resource::Invoice, Action::View)?;

    let service = InvoiceService::new(state.db.clone(), &state.config);
    let detail = service
        .get_invoice(&number, current_user.0.invoice_scope())
        .await?;
    Ok(Json(detail))
}

/// Mark an invoice as paid
pub async fn pay_invoice(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(number): Path<String>,
) -> AppResult<Json<Invoice>> {
    current_user.0.require(Resource::Invoice, Action::Pay)?;

    let service = InvoiceService::new(state.db.clone(), &state.config);
    let invoice = service.pay_invoice(&number, &current_user.0).await?;
    Ok(Json(invoice))
}

/// Download an invoice as PDF
pub async fn download_invoice_pdf(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(number): Path<String>,
) -> AppResult<Response> {
    current_user.0.require(Resource::Invoice, Action::Export)?;

    let service = InvoiceService::new(state.db.clone(), &state.config);
    let detail = service
        .get_invoice(&number, current_user.0.invoice_scope())
        .await?;

    let bytes = render_invoice_pdf(&detail)?;
    let file_name = invoice_file_name(detail.invoice.id, detail.invoice.customer_id);

    if let Some(dir) = state.config.pdf.archive_dir.as_deref() {
        // The download is still served when archiving fails
        if let Err(e) = archive_pdf(dir, &file_name, &bytes).await {
            tracing::warn!(error = %e, file_name = %file_name, "Failed to archive invoice PDF");
        }
    }

    tracing::info!(
        invoice_number = %detail.invoice.invoice_number,
        exported_by = current_user.0.user_id,
        "Invoice PDF generated"
    );

    let disposition = format!("attachment; filename=\"{}\"", file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
