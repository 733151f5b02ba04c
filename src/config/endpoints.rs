//! The logical endpoint table.
//!
//! Every operation the API exposes is addressed by a logical name mapped to a
//! relative path template. Templates may contain a `{identifier}` placeholder
//! that is substituted with a resource identifier via [`bind_identifier`].

use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

/// A logical endpoint of the Toptranslation API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AcceptQuote,
    AddDocument,
    CreateCostCenter,
    CreateOrder,
    DocumentUrl,
    DownloadDocument,
    GetLocales,
    GetUser,
    InvoiceUrl,
    ListCostCenters,
    ListDocuments,
    ListInvoices,
    ListOrders,
    ListQuotes,
    QuoteUrl,
    RateOrder,
    ReferenceDocumentUrl,
    RejectQuote,
    RequestOrder,
    ShowCostCenter,
    ShowOrder,
    UpdateOrder,
    UploadDocument,
    UploadToken,
}

/// All endpoints, in table order.
pub const ENDPOINTS: [Endpoint; 24] = [
    Endpoint::AcceptQuote,
    Endpoint::AddDocument,
    Endpoint::CreateCostCenter,
    Endpoint::CreateOrder,
    Endpoint::DocumentUrl,
    Endpoint::DownloadDocument,
    Endpoint::GetLocales,
    Endpoint::GetUser,
    Endpoint::InvoiceUrl,
    Endpoint::ListCostCenters,
    Endpoint::ListDocuments,
    Endpoint::ListInvoices,
    Endpoint::ListOrders,
    Endpoint::ListQuotes,
    Endpoint::QuoteUrl,
    Endpoint::RateOrder,
    Endpoint::ReferenceDocumentUrl,
    Endpoint::RejectQuote,
    Endpoint::RequestOrder,
    Endpoint::ShowCostCenter,
    Endpoint::ShowOrder,
    Endpoint::UpdateOrder,
    Endpoint::UploadDocument,
    Endpoint::UploadToken,
];

impl Endpoint {
    /// Returns the relative path template for this endpoint.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::AcceptQuote => "quotes/{identifier}/accept",
            Self::AddDocument => "orders/{identifier}/documents",
            Self::CreateCostCenter => "cost_centers",
            Self::CreateOrder => "orders",
            Self::DocumentUrl | Self::DownloadDocument => "documents/{identifier}/download",
            Self::GetLocales => "locales",
            Self::GetUser => "users/me",
            Self::InvoiceUrl => "invoices/{identifier}/download",
            Self::ListCostCenters => "cost_centers",
            Self::ListDocuments => "orders/{identifier}/documents",
            Self::ListInvoices => "orders/{identifier}/invoices",
            Self::ListOrders => "orders",
            Self::ListQuotes => "orders/{identifier}/quotes",
            Self::QuoteUrl => "quotes/{identifier}/download",
            Self::RateOrder => "orders/{identifier}/ratings",
            Self::ReferenceDocumentUrl => "reference_documents/{identifier}/download",
            Self::RejectQuote => "quotes/{identifier}/reject",
            Self::RequestOrder => "orders/{identifier}/request",
            Self::ShowCostCenter => "cost_centers/{identifier}",
            Self::ShowOrder => "orders/{identifier}",
            Self::UpdateOrder => "orders/{identifier}",
            Self::UploadDocument => "documents",
            Self::UploadToken => "upload_tokens",
        }
    }

    /// Returns the logical name of this endpoint.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AcceptQuote => "accept_quote",
            Self::AddDocument => "add_document",
            Self::CreateCostCenter => "create_cost_center",
            Self::CreateOrder => "create_order",
            Self::DocumentUrl => "document_url",
            Self::DownloadDocument => "download_document",
            Self::GetLocales => "get_locales",
            Self::GetUser => "get_user",
            Self::InvoiceUrl => "invoice_url",
            Self::ListCostCenters => "list_cost_centers",
            Self::ListDocuments => "list_documents",
            Self::ListInvoices => "list_invoices",
            Self::ListOrders => "list_orders",
            Self::ListQuotes => "list_quotes",
            Self::QuoteUrl => "quote_url",
            Self::RateOrder => "rate_order",
            Self::ReferenceDocumentUrl => "reference_document_url",
            Self::RejectQuote => "reject_quote",
            Self::RequestOrder => "request_order",
            Self::ShowCostCenter => "show_cost_center",
            Self::ShowOrder => "show_order",
            Self::UpdateOrder => "update_order",
            Self::UploadDocument => "upload_document",
            Self::UploadToken => "upload_token",
        }
    }

    /// Returns `true` if the path template contains an `{identifier}`
    /// placeholder.
    #[must_use]
    pub fn takes_identifier(self) -> bool {
        self.path().contains("{identifier}")
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endpoint {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ENDPOINTS
            .into_iter()
            .find(|endpoint| endpoint.name() == s)
            .ok_or_else(|| ClientError::UnknownEndpoint {
                name: s.to_string(),
            })
    }
}

/// Substitutes the `{identifier}` placeholder in a resolved endpoint URL.
#[must_use]
pub fn bind_identifier(url: &str, identifier: &str) -> String {
    url.replace("{identifier}", identifier)
}
