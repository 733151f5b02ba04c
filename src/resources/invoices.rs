//! Invoice operations.

use async_trait::async_trait;

use crate::clients::{Call, Method, ROOT_FIELD};
use crate::config::{bind_identifier, Endpoint};
use crate::error::Error;
use crate::resources::{Client, Content};

/// Operations on invoices.
#[async_trait]
pub trait Invoices {
    /// Lists the invoices issued for an order, in server order.
    async fn list_invoices(&self, identifier: &str) -> Result<Content, Error>;
}

#[async_trait]
impl Invoices for Client {
    async fn list_invoices(&self, identifier: &str) -> Result<Content, Error> {
        let url = bind_identifier(&self.config().url(Endpoint::ListInvoices), identifier);
        self.core()
            .get_content(
                &url,
                &Call::new().method(Method::Get).params(self.base_params()),
                ROOT_FIELD,
            )
            .await
    }
}
