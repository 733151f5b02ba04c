//! Quote operations.

use async_trait::async_trait;

use crate::clients::{Call, Method, ROOT_FIELD};
use crate::config::{bind_identifier, Endpoint};
use crate::error::Error;
use crate::resources::{Client, Content};

/// Operations on quotes.
#[async_trait]
pub trait Quotes {
    /// Lists the quotes issued for an order, in server order.
    async fn list_quotes(&self, identifier: &str) -> Result<Content, Error>;
}

#[async_trait]
impl Quotes for Client {
    async fn list_quotes(&self, identifier: &str) -> Result<Content, Error> {
        let url = bind_identifier(&self.config().url(Endpoint::ListQuotes), identifier);
        self.core()
            .get_content(
                &url,
                &Call::new().method(Method::Get).params(self.base_params()),
                ROOT_FIELD,
            )
            .await
    }
}
