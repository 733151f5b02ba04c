//! Order operations.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::clients::{Body, Call, Method, ROOT_FIELD};
use crate::config::{bind_identifier, Endpoint};
use crate::error::Error;
use crate::resources::{merge_fields, Client, Content};

/// Listing filters for [`Orders::list_orders`].
///
/// Unset filters are transmitted as `null` query entries, which the
/// transport omits from the encoded query string.
#[derive(Clone, Debug, Serialize)]
pub struct ListOrders {
    /// Page to fetch, starting at 1.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Restrict to orders in this state.
    pub state: Option<String>,
    /// Restrict to orders of this team.
    pub team_identifier: Option<String>,
}

impl Default for ListOrders {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            state: None,
            team_identifier: None,
        }
    }
}

/// Fields for [`Orders::create_order`]. All fields are optional; unset ones
/// are transmitted as `null`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CreateOrder {
    /// Display name of the order.
    pub name: Option<String>,
    /// Caller-side reference.
    pub reference: Option<String>,
    /// Free-text comment. The upstream API expects the misspelled field
    /// name `commment`; sending the correctly spelled one silently drops
    /// the value.
    #[serde(rename = "commment")]
    pub comment: Option<String>,
    /// Coupon code to apply.
    pub coupon_code: Option<String>,
    /// Requested delivery date.
    pub desired_delivery_date: Option<NaiveDate>,
    /// Service level identifier.
    pub service_level: Option<String>,
    /// Cost center to bill against.
    pub cost_center_identifier: Option<String>,
}

/// Fields for [`Orders::update_order`].
#[derive(Clone, Debug, Default, Serialize)]
pub struct UpdateOrder {
    /// New caller-side reference.
    pub reference: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New cost center.
    pub cost_center_identifier: Option<String>,
}

/// Operations on translation orders.
#[async_trait]
pub trait Orders {
    /// Lists the orders of the authenticated user, in server order.
    async fn list_orders(&self, filter: ListOrders) -> Result<Content, Error>;

    /// Creates an order and returns the server's representation of it.
    async fn create_order(&self, order: CreateOrder) -> Result<Value, Error>;

    /// Updates an order's mutable fields.
    async fn update_order(&self, identifier: &str, update: UpdateOrder) -> Result<Value, Error>;

    /// Retrieves a single order.
    async fn show_order(&self, identifier: &str) -> Result<Value, Error>;

    /// Submits an order for processing.
    async fn request_order(&self, identifier: &str) -> Result<Value, Error>;

    /// Rates a completed order.
    async fn rate_order(&self, identifier: &str) -> Result<Value, Error>;
}

#[async_trait]
impl Orders for Client {
    async fn list_orders(&self, filter: ListOrders) -> Result<Content, Error> {
        let url = self.config().url(Endpoint::ListOrders);
        let mut params = self.base_params();
        merge_fields(&mut params, &filter)?;
        self.core()
            .get_content(
                &url,
                &Call::new().method(Method::Get).params(params),
                ROOT_FIELD,
            )
            .await
    }

    async fn create_order(&self, order: CreateOrder) -> Result<Value, Error> {
        let url = self.config().url(Endpoint::CreateOrder);
        let mut data = self.base_params();
        merge_fields(&mut data, &order)?;
        self.core()
            .request_json(
                &url,
                &Call::new().method(Method::Post).data(Body::Fields(data)),
            )
            .await
    }

    async fn update_order(&self, identifier: &str, update: UpdateOrder) -> Result<Value, Error> {
        let url = bind_identifier(&self.config().url(Endpoint::UpdateOrder), identifier);
        let mut params = self.base_params();
        params.insert(
            "identifier".to_string(),
            Value::String(identifier.to_string()),
        );
        merge_fields(&mut params, &update)?;
        self.core()
            .request_json(&url, &Call::new().method(Method::Patch).params(params))
            .await
    }

    async fn show_order(&self, identifier: &str) -> Result<Value, Error> {
        let url = bind_identifier(&self.config().url(Endpoint::ShowOrder), identifier);
        let params = self
            .base_params()
            .into_iter()
            .chain([(
                "identifier".to_string(),
                Value::String(identifier.to_string()),
            )])
            .collect();
        self.core()
            .request_json(&url, &Call::new().method(Method::Get).params(params))
            .await
    }

    async fn request_order(&self, identifier: &str) -> Result<Value, Error> {
        let url = bind_identifier(&self.config().url(Endpoint::RequestOrder), identifier);
        let mut params = self.base_params();
        params.insert(
            "identifier".to_string(),
            Value::String(identifier.to_string()),
        );
        self.core()
            .request_json(&url, &Call::new().method(Method::Patch).params(params))
            .await
    }

    async fn rate_order(&self, identifier: &str) -> Result<Value, Error> {
        let url = bind_identifier(&self.config().url(Endpoint::RateOrder), identifier);
        let mut data = self.base_params();
        data.insert(
            "identifier".to_string(),
            Value::String(identifier.to_string()),
        );
        self.core()
            .request_json(
                &url,
                &Call::new().method(Method::Post).data(Body::Fields(data)),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_defaults_to_the_first_page() {
        let filter = ListOrders::default();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.per_page, 20);
        assert!(filter.state.is_none());
    }

    #[test]
    fn comment_serializes_under_the_misspelled_wire_name() {
        let order = CreateOrder {
            comment: Some("please hurry".to_string()),
            ..CreateOrder::default()
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["commment"], "please hurry");
        assert!(value.get("comment").is_none());
    }

    #[test]
    fn unset_create_fields_serialize_as_null() {
        let value = serde_json::to_value(CreateOrder::default()).unwrap();
        assert_eq!(value["name"], Value::Null);
        assert_eq!(value["coupon_code"], Value::Null);
    }

    #[test]
    fn delivery_dates_serialize_as_iso_8601() {
        let order = CreateOrder {
            desired_delivery_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..CreateOrder::default()
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["desired_delivery_date"], "2024-03-01");
    }
}
