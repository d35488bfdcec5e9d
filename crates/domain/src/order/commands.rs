//! Validated creation request.

use common::{CustomerId, ProductId};

use super::ValidationError;

/// A request to create an order that has passed validation.
///
/// The only way to obtain one is [`CreateOrder::new`], so the service never
/// sees a request without a customer or without products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrder {
    customer_id: CustomerId,
    products: Vec<ProductId>,
}

impl CreateOrder {
    /// Validates raw request fields.
    ///
    /// Fields are optional so callers can pass through whatever the payload
    /// carried; a missing field gets the same error as an empty one.
    pub fn new(
        customer_id: Option<String>,
        products: Option<Vec<String>>,
    ) -> Result<Self, ValidationError> {
        let customer_id = customer_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(ValidationError::CustomerIdRequired)?;

        let products = products.unwrap_or_default();
        if products.is_empty() {
            return Err(ValidationError::NoProducts);
        }
        if let Some(index) = products.iter().position(|p| p.trim().is_empty()) {
            return Err(ValidationError::BlankProduct { index });
        }

        Ok(Self {
            customer_id: CustomerId::new(customer_id),
            products: products.into_iter().map(ProductId::new).collect(),
        })
    }

    /// Convenience constructor for callers that already hold the values.
    pub fn for_customer<I, P>(customer_id: &str, products: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self::new(
            Some(customer_id.to_string()),
            Some(products.into_iter().map(Into::into).collect()),
        )
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn products(&self) -> &[ProductId] {
        &self.products
    }

    pub(crate) fn into_parts(self) -> (CustomerId, Vec<ProductId>) {
        (self.customer_id, self.products)
    }
}
