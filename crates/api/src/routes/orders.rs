//! Order creation and retrieval endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use common::{Order, OrderId};
use domain::{CreateOrder, OrderService};
use notifier::EventNotifier;
use order_store::OrderStore;
use serde::{Deserialize, Serialize};

use crate::Backend;
use crate::error::ApiError;

/// Order service over whichever store and bus the process was started with.
pub type DynOrderService = OrderService<Arc<dyn OrderStore>, Arc<dyn EventNotifier>>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub order_service: DynOrderService,
    pub backend: Backend,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: Option<String>,
    pub products: Option<Vec<String>>,
}

// -- Response types --

#[derive(Debug, Clone, Serialize)]
pub struct Href {
    pub href: String,
}

/// Hypermedia links attached to order responses.
#[derive(Debug, Clone, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: Href,
}

impl Links {
    /// Links for the order at `/order/{order_id}`.
    pub fn order(order_id: &OrderId) -> Self {
        Self {
            self_link: Href {
                href: format!("/order/{order_id}"),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderCreatedResponse {
    pub order_id: String,
    #[serde(rename = "_links")]
    pub links: Links,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        let links = Links::order(&order.order_id);
        Self { order, links }
    }
}

// -- Handlers --

/// POST /orders: create an order and announce it.
///
/// Responds 200 once the order is stored, whether or not the notification
/// went out.
#[tracing::instrument(skip(state, payload))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<OrderCreatedResponse>, ApiError> {
    let Json(req) = payload?;
    let cmd = CreateOrder::new(req.customer_id, req.products)?;

    let created = state.order_service.create_order(cmd).await?;
    let order_id = created.order.order_id;

    Ok(Json(OrderCreatedResponse {
        links: Links::order(&order_id),
        order_id: order_id.to_string(),
    }))
}

/// GET /order/{order_id}: load an order from the store.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::new(order_id);
    let order = state.order_service.get_order(&order_id).await?;
    Ok(Json(OrderResponse::from(order)))
}
