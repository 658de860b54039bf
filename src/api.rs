//! JSON facade over the product services.
//!
//! Bodies arrive as loosely typed JSON (or form fields re-encoded as JSON
//! strings), are checked field by field, and every answer is wrapped in the
//! same `{status, payload, error}` envelope. A transport layer only has to
//! forward the body and write back [`ApiResponse::http_status`].

use crate::{
    context::AppContext,
    core::{
        NewProduct, ProductUpdate,
        validation::{
            ACTIVE_MESSAGE, COUNT_MESSAGE, DESCRIPTION_MESSAGE, IMAGE_MESSAGE, NAME_MESSAGE,
            PRICE_MESSAGE, WEIGHT_MESSAGE,
        },
    },
    entities::{ProductHistoryModel, ProductModel},
    errors::{Error, ErrorKind, FieldError, Result},
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

const BODY_MESSAGE: &str = "Request body must be a JSON object.";

/// Uniform response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    /// `true` on success
    pub status: bool,
    /// Result value, `null` on failure
    pub payload: Option<T>,
    /// Failure description, `null` on success
    pub error: Option<ApiError>,
}

/// Error half of [`ApiResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Vec<FieldError>,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            details: err.details(),
        }
    }
}

impl<T> ApiResponse<T> {
    /// Wraps a service result, logging failures that are not the caller's fault.
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(payload) => Self {
                status: true,
                payload: Some(payload),
                error: None,
            },
            Err(err) => {
                if err.kind().http_status() >= 500 {
                    warn!("Request failed: {}", err);
                }
                Self {
                    status: false,
                    payload: None,
                    error: Some(ApiError::from(err)),
                }
            }
        }
    }

    /// HTTP status matching this response.
    pub fn http_status(&self) -> u16 {
        self.error
            .as_ref()
            .map_or(200, |error| error.kind.http_status())
    }
}

/// Entry points a transport layer binds its routes to.
#[derive(Clone)]
pub struct ProductApi {
    context: AppContext,
}

impl ProductApi {
    pub fn new(context: AppContext) -> Self {
        Self { context }
    }

    pub async fn add_product(&self, body: &Value) -> ApiResponse<ProductModel> {
        let result = match parse_new_product(body) {
            Ok(new) => self.context.mutations.add_product(new).await,
            Err(err) => Err(err),
        };
        ApiResponse::from_result(result)
    }

    pub async fn update_product(&self, id: &str, body: &Value) -> ApiResponse<ProductModel> {
        let result = match parse_update(body) {
            Ok(update) => self.context.mutations.update_product(id, update).await,
            Err(err) => Err(err),
        };
        ApiResponse::from_result(result)
    }

    pub async fn delete_product(&self, id: &str) -> ApiResponse<ProductModel> {
        ApiResponse::from_result(self.context.mutations.delete_product(id).await)
    }

    pub async fn get_all_products(&self, limit: u64, offset: u64) -> ApiResponse<Vec<ProductModel>> {
        ApiResponse::from_result(self.context.queries.get_all_products(limit, offset).await)
    }

    pub async fn get_all_products_history(
        &self,
        limit: u64,
        offset: u64,
    ) -> ApiResponse<Vec<ProductHistoryModel>> {
        ApiResponse::from_result(
            self.context
                .queries
                .get_all_products_history(limit, offset)
                .await,
        )
    }

    pub async fn get_product(&self, id: &str) -> ApiResponse<ProductModel> {
        ApiResponse::from_result(self.context.queries.get_product(id).await)
    }
}

/// Parses an add body. `name`, `count`, `weightPerItem` and `pricePerItem` are required.
pub fn parse_new_product(body: &Value) -> Result<NewProduct> {
    let body = as_object(body)?;
    let required = |key: &'static str, message: &'static str| {
        field(body, key).ok_or_else(|| Error::validation(key, message))
    };

    Ok(NewProduct {
        name: string(required("name", NAME_MESSAGE)?, "name", NAME_MESSAGE)?,
        count: integer(required("count", COUNT_MESSAGE)?)?,
        weight_per_item: decimal(
            required("weightPerItem", WEIGHT_MESSAGE)?,
            "weightPerItem",
            WEIGHT_MESSAGE,
        )?,
        price_per_item: decimal(
            required("pricePerItem", PRICE_MESSAGE)?,
            "pricePerItem",
            PRICE_MESSAGE,
        )?,
        is_active: field(body, "isActive").map(flag).transpose()?,
        image: field(body, "image")
            .map(|v| string(v, "image", IMAGE_MESSAGE))
            .transpose()?,
        description: field(body, "description")
            .map(|v| string(v, "description", DESCRIPTION_MESSAGE))
            .transpose()?,
    })
}

/// Parses an update body. Every field is optional; unknown keys are ignored.
pub fn parse_update(body: &Value) -> Result<ProductUpdate> {
    let body = as_object(body)?;

    Ok(ProductUpdate {
        count: field(body, "count").map(integer).transpose()?,
        is_active: field(body, "isActive").map(flag).transpose()?,
        image: field(body, "image")
            .map(|v| string(v, "image", IMAGE_MESSAGE))
            .transpose()?,
        name: field(body, "name")
            .map(|v| string(v, "name", NAME_MESSAGE))
            .transpose()?,
        weight_per_item: field(body, "weightPerItem")
            .map(|v| decimal(v, "weightPerItem", WEIGHT_MESSAGE))
            .transpose()?,
        price_per_item: field(body, "pricePerItem")
            .map(|v| decimal(v, "pricePerItem", PRICE_MESSAGE))
            .transpose()?,
        description: field(body, "description")
            .map(|v| string(v, "description", DESCRIPTION_MESSAGE))
            .transpose()?,
    })
}

fn as_object(body: &Value) -> Result<&Map<String, Value>> {
    body.as_object()
        .ok_or_else(|| Error::validation("body", BODY_MESSAGE))
}

/// A present, non-null field.
fn field<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|value| !value.is_null())
}

fn string(value: &Value, key: &str, message: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::validation(key, message))
}

fn integer(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::validation("count", COUNT_MESSAGE))
}

fn decimal(value: &Value, key: &str, message: &str) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::validation(key, message))
}

fn flag(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| Error::validation("isActive", ACTIVE_MESSAGE))
}
