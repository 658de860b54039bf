//! Field rules for product input.
//!
//! These mirror the request validators of the HTTP layer so the core rejects the
//! same inputs even when called directly. All checks run before any store call.

use crate::{
    core::input::{NewProduct, ProductUpdate},
    errors::{Error, Result},
};
use uuid::Uuid;

pub const NAME_MESSAGE: &str = "`Name` can not be empty.";
pub const COUNT_MESSAGE: &str = "`Count` must be integer.";
pub const WEIGHT_MESSAGE: &str = "`Weight` must be no more than 3 characters after the dot.";
pub const PRICE_MESSAGE: &str = "`Price` must be no more than 2 characters after the dot.";
pub const ACTIVE_MESSAGE: &str = "`Active` must be true or false.";
pub const IMAGE_MESSAGE: &str = "`Image` must be string.";
pub const DESCRIPTION_MESSAGE: &str = "`Description` must be string.";

/// Length of a hyphenated UUID, the only accepted id shape.
const ID_LENGTH: usize = 36;

const WEIGHT_DIGITS: usize = 3;
const PRICE_DIGITS: usize = 2;

/// Parses a product id, rejecting anything that is not a hyphenated UUID.
pub fn parse_id(raw: &str) -> Result<Uuid> {
    if raw.len() != ID_LENGTH {
        return Err(Error::InvalidId { id: raw.to_string() });
    }
    Uuid::try_parse(raw).map_err(|_| Error::InvalidId { id: raw.to_string() })
}

/// Trims `name` and upper-cases its first character.
pub fn normalize_name(name: &str) -> String {
    let mut chars = name.trim().chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("name", NAME_MESSAGE));
    }
    Ok(())
}

pub fn validate_count(count: i64) -> Result<()> {
    if count < 0 {
        return Err(Error::validation("count", COUNT_MESSAGE));
    }
    Ok(())
}

pub fn validate_weight(weight: f64) -> Result<()> {
    if !is_plain_decimal(weight, WEIGHT_DIGITS) {
        return Err(Error::validation("weightPerItem", WEIGHT_MESSAGE));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<()> {
    if !is_plain_decimal(price, PRICE_DIGITS) {
        return Err(Error::validation("pricePerItem", PRICE_MESSAGE));
    }
    Ok(())
}

/// Finite, non-negative, and written with at most `max_digits` after the dot.
///
/// `f64`'s `Display` prints the shortest representation that round-trips, which
/// is the same text a JSON client sent.
fn is_plain_decimal(value: f64, max_digits: usize) -> bool {
    if !value.is_finite() || value < 0.0 {
        return false;
    }
    let text = value.to_string();
    text.split_once('.')
        .map_or(0, |(_, fraction)| fraction.len())
        <= max_digits
}

/// Validates every field of a new product.
pub fn validate_new_product(product: &NewProduct) -> Result<()> {
    validate_name(&product.name)?;
    validate_count(product.count)?;
    validate_weight(product.weight_per_item)?;
    validate_price(product.price_per_item)
}

/// Validates the supplied fields of an update; absent fields are skipped.
pub fn validate_update(update: &ProductUpdate) -> Result<()> {
    if let Some(name) = &update.name {
        validate_name(name)?;
    }
    if let Some(count) = update.count {
        validate_count(count)?;
    }
    if let Some(weight) = update.weight_per_item {
        validate_weight(weight)?;
    }
    if let Some(price) = update.price_per_item {
        validate_price(price)?;
    }
    Ok(())
}
