//! Product business logic - Handles product creation, lookup and stock.
//!
//! Products are the club's stock items. Sales decrement stock through
//! [`adjust_stock_atomic`]. Stock has no floor; overselling leaves it negative.

use crate::{
    core::new_id,
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, Set, prelude::*};

/// Retrieves a specific product by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id<C>(db: &C, product_id: &str) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product with the specified parameters, performing input validation.
///
/// This function validates that the name is not empty and the price is non-negative,
/// and trims whitespace from the name. Initial stock may be any value.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price is negative or not finite (NaN, infinity)
/// - The database insert operation fails
pub async fn create_product(
    db: &DatabaseConnection,
    name: String,
    price: f64,
    stock: i32,
) -> Result<product::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Product name cannot be empty".to_string(),
        });
    }

    if price < 0.0 || !price.is_finite() {
        return Err(Error::InvalidAmount { amount: price });
    }

    let now = chrono::Utc::now().naive_utc();

    let product = product::ActiveModel {
        id: Set(new_id()),
        name: Set(name.trim().to_string()),
        price: Set(price),
        stock: Set(stock),
        created_at: Set(now),
        updated_at: Set(now),
    };
    product.insert(db).await.map_err(Into::into)
}

/// Adjusts the stock of a product by atomically adding `delta`.
///
/// Performs a single `UPDATE products SET stock = stock + delta WHERE id = ?`
/// instead of a read-modify-write. Use a negative delta for sales.
///
/// # Returns
/// The updated product model
pub async fn adjust_stock_atomic<C>(db: &C, product_id: &str, delta: i32) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    // First verify the product exists
    if get_product_by_id(db, product_id).await?.is_none() {
        return Err(Error::ProductNotFound {
            id: product_id.to_string(),
        });
    }

    Product::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).add(delta),
        )
        .col_expr(
            product::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(product::Column::Id.eq(product_id))
        .exec(db)
        .await?;

    get_product_by_id(db, product_id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            id: product_id.to_string(),
        })
}
