//! Sale business logic and its stock/billing cascade.
//!
//! Every sale decrements the product's stock by the sold quantity. Sales to a member
//! are also billed: an invoice for the sale's `total` (or `unit_price * quantity`
//! when no total was agreed) with its item and revenue entry.

use crate::{
    config::settings::BillingSettings,
    core::{
        ledger::{self, InvoiceDraft},
        new_id,
        product::{adjust_stock_atomic, get_product_by_id},
        user::require_user,
    },
    entities::sale,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, Set, TransactionTrait};
use tracing::{debug, info, instrument};

/// Input for [`record_sale`].
#[derive(Debug, Clone)]
pub struct NewSale {
    pub product_id: String,
    pub buyer_id: Option<String>,
    pub quantity: i32,
    pub unit_price: f64,
    pub total: Option<f64>,
    pub sold_on: NaiveDate,
}

/// Amount billed for a sale.
#[must_use]
pub fn sale_amount(sale: &sale::Model) -> f64 {
    sale.total
        .unwrap_or_else(|| sale.unit_price * f64::from(sale.quantity))
}

/// Records a sale, moves stock and bills the buyer inside one transaction.
///
/// # Errors
/// Returns an error if:
/// - The quantity is not positive
/// - The unit price or total is negative or not finite
/// - The product or the buyer does not exist
#[instrument(skip(db, billing))]
pub async fn record_sale(
    db: &DatabaseConnection,
    billing: &BillingSettings,
    new_sale: NewSale,
) -> Result<sale::Model> {
    if new_sale.quantity <= 0 {
        return Err(Error::InvalidQuantity {
            quantity: new_sale.quantity,
        });
    }

    for amount in std::iter::once(new_sale.unit_price).chain(new_sale.total) {
        if amount < 0.0 || !amount.is_finite() {
            return Err(Error::InvalidAmount { amount });
        }
    }

    let txn = db.begin().await?;

    if get_product_by_id(&txn, &new_sale.product_id).await?.is_none() {
        return Err(Error::ProductNotFound {
            id: new_sale.product_id,
        });
    }
    if let Some(buyer_id) = &new_sale.buyer_id {
        require_user(&txn, buyer_id).await?;
    }

    let sale = sale::ActiveModel {
        id: Set(new_id()),
        product_id: Set(new_sale.product_id),
        buyer_id: Set(new_sale.buyer_id),
        quantity: Set(new_sale.quantity),
        unit_price: Set(new_sale.unit_price),
        total: Set(new_sale.total),
        sold_on: Set(new_sale.sold_on),
        invoice_id: Set(None),
    }
    .insert(&txn)
    .await?;

    let sale = settle_sale(&txn, billing, sale).await?;

    txn.commit().await?;
    Ok(sale)
}

/// Applies a new sale: decrements stock and, for member sales, issues the invoice.
#[instrument(skip(db, billing, sale), fields(sale_id = %sale.id))]
pub async fn settle_sale<C>(
    db: &C,
    billing: &BillingSettings,
    sale: sale::Model,
) -> Result<sale::Model>
where
    C: ConnectionTrait,
{
    let product = adjust_stock_atomic(db, &sale.product_id, -sale.quantity).await?;
    debug!("Stock of '{}' is now {}", product.name, product.stock);

    let Some(buyer_id) = sale.buyer_id.clone() else {
        return Ok(sale);
    };

    let amount = sale_amount(&sale);
    let issued = ledger::issue_invoice(
        db,
        billing,
        InvoiceDraft {
            user_id: buyer_id,
            issued_on: sale.sold_on,
            kind: "sale".to_string(),
            description: format!("Venda {} x{}", product.name, sale.quantity),
            unit_price: sale.unit_price,
            quantity: sale.quantity,
            total: amount,
            category: billing.sale_category.clone(),
        },
    )
    .await?;

    let mut active: sale::ActiveModel = sale.into();
    active.invoice_id = Set(Some(issued.invoice.id.clone()));
    let sale = active.update(db).await?;

    info!("Sale {} invoiced as {} ({:.2})", sale.id, issued.invoice.id, amount);
    Ok(sale)
}
