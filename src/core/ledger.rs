//! Ledger writers shared by the billing cascades.
//!
//! An issued invoice is always three rows: the invoice, a single item line and a
//! revenue entry in the general ledger, all carrying the same description. A
//! movement is two rows: the movement and its item. Both compute their due date
//! with [`calendar::due_date`](crate::core::calendar::due_date).
//!
//! These functions are generic over [`ConnectionTrait`] so the cascades can run
//! them inside the transaction that created the triggering record.

use crate::{
    config::settings::BillingSettings,
    core::{calendar, new_id},
    entities::{
        EntryKind, PaymentStatus, financial_entry, invoice, invoice_item, movement, movement_item,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use tracing::{debug, instrument};

/// Everything needed to bill a member.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    /// Billed member
    pub user_id: String,
    pub issued_on: NaiveDate,
    /// `"registration"` or `"sale"`
    pub kind: String,
    /// Mirrored onto the invoice notes, the item and the ledger entry
    pub description: String,
    pub unit_price: f64,
    pub quantity: i32,
    /// Amount billed; usually `unit_price * quantity`
    pub total: f64,
    /// General ledger category
    pub category: String,
}

/// The rows written by [`issue_invoice`].
#[derive(Debug, Clone)]
pub struct IssuedInvoice {
    pub invoice: invoice::Model,
    pub item: invoice_item::Model,
    pub entry: financial_entry::Model,
}

/// Writes an invoice, its item line and the mirrored revenue entry.
#[instrument(skip(db, billing))]
pub async fn issue_invoice<C>(
    db: &C,
    billing: &BillingSettings,
    draft: InvoiceDraft,
) -> Result<IssuedInvoice>
where
    C: ConnectionTrait,
{
    let invoice = invoice::ActiveModel {
        id: Set(new_id()),
        user_id: Set(draft.user_id.clone()),
        issued_on: Set(draft.issued_on),
        due_on: Set(calendar::due_date(draft.issued_on, billing)),
        reference_month: Set(Some(draft.issued_on.format("%Y-%m").to_string())),
        total: Set(draft.total),
        status: Set(PaymentStatus::Pending),
        kind: Set(draft.kind),
        notes: Set(Some(draft.description.clone())),
    }
    .insert(db)
    .await?;
    debug!("Inserted invoice {} ({:.2})", invoice.id, invoice.total);

    let item = invoice_item::ActiveModel {
        id: Set(new_id()),
        invoice_id: Set(invoice.id.clone()),
        description: Set(draft.description.clone()),
        unit_price: Set(draft.unit_price),
        quantity: Set(draft.quantity),
        total: Set(draft.total),
    }
    .insert(db)
    .await?;

    let entry = financial_entry::ActiveModel {
        id: Set(new_id()),
        entry_date: Set(draft.issued_on),
        description: Set(draft.description),
        kind: Set(EntryKind::Revenue),
        amount: Set(draft.total),
        category: Set(Some(draft.category)),
        user_id: Set(Some(draft.user_id)),
        invoice_id: Set(Some(invoice.id.clone())),
        status: Set(PaymentStatus::Pending),
    }
    .insert(db)
    .await?;

    Ok(IssuedInvoice {
        invoice,
        item,
        entry,
    })
}

/// Everything needed to allocate an internal cost.
#[derive(Debug, Clone)]
pub struct MovementDraft {
    /// Charged athlete, `None` for aggregate movements
    pub user_id: Option<String>,
    pub convocation_group_id: Option<String>,
    pub event_id: Option<String>,
    pub issued_on: NaiveDate,
    pub description: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub category: Option<String>,
}

/// Writes a movement and its single item line.
#[instrument(skip(db, billing))]
pub async fn issue_movement<C>(
    db: &C,
    billing: &BillingSettings,
    draft: MovementDraft,
) -> Result<(movement::Model, movement_item::Model)>
where
    C: ConnectionTrait,
{
    let total = draft.unit_price * f64::from(draft.quantity);

    let movement = movement::ActiveModel {
        id: Set(new_id()),
        user_id: Set(draft.user_id),
        convocation_group_id: Set(draft.convocation_group_id),
        event_id: Set(draft.event_id),
        issued_on: Set(draft.issued_on),
        due_on: Set(calendar::due_date(draft.issued_on, billing)),
        total: Set(total),
        status: Set(PaymentStatus::Pending),
        description: Set(draft.description.clone()),
        category: Set(draft.category),
    }
    .insert(db)
    .await?;
    debug!("Inserted movement {} ({:.2})", movement.id, movement.total);

    let item = movement_item::ActiveModel {
        id: Set(new_id()),
        movement_id: Set(movement.id.clone()),
        description: Set(draft.description),
        unit_price: Set(draft.unit_price),
        quantity: Set(draft.quantity),
        total: Set(total),
    }
    .insert(db)
    .await?;

    Ok((movement, item))
}
