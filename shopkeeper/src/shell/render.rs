//! Pure text rendering for the interactive shell.
//!
//! Everything here turns domain values into display strings and nothing
//! touches state, so the formatting is testable without driving the menus.

use crate::aggregates::cart::Cart;
use crate::aggregates::inventory::InventoryState;
use crate::aggregates::ledger::LedgerSummary;
use crate::types::{ActorRecord, Product, Shortage, Size, Transaction};

const DISPLAY_TIME: &str = "%Y-%m-%d %H:%M:%S";

/// One product as a listing row
#[must_use]
pub fn product_row(product: &Product) -> String {
    let slots = product.stock.slots();
    if product.has_size() {
        format!(
            "[{}] {}  {}  {}  XS:{} S:{} M:{} L:{} XL:{}",
            product.id,
            product.name,
            product.placement,
            product.price,
            slots[0],
            slots[1],
            slots[2],
            slots[3],
            slots[4],
        )
    } else {
        format!(
            "[{}] {}  {}  {}  stock:{}",
            product.id,
            product.name,
            product.placement,
            product.price,
            slots[5],
        )
    }
}

/// A whole product listing, one row per line
#[must_use]
pub fn product_listing(products: &[&Product]) -> String {
    if products.is_empty() {
        return "(no products)".to_string();
    }
    products
        .iter()
        .map(|product| product_row(product))
        .collect::<Vec<_>>()
        .join("\n")
}

fn quantity_cells(quantities: &[u32; 6]) -> String {
    Size::ALL
        .iter()
        .filter(|size| quantities[size.index()] > 0)
        .map(|size| format!("{size} x{}", quantities[size.index()]))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A cart with per-line quantities and a running total at current prices
#[must_use]
pub fn cart_view(cart: &Cart, inventory: &InventoryState) -> String {
    if cart.is_empty() {
        return "(cart is empty)".to_string();
    }
    let mut out = String::new();
    for (&product_id, quantities) in cart.lines() {
        match inventory.product(product_id) {
            Some(product) => {
                let units: u64 = quantities.iter().map(|&q| u64::from(q)).sum();
                let subtotal = product
                    .price
                    .checked_multiply(units)
                    .map_or_else(|| "(overflow)".to_string(), |m| m.to_string());
                out.push_str(&format!(
                    "[{}] {}  {}  {}\n",
                    product_id,
                    product.name,
                    quantity_cells(quantities),
                    subtotal,
                ));
            },
            None => {
                out.push_str(&format!(
                    "[{}] (no longer sold)  {}\n",
                    product_id,
                    quantity_cells(quantities),
                ));
            },
        }
    }
    out.push_str(&format!("Total: {}", cart.total(inventory)));
    out
}

/// Every shortage, numbered from 1 for the resolution prompt
#[must_use]
pub fn shortage_report(shortages: &[Shortage], inventory: &InventoryState) -> String {
    let mut out = String::from("Not enough stock for:\n");
    for (position, shortage) in shortages.iter().enumerate() {
        let name = inventory
            .product(shortage.product_id)
            .map_or_else(|| "(no longer sold)".to_string(), |p| p.name.clone());
        out.push_str(&format!(
            "  {}. [{}] {} size {}: requested {}, available {}\n",
            position + 1,
            shortage.product_id,
            name,
            shortage.size,
            shortage.requested,
            shortage.available,
        ));
    }
    out.pop();
    out
}

/// A committed transaction as a full receipt
#[must_use]
pub fn receipt(transaction: &Transaction) -> String {
    let mut out = format!(
        "Receipt #{} ({})\n",
        transaction.id,
        transaction.timestamp.format(DISPLAY_TIME),
    );
    for item in &transaction.items {
        out.push_str(&format!(
            "  {}  {} @ {}  {}\n",
            item.name,
            quantity_cells(&item.quantities),
            item.unit_price,
            item.subtotal,
        ));
    }
    out.push_str(&format!(
        "Subtotal: {}\nDiscount: x{} ({} tier)\nTotal:    {}",
        transaction.raw_total,
        transaction.discount_rate,
        transaction.tier,
        transaction.final_total,
    ));
    out
}

/// One transaction as a single listing row
#[must_use]
pub fn transaction_brief(transaction: &Transaction) -> String {
    format!(
        "#{}  actor {}  {}  {} item(s)  {}",
        transaction.id,
        transaction.actor_id,
        transaction.timestamp.format(DISPLAY_TIME),
        transaction.items.len(),
        transaction.final_total,
    )
}

/// An account as its owner sees it
#[must_use]
pub fn account_view(record: &ActorRecord) -> String {
    let role = if record.is_admin { "administrator" } else { "customer" };
    format!(
        "{} ({role})\nTier:  {}\nSpent: {}",
        record.username, record.tier, record.total_spent,
    )
}

/// Aggregate numbers over a transaction listing
#[must_use]
pub fn summary_view(summary: &LedgerSummary) -> String {
    format!(
        "{} transaction(s), total {}, average {}",
        summary.count, summary.total, summary.average,
    )
}
