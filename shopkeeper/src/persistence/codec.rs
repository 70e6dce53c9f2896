//! Text codecs for the legacy file formats.
//!
//! Every file starts with a header line holding the next id to assign (the
//! cart file holds a line count instead), followed by one record per line.
//! Inventory rows are comma separated, roster and ledger rows pipe separated,
//! cart rows space separated. Decoding is tolerant: a damaged line is logged
//! and skipped, and a ledger record whose item lines were cut off (a crash
//! mid-write) is dropped along with everything after it. Amounts are stored
//! as plain two-decimal text and timestamps as `YYYY-MM-DD HH:MM:SS` in UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::aggregates::cart::Cart;
use crate::aggregates::ledger::LedgerBook;
use crate::types::{
    ActorId, ActorRecord, DiscountRate, Money, Placement, Product, ProductId, SizeStock, Tier,
    Transaction, TransactionId, TransactionItem,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn decode_header(line: Option<&str>) -> u32 {
    match line.map(str::trim) {
        Some(text) if !text.is_empty() => text.parse().unwrap_or_else(|_| {
            tracing::warn!(header = text, "unreadable id header, starting from 1");
            1
        }),
        _ => 1,
    }
}

// ============================================================================
// Inventory
// ============================================================================

/// Encodes the inventory file: a next-id header, then one product per line as
/// `id,name,category,section,price,xs,s,m,l,xl,none`
#[must_use]
pub fn encode_inventory(next_id: u32, products: &[&Product]) -> String {
    let mut rows: Vec<&Product> = products.to_vec();
    rows.sort_by_key(|product| product.id);

    let mut out = format!("{next_id}\n");
    for product in rows {
        let slots = product.stock.slots();
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{}\n",
            product.id,
            product.name,
            product.placement.category_index(),
            product.placement.section_slot(),
            product.price.to_decimal_string(),
            slots[0],
            slots[1],
            slots[2],
            slots[3],
            slots[4],
            slots[5],
        ));
    }
    out
}

fn decode_product_line(line: &str) -> Option<Product> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 11 {
        return None;
    }
    let id: u32 = fields[0].trim().parse().ok()?;
    if id == 0 {
        return None;
    }
    let name = fields[1].to_string();
    if name.is_empty() || name.contains('|') {
        return None;
    }
    let category: usize = fields[2].trim().parse().ok()?;
    let section: usize = fields[3].trim().parse().ok()?;
    let placement = Placement::from_indices(category, section).ok()?;
    let price: Money = fields[4].trim().parse().ok()?;
    let mut slots = [0u32; 6];
    for (slot, field) in slots.iter_mut().zip(&fields[5..]) {
        *slot = field.trim().parse().ok()?;
    }
    Some(Product::new(
        ProductId::new(id),
        name,
        placement,
        price,
        SizeStock::from_slots_inferred(slots),
    ))
}

/// Decodes the inventory file into its header and products, skipping damaged
/// lines. The size mode is not stored; it is inferred from which slots hold
/// stock.
#[must_use]
pub fn decode_inventory(text: &str) -> (u32, Vec<Product>) {
    let mut lines = text.lines();
    let next_id = decode_header(lines.next());
    let mut products = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        match decode_product_line(line) {
            Some(product) => products.push(product),
            None => tracing::warn!(line, "skipping damaged product row"),
        }
    }
    (next_id, products)
}

// ============================================================================
// Carts
// ============================================================================

/// Encodes a cart file: a line-count header, then one line per product as
/// `id xs s m l xl none`
#[must_use]
pub fn encode_cart(cart: &Cart) -> String {
    let mut out = format!("{}\n", cart.len());
    for (product_id, quantities) in cart.lines() {
        out.push_str(&format!(
            "{} {} {} {} {} {} {}\n",
            product_id,
            quantities[0],
            quantities[1],
            quantities[2],
            quantities[3],
            quantities[4],
            quantities[5],
        ));
    }
    out
}

fn decode_cart_line(line: &str) -> Option<(ProductId, [u32; 6])> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 7 {
        return None;
    }
    let id: u32 = fields[0].parse().ok()?;
    let mut quantities = [0u32; 6];
    for (slot, field) in quantities.iter_mut().zip(&fields[1..]) {
        *slot = field.parse().ok()?;
    }
    Some((ProductId::new(id), quantities))
}

/// Decodes a cart file, skipping damaged lines
#[must_use]
pub fn decode_cart(text: &str) -> Cart {
    let mut lines = text.lines();
    let declared: Option<usize> = lines.next().and_then(|line| line.trim().parse().ok());
    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        match decode_cart_line(line) {
            Some(row) => rows.push(row),
            None => tracing::warn!(line, "skipping damaged cart row"),
        }
    }
    if declared.is_some_and(|count| count != rows.len()) {
        tracing::warn!(?declared, actual = rows.len(), "cart line count disagrees with header");
    }
    Cart::from_lines(rows)
}

// ============================================================================
// Roster
// ============================================================================

/// Encodes the roster file: a next-id header, then one account per line as
/// `id|username|password|level|is_admin|total_spent`
#[must_use]
pub fn encode_roster(next_id: u32, records: &[&ActorRecord]) -> String {
    let mut out = format!("{next_id}\n");
    for record in records {
        out.push_str(&format!(
            "{}|{}|{}|{}|{}|{}\n",
            record.id,
            record.username,
            record.password,
            record.tier.level(),
            u8::from(record.is_admin),
            record.total_spent.to_decimal_string(),
        ));
    }
    out
}

fn decode_roster_line(line: &str) -> Option<ActorRecord> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() != 6 {
        return None;
    }
    let id: u32 = fields[0].trim().parse().ok()?;
    if id == 0 {
        return None;
    }
    let username = fields[1].to_string();
    if username.is_empty() {
        return None;
    }
    let password = fields[2].to_string();
    let level: u8 = fields[3].trim().parse().ok()?;
    let is_admin = match fields[4].trim() {
        "1" => true,
        "0" => false,
        _ => return None,
    };
    let total_spent: Money = fields[5].trim().parse().ok()?;
    Some(ActorRecord {
        id: ActorId::new(id),
        username,
        password,
        tier: Tier::from_level(level),
        is_admin,
        total_spent,
    })
}

/// Decodes the roster file into its header and accounts, skipping damaged
/// lines. Out-of-range tier levels clamp to the nearest tier.
#[must_use]
pub fn decode_roster(text: &str) -> (u32, Vec<ActorRecord>) {
    let mut lines = text.lines();
    let next_id = decode_header(lines.next());
    let mut records = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        match decode_roster_line(line) {
            Some(record) => records.push(record),
            None => tracing::warn!(line, "skipping damaged roster row"),
        }
    }
    (next_id, records)
}

// ============================================================================
// Ledger books
// ============================================================================

/// Encodes one actor's ledger book: a next-id header, then per transaction a
/// `TX|...` line followed by one `ITEM|...` line per snapshotted cart line
#[must_use]
pub fn encode_ledger_book(book: &LedgerBook) -> String {
    let mut out = format!("{}\n", book.next_id());
    for tx in book.records() {
        out.push_str(&format!(
            "TX|{}|{}|{}|{}|{}|{}|{}|{}\n",
            tx.id,
            tx.actor_id,
            tx.raw_total.to_decimal_string(),
            tx.discount_rate.to_decimal_string(),
            tx.final_total.to_decimal_string(),
            tx.timestamp.format(TIMESTAMP_FORMAT),
            tx.tier.level(),
            tx.items.len(),
        ));
        for item in &tx.items {
            out.push_str(&format!(
                "ITEM|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}\n",
                item.product_id,
                item.name,
                item.placement.category_index(),
                item.placement.section_slot(),
                item.unit_price.to_decimal_string(),
                item.quantities[0],
                item.quantities[1],
                item.quantities[2],
                item.quantities[3],
                item.quantities[4],
                item.quantities[5],
                item.subtotal.to_decimal_string(),
            ));
        }
    }
    out
}

struct TxHeader {
    id: TransactionId,
    actor_id: ActorId,
    raw_total: Money,
    discount_rate: DiscountRate,
    final_total: Money,
    timestamp: DateTime<Utc>,
    tier: Tier,
    item_count: usize,
}

fn decode_tx_line(line: &str) -> Option<TxHeader> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() != 9 || fields[0] != "TX" {
        return None;
    }
    Some(TxHeader {
        id: TransactionId::new(fields[1].trim().parse().ok()?),
        actor_id: ActorId::new(fields[2].trim().parse().ok()?),
        raw_total: fields[3].trim().parse().ok()?,
        discount_rate: fields[4].trim().parse().ok()?,
        final_total: fields[5].trim().parse().ok()?,
        timestamp: NaiveDateTime::parse_from_str(fields[6].trim(), TIMESTAMP_FORMAT)
            .ok()?
            .and_utc(),
        tier: Tier::from_level(fields[7].trim().parse().ok()?),
        item_count: fields[8].trim().parse().ok()?,
    })
}

fn decode_item_line(line: &str) -> Option<TransactionItem> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() != 13 || fields[0] != "ITEM" {
        return None;
    }
    let product_id = ProductId::new(fields[1].trim().parse().ok()?);
    let name = fields[2].to_string();
    let category: usize = fields[3].trim().parse().ok()?;
    let section: usize = fields[4].trim().parse().ok()?;
    let placement = Placement::from_indices(category, section).ok()?;
    let unit_price: Money = fields[5].trim().parse().ok()?;
    let mut quantities = [0u32; 6];
    for (slot, field) in quantities.iter_mut().zip(&fields[6..12]) {
        *slot = field.trim().parse().ok()?;
    }
    let subtotal: Money = fields[12].trim().parse().ok()?;
    Some(TransactionItem { product_id, name, placement, unit_price, quantities, subtotal })
}

/// Decodes one actor's ledger book.
///
/// A record whose item lines were cut off, which happens when a write was
/// interrupted, is dropped together with everything after it; the id counter
/// is still cross-checked against the records that survived.
#[must_use]
pub fn decode_ledger_book(text: &str) -> LedgerBook {
    let mut lines = text.lines();
    let next_id = decode_header(lines.next());
    let mut records = Vec::new();
    'records: while let Some(line) = lines.next() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(header) = decode_tx_line(line) else {
            tracing::warn!(line, "skipping damaged transaction row");
            continue;
        };
        let mut items = Vec::with_capacity(header.item_count);
        for _ in 0..header.item_count {
            match lines.next().and_then(decode_item_line) {
                Some(item) => items.push(item),
                None => {
                    tracing::warn!(
                        transaction = %header.id,
                        "transaction record cut off mid-item, dropping it and the rest of the file"
                    );
                    break 'records;
                },
            }
        }
        records.push(Transaction {
            id: header.id,
            actor_id: header.actor_id,
            items,
            raw_total: header.raw_total,
            discount_rate: header.discount_rate,
            final_total: header.final_total,
            timestamp: header.timestamp,
            tier: header.tier,
        });
    }
    LedgerBook::from_parts(next_id, records)
}
