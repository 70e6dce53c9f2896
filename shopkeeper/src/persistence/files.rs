//! File-backed load and save for inventory, carts, and the roster.
//!
//! Loading a path that does not exist yet yields an empty value, so first
//! runs need no setup. Saving creates the parent directory on demand and
//! rewrites the whole file.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::aggregates::cart::Cart;
use crate::aggregates::inventory::InventoryState;
use crate::aggregates::roster::RosterState;
use crate::persistence::{PersistError, codec};

fn read_text(path: &Path) -> Result<Option<String>, PersistError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PersistError::Io { path: path.to_path_buf(), source }),
    }
}

pub(crate) fn write_text(path: &Path, text: &str) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|source| PersistError::Io { path: parent.to_path_buf(), source })?;
    }
    fs::write(path, text).map_err(|source| PersistError::Io { path: path.to_path_buf(), source })
}

/// Loads the inventory file, or an empty inventory if it does not exist.
///
/// # Errors
///
/// Fails when the file exists but cannot be read.
pub fn load_inventory(path: &Path) -> Result<InventoryState, PersistError> {
    let Some(text) = read_text(path)? else {
        tracing::info!(path = %path.display(), "no inventory file yet, starting empty");
        return Ok(InventoryState::new());
    };
    let (next_id, products) = codec::decode_inventory(&text);
    let state = InventoryState::from_parts(next_id, products);
    tracing::info!(path = %path.display(), products = state.count(), "inventory loaded");
    Ok(state)
}

/// Rewrites the inventory file.
///
/// # Errors
///
/// Fails when the file cannot be written.
pub fn save_inventory(path: &Path, state: &InventoryState) -> Result<(), PersistError> {
    let text = codec::encode_inventory(state.next_id().value(), &state.list_all());
    write_text(path, &text)
}

/// Loads one actor's cart file, or an empty cart if it does not exist.
///
/// # Errors
///
/// Fails when the file exists but cannot be read.
pub fn load_cart(path: &Path) -> Result<Cart, PersistError> {
    let Some(text) = read_text(path)? else {
        return Ok(Cart::new());
    };
    Ok(codec::decode_cart(&text))
}

/// Rewrites one actor's cart file.
///
/// # Errors
///
/// Fails when the file cannot be written.
pub fn save_cart(path: &Path, cart: &Cart) -> Result<(), PersistError> {
    write_text(path, &codec::encode_cart(cart))
}

/// Loads the roster file, or an empty roster if it does not exist.
///
/// # Errors
///
/// Fails when the file exists but cannot be read.
pub fn load_roster(path: &Path) -> Result<RosterState, PersistError> {
    let Some(text) = read_text(path)? else {
        tracing::info!(path = %path.display(), "no roster file yet, starting empty");
        return Ok(RosterState::new());
    };
    let (next_id, records) = codec::decode_roster(&text);
    let state = RosterState::from_parts(next_id, records);
    tracing::info!(path = %path.display(), accounts = state.count(), "roster loaded");
    Ok(state)
}

/// Rewrites the roster file.
///
/// # Errors
///
/// Fails when the file cannot be written.
pub fn save_roster(path: &Path, state: &RosterState) -> Result<(), PersistError> {
    let text = codec::encode_roster(state.next_id().value(), &state.records());
    write_text(path, &text)
}
