//! Configuration loaded from the environment.
//!
//! Every knob has a default that works out of the box: state lands in a
//! `data/` directory next to the binary and a bootstrap administrator is
//! seeded on first run. A `.env` file is honored when present.

use std::env;
use std::path::PathBuf;

use crate::types::ActorId;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Where state files live
    pub data: DataConfig,
    /// Bootstrap administrator credentials
    pub admin: AdminConfig,
}

/// Data directory layout
#[derive(Clone, Debug)]
pub struct DataConfig {
    /// Directory holding every state file
    pub dir: PathBuf,
    /// File name of the inventory file
    pub inventory_file: String,
    /// File name of the roster file
    pub roster_file: String,
}

/// Bootstrap administrator credentials, used only when the roster has no
/// administrator yet
#[derive(Clone, Debug)]
pub struct AdminConfig {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
}

impl Config {
    /// Reads configuration from the environment, falling back to defaults.
    ///
    /// - `SHOPKEEPER_DATA_DIR` (default `data`)
    /// - `SHOPKEEPER_INVENTORY_FILE` (default `products.txt`)
    /// - `SHOPKEEPER_ROSTER_FILE` (default `users.txt`)
    /// - `SHOPKEEPER_ADMIN_USER` (default `admin`)
    /// - `SHOPKEEPER_ADMIN_PASSWORD` (default `admin123`)
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            data: DataConfig {
                dir: PathBuf::from(env_or("SHOPKEEPER_DATA_DIR", "data")),
                inventory_file: env_or("SHOPKEEPER_INVENTORY_FILE", "products.txt"),
                roster_file: env_or("SHOPKEEPER_ROSTER_FILE", "users.txt"),
            },
            admin: AdminConfig {
                username: env_or("SHOPKEEPER_ADMIN_USER", "admin"),
                password: env_or("SHOPKEEPER_ADMIN_PASSWORD", "admin123"),
            },
        }
    }
}

impl DataConfig {
    /// Full path of the inventory file
    #[must_use]
    pub fn inventory_path(&self) -> PathBuf {
        self.dir.join(&self.inventory_file)
    }

    /// Full path of the roster file
    #[must_use]
    pub fn roster_path(&self) -> PathBuf {
        self.dir.join(&self.roster_file)
    }

    /// Full path of one actor's cart file
    #[must_use]
    pub fn cart_path(&self, actor_id: ActorId) -> PathBuf {
        self.dir.join(format!("cart_{}.txt", actor_id.value()))
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_rooted_in_the_data_dir() {
        let data = DataConfig {
            dir: PathBuf::from("/tmp/shop"),
            inventory_file: "products.txt".to_string(),
            roster_file: "users.txt".to_string(),
        };
        assert_eq!(data.inventory_path(), PathBuf::from("/tmp/shop/products.txt"));
        assert_eq!(data.roster_path(), PathBuf::from("/tmp/shop/users.txt"));
        assert_eq!(data.cart_path(ActorId::new(7)), PathBuf::from("/tmp/shop/cart_7.txt"));
    }
}
