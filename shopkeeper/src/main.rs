//! Terminal entry point: wires config, persistence, and the engine store
//! together and hands the terminal to the interactive shell.

use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use shopkeeper::aggregates::inventory::InventoryState;
use shopkeeper::aggregates::ledger::LedgerState;
use shopkeeper::aggregates::roster::{RosterAction, RosterState};
use shopkeeper::config::Config;
use shopkeeper::engine::{EngineAction, EngineEnvironment, EngineReducer, EngineState};
use shopkeeper::persistence::{FileLedgerStore, LedgerStore, files};
use shopkeeper::shell;
use shopkeeper_core::{Store, SystemClock};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shopkeeper=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env();
    tracing::info!(data_dir = %config.data.dir.display(), "starting");

    // An unreadable file is reported and its store starts empty. A save
    // later in the session rewrites the file from memory.
    let inventory = files::load_inventory(&config.data.inventory_path()).unwrap_or_else(|error| {
        tracing::error!(%error, "could not load the product catalog, starting empty");
        InventoryState::new()
    });
    let roster = files::load_roster(&config.data.roster_path()).unwrap_or_else(|error| {
        tracing::error!(%error, "could not load the user roster, starting empty");
        RosterState::new()
    });

    let ledger_store = Arc::new(FileLedgerStore::new(config.data.dir.clone()));
    let books = ledger_store.load_all().unwrap_or_else(|error| {
        tracing::error!(%error, "could not load the transaction ledgers, starting empty");
        BTreeMap::new()
    });

    let state = EngineState {
        inventory,
        roster,
        ledger: LedgerState::from_books(books),
        ..EngineState::default()
    };
    let environment = EngineEnvironment::new(Arc::new(SystemClock), ledger_store);
    let mut store = Store::new(state, EngineReducer::new(), environment);

    // There must always be a way into the administration menu.
    store.send(EngineAction::Roster(RosterAction::SeedAdmin {
        username: config.admin.username.clone(),
        password: config.admin.password.clone(),
    }));

    let stdin = io::stdin();
    let stdout = io::stdout();
    shell::run(&mut store, &config, &mut stdin.lock(), &mut stdout.lock())
}
