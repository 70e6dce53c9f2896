//! Tests for #[derive(Action)] macro

use chrono::{DateTime, Utc};
use shopkeeper_macros::Action;

#[derive(Action, Clone, Debug, PartialEq)]
enum StockAction {
    #[command]
    AddProduct {
        name: String,
    },

    #[command]
    RemoveProduct,

    #[command]
    SetPrice {
        cents: u64,
    },

    #[event]
    ProductAdded {
        id: u32,
        name: String,
        timestamp: DateTime<Utc>,
    },

    #[event]
    ProductRemoved {
        id: u32,
        timestamp: DateTime<Utc>,
    },

    #[event]
    PriceSet {
        id: u32,
        cents: u64,
        timestamp: DateTime<Utc>,
    },
}

#[test]
fn test_is_command() {
    let action = StockAction::AddProduct {
        name: "Shirt".to_string(),
    };
    assert!(action.is_command());
    assert!(!action.is_event());
}

#[test]
fn test_is_event() {
    let action = StockAction::ProductAdded {
        id: 1,
        name: "Shirt".to_string(),
        timestamp: Utc::now(),
    };
    assert!(!action.is_command());
    assert!(action.is_event());
}

#[test]
fn test_unit_command() {
    let action = StockAction::RemoveProduct;
    assert!(action.is_command());
    assert!(!action.is_event());
}

#[test]
fn test_name_reports_variant() {
    let action = StockAction::PriceSet {
        id: 1,
        cents: 9900,
        timestamp: Utc::now(),
    };
    assert_eq!(action.name(), "PriceSet");
    assert_eq!(StockAction::RemoveProduct.name(), "RemoveProduct");
}

#[test]
fn test_all_commands_identified() {
    let commands = vec![
        StockAction::AddProduct {
            name: "Shirt".to_string(),
        },
        StockAction::RemoveProduct,
        StockAction::SetPrice { cents: 100 },
    ];

    for cmd in commands {
        assert!(cmd.is_command(), "Expected command: {cmd:?}");
        assert!(!cmd.is_event(), "Should not be event: {cmd:?}");
    }
}

#[test]
fn test_all_events_identified() {
    let events = vec![
        StockAction::ProductAdded {
            id: 1,
            name: "Shirt".to_string(),
            timestamp: Utc::now(),
        },
        StockAction::ProductRemoved {
            id: 1,
            timestamp: Utc::now(),
        },
        StockAction::PriceSet {
            id: 1,
            cents: 100,
            timestamp: Utc::now(),
        },
    ];

    for event in events {
        assert!(!event.is_command(), "Should not be command: {event:?}");
        assert!(event.is_event(), "Expected event: {event:?}");
    }
}
