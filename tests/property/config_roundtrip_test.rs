//! Property-based tests for configuration persistence.
//!
//! A bar list saved by one app instance loads back identically in another
//! instance over the same SQLite file, and the host config file survives a
//! save/load cycle.

use std::sync::Arc;

use extra_bars::app::App;
use extra_bars::database::Database;
use extra_bars::services::config_engine::{ConfigEngine, ConfigEngineTrait};
use extra_bars::services::storage::change_bus;
use extra_bars::types::config::HostConfig;
use extra_bars::types::options::GlobalOptions;
use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn arb_url() -> impl Strategy<Value = String> {
    (
        prop_oneof![Just("https"), Just("http")],
        "[a-z][a-z0-9]{2,12}",
        prop_oneof![Just(".com"), Just(".org"), Just(".dev")],
        proptest::option::of("/[a-z0-9]{1,8}"),
    )
        .prop_map(|(scheme, host, tld, path)| format!("{}://{}{}{}", scheme, host, tld, path.unwrap_or_default()))
}

fn arb_title() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Za-z][A-Za-z0-9 ]{0,20}")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn saved_bars_load_back_identically(
        links in proptest::collection::vec((arb_url(), arb_title(), 0usize..3), 0..10),
        extra_bars in 0usize..3,
        collapse in any::<bool>(),
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bars.db");

        let (expected_bars, expected_collapsed) = {
            let db = Arc::new(Database::open(&path).unwrap());
            let mut app = App::with_database(db, change_bus(), HostConfig::default());
            app.load();
            for _ in 0..extra_bars {
                app.add_new_bar().unwrap();
            }
            for (url, title, bar) in &links {
                let index = if app.bars().len() == 1 { None } else { Some(bar % app.bars().len()) };
                app.add_link_to_bar(url, title.as_deref(), index).unwrap();
            }
            if collapse {
                app.toggle_collapsed();
            }
            (app.bars().to_vec(), app.is_collapsed())
        };

        let db = Arc::new(Database::open(&path).unwrap());
        let mut reopened = App::with_database(db, change_bus(), HostConfig::default());
        reopened.load();
        prop_assert_eq!(reopened.bars(), expected_bars.as_slice());
        prop_assert_eq!(reopened.is_collapsed(), expected_collapsed);
        prop_assert!(reopened.is_enabled());
    }

    #[test]
    fn stored_options_are_always_clamped(scale in -5.0f64..5.0, spacing in -20.0f64..20.0, opacity in -2.0f64..2.0) {
        let opts = GlobalOptions::from_value(&json!({"scale": scale, "spacing": spacing, "opacity": opacity}));
        prop_assert!(opts.scale >= 1.0);
        prop_assert!(opts.spacing >= 0.0);
        prop_assert!((0.0..=1.0).contains(&opts.opacity));
    }

    #[test]
    fn host_config_survives_save_and_load(
        max_attempts in 1u32..100,
        delays in proptest::collection::vec(1u64..5000, 0..8),
        probe_enabled in any::<bool>(),
        filter in "(info|debug|warn|extra_bars=trace)",
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json").to_string_lossy().to_string();
        let mut engine = ConfigEngine::new(Some(path.clone()));
        engine.set_value("setup.max_attempts", json!(max_attempts)).unwrap();
        engine.set_value("setup.retry_delays_ms", json!(delays)).unwrap();
        engine.set_value("favicon.probe_enabled", json!(probe_enabled)).unwrap();
        engine.set_value("logging.filter", json!(filter)).unwrap();

        let mut reloaded = ConfigEngine::new(Some(path));
        let config = reloaded.load().unwrap();
        prop_assert_eq!(&config, engine.get_config());
        prop_assert_eq!(config.setup.retry_delays_ms, delays);
    }
}
