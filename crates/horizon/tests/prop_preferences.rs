//! Lenient preference loading over arbitrary documents.

#![allow(missing_docs)]

use horizon::Preferences;
use proptest::prelude::*;

fn value() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<bool>().prop_map(|b| b.to_string()),
        any::<i32>().prop_map(|i| i.to_string()),
        (-10.0f64..10.0).prop_map(|f| format!("{f:?}")),
        "[a-z-]{0,16}".prop_map(|s| format!("\"{s}\"")),
    ]
}

fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("preset".to_string()),
        Just("adaptive_resolution".to_string()),
        Just("bloom".to_string()),
        Just("star_field".to_string()),
        Just("resolution_scale".to_string()),
        Just("mass".to_string()),
        Just("spin".to_string()),
        "[a-z_]{1,12}",
    ]
}

proptest! {
    #[test]
    fn test_loaded_values_always_in_range(
        entries in prop::collection::btree_map(key(), value(), 0..10)
    ) {
        let text: String = entries.iter().map(|(k, v)| format!("{k} = {v}\n")).collect();
        let (prefs, rejected) = Preferences::load_lenient(&text);

        prop_assert!((0.25..=1.0).contains(&prefs.resolution_scale));
        prop_assert!(prefs.mass.is_finite() && prefs.mass > 0.0);
        prop_assert!((-1.0..=1.0).contains(&prefs.spin));
        prop_assert!(rejected.len() <= entries.len());
    }

    #[test]
    fn test_garbage_never_panics(text in ".{0,200}") {
        let (prefs, _) = Preferences::load_lenient(&text);
        prop_assert!(prefs.mass > 0.0);
    }
}
