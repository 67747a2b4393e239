use std::path::PathBuf;

use nf_core::{ApplicationMethod, Gas, ManureType, Stage};
use nf_factors::{FactorCache, compile};
use nf_tables::YamlStore;

fn store() -> YamlStore {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/tables");
    YamlStore::load_dir(&dir).unwrap()
}

fn slurry_n2o(animal: &str, crust: bool, store: &YamlStore) -> f64 {
    compile(animal, crust, store)
        .unwrap()
        .get(Stage::Storage, Gas::N2o, Some(ManureType::Slurry))
        .unwrap()
}

#[test]
fn dairy_slurry_n2o_follows_crust() {
    let s = store();
    assert_eq!(slurry_n2o("dairy_cattle", true, &s), 0.005);
    assert_eq!(slurry_n2o("dairy_cattle", false, &s), 0.0);
    // Subtypes inherit crust sensitivity from their category.
    assert_eq!(slurry_n2o("dairy_cattle_loose", true, &s), 0.005);
}

#[test]
fn crust_flag_ignored_for_birds() {
    let s = store();
    assert_eq!(
        slurry_n2o("laying_hens", true, &s),
        slurry_n2o("laying_hens", false, &s)
    );
}

#[test]
fn subtype_key_wins_over_category() {
    let s = store();
    let broilers = compile("broilers", false, &s).unwrap();
    assert_eq!(
        broilers
            .get(Stage::Housing, Gas::Nh3, Some(ManureType::Solid))
            .unwrap(),
        0.21
    );
    let turkeys = compile("turkeys", false, &s).unwrap();
    assert_eq!(
        turkeys
            .get(Stage::Housing, Gas::Nh3, Some(ManureType::Solid))
            .unwrap(),
        0.41
    );
}

#[test]
fn table_fallback_keys_fill_gaps() {
    let s = store();
    let pigs = compile("fattening_pigs", false, &s).unwrap();
    assert_eq!(pigs.get(Stage::Yards, Gas::Nh3, None).unwrap(), 0.75);
    assert_eq!(
        pigs.method(ManureType::Slurry, ApplicationMethod::Injection)
            .unwrap(),
        0.12
    );

    let goats = compile("goats", false, &s).unwrap();
    assert_eq!(
        goats
            .get(Stage::Storage, Gas::N2o, Some(ManureType::Solid))
            .unwrap(),
        0.01
    );
}

#[test]
fn global_factors_shared_by_all_animals() {
    let s = store();
    let cache = FactorCache::new();
    for animal in ["dairy_cattle", "pigs", "horses"] {
        let f = cache.get_or_compile(animal, false, &s).unwrap();
        assert_eq!(
            f.get(Stage::Storage, Gas::N2, Some(ManureType::Solid))
                .unwrap(),
            0.3
        );
        assert_eq!(f.get(Stage::Digestate, Gas::Nh3, None).unwrap(), 0.02);
    }
    assert_eq!(cache.len(), 3);
}
