use nf_input::{InputError, InventoryParams, ValidationIssue, build, params_from_yaml_str};
use nf_tables::{Table, YamlStore};

fn store() -> YamlStore {
    YamlStore::from_tables([
        (
            Table::AnimalConversion,
            "\
dairy_cattle: [dairy_cattle_tied, dairy_cattle_loose]
pigs: [fattening_pigs, sows]
birds: [laying_hens, broilers]
",
        ),
        (
            Table::LivestockExcretion,
            "\
dairy_cattle:
  excretion_coefficient: 105
  fraction_TAN: 0.6
  fraction_grazing: 0.2
  fraction_yards: 0.05
  fraction_housing: 0.75
  fraction_manure_slurry: 0.7
  fraction_manure_solid: 0.3
laying_hens:
  excretion_coefficient: 0.77
  fraction_TAN: 0.7
",
        ),
        (Table::Bedding, "dairy_cattle:\n  bedding_amount: 500\n"),
    ])
    .unwrap()
}

#[test]
fn subtype_is_defaulted_from_its_category() {
    let mut params = InventoryParams::new("dairy_cattle_tied", 100);
    params.fraction_storage_slurry = Some(1.0);
    params.fraction_biogas_slurry = Some(0.0);
    params.fraction_storage_solid = Some(1.0);
    params.fraction_biogas_solid = Some(0.0);
    let outcome = build(&params, &store()).unwrap();

    assert!(outcome.is_valid(), "{}", outcome.report());
    let r = &outcome.record;
    assert_eq!(r.category, "dairy_cattle");
    assert_eq!(r.excretion_coefficient, Some(105.0));
    assert_eq!(r.fraction_tan, Some(0.6));
    assert_eq!(r.bedding_amount, Some(500.0));
}

#[test]
fn unresolvable_animal_type_is_a_hard_error() {
    let params = InventoryParams::new("unicorn", 3);
    let err = build(&params, &store()).unwrap_err();
    assert!(matches!(err, InputError::InvalidAnimalType { .. }));
}

#[test]
fn empty_animal_type_is_a_hard_error() {
    let params = InventoryParams::new("  ", 3);
    assert!(matches!(
        build(&params, &store()),
        Err(InputError::InvalidAnimalType { .. })
    ));
}

#[test]
fn rule_violations_are_soft() {
    let mut params = InventoryParams::new("dairy_cattle", 100);
    params.animal_number = None;
    params.fraction_grazing = Some(0.5);
    params.fraction_storage_slurry = Some(0.9);
    params.fraction_biogas_slurry = Some(0.2);
    params.fraction_storage_solid = Some(1.0);
    params.fraction_biogas_solid = Some(0.0);

    let outcome = build(&params, &store()).unwrap();
    assert!(!outcome.is_valid());
    assert_eq!(outcome.issues.len(), 3, "{}", outcome.report());
    assert!(outcome.issues.contains(&ValidationIssue::Missing {
        field: "animal_number"
    }));

    let report = outcome.report();
    assert_eq!(report.lines().count(), 3);
    assert!(report.contains("fraction_storage_slurry + fraction_biogas_slurry"));

    let err = outcome.into_valid().unwrap_err();
    assert!(matches!(err, InputError::Invalid { .. }));
}

#[test]
fn unset_routing_is_reported_only_for_produced_manure() {
    let mut params = InventoryParams::new("dairy_cattle", 100);
    params.fraction_storage_slurry = Some(1.0);
    params.fraction_biogas_slurry = Some(0.0);

    let outcome = build(&params, &store()).unwrap();
    assert_eq!(
        outcome.issues,
        vec![
            ValidationIssue::Missing {
                field: "fraction_storage_solid"
            },
            ValidationIssue::Missing {
                field: "fraction_biogas_solid"
            },
        ]
    );

    params.fraction_manure_slurry = Some(1.0);
    params.fraction_manure_solid = Some(0.0);
    let outcome = build(&params, &store()).unwrap();
    assert!(outcome.is_valid(), "{}", outcome.report());
}

#[test]
fn params_parse_from_yaml() {
    let params = params_from_yaml_str(
        "\
animal_type: laying_hens
animal_number: 5000
fraction_TAN: 0.65
slurry_crust: true
application:
  solid:
    broadcast: 0.5
    incorporation: 0.5
",
    )
    .unwrap();
    assert_eq!(params.fraction_tan, Some(0.65));
    assert!(params.slurry_crust);
    assert_eq!(params.application.solid.len(), 2);

    let outcome = build(&params, &store()).unwrap();
    assert_eq!(outcome.record.category, "birds");
    assert_eq!(outcome.record.fraction_tan, Some(0.65));
    assert_eq!(outcome.record.excretion_coefficient, Some(0.77));
}

#[test]
fn unknown_yaml_fields_are_rejected() {
    assert!(params_from_yaml_str("animal_type: pigs\nanimal_count: 3\n").is_err());
}
