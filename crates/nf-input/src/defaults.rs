//! Default filling from the excretion and bedding reference tables.

use nf_core::Real;
use nf_tables::{ConfigStore, Table, lookup_keys};

use crate::schema::InventoryParams;

/// Value of `field` for the animal type, falling back to its category.
fn table_default(
    store: &dyn ConfigStore,
    table: Table,
    animal_type: &str,
    category: &str,
    field: &str,
) -> Option<Real> {
    lookup_keys(animal_type)
        .into_iter()
        .chain(lookup_keys(category))
        .find_map(|key| store.get_f64(table, &[key.as_str(), field]))
}

fn fill(
    slot: &mut Option<Real>,
    store: &dyn ConfigStore,
    table: Table,
    params_type: &str,
    category: &str,
    field: &'static str,
) {
    if slot.is_some() {
        return;
    }
    *slot = table_default(store, table, params_type, category, field);
    if let Some(value) = slot {
        tracing::debug!(
            animal_type = params_type,
            table = table.name(),
            field,
            value = *value,
            "filled default"
        );
    }
}

/// Fill omitted optional values: explicit parameter, then the table entry for
/// the animal type, then for its category, else left unset.
pub fn fill_defaults(
    params: &InventoryParams,
    category: &str,
    store: &dyn ConfigStore,
) -> InventoryParams {
    let mut out = params.clone();
    let animal = params.animal_type.as_str();

    let excretion = [
        (&mut out.excretion_coefficient, "excretion_coefficient"),
        (&mut out.fraction_tan, "fraction_TAN"),
        (&mut out.fraction_grazing, "fraction_grazing"),
        (&mut out.fraction_yards, "fraction_yards"),
        (&mut out.fraction_housing, "fraction_housing"),
        (&mut out.fraction_manure_slurry, "fraction_manure_slurry"),
        (&mut out.fraction_manure_solid, "fraction_manure_solid"),
    ];
    for (slot, field) in excretion {
        fill(slot, store, Table::LivestockExcretion, animal, category, field);
    }

    fill(
        &mut out.bedding_amount,
        store,
        Table::Bedding,
        animal,
        category,
        "bedding_amount",
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_tables::YamlStore;

    fn store() -> YamlStore {
        YamlStore::from_tables([
            (
                Table::LivestockExcretion,
                "\
dairy_cattle:
  excretion_coefficient: 105
  fraction_TAN: 0.6
  fraction_grazing: 0.2
  fraction_yards: 0.05
  fraction_housing: 0.75
dairy_cattle_tied:
  excretion_coefficient: 98
sheeps:
  excretion_coefficient: 15.5
",
            ),
            (Table::Bedding, "dairy_cattle:\n  bedding_amount: 500\n"),
        ])
        .unwrap()
    }

    #[test]
    fn explicit_values_win() {
        let mut params = InventoryParams::new("dairy_cattle", 10);
        params.excretion_coefficient = Some(120.0);
        let out = fill_defaults(&params, "dairy_cattle", &store());
        assert_eq!(out.excretion_coefficient, Some(120.0));
        assert_eq!(out.fraction_tan, Some(0.6));
    }

    #[test]
    fn subtype_entry_precedes_category_entry() {
        let params = InventoryParams::new("dairy_cattle_tied", 10);
        let out = fill_defaults(&params, "dairy_cattle", &store());
        assert_eq!(out.excretion_coefficient, Some(98.0));
        // Not present for the subtype, so the category value is used.
        assert_eq!(out.fraction_housing, Some(0.75));
        assert_eq!(out.bedding_amount, Some(500.0));
    }

    #[test]
    fn absent_everywhere_stays_unset() {
        let params = InventoryParams::new("dairy_cattle", 10);
        let out = fill_defaults(&params, "dairy_cattle", &store());
        assert_eq!(out.fraction_manure_slurry, None);
        assert_eq!(out.fraction_storage_slurry, None);
    }

    #[test]
    fn plural_alternate_is_tried() {
        let params = InventoryParams::new("sheep", 10);
        let out = fill_defaults(&params, "sheep", &store());
        assert_eq!(out.excretion_coefficient, Some(15.5));
    }
}
