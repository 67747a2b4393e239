//! Input record validation.
//!
//! Every rule is evaluated; a single call reports all violations.

use nf_core::{FRACTION_SUM_TOL, ManureType, Real, is_fraction};

use crate::schema::InputRecord;

/// Float slack on "must not exceed 1" sums.
const SUM_SLACK: Real = 1e-9;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: Real },

    #[error("{field} must be in [0, 1], got {value}")]
    OutOfRange { field: &'static str, value: Real },

    #[error("{fields} must sum to 1 (tolerance {tol}), got {sum}")]
    SumNotOne {
        fields: &'static str,
        sum: Real,
        tol: Real,
    },

    #[error("{fields} must not exceed 1, got {sum}")]
    SumExceedsOne { fields: String, sum: Real },

    #[error("bedding_amount is required when fraction_manure_solid > 0 (got {fraction_solid})")]
    BeddingRequired { fraction_solid: Real },

    #[error("bedding_amount must be non-negative and finite, got {value}")]
    NegativeBedding { value: Real },

    #[error("{manure} application share for {method} must be non-negative and finite, got {share}")]
    InvalidShare {
        manure: ManureType,
        method: String,
        share: Real,
    },
}

fn check_fraction(issues: &mut Vec<ValidationIssue>, field: &'static str, value: Option<Real>) {
    if let Some(v) = value
        && !is_fraction(v)
    {
        issues.push(ValidationIssue::OutOfRange { field, value: v });
    }
}

fn check_present(issues: &mut Vec<ValidationIssue>, field: &'static str, value: Option<Real>) {
    if value.is_none() {
        issues.push(ValidationIssue::Missing { field });
    }
}

fn routing_fields(manure: ManureType) -> (&'static str, &'static str) {
    match manure {
        ManureType::Slurry => ("fraction_storage_slurry", "fraction_biogas_slurry"),
        ManureType::Solid => ("fraction_storage_solid", "fraction_biogas_solid"),
    }
}

fn check_not_above_one(
    issues: &mut Vec<ValidationIssue>,
    fields: &str,
    a: Option<Real>,
    b: Option<Real>,
) {
    if let (Some(a), Some(b)) = (a, b) {
        let sum = a + b;
        if sum > 1.0 + SUM_SLACK {
            issues.push(ValidationIssue::SumExceedsOne {
                fields: fields.to_string(),
                sum,
            });
        }
    }
}

pub fn validate(record: &InputRecord) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    match record.animal_number {
        None => issues.push(ValidationIssue::Missing {
            field: "animal_number",
        }),
        Some(0) => issues.push(ValidationIssue::NotPositive {
            field: "animal_number",
            value: 0.0,
        }),
        Some(_) => {}
    }

    // Everything the inventory run reads must be set by now.
    check_present(
        &mut issues,
        "excretion_coefficient",
        record.excretion_coefficient,
    );
    check_present(&mut issues, "fraction_grazing", record.fraction_grazing);
    check_present(&mut issues, "fraction_yards", record.fraction_yards);
    check_present(&mut issues, "fraction_housing", record.fraction_housing);
    check_present(&mut issues, "fraction_TAN", record.fraction_tan);
    check_present(
        &mut issues,
        "fraction_manure_slurry",
        record.fraction_manure_slurry,
    );
    check_present(
        &mut issues,
        "fraction_manure_solid",
        record.fraction_manure_solid,
    );
    // Routing only matters for a manure type that carries nitrogen.
    for manure in ManureType::ALL {
        if let Some(f) = record.fraction_manure(manure)
            && f > 0.0
        {
            let (storage, biogas) = routing_fields(manure);
            check_present(&mut issues, storage, record.fraction_storage(manure));
            check_present(&mut issues, biogas, record.fraction_biogas(manure));
        }
    }

    if let Some(coef) = record.excretion_coefficient
        && (!coef.is_finite() || coef <= 0.0)
    {
        issues.push(ValidationIssue::NotPositive {
            field: "excretion_coefficient",
            value: coef,
        });
    }

    check_fraction(&mut issues, "fraction_grazing", record.fraction_grazing);
    check_fraction(&mut issues, "fraction_yards", record.fraction_yards);
    check_fraction(&mut issues, "fraction_housing", record.fraction_housing);
    if let (Some(g), Some(y), Some(h)) = (
        record.fraction_grazing,
        record.fraction_yards,
        record.fraction_housing,
    ) {
        let sum = g + y + h;
        if !((sum - 1.0).abs() <= FRACTION_SUM_TOL) {
            issues.push(ValidationIssue::SumNotOne {
                fields: "fraction_grazing + fraction_yards + fraction_housing",
                sum,
                tol: FRACTION_SUM_TOL,
            });
        }
    }

    check_fraction(&mut issues, "fraction_TAN", record.fraction_tan);

    check_fraction(
        &mut issues,
        "fraction_manure_slurry",
        record.fraction_manure_slurry,
    );
    check_fraction(
        &mut issues,
        "fraction_manure_solid",
        record.fraction_manure_solid,
    );
    if let (Some(sl), Some(so)) = (record.fraction_manure_slurry, record.fraction_manure_solid) {
        let sum = sl + so;
        if !((sum - 1.0).abs() <= FRACTION_SUM_TOL) {
            issues.push(ValidationIssue::SumNotOne {
                fields: "fraction_manure_slurry + fraction_manure_solid",
                sum,
                tol: FRACTION_SUM_TOL,
            });
        }
    }

    check_fraction(
        &mut issues,
        "fraction_storage_slurry",
        record.fraction_storage_slurry,
    );
    check_fraction(
        &mut issues,
        "fraction_biogas_slurry",
        record.fraction_biogas_slurry,
    );
    check_fraction(
        &mut issues,
        "fraction_storage_solid",
        record.fraction_storage_solid,
    );
    check_fraction(
        &mut issues,
        "fraction_biogas_solid",
        record.fraction_biogas_solid,
    );
    check_not_above_one(
        &mut issues,
        "fraction_storage_slurry + fraction_biogas_slurry",
        record.fraction_storage_slurry,
        record.fraction_biogas_slurry,
    );
    check_not_above_one(
        &mut issues,
        "fraction_storage_solid + fraction_biogas_solid",
        record.fraction_storage_solid,
        record.fraction_biogas_solid,
    );

    match (record.bedding_amount, record.fraction_manure_solid) {
        (Some(b), _) if !b.is_finite() || b < 0.0 => {
            issues.push(ValidationIssue::NegativeBedding { value: b });
        }
        (None, Some(f_solid)) if f_solid > 0.0 => {
            issues.push(ValidationIssue::BeddingRequired {
                fraction_solid: f_solid,
            });
        }
        _ => {}
    }

    for manure in ManureType::ALL {
        let shares = record.application.for_manure(manure);
        for (method, share) in shares {
            if !share.is_finite() || *share < 0.0 {
                issues.push(ValidationIssue::InvalidShare {
                    manure,
                    method: method.to_string(),
                    share: *share,
                });
            }
        }
        let total = record.application.total(manure);
        if total > 1.0 + SUM_SLACK {
            issues.push(ValidationIssue::SumExceedsOne {
                fields: format!("{manure} application shares"),
                sum: total,
            });
        }
    }

    issues
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::schema::InventoryParams;
    use proptest::prelude::*;

    fn complete_pigs() -> InventoryParams {
        let mut params = InventoryParams::new("pigs", 10);
        params.excretion_coefficient = Some(12.1);
        params.fraction_grazing = Some(0.0);
        params.fraction_yards = Some(0.0);
        params.fraction_housing = Some(1.0);
        params.fraction_tan = Some(0.7);
        params.fraction_manure_slurry = Some(1.0);
        params.fraction_manure_solid = Some(0.0);
        params.fraction_storage_slurry = Some(1.0);
        params.fraction_biogas_slurry = Some(0.0);
        params
    }

    proptest! {
        #[test]
        fn allocations_summing_to_one_always_pass(g in 0.0_f64..1.0, y_share in 0.0_f64..1.0) {
            let y = (1.0 - g) * y_share;
            let h = (1.0 - g - y).max(0.0);
            let mut params = complete_pigs();
            params.fraction_grazing = Some(g);
            params.fraction_yards = Some(y);
            params.fraction_housing = Some(h);
            let record = InputRecord::from_params(params, "pigs".to_string());
            prop_assert!(validate(&record).is_empty());
        }

        #[test]
        fn fraction_tan_outside_unit_interval_is_flagged(v in 1.0001_f64..10.0) {
            let mut params = complete_pigs();
            params.fraction_tan = Some(v);
            let record = InputRecord::from_params(params, "pigs".to_string());
            prop_assert_eq!(
                validate(&record),
                vec![ValidationIssue::OutOfRange { field: "fraction_TAN", value: v }]
            );
        }
    }
}
