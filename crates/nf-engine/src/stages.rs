//! Per-stage formulas.
//!
//! Plain functions of their inputs so that each stage can be tested on
//! its own; [`crate::InventoryEngine`] chains them.

use std::collections::BTreeMap;

use nf_core::{ApplicationMethod, Real};

use crate::error::{EngineError, EngineResult};
use crate::result::{GasEmissions, MethodEmission, NitrogenFlow};

pub fn excretion_total(animal_number: u64, excretion_coefficient: Real) -> Real {
    animal_number as Real * excretion_coefficient
}

pub fn allocate(total: Real, fraction: Real) -> Real {
    total * fraction
}

pub fn tan(n: Real, fraction_tan: Real) -> Real {
    n * fraction_tan
}

/// Emission of `ef` applied to a TAN pool.
pub fn emission(tan: Real, ef: Real) -> Real {
    tan * ef
}

/// TAN leaving housing as solid manure, after NH3 loss and immobilisation
/// in bedding straw. Never negative.
pub fn ex_housing_solid_tan(
    tan: Real,
    nh3: Real,
    animal_number: Real,
    fraction_solid: Real,
    bedding_amount: Real,
    f_imm: Real,
) -> Real {
    let immobilised = animal_number * fraction_solid * bedding_amount * f_imm;
    (tan - (nh3 + immobilised)).max(0.0)
}

/// Total N leaving housing as solid manure: excreted N plus bedding N,
/// less NH3.
pub fn ex_housing_solid_n(
    n: Real,
    nh3: Real,
    animal_number: Real,
    fraction_solid: Real,
    bedding_amount: Real,
    f_bedding_n: Real,
) -> Real {
    n + animal_number * bedding_amount * f_bedding_n * fraction_solid - nh3
}

/// Share `f_min` of organic N turning into TAN.
pub fn mineralize(tan: Real, n: Real, f_min: Real) -> Real {
    tan + (n - tan) * f_min
}

/// Amount spread without passing storage or the digester, given what went
/// to those two routes.
///
/// `diverted * (1 - s) / s` with `s = storage_fraction + biogas_fraction`.
pub fn direct_application(
    diverted: Real,
    storage_fraction: Real,
    biogas_fraction: Real,
) -> EngineResult<Real> {
    let s = storage_fraction + biogas_fraction;
    if s > 1.0 + 1e-9 {
        return Err(EngineError::FractionSum {
            what: "storage and biogas fractions",
            sum: s,
        });
    }
    if s <= 0.0 {
        return Ok(0.0);
    }
    // Clamp the float noise of s landing a hair above 1.
    Ok((diverted * (1.0 - s) / s).max(0.0))
}

/// Digestate leaving the digester from its N/TAN input.
pub fn digestate(input: NitrogenFlow, f_min_digester: Real, ef_digestate: Real) -> NitrogenFlow {
    let tan = input.tan + f_min_digester * (input.n - input.tan) - ef_digestate * input.n;
    NitrogenFlow::new(input.n * ef_digestate, tan)
}

/// NH3 lost during digestion.
pub fn digestate_nh3(input_n: Real, ef_digestate: Real) -> Real {
    ef_digestate * input_n
}

/// Storage emissions of all four gases off one TAN pool.
pub fn storage_emissions(tan: Real, nh3: Real, n2o: Real, no: Real, n2: Real) -> GasEmissions {
    GasEmissions::new(
        emission(tan, nh3),
        emission(tan, n2o),
        emission(tan, no),
        emission(tan, n2),
    )
}

/// Field application of one manure type.
///
/// Methods with a positive share use their own factor; whatever share is
/// left unassigned uses `generic_ef`, which is only queried when needed.
pub fn field_application<F, G>(
    tan_applied: Real,
    shares: &BTreeMap<ApplicationMethod, Real>,
    mut method_ef: F,
    generic_ef: G,
) -> EngineResult<Vec<MethodEmission>>
where
    F: FnMut(ApplicationMethod) -> EngineResult<Real>,
    G: FnOnce() -> EngineResult<Real>,
{
    let mut out = Vec::new();
    let mut assigned = 0.0;
    for (&method, &share) in shares {
        if share <= 0.0 {
            continue;
        }
        assigned += share;
        let ef = method_ef(method)?;
        out.push(method_emission(Some(method), tan_applied, share, ef));
    }

    let remainder = (1.0 - assigned).max(0.0);
    if remainder > 1e-12 {
        let ef = generic_ef()?;
        out.push(method_emission(None, tan_applied, remainder, ef));
    }
    Ok(out)
}

fn method_emission(
    method: Option<ApplicationMethod>,
    tan_applied: Real,
    share: Real,
    ef: Real,
) -> MethodEmission {
    let part = tan_applied * share;
    MethodEmission {
        method,
        share,
        ef,
        nh3: part * ef,
        tan_after: part * (1.0 - ef),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Real, b: Real) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn excretion_and_allocation() {
        let total = excretion_total(100, 105.0);
        assert_eq!(total, 10500.0);
        assert!(close(allocate(total, 0.2), 2100.0));
        assert!(close(allocate(total, 0.05), 525.0));
        assert!(close(allocate(total, 0.75), 7875.0));
        assert!(close(tan(7875.0, 0.6), 4725.0));
    }

    #[test]
    fn bedding_tan_immobilisation() {
        assert!(close(
            ex_housing_solid_tan(1000.0, 100.0, 100.0, 0.3, 5.0, 0.0067),
            898.995
        ));
        assert_eq!(
            ex_housing_solid_tan(50.0, 100.0, 100.0, 0.3, 5.0, 0.0067),
            0.0
        );
        assert_eq!(
            ex_housing_solid_tan(1000.0, 100.0, 100.0, 0.3, 5000.0, 0.0067),
            0.0
        );
    }

    #[test]
    fn bedding_adds_nitrogen() {
        // 100 animals, 500 kg straw, 0.004 kg N/kg, 30 % solid = 60 kg N
        assert!(close(
            ex_housing_solid_n(1000.0, 100.0, 100.0, 0.3, 500.0, 0.004),
            960.0
        ));
    }

    #[test]
    fn mineralisation_moves_organic_n_to_tan() {
        assert!(close(mineralize(600.0, 1000.0, 0.1), 640.0));
        assert_eq!(mineralize(600.0, 1000.0, 0.0), 600.0);
    }

    #[test]
    fn direct_application_from_diverted_share() {
        // 60 % to storage, 20 % to biogas: direct is a quarter of 800.
        assert!(close(direct_application(800.0, 0.6, 0.2).unwrap(), 200.0));
        assert_eq!(direct_application(800.0, 0.8, 0.2).unwrap(), 0.0);
        assert_eq!(direct_application(0.0, 0.0, 0.0).unwrap(), 0.0);
        assert!(matches!(
            direct_application(800.0, 0.8, 0.4),
            Err(EngineError::FractionSum { .. })
        ));
    }

    #[test]
    fn digestate_balance() {
        let out = digestate(NitrogenFlow::new(1000.0, 600.0), 0.2, 0.02);
        // 600 + 0.2 * 400 - 0.02 * 1000
        assert!(close(out.tan, 660.0));
        assert!(close(out.n, 20.0));
        assert!(close(digestate_nh3(1000.0, 0.02), 20.0));
    }

    #[test]
    fn storage_total_is_sum_of_gases() {
        let e = storage_emissions(1000.0, 0.1, 0.005, 0.0001, 0.003);
        assert!(close(e.nh3, 100.0));
        assert!(close(e.total, 108.1));
    }

    #[test]
    fn application_with_methods_and_remainder() {
        let mut shares = BTreeMap::new();
        shares.insert(ApplicationMethod::Injection, 0.5);
        shares.insert(ApplicationMethod::Broadcast, 0.0);
        let methods = field_application(
            1000.0,
            &shares,
            |m| {
                assert_eq!(m, ApplicationMethod::Injection);
                Ok(0.1)
            },
            || Ok(0.5),
        )
        .unwrap();
        assert_eq!(methods.len(), 2);
        assert!(close(methods[0].nh3, 50.0));
        assert!(close(methods[0].tan_after, 450.0));
        assert_eq!(methods[1].method, None);
        assert!(close(methods[1].nh3, 250.0));
    }

    #[test]
    fn full_shares_never_read_generic_factor() {
        let mut shares = BTreeMap::new();
        shares.insert(ApplicationMethod::TrailingHose, 0.6);
        shares.insert(ApplicationMethod::Broadcast, 0.4);
        let methods = field_application(
            100.0,
            &shares,
            |_| Ok(0.2),
            || Err(EngineError::MissingInput { field: "generic" }),
        )
        .unwrap();
        assert_eq!(methods.len(), 2);
    }
}
