use core::fmt;

/// Logical reference tables known to the inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    /// `category -> [subtype, ...]`
    AnimalConversion,
    /// `animal_type -> {excretion_coefficient, fraction_TAN, ...}`
    LivestockExcretion,
    /// `animal_type -> {bedding_amount}`
    Bedding,
    EfNh3,
    EfN2o,
    /// NO and N2 factors, global per manure type.
    EfOther,
    EfDigestate,
    GlobalParameters,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::AnimalConversion,
        Table::LivestockExcretion,
        Table::Bedding,
        Table::EfNh3,
        Table::EfN2o,
        Table::EfOther,
        Table::EfDigestate,
        Table::GlobalParameters,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::AnimalConversion => "animal_conversion",
            Table::LivestockExcretion => "livestock_excretion",
            Table::Bedding => "bedding",
            Table::EfNh3 => "ef_nh3",
            Table::EfN2o => "ef_n2o",
            Table::EfOther => "ef_other",
            Table::EfDigestate => "ef_digestate",
            Table::GlobalParameters => "global_parameters",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.yaml", self.name())
    }

    /// Tables holding emission factors.
    pub fn is_emission_factor(self) -> bool {
        matches!(
            self,
            Table::EfNh3 | Table::EfN2o | Table::EfOther | Table::EfDigestate
        )
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
