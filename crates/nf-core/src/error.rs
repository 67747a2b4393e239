use thiserror::Error;

pub type NfResult<T> = Result<T, NfError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Fraction out of range for {what}: {value} (expected [0, 1])")]
    FractionOutOfRange { what: &'static str, value: f64 },
}
