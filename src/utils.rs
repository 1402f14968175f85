use log::warn;
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a stored monetary string into a Decimal, falling back to a plain
/// float parse and finally to ZERO so a single corrupt row cannot poison a
/// whole aggregation pass.
pub fn parse_decimal_tolerant(value_str: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value_str) {
        Ok(d) => d,
        Err(dec_err) => match f64::from_str(value_str) {
            Ok(f_val) => match Decimal::from_f64(f_val) {
                Some(d) => d,
                None => {
                    warn!(
                        "Failed to convert {} '{}' (parsed as f64: {}) to Decimal. Falling back to ZERO.",
                        field_name, value_str, f_val
                    );
                    Decimal::ZERO
                }
            },
            Err(f_err) => {
                warn!(
                    "Failed to parse {} '{}': as Decimal (err: {}), and as f64 (err: {}). Falling back to ZERO.",
                    field_name, value_str, dec_err, f_err
                );
                Decimal::ZERO
            }
        },
    }
}

/// Generates a ledger reference id of the form `TXN-XXXXXXXXXX`.
pub fn new_reference_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("TXN-{}", suffix)
}
