// 💱 Currency Transformer
// Pure step: USD market caps → GBP / EUR / INR columns, rounded to 2 decimals.

use crate::error::MissingRateError;
use crate::rates::RateTable;
use crate::records::{BankRecord, ConvertedRecord};

/// Currencies every rate table must provide
pub const REQUIRED_CURRENCIES: [&str; 3] = ["GBP", "EUR", "INR"];

/// Round to 2 decimals, ties to even on the scaled value (`np.round(x, 2)` parity)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Convert every record with the given rates. All required rates are looked up
/// before any record is touched, so a missing currency fails even an empty input.
pub fn transform(
    records: &[BankRecord],
    rates: &RateTable,
) -> Result<Vec<ConvertedRecord>, MissingRateError> {
    let gbp = rates.rate("GBP")?;
    let eur = rates.rate("EUR")?;
    let inr = rates.rate("INR")?;

    let converted = records
        .iter()
        .map(|bank| ConvertedRecord {
            bank: bank.clone(),
            market_cap_gbp: round2(bank.market_cap_usd * gbp),
            market_cap_eur: round2(bank.market_cap_usd * eur),
            market_cap_inr: round2(bank.market_cap_usd * inr),
        })
        .collect();

    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rates() -> RateTable {
        vec![("GBP", 0.8), ("EUR", 0.93), ("INR", 82.95)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_transform_test_bank() {
        let records = vec![BankRecord::new("Test Bank", 100.0)];

        let converted = transform(&records, &sample_rates()).unwrap();

        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].name(), "Test Bank");
        assert_eq!(converted[0].market_cap_usd(), 100.0);
        assert_eq!(converted[0].market_cap_gbp, 80.0);
        assert_eq!(converted[0].market_cap_eur, 93.0);
        assert_eq!(converted[0].market_cap_inr, 8295.0);

        println!("✅ Transform test PASSED");
    }

    #[test]
    fn test_transform_rounds_to_two_decimals() {
        let records = vec![BankRecord::new("JPMorgan Chase", 432.92)];

        let converted = transform(&records, &sample_rates()).unwrap();

        assert_eq!(converted[0].market_cap_gbp, 346.34);
        assert_eq!(converted[0].market_cap_eur, 402.62);
        assert_eq!(converted[0].market_cap_inr, 35910.71);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let records = vec![
            BankRecord::new("A", 432.92),
            BankRecord::new("B", 231.52),
            BankRecord::new("C", 0.015),
        ];
        let rates = sample_rates();

        let first = transform(&records, &rates).unwrap();
        let second = transform(&records, &rates).unwrap();

        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.market_cap_gbp.to_bits(), b.market_cap_gbp.to_bits());
            assert_eq!(a.market_cap_eur.to_bits(), b.market_cap_eur.to_bits());
            assert_eq!(a.market_cap_inr.to_bits(), b.market_cap_inr.to_bits());
        }
    }

    #[test]
    fn test_transform_preserves_order_and_duplicates() {
        let records = vec![
            BankRecord::new("HDFC Bank", 160.68),
            BankRecord::new("HDFC Bank", 160.68),
            BankRecord::new("Morgan Stanley", 140.83),
        ];

        let converted = transform(&records, &sample_rates()).unwrap();
        let names: Vec<&str> = converted.iter().map(|r| r.name()).collect();

        assert_eq!(names, vec!["HDFC Bank", "HDFC Bank", "Morgan Stanley"]);
    }

    #[test]
    fn test_missing_rate_is_fatal_even_when_empty() {
        let rates: RateTable = vec![("GBP", 0.8), ("EUR", 0.93)].into_iter().collect();

        let err = transform(&[], &rates).unwrap_err();
        assert_eq!(err.currency, "INR");
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.5), 2.5);
        assert_eq!(round2(-1.005), -1.0);
    }
}
