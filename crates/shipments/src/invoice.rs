use serde::{Deserialize, Serialize};

use dovic_core::{DomainError, DomainResult, InvoiceNumber};

/// Tax rate (percent) by destination country.
///
/// Country matching is case-insensitive on the trimmed name. Unlisted
/// countries are zero-rated.
pub fn tax_rate_percent_for(country: &str) -> f64 {
    match country.trim().to_lowercase().as_str() {
        "nigeria" => 7.5,
        "united kingdom" | "uk" | "great britain" => 20.0,
        _ => 0.0,
    }
}

/// Invoice sub-record attached to every shipment.
///
/// Payment fields are recorded, not settled. The computation is deterministic:
/// identical (subtotal, country, discount) inputs always produce identical
/// stored values, so the record is reproducible for auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: InvoiceNumber,
    pub subtotal: f64,
    pub tax_rate_percent: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
    pub currency: String,
}

impl Invoice {
    pub const DEFAULT_CURRENCY: &'static str = "USD";

    /// Compute the invoice from the agreed price and the country tax table.
    ///
    /// `tax = subtotal * rate / 100`, `total = subtotal + tax - discount`.
    pub fn compute(
        number: InvoiceNumber,
        subtotal: f64,
        country: &str,
        discount: f64,
    ) -> DomainResult<Self> {
        if !(subtotal >= 0.0) {
            return Err(DomainError::validation("subtotal must not be negative"));
        }
        if !(discount >= 0.0) {
            return Err(DomainError::validation("discount must not be negative"));
        }

        let tax_rate_percent = tax_rate_percent_for(country);
        let tax = subtotal * tax_rate_percent / 100.0;
        let total = subtotal + tax - discount;
        if total < 0.0 {
            return Err(DomainError::validation(
                "discount exceeds subtotal plus tax",
            ));
        }

        Ok(Self {
            number,
            subtotal,
            tax_rate_percent,
            tax,
            discount,
            total,
            currency: Self::DEFAULT_CURRENCY.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn number() -> InvoiceNumber {
        InvoiceNumber::generate(Utc::now())
    }

    #[test]
    fn nigeria_is_taxed_at_seven_point_five_percent() {
        let inv = Invoice::compute(number(), 100.0, "Nigeria", 0.0).unwrap();
        assert_eq!(inv.tax_rate_percent, 7.5);
        assert_eq!(inv.tax, 7.5);
        assert_eq!(inv.total, 107.5);
        assert_eq!(inv.currency, "USD");
    }

    #[test]
    fn united_kingdom_is_taxed_at_twenty_percent() {
        let inv = Invoice::compute(number(), 250.0, "United Kingdom", 0.0).unwrap();
        assert_eq!(inv.tax_rate_percent, 20.0);
        assert_eq!(inv.tax, 50.0);
        assert_eq!(inv.total, 300.0);
    }

    #[test]
    fn unlisted_country_is_zero_rated() {
        let inv = Invoice::compute(number(), 100.0, "United States", 0.0).unwrap();
        assert_eq!(inv.tax, 0.0);
        assert_eq!(inv.total, 100.0);
    }

    #[test]
    fn country_matching_is_case_insensitive() {
        assert_eq!(tax_rate_percent_for("  nIgErIa "), 7.5);
        assert_eq!(tax_rate_percent_for("uk"), 20.0);
    }

    #[test]
    fn discount_is_subtracted_after_tax() {
        let inv = Invoice::compute(number(), 100.0, "Nigeria", 10.0).unwrap();
        assert_eq!(inv.total, 97.5);
    }

    #[test]
    fn excessive_discount_is_rejected() {
        assert!(Invoice::compute(number(), 100.0, "United States", 150.0).is_err());
    }

    #[test]
    fn negative_inputs_are_rejected() {
        assert!(Invoice::compute(number(), -1.0, "Nigeria", 0.0).is_err());
        assert!(Invoice::compute(number(), 100.0, "Nigeria", -5.0).is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the stored total always equals subtotal + tax -
            /// discount, and recomputation from the same inputs reproduces
            /// the record byte-for-byte.
            #[test]
            fn total_identity_holds_and_is_reproducible(
                subtotal in 0.0f64..1_000_000.0,
                discount_fraction in 0.0f64..1.0,
                country_idx in 0usize..4,
            ) {
                let country = ["Nigeria", "United Kingdom", "Ghana", "United States"][country_idx];
                let discount = subtotal * discount_fraction;
                let number = number();

                let a = Invoice::compute(number.clone(), subtotal, country, discount).unwrap();
                prop_assert_eq!(a.total, a.subtotal + a.tax - a.discount);

                let b = Invoice::compute(number, subtotal, country, discount).unwrap();
                prop_assert_eq!(a, b);
            }
        }
    }
}
