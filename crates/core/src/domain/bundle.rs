use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a catalog bundle, unique within a provider feed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BundleId(pub String);

impl BundleId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

/// A sellable data bundle as synced from a provider catalog.
///
/// Field names follow the storefront JSON documents, hence camelCase on the
/// wire. `dataAmountMB` keeps its historical casing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub id: BundleId,
    pub name: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub countries: Vec<String>,
    pub validity_in_days: u32,
    pub base_price: Decimal,
    pub currency: String,
    #[serde(default)]
    pub is_unlimited: bool,
    #[serde(rename = "dataAmountMB", default)]
    pub data_amount_mb: Option<i64>,
}

impl Bundle {
    /// True when both bundles advertise at least one common group.
    pub fn shares_group(&self, other: &Bundle) -> bool {
        self.groups.iter().any(|group| other.groups.contains(group))
    }

    /// True when both bundles cover at least one common country.
    pub fn shares_country(&self, other: &Bundle) -> bool {
        self.countries
            .iter()
            .any(|country| other.countries.contains(country))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(groups: &[&str], countries: &[&str]) -> Bundle {
        Bundle {
            id: BundleId::new("bnd-1"),
            name: "Europe 7 Days".to_string(),
            groups: groups.iter().map(|value| value.to_string()).collect(),
            countries: countries.iter().map(|value| value.to_string()).collect(),
            validity_in_days: 7,
            base_price: Decimal::new(1000, 2),
            currency: "USD".to_string(),
            is_unlimited: false,
            data_amount_mb: Some(5_000),
        }
    }

    #[test]
    fn shares_group_requires_overlap() {
        let left = bundle(&["standard"], &["IT"]);
        let right = bundle(&["standard", "promo"], &["FR"]);
        let disjoint = bundle(&["unlimited"], &["IT"]);

        assert!(left.shares_group(&right));
        assert!(!left.shares_group(&disjoint));
    }

    #[test]
    fn shares_country_requires_overlap() {
        let left = bundle(&["standard"], &["IT", "FR"]);
        let right = bundle(&["standard"], &["FR", "ES"]);
        let disjoint = bundle(&["standard"], &["JP"]);

        assert!(left.shares_country(&right));
        assert!(!left.shares_country(&disjoint));
    }

    #[test]
    fn wire_format_is_camel_case() {
        let encoded = serde_json::to_value(bundle(&["standard"], &["IT"])).unwrap();

        assert!(encoded.get("validityInDays").is_some());
        assert!(encoded.get("basePrice").is_some());
        assert!(encoded.get("isUnlimited").is_some());
        assert!(encoded.get("dataAmountMB").is_some());
    }

    #[test]
    fn decodes_with_missing_optional_fields() {
        let decoded: Bundle = serde_json::from_value(serde_json::json!({
            "id": "bnd-2",
            "name": "Asia 30 Days",
            "validityInDays": 30,
            "basePrice": "42.50",
            "currency": "USD",
        }))
        .unwrap();

        assert!(decoded.groups.is_empty());
        assert!(decoded.countries.is_empty());
        assert!(!decoded.is_unlimited);
        assert_eq!(decoded.data_amount_mb, None);
    }
}
