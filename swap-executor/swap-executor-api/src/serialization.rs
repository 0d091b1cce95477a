//! Serialization helpers for the swap executor API

/// A module for serializing and deserializing U256 as decimal strings
pub mod u256_string_serialization {
    use alloy_primitives::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize a U256 to a decimal string
    pub fn serialize<S: Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    /// Deserialize a decimal string to a U256
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        let s = String::deserialize(d)?;
        U256::from_str_radix(&s, 10).map_err(|_| D::Error::custom("Invalid U256 value"))
    }
}

/// A module for serializing and deserializing an optional U256 as a decimal
/// string
pub mod option_u256_string_serialization {
    use alloy_primitives::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize an optional U256 to a decimal string
    pub fn serialize<S: Serializer>(value: &Option<U256>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_some(&v.to_string()),
            None => s.serialize_none(),
        }
    }

    /// Deserialize an optional decimal string to a U256
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<U256>, D::Error> {
        let s = Option::<String>::deserialize(d)?;
        s.map(|s| U256::from_str_radix(&s, 10).map_err(|_| D::Error::custom("Invalid U256 value")))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;
    use serde::{Deserialize, Serialize};

    /// A wrapper exercising both helpers
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Amounts {
        /// A required amount
        #[serde(with = "super::u256_string_serialization")]
        amount: U256,
        /// An optional amount
        #[serde(default, with = "super::option_u256_string_serialization")]
        min_amount: Option<U256>,
    }

    /// Amounts larger than u128 survive serialization as decimal strings
    #[test]
    fn test_large_amount_decimal_string() {
        let amount = U256::from(u128::MAX) * U256::from(10u8);
        let value = Amounts { amount, min_amount: None };

        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["amount"], "3402823669209384634633746074317682114550");

        let parsed: Amounts = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, value);
    }

    /// Hex strings are not accepted where the service sends decimals
    #[test]
    fn test_rejects_hex_amount() {
        let json = serde_json::json!({ "amount": "0x10" });
        assert!(serde_json::from_value::<Amounts>(json).is_err());
    }

    /// A missing optional amount deserializes to `None`
    #[test]
    fn test_missing_optional_amount() {
        let json = serde_json::json!({ "amount": "42" });
        let parsed: Amounts = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.amount, U256::from(42u8));
        assert_eq!(parsed.min_amount, None);
    }
}
