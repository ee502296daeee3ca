//! Fixed-point math utilities for deterministic simulation.
//!
//! Fleet speeds and interpolation parameters are fractional, but the
//! simulation must produce identical results on every client replaying
//! the same orders. Floating-point operations can round differently on
//! different CPUs, so every fractional value in the core is fixed-point.

use fixed::types::I32F32;

/// Fixed-point number type for all fractional simulation values.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Truncate a non-negative fixed-point value to a whole count.
///
/// Negative values clamp to zero.
#[must_use]
pub fn whole_part(value: Fixed) -> u32 {
    if value <= Fixed::ZERO {
        return 0;
    }
    value.floor().to_num::<u32>()
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for human-authored fixed-point values.
///
/// Scenario files write speeds as decimal literals (`2.5`). The value is
/// converted once at load time; after that only the fixed-point form exists.
pub mod decimal_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a fixed-point number as a decimal literal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.to_num::<f64>())
    }

    /// Deserialize a decimal literal into a fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("value {raw} out of range")))
    }
}
