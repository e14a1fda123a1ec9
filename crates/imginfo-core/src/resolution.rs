//! Print resolution (DPI) lookup from container metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::probe::{MetaValue, Metadata, DPI_KEY};

/// Resolution assumed when a file declares none.
pub const DEFAULT_DPI: f64 = 72.0;

/// Horizontal and vertical dots per inch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            x: DEFAULT_DPI,
            y: DEFAULT_DPI,
        }
    }
}

impl Resolution {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Check if this is the fallback resolution.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.x, self.y)
    }
}

fn positive(value: &MetaValue) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite() && *v > 0.0)
}

/// Resolve the DPI declared in `metadata`.
///
/// Only a two-component list of positive numbers is accepted; anything else
/// falls back to 72 × 72.
pub fn resolution(metadata: &Metadata) -> Resolution {
    match metadata.get(DPI_KEY) {
        Some(MetaValue::List(items)) if items.len() == 2 => {
            match (positive(&items[0]), positive(&items[1])) {
                (Some(x), Some(y)) => Resolution::new(x, y),
                _ => Resolution::default(),
            }
        }
        _ => Resolution::default(),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn with_dpi(value: MetaValue) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(DPI_KEY, value);
        metadata
    }

    proptest! {
        /// Property: well-formed positive pairs are reported exactly.
        #[test]
        fn prop_positive_pair_is_exact(x in 1u32..=10_000, y in 1u32..=10_000) {
            let res = resolution(&with_dpi(MetaValue::pair(f64::from(x), f64::from(y))));
            prop_assert_eq!(res.to_string(), format!("{} × {}", x, y));
        }

        /// Property: a non-positive component always falls back to 72 × 72.
        #[test]
        fn prop_non_positive_component_defaults(
            good in 0.5f64..10_000.0,
            bad in -10_000.0f64..=0.0,
            swap in any::<bool>(),
        ) {
            let value = if swap { MetaValue::pair(bad, good) } else { MetaValue::pair(good, bad) };
            prop_assert_eq!(resolution(&with_dpi(value)).to_string(), "72 × 72");
        }

        /// Property: lists of any other arity fall back to 72 × 72.
        #[test]
        fn prop_wrong_arity_defaults(values in prop::collection::vec(1i64..1000, 0..6)) {
            prop_assume!(values.len() != 2);
            let list = MetaValue::List(values.into_iter().map(MetaValue::Int).collect());
            prop_assert!(resolution(&with_dpi(list)).is_default());
        }
    }
}
