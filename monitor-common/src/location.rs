//! location codes

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Deployment region of a monitored node.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Location {
    Bj,
    Hk,
    Gz,
    Hz,
    Sz,
    Sh,
    Zq,
}

impl Location {
    /// All codes in declaration order.
    pub fn codes() -> Vec<&'static str> {
        Location::iter().map(<&'static str>::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parse_every_code() {
        for code in ["bj", "hk", "gz", "hz", "sz", "sh", "zq"] {
            let location = Location::from_str(code).unwrap();
            assert_eq!(location.as_ref(), code);
            assert_eq!(<&'static str>::from(location), code);
        }
        assert_eq!(
            Location::codes(),
            ["bj", "hk", "gz", "hz", "sz", "sh", "zq"]
        );
        assert_eq!(Location::Sz.to_string(), "sz");
    }

    #[test]
    fn reject_unknown_or_padded() {
        for code in ["", "xx", "BJ", "Sh", " bj", "bj ", "bjhk", "(bj)"] {
            assert!(Location::from_str(code).is_err(), "{code:?} accepted");
        }
    }

    #[test]
    fn serde_as_code() {
        assert_eq!(serde_json::to_string(&Location::Hk).unwrap(), "\"hk\"");
        let l: Location = serde_json::from_str("\"zq\"").unwrap();
        assert_eq!(l, Location::Zq);
    }
}
