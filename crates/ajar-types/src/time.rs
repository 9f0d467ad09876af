//! Timestamp wire format: RFC 3339 UTC with millisecond precision and a `Z`
//! suffix (`2025-01-01T00:00:00.000Z`), the shape JavaScript's
//! `toISOString` writes. Any RFC 3339 string is accepted on read.

use chrono::{SecondsFormat, SubsecRound};
use serde::{Deserialize, Deserializer, Serializer};

use crate::Timestamp;

/// Current time, truncated to the precision that survives a round trip.
pub fn now() -> Timestamp {
    chrono::Utc::now().trunc_subsecs(3)
}

pub fn format(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `#[serde(with = "crate::time::iso_millis")]`
pub mod iso_millis {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        Timestamp::deserialize(deserializer)
    }
}

/// Optional variant of [`iso_millis`].
pub mod iso_millis_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        ts: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_some(&format(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        Option::<Timestamp>::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_keeps_millis_and_z() {
        let ts: Timestamp = "2025-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(format(&ts), "2025-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_now_survives_round_trip() {
        let ts = now();
        let parsed: Timestamp = format(&ts).parse().unwrap();
        assert_eq!(parsed, ts);
    }
}
