//! Wall-clock formats shared by the wire contract, persistence, and speech output.
//!
//! All engine timestamps are second-resolution `NaiveDateTime` values in a
//! single reference timezone. The wire/persistence format is
//! `YYYY-MM-DD HH:MM:SS`; spoken output uses a natural `%B %d at %I:%M %p`
//! rendering.

use chrono::NaiveDateTime;

/// Timestamp format used by the NLU wire contract and the persisted document.
pub const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SPOKEN_FORMAT: &str = "%B %d at %I:%M %p";

/// Render a timestamp in the wire format.
pub fn to_wire(ts: NaiveDateTime) -> String {
    ts.format(WIRE_FORMAT).to_string()
}

/// Parse a wire-format timestamp.
pub fn from_wire(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s.trim(), WIRE_FORMAT)
}

/// Render a timestamp the way it should be spoken ("April 02 at 02:21 AM").
pub fn spoken(ts: NaiveDateTime) -> String {
    ts.format(SPOKEN_FORMAT).to_string()
}

/// Serde adapter for `NaiveDateTime` fields in the wire format.
pub mod wire {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_wire(*ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::from_wire(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional `NaiveDateTime` fields in the wire format.
pub mod wire_opt {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        ts: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_some(&super::to_wire(*ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            Some(raw) => super::from_wire(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 2)
            .expect("valid date")
            .and_hms_opt(2, 21, 0)
            .expect("valid time")
    }

    #[test]
    fn wire_round_trip() {
        let ts = sample_ts();
        let wire = to_wire(ts);
        assert_eq!(wire, "2026-04-02 02:21:00");
        assert_eq!(from_wire(&wire).expect("parse"), ts);
    }

    #[test]
    fn from_wire_trims_whitespace() {
        assert_eq!(
            from_wire("  2026-04-02 02:21:00 ").expect("parse"),
            sample_ts()
        );
    }

    #[test]
    fn spoken_uses_natural_rendering() {
        assert_eq!(spoken(sample_ts()), "April 02 at 02:21 AM");
    }

}
