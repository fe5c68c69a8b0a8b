use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt::Display, ops::Add};
use time::{
    format_description::well_known::{Iso8601, Rfc3339},
    Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset,
};

/// RFC 3339 on the wire. Timestamps without an offset are assumed to be UTC.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(PrimitiveDateTime);

impl UtcDateTime {
    pub fn assume_utc(datetime: PrimitiveDateTime) -> UtcDateTime {
        UtcDateTime(datetime)
    }

    pub fn now() -> UtcDateTime {
        UtcDateTime::from(OffsetDateTime::now_utc())
    }

    pub fn parse(value: &str) -> Result<UtcDateTime, time::error::Parse> {
        match OffsetDateTime::parse(value, &Rfc3339) {
            Ok(datetime) => Ok(UtcDateTime::from(datetime)),
            Err(_) => PrimitiveDateTime::parse(value, &Iso8601::DEFAULT).map(UtcDateTime),
        }
    }

    pub fn from_unix_millis(millis: i64) -> Option<UtcDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000)
            .ok()
            .map(UtcDateTime::from)
    }

    pub fn unix_millis(&self) -> i64 {
        (OffsetDateTime::from(*self).unix_timestamp_nanos() / 1_000_000) as i64
    }
}

impl From<OffsetDateTime> for UtcDateTime {
    fn from(value: OffsetDateTime) -> Self {
        let value_utc = value.to_offset(UtcOffset::UTC);
        UtcDateTime(PrimitiveDateTime::new(value_utc.date(), value_utc.time()))
    }
}

impl From<UtcDateTime> for OffsetDateTime {
    fn from(value: UtcDateTime) -> Self {
        value.0.assume_utc()
    }
}

impl Add<Duration> for UtcDateTime {
    type Output = UtcDateTime;

    fn add(self, rhs: Duration) -> Self::Output {
        UtcDateTime(self.0 + rhs)
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match OffsetDateTime::from(*self).format(&Rfc3339) {
            Ok(formatted) => f.write_str(&formatted),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted = OffsetDateTime::from(*self)
            .format(&Rfc3339)
            .map_err(ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        UtcDateTime::parse(&value).map_err(de::Error::custom)
    }
}
