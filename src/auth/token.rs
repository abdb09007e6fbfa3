//! The token stored in the auth cookie and how it is (de)serialized.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::UserID;

mod datetime_format {
    //! Serializes a [time::OffsetDateTime] with a fixed width time of day.
    //!
    //! The default format writes midnight as "0:00:00.0", which fails to
    //! parse again because the hour is expected to have two digits.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the token expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(date_time: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date_time
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&text, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Identifies the logged in user and when their session ends.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(with = "datetime_format")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Whether the session has ended at `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}
