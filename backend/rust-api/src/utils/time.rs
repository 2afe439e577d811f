use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;

/// `None` when the stored value lies outside chrono's representable range.
pub fn bson_to_chrono(dt: BsonDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(dt.timestamp_millis())
}
