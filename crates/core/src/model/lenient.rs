//! Permissive deserialization for authored rule fields.
//!
//! A rule field that is present but malformed (wrong type, `null`) falls back
//! to its `Default`, which for every rule is the vacuously-satisfied value.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Other(IgnoredAny),
}

pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Value(value) => Ok(value),
        Lenient::Other(_) => {
            tracing::warn!(
                field_type = std::any::type_name::<T>(),
                "malformed rule field; using permissive default"
            );
            Ok(T::default())
        }
    }
}
