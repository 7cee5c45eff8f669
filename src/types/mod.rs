// markshelf shared type definitions
// Value types handed across the store boundary, plus errors and settings.

pub mod bookmark;
pub mod errors;
pub mod folder;
pub mod settings;
pub mod tag;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) when deserializing patch types.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
