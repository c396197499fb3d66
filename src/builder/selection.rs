//! `databaseId` variant selection
//!
//! Shared by statements, fragments and key probes. A mapper is walked once
//! with the active dialect required and once with no dialect required, so a
//! dialect-tagged variant is only ever accepted by the first walk and an
//! untagged one only by the second.

/// Decide whether a definition should be registered.
///
/// `previous` is `None` when nothing is registered under the definition's id
/// yet, otherwise `Some(database_id)` of the registered variant.
pub fn database_id_matches(
    previous: Option<Option<&str>>,
    database_id: Option<&str>,
    required_database_id: Option<&str>,
) -> bool {
    if let Some(required) = required_database_id {
        return database_id == Some(required);
    }
    if database_id.is_some() {
        return false;
    }
    match previous {
        None => true,
        // An untagged definition yields to an already registered dialect-specific one
        Some(previous_database_id) => previous_database_id.is_none(),
    }
}
