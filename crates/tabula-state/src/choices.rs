//! Choice lists offered by picker cells.
//!
//! Stored option lists keep duplicates; every picker shows them
//! deduplicated through [`dedup_choices`].

use tabula_model::Profile;
use tabula_normalize::dedup_choices;

use crate::grid::Cell;

/// Choices of a `select` or `user_dropdown` cell from its column options.
pub fn cell_choices(cell: &Cell) -> Vec<String> {
    cell.options
        .as_deref()
        .map(dedup_choices)
        .unwrap_or_default()
}

/// Usernames offered by `user_dropdown` cells, sorted, blank names skipped.
pub fn user_choices(profiles: &[Profile]) -> Vec<String> {
    let mut names: Vec<String> = profiles
        .iter()
        .filter_map(|profile| profile.username.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    names.sort();
    dedup_choices(&names)
}
