//! Search and display ordering

use shared::models::Member;

/// Case-insensitive substring match against `name` or `phone`.
///
/// A trimmed query shorter than `minimum_length` characters (or an empty
/// query) returns the whole collection unfiltered. The threshold is a caller
/// policy; public pages and the admin panel use different values.
pub fn filter_members(members: &[Member], query: &str, minimum_length: usize) -> Vec<Member> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() || needle.chars().count() < minimum_length {
        return members.to_vec();
    }

    members
        .iter()
        .filter(|m| {
            m.name.to_lowercase().contains(&needle) || m.phone.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Alphabetical by name, case-insensitive; id breaks ties
pub fn sort_for_display(members: &mut [Member]) {
    members.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.id.cmp(&b.id))
    });
}
