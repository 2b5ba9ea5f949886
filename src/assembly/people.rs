//! Person list resolution.
//!
//! The form submits each role group (RRECL officials, guest trainers, chief
//! guests, guidance) as positionally aligned arrays of arbitrary length.
//! Resolution keeps a row iff it has a name or a designation after trimming
//! and preserves submission order; there is no failure mode.

use std::collections::HashMap;

use super::request::PersonEntry;

/// Normalize every submitted person group. Groups that end up empty stay in
/// the map so the assembler can collapse their template region.
pub fn resolve_person_groups(
    raw: HashMap<String, Vec<PersonEntry>>,
) -> HashMap<String, Vec<PersonEntry>> {
    raw.into_iter()
        .map(|(group, rows)| {
            let kept = rows
                .into_iter()
                .filter(|row| {
                    !row.name.trim().is_empty() || !row.designation.trim().is_empty()
                })
                .map(|row| PersonEntry {
                    prefix: row.prefix.trim().to_string(),
                    name: row.name.trim().to_string(),
                    designation: row.designation.trim().to_string(),
                })
                .collect();
            (group, kept)
        })
        .collect()
}

/// Render one resolved entry the way the reports print people:
/// "Prefix Name (Designation)", omitting whichever parts are absent.
pub fn person_line(entry: &PersonEntry) -> String {
    let mut line = String::new();
    if !entry.prefix.is_empty() {
        line.push_str(&entry.prefix);
        line.push(' ');
    }
    line.push_str(&entry.name);
    if !entry.designation.is_empty() {
        if entry.name.is_empty() {
            line.push_str(&entry.designation);
        } else {
            line.push_str(&format!(" ({})", entry.designation));
        }
    }
    line.trim().to_string()
}
