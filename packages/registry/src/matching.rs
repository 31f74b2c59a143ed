//! Free-text local government area name matching.
//!
//! Boundary services and councils spell LGA names inconsistently
//! ("SUNSHINE COAST REGIONAL", "Sunshine Coast Council", "City of Gold
//! Coast"). Both sides of a lookup are reduced to a bare place name with
//! [`normalize_lga_name`] before comparison.

/// Administrative suffixes removed from the end of a name, longest first.
const SUFFIXES: &[&str] = &[
    "aboriginal shire council",
    "regional council",
    "city council",
    "shire council",
    "town council",
    "council",
    "regional",
    "city",
    "shire",
];

/// Administrative prefixes removed from the start of a name.
const PREFIXES: &[&str] = &["city of ", "shire of ", "town of "];

/// Reduces a local government area name to a comparable key.
///
/// Lower-cases, replaces punctuation and underscores with spaces,
/// collapses whitespace, then strips administrative prefixes and
/// suffixes. If stripping would leave nothing (e.g. the input is just
/// `"City"`), the cleaned name is returned unstripped.
#[must_use]
pub fn normalize_lga_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut name = cleaned.as_str();
    for prefix in PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            name = rest;
            break;
        }
    }

    loop {
        let stripped = SUFFIXES.iter().find_map(|suffix| {
            name.strip_suffix(suffix)
                .filter(|rest| rest.is_empty() || rest.ends_with(' '))
                .map(str::trim_end)
        });
        match stripped {
            Some(rest) if !rest.is_empty() => name = rest,
            _ => break,
        }
    }

    if name.is_empty() {
        cleaned
    } else {
        name.to_string()
    }
}
