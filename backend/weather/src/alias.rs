//! Lookup table remapping renamed cities to the names the weather API
//! still indexes them under.

/// Display name -> API legacy name.
const CITY_ALIASES: &[(&str, &str)] = &[
    // Alaska: Utqiagvik (formerly Barrow)
    ("Utqiagvik", "Barrow"),
    ("Utqiagvik, US", "Barrow, US"),
    ("Utqiagvik, Alaska", "Barrow, Alaska"),
];

/// Resolve the name to query the API with. Unmapped names pass through.
pub fn api_city_name(display_name: &str) -> &str {
    CITY_ALIASES
        .iter()
        .find(|(display, _)| *display == display_name)
        .map(|(_, api)| *api)
        .unwrap_or(display_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renamed_city_resolves_to_legacy_name() {
        assert_eq!(api_city_name("Utqiagvik"), "Barrow");
        assert_eq!(api_city_name("Utqiagvik, Alaska"), "Barrow, Alaska");
    }

    #[test]
    fn test_unmapped_city_passes_through() {
        assert_eq!(api_city_name("San Francisco"), "San Francisco");
    }
}
