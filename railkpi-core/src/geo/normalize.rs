//! Name normalization used to join free-text region names to boundary features.

/// Lowercase and keep only ASCII letters and digits.
///
/// `"Jawa Barat"`, `"JAWA-BARAT"` and `"jawa_barat"` all become `"jawabarat"`.
/// Non-ASCII letters are dropped, matching identifiers built the same way.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_case_and_spacing() {
        assert_eq!(normalize_name("Jawa Barat"), "jawabarat");
        assert_eq!(normalize_name("  JAWA-BARAT. "), "jawabarat");
        assert_eq!(normalize_name("jawa_barat"), "jawabarat");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(normalize_name("Region 12B"), "region12b");
    }

    #[test]
    fn empty_and_symbol_only() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("--- !!"), "");
    }

    #[test]
    fn non_ascii_letters_dropped() {
        assert_eq!(normalize_name("Daerah Istimewa Yogyakartá"), "daerahistimewayogyakart");
    }
}
