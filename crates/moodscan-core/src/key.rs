//! Musical key label encoding
//!
//! Major keys map to 0..=11 and minor keys to 12..=23, both in chromatic order
//! starting at C. Sharp and flat spellings of the same pitch share a code.

/// Code used for labels outside the vocabulary ("C Major")
pub const FALLBACK_KEY_CODE: u8 = 0;

/// Every accepted label with its code
pub const KEY_LABELS: [(&str, u8); 34] = [
    ("C Major", 0),
    ("C# Major", 1),
    ("Db Major", 1),
    ("D Major", 2),
    ("D# Major", 3),
    ("Eb Major", 3),
    ("E Major", 4),
    ("F Major", 5),
    ("F# Major", 6),
    ("Gb Major", 6),
    ("G Major", 7),
    ("G# Major", 8),
    ("Ab Major", 8),
    ("A Major", 9),
    ("A# Major", 10),
    ("Bb Major", 10),
    ("B Major", 11),
    ("C Minor", 12),
    ("C# Minor", 13),
    ("Db Minor", 13),
    ("D Minor", 14),
    ("D# Minor", 15),
    ("Eb Minor", 15),
    ("E Minor", 16),
    ("F Minor", 17),
    ("F# Minor", 18),
    ("Gb Minor", 18),
    ("G Minor", 19),
    ("G# Minor", 20),
    ("Ab Minor", 20),
    ("A Minor", 21),
    ("A# Minor", 22),
    ("Bb Minor", 22),
    ("B Minor", 23),
];

/// Exact, case-sensitive lookup
pub fn lookup_key_code(label: &str) -> Option<u8> {
    KEY_LABELS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|&(_, code)| code)
}

/// Encode a key label, falling back to [`FALLBACK_KEY_CODE`] for unknown labels.
///
/// The fallback keeps compatibility with hosts that send labels outside the
/// vocabulary; it is logged so that it does not go unnoticed.
pub fn encode_key_label(label: &str) -> u8 {
    match lookup_key_code(label) {
        Some(code) => code,
        None => {
            log::warn!(
                "Unrecognized key label {:?}, encoding as {} (C Major)",
                label,
                FALLBACK_KEY_CODE
            );
            FALLBACK_KEY_CODE
        }
    }
}

/// True when the label names a minor key (case-sensitive substring match)
pub fn is_minor_label(label: &str) -> bool {
    label.contains("Minor")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_label_in_range() {
        for (label, code) in KEY_LABELS {
            assert_eq!(encode_key_label(label), code);
            assert!(code < 24, "{} out of range", label);
        }
    }

    #[test]
    fn test_all_codes_covered() {
        let mut seen = [false; 24];
        for (_, code) in KEY_LABELS {
            seen[code as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_enharmonic_pairs() {
        let pairs = [
            ("C# Major", "Db Major"),
            ("D# Major", "Eb Major"),
            ("F# Major", "Gb Major"),
            ("G# Major", "Ab Major"),
            ("A# Major", "Bb Major"),
            ("C# Minor", "Db Minor"),
            ("D# Minor", "Eb Minor"),
            ("F# Minor", "Gb Minor"),
            ("G# Minor", "Ab Minor"),
            ("A# Minor", "Bb Minor"),
        ];
        for (sharp, flat) in pairs {
            assert_eq!(encode_key_label(sharp), encode_key_label(flat));
        }
    }

    #[test]
    fn test_major_minor_offsets() {
        assert_eq!(encode_key_label("C Major"), 0);
        assert_eq!(encode_key_label("B Major"), 11);
        assert_eq!(encode_key_label("C Minor"), 12);
        assert_eq!(encode_key_label("A Minor"), 21);
        assert_eq!(encode_key_label("B Minor"), 23);
    }

    #[test]
    fn test_unknown_label_falls_back() {
        assert_eq!(encode_key_label("H Major"), 0);
        assert_eq!(encode_key_label("c major"), 0);
        assert_eq!(encode_key_label(""), 0);
        assert_eq!(lookup_key_code("a minor"), None);
    }

    #[test]
    fn test_is_minor_label() {
        assert!(is_minor_label("A Minor"));
        assert!(!is_minor_label("A minor"));
        assert!(!is_minor_label("C Major"));
    }
}
