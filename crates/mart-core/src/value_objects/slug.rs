//! URL slugs for listings and categories

use rand::distributions::Alphanumeric;
use rand::Rng;

const MAX_SLUG_LEN: usize = 80;

/// Lowercase, hyphen-separated ASCII slug. Azerbaijani letters are
/// transliterated; anything else outside `[a-z0-9]` becomes a separator.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        // 'İ' lowercases to 'i' plus a combining dot
        if ch == '\u{0307}' {
            continue;
        }
        let mapped = match ch {
            'ə' | 'ä' => Some('e'),
            'ı' | 'i' | 'î' => Some('i'),
            'ö' | 'ó' => Some('o'),
            'ü' | 'ú' => Some('u'),
            'ç' => Some('c'),
            'ş' => Some('s'),
            'ğ' => Some('g'),
            c if c.is_ascii_alphanumeric() => Some(c),
            _ => None,
        };

        match mapped {
            Some(c) => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            }
            None => pending_dash = true,
        }

        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    let trimmed = slug.trim_end_matches('-');
    if trimmed.is_empty() {
        "item".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Six lowercase alphanumerics for disambiguating colliding slugs
pub fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

pub fn with_suffix(base: &str, suffix: &str) -> String {
    format!("{base}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_slug() {
        assert_eq!(slugify("Red Bicycle"), "red-bicycle");
        assert_eq!(slugify("  iPhone 15 Pro -- 256GB!! "), "iphone-15-pro-256gb");
    }

    #[test]
    fn transliterates_azerbaijani() {
        assert_eq!(slugify("Şəki Çörəyi"), "seki-coreyi");
        assert_eq!(slugify("Ağ Güllü Işıq"), "ag-gullu-isiq");
    }

    #[test]
    fn empty_input_falls_back() {
        assert_eq!(slugify("!!!"), "item");
        assert_eq!(slugify(""), "item");
    }

    #[test]
    fn long_titles_are_truncated() {
        let slug = slugify(&"word ".repeat(50));
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn suffix_shape() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_eq!(with_suffix("red-bicycle", "ab12cd"), "red-bicycle-ab12cd");
    }
}
