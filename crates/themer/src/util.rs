//! Name normalization helpers shared by discovery and resolution.

use deunicode::deunicode;

/// Normalizes a display name into a theme slug.
///
/// The name is transliterated to ASCII, lowercased, and every run of
/// non-alphanumeric characters becomes a single `-`. Leading and trailing
/// dashes are dropped.
///
/// ```rust
/// use themer::util::slugify;
///
/// assert_eq!(slugify("My Shop Theme"), "my-shop-theme");
/// assert_eq!(slugify("Café  Noir!"), "cafe-noir");
/// ```
pub fn slugify(name: &str) -> String {
    let transliterated = deunicode(name);
    let mut slug = String::with_capacity(transliterated.len());
    let mut pending_dash = false;

    for c in transliterated.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Converts a name to StudlyCase (`"dark-mode theme"` → `"DarkModeTheme"`).
///
/// Used to build conventional class namespaces such as `Theme\DarkMode\Livewire`.
pub fn studly(name: &str) -> String {
    deunicode(name)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Default"), "default");
        assert_eq!(slugify("Dark Mode"), "dark-mode");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Shop -- Theme  "), "shop-theme");
        assert_eq!(slugify("a_b.c"), "a-b-c");
    }

    #[test]
    fn test_slugify_transliterates() {
        assert_eq!(slugify("Thème Élégant"), "theme-elegant");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_studly() {
        assert_eq!(studly("default"), "Default");
        assert_eq!(studly("dark-mode"), "DarkMode");
        assert_eq!(studly("my shop_theme"), "MyShopTheme");
        assert_eq!(studly("pages"), "Pages");
    }
}
