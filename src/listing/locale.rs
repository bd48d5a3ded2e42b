//! Listing locales
//!
//! The handful of strings a directory listing shows, per language.

use crate::http::negotiate::preferred_language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    pub tag: &'static str,
    pub index_of: &'static str,
    pub name: &'static str,
    pub size: &'static str,
    pub modified: &'static str,
    pub parent: &'static str,
}

pub const EN: Locale = Locale {
    tag: "en",
    index_of: "Index of",
    name: "Name",
    size: "Size",
    modified: "Last modified",
    parent: "Parent directory",
};

pub const DE: Locale = Locale {
    tag: "de",
    index_of: "Inhalt von",
    name: "Name",
    size: "Größe",
    modified: "Zuletzt geändert",
    parent: "Übergeordnetes Verzeichnis",
};

pub const FR: Locale = Locale {
    tag: "fr",
    index_of: "Index de",
    name: "Nom",
    size: "Taille",
    modified: "Dernière modification",
    parent: "Répertoire parent",
};

pub const ES: Locale = Locale {
    tag: "es",
    index_of: "Índice de",
    name: "Nombre",
    size: "Tamaño",
    modified: "Última modificación",
    parent: "Directorio superior",
};

pub const LOCALES: [Locale; 4] = [EN, DE, FR, ES];

const TAGS: [&str; 4] = [EN.tag, DE.tag, FR.tag, ES.tag];

/// Find a locale by language tag; only the primary subtag is considered
pub fn by_tag(tag: &str) -> Option<Locale> {
    let primary = tag
        .split(['-', '_', '.'])
        .next()
        .unwrap_or(tag);
    LOCALES
        .iter()
        .copied()
        .find(|l| l.tag.eq_ignore_ascii_case(primary))
}

/// Locale of the running process, from the usual POSIX variables
pub fn process_default() -> Locale {
    default_from(|var| std::env::var(var).ok())
}

/// First of `LC_ALL`, `LC_MESSAGES`, `LANG` naming a known locale; `C` and
/// `POSIX` are passed over like unset variables
fn default_from<F>(lookup: F) -> Locale
where
    F: Fn(&str) -> Option<String>,
{
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| lookup(var))
        .find_map(|v| by_tag(&v))
        .unwrap_or(EN)
}

/// Pick the listing locale for a request
pub fn negotiate(accept_language: Option<&str>, default: Locale) -> Locale {
    preferred_language(accept_language, &TAGS)
        .and_then(by_tag)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_default_skips_unmapped_values() {
        assert_eq!(default_from(env(&[("LC_ALL", "C"), ("LANG", "de_DE.UTF-8")])), DE);
        assert_eq!(default_from(env(&[("LC_ALL", "POSIX"), ("LC_MESSAGES", ""), ("LANG", "fr_FR")])), FR);
        assert_eq!(default_from(env(&[("LC_ALL", "es_ES"), ("LANG", "de_DE")])), ES);
        assert_eq!(default_from(env(&[("LANG", "C.UTF-8")])), EN);
        assert_eq!(default_from(env(&[])), EN);
    }

    #[test]
    fn test_by_tag() {
        assert_eq!(by_tag("de_DE.UTF-8"), Some(DE));
        assert_eq!(by_tag("fr-CA"), Some(FR));
        assert_eq!(by_tag("EN"), Some(EN));
        assert_eq!(by_tag("C"), None);
    }

    #[test]
    fn test_negotiate() {
        assert_eq!(negotiate(Some("es-MX,es;q=0.9"), EN), ES);
        assert_eq!(negotiate(Some("ja"), DE), DE);
        assert_eq!(negotiate(None, FR), FR);
    }
}
