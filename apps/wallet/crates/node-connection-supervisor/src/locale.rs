//! Localized default status text.
//!
//! Until the connector reports its first tick the UI shows "connecting to
//! {server}" in the user's language.

/// Templates keyed by language subtag. `{server}` is replaced verbatim.
const CONNECTING_TEMPLATES: &[(&str, &str)] = &[
    ("en", "Connecting to API server: {server}"),
    ("de", "Verbindung zum API-Server wird hergestellt: {server}"),
    ("es", "Conectando al servidor API: {server}"),
    ("fr", "Connexion au serveur API : {server}"),
    ("it", "Connessione al server API: {server}"),
    ("ru", "Подключение к API-серверу: {server}"),
    ("zh", "正在连接 API 服务器: {server}"),
];

const FALLBACK_LANGUAGE: &str = "en";

/// Language subtag of a locale identifier: `de-AT` and `de_AT` give `de`.
pub fn language_of(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a template exists for the locale's language.
pub fn is_supported(locale: &str) -> bool {
    let language = language_of(locale);
    CONNECTING_TEMPLATES.iter().any(|(lang, _)| *lang == language)
}

/// Default status shown while an attempt has not reported anything yet.
///
/// `server` is inserted unmodified, including when it is empty.
pub fn connecting_message(locale: &str, server: &str) -> String {
    let language = language_of(locale);
    let template = CONNECTING_TEMPLATES
        .iter()
        .find(|(lang, _)| *lang == language)
        .or_else(|| {
            CONNECTING_TEMPLATES
                .iter()
                .find(|(lang, _)| *lang == FALLBACK_LANGUAGE)
        })
        .map(|(_, template)| *template)
        .unwrap_or("{server}");
    template.replace("{server}", server)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_template() {
        assert_eq!(
            connecting_message("en", "node1.example.com"),
            "Connecting to API server: node1.example.com"
        );
    }

    #[test]
    fn region_subtags_use_language() {
        assert_eq!(language_of("de-AT"), "de");
        assert_eq!(language_of("fr_CA"), "fr");
        assert!(connecting_message("de-AT", "n").starts_with("Verbindung"));
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        assert!(!is_supported("tlh"));
        assert_eq!(connecting_message("tlh", "n"), "Connecting to API server: n");
        assert_eq!(connecting_message("", "n"), "Connecting to API server: n");
    }

    #[test]
    fn empty_server_is_kept_verbatim() {
        assert_eq!(connecting_message("en", ""), "Connecting to API server: ");
    }

    #[test]
    fn every_template_has_placeholder() {
        for (lang, template) in CONNECTING_TEMPLATES {
            assert!(template.contains("{server}"), "{lang} template lacks placeholder");
        }
    }
}
