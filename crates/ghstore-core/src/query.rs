// Turning user input into GitHub search query strings
use crate::models::Platform;

/// Build the provider query string for a user search.
///
/// Pure and stateless: blank input falls back to a popularity floor,
/// multi-word input is quoted so GitHub treats it as a phrase, and every
/// query is scoped to name/description/readme on live, non-fork repos.
pub fn build_search_query(user_query: &str, platform: Platform) -> String {
    let clean = user_query.trim();
    let q = if clean.is_empty() {
        "stars:>100".to_string()
    } else if clean.chars().any(char::is_whitespace) {
        format!("\"{}\"", clean)
    } else {
        clean.to_string()
    };

    format!(
        "{} in:name,description,readme archived:false fork:false{}",
        q,
        platform_hint(platform)
    )
    .trim()
    .to_string()
}

/// Platform hint clause appended to search queries.
///
/// These bias the candidate pool toward repos likely to ship installers for
/// the platform; verification still has the final say.
pub(crate) fn platform_hint(platform: Platform) -> &'static str {
    match platform {
        Platform::All => "",
        Platform::Android => " (topic:android OR apk in:name,description,readme)",
        Platform::Windows => {
            " (topic:windows OR exe in:name,description,readme OR msi in:name,description,readme)"
        }
        Platform::Macos => {
            " (topic:macos OR dmg in:name,description,readme OR pkg in:name,description,readme)"
        }
        Platform::Linux => {
            " (topic:linux OR appimage in:name,description,readme OR deb in:name,description,readme)"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_uses_popularity_floor() {
        assert_eq!(
            build_search_query("", Platform::All),
            "stars:>100 in:name,description,readme archived:false fork:false"
        );
        assert_eq!(
            build_search_query("   ", Platform::All),
            "stars:>100 in:name,description,readme archived:false fork:false"
        );
    }

    #[test]
    fn single_word_passes_through() {
        assert_eq!(
            build_search_query("todo", Platform::All),
            "todo in:name,description,readme archived:false fork:false"
        );
    }

    #[test]
    fn multi_word_query_is_quoted() {
        let query = build_search_query("todo list", Platform::All);
        assert!(query.starts_with("\"todo list\" in:name,description,readme"));
    }

    #[test]
    fn platform_hints_are_appended() {
        let query = build_search_query("todo", Platform::Android);
        assert!(query.contains("archived:false fork:false (topic:android OR apk"));

        let query = build_search_query("todo", Platform::Linux);
        assert!(query.contains("topic:linux OR appimage"));
    }

    #[test]
    fn query_building_is_idempotent() {
        let a = build_search_query("browser", Platform::Windows);
        let b = build_search_query("browser", Platform::Windows);
        assert_eq!(a, b);
    }
}
