// Which release assets count as installers for which platform
use crate::models::{Platform, RepoCandidate};

/// Installer file suffixes recognized for a platform.
pub fn installer_suffixes(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::All => &[
            ".apk", ".msi", ".exe", ".dmg", ".pkg", ".appimage", ".deb", ".rpm",
        ],
        Platform::Android => &[".apk"],
        Platform::Windows => &[".exe", ".msi"],
        Platform::Macos => &[".dmg", ".pkg"],
        Platform::Linux => &[".appimage", ".deb", ".rpm"],
    }
}

/// Whether a release asset filename is an installer for `platform`.
///
/// Purely lexical and case-insensitive; nothing but the suffix matters.
pub fn asset_matches(file_name: &str, platform: Platform) -> bool {
    let name = file_name.to_ascii_lowercase();
    installer_suffixes(platform)
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

/// Rough relevance score for ranking candidates against a platform.
///
/// Heuristic over topics, language, and description. Verification decides
/// inclusion; this only helps order what made it through.
pub fn relevance_score(candidate: &RepoCandidate, platform: Platform) -> u32 {
    if platform == Platform::All {
        return 10;
    }

    let mut score = 5;
    let topics: Vec<String> = candidate
        .topics
        .iter()
        .map(|t| t.to_ascii_lowercase())
        .collect();
    let language = candidate.language.as_deref().map(str::to_ascii_lowercase);
    let description = candidate
        .description
        .as_deref()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let has_topic = |t: &str| topics.iter().any(|topic| topic == t);
    let lang_in = |set: &[&str]| language.as_deref().is_some_and(|l| set.contains(&l));

    match platform {
        Platform::Android => {
            if has_topic("android") {
                score += 10;
            }
            if has_topic("mobile") {
                score += 5;
            }
            if lang_in(&["kotlin", "java"]) {
                score += 5;
            }
            if description.contains("android") || description.contains("apk") {
                score += 3;
            }
        }
        Platform::Windows => {
            if has_topic("windows") || has_topic("desktop") || has_topic("electron") {
                score += 10;
            }
            if lang_in(&["c#", "c++", "rust"]) {
                score += 5;
            }
            if description.contains("windows") || description.contains("desktop") {
                score += 3;
            }
        }
        Platform::Macos => {
            if has_topic("macos") || has_topic("desktop") || has_topic("electron") {
                score += 10;
            }
            if lang_in(&["swift", "objective-c", "c++"]) {
                score += 5;
            }
            if description.contains("macos") || description.contains("mac") {
                score += 3;
            }
        }
        Platform::Linux => {
            if has_topic("linux") || has_topic("desktop") || has_topic("electron") {
                score += 10;
            }
            if lang_in(&["rust", "c++", "c"]) {
                score += 5;
            }
            if description.contains("linux") {
                score += 3;
            }
        }
        Platform::All => {}
    }

    score
}
