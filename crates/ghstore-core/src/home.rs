// Browsing categories for the store home screen
use chrono::{Duration, Utc};

use crate::models::Platform;
use crate::query::platform_hint;

/// Curated browse categories shown on the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeCategory {
    Trending,
    New,
    RecentlyUpdated,
}

impl HomeCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            HomeCategory::Trending => "Trending",
            HomeCategory::New => "New",
            HomeCategory::RecentlyUpdated => "Recently updated",
        }
    }
}

/// Build the provider query for a home category.
///
/// Same shape as user searches: date-range and star qualifiers plus the
/// platform hint, so category pages flow through the verification pipeline
/// unchanged.
pub fn category_query(category: HomeCategory, platform: Platform) -> String {
    let base = match category {
        // Popular repos created in the last week.
        HomeCategory::Trending => {
            format!("created:>={} stars:>100", days_ago(7))
        }
        // Fresh repos showing first traction.
        HomeCategory::New => {
            format!("created:>={} stars:>10", days_ago(30))
        }
        // Established repos with recent pushes.
        HomeCategory::RecentlyUpdated => {
            format!("pushed:>={} stars:>50", days_ago(7))
        }
    };

    format!(
        "{} archived:false fork:false{}",
        base,
        platform_hint(platform)
    )
    .trim()
    .to_string()
}

fn days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trending_query_has_date_and_star_floor() {
        let query = category_query(HomeCategory::Trending, Platform::All);
        assert!(query.starts_with("created:>="));
        assert!(query.contains("stars:>100"));
        assert!(query.contains("archived:false fork:false"));
    }

    #[test]
    fn new_category_has_lower_star_floor() {
        let query = category_query(HomeCategory::New, Platform::All);
        assert!(query.contains("stars:>10"));
    }

    #[test]
    fn recently_updated_filters_on_push_date() {
        let query = category_query(HomeCategory::RecentlyUpdated, Platform::All);
        assert!(query.starts_with("pushed:>="));
    }

    #[test]
    fn platform_hint_carries_over() {
        let query = category_query(HomeCategory::Trending, Platform::Android);
        assert!(query.contains("topic:android"));
    }

    #[test]
    fn display_names() {
        assert_eq!(HomeCategory::Trending.display_name(), "Trending");
        assert_eq!(HomeCategory::RecentlyUpdated.display_name(), "Recently updated");
    }
}
