//! Offline annotation generator used when no provider is configured.
//!
//! Output has a fixed statistical shape but carries no real signal: labels
//! are drawn uniformly at random and the narrative text only mentions the
//! batch size. Randomness comes from an injected `StdRng` so runs can be
//! made reproducible with a seed.

use std::collections::BTreeMap;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::types::{BatchAnnotationResult, InsightReport, ItemAnnotation, SingleAnnotation};
use crate::models::{Category, FeedbackItem, Priority, Sentiment};

/// Number of title tokens used as mock keywords.
pub const MOCK_KEYWORD_COUNT: usize = 3;

/// Sentiment shares of the mock distribution, in percent.
pub const SENTIMENT_SHARES: [(Sentiment, usize); 4] = [
    (Sentiment::Positive, 40),
    (Sentiment::Neutral, 35),
    (Sentiment::Negative, 15),
    (Sentiment::Mixed, 10),
];

/// Categories the mock generator picks from.
pub const MOCK_CATEGORIES: [Category; 5] = [
    Category::FeatureRequest,
    Category::BugReport,
    Category::UserExperience,
    Category::Performance,
    Category::Design,
];

const MOCK_INSIGHTS: [&str; 5] = [
    "Users are actively requesting mobile app improvements",
    "Performance concerns mentioned in 15% of feedback",
    "High satisfaction with recent dashboard updates",
    "Integration capabilities are frequently requested",
    "Documentation needs improvement according to new users",
];

const MOCK_RECOMMENDATIONS: [&str; 5] = [
    "Prioritize mobile app development based on user demand",
    "Address performance issues in high-traffic areas",
    "Continue enhancing dashboard features",
    "Consider building API integrations with popular tools",
    "Expand documentation for new user onboarding",
];

const MOCK_TREND_INSIGHTS: [&str; 5] = [
    "User engagement is trending upward this month",
    "Feature requests are the most common feedback type",
    "Response time to feedback has improved by 25%",
    "Mobile-related feedback has increased significantly",
    "User satisfaction scores are above average",
];

const MOCK_TRENDS: [&str; 3] = [
    "Increased focus on mobile experience",
    "Growing interest in API integrations",
    "Performance optimization requests rising",
];

const MOCK_TREND_RECOMMENDATIONS: [&str; 5] = [
    "Prioritize mobile app development",
    "Consider implementing requested integrations",
    "Address performance bottlenecks",
    "Maintain current response time standards",
    "Continue collecting detailed user feedback",
];

/// Split `total` into the mock sentiment shares, truncating each count.
///
/// The counts may sum to less than `total`; the remainder is not
/// redistributed.
pub fn sentiment_distribution(total: usize) -> BTreeMap<String, u64> {
    SENTIMENT_SHARES
        .iter()
        .map(|(sentiment, percent)| {
            (
                sentiment.as_str().to_string(),
                (total * percent / 100) as u64,
            )
        })
        .collect()
}

fn to_strings(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

/// Generator of synthetic annotations.
pub struct MockAnnotationGenerator {
    rng: Mutex<StdRng>,
}

impl MockAnnotationGenerator {
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Seeded when `seed` is given, entropy-seeded otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(StdRng::from_entropy()),
        }
    }

    /// Draw one (sentiment, category, priority) triple.
    fn draw_labels(&self) -> (Sentiment, Category, Priority) {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        // Arrays are non-empty constants
        let sentiment = *Sentiment::ALL.choose(&mut *rng).unwrap_or(&Sentiment::Neutral);
        let category = *MOCK_CATEGORIES.choose(&mut *rng).unwrap_or(&Category::Other);
        let priority = *Priority::ALL.choose(&mut *rng).unwrap_or(&Priority::Medium);
        (sentiment, category, priority)
    }

    /// Produce a batch result with one annotation per item, in item order.
    pub fn generate(&self, items: &[FeedbackItem]) -> BatchAnnotationResult {
        let item_analysis = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let (sentiment, category, priority) = self.draw_labels();
                ItemAnnotation {
                    index,
                    sentiment: Some(sentiment.as_str().to_string()),
                    suggested_category: Some(category.as_str().to_string()),
                    priority: Some(priority.as_str().to_string()),
                    keywords: item.title_keywords(MOCK_KEYWORD_COUNT),
                }
            })
            .collect();

        BatchAnnotationResult {
            summary: format!(
                "Analyzed {} feedback items. Most common themes: user experience improvements, feature requests, and bug reports. Overall sentiment is balanced with users showing engagement.",
                items.len()
            ),
            insights: to_strings(&MOCK_INSIGHTS),
            sentiment_distribution: sentiment_distribution(items.len()),
            item_analysis,
            recommendations: to_strings(&MOCK_RECOMMENDATIONS),
        }
    }

    /// Produce a single-item annotation.
    pub fn annotate_single(&self, item: &FeedbackItem) -> SingleAnnotation {
        let (sentiment, category, priority) = self.draw_labels();
        let title_prefix: String = item.title.chars().take(50).collect();
        SingleAnnotation {
            category: Some(category.as_str().to_string()),
            sentiment: Some(sentiment.as_str().to_string()),
            priority: Some(priority.as_str().to_string()),
            keywords: Some(item.title_keywords(MOCK_KEYWORD_COUNT)),
            summary: Some(format!("{}...", title_prefix)),
        }
    }

    /// Fixed insight report.
    pub fn insights(&self) -> InsightReport {
        InsightReport {
            insights: to_strings(&MOCK_TREND_INSIGHTS),
            trends: to_strings(&MOCK_TRENDS),
            recommendations: to_strings(&MOCK_TREND_RECOMMENDATIONS),
        }
    }
}
