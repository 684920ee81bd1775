use crate::Review;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct SentimentCounts {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub sentiment: SentimentCounts,
    /// Topic name to number of reviews mentioning it. A review counts at
    /// most once per topic.
    pub topics: BTreeMap<String, u64>,
}

const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("service", &["service", "staff", "wait"]),
    ("cleanliness", &["clean", "hygiene"]),
    ("price", &["price", "cost", "expensive", "cheap"]),
];

/// Aggregate sentiment and topic counts over a set of reviews.
///
/// Sentiment comes straight from the star rating: 4 and up is positive,
/// exactly 3 is neutral, anything lower is negative. Topics are rule-based
/// keyword matches against the lowercased text.
pub fn analyze(reviews: &[Review]) -> AnalyticsReport {
    let mut sentiment = SentimentCounts::default();
    let mut topics: BTreeMap<String, u64> = BTreeMap::new();

    for review in reviews {
        match review.rating {
            r if r >= 4 => sentiment.positive += 1,
            3 => sentiment.neutral += 1,
            _ => sentiment.negative += 1,
        }
        let text = review.text.to_lowercase();
        for (topic, keywords) in TOPIC_KEYWORDS {
            if keywords.iter().any(|kw| text.contains(kw)) {
                *topics.entry((*topic).to_owned()).or_insert(0) += 1;
            }
        }
    }

    AnalyticsReport { sentiment, topics }
}
