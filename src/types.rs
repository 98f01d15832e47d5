use serde::{Deserialize, Serialize};

/// Number of recommendations every successful request returns.
pub const RECOMMENDATION_COUNT: usize = 3;

/// A single suggested book.
///
/// `link` is either a Goodreads book URL or absent; it is never serialized
/// as `null` or an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub title: String,
    pub author: String,
    /// One or two sentences on why the book fits the reader.
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Exactly three recommendations, in the order the model gave them.
///
/// The fixed-size array makes the cardinality part of the type; there is
/// no way to build a set with more or fewer records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationSet([RecommendationRecord; RECOMMENDATION_COUNT]);

impl RecommendationSet {
    pub fn new(records: [RecommendationRecord; RECOMMENDATION_COUNT]) -> Self {
        Self(records)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecommendationRecord> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[RecommendationRecord] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<RecommendationRecord> {
        self.0.into()
    }

    pub fn len(&self) -> usize {
        RECOMMENDATION_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Vec<RecommendationRecord>> for RecommendationSet {
    type Error = Vec<RecommendationRecord>;

    /// Fails (handing the records back) unless there are exactly three.
    fn try_from(records: Vec<RecommendationRecord>) -> Result<Self, Self::Error> {
        <[RecommendationRecord; RECOMMENDATION_COUNT]>::try_from(records).map(Self)
    }
}

impl<'a> IntoIterator for &'a RecommendationSet {
    type Item = &'a RecommendationRecord;
    type IntoIter = std::slice::Iter<'a, RecommendationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for RecommendationSet {
    type Item = RecommendationRecord;
    type IntoIter = std::array::IntoIter<RecommendationRecord, RECOMMENDATION_COUNT>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
