use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// One journal record as returned by retrieval.
///
/// `score` is only present for similarity-ranked results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JournalEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Body text. Older payloads call this field `content`.
    #[serde(default, alias = "content")]
    pub text: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl JournalEntry {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            date: date.into(),
            tags: Vec::new(),
            score: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Stable identity used to de-duplicate entries across retrieval rounds.
    ///
    /// Falls back to `date:title` for sources that carry no id.
    pub fn identity(&self) -> String {
        if self.id.is_empty() {
            format!("{}:{}", self.date, self.title)
        } else {
            self.id.clone()
        }
    }

    /// Calendar date of the entry, if `date` starts with `YYYY-MM-DD`.
    pub fn day(&self) -> Option<NaiveDate> {
        let prefix = self.date.get(..10)?;
        NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// An entry together with the confidence it was retrieved with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RetrievedDoc {
    pub entry: JournalEntry,
    #[serde(default)]
    pub distance: Option<f32>,
}

impl RetrievedDoc {
    pub fn new(entry: JournalEntry, distance: Option<f32>) -> Self {
        Self { entry, distance }
    }
}

impl From<JournalEntry> for RetrievedDoc {
    fn from(entry: JournalEntry) -> Self {
        Self { entry, distance: None }
    }
}
