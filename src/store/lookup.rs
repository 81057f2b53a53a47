//! Range discovery and dimension lookups
//!
//! These feed parameter validation: the years, states, topics and
//! questions a user may pick are whatever the loaded stores contain.

use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::Result;
use crate::filter::{Expr, LiteralValue};
use crate::schema::Table;
use crate::store::rows::{LocationRow, QuestionRow, TopicRow, scan_rows};
use crate::store::{DocumentStore, RelationalStore};
use crate::utils::arrow::{distinct_int32, distinct_strings, int32_range};

/// The four datasets a user can ask about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    LeadingCauseOfDeath,
    Nutrition,
    ChronicDiseaseIndicator,
    DrugPoisoning,
}

impl Dataset {
    /// The relational fact table, if the dataset is relational
    #[must_use]
    pub const fn fact_table(self) -> Option<Table> {
        match self {
            Self::LeadingCauseOfDeath => Some(Table::LeadingCauseOfDeath),
            Self::Nutrition => Some(Table::Nutrition),
            Self::ChronicDiseaseIndicator => Some(Table::ChronicDiseaseIndicator),
            Self::DrugPoisoning => None,
        }
    }
}

/// An inclusive range of years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }

    /// Years present in both ranges, or `None` when they are disjoint
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then_some(Self { min, max })
    }
}

impl From<(i32, i32)> for YearRange {
    fn from((min, max): (i32, i32)) -> Self {
        Self { min, max }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

fn column_range(
    store: &dyn RelationalStore,
    table: Table,
    column: &str,
) -> Result<Option<YearRange>> {
    let batches = store.scan(table, None)?;
    Ok(int32_range(&batches, column)?.map(YearRange::from))
}

/// Years covered by `LeadingCauseOfDeath`
pub fn leading_cause_year_range(store: &dyn RelationalStore) -> Result<Option<YearRange>> {
    column_range(store, Table::LeadingCauseOfDeath, "Year")
}

/// Years covered by `Nutrition.YearStart`
pub fn nutrition_year_range(store: &dyn RelationalStore) -> Result<Option<YearRange>> {
    column_range(store, Table::Nutrition, "YearStart")
}

/// Start-year and end-year ranges of `ChronicDiseaseIndicator`
pub fn chronic_disease_year_ranges(
    store: &dyn RelationalStore,
) -> Result<Option<(YearRange, YearRange)>> {
    let batches = store.scan(Table::ChronicDiseaseIndicator, None)?;
    let start = int32_range(&batches, "YearStart")?;
    let end = int32_range(&batches, "YearEnd")?;
    Ok(start.zip(end).map(|(s, e)| (s.into(), e.into())))
}

/// Years covered by the drug poisoning document
#[must_use]
pub fn drug_poisoning_year_range(document: &dyn DocumentStore) -> Option<YearRange> {
    document.year_range().map(YearRange::from)
}

/// Years for which both causes of death and nutrition data exist
pub fn shared_year_range(store: &dyn RelationalStore) -> Result<Option<YearRange>> {
    let causes = leading_cause_year_range(store)?;
    let nutrition = nutrition_year_range(store)?;
    Ok(causes.zip(nutrition).and_then(|(a, b)| a.intersect(&b)))
}

/// Names of the states reporting in `dataset`
///
/// Nutrition and chronic disease facts carry a `LocationID` that is
/// resolved through `Location.LocationDesc`.
pub fn states_for(
    store: &dyn RelationalStore,
    document: &dyn DocumentStore,
    dataset: Dataset,
) -> Result<BTreeSet<String>> {
    match dataset {
        Dataset::DrugPoisoning => Ok(document.states()),
        Dataset::LeadingCauseOfDeath => {
            let batches = store.scan(Table::LeadingCauseOfDeath, None)?;
            distinct_strings(&batches, "State")
        }
        Dataset::Nutrition | Dataset::ChronicDiseaseIndicator => {
            let Some(table) = dataset.fact_table() else {
                return Ok(BTreeSet::new());
            };
            let ids = distinct_int32(&store.scan(table, None)?, "LocationID")?;
            let locations: Vec<LocationRow> = scan_rows(store, None)?;
            Ok(locations
                .into_iter()
                .filter(|location| ids.contains(&location.location_id))
                .map(|location| location.location_desc)
                .collect())
        }
    }
}

/// `(TopicID, Topic)` pairs used by `dataset`, ordered by `TopicID`
pub fn topics_for(store: &dyn RelationalStore, dataset: Dataset) -> Result<Vec<(String, String)>> {
    let Some(table) = topic_table(dataset) else {
        return Ok(Vec::new());
    };
    let ids = distinct_strings(&store.scan(table, None)?, "TopicID")?;
    let topics: Vec<TopicRow> = scan_rows(store, None)?;
    Ok(topics
        .into_iter()
        .filter(|topic| ids.contains(&topic.topic_id))
        .map(|topic| (topic.topic_id, topic.topic))
        .sorted()
        .dedup()
        .collect())
}

/// `(Question, QuestionID)` pairs asked under `topic_id` in `dataset`,
/// ordered by `QuestionID`
pub fn questions_for(
    store: &dyn RelationalStore,
    topic_id: &str,
    dataset: Dataset,
) -> Result<Vec<(String, String)>> {
    let Some(table) = topic_table(dataset) else {
        return Ok(Vec::new());
    };
    let facts = store.scan(table, Some(&Expr::eq("TopicID", topic_id)))?;
    let ids = distinct_strings(&facts, "QuestionID")?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let filter = Expr::In(
        "QuestionID".to_string(),
        ids.into_iter().map(LiteralValue::from).collect(),
    );
    let questions: Vec<QuestionRow> = scan_rows(store, Some(&filter))?;
    let by_id: FxHashMap<String, String> = questions
        .into_iter()
        .map(|q| (q.question_id, q.question))
        .collect();

    Ok(by_id
        .into_iter()
        .sorted()
        .map(|(id, question)| (question, id))
        .collect())
}

/// Every `QuestionID` asked in `dataset`, regardless of topic
pub fn question_ids_for(store: &dyn RelationalStore, dataset: Dataset) -> Result<BTreeSet<String>> {
    match topic_table(dataset) {
        Some(table) => distinct_strings(&store.scan(table, None)?, "QuestionID"),
        None => Ok(BTreeSet::new()),
    }
}

const fn topic_table(dataset: Dataset) -> Option<Table> {
    match dataset {
        Dataset::Nutrition => Some(Table::Nutrition),
        Dataset::ChronicDiseaseIndicator => Some(Table::ChronicDiseaseIndicator),
        Dataset::LeadingCauseOfDeath | Dataset::DrugPoisoning => None,
    }
}
