use crate::fields::{extract_fields, Category};
use crate::timestamp::parse_created_year;
use log::warn;
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Value -> occurrence count for one category. The key set doubles as the set of
/// distinct observed values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<String, usize>,
}

impl FrequencyTable {
    pub fn record(&mut self, value: &str) {
        *self.counts.entry(value.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, value: &str) -> usize {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct values observed.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Rows ordered by count descending, ties broken by value ascending.
    pub fn sorted_by_count(&self) -> Vec<(&str, usize)> {
        let mut rows: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(value, count)| (value.as_str(), *count))
            .collect();
        // BTreeMap iteration is already value-ordered and the sort is stable.
        rows.sort_by_key(|&(_, count)| Reverse(count));
        rows
    }
}

impl<S: AsRef<str>> FromIterator<(S, usize)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        let mut table = FrequencyTable::default();
        for (value, count) in iter {
            *table.counts.entry(value.as_ref().to_string()).or_insert(0) += count;
        }
        table
    }
}

/// Counts computed over one ticket sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationResult {
    pub total_tickets: usize,
    pub created_at_year_count: BTreeMap<i32, usize>,
    pub tags: FrequencyTable,
    pub program_area: FrequencyTable,
    pub segment: FrequencyTable,
    pub channel: FrequencyTable,
    pub type_of_inquiry: FrequencyTable,
    /// Tickets without a resolvable program area.
    pub spam_ticket_count: usize,
    /// Tickets whose `created_at` was missing or in neither accepted layout.
    pub undated_ticket_count: usize,
}

impl AggregationResult {
    pub fn category(&self, category: Category) -> &FrequencyTable {
        match category {
            Category::Channel => &self.channel,
            Category::TypeOfInquiry => &self.type_of_inquiry,
            Category::ProgramArea => &self.program_area,
            Category::Segment => &self.segment,
        }
    }

    fn category_mut(&mut self, category: Category) -> &mut FrequencyTable {
        match category {
            Category::Channel => &mut self.channel,
            Category::TypeOfInquiry => &mut self.type_of_inquiry,
            Category::ProgramArea => &mut self.program_area,
            Category::Segment => &mut self.segment,
        }
    }
}

/// Accumulates an [`AggregationResult`] one ticket at a time.
#[derive(Debug, Default)]
pub struct Aggregator {
    result: AggregationResult,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: &Value) {
        let result = &mut self.result;
        result.total_tickets += 1;

        match record.get("created_at") {
            Some(created_at) => match created_at.as_str().and_then(parse_created_year) {
                Some(year) => *result.created_at_year_count.entry(year).or_insert(0) += 1,
                None => {
                    result.undated_ticket_count += 1;
                    warn!("Invalid date format for entry: {}", created_at);
                }
            },
            None => {
                result.undated_ticket_count += 1;
                warn!("Missing created_at for entry with id {}", ticket_id(record));
            }
        }

        if let Some(tags) = record.get("tags").and_then(Value::as_array) {
            for tag in tags.iter().filter_map(Value::as_str) {
                result.tags.record(tag);
            }
        }

        let resolved = extract_fields(record);
        for category in Category::ALL {
            if let Some(value) = resolved.get(category) {
                result.category_mut(category).record(value);
            }
        }

        if resolved.program_area.is_none() {
            result.spam_ticket_count += 1;
        }
    }

    pub fn finish(self) -> AggregationResult {
        self.result
    }
}

/// Aggregates a whole ticket sequence.
pub fn analyze(records: &[Value]) -> AggregationResult {
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.add(record);
    }
    aggregator.finish()
}

fn ticket_id(record: &Value) -> String {
    record
        .get("id")
        .map(Value::to_string)
        .unwrap_or_else(|| "<none>".to_string())
}
