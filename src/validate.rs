use crate::aggregate::AggregationResult;
use crate::error::ValidationError;
use log::{error, info};

/// Runs both consistency checks over the combined aggregation, stopping at the
/// first failure.
pub fn validate(stats: &AggregationResult) -> Result<(), ValidationError> {
    let total = stats.total_tickets;
    let program_area = stats.program_area.total();
    let spam = stats.spam_ticket_count;

    if total != program_area + spam {
        error!(
            "Validation failed (1/2): Total tickets ({}) do not match the sum of program area tickets ({}) and spam tickets ({}).",
            total, program_area, spam
        );
        return Err(ValidationError::TotalMismatch { total, program_area, spam });
    }
    info!("Validation passed (1/2): Total tickets match the sum of program area tickets and spam tickets.");

    // An empty union fails here as well: zero of zero tickets are spam.
    if spam == total {
        error!(
            "Validation failed (2/2): All tickets are considered spam ({} out of {}). Something went wrong.",
            spam, total
        );
        return Err(ValidationError::AllSpam { spam, total });
    }
    info!("Validation passed (2/2): Not all tickets are spam.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{analyze, FrequencyTable};
    use serde_json::json;

    #[test]
    fn passes_for_consistent_result() {
        let records = vec![
            json!({"custom_fields": [{"id": 38830788, "value": "housing"}]}),
            json!({"custom_fields": []}),
        ];
        assert_eq!(validate(&analyze(&records)), Ok(()));
    }

    #[test]
    fn detects_double_counted_program_area() {
        let stats = AggregationResult {
            total_tickets: 3,
            program_area: [("housing", 3)].into_iter().collect::<FrequencyTable>(),
            spam_ticket_count: 1,
            ..Default::default()
        };
        assert_eq!(
            validate(&stats),
            Err(ValidationError::TotalMismatch { total: 3, program_area: 3, spam: 1 })
        );
    }

    #[test]
    fn detects_dropped_tickets() {
        let stats = AggregationResult {
            total_tickets: 5,
            program_area: [("housing", 2)].into_iter().collect::<FrequencyTable>(),
            spam_ticket_count: 1,
            ..Default::default()
        };
        assert!(matches!(validate(&stats), Err(ValidationError::TotalMismatch { .. })));
    }

    #[test]
    fn fails_when_every_ticket_is_spam() {
        let records = vec![json!({"tags": ["x"]}), json!({"custom_fields": [{"id": 1, "value": "y"}]})];
        assert_eq!(
            validate(&analyze(&records)),
            Err(ValidationError::AllSpam { spam: 2, total: 2 })
        );
    }

    #[test]
    fn empty_result_counts_as_all_spam() {
        assert_eq!(
            validate(&AggregationResult::default()),
            Err(ValidationError::AllSpam { spam: 0, total: 0 })
        );
    }
}
