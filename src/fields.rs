use lazy_static::lazy_static;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;

/// Categorical attributes carried in a ticket's `custom_fields` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Channel,
    TypeOfInquiry,
    ProgramArea,
    Segment,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Channel,
        Category::TypeOfInquiry,
        Category::ProgramArea,
        Category::Segment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Channel => "channel",
            Category::TypeOfInquiry => "type_of_inquiry",
            Category::ProgramArea => "program_area",
            Category::Segment => "segment",
        }
    }
}

lazy_static! {
    /// Custom field id -> category. Fixed for the ticket export schema; not configurable.
    pub static ref FIELD_ID_TO_CATEGORY: HashMap<u64, Category> = {
        let mut table = HashMap::new();
        table.insert(38954747, Category::Channel);
        table.insert(38829288, Category::TypeOfInquiry);
        table.insert(38830788, Category::ProgramArea);
        table.insert(1500001654502, Category::Segment);
        table
    };
}

/// Per-ticket resolution of the four categories. `None` means absent or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFields {
    pub channel: Option<String>,
    pub type_of_inquiry: Option<String>,
    pub program_area: Option<String>,
    pub segment: Option<String>,
}

impl ResolvedFields {
    pub fn get(&self, category: Category) -> Option<&str> {
        match category {
            Category::Channel => self.channel.as_deref(),
            Category::TypeOfInquiry => self.type_of_inquiry.as_deref(),
            Category::ProgramArea => self.program_area.as_deref(),
            Category::Segment => self.segment.as_deref(),
        }
    }

    fn slot(&mut self, category: Category) -> &mut Option<String> {
        match category {
            Category::Channel => &mut self.channel,
            Category::TypeOfInquiry => &mut self.type_of_inquiry,
            Category::ProgramArea => &mut self.program_area,
            Category::Segment => &mut self.segment,
        }
    }
}

/// Resolves the ticket's custom fields through [`FIELD_ID_TO_CATEGORY`].
///
/// Fields are visited in order and a later field overwrites an earlier one of the
/// same category, even when the later value is empty. Unmapped ids are skipped.
pub fn extract_fields(record: &Value) -> ResolvedFields {
    let mut resolved = ResolvedFields::default();

    let Some(custom_fields) = record.get("custom_fields").and_then(Value::as_array) else {
        return resolved;
    };

    for field in custom_fields {
        let category = field
            .get("id")
            .and_then(Value::as_u64)
            .and_then(|id| FIELD_ID_TO_CATEGORY.get(&id).copied());

        match category {
            Some(category) => *resolved.slot(category) = field_value_text(field.get("value")),
            None => debug!("Skipping unmapped custom field id: {:?}", field.get("id")),
        }
    }

    resolved
}

/// Text for a custom field value. Zero, `false`, `null` and empty strings,
/// arrays or objects all count as "no value".
fn field_value_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) | Value::Null => return None,
        Value::Array(items) if items.is_empty() => return None,
        Value::Object(map) if map.is_empty() => return None,
        complex => serde_json::to_string(complex).ok()?,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
