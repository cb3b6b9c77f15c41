use crate::core::value::{FieldValue, Value};
use serde::{Deserialize, Serialize};

/// One decoded result row, fields kept in the column order the engine returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowData {
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(field_values: Vec<FieldValue>) -> Self {
        RowData { field_values }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .map(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    pub fn first(&self) -> Option<&Value> {
        self.field_values.first().map(|f| &f.value)
    }

    pub fn len(&self) -> usize {
        self.field_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_values.is_empty()
    }
}

impl FromIterator<(String, Value)> for RowData {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let field_values = iter
            .into_iter()
            .map(|(name, value)| FieldValue {
                name,
                data_type: value.data_type(),
                value,
            })
            .collect();
        RowData { field_values }
    }
}
