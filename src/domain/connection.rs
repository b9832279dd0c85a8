use serde::{Deserialize, Serialize};

/// One connection card as read off the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub index: usize,
    pub connection_name: Option<String>,
    pub phone_number: Option<String>,
    pub message_limit: Option<String>,
    pub business_verification: Option<String>,
    pub account_status: Option<String>,
    pub quality: Option<String>,
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
    /// Only present when ineligible cards are kept in the output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligible: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binding_notes: Vec<String>,
}

impl ConnectionRecord {
    pub fn new(index: usize) -> Self {
        ConnectionRecord {
            index,
            ..Default::default()
        }
    }

    pub fn set(&mut self, field: GenericField, value: Option<String>) {
        let slot = match field {
            GenericField::MessageLimit => &mut self.message_limit,
            GenericField::BusinessVerification => &mut self.business_verification,
            GenericField::AccountStatus => &mut self.account_status,
            GenericField::Quality => &mut self.quality,
            GenericField::CreatedAt => &mut self.created_at,
            GenericField::ModifiedAt => &mut self.modified_at,
        };
        *slot = value;
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub record_count: usize,
    pub records: Vec<ConnectionRecord>,
}

impl From<Vec<ConnectionRecord>> for RunResult {
    fn from(records: Vec<ConnectionRecord>) -> Self {
        RunResult {
            record_count: records.len(),
            records,
        }
    }
}

/// The six label/value fields of a card, in the order the dashboard renders them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericField {
    MessageLimit,
    BusinessVerification,
    AccountStatus,
    Quality,
    CreatedAt,
    ModifiedAt,
}

impl GenericField {
    pub const ORDER: [GenericField; 6] = [
        GenericField::MessageLimit,
        GenericField::BusinessVerification,
        GenericField::AccountStatus,
        GenericField::Quality,
        GenericField::CreatedAt,
        GenericField::ModifiedAt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenericField::MessageLimit => "messageLimit",
            GenericField::BusinessVerification => "businessVerification",
            GenericField::AccountStatus => "accountStatus",
            GenericField::Quality => "quality",
            GenericField::CreatedAt => "createdAt",
            GenericField::ModifiedAt => "modifiedAt",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            GenericField::MessageLimit => &["limite", "limit"],
            GenericField::BusinessVerification => &["verifica"],
            GenericField::AccountStatus => &["status"],
            GenericField::Quality => &["qualidade", "quality"],
            GenericField::CreatedAt => &["criado", "created", "criação", "creation"],
            GenericField::ModifiedAt => &["modificado", "modified", "atualizado", "updated"],
        }
    }

    /// First field (in render order) whose keyword appears in the label.
    pub fn from_label(label: &str) -> Option<GenericField> {
        let label = label.to_lowercase();
        GenericField::ORDER
            .into_iter()
            .find(|field| field.keywords().iter().any(|k| label.contains(k)))
    }

    pub fn position(&self) -> usize {
        GenericField::ORDER
            .iter()
            .position(|f| f == self)
            .unwrap_or_default()
    }
}

/// How generic label/value fragments are bound to record fields.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldBinding {
    /// Match label keywords first, fill the rest by position.
    #[default]
    Keyword,
    /// Bind strictly by document order.
    Positional,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_map_to_fields_in_either_language() {
        assert_eq!(
            GenericField::from_label("Limite de mensagem:"),
            Some(GenericField::MessageLimit)
        );
        assert_eq!(
            GenericField::from_label("Business verification status"),
            Some(GenericField::BusinessVerification)
        );
        assert_eq!(
            GenericField::from_label("STATUS DA CONTA"),
            Some(GenericField::AccountStatus)
        );
        assert_eq!(
            GenericField::from_label("Modified at"),
            Some(GenericField::ModifiedAt)
        );
        assert_eq!(GenericField::from_label("Fuso horário"), None);
    }

    #[test]
    fn record_serializes_with_camel_case_and_nulls() {
        let mut record = ConnectionRecord::new(3);
        record.connection_name = Some("Acme WA".to_string());
        record.set(GenericField::Quality, Some("Alta".to_string()));

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["index"], 3);
        assert_eq!(json["connectionName"], "Acme WA");
        assert_eq!(json["quality"], "Alta");
        assert!(json["phoneNumber"].is_null());
        assert!(json.get("eligible").is_none());
        assert!(json.get("bindingNotes").is_none());
    }

    #[test]
    fn run_result_counts_records() {
        let result = RunResult::from(vec![ConnectionRecord::new(0), ConnectionRecord::new(1)]);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["recordCount"], 2);
        assert_eq!(json["records"].as_array().map(|r| r.len()), Some(2));
    }
}
