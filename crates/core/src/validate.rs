use crate::error::IngestError;
use crate::models::{ExtractedRecord, FieldRule};
use regex::Regex;
use tracing::debug;

/// Field-format validation with a coercion policy: a present value that
/// does not match its pattern becomes null instead of failing the run.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    rules: Vec<(String, Regex)>,
}

impl FieldValidator {
    pub fn from_rules(rules: &[FieldRule]) -> Result<Self, IngestError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            compiled.push((rule.field.clone(), Regex::new(&rule.pattern)?));
        }
        Ok(Self { rules: compiled })
    }

    pub fn apply(&self, record: &mut ExtractedRecord) {
        for (field, pattern) in &self.rules {
            let Some(value) = record.get(field) else {
                continue;
            };

            if !pattern.is_match(value) {
                debug!(field = %field, value = %value, "coercing invalid field value to null");
                record.set(field, None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CNPJ_PATTERN;

    fn validator() -> FieldValidator {
        FieldValidator::from_rules(&[FieldRule {
            field: "cnpj_devedor".to_string(),
            pattern: CNPJ_PATTERN.to_string(),
        }])
        .expect("pattern compiles")
    }

    fn record_with(cnpj: Option<&str>, nome: Option<&str>) -> ExtractedRecord {
        let fields = vec!["cnpj_devedor".to_string(), "nome_devedor".to_string()];
        let mut record = ExtractedRecord::new(&fields);
        record.set("cnpj_devedor", cnpj.map(str::to_string));
        record.set("nome_devedor", nome.map(str::to_string));
        record
    }

    #[test]
    fn invalid_cnpj_is_coerced_to_null() {
        let mut record = record_with(Some("invalid-format"), Some("Acme"));
        validator().apply(&mut record);

        assert_eq!(record.get("cnpj_devedor"), None);
        assert_eq!(record.get("nome_devedor"), Some("Acme"));
    }

    #[test]
    fn valid_cnpj_is_kept() {
        let mut record = record_with(Some("12.345.678/0001-99"), None);
        validator().apply(&mut record);
        assert_eq!(record.get("cnpj_devedor"), Some("12.345.678/0001-99"));
    }

    #[test]
    fn null_fields_are_left_alone() {
        let mut record = record_with(None, None);
        validator().apply(&mut record);
        assert_eq!(record.get("cnpj_devedor"), None);
    }

    #[test]
    fn fields_without_rules_are_untouched() {
        let mut record = record_with(Some("12.345.678/0001-99"), Some("qualquer texto"));
        validator().apply(&mut record);
        assert_eq!(record.get("nome_devedor"), Some("qualquer texto"));
    }

    #[test]
    fn bad_pattern_fails_at_construction() {
        let result = FieldValidator::from_rules(&[FieldRule {
            field: "x".to_string(),
            pattern: "(".to_string(),
        }]);
        assert!(result.is_err());
    }
}
