use serde::Deserialize;

use crate::error::ReconError;
use crate::resolve::strip_whitespace;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub classify: ClassifyConfig,
    #[serde(default)]
    pub fields: FieldKeywords,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
}

// ---------------------------------------------------------------------------
// Classification markers
// ---------------------------------------------------------------------------

/// Column-label fragments that identify a ledger from its first row.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifyConfig {
    pub revenue_markers: Vec<String>,
    pub collections_marker: String,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            revenue_markers: strings(&["총매출", "진료비총액"]),
            collections_marker: "수납일".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Field keywords
// ---------------------------------------------------------------------------

/// Ordered keyword lists, one per logical field. The first keyword that
/// matches any column wins, so more specific spellings go first.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldKeywords {
    pub patient_name: Vec<String>,
    pub identifier: Vec<String>,
    pub payment_date: Vec<String>,
    pub treatment_date: Vec<String>,
    pub refund_date: Vec<String>,
    pub card: Vec<String>,
    pub cash_counter: Vec<String>,
    pub cash_transfer: Vec<String>,
    pub app_pay: Vec<String>,
    pub platform: Vec<String>,
    pub other: Vec<String>,
    pub prepay: Vec<String>,
    pub billed_amount: Vec<String>,
}

impl Default for FieldKeywords {
    fn default() -> Self {
        Self {
            patient_name: strings(&["환자명"]),
            identifier: strings(&["접수번호", "환자번호"]),
            payment_date: strings(&["수납일"]),
            treatment_date: strings(&["진료일"]),
            refund_date: strings(&["환불일"]),
            card: strings(&["카드"]),
            cash_counter: strings(&["현금_창구수납", "현금창구", "현금수납"]),
            cash_transfer: strings(&["현금_계좌이체", "계좌이체"]),
            app_pay: strings(&["페이"]),
            platform: strings(&["플랫폼"]),
            other: strings(&["기타"]),
            // "선납급" is a common misspelling in exported headers.
            prepay: strings(&["선납금 입출금", "선납금입출금", "선납급"]),
            billed_amount: strings(&["총 매출", "총매출", "진료비총액"]),
        }
    }
}

impl FieldKeywords {
    fn lists(&self) -> [(&'static str, &[String]); 13] {
        [
            ("patient_name", self.patient_name.as_slice()),
            ("identifier", self.identifier.as_slice()),
            ("payment_date", self.payment_date.as_slice()),
            ("treatment_date", self.treatment_date.as_slice()),
            ("refund_date", self.refund_date.as_slice()),
            ("card", self.card.as_slice()),
            ("cash_counter", self.cash_counter.as_slice()),
            ("cash_transfer", self.cash_transfer.as_slice()),
            ("app_pay", self.app_pay.as_slice()),
            ("platform", self.platform.as_slice()),
            ("other", self.other.as_slice()),
            ("prepay", self.prepay.as_slice()),
            ("billed_amount", self.billed_amount.as_slice()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tolerance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToleranceConfig {
    /// Largest |residual| still reported as fully explained.
    pub residual: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self { residual: 0.5 }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.classify.revenue_markers.is_empty() {
            return Err(ReconError::ConfigValidation(
                "classify.revenue_markers must list at least one marker".into(),
            ));
        }
        for marker in &self.classify.revenue_markers {
            check_keyword("classify.revenue_markers", marker)?;
        }
        check_keyword("classify.collections_marker", &self.classify.collections_marker)?;

        for (field, keywords) in self.fields.lists() {
            if keywords.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "fields.{field} must list at least one keyword"
                )));
            }
            for kw in keywords {
                check_keyword(&format!("fields.{field}"), kw)?;
            }
        }

        if !self.tolerance.residual.is_finite() || self.tolerance.residual < 0.0 {
            return Err(ReconError::ConfigValidation(format!(
                "tolerance.residual must be a non-negative number, got {}",
                self.tolerance.residual
            )));
        }

        Ok(())
    }

    /// Label shown in CLI output.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("default")
    }
}

fn check_keyword(path: &str, keyword: &str) -> Result<(), ReconError> {
    if strip_whitespace(keyword).is_empty() {
        return Err(ReconError::ConfigValidation(format!(
            "{path}: keywords must not be blank"
        )));
    }
    Ok(())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ReconConfig::default();
        config.validate().unwrap();
        assert_eq!(config.fields.billed_amount, vec!["총 매출", "총매출", "진료비총액"]);
        assert_eq!(config.classify.collections_marker, "수납일");
        assert_eq!(config.tolerance.residual, 0.5);
        assert_eq!(config.display_name(), "default");
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config.fields.card, vec!["카드"]);
        assert_eq!(config.classify.revenue_markers, vec!["총매출", "진료비총액"]);
    }

    #[test]
    fn partial_field_override_keeps_other_defaults() {
        let input = r#"
name = "February close"

[fields]
card = ["신용카드", "카드"]

[tolerance]
residual = 1.0
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        assert_eq!(config.display_name(), "February close");
        assert_eq!(config.fields.card, vec!["신용카드", "카드"]);
        assert_eq!(config.fields.patient_name, vec!["환자명"]);
        assert_eq!(config.tolerance.residual, 1.0);
    }

    #[test]
    fn reject_unknown_field_name() {
        let input = r#"
[fields]
cards = ["카드"]
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_empty_keyword_list() {
        let input = r#"
[fields]
refund_date = []
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("fields.refund_date"));
    }

    #[test]
    fn reject_blank_keyword() {
        let input = r#"
[classify]
revenue_markers = ["총매출", "  "]
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("must not be blank"));
    }

    #[test]
    fn reject_negative_tolerance() {
        let input = r#"
[tolerance]
residual = -1.0
"#;
        let err = ReconConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("tolerance.residual"));
    }
}
