use serde::{Deserialize, Serialize};

use crate::currency::Currency;

use super::transaction::{NewTransaction, TransactionKind};

const NAME_LIMIT: usize = 20;
const FALLBACK_NAME: &str = "Template";

/// Reusable transaction prototype. Applying one always creates a brand new
/// transaction; templates keep no link to what they produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub name: String,
    #[serde(alias = "ttype")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub currency: Currency,
}

impl Template {
    /// Builds a template named after the first 20 characters of its description.
    pub fn from_draft(draft: &NewTransaction) -> Self {
        Self {
            name: default_name(&draft.description),
            kind: draft.kind,
            category: draft.category.clone(),
            description: draft.description.clone(),
            amount: draft.amount,
            currency: draft.currency,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.name = name.trim().to_string();
        }
        self
    }

    pub fn to_draft(&self) -> NewTransaction {
        NewTransaction {
            kind: self.kind,
            category: self.category.clone(),
            description: self.description.clone(),
            amount: self.amount,
            currency: self.currency,
        }
    }
}

fn default_name(description: &str) -> String {
    let name: String = description.chars().take(NAME_LIMIT).collect();
    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_defaults_to_truncated_description() {
        let draft = NewTransaction::expense("Bills", 45.0, Currency::Usd)
            .with_description("Monthly internet subscription");
        let template = Template::from_draft(&draft);
        assert_eq!(template.name, "Monthly internet sub");
        assert_eq!(template.to_draft(), draft);
    }

    #[test]
    fn empty_description_falls_back() {
        let draft = NewTransaction::income("Salary", 1000.0, Currency::Usd);
        assert_eq!(Template::from_draft(&draft).name, "Template");
        assert_eq!(Template::from_draft(&draft).named("Payday").name, "Payday");
    }
}
