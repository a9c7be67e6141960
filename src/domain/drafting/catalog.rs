use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// One piece of information asked from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub question: &'static str,
    pub required: bool,
    pub examples: &'static [&'static str],
}

impl FieldSpec {
    const MAX_EXAMPLES: usize = 3;

    /// Question text shown to the user, with up to three examples
    pub fn prompt(&self) -> String {
        if self.examples.is_empty() {
            return self.question.to_string();
        }

        let examples: Vec<&str> = self.examples.iter().take(Self::MAX_EXAMPLES).copied().collect();
        format!("{}\nFor example: {}", self.question, examples.join(", "))
    }
}

const NDA_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "disclosing_party",
        question: "Who is the Disclosing Party (the party sharing confidential information)?",
        required: true,
        examples: &["ABC Corporation", "John Smith", "XYZ LLC"],
    },
    FieldSpec {
        key: "receiving_party",
        question: "Who is the Receiving Party (the party receiving confidential information)?",
        required: true,
        examples: &["DEF Inc.", "Jane Doe", "123 Consulting LLC"],
    },
    FieldSpec {
        key: "purpose",
        question: "What is the purpose of sharing this confidential information?",
        required: true,
        examples: &["Potential business partnership", "Employment discussions", "Investment evaluation"],
    },
    FieldSpec {
        key: "duration",
        question: "How long should this NDA remain in effect?",
        required: true,
        examples: &["2 years", "5 years", "Indefinitely", "Until project completion"],
    },
    FieldSpec {
        key: "jurisdiction",
        question: "Which jurisdiction/state law should govern this agreement?",
        required: true,
        examples: &["California", "New York", "Ontario, Canada", "Texas"],
    },
    FieldSpec {
        key: "disclosing_party_address",
        question: "What is the full address of the Disclosing Party?",
        required: false,
        examples: &["123 Main St, City, State, ZIP", "456 Business Ave, Suite 100, City, State, ZIP"],
    },
    FieldSpec {
        key: "receiving_party_address",
        question: "What is the full address of the Receiving Party?",
        required: false,
        examples: &["789 Oak St, City, State, ZIP", "321 Corporate Blvd, City, State, ZIP"],
    },
    FieldSpec {
        key: "specific_exclusions",
        question: "Are there any specific types of information that should be excluded from confidentiality? (Optional)",
        required: false,
        examples: &[
            "Publicly available information",
            "Information already known",
            "Information independently developed",
        ],
    },
];

const CONTRACT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "party_1",
        question: "Who is the first party to this contract?",
        required: true,
        examples: &["ABC Company", "John Smith"],
    },
    FieldSpec {
        key: "party_2",
        question: "Who is the second party to this contract?",
        required: true,
        examples: &["XYZ Corporation", "Jane Doe"],
    },
    FieldSpec {
        key: "contract_type",
        question: "What type of contract is this?",
        required: true,
        examples: &["Service Agreement", "Employment Contract", "Sales Agreement"],
    },
    FieldSpec {
        key: "services_or_goods",
        question: "What services or goods are being provided?",
        required: true,
        examples: &["Web development services", "Consulting services", "Software licensing"],
    },
    FieldSpec {
        key: "payment_terms",
        question: "What are the payment terms?",
        required: true,
        examples: &["$5,000 upon completion", "Monthly payments of $1,000", "50% upfront, 50% on delivery"],
    },
    FieldSpec {
        key: "duration",
        question: "What is the duration or term of this contract?",
        required: true,
        examples: &["6 months", "1 year", "Until project completion"],
    },
    FieldSpec {
        key: "jurisdiction",
        question: "Which jurisdiction should govern this contract?",
        required: true,
        examples: &["California", "New York", "Ontario, Canada"],
    },
];

const LEASE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "landlord",
        question: "Who is the landlord?",
        required: true,
        examples: &["Property Management LLC", "John Smith"],
    },
    FieldSpec {
        key: "tenant",
        question: "Who is the tenant?",
        required: true,
        examples: &["Jane Doe", "ABC Corporation"],
    },
    FieldSpec {
        key: "property_address",
        question: "What is the full address of the property being leased?",
        required: true,
        examples: &["123 Main St, Apt 4B, City, State, ZIP"],
    },
    FieldSpec {
        key: "monthly_rent",
        question: "What is the monthly rent amount?",
        required: true,
        examples: &["$1,500", "$2,000", "$850"],
    },
    FieldSpec {
        key: "lease_term",
        question: "What is the lease term?",
        required: true,
        examples: &["12 months", "6 months", "Month-to-month"],
    },
    FieldSpec {
        key: "security_deposit",
        question: "What is the security deposit amount?",
        required: true,
        examples: &["$1,500", "One month's rent", "$500"],
    },
    FieldSpec {
        key: "start_date",
        question: "When does the lease start?",
        required: true,
        examples: &["January 1, 2025", "February 15, 2025"],
    },
];

/// Supported document categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Nda,
    Contract,
    Lease,
}

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [Self::Nda, Self::Contract, Self::Lease];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nda => "nda",
            Self::Contract => "contract",
            Self::Lease => "lease",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Nda => "Non-Disclosure Agreement",
            Self::Contract => "Contract",
            Self::Lease => "Residential Lease Agreement",
        }
    }

    /// Fields in the fixed order they are asked (required first, then optional)
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Self::Nda => NDA_FIELDS,
            Self::Contract => CONTRACT_FIELDS,
            Self::Lease => LEASE_FIELDS,
        }
    }

    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.key == key)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields().iter().filter(|f| f.required)
    }

    pub fn optional_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields().iter().filter(|f| !f.required)
    }

    /// First field in schema order that has not been collected yet
    pub fn next_missing_field(&self, collected: &HashMap<String, String>) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| !collected.contains_key(f.key))
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nda" => Ok(Self::Nda),
            "contract" => Ok(Self::Contract),
            "lease" => Ok(Self::Lease),
            other => Err(DomainError::validation(format!("Unknown document type: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_sizes() {
        assert_eq!(DocumentType::Nda.required_fields().count(), 5);
        assert_eq!(DocumentType::Nda.optional_fields().count(), 3);
        assert_eq!(DocumentType::Contract.fields().len(), 7);
        assert_eq!(DocumentType::Lease.fields().len(), 7);
    }

    #[test]
    fn test_required_fields_come_first() {
        for doc_type in DocumentType::ALL {
            let first_optional = doc_type.fields().iter().position(|f| !f.required);
            if let Some(index) = first_optional {
                assert!(doc_type.fields()[index..].iter().all(|f| !f.required));
            }
        }
    }

    #[test]
    fn test_field_keys_unique() {
        for doc_type in DocumentType::ALL {
            let mut keys: Vec<_> = doc_type.fields().iter().map(|f| f.key).collect();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), doc_type.fields().len());
        }
    }

    #[test]
    fn test_prompt_shows_three_examples() {
        let duration = DocumentType::Nda.field("duration").unwrap();
        assert_eq!(
            duration.prompt(),
            "How long should this NDA remain in effect?\nFor example: 2 years, 5 years, Indefinitely"
        );
    }

    #[test]
    fn test_next_missing_field() {
        let mut collected = HashMap::new();
        assert_eq!(
            DocumentType::Lease.next_missing_field(&collected).unwrap().key,
            "landlord"
        );

        collected.insert("landlord".to_string(), "Property Management LLC".to_string());
        collected.insert("property_address".to_string(), "123 Main St".to_string());
        assert_eq!(DocumentType::Lease.next_missing_field(&collected).unwrap().key, "tenant");
    }

    #[test]
    fn test_parse_document_type() {
        assert_eq!("NDA".parse::<DocumentType>().unwrap(), DocumentType::Nda);
        assert_eq!(" lease ".parse::<DocumentType>().unwrap(), DocumentType::Lease);
        assert!("will".parse::<DocumentType>().is_err());
    }
}
