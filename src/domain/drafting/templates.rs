use std::collections::HashMap;

use crate::domain::prompt::{PromptTemplate, TemplateError};

use super::DocumentType;

/// Date format used in rendered documents, e.g. "March 04, 2025"
pub const DATE_FORMAT: &str = "%B %d, %Y";

const NDA_TEMPLATE: &str = r#"NON-DISCLOSURE AGREEMENT

This Non-Disclosure Agreement ("Agreement") is entered into on ${var:date} between ${var:disclosing_party}${var:disclosing_party_address_formatted:} ("Disclosing Party") and ${var:receiving_party}${var:receiving_party_address_formatted:} ("Receiving Party").

WHEREAS, the Disclosing Party possesses certain confidential and proprietary information; and

WHEREAS, the Receiving Party desires to review, examine, inspect or obtain access to such confidential information for the purpose of ${var:purpose};

NOW, THEREFORE, in consideration of the mutual covenants and agreements contained herein, the parties agree as follows:

1. DEFINITION OF CONFIDENTIAL INFORMATION
For purposes of this Agreement, "Confidential Information" shall mean all non-public, confidential or proprietary information of Disclosing Party, whether oral or written, whether or not marked, designated or otherwise identified as "confidential," including without limitation: technical data, trade secrets, know-how, research, product plans, products, services, customers, customer lists, markets, software, developments, inventions, processes, formulas, technology, designs, drawings, engineering, hardware configuration information, marketing, finances or other business information.

2. NON-DISCLOSURE
Receiving Party agrees to:
a) Hold and maintain the Confidential Information in strict confidence;
b) Not disclose the Confidential Information to any third parties without prior written consent of Disclosing Party;
c) Not use the Confidential Information for any purpose other than ${var:purpose};
d) Take reasonable precautions to protect the confidentiality of such information.

3. EXCLUSIONS
The obligations of confidentiality shall not apply to information that:
a) Is or becomes publicly available through no breach of this Agreement by Receiving Party;
b) Is rightfully known by Receiving Party prior to disclosure;
c) Is rightfully received by Receiving Party from a third party without breach of confidentiality;
d) Is independently developed by Receiving Party without use of Confidential Information.

${var:specific_exclusions_formatted:}
4. TERM
This Agreement shall remain in effect for ${var:duration} from the date first written above, unless terminated earlier by mutual written consent of the parties.

5. RETURN OF MATERIALS
Upon termination of this Agreement or upon request by Disclosing Party, Receiving Party shall promptly return or destroy all documents, materials, and other tangible manifestations of Confidential Information.

6. GOVERNING LAW
This Agreement shall be governed by and construed in accordance with the laws of ${var:jurisdiction}.

7. ENTIRE AGREEMENT
This Agreement constitutes the entire agreement between the parties and supersedes all prior negotiations, representations, or agreements relating to the subject matter hereof.

IN WITNESS WHEREOF, the parties have executed this Agreement as of the date first written above.

DISCLOSING PARTY:                    RECEIVING PARTY:

_________________________           _________________________
${var:disclosing_party}                   ${var:receiving_party}

Date: _______________               Date: _______________
"#;

const CONTRACT_TEMPLATE: &str = r#"${var:contract_type}

This ${var:contract_type} ("Agreement") is entered into on ${var:date} between ${var:party_1} ("Party 1") and ${var:party_2} ("Party 2").

WHEREAS, Party 1 desires to engage Party 2 for ${var:services_or_goods}; and

WHEREAS, Party 2 agrees to provide such ${var:services_or_goods} under the terms and conditions set forth herein;

NOW, THEREFORE, in consideration of the mutual covenants contained herein, the parties agree as follows:

1. SCOPE OF WORK
Party 2 shall provide ${var:services_or_goods} as detailed in this Agreement.

2. PAYMENT TERMS
In consideration for the services/goods provided, Party 1 agrees to pay ${var:payment_terms}.

3. TERM
This Agreement shall commence on ${var:date} and shall continue for ${var:duration}, unless terminated earlier in accordance with the provisions herein.

4. TERMINATION
Either party may terminate this Agreement with thirty (30) days written notice to the other party.

5. GOVERNING LAW
This Agreement shall be governed by and construed in accordance with the laws of ${var:jurisdiction}.

6. ENTIRE AGREEMENT
This Agreement constitutes the entire agreement between the parties and supersedes all prior negotiations, representations, or agreements.

IN WITNESS WHEREOF, the parties have executed this Agreement as of the date first written above.

PARTY 1:                           PARTY 2:

_________________________         _________________________
${var:party_1}                         ${var:party_2}

Date: _______________             Date: _______________
"#;

const LEASE_TEMPLATE: &str = r#"RESIDENTIAL LEASE AGREEMENT

This Lease Agreement ("Lease") is entered into on ${var:date} between ${var:landlord} ("Landlord") and ${var:tenant} ("Tenant").

PROPERTY: The Landlord hereby leases to Tenant the following described property: ${var:property_address} ("Premises").

TERMS:

1. LEASE TERM
This lease shall commence on ${var:start_date} and continue for ${var:lease_term}.

2. RENT
Tenant agrees to pay rent in the amount of ${var:monthly_rent} per month, due on the first day of each month.

3. SECURITY DEPOSIT
Tenant has deposited with Landlord the sum of ${var:security_deposit} as a security deposit.

4. USE OF PREMISES
The Premises shall be used and occupied by Tenant exclusively as a residential dwelling.

5. MAINTENANCE AND REPAIRS
Tenant shall maintain the Premises in good condition and shall be responsible for minor repairs and maintenance.

6. GOVERNING LAW
This Lease shall be governed by the laws of the jurisdiction where the property is located.

7. ENTIRE AGREEMENT
This Lease constitutes the entire agreement between the parties.

IN WITNESS WHEREOF, the parties have executed this Lease as of the date first written above.

LANDLORD:                          TENANT:

_________________________         _________________________
${var:landlord}                        ${var:tenant}

Date: _______________             Date: _______________
"#;

impl DocumentType {
    pub fn template(&self) -> &'static str {
        match self {
            Self::Nda => NDA_TEMPLATE,
            Self::Contract => CONTRACT_TEMPLATE,
            Self::Lease => LEASE_TEMPLATE,
        }
    }
}

fn non_empty<'a>(collected: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    collected
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Fill the predefined template of `doc_type` with the collected answers
pub fn render_document(
    doc_type: DocumentType,
    collected: &HashMap<String, String>,
    date: &str,
) -> Result<String, TemplateError> {
    let mut values = collected.clone();
    values.insert("date".to_string(), date.to_string());

    if doc_type == DocumentType::Nda {
        for party in ["disclosing_party", "receiving_party"] {
            let formatted = non_empty(collected, &format!("{}_address", party))
                .map(|address| format!(" (Address: {})", address))
                .unwrap_or_default();
            values.insert(format!("{}_address_formatted", party), formatted);
        }

        let exclusions = non_empty(collected, "specific_exclusions")
            .map(|exclusions| format!("Additional exclusions: {}\n", exclusions))
            .unwrap_or_default();
        values.insert("specific_exclusions_formatted".to_string(), exclusions);
    }

    PromptTemplate::parse(doc_type.template())?.render(&values)
}

/// Collected answers as a bullet list in schema order, e.g. "- Monthly Rent: $1,500"
pub fn format_collected_info(doc_type: DocumentType, collected: &HashMap<String, String>) -> String {
    let lines: Vec<String> = doc_type
        .fields()
        .iter()
        .filter_map(|field| {
            collected
                .get(field.key)
                .map(|value| format!("- {}: {}", title_case(field.key), value))
        })
        .collect();

    if lines.is_empty() {
        "None".to_string()
    } else {
        lines.join("\n")
    }
}

fn title_case(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
