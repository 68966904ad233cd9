// CSV parsing for bulk investor and allocation uploads

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::models::{KycStatus, TokenStandard};
use crate::domain::validation::{
    is_valid_email, is_valid_wallet_address, non_blank, ValidationIssue,
};
use crate::error::{LedgerError, LedgerResult};

/// Rows that passed validation plus the issues of the rows that did not
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBatch<T> {
    pub rows: Vec<T>,
    pub issues: Vec<ValidationIssue>,
}

/// One valid line of an investor upload
#[derive(Debug, Clone, PartialEq)]
pub struct InvestorRow {
    pub row: u64,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub investor_type: Option<String>,
    pub wallet_address: Option<String>,
    pub kyc_status: Option<KycStatus>,
    pub notes: Option<String>,
}

/// One valid line of an allocation upload
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRow {
    pub row: u64,
    pub subscription_id: Uuid,
    pub token_type: TokenStandard,
    pub token_amount: Decimal,
    pub notes: Option<String>,
}

const INVESTOR_REQUIRED: &[&str] = &["name", "email"];
const ALLOCATION_REQUIRED: &[&str] = &["subscription_id", "token_type", "token_amount"];

/// Header positions by lower-cased column name
struct Columns(HashMap<String, usize>);

impl Columns {
    fn read(reader: &mut csv::Reader<&[u8]>, required: &[&str]) -> LedgerResult<Self> {
        let headers = reader
            .headers()
            .map_err(|e| LedgerError::invalid("header", "", format!("unreadable CSV header: {}", e)))?;

        let columns: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(index, name)| (name.trim().to_ascii_lowercase(), index))
            .collect();

        let missing: Vec<ValidationIssue> = required
            .iter()
            .filter(|name| !columns.contains_key(**name))
            .map(|name| {
                ValidationIssue::new(name, "", "required column is missing").at_row(1)
            })
            .collect();
        if !missing.is_empty() {
            return Err(LedgerError::Validation(missing));
        }

        Ok(Columns(columns))
    }

    fn get<'r>(&self, record: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        self.0
            .get(name)
            .and_then(|index| record.get(*index))
            .map(str::trim)
    }

    fn text(&self, record: &csv::StringRecord, name: &str) -> Option<String> {
        non_blank(self.get(record, name))
    }
}

fn reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input.as_bytes())
}

fn line_of(record: &csv::StringRecord, fallback: u64) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(fallback)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

/// Parses an investor upload. Columns: `name`, `email` (required),
/// `company`, `type`, `wallet_address`, `kyc_status`, `notes`.
pub fn parse_investor_csv(input: &str) -> LedgerResult<ParsedBatch<InvestorRow>> {
    let mut reader = reader(input);
    let columns = Columns::read(&mut reader, INVESTOR_REQUIRED)?;

    let mut rows = Vec::new();
    let mut issues = Vec::new();
    let mut seen_emails: HashSet<String> = HashSet::new();

    for (index, result) in reader.records().enumerate() {
        let fallback_line = index as u64 + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                issues.push(ValidationIssue::new("record", "", e.to_string()).at_row(fallback_line));
                continue;
            }
        };
        if is_blank(&record) {
            continue;
        }

        let line = line_of(&record, fallback_line);
        let mut row_issues = Vec::new();

        let name = columns.text(&record, "name");
        if name.is_none() {
            row_issues.push(ValidationIssue::new("name", "", "name is required"));
        }

        let email = columns
            .text(&record, "email")
            .map(|e| e.to_ascii_lowercase());
        match &email {
            None => row_issues.push(ValidationIssue::new("email", "", "email is required")),
            Some(email) if !is_valid_email(email) => row_issues.push(ValidationIssue::new(
                "email",
                email.clone(),
                "not a valid email address",
            )),
            Some(email) if seen_emails.contains(email) => row_issues.push(ValidationIssue::new(
                "email",
                email.clone(),
                "duplicate email in this upload",
            )),
            Some(_) => {}
        }

        let wallet_address = columns.text(&record, "wallet_address");
        if let Some(wallet) = &wallet_address {
            if !is_valid_wallet_address(wallet) {
                row_issues.push(ValidationIssue::new(
                    "wallet_address",
                    wallet.clone(),
                    "must be 0x followed by 40 hex characters",
                ));
            }
        }

        let kyc_status = match columns.text(&record, "kyc_status") {
            None => None,
            Some(raw) => match KycStatus::from_str(&raw) {
                Ok(status) => Some(status),
                Err(message) => {
                    row_issues.push(ValidationIssue::new("kyc_status", raw, message));
                    None
                }
            },
        };

        if !row_issues.is_empty() {
            issues.extend(row_issues.into_iter().map(|issue| issue.at_row(line)));
            continue;
        }

        // Both present once no issue was recorded
        let (Some(name), Some(email)) = (name, email) else {
            continue;
        };
        seen_emails.insert(email.clone());

        rows.push(InvestorRow {
            row: line,
            name,
            email,
            company: columns.text(&record, "company"),
            investor_type: columns.text(&record, "type"),
            wallet_address,
            kyc_status,
            notes: columns.text(&record, "notes"),
        });
    }

    Ok(ParsedBatch { rows, issues })
}

/// Parses an allocation upload. Columns: `subscription_id`, `token_type`,
/// `token_amount` (required), `notes`. Other columns are ignored, so an
/// export can be fed back in.
pub fn parse_allocation_csv(input: &str) -> LedgerResult<ParsedBatch<AllocationRow>> {
    let mut reader = reader(input);
    let columns = Columns::read(&mut reader, ALLOCATION_REQUIRED)?;

    let mut rows = Vec::new();
    let mut issues = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let fallback_line = index as u64 + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                issues.push(ValidationIssue::new("record", "", e.to_string()).at_row(fallback_line));
                continue;
            }
        };
        if is_blank(&record) {
            continue;
        }

        let line = line_of(&record, fallback_line);
        let mut row_issues = Vec::new();

        let raw_subscription = columns.get(&record, "subscription_id").unwrap_or_default();
        let subscription_id = match Uuid::parse_str(raw_subscription) {
            Ok(id) => Some(id),
            Err(_) => {
                row_issues.push(ValidationIssue::new(
                    "subscription_id",
                    raw_subscription,
                    "not a valid subscription id",
                ));
                None
            }
        };

        let raw_type = columns.get(&record, "token_type").unwrap_or_default();
        let token_type = match TokenStandard::from_str(raw_type) {
            Ok(token_type) => Some(token_type),
            Err(message) => {
                row_issues.push(ValidationIssue::new("token_type", raw_type, message));
                None
            }
        };

        let raw_amount = columns.get(&record, "token_amount").unwrap_or_default();
        let token_amount = match Decimal::from_str(raw_amount) {
            Ok(amount) if amount > Decimal::ZERO => Some(amount),
            Ok(_) => {
                row_issues.push(ValidationIssue::new(
                    "token_amount",
                    raw_amount,
                    "must be greater than zero",
                ));
                None
            }
            Err(_) => {
                row_issues.push(ValidationIssue::new(
                    "token_amount",
                    raw_amount,
                    "not a decimal number",
                ));
                None
            }
        };

        match (subscription_id, token_type, token_amount) {
            (Some(subscription_id), Some(token_type), Some(token_amount))
                if row_issues.is_empty() =>
            {
                rows.push(AllocationRow {
                    row: line,
                    subscription_id,
                    token_type,
                    token_amount,
                    notes: columns.text(&record, "notes"),
                });
            }
            _ => issues.extend(row_issues.into_iter().map(|issue| issue.at_row(line))),
        }
    }

    Ok(ParsedBatch { rows, issues })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    #[test]
    fn test_investor_upload_with_optional_columns() {
        let input = format!(
            "name,email,company,type,wallet_address,kyc_status,notes\n\
             Ada Lovelace,ADA@example.com,Engines Ltd,individual,{},approved,first\n\
             Grace Hopper,grace@example.com,,,,,\n",
            WALLET
        );

        let batch = parse_investor_csv(&input).unwrap();
        assert!(batch.issues.is_empty(), "{:?}", batch.issues);
        assert_eq!(batch.rows.len(), 2);

        let ada = &batch.rows[0];
        assert_eq!(ada.row, 2);
        assert_eq!(ada.email, "ada@example.com");
        assert_eq!(ada.company.as_deref(), Some("Engines Ltd"));
        assert_eq!(ada.investor_type.as_deref(), Some("individual"));
        assert_eq!(ada.wallet_address.as_deref(), Some(WALLET));
        assert_eq!(ada.kyc_status, Some(KycStatus::Approved));

        let grace = &batch.rows[1];
        assert_eq!(grace.company, None);
        assert_eq!(grace.kyc_status, None);
    }

    #[test]
    fn test_bad_wallet_is_reported_with_row_and_value() {
        let input = "name,email,wallet_address\n\
                     Ada,ada@example.com,not-a-hex-address\n\
                     Grace,grace@example.com,\n";

        let batch = parse_investor_csv(input).unwrap();
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].email, "grace@example.com");

        assert_eq!(batch.issues.len(), 1);
        let issue = &batch.issues[0];
        assert_eq!(issue.row, Some(2));
        assert_eq!(issue.field, "wallet_address");
        assert_eq!(issue.value, "not-a-hex-address");
    }

    #[test]
    fn test_duplicate_email_in_batch() {
        let input = "name,email\nAda,ada@example.com\nAda Again,Ada@Example.com\n";
        let batch = parse_investor_csv(input).unwrap();
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.issues[0].row, Some(3));
        assert!(batch.issues[0].message.contains("duplicate"));
    }

    #[test]
    fn test_missing_required_column() {
        let err = parse_investor_csv("name,company\nAda,Engines\n").unwrap_err();
        match err {
            LedgerError::Validation(issues) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].field, "email");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kyc_status() {
        let input = "name,email,kyc_status\nAda,ada@example.com,verified\n";
        let batch = parse_investor_csv(input).unwrap();
        assert!(batch.rows.is_empty());
        assert_eq!(batch.issues[0].field, "kyc_status");
    }

    #[test]
    fn test_allocation_upload() {
        let subscription = Uuid::new_v4();
        let input = format!(
            "Subscription_ID, Token_Type ,token_amount,notes\n\
             {0},ERC-20,1500.5,seed\n\
             {0},erc721,0,\n\
             nope,ERC-99,abc,\n\
             \n\
             {0},ERC-1400,10,\n",
            subscription
        );

        let batch = parse_allocation_csv(&input).unwrap();
        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.rows[0].token_type, TokenStandard::Erc20);
        assert_eq!(batch.rows[0].token_amount, Decimal::new(15005, 1));
        assert_eq!(batch.rows[0].notes.as_deref(), Some("seed"));
        assert_eq!(batch.rows[1].token_type, TokenStandard::Erc1400);

        // Zero amount on line 3, three bad fields on line 4
        assert_eq!(batch.issues.len(), 4);
        assert!(batch.issues.iter().any(|i| i.row == Some(3) && i.field == "token_amount"));
        assert_eq!(batch.issues.iter().filter(|i| i.row == Some(4)).count(), 3);
    }
}
