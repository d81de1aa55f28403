#![allow(clippy::unwrap_used)]

use super::*;
use crate::ledger::{self, OccurrenceSource};
use crate::models::{Ledger, MonthKey};
use rust_decimal_macros::dec;

fn feb() -> MonthKey {
    MonthKey::parse("2024-02").unwrap()
}

fn sample_projection() -> ProjectionResult {
    let jan = MonthKey::parse("2024-01").unwrap();
    let l = ledger::add_income(&Ledger::default(), "Salary", dec!(5000), &jan).unwrap();
    let l = ledger::add_fixed_expense(&l, "Rent, flat 2", dec!(1500.50), &jan).unwrap();
    let l = ledger::add_installment_plan(&l, "Laptop", dec!(1200), 3, &jan).unwrap();
    let rent = l.fixed_expenses[0].id;
    let l = ledger::toggle_status(&l, OccurrenceSource::Fixed(rent), &feb());
    ledger::project(&l, &feb())
}

#[test]
fn test_rows_and_header() {
    let mut out = Vec::new();
    let count = write_month_csv(&mut out, &sample_projection()).unwrap();
    assert_eq!(count, 3);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "kind,description,amount,status",
            "income,Salary,5000.00,",
            "fixed,\"Rent, flat 2\",1500.50,paid",
            "installment,Laptop (2/3),400.00,pending",
        ]
    );
}

#[test]
fn test_empty_month_writes_header_only() {
    let projection = ledger::project(&Ledger::default(), &feb());
    let mut out = Vec::new();
    assert_eq!(write_month_csv(&mut out, &projection).unwrap(), 0);
    assert_eq!(String::from_utf8(out).unwrap(), "kind,description,amount,status\n");
}

#[test]
fn test_export_month_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let count = export_month(&path, &sample_projection()).unwrap();
    assert_eq!(count, 3);

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[1][1], "Rent, flat 2");
}

#[test]
fn test_default_path_names_month() {
    assert!(default_path(&feb()).ends_with("/fintrack-export-2024-02.csv"));
}
