//! Sample dataset generation for demos and the dashboard.

use crate::error::Result;
use crate::manager::{IngestRequest, LakeManager};
use crate::table::{Column, ColumnValues, Table};
use chrono::{Duration, NaiveDate};
use rand::Rng;

const CITIES: [&str; 4] = ["New York", "London", "Tokyo", "Paris"];
const CATEGORIES: [&str; 3] = ["Electronics", "Clothing", "Books"];

/// Builds a synthetic customer master table.
pub fn customers(rows: usize) -> Result<Table> {
    let mut rng = rand::thread_rng();
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");

    let ids: Vec<i64> = (1..=rows as i64).collect();
    let names: Vec<String> = (1..=rows).map(|i| format!("Customer_{i}")).collect();
    let emails: Vec<String> = (1..=rows).map(|i| format!("customer{i}@example.com")).collect();
    let ages: Vec<i64> = (0..rows).map(|_| rng.gen_range(18..80)).collect();
    let cities: Vec<String> = (0..rows)
        .map(|_| CITIES[rng.gen_range(0..CITIES.len())].to_string())
        .collect();
    let signup_dates: Vec<String> = (0..rows)
        .map(|i| (start + Duration::days(i as i64)).to_string())
        .collect();

    Table::new(vec![
        Column::new("customer_id", ColumnValues::Int(ids)),
        Column::new("name", ColumnValues::Str(names)),
        Column::new("email", ColumnValues::Str(emails)),
        Column::new("age", ColumnValues::Int(ages)),
        Column::new("city", ColumnValues::Str(cities)),
        Column::new("signup_date", ColumnValues::Str(signup_dates)),
    ])
}

/// Builds a synthetic transaction table referencing `customer_count`
/// customers.
pub fn transactions(rows: usize, customer_count: usize) -> Result<Table> {
    let mut rng = rand::thread_rng();

    let ids: Vec<i64> = (1..=rows as i64).collect();
    let customer_ids: Vec<i64> = (0..rows)
        .map(|_| rng.gen_range(1..=customer_count.max(1) as i64))
        .collect();
    let amounts: Vec<f64> = (0..rows).map(|_| rng.gen_range(10.0..1000.0)).collect();
    let categories: Vec<String> = (0..rows)
        .map(|_| CATEGORIES[rng.gen_range(0..CATEGORIES.len())].to_string())
        .collect();

    Table::new(vec![
        Column::new("transaction_id", ColumnValues::Int(ids)),
        Column::new("customer_id", ColumnValues::Int(customer_ids)),
        Column::new("amount", ColumnValues::Float(amounts)),
        Column::new("product_category", ColumnValues::Str(categories)),
    ])
}

/// Ingests the standard sample datasets into the raw zone and returns the
/// new asset ids.
pub fn generate(manager: &LakeManager) -> Result<Vec<String>> {
    let customers_id = manager.ingest(
        &customers(1000)?,
        &IngestRequest::new("customers", "data_team")
            .with_description("Customer master data")
            .with_tags(vec!["customers".into(), "raw".into(), "pii".into()]),
    )?;

    let transactions_id = manager.ingest(
        &transactions(5000, 1000)?,
        &IngestRequest::new("transactions", "data_team")
            .with_description("Transaction records")
            .with_tags(vec!["transactions".into(), "raw".into(), "financial".into()]),
    )?;

    Ok(vec![customers_id, transactions_id])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customers_shape() {
        let table = customers(10).unwrap();
        assert_eq!(table.row_count(), 10);
        assert_eq!(table.schema().get("customer_id").map(String::as_str), Some("int"));
        assert_eq!(table.schema().get("city").map(String::as_str), Some("string"));
    }

    #[test]
    fn test_transactions_reference_customers() {
        let table = transactions(50, 10).unwrap();
        let ColumnValues::Int(ids) = &table.column("customer_id").unwrap().values else {
            panic!("customer_id should be an int column");
        };
        assert!(ids.iter().all(|&id| (1..=10).contains(&id)));
    }
}
