use smart_store_etl::table::Table;
use smart_store_etl::warehouse::{LoadMode, LoadOptions, Warehouse};

const CREATE: LoadOptions = LoadOptions {
    mode: LoadMode::Create,
    truncate: false,
};
const APPEND: LoadOptions = LoadOptions {
    mode: LoadMode::Append,
    truncate: false,
};

fn customers() -> Table {
    Table::from_raw(
        &["customerid", "firstname", "loyaltypoints", "order_col"],
        &[
            vec!["1001", "William", "1200", "a"],
            vec!["1002", "Susan", "0", "b"],
            vec!["1003", "Ana", "300", ""],
        ],
    )
    .unwrap()
}

#[test]
fn create_mode_builds_table_with_snapshot_row_count() {
    let mut warehouse = Warehouse::in_memory().unwrap();
    let report = warehouse.load_table("dim_customer", &customers(), CREATE).unwrap();
    assert_eq!(report.rows_inserted, 3);
    assert_eq!(report.rows_after, 3);
    assert_eq!(
        warehouse.table_columns("dim_customer").unwrap(),
        vec!["customerid", "firstname", "loyaltypoints", "order_col"]
    );
}

#[test]
fn create_mode_replaces_existing_table() {
    let mut warehouse = Warehouse::in_memory().unwrap();
    warehouse.load_table("dim_customer", &customers(), CREATE).unwrap();
    let report = warehouse.load_table("dim_customer", &customers(), CREATE).unwrap();
    assert_eq!(report.rows_after, 3);
}

#[test]
fn append_mode_duplicates_rows_on_rerun() {
    let mut warehouse = Warehouse::in_memory().unwrap();
    warehouse.load_table("dim_customer", &customers(), CREATE).unwrap();
    let report = warehouse.load_table("dim_customer", &customers(), APPEND).unwrap();
    assert_eq!(report.rows_inserted, 3);
    assert_eq!(warehouse.row_count("dim_customer").unwrap(), 6);
}

#[test]
fn append_with_truncate_is_repeatable() {
    let mut warehouse = Warehouse::in_memory().unwrap();
    warehouse.load_table("dim_customer", &customers(), CREATE).unwrap();
    let options = LoadOptions {
        mode: LoadMode::Append,
        truncate: true,
    };
    for _ in 0..3 {
        let report = warehouse.load_table("dim_customer", &customers(), options).unwrap();
        assert_eq!(report.rows_deleted, 3);
        assert_eq!(report.rows_after, 3);
    }
}

#[test]
fn append_into_missing_table_is_a_load_error() {
    let mut warehouse = Warehouse::in_memory().unwrap();
    let err = warehouse
        .load_table("dim_customer", &customers(), APPEND)
        .unwrap_err();
    assert_eq!(err.kind(), "LoadError");
    assert!(!warehouse.table_exists("dim_customer").unwrap());
}

#[test]
fn append_with_different_column_count_is_a_load_error() {
    let mut warehouse = Warehouse::in_memory().unwrap();
    warehouse.load_table("dim_customer", &customers(), CREATE).unwrap();
    let narrow = Table::from_raw(&["customerid", "firstname"], &[vec!["1", "x"]]).unwrap();
    let err = warehouse.load_table("dim_customer", &narrow, APPEND).unwrap_err();
    assert_eq!(err.kind(), "LoadError");
    assert!(err.to_string().contains("Column count mismatch"));
    assert_eq!(warehouse.row_count("dim_customer").unwrap(), 3);
}

#[test]
fn append_with_type_mismatch_rolls_back_that_table_only() {
    let mut warehouse = Warehouse::in_memory().unwrap();
    warehouse.load_table("dim_customer", &customers(), CREATE).unwrap();
    let bad = Table::from_raw(
        &["customerid", "firstname", "loyaltypoints", "order_col"],
        &[
            vec!["1004", "Liu", "50", "c"],
            vec!["1005", "Kai", "lots", "d"],
        ],
    )
    .unwrap();
    let err = warehouse.load_table("dim_customer", &bad, APPEND).unwrap_err();
    assert_eq!(err.kind(), "LoadError");
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(warehouse.row_count("dim_customer").unwrap(), 3);
}

#[test]
fn failure_on_one_table_keeps_earlier_tables() {
    let mut warehouse = Warehouse::in_memory().unwrap();
    warehouse.load_table("dim_customer", &customers(), CREATE).unwrap();
    assert!(
        warehouse
            .load_table("fact_sales", &customers(), APPEND)
            .is_err()
    );
    assert_eq!(warehouse.row_count("dim_customer").unwrap(), 3);
}

#[test]
fn header_only_snapshot_creates_empty_table() {
    let mut warehouse = Warehouse::in_memory().unwrap();
    let empty = Table::new(vec!["price".to_string(), "stockquantity".to_string()]);
    let report = warehouse.load_table("dim_product", &empty, CREATE).unwrap();
    assert_eq!(report.rows_after, 0);
    assert!(warehouse.table_exists("dim_product").unwrap());
}

#[test]
fn drop_table_removes_table() {
    let mut warehouse = Warehouse::in_memory().unwrap();
    warehouse.load_table("dim_customer", &customers(), CREATE).unwrap();
    warehouse.drop_table("dim_customer").unwrap();
    assert!(!warehouse.table_exists("dim_customer").unwrap());
    warehouse.close().unwrap();
}
