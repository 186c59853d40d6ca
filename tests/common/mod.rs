#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use smart_store_etl::config::EtlConfig;
use smart_store_etl::entity::Entity;
use tempfile::{TempDir, tempdir};

pub const CUSTOMERS: &str = "\
CustomerID,FirstName,Region,LoyaltyPoints,PreferredContact
1001,  william ,east,1200,Email
1002,Susan,WEST,,Phone
1003,ana,north, 300, EMAIL 
1001,  william ,east,1200,Email
1004,Liu,south,50,
";

pub const PRODUCTS: &str = "\
ProductID,ProductName,Category,Brand,Price,StockQuantity
101,Laptop,Electronics,Acme,799.99,40
102,Hoodie,,Northwind,39.99,
103,Cable,Electronics,,-5,10
104,Jacket,Clothing,Northwind,,30
";

pub const SALES: &str = "\
TransactionID,SaleDate,CustomerID,ProductID,StoreID,CampaignID,SaleAmount,DiscountPercent,PaymentType
550,2024-01-06,1001,101,404,0,10,5, credit card
551,2024-01-06,1002,102,403,0,,,PAYPAL
552,2024-01-16,1003,103,402,0,20,10,cash
553,2024-01-21,1004,104,401,0,-5,0,Cash
554,2024-01-23,1001,101,404,0,30,,debit
";

/// Scratch directory laid out like a project data folder.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config(&self) -> EtlConfig {
        EtlConfig::rooted_at(self.path())
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    pub fn write_raw(&self, entity: Entity, contents: &str) -> PathBuf {
        let path = self.config().raw_path(entity);
        let relative = path.strip_prefix(self.path()).expect("raw path under workspace");
        self.write(relative.to_str().expect("utf-8 path"), contents)
    }

    /// Seeds all three raw snapshots with the standard fixtures.
    pub fn seed_raw(&self) {
        self.write_raw(Entity::Customer, CUSTOMERS);
        self.write_raw(Entity::Product, PRODUCTS);
        self.write_raw(Entity::Sale, SALES);
    }

    pub fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).expect("read file")
    }
}

/// Reads a CSV file into its header and string rows.
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("open csv");
    let headers = reader
        .headers()
        .expect("headers")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.expect("record").iter().map(str::to_string).collect())
        .collect();
    (headers, rows)
}
