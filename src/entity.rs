use std::fmt;

use clap::ValueEnum;

use crate::clean::{
    Casing, CategoricalField, CleaningPlan, NumericField, NumericFill, TextField,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Entity {
    Customer,
    Product,
    Sale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Dimension,
    Fact,
}

static CUSTOMER_PLAN: CleaningPlan = CleaningPlan {
    numeric: &[NumericField {
        name: "loyaltypoints",
        fill: NumericFill::Constant(0),
        non_negative: false,
        required: false,
    }],
    categorical: &[CategoricalField {
        name: "preferredcontact",
        sentinel: "unknown",
        required: false,
    }],
    text: &[
        TextField {
            name: "firstname",
            casing: Casing::Title,
            required: false,
        },
        TextField {
            name: "region",
            casing: Casing::Title,
            required: false,
        },
        TextField {
            name: "preferredcontact",
            casing: Casing::Lower,
            required: false,
        },
    ],
};

static PRODUCT_PLAN: CleaningPlan = CleaningPlan {
    numeric: &[
        NumericField {
            name: "price",
            fill: NumericFill::Median,
            non_negative: true,
            required: false,
        },
        NumericField {
            name: "stockquantity",
            fill: NumericFill::Median,
            non_negative: true,
            required: false,
        },
    ],
    categorical: &[
        CategoricalField {
            name: "category",
            sentinel: "Unknown",
            required: false,
        },
        CategoricalField {
            name: "brand",
            sentinel: "Unknown",
            required: false,
        },
    ],
    text: &[],
};

static SALE_PLAN: CleaningPlan = CleaningPlan {
    numeric: &[
        NumericField {
            name: "saleamount",
            fill: NumericFill::Median,
            non_negative: true,
            required: true,
        },
        NumericField {
            name: "discountpercent",
            fill: NumericFill::Constant(0),
            non_negative: false,
            required: true,
        },
    ],
    categorical: &[],
    text: &[TextField {
        name: "paymenttype",
        casing: Casing::Title,
        required: true,
    }],
};

impl Entity {
    pub const ALL: [Entity; 3] = [Entity::Customer, Entity::Product, Entity::Sale];

    pub fn name(self) -> &'static str {
        match self {
            Entity::Customer => "customer",
            Entity::Product => "product",
            Entity::Sale => "sale",
        }
    }

    pub fn raw_file(self) -> &'static str {
        match self {
            Entity::Customer => "customers_data.csv",
            Entity::Product => "products_data.csv",
            Entity::Sale => "sales_data.csv",
        }
    }

    pub fn prepared_file(self) -> &'static str {
        match self {
            Entity::Customer => "customers_prepared.csv",
            Entity::Product => "products_prepared.csv",
            Entity::Sale => "sales_prepared.csv",
        }
    }

    pub fn warehouse_table(self) -> &'static str {
        match self {
            Entity::Customer => "dim_customer",
            Entity::Product => "dim_product",
            Entity::Sale => "fact_sales",
        }
    }

    pub fn table_kind(self) -> TableKind {
        match self {
            Entity::Customer | Entity::Product => TableKind::Dimension,
            Entity::Sale => TableKind::Fact,
        }
    }

    pub fn plan(self) -> &'static CleaningPlan {
        match self {
            Entity::Customer => &CUSTOMER_PLAN,
            Entity::Product => &PRODUCT_PLAN,
            Entity::Sale => &SALE_PLAN,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_sales_is_a_fact_table() {
        let facts = Entity::ALL
            .iter()
            .filter(|e| e.table_kind() == TableKind::Fact)
            .map(|e| e.warehouse_table())
            .collect::<Vec<_>>();
        assert_eq!(facts, vec!["fact_sales"]);
    }

    #[test]
    fn sale_plan_requires_amount() {
        assert!(
            Entity::Sale
                .plan()
                .numeric
                .iter()
                .any(|f| f.name == "saleamount" && f.required && f.non_negative)
        );
    }
}
