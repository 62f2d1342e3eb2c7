//! Catalog listing

use serde::Serialize;

use brewbite_e2e::{catalog, Check};

use crate::output::{print_list, OutputFormat, TableDisplay};

#[derive(Serialize)]
pub struct CheckDisplay {
    pub id: String,
    pub order: u32,
    pub description: String,
}

impl From<&Check> for CheckDisplay {
    fn from(check: &Check) -> Self {
        Self {
            id: check.id.to_string(),
            order: check.order,
            description: check.description.to_string(),
        }
    }
}

impl TableDisplay for CheckDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Priority", "Description"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.clone(), self.order.to_string(), self.description.clone()]
    }
}

pub fn execute(format: OutputFormat) {
    let mut checks = catalog();
    checks.sort_by_key(|check| check.order);
    let rows: Vec<CheckDisplay> = checks.iter().map(CheckDisplay::from).collect();
    print_list(&rows, format);
}
