/// Paging dialect selected from the backend's reported product name.
///
/// Anything unrecognized falls through to [`Dialect::Other`] and pagination
/// leaves the statement untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Oracle,
    Other,
}

impl Dialect {
    pub fn from_product_name(name: &str) -> Self {
        let name = name.trim().to_ascii_uppercase();
        match name.as_str() {
            "MYSQL" => Dialect::MySql,
            "ORACLE" => Dialect::Oracle,
            _ => Dialect::Other,
        }
    }
}
