// src/forecast/definitions/mod.rs
pub mod cell_value;
pub mod column_classifier;
pub mod column_descriptor;
pub mod column_filters;
pub mod forecast_row;
pub mod org_unit;
pub mod permission;
pub mod selection;

pub use cell_value::CellValue;
pub use column_classifier::{forecast_columns, is_forecast_column, ForecastSuffixRule};
pub use column_descriptor::{derive_columns, ColumnDescriptor};
pub use column_filters::{distinct_values, ColumnFilters};
pub use forecast_row::{row_key, ForecastRow, RowKey};
pub use org_unit::{ChangeSetMode, OrgUnit, Policy, PostRule};
pub use permission::PermissionConfig;
pub use selection::Selection;
