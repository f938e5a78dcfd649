use crate::domain::model::Customer;
use crate::utils::error::{ReportError, Result};
use csv::WriterBuilder;

pub const CUSTOMER_HEADER: [&str; 4] = ["Name", "ID", "isactive", "status"];

/// One value per row, no header.
pub fn encode_single_column<S: AsRef<str>>(values: &[S]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    for value in values {
        writer.write_record([value.as_ref()])?;
    }

    into_bytes(writer)
}

/// Header row followed by one row per customer; absent fields become empty cells.
pub fn encode_customer_table(customers: &[Customer]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(CUSTOMER_HEADER)?;

    for customer in customers {
        let is_active = customer
            .is_active
            .map(|active| active.to_string())
            .unwrap_or_default();
        writer.write_record([
            customer.name.as_str(),
            customer.id.as_str(),
            is_active.as_str(),
            customer.status.as_deref().unwrap_or(""),
        ])?;
    }

    into_bytes(writer)
}

fn into_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| ReportError::IoError(e.into_error()))
}
