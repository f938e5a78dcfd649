use crate::adapters::ApiClient;
use crate::config::AppConfig;
use crate::core::aggregator::fan_out;
use crate::core::engine::{Report, ReportRows};
use crate::core::filters;
use crate::core::pagination::fetch_all_customers;
use crate::domain::model::{Customer, Property};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub const CUSTOMERS_FILE: &str = "customers.csv";
pub const NO_PROPERTIES_FILE: &str = "customer_list_no_properties.csv";
pub const PROPERTIES_FILE: &str = "property_list.csv";
pub const MORE_THAN_TWO_ADDRESSES_FILE: &str = "property_list_more_than_two_address.csv";

/// Paging and fan-out knobs shared by every report.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub page_size: u32,
    pub workers: usize,
    pub allow_partial: bool,
}

impl FetchOptions {
    pub fn for_existence_checks(config: &AppConfig) -> Self {
        Self {
            page_size: config.page_size,
            workers: config.existence_check_workers,
            allow_partial: config.allow_partial,
        }
    }

    pub fn for_property_fetch(config: &AppConfig) -> Self {
        Self {
            page_size: config.page_size,
            workers: config.property_workers,
            allow_partial: config.allow_partial,
        }
    }
}

/// Existence check for one customer: its name when it has no properties.
pub async fn fetch_customer_if_no_properties(
    api: Arc<ApiClient>,
    customer: Customer,
) -> Result<Option<String>> {
    let page = api.customer_properties(&customer.id, false).await?;
    Ok(filters::has_no_properties(&page).then_some(customer.name))
}

/// Full property fetch for one customer, addresses included.
pub async fn fetch_properties(api: Arc<ApiClient>, customer: Customer) -> Result<Vec<Property>> {
    let page = api.customer_properties(&customer.id, true).await?;
    tracing::debug!(
        "Customer {} has {} properties",
        customer.id,
        page.items.len()
    );
    Ok(page.items)
}

/// Drops customers the listing returned without an id; there is no
/// properties endpoint to ask about them.
fn with_ids(customers: Vec<Customer>) -> Vec<Customer> {
    customers
        .into_iter()
        .filter(|customer| {
            let keep = !customer.id.is_empty();
            if !keep {
                tracing::warn!("Skipping customer {:?} with no id", customer.name);
            }
            keep
        })
        .collect()
}

pub async fn customers_without_properties(
    api: Arc<ApiClient>,
    options: FetchOptions,
) -> Result<Vec<String>> {
    let customers = with_ids(fetch_all_customers(&api, options.page_size).await?);
    tracing::info!(
        "Checking properties for {} customers with {} workers",
        customers.len(),
        options.workers
    );

    let outcome = fan_out(customers, options.workers, |customer| {
        fetch_customer_if_no_properties(api.clone(), customer)
    })
    .await;

    let names = outcome.into_result(options.allow_partial)?;
    Ok(names.into_iter().flatten().collect())
}

pub async fn all_properties(api: Arc<ApiClient>, options: FetchOptions) -> Result<Vec<Property>> {
    let customers = with_ids(fetch_all_customers(&api, options.page_size).await?);
    tracing::info!(
        "Fetching properties for {} customers with {} workers",
        customers.len(),
        options.workers
    );

    let outcome = fan_out(customers, options.workers, |customer| {
        fetch_properties(api.clone(), customer)
    })
    .await;

    let per_customer = outcome.into_result(options.allow_partial)?;
    Ok(per_customer.into_iter().flatten().collect())
}

pub struct CustomersReport {
    pub page_size: u32,
}

#[async_trait]
impl Report for CustomersReport {
    fn label(&self) -> &'static str {
        "Customers"
    }

    fn file_name(&self) -> &'static str {
        CUSTOMERS_FILE
    }

    async fn extract(&self, api: Arc<ApiClient>) -> Result<ReportRows> {
        let customers = fetch_all_customers(&api, self.page_size).await?;
        Ok(ReportRows::CustomerTable(customers))
    }
}

pub struct CustomersWithoutPropertiesReport {
    pub options: FetchOptions,
}

#[async_trait]
impl Report for CustomersWithoutPropertiesReport {
    fn label(&self) -> &'static str {
        "Customers No Properties"
    }

    fn file_name(&self) -> &'static str {
        NO_PROPERTIES_FILE
    }

    async fn extract(&self, api: Arc<ApiClient>) -> Result<ReportRows> {
        let names = customers_without_properties(api, self.options).await?;
        Ok(ReportRows::SingleColumn(names))
    }
}

/// One row per property, holding the property's JSON object.
pub struct PropertiesReport {
    pub options: FetchOptions,
}

#[async_trait]
impl Report for PropertiesReport {
    fn label(&self) -> &'static str {
        "Properties"
    }

    fn file_name(&self) -> &'static str {
        PROPERTIES_FILE
    }

    async fn extract(&self, api: Arc<ApiClient>) -> Result<ReportRows> {
        let properties = all_properties(api, self.options).await?;
        let rows = properties
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ReportRows::SingleColumn(rows))
    }
}

pub struct MultiAddressPropertiesReport {
    pub options: FetchOptions,
}

#[async_trait]
impl Report for MultiAddressPropertiesReport {
    fn label(&self) -> &'static str {
        "Properties with more than 2 Addresses"
    }

    fn file_name(&self) -> &'static str {
        MORE_THAN_TWO_ADDRESSES_FILE
    }

    async fn extract(&self, api: Arc<ApiClient>) -> Result<ReportRows> {
        let properties = all_properties(api, self.options).await?;
        Ok(ReportRows::SingleColumn(filters::more_than_two_addresses(
            &properties,
        )))
    }
}
