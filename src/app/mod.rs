pub mod reports;

use crate::adapters::ApiClient;
use crate::utils::error::Result;

#[cfg(feature = "cli")]
use crate::{
    config::{cli::Command, AppConfig},
    core::engine::Report,
};
#[cfg(feature = "cli")]
use reports::{
    CustomersReport, CustomersWithoutPropertiesReport, FetchOptions, MultiAddressPropertiesReport,
    PropertiesReport,
};

/// Maps a subcommand to its report. `Test` has none: it only checks credentials.
#[cfg(feature = "cli")]
pub fn report_for(command: Command, config: &AppConfig) -> Option<Box<dyn Report>> {
    match command {
        Command::GetCustomers => Some(Box::new(CustomersReport {
            page_size: config.page_size,
        })),
        Command::GetCustomersNoProperties => Some(Box::new(CustomersWithoutPropertiesReport {
            options: FetchOptions::for_existence_checks(config),
        })),
        Command::GetProperties => Some(Box::new(PropertiesReport {
            options: FetchOptions::for_property_fetch(config),
        })),
        Command::GetPropertiesMoreThanTwoAddress => Some(Box::new(MultiAddressPropertiesReport {
            options: FetchOptions::for_property_fetch(config),
        })),
        Command::Test => None,
    }
}

/// Performs one token exchange to prove the credentials work.
pub async fn check_credentials(api: &ApiClient) -> Result<()> {
    api.session().token().await?;
    Ok(())
}
