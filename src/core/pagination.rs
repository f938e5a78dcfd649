use crate::adapters::ApiClient;
use crate::domain::model::Customer;
use crate::utils::error::Result;
use std::collections::HashSet;

/// Walks the customer listing page by page until a page shorter than
/// `page_size` comes back. A full final page therefore costs one extra
/// (empty) request. Ids already seen in this run are skipped, so
/// overlapping pages never yield duplicates. Any failed page aborts the
/// whole walk.
pub async fn fetch_all_customers(api: &ApiClient, page_size: u32) -> Result<Vec<Customer>> {
    let mut all_customers = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut page = 0u32;

    loop {
        let batch = api.customers_page(page, page_size).await?.items;
        let received = batch.len();

        let before = all_customers.len();
        for customer in batch {
            if seen_ids.insert(customer.id.clone()) {
                all_customers.push(customer);
            }
        }
        tracing::debug!(
            "Page {}: {} customers received, {} new",
            page,
            received,
            all_customers.len() - before
        );

        if received < page_size as usize {
            break;
        }
        page += 1;
    }

    tracing::info!(
        "📋 Fetched {} unique customers over {} pages",
        all_customers.len(),
        page + 1
    );
    Ok(all_customers)
}
