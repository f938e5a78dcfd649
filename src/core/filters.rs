use crate::domain::model::{Property, PropertyPage};

/// True when the properties endpoint reports no properties for the customer.
pub fn has_no_properties(page: &PropertyPage) -> bool {
    page.total_count == 0
}

/// Company names of properties carrying more than two addresses, in input order.
pub fn more_than_two_addresses(properties: &[Property]) -> Vec<String> {
    properties
        .iter()
        .filter(|p| p.addresses.len() > 2)
        .map(|p| p.company_name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Address;
    use serde_json::json;

    fn property(name: &str, address_count: usize) -> Property {
        Property {
            company_name: name.to_string(),
            addresses: (0..address_count).map(|i| Address(json!(i))).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_more_than_two_addresses() {
        let properties = vec![property("A", 3), property("B", 1)];
        assert_eq!(more_than_two_addresses(&properties), vec!["A".to_string()]);
    }

    #[test]
    fn test_exactly_two_addresses_is_excluded() {
        let properties = vec![property("A", 2), property("B", 0), property("C", 4)];
        assert_eq!(more_than_two_addresses(&properties), vec!["C".to_string()]);
    }

    #[test]
    fn test_has_no_properties_uses_total_count() {
        let empty = PropertyPage {
            items: vec![],
            total_count: 0,
        };
        let one = PropertyPage {
            items: vec![property("A", 1)],
            total_count: 1,
        };
        assert!(has_no_properties(&empty));
        assert!(!has_no_properties(&one));
    }
}
