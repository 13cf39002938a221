use crate::models::service::Service;

/// Category selector that matches every service.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone)]
pub struct CatalogFilter {
    pub query: String,
    pub category: String,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            category: ALL_CATEGORIES.to_string(),
        }
    }
}

impl CatalogFilter {
    pub fn new(query: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: category.into(),
        }
    }

    pub fn matches(&self, service: &Service) -> bool {
        let needle = self.query.to_lowercase();
        let matches_text = service.title.to_lowercase().contains(&needle)
            || service.description.to_lowercase().contains(&needle);
        let matches_category =
            self.category == ALL_CATEGORIES || service.category == self.category;

        matches_text && matches_category
    }
}

/// Services matching `filter`, in their original order.
pub fn filter_services(services: &[Service], filter: &CatalogFilter) -> Vec<Service> {
    services
        .iter()
        .filter(|service| filter.matches(service))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;

    use super::{filter_services, CatalogFilter};
    use crate::models::location::GeoLocation;
    use crate::models::service::Service;

    fn service(id: &str, title: &str, description: &str, category: &str) -> Service {
        Service {
            id: id.to_string(),
            worker_id: "w".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            price: 50.0,
            duration: 60,
            images: Vec::new(),
            location: GeoLocation::new(40.0, -74.0, "New York, NY"),
            created_at: Utc::now(),
        }
    }

    fn sample() -> Vec<Service> {
        vec![
            service("A", "House Cleaning", "Kitchen and bathrooms", "cleaning"),
            service("B", "Garden Care", "Pruning and weeding", "gardening"),
        ]
    }

    #[test]
    fn empty_query_with_category_selects_that_category() {
        let result = filter_services(&sample(), &CatalogFilter::new("", "gardening"));
        let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["B"]);
    }

    #[test]
    fn wildcard_category_keeps_everything() {
        let result = filter_services(&sample(), &CatalogFilter::default());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn query_is_case_insensitive_over_title_and_description() {
        let by_title = filter_services(&sample(), &CatalogFilter::new("CLEANING", "all"));
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, "A");

        let by_description = filter_services(&sample(), &CatalogFilter::new("weEDing", "all"));
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].id, "B");
    }

    #[test]
    fn unknown_category_matches_nothing() {
        let result = filter_services(&sample(), &CatalogFilter::new("", "plumbing"));
        assert!(result.is_empty());
    }

    prop_compose! {
        fn arb_service()(
            id in "[a-z0-9]{4}",
            title in "[a-zA-Z ]{0,20}",
            description in "[a-zA-Z ]{0,40}",
            category in prop_oneof![
                Just("cleaning"),
                Just("gardening"),
                Just("plumbing"),
            ],
        ) -> Service {
            service(&id, &title, &description, category)
        }
    }

    proptest! {
        #[test]
        fn filtered_result_is_matching_subset(
            services in prop::collection::vec(arb_service(), 0..12),
            query in "[a-zA-Z]{0,3}",
            category in prop_oneof![
                Just("all"),
                Just("cleaning"),
                Just("gardening"),
            ],
        ) {
            let filter = CatalogFilter::new(query.clone(), category);
            let result = filter_services(&services, &filter);

            prop_assert!(result.len() <= services.len());
            let needle = query.to_lowercase();
            for item in &result {
                prop_assert!(services.contains(item));
                prop_assert!(
                    item.title.to_lowercase().contains(&needle)
                        || item.description.to_lowercase().contains(&needle)
                );
                prop_assert!(category == "all" || item.category == category);
            }

            let expected = services.iter().filter(|s| filter.matches(s)).count();
            prop_assert_eq!(result.len(), expected);
        }
    }
}
