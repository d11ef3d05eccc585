//! The featured plants shown on the Home screen.

use crate::utils::contains_ignore_case;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plant {
    pub id: &'static str,
    pub name: &'static str,
    pub image_url: &'static str,
}

const FEATURED: &[Plant] = &[
    Plant {
        id: "1",
        name: "Dracaena Fragrans",
        image_url: "https://i.ibb.co/sV8Lq84/plant1.png",
    },
    Plant {
        id: "2",
        name: "Monstera Deliciosa",
        image_url: "https://i.ibb.co/9vD3rGw/plant2.png",
    },
];

pub fn featured_plants() -> &'static [Plant] {
    FEATURED
}

/// Featured plants whose name contains `query`, ignoring case.
pub fn search(query: &str) -> Vec<&'static Plant> {
    FEATURED
        .iter()
        .filter(|p| contains_ignore_case(p.name, query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_returns_all() {
        assert_eq!(search("").len(), featured_plants().len());
    }

    #[test]
    fn test_search_filters_by_name() {
        let hits = search("monstera");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Monstera Deliciosa");
        assert!(search("cactus").is_empty());
    }
}
