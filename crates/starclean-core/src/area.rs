//! Service-area membership.

/// Cities the business serves. Matching ignores case and surrounding
/// whitespace.
#[derive(Debug, Clone, Default)]
pub struct ServiceAreas {
    cities: Vec<String>,
}

impl ServiceAreas {
    pub fn new(cities: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            cities: cities
                .into_iter()
                .map(|c| c.as_ref().trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    pub fn serves(&self, city: &str) -> bool {
        let city = city.trim().to_lowercase();
        self.cities.iter().any(|c| *c == city)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starclean_types::config::BusinessConfig;

    #[test]
    fn test_serves_is_case_insensitive() {
        let areas = ServiceAreas::new(BusinessConfig::default().service_areas);
        assert_eq!(areas.len(), 12);
        assert!(areas.serves("Charleston"));
        assert!(areas.serves("  mount pleasant "));
        assert!(areas.serves("NORTH CHARLESTON"));
        assert!(!areas.serves("Columbia"));
        assert!(!areas.serves(""));
    }
}
