use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city_search: Option<String>,
}

impl FilterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_city_search(mut self, city_search: impl Into<String>) -> Self {
        self.city_search = Some(city_search.into());
        self
    }

    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        build_predicates(self).is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Country,
    Region,
    City,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: Field,
    pub op: Operator,
    pub value: String,
}

/// Turns a filter set into predicates ordered country, region, city.
///
/// Blank values count as absent. Country and region keep their exact text;
/// the city search is trimmed before it becomes a substring predicate.
#[must_use]
pub fn build_predicates(filters: &FilterSet) -> Vec<Predicate> {
    let mut predicates = Vec::with_capacity(3);

    if let Some(country) = non_blank(filters.country.as_deref()) {
        predicates.push(Predicate {
            field: Field::Country,
            op: Operator::Equals,
            value: country.to_string(),
        });
    }

    if let Some(region) = non_blank(filters.region.as_deref()) {
        predicates.push(Predicate {
            field: Field::Region,
            op: Operator::Equals,
            value: region.to_string(),
        });
    }

    if let Some(city) = non_blank(filters.city_search.as_deref()) {
        predicates.push(Predicate {
            field: Field::City,
            op: Operator::Contains,
            value: city.trim().to_string(),
        });
    }

    predicates
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{Field, FilterSet, Operator, build_predicates};

    #[test]
    fn empty_filter_set_builds_no_predicates() {
        assert!(build_predicates(&FilterSet::new()).is_empty());
        assert!(FilterSet::new().is_unfiltered());
    }

    #[test]
    fn predicates_follow_country_region_city_order() {
        let filters = FilterSet::new()
            .with_city_search("  ber ")
            .with_region("Bavaria")
            .with_country("Germany");

        let predicates = build_predicates(&filters);
        let fields = predicates
            .iter()
            .map(|predicate| predicate.field)
            .collect::<Vec<_>>();

        assert_eq!(fields, vec![Field::Country, Field::Region, Field::City]);
        assert_eq!(predicates[0].op, Operator::Equals);
        assert_eq!(predicates[0].value, "Germany");
        assert_eq!(predicates[2].op, Operator::Contains);
        assert_eq!(predicates[2].value, "ber");
    }

    #[test]
    fn blank_values_are_equivalent_to_absent_values() {
        let blank = FilterSet::new()
            .with_country("")
            .with_region("   ")
            .with_city_search("\t");

        assert_eq!(build_predicates(&blank), build_predicates(&FilterSet::new()));
        assert!(blank.is_unfiltered());
    }

    #[test]
    fn exact_match_values_are_not_trimmed() {
        let filters = FilterSet::new().with_country(" France");

        let predicates = build_predicates(&filters);
        assert_eq!(predicates.len(), 1);
        assert_eq!(predicates[0].value, " France");
    }

    #[test]
    fn building_is_deterministic() {
        let filters = FilterSet::new().with_country("Japan").with_city_search("ky");

        assert_eq!(build_predicates(&filters), build_predicates(&filters));
    }
}
