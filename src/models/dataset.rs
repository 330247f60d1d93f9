use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::series::{SeriesPoint, TimeSeries};

/// Indicator histories for one country or region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Indicator code -> series
    #[serde(default)]
    pub indicators: BTreeMap<String, TimeSeries>,
}

impl Entity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn series(&self, indicator: &str) -> Option<&TimeSeries> {
        self.indicators.get(indicator)
    }

    pub fn with_series(mut self, indicator: &str, series: TimeSeries) -> Self {
        self.indicators.insert(indicator.to_string(), series);
        self
    }
}

/// In-memory collection of entities, as handed over by a data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entities: BTreeMap<String, Entity>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: BTreeMap::new(),
        }
    }

    pub fn num_entities(&self) -> usize {
        self.entities.len()
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn insert(&mut self, entity: Entity) {
        self.entities.insert(entity.id.clone(), entity);
    }

    /// Append one observation, creating the entity and series as needed.
    pub fn push_point(&mut self, entity_id: &str, indicator: &str, point: SeriesPoint) {
        self.entities
            .entry(entity_id.to_string())
            .or_insert_with(|| Entity::new(entity_id))
            .indicators
            .entry(indicator.to_string())
            .or_default()
            .push(point);
    }

    pub fn series(&self, entity_id: &str, indicator: &str) -> Option<&TimeSeries> {
        self.entity(entity_id).and_then(|e| e.series(indicator))
    }

    /// First `(entity, indicator, year)` observed more than once, if any.
    pub fn first_duplicate_year(&self) -> Option<(&str, &str, i32)> {
        self.entities.values().find_map(|entity| {
            entity.indicators.iter().find_map(|(indicator, series)| {
                let mut years: Vec<i32> = series.iter().map(|p| p.year).collect();
                years.sort_unstable();
                years
                    .windows(2)
                    .find(|w| w[0] == w[1])
                    .map(|w| (entity.id.as_str(), indicator.as_str(), w[0]))
            })
        })
    }

    /// Series of one indicator for every listed entity that has it.
    pub fn series_for<'a>(
        &'a self,
        entity_ids: &[String],
        indicator: &str,
    ) -> BTreeMap<String, &'a TimeSeries> {
        entity_ids
            .iter()
            .filter_map(|id| self.series(id, indicator).map(|s| (id.clone(), s)))
            .collect()
    }
}

/// Named set of reference countries whose histories are pooled into one template path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorPool {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub members: Vec<String>,
}

impl DonorPool {
    pub fn new(id: &str, name: &str, members: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// The built-in donor pools.
    pub fn builtin() -> Vec<DonorPool> {
        vec![
            DonorPool::new(
                "east_asian_tigers",
                "East Asian tigers",
                &["KOR", "SGP", "HKG", "TWN"],
            ),
            DonorPool::new("east_asia", "East Asia", &["JPN", "KOR", "CHN"]),
            DonorPool::new(
                "european_catch_up",
                "European catch-up economies",
                &["IRL", "PRT", "ESP", "POL"],
            ),
            DonorPool::new(
                "advanced",
                "Advanced economies",
                &["USA", "DEU", "JPN", "GBR", "FRA"],
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_point_creates_entity_and_series() {
        let mut ds = Dataset::new("test");
        ds.push_point("KOR", "NY.GDP.PCAP.KD", SeriesPoint::new(2000, 12000.0));
        ds.push_point("KOR", "NY.GDP.PCAP.KD", SeriesPoint::new(2001, 12500.0));
        ds.push_point("JPN", "SP.POP.TOTL", SeriesPoint::new(2000, 1.27e8));
        assert_eq!(ds.num_entities(), 2);
        assert_eq!(ds.series("KOR", "NY.GDP.PCAP.KD").unwrap().len(), 2);
        assert!(ds.series("KOR", "SP.POP.TOTL").is_none());
    }

    #[test]
    fn test_series_for_skips_missing_members() {
        let mut ds = Dataset::new("test");
        ds.push_point("KOR", "X", SeriesPoint::new(2000, 1.0));
        let members = vec!["KOR".to_string(), "SGP".to_string()];
        let found = ds.series_for(&members, "X");
        assert_eq!(found.len(), 1);
        assert!(found.contains_key("KOR"));
    }

    #[test]
    fn test_first_duplicate_year() {
        let mut ds = Dataset::new("test");
        ds.push_point("KOR", "X", SeriesPoint::new(2001, 1.0));
        ds.push_point("KOR", "X", SeriesPoint::new(2000, 2.0));
        ds.push_point("JPN", "X", SeriesPoint::new(2000, 3.0));
        assert_eq!(ds.first_duplicate_year(), None);

        ds.push_point("KOR", "X", SeriesPoint::new(2001, 5.0));
        assert_eq!(ds.first_duplicate_year(), Some(("KOR", "X", 2001)));
    }

    #[test]
    fn test_builtin_pools_non_empty() {
        for pool in DonorPool::builtin() {
            assert!(!pool.members.is_empty(), "{} has no members", pool.id);
        }
    }
}
