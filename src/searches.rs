use crate::weather::types::CurrentConditions;
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Most-recent-first list of looked-up conditions, capped at `capacity`.
pub struct RecentSearches {
    entries: RwLock<VecDeque<CurrentConditions>>,
    capacity: usize,
}

impl RecentSearches {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    pub async fn record(&self, conditions: CurrentConditions) {
        let mut entries = self.entries.write().await;
        entries.push_front(conditions);
        entries.truncate(self.capacity);
    }

    pub async fn list(&self) -> Vec<CurrentConditions> {
        self.entries.read().await.iter().cloned().collect()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::types::Coordinates;

    fn conditions(name: &str) -> CurrentConditions {
        CurrentConditions {
            name: name.to_string(),
            coord: Coordinates { lat: 0.0, lon: 0.0 },
            temperature: 20.0,
            feels_like: 20.0,
            humidity: 50,
            wind_speed: 1.0,
            description: "clear sky".to_string(),
            icon: "01d".to_string(),
            forecast: None,
        }
    }

    #[tokio::test]
    async fn newest_first_and_bounded() {
        let searches = RecentSearches::new(2);
        searches.record(conditions("Oslo")).await;
        searches.record(conditions("Lima")).await;
        searches.record(conditions("Pune")).await;

        let names: Vec<String> = searches.list().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Pune", "Lima"]);
    }

    #[tokio::test]
    async fn duplicates_are_kept_and_clear_empties() {
        let searches = RecentSearches::new(5);
        searches.record(conditions("Oslo")).await;
        searches.record(conditions("Oslo")).await;
        assert_eq!(searches.list().await.len(), 2);

        searches.clear().await;
        assert!(searches.list().await.is_empty());
    }
}
