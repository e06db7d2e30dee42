use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCatalogEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "points")]
    pub cost_points: u64,
    #[serde(default, alias = "delayMinutes")]
    pub unlock_delay_minutes: u32,
}

impl RewardCatalogEntry {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        cost_points: u64,
        unlock_delay_minutes: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            cost_points,
            unlock_delay_minutes,
        }
    }

    pub fn is_delayed(&self) -> bool {
        self.unlock_delay_minutes > 0
    }
}

/// Rewards seeded on first run.
pub fn default_catalog() -> Vec<RewardCatalogEntry> {
    vec![
        RewardCatalogEntry::new(
            "1",
            "Social Media Time",
            "Unlocks 10 minutes of social media browsing.",
            100,
            15,
        ),
        RewardCatalogEntry::new("2", "Break Time", "Enjoy a 15-minute break.", 50, 5),
        RewardCatalogEntry::new(
            "3",
            "Congratulations Message",
            "Receive a personalized congratulations message.",
            20,
            0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_unique_ids() {
        let catalog = default_catalog();
        let mut ids: Vec<_> = catalog.iter().map(|e| e.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
        assert!(catalog.iter().any(|e| !e.is_delayed()));
    }

    #[test]
    fn accepts_legacy_field_names() {
        let entry: RewardCatalogEntry = serde_json::from_str(
            r#"{"id":"2","title":"Break Time","description":"","delayMinutes":5,"points":50,"unlocked":false}"#,
        )
        .unwrap();
        assert_eq!(entry.cost_points, 50);
        assert_eq!(entry.unlock_delay_minutes, 5);
    }
}
