use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named shipment phase.
///
/// `duration_ms` is the cumulative threshold from order creation: the stage is
/// current while the elapsed time is below it (and at or above the previous
/// stage's threshold). The last stage in a table has no upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    #[serde(rename = "duration")]
    pub duration_ms: i64,
}

impl Stage {
    pub fn new(name: &str, duration_ms: i64) -> Self {
        Self {
            name: name.to_string(),
            duration_ms,
        }
    }
}

/// Default shipment lifecycle: (name, cumulative threshold in ms)
pub const DEFAULT_STAGES: [(&str, i64); 5] = [
    ("In Warehouse", 0),
    ("Shipped", 5_000),
    ("Arrived in Country", 10_000),
    ("At Post Office", 15_000),
    ("Delivered", 20_000),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageTableError {
    #[error("stage table must contain at least one stage")]
    Empty,
    #[error("first stage '{name}' must have duration 0, got {duration_ms}")]
    FirstNotZero { name: String, duration_ms: i64 },
    #[error("stage '{name}' duration {duration_ms} must exceed previous duration {previous_ms}")]
    NotIncreasing {
        name: String,
        duration_ms: i64,
        previous_ms: i64,
    },
    #[error("stage {index} has an empty name")]
    BlankName { index: usize },
    #[error("duplicate stage name '{0}'")]
    DuplicateName(String),
}

/// Ordered, validated stage table.
///
/// Invariants: non-empty, first duration is 0, durations strictly increasing,
/// names non-blank and unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTable {
    stages: Vec<Stage>,
}

impl StageTable {
    pub fn new(stages: Vec<Stage>) -> Result<Self, StageTableError> {
        let first = stages.first().ok_or(StageTableError::Empty)?;
        if first.duration_ms != 0 {
            return Err(StageTableError::FirstNotZero {
                name: first.name.clone(),
                duration_ms: first.duration_ms,
            });
        }

        for (index, stage) in stages.iter().enumerate() {
            if stage.name.trim().is_empty() {
                return Err(StageTableError::BlankName { index });
            }
            if stages[..index].iter().any(|s| s.name == stage.name) {
                return Err(StageTableError::DuplicateName(stage.name.clone()));
            }
            if index > 0 {
                let previous_ms = stages[index - 1].duration_ms;
                if stage.duration_ms <= previous_ms {
                    return Err(StageTableError::NotIncreasing {
                        name: stage.name.clone(),
                        duration_ms: stage.duration_ms,
                        previous_ms,
                    });
                }
            }
        }

        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    /// Stage every new order starts in
    pub fn first(&self) -> &Stage {
        &self.stages[0]
    }

    /// Terminal stage (no upper bound)
    pub fn last(&self) -> &Stage {
        &self.stages[self.stages.len() - 1]
    }

    /// Position of a stage by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.name == name)
    }

    /// Window `[start, end)` of elapsed milliseconds belonging to stage `index`.
    /// Stage 0's window is empty.
    pub fn window(&self, index: usize) -> Option<(i64, i64)> {
        let stage = self.stages.get(index)?;
        let start = if index == 0 {
            0
        } else {
            self.stages[index - 1].duration_ms
        };
        Some((start, stage.duration_ms))
    }
}

impl Default for StageTable {
    fn default() -> Self {
        Self {
            stages: DEFAULT_STAGES
                .iter()
                .map(|(name, duration_ms)| Stage::new(name, *duration_ms))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        let table = StageTable::default();
        assert_eq!(StageTable::new(table.stages().to_vec()), Ok(table.clone()));
        assert_eq!(table.len(), 5);
        assert_eq!(table.first().name, "In Warehouse");
        assert_eq!(table.last().name, "Delivered");
        assert_eq!(table.index_of("Arrived in Country"), Some(2));
        assert_eq!(table.index_of("Lost"), None);
    }

    #[test]
    fn test_windows() {
        let table = StageTable::default();
        assert_eq!(table.window(0), Some((0, 0)));
        assert_eq!(table.window(1), Some((0, 5_000)));
        assert_eq!(table.window(4), Some((15_000, 20_000)));
        assert_eq!(table.window(5), None);
    }

    #[test]
    fn test_rejects_invalid_tables() {
        assert_eq!(StageTable::new(vec![]), Err(StageTableError::Empty));
        assert!(matches!(
            StageTable::new(vec![Stage::new("a", 10)]),
            Err(StageTableError::FirstNotZero { .. })
        ));
        assert!(matches!(
            StageTable::new(vec![Stage::new("a", 0), Stage::new("b", 0)]),
            Err(StageTableError::NotIncreasing { .. })
        ));
        assert_eq!(
            StageTable::new(vec![Stage::new("a", 0), Stage::new(" ", 5)]),
            Err(StageTableError::BlankName { index: 1 })
        );
        assert_eq!(
            StageTable::new(vec![Stage::new("a", 0), Stage::new("a", 5)]),
            Err(StageTableError::DuplicateName("a".to_string()))
        );
    }
}
