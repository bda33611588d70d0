use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::trace;

use crate::models::data_point::DataPoint;
use crate::models::highlight::{HighlightRelationship, HighlightState};

#[derive(Debug, Default)]
struct Registry {
    highlights: HashMap<String, HighlightState>,
    relationships: Vec<HighlightRelationship>,
}

/// Page-lifetime registry of which point each chart highlights.
///
/// Cloning the coordinator clones the handle, not the state: every chart
/// controller holding a clone sees the same highlights. Writes are "last call
/// wins" per chart id; reads return snapshots.
#[derive(Debug, Clone, Default)]
pub struct HighlightCoordinator {
    inner: Arc<RwLock<Registry>>,
}

impl HighlightCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight `point` in `chart_id` and propagate to related charts.
    ///
    /// Related charts receive a synthetic highlight holding only the
    /// relationship's match key, so they match on the shared key alone. A
    /// point lacking that key does not propagate.
    pub fn highlight_point(
        &self,
        chart_id: &str,
        point: DataPoint,
        data_key: Option<String>,
        index: Option<usize>,
    ) {
        let now = Utc::now();
        let mut registry = self.inner.write();

        let propagated: Vec<(String, DataPoint)> = registry
            .relationships
            .iter()
            .filter_map(|rel| {
                let other = rel.other_side(chart_id)?;
                if other == chart_id {
                    return None;
                }
                let value = point.get(&rel.match_key)?;
                Some((
                    other.to_string(),
                    DataPoint::new().with(rel.match_key.clone(), value.clone()),
                ))
            })
            .collect();

        for (target, synthetic) in propagated {
            trace!(source = chart_id, target = %target, "propagating highlight");
            registry.highlights.insert(
                target.clone(),
                HighlightState {
                    chart_id: target,
                    data_point: synthetic,
                    data_key: None,
                    index: None,
                    timestamp: now,
                },
            );
        }

        registry.highlights.insert(
            chart_id.to_string(),
            HighlightState {
                chart_id: chart_id.to_string(),
                data_point: point,
                data_key,
                index,
                timestamp: now,
            },
        );
    }

    /// Clear one chart's highlight. Related charts keep theirs.
    pub fn clear_chart_highlight(&self, chart_id: &str) {
        self.inner.write().highlights.remove(chart_id);
    }

    pub fn clear_all_highlights(&self) {
        self.inner.write().highlights.clear();
    }

    /// Forget a chart that is going away. Its relationships stay registered so
    /// a remounted chart picks them up again.
    pub fn release_chart(&self, chart_id: &str) {
        self.clear_chart_highlight(chart_id);
    }

    /// Whether `point` (at `index`, if known) is highlighted in `chart_id`.
    ///
    /// True when both sides carry an index and the indices match, or when
    /// every field of the stored highlight equals the same field of `point`.
    /// An empty stored point matches nothing by fields.
    pub fn is_point_highlighted(&self, chart_id: &str, point: &DataPoint, index: Option<usize>) -> bool {
        let registry = self.inner.read();
        let Some(state) = registry.highlights.get(chart_id) else {
            return false;
        };

        if let (Some(stored), Some(queried)) = (state.index, index) {
            if stored == queried {
                return true;
            }
        }

        !state.data_point.is_empty()
            && state
                .data_point
                .iter()
                .all(|(field, value)| point.get(field) == Some(value))
    }

    pub fn get_highlight(&self, chart_id: &str) -> Option<HighlightState> {
        self.inner.read().highlights.get(chart_id).cloned()
    }

    /// Snapshot of all active highlights.
    pub fn highlights(&self) -> HashMap<String, HighlightState> {
        self.inner.read().highlights.clone()
    }

    pub fn has_highlight(&self, chart_id: &str) -> bool {
        self.inner.read().highlights.contains_key(chart_id)
    }

    /// Register a relationship. Registering the same one twice is a no-op.
    pub fn register_relationship(&self, relationship: HighlightRelationship) {
        let mut registry = self.inner.write();
        if !registry.relationships.contains(&relationship) {
            registry.relationships.push(relationship);
        }
    }

    /// Remove every relationship between the two charts, in either direction.
    pub fn unregister_relationship(&self, source_chart_id: &str, target_chart_id: &str) {
        self.inner
            .write()
            .relationships
            .retain(|rel| !rel.connects(source_chart_id, target_chart_id));
    }

    pub fn relationships(&self) -> Vec<HighlightRelationship> {
        self.inner.read().relationships.clone()
    }

    /// Charts related to `chart_id`, in registration order.
    pub fn related_charts(&self, chart_id: &str) -> Vec<String> {
        let registry = self.inner.read();
        let mut related: Vec<String> = Vec::new();
        for rel in &registry.relationships {
            if let Some(other) = rel.other_side(chart_id) {
                if !related.iter().any(|r| r == other) {
                    related.push(other.to_string());
                }
            }
        }
        related
    }
}
