//! Endpoint-proximity detection of duct connections.
//!
//! A duct occupies the segment from its transform origin along its rotation
//! for its length in canvas units. Two endpoints within the connection
//! tolerance are joined; the fitting that would join them is chosen from the
//! angle between the ducts' headings.

use std::collections::HashSet;

use dw_core::{CanvasScale, EntityId, Real, angle_difference_deg, as_inches, distance};
use dw_model::{Duct, EntitySnapshot, FittingType};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::DetectionConfig;

/// Size difference (inches) above which a straight joint needs a transition.
const TRANSITION_SIZE_DELTA_IN: Real = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndPoint {
    Start,
    End,
}

/// One end of a duct in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuctEndpoint {
    pub entity_id: EntityId,
    pub end_point: EndPoint,
    pub position: (Real, Real),
    /// Heading of the owning duct in degrees.
    pub angle: Real,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedConnection {
    pub new_duct: DuctEndpoint,
    pub existing_duct: DuctEndpoint,
    pub fitting_type: FittingType,
    /// Folded heading difference in degrees, `[0, 180]`.
    pub angle: Real,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionDetectionService {
    config: DetectionConfig,
    scale: CanvasScale,
}

impl ConnectionDetectionService {
    pub fn new(config: DetectionConfig) -> Self {
        let scale = CanvasScale::new(config.pixels_per_foot);
        Self { config, scale }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Find every endpoint of another duct that `new_duct_id` should join.
    ///
    /// Returns an empty list when the id is absent or not a duct. Results are
    /// ordered by the new duct's endpoint position (x, then y) and then by the
    /// existing duct id; each endpoint pair appears once.
    pub fn detect_connections(
        &self,
        snapshot: &EntitySnapshot,
        new_duct_id: &str,
    ) -> Vec<DetectedConnection> {
        let Some(new_duct) = snapshot.duct(new_duct_id) else {
            debug!(entity = new_duct_id, "not a duct, nothing to detect");
            return Vec::new();
        };

        let existing: Vec<(&Duct, [DuctEndpoint; 2])> = snapshot
            .ducts()
            .filter(|d| d.id != new_duct.id)
            .map(|d| (d, self.endpoints(d)))
            .collect();

        let mut connections = Vec::new();
        let mut seen = HashSet::new();
        for new_point in self.endpoints(new_duct) {
            let nearby: Vec<(&Duct, &DuctEndpoint)> = existing
                .iter()
                .flat_map(|(duct, points)| points.iter().map(move |p| (*duct, p)))
                .filter(|(_, p)| self.is_connected(&new_point, p))
                .collect();
            if nearby.is_empty() {
                continue;
            }

            for (duct, existing_point) in &nearby {
                let angle = angle_difference_deg(new_point.angle, existing_point.angle);
                let fitting = if self.config.junction_classification {
                    self.classify_junction(new_duct, duct, angle, nearby.len())
                } else {
                    self.classify_pair(angle)
                };
                let Some(fitting_type) = fitting else {
                    trace!(
                        new = %new_point.entity_id,
                        existing = %existing_point.entity_id,
                        angle,
                        "straight run, no fitting"
                    );
                    continue;
                };

                let key = (
                    new_point.entity_id.clone(),
                    new_point.end_point,
                    existing_point.entity_id.clone(),
                    existing_point.end_point,
                );
                if !seen.insert(key) {
                    continue;
                }
                connections.push(DetectedConnection {
                    new_duct: new_point.clone(),
                    existing_duct: (*existing_point).clone(),
                    fitting_type,
                    angle,
                });
            }
        }

        connections.sort_by(|a, b| {
            a.new_duct
                .position
                .0
                .total_cmp(&b.new_duct.position.0)
                .then(a.new_duct.position.1.total_cmp(&b.new_duct.position.1))
                .then_with(|| a.existing_duct.entity_id.cmp(&b.existing_duct.entity_id))
        });
        debug!(
            entity = new_duct_id,
            found = connections.len(),
            "connection detection finished"
        );
        connections
    }

    /// Start and end of a duct. Rotation is in degrees, length in feet.
    pub fn endpoints(&self, duct: &Duct) -> [DuctEndpoint; 2] {
        let (x, y) = (duct.transform.x, duct.transform.y);
        let angle = duct.transform.rotation;
        let length = self.scale.to_canvas(duct.length());
        let radians = angle.to_radians();
        let end = (x + length * radians.cos(), y + length * radians.sin());

        [
            DuctEndpoint {
                entity_id: duct.id.clone(),
                end_point: EndPoint::Start,
                position: (x, y),
                angle,
            },
            DuctEndpoint {
                entity_id: duct.id.clone(),
                end_point: EndPoint::End,
                position: end,
                angle,
            },
        ]
    }

    fn is_connected(&self, a: &DuctEndpoint, b: &DuctEndpoint) -> bool {
        distance(a.position, b.position) <= self.config.connection_tolerance
    }

    /// Headings within the straight tolerance of parallel or anti-parallel.
    fn is_straight(&self, angle: Real) -> bool {
        let tol = self.config.straight_angle_tolerance_deg;
        angle < tol || angle > 180.0 - tol
    }

    fn classify_pair(&self, angle: Real) -> Option<FittingType> {
        (!self.is_straight(angle)).then_some(FittingType::Elbow)
    }

    fn classify_junction(
        &self,
        new_duct: &Duct,
        existing: &Duct,
        angle: Real,
        nearby: usize,
    ) -> Option<FittingType> {
        match nearby {
            0 => None,
            1 if self.is_straight(angle) => {
                has_size_change(new_duct, existing).then_some(FittingType::Transition)
            }
            1 => Some(FittingType::Elbow),
            _ => Some(FittingType::Tee),
        }
    }
}

fn has_size_change(a: &Duct, b: &Duct) -> bool {
    match (a.nominal_size(), b.nominal_size()) {
        (Some(a), Some(b)) => (as_inches(a) - as_inches(b)).abs() > TRANSITION_SIZE_DELTA_IN,
        _ => false,
    }
}
