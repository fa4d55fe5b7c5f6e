use rapier3d::prelude::NarrowPhase;
use serde::{Deserialize, Serialize};

/// One contact point seen after a step.
///
/// `manifold_index` counts manifolds across every contact pair in the step;
/// `contact_index` counts points within that manifold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContactSample {
    pub manifold_index: usize,
    pub contact_index: usize,
    /// Signed separation; negative means penetration.
    pub distance: f32,
}

/// Which contact points reach the observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactFilter {
    /// Every point the narrow phase tracks, including speculative ones.
    #[default]
    All,
    /// Only points with distance <= 0.
    Touching,
}

impl ContactFilter {
    pub fn accepts(self, distance: f32) -> bool {
        match self {
            Self::All => true,
            Self::Touching => distance <= 0.0,
        }
    }
}

/// Receives contact samples after each step.
pub trait ContactObserver {
    /// Called once before the samples of a step.
    fn begin_step(&mut self) {}
    fn observe(&mut self, sample: ContactSample);
}

/// Keeps the samples of the most recent step.
#[derive(Debug, Clone, Default)]
pub struct ContactLog {
    samples: Vec<ContactSample>,
}

impl ContactLog {
    pub fn samples(&self) -> &[ContactSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Deepest penetration of the last step, if any point overlaps.
    pub fn deepest(&self) -> Option<f32> {
        self.samples
            .iter()
            .map(|s| s.distance)
            .filter(|d| *d < 0.0)
            .min_by(f32::total_cmp)
    }
}

impl ContactObserver for ContactLog {
    fn begin_step(&mut self) {
        self.samples.clear();
    }

    fn observe(&mut self, sample: ContactSample) {
        self.samples.push(sample);
    }
}

/// Feed every accepted contact point of `narrow_phase` to `observer`.
/// Returns the number of samples delivered.
pub fn observe_contacts(
    narrow_phase: &NarrowPhase,
    filter: ContactFilter,
    observer: &mut dyn ContactObserver,
) -> usize {
    observer.begin_step();
    let mut manifold_index = 0;
    let mut delivered = 0;
    for pair in narrow_phase.contact_pairs() {
        for manifold in &pair.manifolds {
            for (contact_index, point) in manifold.points.iter().enumerate() {
                if !filter.accepts(point.dist) {
                    continue;
                }
                observer.observe(ContactSample {
                    manifold_index,
                    contact_index,
                    distance: point.dist,
                });
                delivered += 1;
            }
            manifold_index += 1;
        }
    }
    tracing::trace!(manifolds = manifold_index, delivered, "contacts observed");
    delivered
}
