use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use cake_types::{Cake, PropertyName};

use crate::binding::Binding;
use crate::config::{ComposeConfig, Discipline};
use crate::error::{ComposeError, Result};
use crate::layer::{LayerFault, LayerProducer};
use crate::strategies::{self, CombineStrategy, Rejection};

// ---------------------------------------------------------------------------
// CompositionReport
// ---------------------------------------------------------------------------

/// What one layer contributed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LayerRecord {
    /// Position of the layer in the input order.
    pub index: usize,
    /// The producer's name.
    pub name: String,
    /// Names the layer introduced.
    pub added: Vec<String>,
    /// Names the layer replaced (override discipline only).
    pub overridden: Vec<String>,
}

/// Audit trail of one composition, in merge order.
#[derive(Clone, Debug, Serialize)]
pub struct CompositionReport {
    pub discipline: Discipline,
    pub layers: Vec<LayerRecord>,
    /// Total wall-clock time for both phases.
    pub elapsed: Duration,
}

impl CompositionReport {
    /// Index of the layer whose behavior `name` resolves to in the final
    /// cake, if any layer contributed it.
    pub fn provider_of(&self, name: &str) -> Option<usize> {
        self.layers
            .iter()
            .rev()
            .find(|r| r.added.iter().chain(&r.overridden).any(|n| n == name))
            .map(|r| r.index)
    }
}

/// A composed cake together with its report.
#[derive(Debug)]
pub struct Composition {
    pub cake: Cake,
    pub report: CompositionReport,
}

// ---------------------------------------------------------------------------
// Compositor
// ---------------------------------------------------------------------------

/// Builds one cake from an ordered sequence of layer producers.
///
/// Phase one walks the layers in order: the cake built so far is recorded
/// as the layer's super, the layer's mapping is requested, and the mapping
/// is merged with the active [`CombineStrategy`]. Once the final cake is
/// sealed, phase two walks the same layers in the same order and delivers
/// each one its [`Binding`].
pub struct Compositor {
    config: ComposeConfig,
    strategy: Box<dyn CombineStrategy>,
}

impl Compositor {
    /// Create a compositor whose strategy follows the configured discipline.
    pub fn new(config: ComposeConfig) -> Self {
        let strategy = strategies::for_discipline(config.discipline, config.conflict_report);
        Self { config, strategy }
    }

    /// Create a compositor with a caller-supplied strategy. The strategy's
    /// discipline replaces the configured one.
    pub fn with_strategy(mut config: ComposeConfig, strategy: Box<dyn CombineStrategy>) -> Self {
        config.discipline = strategy.discipline();
        Self { config, strategy }
    }

    /// The current configuration.
    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Compose the layers into a single cake.
    pub fn compose<I>(&self, layers: I) -> Result<Cake>
    where
        I: IntoIterator<Item = Box<dyn LayerProducer>>,
    {
        self.compose_with_report(layers).map(|c| c.cake)
    }

    /// Compose the layers and report what each one contributed.
    pub fn compose_with_report<I>(&self, layers: I) -> Result<Composition>
    where
        I: IntoIterator<Item = Box<dyn LayerProducer>>,
    {
        let start = Instant::now();
        let discipline = self.strategy.discipline();

        let mut current: Option<Cake> = None;
        let mut suspended = Vec::new();
        let mut records = Vec::new();

        for (index, mut producer) in layers.into_iter().enumerate() {
            let name = producer.name().to_string();
            let supr = current.clone();

            let mapping = producer
                .produce()
                .map_err(|fault| fault_error(index, &name, fault))?;

            let combined = self
                .strategy
                .combine(supr.as_ref(), mapping)
                .map_err(|rejection| rejection_error(index, &name, rejection))?;

            if combined.added.is_empty() && combined.overridden.is_empty() && !self.config.allow_empty_layers {
                return Err(ComposeError::Construction {
                    index,
                    layer: name,
                    reason: "layer contributed no properties".into(),
                });
            }

            debug!(
                index,
                layer = %name,
                discipline = discipline.as_str(),
                added = combined.added.len(),
                overridden = combined.overridden.len(),
                "merged layer"
            );

            records.push(LayerRecord {
                index,
                name,
                added: to_strings(combined.added),
                overridden: to_strings(combined.overridden),
            });
            current = Some(Cake::seal(combined.table, index + 1));
            suspended.push((producer, supr));
        }

        let cake = current.unwrap_or_else(Cake::empty);
        let this = cake.downgrade();

        for (index, (producer, supr)) in suspended.into_iter().enumerate() {
            let name = records[index].name.clone();
            producer
                .resume(Binding::new(this.clone(), supr, index))
                .map_err(|fault| fault_error(index, &name, fault))?;
            debug!(index, layer = %name, "resumed layer");
        }

        Ok(Composition {
            cake,
            report: CompositionReport {
                discipline,
                layers: records,
                elapsed: start.elapsed(),
            },
        })
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(ComposeConfig::default())
    }
}

fn fault_error(index: usize, layer: &str, fault: LayerFault) -> ComposeError {
    match fault {
        LayerFault::Malformed(reason) => ComposeError::Construction {
            index,
            layer: layer.to_string(),
            reason,
        },
        LayerFault::Misuse(reason) => ComposeError::ProtocolMisuse {
            index,
            layer: layer.to_string(),
            reason,
        },
    }
}

fn rejection_error(index: usize, layer: &str, rejection: Rejection) -> ComposeError {
    match rejection {
        Rejection::Malformed(defects) => {
            warn!(index, layer, defects = defects.len(), "malformed layer mapping");
            ComposeError::Construction {
                index,
                layer: layer.to_string(),
                reason: defects
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            }
        }
        Rejection::Conflict(keys) => {
            warn!(index, layer, conflicts = keys.len(), "layer conflicts with earlier layers");
            ComposeError::Conflict {
                index,
                layer: layer.to_string(),
                keys: to_strings(keys),
            }
        }
    }
}

fn to_strings(names: Vec<PropertyName>) -> Vec<String> {
    names.into_iter().map(String::from).collect()
}
