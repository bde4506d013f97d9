//! Type-tag dispatch for standardizers.
//!
//! The registry is an ordinary value: build it once at startup, register any
//! extra measurement types while you still own it mutably, then share it by
//! reference (or inside an `Arc`) with every caller. Lookups never mutate.
//!
//! ```
//! use humanbench_core::standardize::{
//!     StandardizedDistance, Standardizer, StandardizerRegistry, StatisticSample,
//! };
//! use humanbench_core::StandardizeError;
//!
//! struct AbsoluteDifference;
//!
//! impl Standardizer for AbsoluteDifference {
//!     fn method(&self) -> &'static str {
//!         "Absolute difference"
//!     }
//!
//!     fn compute(
//!         &self,
//!         agent: &StatisticSample,
//!         human: &StatisticSample,
//!     ) -> Result<StandardizedDistance, StandardizeError> {
//!         match (agent, human) {
//!             (StatisticSample::EffectSize { es: a, .. }, StatisticSample::EffectSize { es: h, .. }) => {
//!                 Ok(StandardizedDistance { d: (a - h).abs(), details: Default::default() })
//!             }
//!             _ => Err(StandardizeError::InvalidSample("effect sizes only".into())),
//!         }
//!     }
//! }
//!
//! let mut registry = StandardizerRegistry::with_builtins();
//! registry.register("absolute_difference", AbsoluteDifference);
//! assert!(registry.get("absolute_difference").is_ok());
//! ```

use super::{
    effect_size, proportion, rating, EffectSizeStandardizer, ProportionStandardizer,
    RatingStandardizer, StandardizedDistance, Standardizer, StatisticSample,
};
use crate::error::StandardizeError;
use std::collections::BTreeMap;
use std::fmt;

/// Mapping from type tag to standardizer implementation.
pub struct StandardizerRegistry {
    standardizers: BTreeMap<String, Box<dyn Standardizer>>,
}

impl StandardizerRegistry {
    /// Creates a registry with no standardizers.
    pub fn empty() -> Self {
        Self {
            standardizers: BTreeMap::new(),
        }
    }

    /// Creates a registry holding `proportion`, `rating` and `effect_size`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(proportion::TAG, ProportionStandardizer);
        registry.register(rating::TAG, RatingStandardizer);
        registry.register(effect_size::TAG, EffectSizeStandardizer::default());
        registry
    }

    /// Adds (or replaces) the standardizer for `tag`.
    ///
    /// Returns the previously registered implementation, if any.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        standardizer: impl Standardizer + 'static,
    ) -> Option<Box<dyn Standardizer>> {
        self.standardizers.insert(tag.into(), Box::new(standardizer))
    }

    /// Looks up the standardizer for `tag`.
    ///
    /// Unknown tags produce [`StandardizeError::UnknownType`] listing every
    /// registered tag.
    pub fn get(&self, tag: &str) -> Result<&dyn Standardizer, StandardizeError> {
        self.standardizers
            .get(tag)
            .map(|standardizer| standardizer.as_ref())
            .ok_or_else(|| StandardizeError::UnknownType {
                tag: tag.to_string(),
                known: self.tags().into_iter().map(str::to_string).collect(),
            })
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        self.standardizers.keys().map(String::as_str).collect()
    }

    /// Standardizes a pair using the standardizer named by `tag`.
    pub fn standardize_as(
        &self,
        tag: &str,
        agent: &StatisticSample,
        human: &StatisticSample,
    ) -> Result<StandardizedDistance, StandardizeError> {
        self.get(tag)?.compute(agent, human)
    }

    /// Standardizes a pair using the agent sample's own type tag.
    pub fn standardize(
        &self,
        agent: &StatisticSample,
        human: &StatisticSample,
    ) -> Result<StandardizedDistance, StandardizeError> {
        self.standardize_as(agent.type_tag(), agent, human)
    }
}

impl Default for StandardizerRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for StandardizerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardizerRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
