//! Probabilistic group assignment
//!
//! A group-chance specification such as `SITE_ADMINISTRATORS:0.05, DATA_ANALYSTS:0.25`
//! gives each user a 5% chance of joining `SITE_ADMINISTRATORS` and, separately,
//! a 25% chance of joining `DATA_ANALYSTS`. Every group is sampled on its own,
//! so joining one group never changes the odds for another.
//!
//! Names are the plain group names shown on the repository's group screens;
//! the `GROUP_` authority prefix is added when the membership call is made.

use std::collections::HashMap;
use rand::Rng;

use crate::error::{ProvisionerError, ProvisionerResult};

const FORMAT_HINT: &str =
    "'userGroups' format is 'GROUP1:CHANCE1, GROUP2:CHANCE2' where the chances are values between 0 and 1";

/// Immutable table of group names and their enrollment chances
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupAssignmentPolicy {
    chances: HashMap<String, f64>,
}

impl GroupAssignmentPolicy {
    /// Parse a group-chance specification
    ///
    /// `None` is rejected: the specification must be set explicitly, even if
    /// only to an empty string.
    pub fn parse(spec: Option<&str>) -> ProvisionerResult<Self> {
        let spec = spec.ok_or_else(|| ProvisionerError::invalid_configuration("'userGroups' may not be null"))?;

        let mut chances = HashMap::new();
        for entry in spec.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let mut parts = entry.split(':').map(str::trim);
            let name = parts.next().unwrap_or_default();
            if name.is_empty() {
                continue;
            }

            // Empty pieces between colons are ignored, so "A::0.5" reads as "A:0.5"
            let chance = match parts.find(|piece| !piece.is_empty()) {
                Some(raw) => Self::parse_chance(raw)?,
                None => 1.0,
            };

            // Last occurrence wins
            chances.insert(name.to_string(), chance.clamp(0.0, 1.0));
        }

        Ok(Self { chances })
    }

    fn parse_chance(raw: &str) -> ProvisionerResult<f64> {
        match raw.parse::<f64>() {
            Ok(chance) if !chance.is_nan() => Ok(chance),
            _ => Err(ProvisionerError::invalid_configuration(format!("{FORMAT_HINT}; got '{raw}'"))),
        }
    }

    /// Chance configured for a group, if any
    pub fn chance(&self, group: &str) -> Option<f64> {
        self.chances.get(group).copied()
    }

    pub fn len(&self) -> usize {
        self.chances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chances.is_empty()
    }

    /// Configured group names, in no particular order
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.chances.keys().map(String::as_str)
    }

    /// Draw a random selection using the thread-local generator
    pub fn draw(&self) -> Vec<String> {
        self.draw_with(&mut rand::thread_rng())
    }

    /// Draw a random selection: each group is included independently with its chance
    pub fn draw_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        self.chances
            .iter()
            .filter(|(_, chance)| rng.r#gen::<f64>() < **chance)
            .map(|(group, _)| group.clone())
            .collect()
    }
}
