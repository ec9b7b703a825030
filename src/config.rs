//! Declarative show setups.
//!
//! A [`ShowConfig`] lists behaviour slots and their effects as plain data, so
//! shows can be picked from presets or, with the `serde` feature, loaded from
//! JSON.
//!
//! ```ignore
//! let show = ShowConfig::preset(Preset::Peony).with_seed(7).build();
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Vec3;

use crate::behaviour::{
    Behaviour, BurstBehaviour, BurstConfig, BurstShape, PatternBehaviour, PatternConfig,
};
use crate::curve::Curve;
use crate::effect::Effect;
use crate::show::Show;

/// Which behaviour a slot runs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum BehaviourConfig {
    Burst(BurstConfig),
    Pattern(PatternConfig),
}

impl BehaviourConfig {
    /// Instantiate the behaviour.
    pub fn build(&self) -> Box<dyn Behaviour> {
        match self {
            BehaviourConfig::Burst(config) => Box::new(BurstBehaviour::new(config.clone())),
            BehaviourConfig::Pattern(config) => Box::new(PatternBehaviour::new(config.clone())),
        }
    }
}

/// One behaviour and its effect chain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotConfig {
    pub behaviour: BehaviourConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<Effect>,
}

/// Built-in looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Spherical burst with the pattern forming inside it.
    Peony,
    /// Flat ring with trails around the pattern.
    Ring,
    /// Slow drooping burst that shifts to gold and fades unevenly.
    Willow,
    /// The pattern alone, breathing while it holds.
    Glyph,
}

/// A complete show description.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShowConfig {
    /// Fixed seed; clock-seeded when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<u64>,
    pub slots: Vec<SlotConfig>,
}

impl ShowConfig {
    /// Empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slot.
    pub fn slot(mut self, behaviour: BehaviourConfig, effects: Vec<Effect>) -> Self {
        self.slots.push(SlotConfig { behaviour, effects });
        self
    }

    /// Fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Configuration for a built-in look.
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Peony => Self::new()
                .slot(
                    BehaviourConfig::Burst(BurstConfig::new()),
                    vec![Effect::fade_variance(0.5, 0.8, Curve::linear(1.0, 0.0))],
                )
                .slot(BehaviourConfig::Pattern(PatternConfig::new()), Vec::new()),

            Preset::Ring => Self::new()
                .slot(
                    BehaviourConfig::Burst(
                        BurstConfig::new()
                            .shape(BurstShape::Ring)
                            .count(300)
                            .speed(7.0, 0.5)
                            .gravity(1.0),
                    ),
                    vec![Effect::trail(0.06, 0.8, 1.0)],
                )
                .slot(
                    BehaviourConfig::Pattern(PatternConfig::new().start_spread(0.5)),
                    Vec::new(),
                ),

            Preset::Willow => Self::new()
                .slot(
                    BehaviourConfig::Burst(
                        BurstConfig::new()
                            .count(500)
                            .speed(4.0, 1.0)
                            .lifetime(2.5, 3.5)
                            .gravity(0.5)
                            .drag(0.97),
                    ),
                    vec![
                        Effect::color_shift(Vec3::new(1.0, 0.75, 0.3), Curve::ease_in()),
                        Effect::gravity_variance(1.5, 0.8, 0.5, 1.5),
                        Effect::trail(0.08, 0.6, 0.5),
                        Effect::fade_variance(0.3, 0.7, Curve::linear(1.0, 0.0)),
                    ],
                )
                .slot(BehaviourConfig::Pattern(PatternConfig::new()), Vec::new()),

            Preset::Glyph => Self::new().slot(
                BehaviourConfig::Pattern(PatternConfig::new().hold(3.0)),
                vec![Effect::breathing(1.2, 0.15, 1.0, 0.25)],
            ),
        }
    }

    /// Build a [`Show`] with one slot per entry.
    pub fn build(&self) -> Show {
        let mut show = match self.seed {
            Some(seed) => Show::new().with_seed(seed),
            None => Show::new(),
        };
        if self.slots.is_empty() {
            log::warn!("show config has no slots");
        }
        for slot in &self.slots {
            show.add_behaviour(slot.behaviour.build(), slot.effects.clone());
        }
        show
    }
}
