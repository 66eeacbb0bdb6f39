//! Activation pipeline turning card effects into world mutations.

use card_defence_core::{Activation, CardEffect, Command, Event};
use card_defence_system_targeting::TargetResolver;
use card_defence_world::{self as world, query, World};

use crate::{CardData, EffectPredicate, ResolutionInfo, SkippedPredicate};

/// Resolves card effects against the world.
#[derive(Debug, Default)]
pub struct EffectPipeline {
    resolver: TargetResolver,
}

impl EffectPipeline {
    /// Creates a new pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates every effect in order.
    ///
    /// Each predicate resolves its targets against a fresh snapshot, so it
    /// observes the mutations of the predicates before it. Predicates whose
    /// targets cannot be resolved are recorded as skipped and the activation
    /// carries on.
    pub fn activate(
        &self,
        world: &mut World,
        effects: &[CardEffect],
        activation: &Activation,
        out_events: &mut Vec<Event>,
    ) -> ResolutionInfo {
        let mut resolution = ResolutionInfo::new();
        tracing::debug!(
            origin = %activation.origin,
            facing = ?activation.facing,
            effects = effects.len(),
            "activating effects"
        );

        for (effect_index, effect) in effects.iter().enumerate() {
            for (predicate_index, predicate) in effect.predicates.iter().enumerate() {
                let commands = {
                    let info = query::world_info(world);
                    let required = predicate.target_type();
                    match self
                        .resolver
                        .resolve(&effect.targeting, required, activation, &info)
                    {
                        Ok(targets) => {
                            predicate.perform(&targets, &info, &mut resolution);
                            resolution.take_pending()
                        }
                        Err(error) => {
                            tracing::warn!(
                                effect = effect_index,
                                predicate = predicate_index,
                                %error,
                                "skipping predicate"
                            );
                            resolution.record_skip(SkippedPredicate {
                                effect: effect_index,
                                predicate: predicate_index,
                                error,
                            });
                            continue;
                        }
                    }
                };

                for command in commands {
                    resolution.record_applied(command.clone());
                    world::apply(world, command, out_events);
                }
            }
        }

        resolution
    }

    /// Plays a card from the activation origin.
    ///
    /// Cards that carry a tower place it on the origin tile facing the
    /// activation facing. Every other card activates its effects.
    pub fn play_card(
        &self,
        world: &mut World,
        card: &CardData,
        activation: &Activation,
        out_events: &mut Vec<Event>,
    ) -> ResolutionInfo {
        tracing::debug!(title = %card.title, "playing card");
        let Some(tower) = card.tower.as_ref() else {
            return self.activate(world, &card.effects, activation, out_events);
        };

        let mut resolution = ResolutionInfo::new();
        let command = Command::PlaceTower {
            tile: activation.origin,
            facing: activation.facing,
            config: tower.clone(),
        };
        resolution.record_applied(command.clone());
        world::apply(world, command, out_events);
        resolution
    }
}
