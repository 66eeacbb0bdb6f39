//! Persisted card definitions.

use card_defence_core::{CardEffect, CardType, ManaCost, ManaType, TowerConfig, TowerSubtype};
use card_defence_world::query::WorldInfo;
use serde::{Deserialize, Serialize};

use crate::EffectPredicate;

/// Everything needed to play and present a card.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CardData {
    /// Title printed on the card.
    pub title: String,
    /// Mana required to play the card.
    #[serde(default)]
    pub mana_cost: ManaCost,
    /// Broad category of the card.
    #[serde(default)]
    pub card_type: CardType,
    /// Subtypes of the tower the card builds.
    #[serde(default)]
    pub tower_subtypes: Vec<TowerSubtype>,
    /// Tower subtypes the card can be combined with.
    #[serde(default)]
    pub can_build_with: Vec<TowerSubtype>,
    /// Effects resolved when the card is played.
    #[serde(default)]
    pub effects: Vec<CardEffect>,
    /// Tower placed when the card is played.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tower: Option<TowerConfig>,
}

impl CardData {
    /// Rules text of the card.
    ///
    /// Every predicate contributes one line. Tower cards append the lines of
    /// their tower's attack.
    #[must_use]
    pub fn description(&self, world: Option<&WorldInfo<'_>>) -> String {
        let mut text = String::new();
        let attack = self.tower.iter().map(|tower| &tower.attack);
        for effect in self.effects.iter().chain(attack) {
            for predicate in &effect.predicates {
                text.push_str(&predicate.description(world));
                text.push('\n');
            }
        }
        text
    }

    /// Type line such as `Tower - Mana Damage`.
    #[must_use]
    pub fn type_line(&self) -> String {
        let mut line = self.card_type.name().to_owned();
        if !self.tower_subtypes.is_empty() {
            let subtypes: Vec<&str> = self
                .tower_subtypes
                .iter()
                .map(|subtype| subtype.name())
                .collect();
            line.push_str(" - ");
            line.push_str(&subtypes.join(" "));
        }
        line
    }

    /// Mana type that decides the card frame colour.
    ///
    /// This is the last mana type in cost order with a non-zero amount, or
    /// [`ManaType::None`] for free cards.
    #[must_use]
    pub fn dominant_mana(&self) -> ManaType {
        self.mana_cost
            .iter()
            .filter(|(_, amount)| *amount > 0)
            .map(|(mana, _)| mana)
            .last()
            .unwrap_or(ManaType::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_defence_core::{DamageUnits, LaunchProjectile, PingTiles, Predicate, Targeting};

    fn tower_card() -> CardData {
        CardData {
            title: "Arrow Tower".to_owned(),
            mana_cost: ManaCost::new([1, 0, 2, 0, 0]),
            card_type: CardType::Tower,
            tower_subtypes: vec![TowerSubtype::Mana, TowerSubtype::Damage],
            can_build_with: Vec::new(),
            effects: vec![CardEffect::new(
                Targeting::Origin,
                vec![Predicate::PingTiles(PingTiles { ticks: 3 })],
            )],
            tower: Some(TowerConfig {
                initial_wait: 0,
                animation_wait: 5,
                projectile_interval: 10,
                attack: CardEffect::projectile(LaunchProjectile::default()),
            }),
        }
    }

    #[test]
    fn type_line_lists_subtypes() {
        assert_eq!(tower_card().type_line(), "Tower - Mana Damage");

        let spell = CardData {
            card_type: CardType::Spell,
            ..CardData::default()
        };
        assert_eq!(spell.type_line(), "Spell");
    }

    #[test]
    fn description_appends_tower_attack() {
        assert_eq!(
            tower_card().description(None),
            "Ping tiles for 3 ticks\nProjectile dealing 5 damage\n"
        );
    }

    #[test]
    fn dominant_mana_is_last_paid_type() {
        assert_eq!(tower_card().dominant_mana(), ManaType::Spades);
        assert_eq!(CardData::default().dominant_mana(), ManaType::None);
    }

    #[test]
    fn card_round_trips_through_json() {
        let mut card = tower_card();
        card.effects.push(CardEffect::new(
            Targeting::Single,
            vec![Predicate::DamageUnits(DamageUnits { amount: 2 })],
        ));

        let json = serde_json::to_string_pretty(&card).expect("serialize");
        let restored: CardData = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored, card);
    }

    #[test]
    fn minimal_card_uses_defaults() {
        let card: CardData = serde_json::from_str(r#"{ "title": "Blank" }"#).expect("parse");
        assert_eq!(card.card_type, CardType::None);
        assert!(card.effects.is_empty());
        assert!(card.tower.is_none());
    }
}
