//! Card vocabulary shared by card data and presentation adapters.

use serde::{Deserialize, Serialize};

/// Mana suits a card cost can be paid in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ManaType {
    /// Generic mana.
    None,
    /// Clubs mana.
    Clubs,
    /// Spades mana.
    Spades,
    /// Hearts mana.
    Hearts,
    /// Diamonds mana.
    Diamonds,
}

impl ManaType {
    /// Every mana type in cost order.
    pub const ALL: [ManaType; 5] = [
        ManaType::None,
        ManaType::Clubs,
        ManaType::Spades,
        ManaType::Hearts,
        ManaType::Diamonds,
    ];

    /// Position of the mana type within a [`ManaCost`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::None => 0,
            Self::Clubs => 1,
            Self::Spades => 2,
            Self::Hearts => 3,
            Self::Diamonds => 4,
        }
    }

    /// Text symbol used when printing costs.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::None => "-",
            Self::Clubs => "♧",
            Self::Spades => "♤",
            Self::Hearts => "♡",
            Self::Diamonds => "♢",
        }
    }

    /// Card frame colour as RGB bytes.
    #[must_use]
    pub const fn color(self) -> [u8; 3] {
        match self {
            Self::None => [0xa2, 0xae, 0xad],
            Self::Clubs => [0x00, 0xff, 0x00],
            Self::Spades => [0xcc, 0x00, 0xcc],
            Self::Hearts => [0xff, 0x00, 0x00],
            Self::Diamonds => [0xff, 0xeb, 0x04],
        }
    }
}

/// Amount of each mana type a card costs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaCost([u32; 5]);

impl ManaCost {
    /// Creates a cost from per-type amounts in [`ManaType::ALL`] order.
    #[must_use]
    pub const fn new(amounts: [u32; 5]) -> Self {
        Self(amounts)
    }

    /// Amount of the provided mana type.
    #[must_use]
    pub const fn get(&self, mana: ManaType) -> u32 {
        self.0[mana.index()]
    }

    /// Total amount of mana across every type.
    #[must_use]
    pub fn mana_value(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Iterates over every mana type with its amount.
    pub fn iter(&self) -> impl Iterator<Item = (ManaType, u32)> + '_ {
        ManaType::ALL.into_iter().map(|mana| (mana, self.get(mana)))
    }
}

/// Broad category of a card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// Uncategorised card.
    #[default]
    None,
    /// Card that builds a tower.
    Tower,
    /// Card that resolves effects.
    Spell,
    /// Card that resolves effects.
    Skill,
}

impl CardType {
    /// Name printed on the card's type line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Tower => "Tower",
            Self::Spell => "Spell",
            Self::Skill => "Skill",
        }
    }
}

/// Subtypes a tower card can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerSubtype {
    /// Tower that produces mana.
    Mana,
    /// Tower that deals damage.
    Damage,
}

impl TowerSubtype {
    /// Name printed on the card's type line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mana => "Mana",
            Self::Damage => "Damage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mana_value_sums_every_type() {
        let cost = ManaCost::new([1, 0, 2, 0, 3]);
        assert_eq!(cost.mana_value(), 6);
        assert_eq!(cost.get(ManaType::Spades), 2);
    }

    #[test]
    fn iteration_follows_cost_order() {
        let cost = ManaCost::new([0, 1, 0, 0, 0]);
        let types: Vec<ManaType> = cost.iter().map(|(mana, _)| mana).collect();
        assert_eq!(types, ManaType::ALL.to_vec());
    }

    #[test]
    fn every_mana_type_has_a_symbol() {
        for mana in ManaType::ALL {
            assert!(!mana.symbol().is_empty());
        }
    }
}
