use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use card_defence_core::{CardEffect, Targeting};
use thiserror::Error;

const TRANSFER_DOMAIN: &str = "effect";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded effect payload.
pub(crate) const TRANSFER_HEADER: &str = "effect:v1";
/// Delimiter used to separate the prefix, area bounds and payload.
const FIELD_DELIMITER: char = ':';

/// Single card effect packed into a clipboard-friendly line.
///
/// The bounds segment mirrors the area grid of the effect so a truncated or
/// hand-edited payload is caught before it reaches the simulation. Effects
/// without an area grid report `1x1`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EffectTransfer {
    /// Effect carried by the transfer string.
    pub(crate) effect: CardEffect,
}

impl EffectTransfer {
    /// Wraps an effect for transfer.
    #[must_use]
    pub(crate) fn new(effect: CardEffect) -> Self {
        Self { effect }
    }

    /// Width and height of the effect's area grid.
    #[must_use]
    pub(crate) fn bounds(&self) -> (u32, u32) {
        match &self.effect.targeting {
            Targeting::Area(grid) => (grid.width(), grid.height()),
            Targeting::Origin | Targeting::Single => (1, 1),
        }
    }

    /// Encodes the effect into a single-line string.
    pub(crate) fn encode(&self) -> Result<String, EffectTransferError> {
        let json = serde_json::to_vec(&self.effect).map_err(EffectTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        let (width, height) = self.bounds();
        Ok(format!("{TRANSFER_HEADER}:{width}x{height}:{encoded}"))
    }

    /// Decodes an effect from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, EffectTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EffectTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(EffectTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(EffectTransferError::MissingVersion)?;
        let bounds = parts.next().ok_or(EffectTransferError::MissingBounds)?;
        let payload = parts.next().ok_or(EffectTransferError::MissingPayload)?;

        if domain != TRANSFER_DOMAIN {
            return Err(EffectTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != TRANSFER_VERSION {
            return Err(EffectTransferError::UnsupportedVersion(version.to_owned()));
        }

        let declared = parse_bounds(bounds)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(EffectTransferError::InvalidEncoding)?;
        let effect: CardEffect =
            serde_json::from_slice(&bytes).map_err(EffectTransferError::InvalidPayload)?;

        let transfer = Self { effect };
        let actual = transfer.bounds();
        if declared != actual {
            return Err(EffectTransferError::BoundsMismatch { declared, actual });
        }
        Ok(transfer)
    }
}

/// Errors that can occur while decoding effect transfer strings.
#[derive(Debug, Error)]
pub(crate) enum EffectTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("effect payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("effect string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("effect string is missing the version")]
    MissingVersion,
    /// The area bounds segment was missing.
    #[error("effect string is missing the area bounds")]
    MissingBounds,
    /// The payload segment was missing.
    #[error("effect string is missing the payload")]
    MissingPayload,
    /// The prefix segment named another kind of transfer.
    #[error("effect prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version identifier is unknown.
    #[error("effect version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The area bounds could not be parsed.
    #[error("could not parse area bounds '{0}'")]
    InvalidBounds(String),
    /// The declared bounds disagree with the decoded area grid.
    #[error("declared bounds {declared:?} do not match the effect area {actual:?}")]
    BoundsMismatch {
        /// Bounds written in the transfer string.
        declared: (u32, u32),
        /// Bounds of the decoded effect.
        actual: (u32, u32),
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode effect payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be converted to or from JSON.
    #[error("could not parse effect payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn parse_bounds(bounds: &str) -> Result<(u32, u32), EffectTransferError> {
    let invalid = || EffectTransferError::InvalidBounds(bounds.to_owned());
    let (width, height) = bounds.split_once(['x', 'X']).ok_or_else(invalid)?;

    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;

    if width == 0 || height == 0 {
        return Err(invalid());
    }

    Ok((width, height))
}
