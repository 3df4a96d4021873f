//! Badge tiers and the claim eligibility rule.
//!
//! The tier table is static reference data. Claim state is read live from
//! the chain at check time and never cached, so a balance change between
//! check and submission remains possible; callers re-derive immediately
//! before submitting.

use crate::types::{Cid, TokenUri};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named badge level with a minimum-holding rule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl BadgeTier {
    pub const ALL: [BadgeTier; 5] = [
        BadgeTier::Bronze,
        BadgeTier::Silver,
        BadgeTier::Gold,
        BadgeTier::Platinum,
        BadgeTier::Diamond,
    ];

    /// Contract-side tier identifier.
    pub fn tier_id(self) -> u64 {
        match self {
            BadgeTier::Bronze => 1,
            BadgeTier::Silver => 2,
            BadgeTier::Gold => 3,
            BadgeTier::Platinum => 4,
            BadgeTier::Diamond => 5,
        }
    }

    /// Minimum token holding required to claim this tier.
    pub fn minimum_holding(self) -> u64 {
        match self {
            BadgeTier::Bronze => 0,
            BadgeTier::Silver => 3,
            BadgeTier::Gold => 10,
            BadgeTier::Platinum => 50,
            BadgeTier::Diamond => 100,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BadgeTier::Bronze => "Bronze Badge",
            BadgeTier::Silver => "Silver Badge",
            BadgeTier::Gold => "Gold Badge",
            BadgeTier::Platinum => "Platinum Badge",
            BadgeTier::Diamond => "Diamond Badge",
        }
    }

    /// Parses `bronze`, `Silver Badge`, etc.
    pub fn parse(name: &str) -> Option<Self> {
        let key = name.trim().to_ascii_lowercase();
        let key = key.strip_suffix(" badge").unwrap_or(&key);
        match key {
            "bronze" => Some(BadgeTier::Bronze),
            "silver" => Some(BadgeTier::Silver),
            "gold" => Some(BadgeTier::Gold),
            "platinum" => Some(BadgeTier::Platinum),
            "diamond" => Some(BadgeTier::Diamond),
            _ => None,
        }
    }
}

impl fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Why a claim was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IneligibilityReason {
    #[error("{tier} already claimed")]
    AlreadyClaimed { tier: BadgeTier },
    #[error("insufficient balance for {tier}: have {have}, need {need}")]
    InsufficientBalance {
        tier: BadgeTier,
        have: u64,
        need: u64,
    },
}

/// Verdict of the eligibility gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ineligible(IneligibilityReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Pure rule: already-claimed wins over balance, then the tier minimum
/// applies.
pub fn evaluate(tier: BadgeTier, balance: u64, claimed: bool) -> Eligibility {
    if claimed {
        return Eligibility::Ineligible(IneligibilityReason::AlreadyClaimed { tier });
    }
    let need = tier.minimum_holding();
    if balance < need {
        return Eligibility::Ineligible(IneligibilityReason::InsufficientBalance {
            tier,
            have: balance,
            need,
        });
    }
    Eligibility::Eligible
}

/// Per-tier badge artwork identifiers, used as pre-built token URIs on the
/// claim path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeCatalog {
    cids: BTreeMap<BadgeTier, Cid>,
}

impl BadgeCatalog {
    pub fn new(cids: BTreeMap<BadgeTier, Cid>) -> Self {
        Self { cids }
    }

    pub fn cid(&self, tier: BadgeTier) -> Option<&Cid> {
        self.cids.get(&tier)
    }

    pub fn token_uri(&self, tier: BadgeTier) -> Option<TokenUri> {
        self.cids.get(&tier).map(Cid::to_uri)
    }
}

impl Default for BadgeCatalog {
    fn default() -> Self {
        let mut cids = BTreeMap::new();
        cids.insert(
            BadgeTier::Bronze,
            Cid("bafkreie46vvx5hbznsqsnbxmzq6jbvtjbe6bvyjwdobxfbxniyemg5t2w4".to_string()),
        );
        cids.insert(
            BadgeTier::Silver,
            Cid("bafkreigq5hjcu5gp6roze7elsxxps4c5xndymohrtzteua7osp5m4olqzq".to_string()),
        );
        cids.insert(
            BadgeTier::Gold,
            Cid("bafkreia35spnm2ztymftss37ddvnzufqlrejxcsloaoqaenhd7zjgxfiue".to_string()),
        );
        cids.insert(
            BadgeTier::Platinum,
            Cid("bafkreif2pgkafeua7otq6fohialgaxzdknerokgfu2nhel7yu5q4dxdv3a".to_string()),
        );
        cids.insert(
            BadgeTier::Diamond,
            Cid("bafkreia6q3egtsmh7vtwpp5vgig4oucsrw62xccohfu47ofxmn6j2fkn5y".to_string()),
        );
        Self { cids }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claimed_flag_wins_regardless_of_balance() {
        for tier in BadgeTier::ALL {
            let verdict = evaluate(tier, u64::MAX, true);
            assert_eq!(
                verdict,
                Eligibility::Ineligible(IneligibilityReason::AlreadyClaimed { tier })
            );
        }
    }

    #[test]
    fn balance_below_minimum_is_ineligible() {
        let verdict = evaluate(BadgeTier::Silver, 2, false);
        assert_eq!(
            verdict,
            Eligibility::Ineligible(IneligibilityReason::InsufficientBalance {
                tier: BadgeTier::Silver,
                have: 2,
                need: 3,
            })
        );
        assert!(verdict != Eligibility::Eligible);
    }

    #[test]
    fn balance_at_minimum_is_eligible() {
        assert!(evaluate(BadgeTier::Silver, 3, false).is_eligible());
        assert!(evaluate(BadgeTier::Bronze, 0, false).is_eligible());
        assert!(evaluate(BadgeTier::Diamond, 100, false).is_eligible());
    }

    #[test]
    fn tier_table_matches_contract_ids() {
        assert_eq!(BadgeTier::Bronze.tier_id(), 1);
        assert_eq!(BadgeTier::Diamond.tier_id(), 5);
        assert_eq!(BadgeTier::Gold.minimum_holding(), 10);
        assert_eq!(BadgeTier::Platinum.minimum_holding(), 50);
    }

    #[test]
    fn parse_accepts_short_and_full_names() {
        assert_eq!(BadgeTier::parse("silver"), Some(BadgeTier::Silver));
        assert_eq!(BadgeTier::parse("Gold Badge"), Some(BadgeTier::Gold));
        assert_eq!(BadgeTier::parse("copper"), None);
    }

    #[test]
    fn default_catalog_covers_every_tier() {
        let catalog = BadgeCatalog::default();
        for tier in BadgeTier::ALL {
            let uri = catalog.token_uri(tier).unwrap();
            assert!(uri.0.starts_with("ipfs://bafkrei"));
        }
    }

    #[test]
    fn insufficient_balance_message_names_the_gap() {
        let verdict = evaluate(BadgeTier::Silver, 2, false);
        let Eligibility::Ineligible(reason) = verdict else {
            panic!("expected ineligible");
        };
        assert!(reason.to_string().contains("insufficient balance"));
        assert!(reason.to_string().contains("have 2, need 3"));
    }
}
