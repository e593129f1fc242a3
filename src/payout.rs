//! Money-prize payout resolution.
//!
//! The lottery engine only asks "does this prize pay out currency, and how
//! much" through [`PayoutRule`], so the brittle text heuristic below can be
//! swapped for a structured field without touching the engine.

use crate::types::Prize;
use regex_lite::Regex;
use std::sync::OnceLock;

/// Resolves the currency payout for a prize, if any.
pub trait PayoutRule {
    fn payout_amount(&self, prize: &Prize) -> Option<f64>;
}

/// Default rule: an explicit `is_money` flag with a positive amount wins;
/// unflagged prizes fall back to scanning name/description for a currency
/// marker plus the first numeric token. The scan is a heuristic, not a
/// guarantee.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextScanPayout;

/// Substrings that mark a prize description as a currency payout.
const CURRENCY_MARKERS: &[&str] = &[
    "¥", "￥", "$", "€", "£", "元", "现金", "红包", "cash", "money",
];

fn first_number(text: &str) -> Option<f64> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid regex"));
    re.find(text).and_then(|m| m.as_str().parse().ok())
}

impl PayoutRule for TextScanPayout {
    fn payout_amount(&self, prize: &Prize) -> Option<f64> {
        if prize.is_money {
            return prize.money_amount.filter(|amount| *amount > 0.0);
        }

        let mut text = prize.name.clone();
        if let Some(ref description) = prize.description {
            text.push(' ');
            text.push_str(description);
        }
        let text = text.to_lowercase();

        if !CURRENCY_MARKERS.iter().any(|marker| text.contains(marker)) {
            return None;
        }

        first_number(&text).filter(|amount| *amount > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prize(name: &str, description: Option<&str>) -> Prize {
        Prize {
            id: 1,
            name: name.to_string(),
            description: description.map(String::from),
            weight: 1,
            is_active: true,
            is_money: false,
            money_amount: None,
            created_at: 0,
        }
    }

    #[test]
    fn explicit_flag_wins_over_text() {
        let mut p = prize("¥99 jackpot", None);
        p.is_money = true;
        p.money_amount = Some(10.0);
        assert_eq!(TextScanPayout.payout_amount(&p), Some(10.0));
    }

    #[test]
    fn flagged_without_amount_pays_nothing() {
        let mut p = prize("mystery box", None);
        p.is_money = true;
        assert_eq!(TextScanPayout.payout_amount(&p), None);
    }

    #[test]
    fn currency_marker_with_number_is_inferred() {
        assert_eq!(
            TextScanPayout.payout_amount(&prize("¥50 红包", None)),
            Some(50.0)
        );
        assert_eq!(
            TextScanPayout.payout_amount(&prize("Cash bonus", Some("$12.5 for snacks"))),
            Some(12.5)
        );
    }

    #[test]
    fn plain_prize_is_not_money() {
        assert_eq!(TextScanPayout.payout_amount(&prize("Movie night", None)), None);
    }

    #[test]
    fn number_without_marker_is_not_money() {
        assert_eq!(
            TextScanPayout.payout_amount(&prize("Read 20 pages", None)),
            None
        );
    }

    #[test]
    fn marker_without_number_is_not_money() {
        assert_eq!(
            TextScanPayout.payout_amount(&prize("cash someday", None)),
            None
        );
    }
}
