//! Price heuristics over rendered page text and selector results.

use std::sync::LazyLock;

use regex::Regex;
use vitrine_core::{is_plausible_price, Installment, Interest, Money};

use crate::money::{
    first_plausible_money, is_plausible_literal, normalize_for_match, parse_money_literal,
};

static INSTALLMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\s*[x×]\s*de\s*(R\$\s?\d{1,3}(?:\.\d{3})*,\d{2})(?:\s+(sem|com)\s+juros)?",
    )
    .expect("valid installment regex")
});

static PIX_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(R\$\s?\d{1,3}(?:\.\d{3})*,\d{2})\s*(?:[àa]\s*vista\s*)?no\s*pix")
        .expect("valid pix regex")
});

static BARE_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:\.\d{3})*,\d{2}").expect("valid amount regex"));

/// What a keyword line said about the price found next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceContext {
    /// The line mentions Pix: the price is both the cash and the Pix price.
    Pix,
    /// The line only says "à vista": a cash price, Pix not claimed.
    Cash,
}

/// A price located next to a payment keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextualPrice {
    pub money: Money,
    pub context: PriceContext,
}

fn line_context(line: &str) -> Option<PriceContext> {
    let norm = normalize_for_match(line);
    if norm.contains("pix") {
        Some(PriceContext::Pix)
    } else if norm.contains("a vista") || norm.contains("avista") {
        Some(PriceContext::Cash)
    } else {
        None
    }
}

/// Scans `text` line by line for a payment keyword (`pix`, `a vista`) and
/// returns the first plausible price on that line, else on the previous
/// line, else on the next line. The first keyword line that yields a price
/// wins.
#[must_use]
pub fn money_near_keyword(text: &str) -> Option<ContextualPrice> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    for (idx, line) in lines.iter().enumerate() {
        let Some(context) = line_context(line) else {
            continue;
        };
        let previous = idx.checked_sub(1).and_then(|i| lines.get(i));
        let next = lines.get(idx + 1);
        let found = std::iter::once(line)
            .chain(previous)
            .chain(next)
            .find_map(|candidate| first_plausible_money(candidate));
        if let Some(money) = found {
            return Some(ContextualPrice { money, context });
        }
    }
    None
}

/// A money literal immediately followed by "no Pix" (optionally "à vista no Pix").
#[must_use]
pub fn money_before_pix(text: &str) -> Option<Money> {
    PIX_SUFFIX_RE
        .captures_iter(text)
        .filter_map(|cap| parse_money_literal(cap.get(1)?.as_str()))
        .find(is_plausible_literal)
}

/// First `Nx de R$ ...` plan in `text` whose per-installment amount is a
/// plausible price.
#[must_use]
pub fn find_installment(text: &str) -> Option<Installment> {
    INSTALLMENT_RE.captures_iter(text).find_map(|cap| {
        let count: u32 = cap.get(1)?.as_str().parse().ok()?;
        let amount = parse_money_literal(cap.get(2)?.as_str())?;
        if count == 0 || !is_plausible_literal(&amount) {
            return None;
        }
        let plan = Installment::new(count, amount);
        Some(match cap.get(3).map(|m| m.as_str().to_lowercase()) {
            Some(word) if word == "sem" => plan.with_interest(Interest::Free),
            Some(_) => plan.with_interest(Interest::Charged),
            None => plan,
        })
    })
}

/// Reads a price out of a single element's text.
///
/// Accepts a full literal (`R$ 1.234,56`) or a bare amount (`171,84`); bare
/// amounts are re-rendered through the canonical formatter.
#[must_use]
pub fn price_from_element_text(text: &str) -> Option<Money> {
    if let Some(money) = first_plausible_money(text) {
        return Some(money);
    }
    BARE_AMOUNT_RE.find_iter(text).find_map(|m| {
        let value = parse_money_literal(&format!("R$ {}", m.as_str()))?.to_decimal()?;
        is_plausible_price(value).then(|| Money::from_decimal(value))
    })
}

/// Selector variant: the first element text, in priority order, that reads
/// as a plausible price.
#[must_use]
pub fn first_price_in<S: AsRef<str>>(texts: &[S]) -> Option<Money> {
    texts
        .iter()
        .find_map(|t| price_from_element_text(t.as_ref()))
}
