use std::collections::BTreeMap;

use crate::quoting::eligibility::CarrierVerdict;

use super::domain::{AnnotatedQuote, QuoteSort, RawQuote};
use super::preferences::PreferenceMask;

/// Attach aggregated verdicts to priced rows and apply the visibility mask.
///
/// Rows without a strictly positive monthly premium signal a rate gap, not
/// a free policy, and are dropped first. An empty verdict map or mask still
/// succeeds: nothing declined, everything visible.
pub fn annotate(
    raw_quotes: Vec<RawQuote>,
    verdicts: &BTreeMap<String, CarrierVerdict>,
    mask: &PreferenceMask,
    sort: QuoteSort,
) -> Vec<AnnotatedQuote> {
    let mut annotated: Vec<AnnotatedQuote> = raw_quotes
        .into_iter()
        .filter(|quote| quote.monthly_premium > 0.0)
        .map(|quote| {
            let verdict = verdicts.get(&quote.carrier);
            AnnotatedQuote {
                decline: verdict.map(|v| v.declined).unwrap_or(false),
                decline_reason: verdict.and_then(|v| v.reason.clone()),
                quote,
            }
        })
        .filter(|quote| mask.is_visible(&quote.quote.carrier))
        .collect();

    sort_quotes(&mut annotated, sort);
    annotated
}

/// Price mode pushes declined rows behind every non-declined row and orders
/// by ascending premium within each group; carrier mode interleaves by name
/// alone.
pub fn sort_quotes(quotes: &mut [AnnotatedQuote], sort: QuoteSort) {
    match sort {
        QuoteSort::Price => quotes.sort_by(|a, b| {
            a.decline.cmp(&b.decline).then_with(|| {
                a.quote
                    .monthly_premium
                    .total_cmp(&b.quote.monthly_premium)
            })
        }),
        QuoteSort::Carrier => quotes.sort_by(|a, b| {
            a.quote
                .carrier
                .to_lowercase()
                .cmp(&b.quote.carrier.to_lowercase())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(carrier: &str, monthly: f64) -> RawQuote {
        RawQuote {
            carrier: carrier.to_string(),
            plan_name: format!("{carrier} Plan"),
            tier_name: "Preferred".to_string(),
            monthly_premium: monthly,
            annual_premium: monthly * 12.0,
            warnings: None,
            eapp: None,
        }
    }

    fn declined(reason: &str) -> CarrierVerdict {
        CarrierVerdict {
            declined: true,
            reason: Some(reason.to_string()),
        }
    }

    #[test]
    fn drops_rows_without_a_positive_premium() {
        let quotes = annotate(
            vec![raw("X", 0.0), raw("Y", 20.0)],
            &BTreeMap::new(),
            &PreferenceMask::allow_all(),
            QuoteSort::Price,
        );

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].quote.carrier, "Y");
        assert!(!quotes[0].decline);
    }

    #[test]
    fn attaches_decline_and_reason_from_the_aggregate() {
        let mut verdicts = BTreeMap::new();
        verdicts.insert("Acme Life".to_string(), declined("Recent cancer diagnosis"));

        let quotes = annotate(
            vec![raw("Acme Life", 31.5), raw("Oxford", 27.0)],
            &verdicts,
            &PreferenceMask::allow_all(),
            QuoteSort::Price,
        );

        let acme = quotes
            .iter()
            .find(|quote| quote.quote.carrier == "Acme Life")
            .expect("acme row kept");
        assert!(acme.decline);
        assert_eq!(acme.decline_reason.as_deref(), Some("Recent cancer diagnosis"));

        let oxford = quotes
            .iter()
            .find(|quote| quote.quote.carrier == "Oxford")
            .expect("oxford row kept");
        assert!(!oxford.decline);
        assert!(oxford.decline_reason.is_none());
    }

    #[test]
    fn masked_carriers_disappear() {
        let mut mask = PreferenceMask::allow_all();
        mask.suppress("Oxford");

        let quotes = annotate(
            vec![raw("Oxford", 27.0), raw("Sentinel", 30.0)],
            &BTreeMap::new(),
            &mask,
            QuoteSort::Price,
        );

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].quote.carrier, "Sentinel");
    }

    #[test]
    fn price_sort_puts_declined_rows_last_regardless_of_premium() {
        let mut verdicts = BTreeMap::new();
        verdicts.insert("Cheap Declined".to_string(), declined("history"));

        let quotes = annotate(
            vec![
                raw("Cheap Declined", 5.0),
                raw("Mid", 40.0),
                raw("Low", 20.0),
            ],
            &verdicts,
            &PreferenceMask::allow_all(),
            QuoteSort::Price,
        );

        let order: Vec<&str> = quotes.iter().map(|q| q.quote.carrier.as_str()).collect();
        assert_eq!(order, vec!["Low", "Mid", "Cheap Declined"]);
    }

    #[test]
    fn carrier_sort_interleaves_declined_rows_alphabetically() {
        let mut verdicts = BTreeMap::new();
        verdicts.insert("Beta".to_string(), declined("history"));

        let quotes = annotate(
            vec![raw("Gamma", 10.0), raw("Beta", 20.0), raw("alpha", 30.0)],
            &verdicts,
            &PreferenceMask::allow_all(),
            QuoteSort::Carrier,
        );

        let order: Vec<&str> = quotes.iter().map(|q| q.quote.carrier.as_str()).collect();
        assert_eq!(order, vec!["alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn second_pass_with_the_same_inputs_drops_nothing() {
        let mut verdicts = BTreeMap::new();
        verdicts.insert("Beta".to_string(), declined("history"));
        let mut mask = PreferenceMask::allow_all();
        mask.suppress("Gamma");

        let first = annotate(
            vec![raw("Alpha", 12.0), raw("Beta", 9.0), raw("Gamma", 15.0)],
            &verdicts,
            &mask,
            QuoteSort::Price,
        );
        let second = annotate(
            first.iter().map(|q| q.quote.clone()).collect(),
            &verdicts,
            &mask,
            QuoteSort::Price,
        );

        assert_eq!(first, second);
    }
}
