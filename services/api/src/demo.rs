use crate::infra::{
    load_rules, parse_class, parse_coverage, parse_sex, parse_sort, InMemoryPreferenceStore,
    StaticRateTable,
};
use chrono::Local;
use clap::Args;
use lifequote::config::AppConfig;
use lifequote::error::AppError;
use lifequote::quoting::eligibility::{CoverageType, SelectedConditions};
use lifequote::quoting::quotes::{
    PreferenceStore, PricingSource, QuoteRequest, QuoteSort, Sex, UnderwritingClass,
};
use lifequote::quoting::QuoteService;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct QuoteDemoArgs {
    /// Coverage universe to quote (term or fex)
    #[arg(long, default_value = "term", value_parser = parse_coverage)]
    coverage: CoverageType,
    /// Face amount in dollars
    #[arg(long, default_value_t = 100_000)]
    face_amount: u32,
    /// Applicant age
    #[arg(long, default_value_t = 69)]
    age: u8,
    /// Applicant sex (male or female)
    #[arg(long, default_value = "male", value_parser = parse_sex)]
    sex: Sex,
    /// Tobacco use
    #[arg(long)]
    tobacco: bool,
    /// Term length in years (term coverage only)
    #[arg(long, default_value_t = 20)]
    term_length: u8,
    /// FEX underwriting class (level, graded, guaranteed, limited)
    #[arg(long, default_value = "level", value_parser = parse_class)]
    underwriting_class: UnderwritingClass,
    /// Resident state code
    #[arg(long, default_value = "IA")]
    state: String,
    /// Result ordering (price or carrier)
    #[arg(long, default_value = "price", value_parser = parse_sort)]
    sort: QuoteSort,
    /// Attach a sample answered health condition to show decline handling
    #[arg(long)]
    with_conditions: bool,
}

pub(crate) fn run_quote_demo(args: QuoteDemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let rules = Arc::new(load_rules(&config.rules));
    let service = QuoteService::new(
        rules.clone(),
        Arc::new(StaticRateTable::new(Local::now().date_naive())),
        Arc::new(InMemoryPreferenceStore::default()),
    );

    println!("Life quote demo");
    println!(
        "Coverage: {} | face ${} | age {} | tobacco {}",
        args.coverage.label(),
        args.face_amount,
        args.age,
        if args.tobacco { "yes" } else { "no" }
    );

    if rules.is_available(args.coverage) {
        let names = service.condition_names(args.coverage);
        println!("Conditions loaded: {}", names.len());
        let hits = service.search_conditions(args.coverage, "can");
        if !hits.is_empty() {
            println!("Search \"can\" -> {}", hits.join(", "));
        }
    } else {
        println!("Rule sheet unavailable; quoting with no health restrictions");
    }

    let mut selections = SelectedConditions::new();
    if args.with_conditions {
        attach_sample_condition(&service, &mut selections, args.coverage);
    }

    let request = QuoteRequest {
        coverage: args.coverage,
        face_amount: args.face_amount,
        age: Some(args.age),
        birthday: None,
        sex: args.sex,
        tobacco: args.tobacco,
        term_length: Some(args.term_length),
        underwriting_class: Some(args.underwriting_class),
        state: args.state.clone(),
    };

    let quotes = service.annotated_quotes(None, &request, selections.as_slice(), args.sort)?;

    if quotes.is_empty() {
        println!("\nNo quotes available for these parameters");
        return Ok(());
    }

    println!("\nQuotes ({} rows)", quotes.len());
    for quote in &quotes {
        let status = if quote.decline {
            match &quote.decline_reason {
                Some(reason) => format!("Decline ({reason})"),
                None => "Decline".to_string(),
            }
        } else {
            "Approved".to_string()
        };
        println!(
            "- {} | {} | {} | ${:.2}/mo | ${:.2}/yr | {}",
            quote.quote.carrier,
            quote.quote.plan_name,
            quote.quote.tier_name,
            quote.quote.monthly_premium,
            quote.quote.annual_premium,
            status
        );
    }

    Ok(())
}

/// Walk one of the bundled sample conditions to a declining terminal so the
/// demo output shows the annotation path.
fn attach_sample_condition<P, S>(
    service: &QuoteService<P, S>,
    selections: &mut SelectedConditions,
    coverage: CoverageType,
) where
    P: PricingSource + 'static,
    S: PreferenceStore + 'static,
{
    let steps: &[(&str, &str, &str)] = match coverage {
        CoverageType::Term => &[
            (
                "Cancer",
                "Have you been diagnosed with or treated for cancer?",
                "Yes",
            ),
            ("Cancer", "When did you last receive treatment?", "Under 2 years ago"),
        ],
        CoverageType::Fex => &[
            ("COPD", "Have you been diagnosed with COPD?", "Yes"),
            ("COPD", "Do you currently use oxygen?", "Yes"),
        ],
    };

    for (name, question, answer) in steps {
        let condition = selections.add(name);
        service.submit_answer(coverage, condition, question, answer);
    }

    for condition in selections.as_slice() {
        match &condition.final_result_id {
            Some(id) => println!("Condition {}: resolved to {id}", condition.name),
            None => println!("Condition {}: not resolved (check the rule sheet)", condition.name),
        }
    }
}
