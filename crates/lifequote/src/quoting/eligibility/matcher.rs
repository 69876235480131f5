/// Correlate a priced quote's carrier name with a verdict's company name.
///
/// Both sides are free text with no shared identifier, so the join is
/// case-insensitive equality or substring containment in either direction:
/// "American Amicable (Term Made Simple)" matches "American Amicable". The
/// same rule lets a very short company name collide with an unrelated
/// carrier; callers record that as a diagnostic rather than failing.
pub fn carrier_names_match(quote_carrier: &str, verdict_company: &str) -> bool {
    let quote = quote_carrier.trim().to_lowercase();
    let company = verdict_company.trim().to_lowercase();

    // An empty side would "contain" everything.
    if quote.is_empty() || company.is_empty() {
        return false;
    }

    quote == company || quote.contains(&company) || company.contains(&quote)
}
