use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;

use super::eligibility::{AnswerOutcome, CoverageType, SelectedCondition};
use super::quotes::domain::{AnnotatedQuote, QuoteRequest, QuoteSort};
use super::quotes::preferences::{CarrierPreferences, PreferenceStore};
use super::quotes::pricing::PricingSource;
use super::service::QuoteService;

/// Router exposing the quoting API: condition lookup and search, answer
/// submission, the quote pipeline, and carrier preferences.
pub fn quote_router<P, S>(service: Arc<QuoteService<P, S>>) -> Router
where
    P: PricingSource + 'static,
    S: PreferenceStore + 'static,
{
    Router::new()
        .route("/api/v1/conditions", get(conditions_handler::<P, S>))
        .route("/api/v1/conditions/search", get(search_handler::<P, S>))
        .route("/api/v1/conditions/answers", post(answer_handler::<P, S>))
        .route("/api/v1/quotes", post(quotes_handler::<P, S>))
        .route(
            "/api/v1/carrier-preferences/:agency_id",
            get(get_preferences_handler::<P, S>).post(save_preferences_handler::<P, S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoverageQuery {
    #[serde(default)]
    pub(crate) coverage: CoverageType,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    pub(crate) coverage: CoverageType,
    #[serde(default)]
    pub(crate) query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnswerRequest {
    #[serde(default)]
    pub(crate) coverage: CoverageType,
    pub(crate) condition: SelectedCondition,
    pub(crate) question_text: String,
    pub(crate) answer: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) condition: SelectedCondition,
    pub(crate) outcome: AnswerOutcome,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuoteSearchRequest {
    #[serde(flatten)]
    pub(crate) request: QuoteRequest,
    #[serde(default)]
    pub(crate) conditions: Vec<SelectedCondition>,
    #[serde(default)]
    pub(crate) agency_id: Option<String>,
    #[serde(default)]
    pub(crate) sort_by: QuoteSort,
}

pub(crate) async fn conditions_handler<P, S>(
    State(service): State<Arc<QuoteService<P, S>>>,
    Query(params): Query<CoverageQuery>,
) -> Json<serde_json::Value>
where
    P: PricingSource + 'static,
    S: PreferenceStore + 'static,
{
    Json(json!({ "conditions": service.condition_names(params.coverage) }))
}

pub(crate) async fn search_handler<P, S>(
    State(service): State<Arc<QuoteService<P, S>>>,
    Query(params): Query<SearchQuery>,
) -> Response
where
    P: PricingSource + 'static,
    S: PreferenceStore + 'static,
{
    if params.query.trim().is_empty() {
        let payload = json!({ "error": "Search query is required" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    let results = service.search_conditions(params.coverage, &params.query);
    Json(json!({ "results": results })).into_response()
}

pub(crate) async fn answer_handler<P, S>(
    State(service): State<Arc<QuoteService<P, S>>>,
    Json(payload): Json<AnswerRequest>,
) -> Json<AnswerResponse>
where
    P: PricingSource + 'static,
    S: PreferenceStore + 'static,
{
    let AnswerRequest {
        coverage,
        mut condition,
        question_text,
        answer,
    } = payload;

    let outcome = service.submit_answer(coverage, &mut condition, &question_text, &answer);
    Json(AnswerResponse { condition, outcome })
}

pub(crate) async fn quotes_handler<P, S>(
    State(service): State<Arc<QuoteService<P, S>>>,
    Json(payload): Json<QuoteSearchRequest>,
) -> Result<Json<Vec<AnnotatedQuote>>, AppError>
where
    P: PricingSource + 'static,
    S: PreferenceStore + 'static,
{
    let quotes = service.annotated_quotes(
        payload.agency_id.as_deref(),
        &payload.request,
        &payload.conditions,
        payload.sort_by,
    )?;
    Ok(Json(quotes))
}

pub(crate) async fn get_preferences_handler<P, S>(
    State(service): State<Arc<QuoteService<P, S>>>,
    Path(agency_id): Path<String>,
) -> Response
where
    P: PricingSource + 'static,
    S: PreferenceStore + 'static,
{
    match service.load_preferences(&agency_id) {
        Ok(Some(preferences)) => Json(preferences).into_response(),
        Ok(None) => Json(CarrierPreferences::default()).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn save_preferences_handler<P, S>(
    State(service): State<Arc<QuoteService<P, S>>>,
    Path(agency_id): Path<String>,
    Json(preferences): Json<CarrierPreferences>,
) -> Response
where
    P: PricingSource + 'static,
    S: PreferenceStore + 'static,
{
    match service.save_preferences(&agency_id, &preferences) {
        Ok(()) => Json(json!({ "status": "success" })).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::quoting::eligibility::{
        Answer, ConditionTree, CoverageType, FinalResult, Question, QuestionKind, RuleRepository,
        UnderwritingVerdict,
    };
    use crate::quoting::quotes::domain::{QuoteRequest, RawQuote};
    use crate::quoting::quotes::preferences::{
        CarrierPreferences, PreferenceStore, PreferenceStoreError,
    };
    use crate::quoting::quotes::pricing::{PricingError, PricingSource};
    use crate::quoting::service::QuoteService;

    use super::quote_router;

    struct FixedPricing;

    impl PricingSource for FixedPricing {
        fn quotes(&self, _request: &QuoteRequest) -> Result<Vec<RawQuote>, PricingError> {
            Ok(vec![
                RawQuote {
                    carrier: "Acme Life (Select Term)".to_string(),
                    plan_name: "Select Term".to_string(),
                    tier_name: "Preferred".to_string(),
                    monthly_premium: 24.5,
                    annual_premium: 294.0,
                    warnings: None,
                    eapp: None,
                },
                RawQuote {
                    carrier: "Oxford".to_string(),
                    plan_name: "Oxford Life".to_string(),
                    tier_name: "Preferred".to_string(),
                    monthly_premium: 19.0,
                    annual_premium: 228.0,
                    warnings: None,
                    eapp: None,
                },
            ])
        }
    }

    struct FailingPricing;

    impl PricingSource for FailingPricing {
        fn quotes(&self, _request: &QuoteRequest) -> Result<Vec<RawQuote>, PricingError> {
            Err(PricingError::Unavailable("rate store offline".to_string()))
        }
    }

    #[derive(Default)]
    struct MemoryPreferences {
        entries: Mutex<HashMap<String, CarrierPreferences>>,
    }

    impl PreferenceStore for MemoryPreferences {
        fn load(&self, agency_id: &str) -> Result<Option<CarrierPreferences>, PreferenceStoreError> {
            Ok(self
                .entries
                .lock()
                .expect("preference mutex poisoned")
                .get(agency_id)
                .cloned())
        }

        fn save(
            &self,
            agency_id: &str,
            preferences: &CarrierPreferences,
        ) -> Result<(), PreferenceStoreError> {
            self.entries
                .lock()
                .expect("preference mutex poisoned")
                .insert(agency_id.to_string(), preferences.clone());
            Ok(())
        }
    }

    fn cancer_tree() -> ConditionTree {
        ConditionTree {
            questions: vec![Question {
                id: "q1".to_string(),
                text: "Diagnosed with cancer?".to_string(),
                kind: QuestionKind::YesNo,
                answers: vec![
                    Answer {
                        value: "No".to_string(),
                        next_question_id: "final1".to_string(),
                    },
                    Answer {
                        value: "Yes".to_string(),
                        next_question_id: "final2".to_string(),
                    },
                ],
            }],
            final_results: vec![
                FinalResult {
                    id: "final1".to_string(),
                    verdicts: vec![UnderwritingVerdict {
                        company: "Acme Life".to_string(),
                        decision: "Approved".to_string(),
                        reason: None,
                        complete_rule: None,
                    }],
                },
                FinalResult {
                    id: "final2".to_string(),
                    verdicts: vec![UnderwritingVerdict {
                        company: "Acme Life".to_string(),
                        decision: "Decline".to_string(),
                        reason: Some("Recent cancer diagnosis".to_string()),
                        complete_rule: None,
                    }],
                },
            ],
        }
    }

    fn repository() -> RuleRepository {
        let mut repository = RuleRepository::new();
        repository.insert_tree(CoverageType::Term, "Cancer", cancer_tree());
        repository
    }

    fn router_with<P: PricingSource + 'static>(pricing: P) -> axum::Router {
        let service = Arc::new(QuoteService::new(
            Arc::new(repository()),
            Arc::new(pricing),
            Arc::new(MemoryPreferences::default()),
        ));
        quote_router(service)
    }

    async fn read_json_body(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn json_request(uri: &str, payload: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn search_requires_a_query() {
        let response = router_with(FixedPricing)
            .oneshot(
                Request::get("/api/v1/conditions/search?coverage=term")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_returns_matching_conditions() {
        let response = router_with(FixedPricing)
            .oneshot(
                Request::get("/api/v1/conditions/search?coverage=term&query=can")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload, json!({ "results": ["Cancer"] }));
    }

    #[tokio::test]
    async fn answer_submission_steps_to_the_terminal() {
        let response = router_with(FixedPricing)
            .oneshot(json_request(
                "/api/v1/conditions/answers",
                json!({
                    "coverage": "term",
                    "condition": { "name": "Cancer", "answers": {} },
                    "questionText": "Diagnosed with cancer?",
                    "answer": "Yes",
                }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["outcome"]["state"], json!("terminal"));
        assert_eq!(payload["outcome"]["finalResultId"], json!("final2"));
        assert_eq!(payload["condition"]["finalResultId"], json!("final2"));
    }

    #[tokio::test]
    async fn quote_route_declines_matching_carriers() {
        let response = router_with(FixedPricing)
            .oneshot(json_request(
                "/api/v1/quotes",
                json!({
                    "coverage": "term",
                    "faceAmount": 100000,
                    "age": 45,
                    "sex": "male",
                    "tobacco": false,
                    "termLength": 20,
                    "state": "IA",
                    "sortBy": "price",
                    "conditions": [{
                        "name": "Cancer",
                        "answers": { "Diagnosed with cancer?": "Yes" },
                    }],
                }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        let rows = payload.as_array().expect("quote list");
        assert_eq!(rows.len(), 2);
        // Declined row sorts after the accepted one despite its premium.
        assert_eq!(rows[0]["carrier"], json!("Oxford"));
        assert_eq!(rows[0]["decline"], json!(false));
        assert_eq!(rows[1]["carrier"], json!("Acme Life (Select Term)"));
        assert_eq!(rows[1]["decline"], json!(true));
        assert_eq!(rows[1]["declineReason"], json!("Recent cancer diagnosis"));
    }

    #[tokio::test]
    async fn quote_route_reports_pricing_outage() {
        let response = router_with(FailingPricing)
            .oneshot(json_request(
                "/api/v1/quotes",
                json!({
                    "coverage": "term",
                    "faceAmount": 100000,
                    "age": 45,
                    "sex": "male",
                    "termLength": 20,
                    "state": "IA",
                }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn preferences_round_trip_and_default_to_empty() {
        let router = router_with(FixedPricing);

        let response = router
            .clone()
            .oneshot(
                Request::get("/api/v1/carrier-preferences/agency-1")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["termPreferences"], json!({}));

        let response = router
            .clone()
            .oneshot(json_request(
                "/api/v1/carrier-preferences/agency-1",
                json!({
                    "termPreferences": { "Oxford": false },
                    "fexPreferences": {},
                }),
            ))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::get("/api/v1/carrier-preferences/agency-1")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        let payload = read_json_body(response).await;
        assert_eq!(payload["termPreferences"]["Oxford"], json!(false));
    }
}
