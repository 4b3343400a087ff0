//! Turn orchestrator
//!
//! AWAITING INPUT → ROUTED → {HELP | HAND-OFF | PAYMENT | GOAL | CHAT} → RENDERED
//!
//! Each turn is routed once, runs exactly one behavior, renders one reply and
//! one caption, and is then appended to the session history.

pub mod reply;

use crate::classifier::{route_message, DelegatedClassifier, IntentClassifier, RuleBasedClassifier};
use crate::config::CoachConfig;
use crate::conversational::{Conversationalist, DelegatedConversationalist, RuleBasedConversationalist};
use crate::extractor::PaymentRequest;
use crate::gemini::GeminiClient;
use crate::handoff::{HandoffBuilder, HandoffPayload};
use crate::llm::TextGenerator;
use crate::models::{IntentResult, Route, Utterance};
use crate::planner::{GoalPlanner, GoalRequest};
use crate::savings::{PaymentPayload, SavingsEstimator};
use crate::session::{ContextWindow, SessionContext, WindowConfig};
use crate::summarizer::{DelegatedSummarizer, RuleBasedSummarizer, Summarizer};
use crate::Result;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The strategy set used for every turn, chosen once at start-up
#[derive(Clone)]
pub struct Strategies {
    pub classifier: Arc<dyn IntentClassifier>,
    pub summarizer: Arc<dyn Summarizer>,
    pub conversationalist: Arc<dyn Conversationalist>,
    /// Name of the backing generator, `None` in rule-based mode
    pub generator: Option<String>,
}

impl Strategies {
    pub fn rule_based() -> Self {
        Self {
            classifier: Arc::new(RuleBasedClassifier),
            summarizer: Arc::new(RuleBasedSummarizer),
            conversationalist: Arc::new(RuleBasedConversationalist),
            generator: None,
        }
    }

    pub fn delegated(generator: Arc<dyn TextGenerator>, window: ContextWindow) -> Self {
        Self {
            generator: Some(generator.name().to_string()),
            classifier: Arc::new(DelegatedClassifier::new(generator.clone())),
            summarizer: Arc::new(DelegatedSummarizer::new(generator.clone())),
            conversationalist: Arc::new(DelegatedConversationalist::new(generator, window)),
        }
    }

    /// Delegated strategies when an API key is configured, rule-based otherwise
    pub fn from_config(config: &CoachConfig) -> Result<Self> {
        match GeminiClient::from_config(config)? {
            Some(client) => {
                info!(endpoint = client.endpoint(), "Using delegated strategies");
                let window = ContextWindow::new(WindowConfig {
                    max_turns: config.history_turns,
                    ..WindowConfig::default()
                });
                Ok(Self::delegated(Arc::new(client), window))
            }
            None => {
                info!("No API key configured, using rule-based strategies");
                Ok(Self::rule_based())
            }
        }
    }

    pub fn is_delegated(&self) -> bool {
        self.generator.is_some()
    }
}

/// Where a turn currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "route", rename_all = "kebab-case")]
pub enum TurnState {
    AwaitingInput,
    Routed(Route),
    Replied(Route),
    Rendered,
}

/// Everything one turn produces
#[derive(Debug, Clone, Serialize)]
pub struct TurnReply {
    pub route: Route,
    pub body: String,
    pub caption: String,
    /// Structured payload shown alongside the prose, if the route has one
    pub payload: Option<Value>,
    pub turn_index: usize,
    pub trace: Vec<TurnState>,
}

/// Body, caption and payload of one terminal state
struct Rendered {
    body: String,
    caption: String,
    payload: Option<Value>,
}

#[derive(Serialize)]
struct HandoffReply<'a> {
    classification: &'a IntentResult,
    handoff: &'a HandoffPayload,
}

/// Main orchestrator that runs one turn at a time against a session
pub struct Orchestrator {
    strategies: Strategies,
    progress_seed: Option<u64>,
}

impl Orchestrator {
    pub fn new(strategies: Strategies, progress_seed: Option<u64>) -> Self {
        Self {
            strategies,
            progress_seed,
        }
    }

    pub fn from_config(config: &CoachConfig) -> Result<Self> {
        Ok(Self::new(Strategies::from_config(config)?, config.progress_seed))
    }

    pub fn strategies(&self) -> &Strategies {
        &self.strategies
    }

    /// Handle one user turn; never fails.
    pub async fn handle_turn(&self, session: &mut SessionContext, text: &str) -> TurnReply {
        let utterance = Utterance::new(text, session.next_turn_index());
        let mut trace = vec![TurnState::AwaitingInput];

        let route = route_message(utterance.text());
        trace.push(TurnState::Routed(route));

        info!(
            session_id = %session.session_id,
            turn = utterance.turn_index(),
            route = %route,
            "Turn routed"
        );

        let rendered = match route {
            Route::Help => Rendered {
                body: reply::HELP_TEXT.to_string(),
                caption: reply::HELP_CAPTION.to_string(),
                payload: None,
            },
            Route::Handoff => self.handoff(&utterance).await,
            Route::PaymentOptimization => self.payment(session, &utterance),
            Route::GoalPlanning => self.goal(session, &utterance),
            Route::GeneralChat => self.chat(session, &utterance).await,
        };
        trace.push(TurnState::Replied(route));

        session.record_turn(utterance.text(), &rendered.body);
        trace.push(TurnState::Rendered);

        debug!(
            turn = utterance.turn_index(),
            history_len = session.history().len(),
            "Turn recorded"
        );

        TurnReply {
            route,
            body: rendered.body,
            caption: rendered.caption,
            payload: rendered.payload,
            turn_index: utterance.turn_index(),
            trace,
        }
    }

    async fn handoff(&self, utterance: &Utterance) -> Rendered {
        let summary = self.strategies.summarizer.summarize(utterance.text()).await;
        let classification = self.strategies.classifier.classify(utterance.text()).await;
        let handoff = HandoffBuilder::build(&summary, &classification);

        info!(
            intent = %classification.intent,
            urgency = %classification.urgency,
            department = %handoff.target_department,
            "Hand-off built"
        );

        Rendered {
            body: reply::handoff_body(&summary, &classification, &handoff),
            caption: reply::handoff_caption(&summary),
            payload: to_payload(&HandoffReply {
                classification: &classification,
                handoff: &handoff,
            }),
        }
    }

    fn payment(&self, session: &mut SessionContext, utterance: &Utterance) -> Rendered {
        let request = PaymentRequest::from_text(utterance.text());
        let estimate =
            SavingsEstimator::estimate(request.amount, &request.mcc, &request.rules, &request.usage);
        let payload = PaymentPayload::new(
            &request.merchant,
            &request.mcc,
            request.amount,
            &estimate,
            Utc::now().timestamp(),
        );

        info!(
            merchant = %payload.merchant,
            amount = payload.amount,
            card = %payload.recommended_card,
            saving = payload.expected_saving,
            "Payment optimized"
        );

        let rendered = Rendered {
            body: reply::payment_body(&payload),
            caption: reply::payment_caption(&payload),
            payload: to_payload(&payload),
        };
        session.remember_payment(payload);
        rendered
    }

    fn goal(&self, session: &mut SessionContext, utterance: &Utterance) -> Rendered {
        let request = GoalRequest::from_text(utterance.text());
        let plan = GoalPlanner::plan(&request, self.progress_seed);

        info!(
            goal = %plan.goal,
            target = plan.target,
            months = plan.months,
            monthly = plan.monthly,
            "Goal plan created"
        );

        let rendered = Rendered {
            body: reply::goal_body(&plan),
            caption: reply::goal_caption(&plan),
            payload: to_payload(&plan),
        };
        session.remember_plan(plan);
        rendered
    }

    async fn chat(&self, session: &SessionContext, utterance: &Utterance) -> Rendered {
        let answer = self
            .strategies
            .conversationalist
            .reply(session.history(), utterance.text())
            .await;

        Rendered {
            caption: reply::chat_caption(&answer),
            body: answer,
            payload: None,
        }
    }
}

fn to_payload<T: Serialize>(value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Failed to serialize reply payload: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedGenerator;
    use crate::models::Intent;
    use crate::session::Role;

    fn rule_based() -> Orchestrator {
        Orchestrator::new(Strategies::rule_based(), None)
    }

    #[tokio::test]
    async fn test_help_bypasses_other_routes() {
        let orchestrator = rule_based();
        let mut session = SessionContext::new();

        let reply = orchestrator.handle_turn(&mut session, "/help 결제 목표").await;
        assert_eq!(reply.route, Route::Help);
        assert_eq!(reply.body, reply::HELP_TEXT);
        assert!(reply.payload.is_none());
        assert_eq!(
            reply.trace,
            vec![
                TurnState::AwaitingInput,
                TurnState::Routed(Route::Help),
                TurnState::Replied(Route::Help),
                TurnState::Rendered,
            ]
        );
    }

    #[tokio::test]
    async fn test_payment_turn_recommends_best_card() {
        let orchestrator = rule_based();
        let mut session = SessionContext::new();

        let reply = orchestrator
            .handle_turn(&mut session, "스타커피 12800원 결제 예정 추천 카드 적용해줘")
            .await;

        assert_eq!(reply.route, Route::PaymentOptimization);
        assert_eq!(reply.caption, "스타커피 12,800원 - 추천 Alpha Card (절약 640원)");

        let payload = reply.payload.expect("payment payload");
        assert_eq!(payload["merchant"], "스타커피");
        assert_eq!(payload["mcc"], "CAFE");
        assert_eq!(payload["amount"], 12_800);
        assert_eq!(payload["recommended_card"], "Alpha Card");
        assert_eq!(payload["expected_saving"], 640);
        assert!(reply.body.contains("```json"));

        let remembered = session.last_payment().expect("remembered payment");
        assert_eq!(remembered.recommended_card, "Alpha Card");
    }

    #[tokio::test]
    async fn test_goal_turn_uses_configured_seed() {
        let text = "여행 자금 200만원 8개월 보통 위험으로 목표 플랜";
        let seeded = Orchestrator::new(Strategies::rule_based(), Some(42));

        let mut first = SessionContext::new();
        let mut second = SessionContext::new();
        let a = seeded.handle_turn(&mut first, text).await;
        let b = seeded.handle_turn(&mut second, text).await;

        assert_eq!(a.route, Route::GoalPlanning);
        assert_eq!(a.payload, b.payload);
        assert_eq!(a.caption, "'여행 자금' 월 250,000원로 8개월!");

        let plan = first.last_plan().expect("remembered plan");
        assert_eq!(plan.monthly, 250_000);
        assert_eq!(plan.target, 2_000_000);
        assert!((5..=40).contains(&plan.progress));
    }

    #[tokio::test]
    async fn test_rule_based_handoff() {
        let orchestrator = rule_based();
        let mut session = SessionContext::new();

        let reply = orchestrator
            .handle_turn(&mut session, "정기예금 금리 불일치 정리해서 요약 핸드오프 만들어줘")
            .await;

        assert_eq!(reply.route, Route::Handoff);
        assert!(reply.caption.starts_with("요약 완료: "));
        assert!(reply.caption.chars().count() <= reply::CAPTION_MAX_CHARS);

        let payload = reply.payload.expect("hand-off payload");
        assert_eq!(payload["classification"]["intent"], "complaint");
        assert_eq!(payload["handoff"]["target_department"], "고객보호센터");
        assert_eq!(payload["handoff"]["priority"], 1);
    }

    #[tokio::test]
    async fn test_delegated_handoff_uses_generator_once_per_component() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("카드 혜택 누락 문의입니다."),
            Ok(r#"{"intent":"card","sub_intent":"혜택 누락","urgency":"high"}"#),
        ]));
        let orchestrator = Orchestrator::new(
            Strategies::delegated(generator.clone(), ContextWindow::default()),
            None,
        );
        let mut session = SessionContext::new();

        let reply = orchestrator.handle_turn(&mut session, "카드 혜택 요약 부탁").await;
        let payload = reply.payload.expect("hand-off payload");

        assert_eq!(generator.prompts().len(), 2);
        assert_eq!(payload["classification"]["intent"], Intent::Card.as_str());
        assert_eq!(payload["handoff"]["priority"], 2);
        assert_eq!(payload["handoff"]["context_summary"], "카드 혜택 누락 문의입니다.");
    }

    #[tokio::test]
    async fn test_delegated_failures_do_not_abort_turn() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Err("down"), Err("down")]));
        let orchestrator = Orchestrator::new(
            Strategies::delegated(generator, ContextWindow::default()),
            None,
        );
        let mut session = SessionContext::new();

        let reply = orchestrator.handle_turn(&mut session, "민원 요약").await;
        let payload = reply.payload.expect("hand-off payload");

        assert!(reply.body.contains("[LLM 오류:"));
        assert_eq!(payload["classification"]["intent"], "other");
        assert_eq!(payload["handoff"]["target_department"], "종합상담");
    }

    #[tokio::test]
    async fn test_chat_turn_sees_prior_history() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok("네, 안녕하세요!"), Ok("기억하고 있어요.")]));
        let orchestrator = Orchestrator::new(
            Strategies::delegated(generator.clone(), ContextWindow::default()),
            None,
        );
        let mut session = SessionContext::new();

        orchestrator.handle_turn(&mut session, "안녕").await;
        let second = orchestrator.handle_turn(&mut session, "내 인사 기억해?").await;

        assert_eq!(second.route, Route::GeneralChat);
        assert_eq!(second.turn_index, 1);
        assert_eq!(second.caption, "기억하고 있어요.");
        assert!(generator.prompts()[1].starts_with("User: 안녕\nAssistant: 네, 안녕하세요!\n"));
    }

    #[tokio::test]
    async fn test_history_is_appended_after_each_turn() {
        let orchestrator = rule_based();
        let mut session = SessionContext::new();

        let first = orchestrator.handle_turn(&mut session, "오늘 날씨 어때?").await;
        let second = orchestrator.handle_turn(&mut session, "/help").await;

        assert_eq!(first.turn_index, 0);
        assert_eq!(second.turn_index, 1);

        let turns = session.history().turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].text, "오늘 날씨 어때?");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].text, first.body);
        assert_eq!(turns[3].text, reply::HELP_TEXT);
    }
}
