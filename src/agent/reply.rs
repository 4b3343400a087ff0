//! Reply rendering
//!
//! Every terminal state produces a markdown body (prose plus fenced JSON
//! blocks) and a short avatar caption.

use crate::handoff::HandoffPayload;
use crate::models::{format_won, IntentResult};
use crate::planner::{AssetMix, GoalPlan};
use crate::savings::PaymentPayload;
use serde::Serialize;

/// Captions longer than this many characters are cut
pub const CAPTION_MAX_CHARS: usize = 60;

/// Chat replies are previewed up to this many characters in the caption
const CHAT_PREVIEW_CHARS: usize = 40;

pub const HELP_TEXT: &str = "**가능한 요청 (예시)**
- 요약/분류/핸드오프: \"정기예금 금리 불일치 정리해서 핸드오프 만들어줘\"
- 결제 최적화: \"스타커피 12800원 결제 예정 추천 카드 적용해줘\"
  · 파라미터 직입력도 가능: `결제 merchant=스타커피 amount=12800 mcc=CAFE`
- 목표 플랜: \"여행 자금 200만원 8개월 보통 위험으로 목표 플랜\"
- 일반 대화: 그냥 물어보면 돼요.
- 대화 초기화: `/reset`";

pub const HELP_CAPTION: &str = "어서 오세요. 어떤 금융 고민을 도와드릴까요?";

/// Cut `text` to at most `max` characters, marking the cut with `...`
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

pub fn clamp_caption(caption: &str) -> String {
    truncate_chars(caption, CAPTION_MAX_CHARS)
}

/// Fenced, pretty-printed JSON block
fn json_block<T: Serialize>(value: &T) -> String {
    let body = serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e));
    format!("```json\n{}\n```", body)
}

//
// ================= Hand-off =================
//

pub fn handoff_body(summary: &str, classification: &IntentResult, handoff: &HandoffPayload) -> String {
    format!(
        "**요약**\n{}\n\n**의도 분류**\n{}\n\n**상담사 핸드오프**\n{}",
        summary,
        json_block(classification),
        json_block(handoff)
    )
}

pub fn handoff_caption(summary: &str) -> String {
    clamp_caption(&format!("요약 완료: {}", summary))
}

//
// ================= Payment =================
//

pub fn payment_body(payload: &PaymentPayload) -> String {
    format!(
        "**결제 직전 최적화(모의)**\n\
         - 가맹점: {} / MCC: {}\n\
         - 금액: {}\n\
         - 추천 카드: **{}**\n\
         - 예상 절약: **{}**\n\
         - 사유: {}\n\n\
         **적용 페이로드(모의)**\n{}",
        payload.merchant,
        payload.mcc,
        format_won(payload.amount),
        payload.recommended_card,
        format_won(payload.expected_saving),
        payload.reason,
        json_block(payload)
    )
}

pub fn payment_caption(payload: &PaymentPayload) -> String {
    clamp_caption(&format!(
        "{} {} - 추천 {} (절약 {})",
        payload.merchant,
        format_won(payload.amount),
        payload.recommended_card,
        format_won(payload.expected_saving)
    ))
}

//
// ================= Goal =================
//

fn percent_mix(mix: &AssetMix, decimals: usize) -> String {
    mix.buckets()
        .iter()
        .map(|(label, value)| format!("{} {:.*}%", label, decimals, value * 100.0))
        .collect::<Vec<_>>()
        .join(" / ")
}

pub fn goal_body(plan: &GoalPlan) -> String {
    let mut out = format!(
        "**목표 플랜 생성**\n\
         - 목표: {} / 기간: {}개월\n\
         - 목표 금액: {}\n\
         - 권장 월 납입: **{}**\n\
         - 위험 성향: {}\n\
         - 권장 배분: {}\n\
         - 가정 수익(연): {}\n\
         - 진행률(시작치): {}%\n\n",
        plan.goal,
        plan.months,
        format_won(plan.target),
        format_won(plan.monthly),
        plan.risk.label_ko(),
        percent_mix(&plan.mix, 0),
        percent_mix(&plan.assumed_yields, 1),
        plan.progress
    );

    out.push_str("| 월 | 권장 납입 | 누적 |\n");
    out.push_str("|----|----------|------|\n");
    for row in plan.schedule() {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            row.month,
            format_won(row.contribution),
            format_won(row.cumulative)
        ));
    }

    out.push('\n');
    out.push_str(&json_block(plan));
    out
}

pub fn goal_caption(plan: &GoalPlan) -> String {
    clamp_caption(&format!(
        "'{}' 월 {}로 {}개월!",
        plan.goal,
        format_won(plan.monthly),
        plan.months
    ))
}

//
// ================= Chat =================
//

pub fn chat_caption(reply: &str) -> String {
    let preview: String = reply.chars().take(CHAT_PREVIEW_CHARS).collect();
    if reply.chars().count() > CHAT_PREVIEW_CHARS {
        clamp_caption(&format!("{}...", preview))
    } else {
        clamp_caption(&preview)
    }
}
