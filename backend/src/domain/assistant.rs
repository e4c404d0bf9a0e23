//! # Assistant Backends
//!
//! The chat assistant ("小達") is a seam: [`AssistantBackend`] turns the
//! conversation so far plus a new question into reply text. The Gemini
//! client lives in `io::gemini`; [`ScriptedAssistant`] answers offline with
//! canned, deterministic text and is what the server falls back to when no
//! API key is configured.

use anyhow::Result;
use async_trait::async_trait;
use shared::{ChatMessage, ChatRole};

/// Persona and answer format sent with every request
pub const SYSTEM_INSTRUCTION: &str = "你是一位名為『小達』的專業孕期護理助手。
你的目標是透過諮詢與追問，為準媽媽提供最精確的建議。

對話邏輯（重要）：
1. 當使用者提出徵狀或問題時，不要立即給出標準答案。
2. 請先根據問題提出 2 到 3 個關鍵的【追問】，例如發生的頻率、持續時間、疼痛程度或具體部位，以便補足細節。
3. 待使用者回答後（或在對話歷史顯示已有足夠資訊時），再根據細節提供一個相似度最高、最切合當下情況的解決方案。

回覆規範：
1. 【絕對禁止】使用任何星號符號，包含 *、** 或 ***。
2. 若需強調重點，請使用「 」或【 】符號。
3. 說話風格要專業、直接、高效。不要講過多關心或安慰的廢話。
4. 每則訊息開頭只需一個極簡短的問候（如：你好。）。
5. 列表請使用數字（1. 2. 3.）或全形破折號（—）。
6. 必要時提醒尋求醫療專業協助。";

#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Generate a reply to `message`, given the earlier turns in `history`
    async fn generate_reply(&self, history: &[ChatMessage], message: &str) -> Result<String>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Topic keywords and the advice given once enough detail is known
const TOPIC_ADVICE: &[(&[&str], &str)] = &[
    (
        &["背痛", "腰痛", "腰酸"],
        "1. 避免久站久坐，每 30 分鐘起身活動一下。\n2. 睡覺時採左側臥，在膝蓋間夾一個枕頭。\n3. 可以請另一半幫忙輕柔按摩或熱敷下背部。",
    ),
    (
        &["營養", "吃", "飲食"],
        "1. 每天補充葉酸、鐵質與鈣質，多吃深綠色蔬菜。\n2. 少量多餐，避免生食與含酒精的食物。\n3. 每天喝足 2000 毫升左右的水。",
    ),
    (
        &["心跳", "胎動", "心悸"],
        "1. 找一個安靜的時間側躺，記錄一小時內的胎動次數。\n2. 心悸時先坐下深呼吸，放慢節奏。\n3. 胎動明顯減少或心悸合併胸痛時，請立即就醫。",
    ),
    (
        &["睡", "失眠"],
        "1. 固定作息，睡前一小時避免使用手機。\n2. 使用孕婦枕支撐腹部與背部。\n3. 傍晚之後減少咖啡因與大量飲水。",
    ),
];

const GENERAL_ADVICE: &str =
    "1. 保持規律作息與適度活動，例如散步或孕婦瑜珈。\n2. 把想問的問題記下來，產檢時與醫師討論。\n3. 有任何不適持續或加劇時，請盡快就醫。";

const FOLLOW_UP_QUESTIONS: &str =
    "1. 這個情況大約從什麼時候開始？發生的頻率如何？\n2. 每次持續多久？程度大約是 1 到 10 分中的幾分？\n3. 有沒有具體的部位，或是伴隨其他症狀？";

/// Offline assistant with canned answers.
///
/// The first question of a conversation gets follow-up questions; later
/// questions get topic advice matched by keyword.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedAssistant;

impl ScriptedAssistant {
    pub fn new() -> Self {
        Self
    }

    fn advice_for(text: &str) -> &'static str {
        TOPIC_ADVICE
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
            .map(|(_, advice)| *advice)
            .unwrap_or(GENERAL_ADVICE)
    }
}

#[async_trait]
impl AssistantBackend for ScriptedAssistant {
    async fn generate_reply(&self, history: &[ChatMessage], message: &str) -> Result<String> {
        let earlier_questions: Vec<&str> = history
            .iter()
            .filter(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
            .collect();

        if earlier_questions.is_empty() {
            return Ok(format!(
                "你好。想更了解妳的狀況，請再告訴我：\n{}",
                FOLLOW_UP_QUESTIONS
            ));
        }

        // the topic usually comes from the opening question
        let topic = format!("{} {}", earlier_questions.join(" "), message);
        Ok(format!(
            "你好。謝謝妳的補充，以下是一些建議：\n{}\n如果症狀持續或加劇，請盡快諮詢醫師。",
            Self::advice_for(&topic)
        ))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_first_question_asks_follow_ups() {
        let reply = ScriptedAssistant::new().generate_reply(&[], "最近背痛").await.unwrap();

        assert!(reply.starts_with("你好。"));
        assert!(reply.contains("1. "));
        assert!(reply.contains("3. "));
    }

    #[tokio::test]
    async fn test_follow_up_gets_topic_advice() {
        let now = Utc::now();
        let history = vec![
            ChatMessage::user("最近背痛怎麼辦", now),
            ChatMessage::assistant("你好。想更了解妳的狀況", now),
        ];
        let reply = ScriptedAssistant::new()
            .generate_reply(&history, "大概一週了，晚上比較嚴重")
            .await
            .unwrap();

        assert!(reply.starts_with("你好。"));
        assert!(reply.contains("左側臥"));
    }

    #[tokio::test]
    async fn test_unknown_topic_gets_general_advice() {
        let now = Utc::now();
        let history = vec![ChatMessage::user("想問問題", now)];
        let reply = ScriptedAssistant::new().generate_reply(&history, "沒有特別").await.unwrap();
        assert!(reply.contains("產檢"));
    }

    #[test]
    fn test_replies_are_deterministic() {
        let a = ScriptedAssistant::advice_for("吃什麼比較好");
        let b = ScriptedAssistant::advice_for("吃什麼比較好");
        assert_eq!(a, b);

        assert!(SYSTEM_INSTRUCTION.contains("專業、直接、高效"));
        assert!(!SYSTEM_INSTRUCTION.contains("溫柔"));
        assert!(SYSTEM_INSTRUCTION.contains("【絕對禁止】使用任何星號符號，包含 *、** 或 ***"));
        assert!(SYSTEM_INSTRUCTION.contains("「 」或【 】"));
        assert!(SYSTEM_INSTRUCTION.contains("全形破折號（—）"));
        assert!(SYSTEM_INSTRUCTION.contains("2 到 3 個關鍵的【追問】"));
    }
}
