//! Built-in multilingual question battery.
//!
//! Each question carries a language tag (`[CN]`, `[EN]`, `[JP]`) so the
//! report shows which language was asked; the tag is stripped before prompting.

const QUESTIONS: &[&str] = &[
    // Identity
    "[CN] 你是誰？介紹一下自己。",
    "[EN] Who are you? Tell me about yourself.",
    "[JP] 自己紹介をお願いします。",
    "[CN] 你的代表色是什麼顏色？",
    "[EN] What group do you belong to?",
    // Gaming
    "[CN] 今晚要打 APEX 嗎？",
    "[EN] Are you good at FPS games?",
    "[JP] 今日はランク回すの？",
    "[CN] 如果隊友很爛，你會生氣嗎？",
    "[EN] What is your favorite weapon in Apex Legends?",
    // Cross-lingual
    "[CN] 蘋果用英文怎麼說？(期待回答: リンゴは英語でAppleだね)",
    "[EN] Where is Taiwan? (Answer in Japanese)",
    "[CN] 告訴我 1+1 等於多少。",
    "[JP] 英語は話せますか？",
    "[CN] 你聽得懂中文嗎？",
    // Toxic / tsundere reactions
    "[CN] 你的槍法真的好爛喔。",
    "[EN] You are so cute!",
    "[JP] 好きです、付き合ってください。",
    "[CN] 可以叫我一聲歐尼醬嗎？",
    "[EN] Your voice sounds sleepy.",
    // Lifestyle
    "[CN] 推薦一個宵夜給我。",
    "[EN] Do you like cats or dogs?",
    "[JP] 休日は何をして過ごしていますか？",
    "[CN] 你平常幾點睡覺？",
    "[EN] Can you cook?",
    // Deeper questions
    "[CN] 為什麼要當 VTuber？",
    "[EN] Say something nice to your fans.",
    "[JP] これからの目標は？",
    "[CN] 如果我不斗內(Donate)給你，你會討厭我嗎？",
    "[CN] 晚安，一之瀨。(期待: おやすみ)",
];

pub fn default_questions() -> Vec<String> {
    QUESTIONS.iter().map(|q| q.to_string()).collect()
}

/// Drop a leading `[XX] ` language tag.
///
/// Returns the text between the first and second `"] "` markers, so anything
/// after a second marker is cut. Text without a marker is returned unchanged.
pub fn strip_language_tag(question: &str) -> &str {
    question.split("] ").nth(1).unwrap_or(question)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_has_thirty_tagged_questions() {
        let questions = default_questions();
        assert_eq!(questions.len(), 30);
        assert!(questions.iter().all(|q| q.starts_with('[')));
    }

    #[test]
    fn strips_tag() {
        assert_eq!(strip_language_tag("[EN] Can you cook?"), "Can you cook?");
        assert_eq!(strip_language_tag("[CN] 你聽得懂中文嗎？"), "你聽得懂中文嗎？");
    }

    #[test]
    fn untagged_question_is_unchanged() {
        assert_eq!(strip_language_tag("plain question"), "plain question");
        assert_eq!(strip_language_tag("[EN]no space"), "[EN]no space");
    }

    #[test]
    fn text_after_second_marker_is_cut() {
        assert_eq!(strip_language_tag("[JP] a] b"), "a");
        assert_eq!(strip_language_tag("[JP] a]b"), "a]b");
    }
}
