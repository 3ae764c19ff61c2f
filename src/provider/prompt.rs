//! Prompt builder for the cat-judge persona.
//!
//! [`PromptBuilder::build_chat`] produces the `(system_msg, user_msg)` pair
//! sent to the chat-completion endpoint.  The user message embeds both
//! names, the conflict context and both stories verbatim, followed by the
//! fixed persona, HTML-markup and output-shape instructions.  The same case
//! always produces the same prompt.

use crate::case::CaseData;

// ---------------------------------------------------------------------------
// Fixed instruction text
// ---------------------------------------------------------------------------

/// System message asserting JSON output (used by the OpenAI-compatible
/// backend alongside `response_format: json_object`).
pub const JUDGE_SYSTEM_MSG: &str = "你是一位专业的法官，总是返回有效的JSON格式。";

/// Transcription instruction sent with inline audio (Gemini backend).
pub const TRANSCRIBE_INSTRUCTION: &str =
    "请将这段音频中的对话准确转录为中文文本。不要添加任何评论，只返回转录内容。";

/// Fixed illustration prompt for the judge portrait.
pub const JUDGE_IMAGE_PROMPT: &str = "A serious yet cute cat judge sitting at a high court \
bench, wearing a white judge wig and black robe, holding a wooden gavel. The background is a \
courtroom. Anime style, high quality, digital art, expressive face.";

/// Persona, formatting and verdict rules appended after the case sections.
const JUDGE_RULES: &str = r#"你的任务：
1. **HTML 标签使用规范**：
   - 使用 <p> 标签包裹段落内容
   - 使用 <strong> 标签强调关键词、重要观点或结论
   - 使用 <ul> 和 <li> 标签列出多个要点（如问题清单、建议列表）
   - 使用 <br> 进行段落内换行
   - 严禁使用 Markdown 语法（如 **粗体**、- 列表等）
   - 确保每个标签正确闭合，嵌套层级清晰

2. **分析部分要求**：
   - 客观但带有同理心地分析情况
   - 指出核心的沟通误区（使用 <strong> 强调）
   - 对两个人的问题分别进行分析，再进行总体的核心问题分析
   - 列出 2-3 个关键问题点（使用 <ul><li>）
   - 分析开头和结尾加入猫猫法官的生动语气
   - 例如："喵！肃静！本法官正在整理胡须……不对，是整理卷宗！"

3. **建议部分要求**：
   - 给出具体的、有建设性的"和解建议"
   - 先给出当下可以完成的和解步骤，再给出今后的相处建议
   - 每条建议独立成段（<p>），重要步骤用 <strong> 标注
   - 建议列表使用 <ul><li> 格式，开头用猫猫口吻引导

4. **语气要求**：
   - 使用猫猫的口头禅（如"喵"、"愚蠢的人类"、"本喵"、"小铲屎官"等）
   - 傲娇但善良的性格特征（表面嫌弃，实则关心）
   - 中文回答，语言生动有趣但不失严肃性

5. **判决要求**：
   - 为每个人分配"责任百分比"（0-100%），总和必须为100%
   - 公平合理，避免明显偏袒"#;

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds judgment prompts for a case.
///
/// # Example
/// ```rust
/// use neko_judge::case::CaseData;
/// use neko_judge::provider::PromptBuilder;
///
/// let case = CaseData {
///     name_a: "木可".into(),
///     name_b: "木尚".into(),
///     context: "忘记纪念日".into(),
///     story_a: "他忘了".into(),
///     story_b: "我没忘只是晚说".into(),
/// };
/// let (system, user) = PromptBuilder::new().build_chat(&case);
/// assert!(system.contains("JSON"));
/// assert!(user.contains("木可"));
/// ```
#[derive(Debug, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the `(system_msg, user_msg)` pair for a judgment call.
    pub fn build_chat(&self, case: &CaseData) -> (String, String) {
        (JUDGE_SYSTEM_MSG.to_string(), self.build(case))
    }

    /// Build the flat user prompt: persona intro, case sections (names,
    /// context, both stories verbatim), rules, and the required JSON shape.
    pub fn build(&self, case: &CaseData) -> String {
        format!(
            r#"你是一位"猫猫法官"（Neko Judge），一位智慧、公正、稍微有点傲娇但心地善良的猫咪法官。
你正在审理一对情侣（{name_a} 和 {name_b}）之间的争吵案件。
该程序旨在帮助情侣解决不和，增进感情。

案件背景：
"{context}"

{name_a} 的陈述（原告）：
"{story_a}"

{name_b} 的陈述（被告）：
"{story_b}"

{rules}

请严格按照以下 JSON 格式返回结果：
{{
  "blameA": {name_a}的责任百分比(0-100),
  "blameB": {name_b}的责任百分比(0-100),
  "analysis": "法官对案件的分析(HTML string，必须包含完整的HTML标签)",
  "advice": "给情侣的和解建议(HTML string，必须包含完整的HTML标签)"
}}"#,
            name_a = case.name_a,
            name_b = case.name_b,
            context = case.context,
            story_a = case.story_a,
            story_b = case.story_b,
            rules = JUDGE_RULES,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
