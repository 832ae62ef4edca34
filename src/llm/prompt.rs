//! 提示词构造
//!
//! 上下文串、任务提示和结构化输出 schema 的唯一定义处。
//! 上下文串按原始顺序给出每条消息的角色前缀和文本。

use serde_json::{Value, json};

use crate::models::message::ChatMessage;

/// 系统指令
pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful academic assistant. Always be precise with dates.";

/// 把对话转写渲染为角色前缀的文本行
///
/// 每条消息一行，格式 `User: ...` / `Assistant: ...`，保持原始顺序。
pub fn conversation_context(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|msg| format!("{}: {}", msg.role.display_name(), msg.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 构造任务提示
///
/// 要求模型：(1) 只从新问题中抽取实体；(2) 以图片为事实来源回答；
/// (3) 按 schema 返回单个 JSON 对象。
pub fn task_prompt(context: &str, question: &str) -> String {
    format!(
        r#"You are an intelligent academic calendar assistant.
The user has provided an academic calendar image.

Current Chat History:
{context}

User's New Question: "{question}"

Task:
1. Analyze the user's question to extract specific entities: Dates, Semesters (e.g., "sem 5", "4th semester"), Course codes or specific Exam names (e.g., "CS", "CA1", "MSE"), and Event types.
2. Look at the provided calendar image to find the answer.
3. If the user mentions a semester not explicitly visible (like 'Sem 5'), assume the calendar might imply patterns or explicitly state if it's for Even/Odd semesters. If the question cannot be answered for that semester, inform the user politely, or infer if the question is general.
4. Provide a helpful, natural language answer.

Return your response in JSON format matching the schema."#
    )
}

/// 结构化输出 schema
///
/// `answer` 与 `entities` 必填，实体为四个字符串数组。
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "answer": {
                "type": "STRING",
                "description": "The natural language answer to the user's question based on the calendar."
            },
            "entities": {
                "type": "OBJECT",
                "description": "Entities extracted specifically from the user's latest question.",
                "properties": {
                    "dates": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "Specific dates or date ranges mentioned or implied (e.g., 'tomorrow', 'May 5th')."
                    },
                    "semesters": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "Semester numbers or identifiers (e.g., 'Sem 5', 'Semester 2')."
                    },
                    "courses": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "Course codes or subjects mentioned (e.g., 'CS', 'Math', 'CA1')."
                    },
                    "events": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" },
                        "description": "Event types (e.g., 'exam', 'holiday', 'submission')."
                    }
                }
            }
        },
        "required": ["answer", "entities"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entities::ExtractedEntities;

    #[test]
    fn test_conversation_context_preserves_order_and_roles() {
        let messages = vec![
            ChatMessage::assistant("Hello!", ExtractedEntities::empty()),
            ChatMessage::user("When is the Sem 4 MSE?"),
            ChatMessage::assistant("May 10", ExtractedEntities::empty()),
        ];

        let context = conversation_context(&messages);
        let lines: Vec<&str> = context.lines().collect();
        assert_eq!(lines[0], "Assistant: Hello!");
        assert_eq!(lines[1], "User: When is the Sem 4 MSE?");
        assert_eq!(lines[2], "Assistant: May 10");
    }

    #[test]
    fn test_conversation_context_empty_transcript() {
        assert_eq!(conversation_context(&[]), "");
    }

    #[test]
    fn test_task_prompt_contains_context_then_question() {
        let messages = vec![
            ChatMessage::user("first question"),
            ChatMessage::assistant("first answer", ExtractedEntities::empty()),
        ];
        let context = conversation_context(&messages);
        let prompt = task_prompt(&context, "second question");

        let ctx_pos = prompt.find("User: first question").unwrap();
        let answer_pos = prompt.find("Assistant: first answer").unwrap();
        let q_pos = prompt.find(r#"User's New Question: "second question""#).unwrap();
        assert!(ctx_pos < answer_pos);
        assert!(answer_pos < q_pos);
    }

    #[test]
    fn test_response_schema_requires_answer_and_entities() {
        let schema = response_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "answer"));
        assert!(required.iter().any(|v| v == "entities"));

        let entity_props = schema["properties"]["entities"]["properties"]
            .as_object()
            .unwrap();
        for field in ["dates", "semesters", "courses", "events"] {
            assert_eq!(entity_props[field]["type"], "ARRAY");
        }
    }
}
