use serde::{Deserialize, Serialize};

/// 从用户问题中抽取的实体集合
///
/// 由上游模型针对每次提问单独产出，只附加在助手消息上，
/// 不跨轮次累积或去重。
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ExtractedEntities {
    /// 提到或暗示的日期（如 "tomorrow", "May 5th"）
    pub dates: Vec<String>,
    /// 学期编号或标识（如 "Sem 5", "Semester 2"）
    pub semesters: Vec<String>,
    /// 课程代码或科目（如 "CS", "Math", "CA1"）
    pub courses: Vec<String>,
    /// 事件类型（如 "exam", "holiday", "submission"）
    pub events: Vec<String>,
}

impl ExtractedEntities {
    /// 创建四个空集合
    pub fn empty() -> Self {
        Self::default()
    }

    /// 是否没有任何实体
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
            && self.semesters.is_empty()
            && self.courses.is_empty()
            && self.events.is_empty()
    }

    /// 实体总数
    pub fn len(&self) -> usize {
        self.dates.len() + self.semesters.len() + self.courses.len() + self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_entities() {
        let entities = ExtractedEntities::empty();
        assert!(entities.is_empty());
        assert_eq!(entities.len(), 0);
    }

    #[test]
    fn test_missing_entities_field_defaults_to_empty_sets() {
        // 上游返回缺少字段时应落回空集合
        let entities: ExtractedEntities = serde_json::from_str(r#"{"dates":["May 10"]}"#).unwrap();
        assert_eq!(entities.dates, vec!["May 10"]);
        assert!(entities.semesters.is_empty());
        assert!(entities.courses.is_empty());
        assert!(entities.events.is_empty());
    }
}
