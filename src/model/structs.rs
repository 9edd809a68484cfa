use serde::{Deserialize, Serialize};
use std::fmt;

/// One course offering as kept in the local catalog.
///
/// On disk the course code is stored under the portal's own key `kcdm`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct CourseRecord {
    pub name: String,
    pub pid: String, // 教学任务ID, dedup key
    #[serde(rename = "kcdm")]
    pub course_code: String,
    #[serde(default = "unknown_teacher")]
    pub teacher: String,
}

fn unknown_teacher() -> String {
    "未知".to_string()
}

impl fmt::Display for CourseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} ({})", self.name, self.teacher, self.course_code)
    }
}

/// Course-type workflow targeted by a registration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CourseCategory {
    #[default]
    Required,
    QualityExpansion,
    MajorExpansion,
}

impl CourseCategory {
    pub const ALL: [CourseCategory; 3] = [
        CourseCategory::Required,
        CourseCategory::QualityExpansion,
        CourseCategory::MajorExpansion,
    ];

    /// Value sent as `p_xkfsdm`.
    pub fn code(self) -> &'static str {
        match self {
            CourseCategory::Required => "bx-b-b",
            CourseCategory::QualityExpansion => "sztzk-b-b",
            CourseCategory::MajorExpansion => "zytzk-b-b",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CourseCategory::Required => "必修课",
            CourseCategory::QualityExpansion => "素质拓展",
            CourseCategory::MajorExpansion => "专业拓展",
        }
    }

    pub fn from_code(code: &str) -> Option<CourseCategory> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_display_matches_list_format() {
        let record = CourseRecord {
            name: "Intro".to_string(),
            pid: "123".to_string(),
            course_code: "CS101".to_string(),
            teacher: "Dr. X".to_string(),
        };
        assert_eq!(record.to_string(), "Intro - Dr. X (CS101)");
    }

    #[test]
    fn record_serializes_code_as_kcdm() {
        let record = CourseRecord {
            name: "高等数学".to_string(),
            pid: "1".to_string(),
            course_code: "M1".to_string(),
            teacher: String::new(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kcdm"], "M1");
        assert!(json.get("course_code").is_none());
    }

    #[test]
    fn missing_teacher_defaults_to_unknown() {
        let record: CourseRecord =
            serde_json::from_str(r#"{"name":"A","pid":"9","kcdm":"K"}"#).unwrap();
        assert_eq!(record.teacher, "未知");
    }

    #[test]
    fn category_codes_round_trip() {
        for category in CourseCategory::ALL {
            assert_eq!(CourseCategory::from_code(category.code()), Some(category));
        }
        assert_eq!(CourseCategory::default().code(), "bx-b-b");
        assert_eq!(CourseCategory::from_code("nope"), None);
    }
}
