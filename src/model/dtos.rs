use crate::config::{PollInterval, TermConfig};
use crate::model::structs::{CourseCategory, CourseRecord};

/// Live selection read by the poller at every tick; the interval is fixed
/// when a run starts
#[derive(Debug, Clone, Default)]
pub struct PollConfig {
    pub target: Option<CourseRecord>,
    pub category: CourseCategory,
    pub interval: PollInterval,
    pub term: TermConfig,
}

/// Url-encoded body of an `addGouwuche` request.
///
/// Only the category code, course id and course code vary between
/// attempts; everything else is fixed by the portal's search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    fields: Vec<(&'static str, String)>,
}

impl RegistrationForm {
    pub fn new(term: &TermConfig, category: CourseCategory, course: &CourseRecord) -> Self {
        let xnxq = term.xnxq();
        let fields = vec![
            ("cxsfmt", "1".to_string()),
            ("p_pylx", "1".to_string()),
            ("mxpylx", "1".to_string()),
            ("p_sfgldjr", "0".to_string()),
            ("p_sfredis", "0".to_string()),
            ("p_sfsyxkgwc", "0".to_string()),
            ("p_xktjz", "rwtjzyx".to_string()),
            ("p_chaxunxh", String::new()),
            ("p_gjz", String::new()),
            ("p_skjs", String::new()),
            ("p_xn", term.xn.clone()),
            ("p_xq", term.xq.clone()),
            ("p_xnxq", xnxq.clone()),
            ("p_dqxn", term.xn.clone()),
            ("p_dqxq", term.xq.clone()),
            ("p_dqxnxq", xnxq),
            ("p_xkfsdm", category.code().to_string()),
            ("p_xiaoqu", String::new()),
            ("p_kkyx", String::new()),
            ("p_kclb", String::new()),
            ("p_xkxs", String::new()),
            ("p_dyc", String::new()),
            ("p_kkxnxq", String::new()),
            ("p_id", course.pid.clone()),
            ("p_kcdm_cxrw", course.course_code.clone()),
            ("p_kcdm_cxrw_zckc", course.course_code.clone()),
            ("p_sfhlctkc", "0".to_string()),
            ("p_sfhllrlkc", "0".to_string()),
            ("p_kxsj_xqj", String::new()),
            ("p_kxsj_ksjc", String::new()),
            ("p_kxsj_jsjc", String::new()),
            ("p_kcdm_js", String::new()),
            ("p_kc_gjz", String::new()),
            ("p_xzcxtjz_nj", String::new()),
            ("p_xzcxtjz_yx", String::new()),
            ("p_xzcxtjz_zy", String::new()),
            ("p_xzcxtjz_zyfx", String::new()),
            ("p_xzcxtjz_bj", String::new()),
            ("p_sfxsgwckb", "1".to_string()),
            ("p_skyy", String::new()),
            ("p_sfmxzj", "0".to_string()),
            ("p_chaxunxkfsdm", String::new()),
            ("pageNum", "1".to_string()),
            ("pageSize", "23".to_string()),
        ];

        Self { fields }
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> CourseRecord {
        CourseRecord {
            name: "Intro".to_string(),
            pid: "123".to_string(),
            course_code: "CS101".to_string(),
            teacher: "Dr. X".to_string(),
        }
    }

    #[test]
    fn live_fields_follow_selection() {
        let form = RegistrationForm::new(
            &TermConfig::default(),
            CourseCategory::QualityExpansion,
            &course(),
        );
        assert_eq!(form.get("p_xkfsdm"), Some("sztzk-b-b"));
        assert_eq!(form.get("p_id"), Some("123"));
        assert_eq!(form.get("p_kcdm_cxrw"), Some("CS101"));
        assert_eq!(form.get("p_kcdm_cxrw_zckc"), Some("CS101"));
    }

    #[test]
    fn term_fields_fill_both_selecting_and_current_term() {
        let form = RegistrationForm::new(
            &TermConfig::new("2024-2025", "1"),
            CourseCategory::Required,
            &course(),
        );
        assert_eq!(form.get("p_xn"), Some("2024-2025"));
        assert_eq!(form.get("p_dqxq"), Some("1"));
        assert_eq!(form.get("p_xnxq"), Some("2024-20251"));
        assert_eq!(form.get("p_dqxnxq"), Some("2024-20251"));
    }

    #[test]
    fn fixed_shape_has_unique_names() {
        let form = RegistrationForm::new(&TermConfig::default(), CourseCategory::Required, &course());
        let mut names: Vec<_> = form.fields().iter().map(|(k, _)| *k).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 44);
        assert_eq!(form.get("pageSize"), Some("23"));
        assert_eq!(form.get("p_skjs"), Some(""));
    }
}
