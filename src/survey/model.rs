use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A generated questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub survey_name: String,
    pub survey_intro: String,
    pub questions: Vec<SurveyQuestion>,
}

/// Text questions carry an empty `options` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl Survey {
    /// Parse model output into the typed schema, enforcing the question ceiling.
    pub fn from_value(value: Value, max_questions: usize) -> Result<Self, String> {
        let survey: Survey = serde_json::from_value(value).map_err(|e| e.to_string())?;

        if survey.survey_name.trim().is_empty() {
            return Err("survey_name is empty".to_string());
        }
        if survey.questions.is_empty() {
            return Err("survey has no questions".to_string());
        }
        if survey.questions.len() > max_questions {
            return Err(format!(
                "survey has {} questions, limit is {}",
                survey.questions.len(),
                max_questions
            ));
        }
        if let Some(pos) = survey
            .questions
            .iter()
            .position(|q| q.question_text.trim().is_empty())
        {
            return Err(format!("question {} has no text", pos + 1));
        }

        Ok(survey)
    }

    /// Cheap shape check used in passthrough mode, for logging only.
    pub fn matches_shape(value: &Value) -> bool {
        serde_json::from_value::<Survey>(value.clone()).is_ok()
    }
}
