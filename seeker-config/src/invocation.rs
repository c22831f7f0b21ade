//! Process input: the question and the GPTScript workspace a run is bound to.
use seeker_common::{BrowserName, RunRequest, ValidationError};
use serde::Deserialize;
use std::path::PathBuf;

/// Scrubbed from the environment once read.
pub const INPUT_VAR: &str = "GPTSCRIPT_INPUT";

const SESSION_DIR_NAME: &str = "browser_session";

/// Unvalidated process input, exactly as handed over by the caller.
#[derive(Debug, Clone, Default)]
pub struct RawInvocation {
    /// JSON object carrying a `question` field.
    pub input: Option<String>,
    pub workspace_id: Option<String>,
    pub workspace_dir: Option<String>,
    /// Optional browser override; `chrome` when absent.
    pub browser: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ToolInput {
    #[serde(default)]
    question: Option<String>,
}

/// Validated process input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub question: String,
    pub workspace_id: String,
    pub workspace_dir: PathBuf,
    pub browser: BrowserName,
}

impl RawInvocation {
    /// Check every precondition, in the order a caller would fix them.
    ///
    /// ```
    /// use seeker_config::RawInvocation;
    /// use seeker_common::{BrowserName, ValidationError};
    ///
    /// let raw = RawInvocation {
    ///     input: Some(r#"{"question": "  "}"#.into()),
    ///     ..Default::default()
    /// };
    /// assert_eq!(raw.validate(), Err(ValidationError::MissingQuestion));
    ///
    /// let ok = RawInvocation {
    ///     input: Some(r#"{"question": "what is rust?"}"#.into()),
    ///     workspace_id: Some("ws-1".into()),
    ///     workspace_dir: Some("/tmp/ws".into()),
    ///     browser: Some("Edge".into()),
    /// }
    /// .validate()
    /// .unwrap();
    /// assert_eq!(ok.browser, BrowserName::Edge);
    /// ```
    pub fn validate(&self) -> Result<Invocation, ValidationError> {
        let input = self.input.as_deref().ok_or(ValidationError::MissingInput)?;
        let parsed: ToolInput = serde_json::from_str(input)
            .map_err(|e| ValidationError::MalformedInput(e.to_string()))?;

        let question = parsed.question.unwrap_or_default();
        if question.trim().is_empty() {
            return Err(ValidationError::MissingQuestion);
        }

        let (Some(workspace_id), Some(workspace_dir)) =
            (self.workspace_id.as_ref(), self.workspace_dir.as_ref())
        else {
            return Err(ValidationError::MissingWorkspace);
        };

        let browser = match self.browser.as_deref() {
            Some(raw) => raw.parse::<BrowserName>()?,
            None => BrowserName::default(),
        };

        let workspace_dir = std::path::absolute(workspace_dir)
            .map_err(|e| ValidationError::MalformedInput(format!("workspace directory: {e}")))?;

        Ok(Invocation {
            question,
            workspace_id: workspace_id.clone(),
            workspace_dir,
            browser,
        })
    }
}

impl Invocation {
    /// Directory holding the persisted browser session for this workspace.
    pub fn session_dir(&self) -> PathBuf {
        self.workspace_dir.join(SESSION_DIR_NAME)
    }

    pub fn to_run_request(&self) -> RunRequest {
        RunRequest::new(self.question.clone(), self.browser, self.session_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> RawInvocation {
        RawInvocation {
            input: Some(r#"{"question":"how do tides work?"}"#.to_string()),
            workspace_id: Some("ws".to_string()),
            workspace_dir: Some("/srv/workspace".to_string()),
            browser: None,
        }
    }

    #[test]
    fn missing_input_is_reported_first() {
        let raw = RawInvocation::default();
        assert_eq!(raw.validate(), Err(ValidationError::MissingInput));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let raw = RawInvocation {
            input: Some("not json".to_string()),
            ..complete()
        };
        assert!(matches!(
            raw.validate(),
            Err(ValidationError::MalformedInput(_))
        ));
    }

    #[test]
    fn empty_or_absent_question_is_rejected() {
        for input in [r#"{}"#, r#"{"question":""}"#, r#"{"question":" \n\t"}"#, r#"{"question":null}"#] {
            let raw = RawInvocation {
                input: Some(input.to_string()),
                ..complete()
            };
            assert_eq!(raw.validate(), Err(ValidationError::MissingQuestion), "{input}");
        }
    }

    #[test]
    fn workspace_id_and_dir_are_both_required() {
        let no_id = RawInvocation {
            workspace_id: None,
            ..complete()
        };
        let no_dir = RawInvocation {
            workspace_dir: None,
            ..complete()
        };
        assert_eq!(no_id.validate(), Err(ValidationError::MissingWorkspace));
        assert_eq!(no_dir.validate(), Err(ValidationError::MissingWorkspace));
    }

    #[test]
    fn browser_defaults_to_chrome_and_rejects_unknown_names() {
        assert_eq!(complete().validate().unwrap().browser, BrowserName::Chrome);

        let bad = RawInvocation {
            browser: Some("Opera".to_string()),
            ..complete()
        };
        assert_eq!(
            bad.validate(),
            Err(ValidationError::InvalidBrowser("opera".to_string()))
        );
    }

    #[test]
    fn session_dir_lives_under_the_workspace() {
        let inv = complete().validate().unwrap();
        assert_eq!(inv.session_dir(), PathBuf::from("/srv/workspace/browser_session"));

        let req = inv.to_run_request();
        assert_eq!(req.question(), "how do tides work?");
        assert_eq!(
            req.no_script_session_dir(),
            PathBuf::from("/srv/workspace/browser_session_no_js")
        );
    }

    #[test]
    fn relative_workspace_dir_is_made_absolute() {
        let raw = RawInvocation {
            workspace_dir: Some("relative/ws".to_string()),
            ..complete()
        };
        let inv = raw.validate().unwrap();
        assert!(inv.workspace_dir.is_absolute());
        assert!(inv.workspace_dir.ends_with("relative/ws"));
    }
}
