use thiserror::Error;

/// Answer sent for a bulk-arguments request: run with no extra arguments.
pub const BULK_ARGUMENTS_RESPONSE: &str = "{}";

pub const LOGIN_FAILED_TEXT: &str = "Login failed. Please reenter credentials.";

/// What the backend asks for mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSubject {
    Username,
    Password,
    BulkArguments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Username,
    Password,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Username => "Username",
            PromptKind::Password => "Password",
        }
    }

    fn required_text(self) -> &'static str {
        match self {
            PromptKind::Username => "Username is required.",
            PromptKind::Password => "Password is required.",
        }
    }
}

/// The single open credential prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
    /// Cursor position in characters.
    pub cursor: usize,
    pub error: Option<String>,
}

impl Prompt {
    fn open(kind: PromptKind, input: String, error: Option<String>) -> Self {
        let cursor = input.chars().count();
        Self {
            kind,
            input,
            cursor,
            error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayAction {
    Nothing,
    Respond(String),
    CancelRun,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("{requested:?} requested while the {open:?} prompt is still open")]
    PromptAlreadyOpen {
        open: PromptKind,
        requested: PromptKind,
    },
}

/// Answers backend credential requests, one prompt at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CredentialRelay {
    prompt: Option<Prompt>,
    login_failed: bool,
    last_username: String,
}

impl CredentialRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn login_failed(&self) -> bool {
        self.login_failed
    }

    pub fn request(&mut self, subject: CredentialSubject) -> Result<RelayAction, RelayError> {
        let kind = match subject {
            CredentialSubject::BulkArguments => {
                return Ok(RelayAction::Respond(BULK_ARGUMENTS_RESPONSE.to_string()));
            }
            CredentialSubject::Username => PromptKind::Username,
            CredentialSubject::Password => PromptKind::Password,
        };
        if let Some(open) = &self.prompt {
            return Err(RelayError::PromptAlreadyOpen {
                open: open.kind,
                requested: kind,
            });
        }

        // After a rejected login the username is kept for editing; passwords never are.
        let input = match kind {
            PromptKind::Username if self.login_failed => self.last_username.clone(),
            _ => String::new(),
        };
        let error = self.login_failed.then(|| LOGIN_FAILED_TEXT.to_string());
        self.prompt = Some(Prompt::open(kind, input, error));
        Ok(RelayAction::Nothing)
    }

    /// Replaces the prompt input. Returns false when no prompt is open.
    pub fn set_input(&mut self, text: impl Into<String>) -> bool {
        match self.prompt.as_mut() {
            Some(prompt) => {
                prompt.input = text.into();
                prompt.cursor = prompt.input.chars().count();
                true
            }
            None => false,
        }
    }

    pub fn submit(&mut self) -> RelayAction {
        let Some(prompt) = self.prompt.as_mut() else {
            return RelayAction::Nothing;
        };
        if prompt.input.is_empty() {
            prompt.error = Some(prompt.kind.required_text().to_string());
            return RelayAction::Nothing;
        }

        let Some(prompt) = self.prompt.take() else {
            return RelayAction::Nothing;
        };
        if prompt.kind == PromptKind::Username {
            self.last_username = prompt.input.clone();
        }
        self.login_failed = false;
        RelayAction::Respond(prompt.input)
    }

    pub fn cancel(&mut self) -> RelayAction {
        if self.prompt.take().is_none() {
            return RelayAction::Nothing;
        }
        self.login_failed = false;
        RelayAction::CancelRun
    }

    pub fn mark_login_failed(&mut self) {
        self.login_failed = true;
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.error = Some(LOGIN_FAILED_TEXT.to_string());
        }
    }

    /// Returns false if there was nothing to dismiss.
    pub fn dismiss_error(&mut self) -> bool {
        let prompt_error = self
            .prompt
            .as_mut()
            .and_then(|prompt| prompt.error.take())
            .is_some();
        let was_failed = std::mem::replace(&mut self.login_failed, false);
        prompt_error || was_failed
    }
}
