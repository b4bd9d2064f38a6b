//! Turn parsed questions into a graded quiz form.
//!
//! Three remote calls, in order: create the form, switch it to quiz mode,
//! then add every question in one batch update. Grading fields on items are
//! only accepted once quiz mode is on, so the order is fixed.

use thiserror::Error;
use uuid::Uuid;

use quizform_core::Question;

use crate::model::{
    BatchUpdateFormRequest, ChoiceOption, ChoiceQuestion, ChoiceType, CorrectAnswer,
    CorrectAnswers, CreateItemRequest, FormQuestion, FormSettings, Grading, Info, Item, Location,
    NewForm, QuestionItem, QuizSettings, Request, UpdateSettingsRequest,
};
use crate::{ApiError, FormsApi};

pub const EDIT_URL_BASE: &str = "https://docs.google.com/forms/d";

/// Points awarded for each correctly answered question.
pub const POINTS_PER_QUESTION: u32 = 1;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("no questions to add")]
    NoQuestions,
    #[error("Failed to create Google Form: {0}")]
    Create(#[source] ApiError),
    #[error("Failed to enable quiz mode on form {form_id}: {source}")]
    EnableQuiz { form_id: String, source: ApiError },
    #[error("Failed to add {count} questions to form {form_id}: {source}")]
    AddItems {
        form_id: String,
        count: usize,
        source: ApiError,
    },
}

impl QuizError {
    /// The remote-call failure behind this error, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::NoQuestions => None,
            Self::Create(e) => Some(e),
            Self::EnableQuiz { source, .. } | Self::AddItems { source, .. } => Some(source),
        }
    }

    /// Form left behind on the remote side when a later step failed.
    pub fn orphaned_form_id(&self) -> Option<&str> {
        match self {
            Self::EnableQuiz { form_id, .. } | Self::AddItems { form_id, .. } => Some(form_id),
            Self::NoQuestions | Self::Create(_) => None,
        }
    }
}

/// A quiz that was created and fully populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizForm {
    pub form_id: String,
    pub edit_url: String,
    /// Link respondents use to take the quiz, when the API returned one.
    pub responder_uri: Option<String>,
}

/// Edit URL of a form, derived from its ID alone.
pub fn edit_url(form_id: &str) -> String {
    format!("{EDIT_URL_BASE}/{form_id}/edit")
}

/// Creation body with a fresh random title so repeated uploads never collide.
pub fn new_form(document_title: &str) -> NewForm {
    NewForm {
        info: Info {
            title: format!("Quiz Form {}", Uuid::new_v4()),
            document_title: Some(document_title.to_string()),
        },
    }
}

pub fn enable_quiz_request() -> Request {
    Request::UpdateSettings(UpdateSettingsRequest {
        settings: FormSettings {
            quiz_settings: QuizSettings { is_quiz: true },
        },
        update_mask: "quizSettings.isQuiz".to_string(),
    })
}

/// A required single-choice item worth [`POINTS_PER_QUESTION`], placed at
/// position `index`.
pub fn create_item_request(index: usize, question: &Question) -> Request {
    Request::CreateItem(CreateItemRequest {
        item: Item {
            title: question.text.clone(),
            question_item: QuestionItem {
                question: FormQuestion {
                    required: true,
                    choice_question: ChoiceQuestion {
                        kind: ChoiceType::Radio,
                        options: question
                            .options
                            .iter()
                            .map(|value| ChoiceOption {
                                value: value.clone(),
                            })
                            .collect(),
                    },
                    grading: Grading {
                        point_value: POINTS_PER_QUESTION,
                        correct_answers: CorrectAnswers {
                            answers: vec![CorrectAnswer {
                                value: question.correct_option().to_string(),
                            }],
                        },
                    },
                },
            },
        },
        location: Location {
            index: u32::try_from(index).unwrap_or(u32::MAX),
        },
    })
}

pub fn item_requests(questions: &[Question]) -> Vec<Request> {
    questions
        .iter()
        .enumerate()
        .map(|(idx, q)| create_item_request(idx, q))
        .collect()
}

/// Create a quiz form holding `questions` and return where to edit it.
///
/// Failures after the form was created leave it behind on the remote side;
/// the form ID is logged and carried in the error.
pub async fn build_quiz(
    api: &dyn FormsApi,
    questions: &[Question],
    document_title: &str,
) -> Result<QuizForm, QuizError> {
    if questions.is_empty() {
        return Err(QuizError::NoQuestions);
    }

    tracing::info!(questions = questions.len(), "creating Google Form");
    let form = api
        .create_form(&new_form(document_title))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "form creation failed");
            QuizError::Create(e)
        })?;
    let responder_uri = form.responder_uri;
    let form_id = form.form_id.ok_or(QuizError::Create(ApiError::MissingFormId))?;
    tracing::info!(%form_id, responder_uri = responder_uri.as_deref().unwrap_or("-"), "form created");

    let settings = BatchUpdateFormRequest::new(vec![enable_quiz_request()]);
    if let Err(source) = api.batch_update(&form_id, &settings).await {
        tracing::warn!(%form_id, error = %source, "enabling quiz mode failed; empty form left behind");
        return Err(QuizError::EnableQuiz { form_id, source });
    }
    tracing::info!(%form_id, "quiz mode enabled");

    let items = BatchUpdateFormRequest::new(item_requests(questions));
    if let Err(source) = api.batch_update(&form_id, &items).await {
        tracing::warn!(%form_id, error = %source, "adding questions failed; empty quiz left behind");
        return Err(QuizError::AddItems {
            form_id,
            count: questions.len(),
            source,
        });
    }
    tracing::info!(%form_id, count = questions.len(), "questions added");

    Ok(QuizForm {
        edit_url: edit_url(&form_id),
        form_id,
        responder_uri,
    })
}
