use thiserror::Error;
use tracing::error;
use std::fmt::Display;

use crate::plan::PlanId;

/// Local pre-submission failures. These never reach the server; the UI shows
/// them inline next to the offending field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Informe o CPF do aluno.")]
    MissingCpf,

    #[error("Selecione o dia de vencimento da mensalidade.")]
    MissingDueDay,

    #[error("Selecione um plano.")]
    MissingPlan,

    #[error("Informe o valor da primeira mensalidade.")]
    MissingFirstPayment,

    #[error("Selecione exatamente {quota} dia(s) para o plano escolhido.")]
    DayQuotaMismatch { plan: PlanId, quota: usize },

    #[error("Dia de vencimento inválido: {0}.")]
    InvalidDueDay(u8),

    #[error("Este dia não está disponível neste CT.")]
    DayNotAllowed(i64),

    #[error("E-mail inválido.")]
    InvalidEmail,

    #[error("Esta turma não possui mais vagas disponíveis.")]
    TurmaSemVagas,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Non-2xx from the API. `message` is the server's `error` field when the
    /// body carried one, otherwise a generic fallback.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Day-picker rejection. Non-fatal: the form stays editable.
    #[error("O plano {plan} permite {quota} dia(s).")]
    QuotaExceeded { plan: PlanId, quota: usize },

    #[error("Já existe um envio em andamento para este pré-cadastro.")]
    SubmissionInFlight,

    #[error("Plano desconhecido: {0}")]
    UnknownPlan(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sessão não autenticada.")]
    NotAuthenticated,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;


pub trait TraceErr<T, E> {
    #[track_caller]
    fn trace_err(self, context: &'static str) -> std::result::Result<T, E>;
    fn trace(self) -> std::result::Result<T, E>;
}

impl<T, E: Display> TraceErr<T, E> for std::result::Result<T, E> {
    #[track_caller]
    fn trace_err(self, context: &'static str) -> std::result::Result<T, E> {
        if let Err(ref e) = self {
            let location = std::panic::Location::caller();
            error!(
                "{}:{}: error in {}: {}",
                location.file(),
                location.line(),
                context,
                e
            );
        }
        self
    }

    #[track_caller]
    fn trace(self) -> std::result::Result<T, E> {
        if let Err(ref e) = self {
            let location = std::panic::Location::caller();
            error!(
                "{}:{}: error: {}",
                location.file(),
                location.line(),
                e
            );
        }
        self
    }

}
