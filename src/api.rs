use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{PixTransacao, Presenca, Turma, UserKind, Usuario};
use crate::plan::PlanId;

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub cpf: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Usuario,
}

/// Django REST framework page envelope. `next`/`previous` are absolute URLs.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default)]
    pub warning: Option<String>,
}

/// Error body the API returns on non-2xx. Not every endpoint fills `error`.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: Option<String>,
}


// Matrícula ---

/// Body of `POST usuarios/finalizar-agendamento/{precadastro_id}/`.
///
/// `valor_primeira_mensalidade` is absent for students that already train at
/// the CT (no first-payment collection); `dias_habilitados` is absent when no
/// explicit day constraint applies; `cpf` is absent when the pré-cadastro
/// already carries one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    pub dia_vencimento: u8,
    pub plano: PlanId,
    pub plano_familia: bool,
    pub ja_aluno: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_primeira_mensalidade: Option<BigDecimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dias_habilitados: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePreCadastroRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telefone: String,
    pub data_nascimento: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turma: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
}


// User administration ---

#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest {
    pub username: String, // CPF digits, mirrored by the API
    pub cpf: String,
    pub email: String,
    pub tipo: UserKind,
    pub first_name: String,
    pub last_name: String,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    // aluno
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone_responsavel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone_emergencia: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome_responsavel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ficha_medica: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dia_vencimento: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_mensalidade: Option<BigDecimal>,
    // professor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salario_professor: Option<BigDecimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix_professor: Option<String>,
}


// Turmas ---

#[derive(Debug, Serialize)]
pub struct RosterRequest {
    pub alunos: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsertTurmaRequest {
    pub professor: i64,
    pub ct: i64,
    pub horario: chrono::NaiveTime,
    pub dias_semana: Vec<i64>,
    pub capacidade_maxima: u32,
    pub ativo: bool,
}


// Attendance ---

/// One roster row of `funcionarios/verificar-checkin/{turma_id}/`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckinAluno {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub checkin_realizado: bool,
    #[serde(default)]
    pub presenca_confirmada: bool,
    #[serde(default)]
    pub pode_confirmar_presenca: bool,
}

#[derive(Debug, Deserialize)]
pub struct VerificarCheckinResponse {
    #[serde(default)]
    pub alunos: Vec<CheckinAluno>,
}

#[derive(Debug, Serialize)]
pub struct RegistrarPresencaRequest {
    pub presenca: Vec<String>, // IDs como string
}

#[derive(Debug, Deserialize)]
pub struct RelatorioPresencaResponse {
    #[serde(default)]
    pub presencas: Vec<Presenca>,
}

#[derive(Debug, Serialize)]
pub struct CorrigirPresencaRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_realizado: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presenca_confirmada: Option<bool>,
}


// Financeiro ---

#[derive(Debug, Serialize)]
pub struct GerarPixRequest {
    pub expiracao_minutos: u32,
}

#[derive(Debug, Deserialize)]
pub struct PixGeradoResponse {
    pub message: Option<String>,
    pub transacao: PixTransacao,
}

#[derive(Debug, Deserialize)]
pub struct PixStatusResponse {
    pub transacao: PixTransacao,
}

#[derive(Debug, Deserialize)]
pub struct DarBaixaResponse {
    pub message: Option<String>,
    pub mensalidade: crate::models::Mensalidade,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsertMensalidadeRequest {
    pub aluno: i64,
    pub valor: BigDecimal,
    pub data_inicio: NaiveDate,
    pub data_vencimento: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsertDespesaRequest {
    pub descricao: String,
    pub valor: BigDecimal,
    pub data: NaiveDate,
}

/// Aggregates served by `funcionarios/painel-gerente/`.
#[derive(Debug, Deserialize)]
pub struct PainelGerente {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub alunos_ativos: u64,
    #[serde(default)]
    pub professores: u64,
    #[serde(default)]
    pub mensalidades_pendentes: u64,
    #[serde(default)]
    pub mensalidades_atrasadas: u64,
    #[serde(default)]
    pub mensalidades_pagas: u64,
    #[serde(default)]
    pub precadastros: u64,
    #[serde(default)]
    pub turmas: Vec<Turma>,
}
