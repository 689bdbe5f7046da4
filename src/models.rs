use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of an account on the platform. The API calls this field `tipo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    Aluno,
    Professor,
    Gerente,
}

impl UserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserKind::Aluno => "aluno",
            UserKind::Professor => "professor",
            UserKind::Gerente => "gerente",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usuario {
    pub id: i64,
    pub username: String, // the API uses the bare CPF digits as username
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub tipo: UserKind,
    #[serde(default)]
    pub ativo: bool,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub cpf: Option<String>,
    pub ficha_medica: Option<String>,
    pub foto_perfil: Option<String>, // URL served by the API
    // student-only billing fields
    pub dia_vencimento: Option<u8>,
    pub valor_mensalidade: Option<BigDecimal>,
    pub telefone_responsavel: Option<String>,
    pub telefone_emergencia: Option<String>,
    pub nome_responsavel: Option<String>,
    // professor-only payroll fields
    pub salario_professor: Option<BigDecimal>,
    pub pix_professor: Option<String>,
    #[serde(default)]
    pub centros_treinamento: Option<Vec<CentroTreinamento>>,
}

impl Usuario {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Lifecycle of a lead. The misspelled `nao_quiser_matricular` is the value
/// the API actually stores, so it stays misspelled on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreCadastroStatus {
    #[serde(rename = "pendente")]
    Pendente,
    #[serde(rename = "compareceu")]
    Compareceu,
    #[serde(rename = "matriculado")]
    Matriculado,
    #[serde(rename = "nao_compareceu")]
    NaoCompareceu,
    #[serde(rename = "nao_quiser_matricular")]
    NaoQuisMatricular,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreCadastro {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telefone: String,
    pub data_nascimento: Option<NaiveDate>,
    pub cpf: Option<String>, // 11 digits when present
    pub turma: Option<i64>,
    pub status: PreCadastroStatus,
    #[serde(default)]
    pub criado_em: Option<DateTime<Utc>>,
}

impl PreCadastro {
    /// A cpf is "on file" only when the field holds something non-blank.
    pub fn has_cpf(&self) -> bool {
        self.cpf.as_deref().map(|c| !c.trim().is_empty()).unwrap_or(false)
    }
}

/// Operating weekday of a CT, as served by `turmas/diassemana/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaSemana {
    pub id: i64,
    pub nome: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turma {
    pub id: i64,
    pub professor: i64,
    pub professor_nome: Option<String>,
    pub ct: i64,
    pub ct_nome: Option<String>,
    pub horario: NaiveTime,
    #[serde(default)]
    pub dias_semana: Vec<i64>,
    #[serde(default)]
    pub dias_semana_nomes: Vec<String>,
    pub capacidade_maxima: u32,
    #[serde(default)]
    pub alunos_count: u32,
    #[serde(default)]
    pub ativo: bool,
    #[serde(default)]
    pub tem_vagas: Option<bool>,
    #[serde(default)]
    pub alunos: Option<Vec<Usuario>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentroTreinamento {
    pub id: i64,
    pub nome: String,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub ativo: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MensalidadeStatus {
    Pendente,
    Pago,
    Atrasado,
}

impl MensalidadeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MensalidadeStatus::Pendente => "pendente",
            MensalidadeStatus::Pago => "pago",
            MensalidadeStatus::Atrasado => "atrasado",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mensalidade {
    pub id: i64,
    pub aluno: i64,
    pub aluno_nome: Option<String>,
    pub valor: BigDecimal,
    pub data_inicio: Option<NaiveDate>,
    pub data_vencimento: NaiveDate,
    pub status: MensalidadeStatus,
    pub data_pagamento: Option<NaiveDate>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Despesa {
    pub id: i64,
    pub descricao: String,
    pub valor: BigDecimal,
    pub data: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalarioStatus {
    Pendente,
    Pago,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Salario {
    pub id: i64,
    pub professor: i64,
    pub valor: BigDecimal,
    pub data_pagamento: Option<NaiveDate>,
    pub status: SalarioStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixStatus {
    Pendente,
    Aprovado,
    Expirado,
    Cancelado,
}

/// PIX charge raised against a mensalidade through the bank gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixTransacao {
    pub id: i64,
    pub mensalidade: i64,
    pub valor: BigDecimal,
    pub status: PixStatus,
    pub txid: Option<String>,
    pub chave_pix: Option<String>,
    pub qr_code: Option<String>,
    pub codigo_pix: Option<String>, // "copia e cola" string
    pub data_criacao: Option<DateTime<Utc>>,
    pub data_expiracao: Option<DateTime<Utc>>,
    pub data_aprovacao: Option<DateTime<Utc>>,
    pub descricao: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presenca {
    pub id: i64,
    pub usuario: i64,
    pub turma: i64,
    pub data: NaiveDate,
    pub checkin_realizado: bool,
    pub presenca_confirmada: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperaNews {
    pub id: i64,
    pub titulo: String,
    pub conteudo: String, // HTML; sanitize before rendering
    pub imagem: Option<String>,
    #[serde(default)]
    pub criado_em: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaleriaFoto {
    pub id: i64,
    pub titulo: Option<String>,
    pub imagem: String,
    #[serde(default)]
    pub criado_em: Option<DateTime<Utc>>,
}
