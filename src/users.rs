use std::str::FromStr;

use chrono::NaiveDate;
use email_address::EmailAddress;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

use crate::api::{CreatePreCadastroRequest, CreateUserRequest, MessageResponse};
use crate::client::ApiClient;
use crate::error::{Result, ValidationError};
use crate::models::{PreCadastro, Turma, UserKind, Usuario};

lazy_static! {
    static ref NAO_DIGITO: Regex = Regex::new(r"\D").expect("static regex");
}

/// Strips formatting from CPF/phone input ("123.456.789-00" -> digits).
pub fn somente_digitos(valor: &str) -> String {
    NAO_DIGITO.replace_all(valor, "").into_owned()
}

/// Mobile numbers are stored as `(dd)ddddd-dddd`. Anything that is not an
/// 11-digit number is passed through untouched, as the API tolerates it.
pub fn formatar_telefone(telefone: &str) -> String {
    let digitos = somente_digitos(telefone);
    if digitos.len() == 11 {
        format!("({}){}-{}", &digitos[..2], &digitos[2..7], &digitos[7..])
    } else {
        telefone.to_string()
    }
}

/// Lead captured by the public scheduling form.
#[derive(Debug, Clone)]
pub struct NovoPreCadastro {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub telefone: String,
    pub data_nascimento: Option<NaiveDate>,
    /// Chosen trial class, when any. Carried whole so the capacity guard can
    /// run before the request leaves the client.
    pub turma: Option<Turma>,
    /// Optional at capture time; staff collects it at matrícula otherwise.
    pub cpf: String,
}

/// Local validation + normalization, mirrored by the server. Kept separate
/// from the POST so it is testable without a network.
pub fn montar_precadastro(novo: &NovoPreCadastro) -> Result<CreatePreCadastroRequest> {
    if EmailAddress::from_str(novo.email.trim()).is_err() {
        return Err(ValidationError::InvalidEmail.into());
    }
    if let Some(turma) = &novo.turma {
        if turma.tem_vagas == Some(false) {
            return Err(ValidationError::TurmaSemVagas.into());
        }
    }
    let cpf = {
        let digitos = somente_digitos(&novo.cpf);
        if digitos.is_empty() { None } else { Some(digitos) }
    };
    Ok(CreatePreCadastroRequest {
        first_name: novo.first_name.trim().to_string(),
        last_name: novo.last_name.trim().to_string(),
        email: novo.email.trim().to_string(),
        telefone: formatar_telefone(&novo.telefone),
        data_nascimento: novo.data_nascimento,
        turma: novo.turma.as_ref().map(|t| t.id),
        cpf,
    })
}

pub async fn criar_precadastro(
    client: &ApiClient,
    novo: &NovoPreCadastro,
) -> Result<PreCadastro> {
    let request = montar_precadastro(novo)?;
    info!("capturing lead {} {}", request.first_name, request.last_name);
    client.post_json("usuarios/precadastros/", &request).await
}

/// Full pré-cadastro list, every page.
pub async fn listar_precadastros(client: &ApiClient) -> Result<Vec<PreCadastro>> {
    client.get_all_pages("usuarios/precadastros/").await
}

/// Staff edit of a lead that has not been enrolled yet.
pub async fn atualizar_precadastro(
    client: &ApiClient,
    id: i64,
    request: &CreatePreCadastroRequest,
) -> Result<PreCadastro> {
    client.put_json(&format!("usuarios/precadastros/{}/", id), request).await
}

pub async fn excluir_precadastro(client: &ApiClient, id: i64) -> Result<()> {
    client.delete(&format!("usuarios/precadastros/{}/", id)).await
}

pub async fn listar_usuarios(
    client: &ApiClient,
    tipo: Option<UserKind>,
) -> Result<Vec<Usuario>> {
    let query = match tipo {
        Some(t) => ApiClient::query(&[("tipo", t.as_str())]),
        None => String::new(),
    };
    client.get_list(&format!("usuarios/{}", query)).await
}

pub async fn obter_usuario(client: &ApiClient, id: i64) -> Result<Usuario> {
    client.get_json(&format!("usuarios/{}/", id)).await
}

pub async fn criar_usuario(client: &ApiClient, request: &CreateUserRequest) -> Result<Usuario> {
    client.post_json("usuarios/", request).await
}

/// Partial update, the administration screen's edit path.
pub async fn atualizar_usuario(
    client: &ApiClient,
    id: i64,
    request: &CreateUserRequest,
) -> Result<Usuario> {
    client.patch_json(&format!("usuarios/{}/", id), request).await
}

/// Full replacement, used by the profile screen.
pub async fn substituir_usuario(
    client: &ApiClient,
    id: i64,
    request: &CreateUserRequest,
) -> Result<Usuario> {
    client.put_json(&format!("usuarios/{}/", id), request).await
}

pub async fn excluir_usuario(client: &ApiClient, id: i64) -> Result<()> {
    client.delete(&format!("usuarios/{}/", id)).await
}

/// Resends the account-activation invite email.
pub async fn reenviar_convite(client: &ApiClient, id: i64) -> Result<MessageResponse> {
    client.post_empty(&format!("usuarios/reenviar-convite/{}/", id)).await
}

/// Baseline account request; role-specific fields are filled in by the caller.
/// The API mirrors the CPF digits into `username`.
pub fn novo_usuario(
    tipo: UserKind,
    first_name: &str,
    last_name: &str,
    cpf: &str,
    email: &str,
) -> CreateUserRequest {
    let digitos = somente_digitos(cpf);
    CreateUserRequest {
        username: digitos.clone(),
        cpf: digitos,
        email: email.trim().to_string(),
        tipo,
        first_name: first_name.trim().to_string(),
        last_name: last_name.trim().to_string(),
        telefone: None,
        endereco: None,
        data_nascimento: None,
        telefone_responsavel: None,
        telefone_emergencia: None,
        nome_responsavel: None,
        ficha_medica: None,
        dia_vencimento: None,
        valor_mensalidade: None,
        salario_professor: None,
        pix_professor: None,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn novo_lead() -> NovoPreCadastro {
        NovoPreCadastro {
            first_name: "  Pedro ".into(),
            last_name: "Lima".into(),
            email: "pedro@example.com".into(),
            telefone: "11987654321".into(),
            data_nascimento: None,
            turma: None,
            cpf: String::new(),
        }
    }

    #[test]
    fn telefone_celular_e_normalizado() {
        assert_eq!(formatar_telefone("11987654321"), "(11)98765-4321");
        assert_eq!(formatar_telefone("(11) 98765-4321"), "(11)98765-4321");
        // landlines pass through untouched
        assert_eq!(formatar_telefone("1132654321"), "1132654321");
    }

    #[test]
    fn cpf_mantem_somente_digitos() {
        assert_eq!(somente_digitos("123.456.789-00"), "12345678900");
        assert_eq!(somente_digitos(""), "");
    }

    #[test]
    fn lead_normalizado_antes_do_envio() {
        let request = montar_precadastro(&novo_lead()).unwrap();
        assert_eq!(request.first_name, "Pedro");
        assert_eq!(request.telefone, "(11)98765-4321");
        assert_eq!(request.cpf, None);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("cpf").is_none());
        assert!(json.get("turma").is_none());
    }

    #[test]
    fn email_invalido_e_rejeitado_localmente() {
        let mut lead = novo_lead();
        lead.email = "pedro@".into();
        assert!(matches!(
            montar_precadastro(&lead).unwrap_err(),
            AppError::Validation(ValidationError::InvalidEmail)
        ));
    }

    #[test]
    fn turma_lotada_e_rejeitada_localmente() {
        let mut lead = novo_lead();
        lead.turma = Some(Turma {
            id: 9,
            professor: 1,
            professor_nome: None,
            ct: 1,
            ct_nome: None,
            horario: chrono::NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            dias_semana: vec![1, 3],
            dias_semana_nomes: vec![],
            capacidade_maxima: 20,
            alunos_count: 20,
            ativo: true,
            tem_vagas: Some(false),
            alunos: None,
        });
        assert!(matches!(
            montar_precadastro(&lead).unwrap_err(),
            AppError::Validation(ValidationError::TurmaSemVagas)
        ));
    }

    #[test]
    fn novo_usuario_espelha_cpf_no_username() {
        let req = novo_usuario(UserKind::Aluno, "Ana", "Souza", "123.456.789-00", "a@b.com");
        assert_eq!(req.username, "12345678900");
        assert_eq!(req.cpf, "12345678900");
    }
}
