use crate::api::{MessageResponse, RosterRequest, UpsertTurmaRequest};
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{DiaSemana, Turma, Usuario};

pub async fn listar_turmas(client: &ApiClient, ct: Option<i64>) -> Result<Vec<Turma>> {
    let query = match ct {
        Some(id) => ApiClient::query(&[("ct", &id.to_string())]),
        None => String::new(),
    };
    client.get_list(&format!("turmas/{}", query)).await
}

pub async fn obter_turma(client: &ApiClient, id: i64) -> Result<Turma> {
    client.get_json(&format!("turmas/{}/", id)).await
}

pub async fn criar_turma(client: &ApiClient, request: &UpsertTurmaRequest) -> Result<Turma> {
    client.post_json("turmas/", request).await
}

pub async fn atualizar_turma(
    client: &ApiClient,
    id: i64,
    request: &UpsertTurmaRequest,
) -> Result<Turma> {
    client.put_json(&format!("turmas/{}/", id), request).await
}

pub async fn excluir_turma(client: &ApiClient, id: i64) -> Result<()> {
    client.delete(&format!("turmas/{}/", id)).await
}

/// Weekday options configured for scheduling. The enrollment day picker is
/// built from these rows.
pub async fn listar_dias_semana(client: &ApiClient) -> Result<Vec<DiaSemana>> {
    client.get_list("turmas/diassemana/").await
}

pub async fn alunos_da_turma(client: &ApiClient, turma_id: i64) -> Result<Vec<Usuario>> {
    client.get_list(&format!("turmas/{}/alunos/", turma_id)).await
}

pub async fn adicionar_alunos(
    client: &ApiClient,
    turma_id: i64,
    alunos: Vec<i64>,
) -> Result<MessageResponse> {
    client
        .post_json(
            &format!("turmas/{}/adicionar-alunos/", turma_id),
            &RosterRequest { alunos },
        )
        .await
}

pub async fn remover_alunos(
    client: &ApiClient,
    turma_id: i64,
    alunos: Vec<i64>,
) -> Result<MessageResponse> {
    client
        .post_json(
            &format!("turmas/{}/remover-alunos/", turma_id),
            &RosterRequest { alunos },
        )
        .await
}
