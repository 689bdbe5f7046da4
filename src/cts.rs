use serde::Serialize;

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::CentroTreinamento;

#[derive(Debug, Clone, Serialize)]
pub struct UpsertCtRequest {
    pub nome: String,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub ativo: bool,
}

pub async fn listar_cts(client: &ApiClient) -> Result<Vec<CentroTreinamento>> {
    client.get_list("cts/").await
}

pub async fn obter_ct(client: &ApiClient, id: i64) -> Result<CentroTreinamento> {
    client.get_json(&format!("cts/{}/", id)).await
}

// The CT endpoints predate the DRF router migration, hence the verb paths.
pub async fn criar_ct(client: &ApiClient, request: &UpsertCtRequest) -> Result<CentroTreinamento> {
    client.post_json("cts/criar/", request).await
}

pub async fn atualizar_ct(
    client: &ApiClient,
    id: i64,
    request: &UpsertCtRequest,
) -> Result<CentroTreinamento> {
    client.put_json(&format!("cts/editar/{}/", id), request).await
}

pub async fn excluir_ct(client: &ApiClient, id: i64) -> Result<()> {
    client.delete(&format!("cts/excluir/{}/", id)).await
}
