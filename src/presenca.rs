use chrono::{NaiveDate, Utc};
use chrono_tz::America::Sao_Paulo;

use crate::api::{
    CorrigirPresencaRequest, MessageResponse, RegistrarPresencaRequest, RelatorioPresencaResponse,
    VerificarCheckinResponse,
};
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::Presenca;

/// Attendance is a per-day affair and every CT runs on São Paulo time, so
/// "today" is computed there no matter where the client runs.
pub fn hoje() -> NaiveDate {
    Utc::now().with_timezone(&Sao_Paulo).date_naive()
}

#[derive(Debug, Clone, Default)]
pub struct RelatorioFiltro {
    pub turma: Option<i64>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

impl RelatorioFiltro {
    /// Rolling month ending today, the report screen's default window.
    pub fn ultimos_30_dias() -> Self {
        let fim = hoje();
        Self {
            turma: None,
            data_inicio: Some(fim - chrono::Duration::days(30)),
            data_fim: Some(fim),
        }
    }

    fn query(&self) -> String {
        let turma = self.turma.map(|t| t.to_string()).unwrap_or_default();
        let inicio = self.data_inicio.map(|d| d.to_string()).unwrap_or_default();
        let fim = self.data_fim.map(|d| d.to_string()).unwrap_or_default();
        ApiClient::query(&[
            ("turma", &turma),
            ("data_inicio", &inicio),
            ("data_fim", &fim),
        ])
    }
}

/// Roster of a turma with today's check-in state per student.
pub async fn verificar_checkin(
    client: &ApiClient,
    turma_id: i64,
) -> Result<VerificarCheckinResponse> {
    client.get_json(&format!("funcionarios/verificar-checkin/{}/", turma_id)).await
}

/// Confirms presence for the given students. The endpoint takes the ids as
/// strings.
pub async fn registrar_presenca(
    client: &ApiClient,
    turma_id: i64,
    alunos: &[i64],
) -> Result<MessageResponse> {
    let request = RegistrarPresencaRequest {
        presenca: alunos.iter().map(|id| id.to_string()).collect(),
    };
    client
        .post_json(&format!("funcionarios/registrar-presenca/{}/", turma_id), &request)
        .await
}

pub async fn relatorio_presenca(
    client: &ApiClient,
    filtro: &RelatorioFiltro,
) -> Result<RelatorioPresencaResponse> {
    client
        .get_json(&format!("funcionarios/relatorio-presenca/{}", filtro.query()))
        .await
}

/// Staff fix-up of a single attendance row.
pub async fn corrigir_presenca(
    client: &ApiClient,
    presenca_id: i64,
    request: &CorrigirPresencaRequest,
) -> Result<Presenca> {
    client
        .patch_json(&format!("funcionarios/corrigir-presenca/{}/", presenca_id), request)
        .await
}
