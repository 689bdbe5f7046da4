use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::{
    DarBaixaResponse, GerarPixRequest, PainelGerente, PixGeradoResponse, PixStatusResponse,
    UpsertDespesaRequest, UpsertMensalidadeRequest,
};
use crate::client::ApiClient;
use crate::error::{AppError, Result};
use crate::models::{Despesa, Mensalidade, MensalidadeStatus, PixStatus, PixTransacao, Salario, SalarioStatus};

/// Gateway polling cadence and charge lifetime, as configured in the portal.
pub const PIX_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const PIX_EXPIRATION: Duration = Duration::from_secs(30 * 60);


// Mensalidades ---

#[derive(Debug, Clone, Default)]
pub struct MensalidadeFiltro {
    pub aluno: Option<i64>,
    pub status: Option<MensalidadeStatus>,
}

impl MensalidadeFiltro {
    fn query(&self) -> String {
        let aluno = self.aluno.map(|a| a.to_string()).unwrap_or_default();
        let status = self.status.map(|s| s.as_str().to_string()).unwrap_or_default();
        ApiClient::query(&[("aluno", &aluno), ("status", &status)])
    }
}

pub async fn listar_mensalidades(
    client: &ApiClient,
    filtro: &MensalidadeFiltro,
) -> Result<Vec<Mensalidade>> {
    client
        .get_all_pages(&format!("financeiro/mensalidades/{}", filtro.query()))
        .await
}

pub async fn obter_mensalidade(client: &ApiClient, id: i64) -> Result<Mensalidade> {
    client.get_json(&format!("financeiro/mensalidades/{}/", id)).await
}

pub async fn criar_mensalidade(
    client: &ApiClient,
    request: &UpsertMensalidadeRequest,
) -> Result<Mensalidade> {
    client.post_json("financeiro/mensalidades/", request).await
}

pub async fn atualizar_mensalidade(
    client: &ApiClient,
    id: i64,
    request: &UpsertMensalidadeRequest,
) -> Result<Mensalidade> {
    client.put_json(&format!("financeiro/mensalidades/{}/", id), request).await
}

pub async fn excluir_mensalidade(client: &ApiClient, id: i64) -> Result<()> {
    client.delete(&format!("financeiro/mensalidades/{}/", id)).await
}

/// Manual settlement (cash/transfer received outside the gateway).
pub async fn dar_baixa(client: &ApiClient, id: i64) -> Result<Mensalidade> {
    let resp: DarBaixaResponse = client
        .post_empty(&format!("financeiro/mensalidades/{}/dar-baixa/", id))
        .await?;
    Ok(resp.mensalidade)
}


// Despesas / salários ---

pub async fn listar_despesas(client: &ApiClient) -> Result<Vec<Despesa>> {
    client.get_list("financeiro/despesas/").await
}

pub async fn criar_despesa(client: &ApiClient, request: &UpsertDespesaRequest) -> Result<Despesa> {
    client.post_json("financeiro/despesas/", request).await
}

pub async fn atualizar_despesa(
    client: &ApiClient,
    id: i64,
    request: &UpsertDespesaRequest,
) -> Result<Despesa> {
    client.put_json(&format!("financeiro/despesas/{}/", id), request).await
}

pub async fn excluir_despesa(client: &ApiClient, id: i64) -> Result<()> {
    client.delete(&format!("financeiro/despesas/{}/", id)).await
}

pub async fn listar_salarios(client: &ApiClient) -> Result<Vec<Salario>> {
    client.get_list("financeiro/salarios/").await
}

#[derive(Debug, Serialize)]
struct StatusBody {
    status: SalarioStatus,
}

pub async fn marcar_salario_pago(client: &ApiClient, id: i64) -> Result<Salario> {
    client
        .patch_json(
            &format!("financeiro/salarios/{}/", id),
            &StatusBody { status: SalarioStatus::Pago },
        )
        .await
}

pub async fn painel_gerente(client: &ApiClient) -> Result<PainelGerente> {
    client.get_json("funcionarios/painel-gerente/").await
}

/// Outgoing side of the ledger, fetched concurrently and totaled locally for
/// the expenses tab.
#[derive(Debug)]
pub struct ResumoSaidas {
    pub despesas: Vec<Despesa>,
    pub salarios: Vec<Salario>,
    pub total_despesas: BigDecimal,
    pub total_salarios: BigDecimal,
}

fn soma_valores<'a, I: Iterator<Item = &'a BigDecimal>>(valores: I) -> BigDecimal {
    valores.fold(BigDecimal::zero(), |acc, v| acc + v)
}

pub async fn resumo_saidas(client: &ApiClient) -> Result<ResumoSaidas> {
    let (despesas, salarios) =
        futures::try_join!(listar_despesas(client), listar_salarios(client))?;
    let total_despesas = soma_valores(despesas.iter().map(|d| &d.valor));
    let total_salarios = soma_valores(salarios.iter().map(|s| &s.valor));
    Ok(ResumoSaidas { despesas, salarios, total_despesas, total_salarios })
}


// PIX ---

pub async fn gerar_pix(
    client: &ApiClient,
    mensalidade_id: i64,
    expiracao_minutos: u32,
) -> Result<PixGeradoResponse> {
    info!("raising PIX charge for mensalidade {}", mensalidade_id);
    client
        .post_json(
            &format!("financeiro/pix/gerar/{}/", mensalidade_id),
            &GerarPixRequest { expiracao_minutos },
        )
        .await
}

/// Where to ask for the current state of a PIX charge. The indirection keeps
/// the watcher runnable against a scripted gateway in tests.
#[async_trait]
pub trait PixStatusSource: Send + Sync {
    async fn consultar_status(&self, transacao_id: i64) -> Result<PixTransacao>;
}

#[async_trait]
impl PixStatusSource for ApiClient {
    async fn consultar_status(&self, transacao_id: i64) -> Result<PixTransacao> {
        let resp: PixStatusResponse = self
            .get_json(&format!("financeiro/pix/status/{}/", transacao_id))
            .await?;
        Ok(resp.transacao)
    }
}

/// Terminal state of a watched charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixOutcome {
    Aprovado,
    Expirado,
}

/// Timed subscription on a PIX charge.
///
/// Owns its polling task: it stops itself on approval, gateway expiry or the
/// local deadline, `cancel` aborts it, and dropping the handle aborts it too.
/// Nothing keeps ticking after the owner goes away.
pub struct PixWatcher {
    task: Option<JoinHandle<PixOutcome>>,
}

impl PixWatcher {
    pub fn spawn<S>(source: Arc<S>, transacao_id: i64) -> Self
    where
        S: PixStatusSource + 'static,
    {
        Self::spawn_with(source, transacao_id, PIX_POLL_INTERVAL, PIX_EXPIRATION)
    }

    pub fn spawn_with<S>(
        source: Arc<S>,
        transacao_id: i64,
        poll_every: Duration,
        expira_em: Duration,
    ) -> Self
    where
        S: PixStatusSource + 'static,
    {
        let task = tokio::spawn(async move {
            let poll = async {
                let mut ticker = tokio::time::interval(poll_every);
                loop {
                    ticker.tick().await;
                    match source.consultar_status(transacao_id).await {
                        Ok(transacao) => match transacao.status {
                            PixStatus::Aprovado => return PixOutcome::Aprovado,
                            PixStatus::Expirado | PixStatus::Cancelado => {
                                return PixOutcome::Expirado
                            }
                            PixStatus::Pendente => {}
                        },
                        // a failed poll is not terminal; the next tick retries
                        Err(err) => warn!("PIX status poll failed: {}", err),
                    }
                }
            };
            match tokio::time::timeout(expira_em, poll).await {
                Ok(outcome) => outcome,
                Err(_) => PixOutcome::Expirado,
            }
        });
        Self { task: Some(task) }
    }

    /// Waits for the charge to settle. Consumes the watcher.
    pub async fn outcome(mut self) -> Result<PixOutcome> {
        let Some(task) = self.task.take() else {
            return Err(AppError::Internal("pix watcher already consumed".to_string()));
        };
        task.await
            .map_err(|e| AppError::Internal(format!("pix watcher task failed: {}", e)))
    }

    /// Stops polling immediately (e.g. the payment modal was closed).
    pub fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for PixWatcher {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
