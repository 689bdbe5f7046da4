use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::try_join;
use tokio::sync::RwLock;
use tracing::info;

use crate::api::{LoginRequest, LoginResponse, MessageResponse};
use crate::client::ApiClient;
use crate::cts;
use crate::enrollment::EnrollmentForm;
use crate::error::Result;
use crate::error::TraceErr;
use crate::models::{CentroTreinamento, DiaSemana, PreCadastro, UserKind, Usuario};
use crate::turmas;
use crate::users;

/// Authenticated session with typed accessors and an explicit teardown
/// lifecycle. Owns the reference-data cache (weekdays, CTs) that the
/// administration screens keep re-reading.
pub struct SessionContext {
    client: Arc<ApiClient>,
    user: RwLock<Option<Usuario>>,
    dias_semana: DashMap<i64, DiaSemana>,
    cts: DashMap<i64, CentroTreinamento>,
}

impl SessionContext {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            user: RwLock::new(None),
            dias_semana: DashMap::new(),
            cts: DashMap::new(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn login(&self, cpf: &str, password: &str) -> Result<Usuario> {
        let request = LoginRequest {
            cpf: users::somente_digitos(cpf),
            password: password.to_string(),
        };
        let resp: LoginResponse = self.client.post_json("usuarios/login/", &request).await?;
        self.client.set_token(resp.token).await;
        *self.user.write().await = Some(resp.user.clone());
        info!("session opened for {} ({})", resp.user.full_name(), resp.user.tipo.as_str());
        Ok(resp.user)
    }

    /// Server-side logout is best effort; local state is torn down regardless.
    pub async fn logout(&self) {
        if self.client.has_token().await {
            let _ = self
                .client
                .post_empty::<MessageResponse>("usuarios/logout/")
                .await
                .trace_err("logout");
        }
        self.client.clear_token().await;
        *self.user.write().await = None;
        self.invalidate();
        info!("session closed");
    }

    pub async fn current_user(&self) -> Option<Usuario> {
        self.user.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user.read().await.is_some()
    }

    pub async fn is_gerente(&self) -> bool {
        matches!(
            self.user.read().await.as_ref().map(|u| u.tipo),
            Some(UserKind::Gerente)
        )
    }

    /// Warms both reference lists in one round trip each, concurrently.
    pub async fn carregar_referencias(&self) -> Result<()> {
        let (dias, centros) = try_join(
            turmas::listar_dias_semana(&self.client),
            cts::listar_cts(&self.client),
        )
        .await?;
        for dia in dias {
            self.dias_semana.insert(dia.id, dia);
        }
        for centro in centros {
            self.cts.insert(centro.id, centro);
        }
        Ok(())
    }

    pub async fn dias_semana(&self) -> Result<Vec<DiaSemana>> {
        if self.dias_semana.is_empty() {
            for dia in turmas::listar_dias_semana(&self.client).await? {
                self.dias_semana.insert(dia.id, dia);
            }
        }
        let mut dias: Vec<DiaSemana> =
            self.dias_semana.iter().map(|entry| entry.value().clone()).collect();
        dias.sort_by_key(|d| d.id);
        Ok(dias)
    }

    pub async fn centros_treinamento(&self) -> Result<Vec<CentroTreinamento>> {
        if self.cts.is_empty() {
            for centro in cts::listar_cts(&self.client).await? {
                self.cts.insert(centro.id, centro);
            }
        }
        let mut centros: Vec<CentroTreinamento> =
            self.cts.iter().map(|entry| entry.value().clone()).collect();
        centros.sort_by_key(|c| c.id);
        Ok(centros)
    }

    pub fn invalidate(&self) {
        self.dias_semana.clear();
        self.cts.clear();
    }

    /// Opens the matrícula form for a lead, with the day picker restricted to
    /// the weekdays the CT actually operates.
    pub async fn abrir_matricula(&self, precadastro: PreCadastro) -> Result<EnrollmentForm> {
        let dias = self.dias_semana().await?;
        Ok(EnrollmentForm::new(precadastro)
            .with_dias_permitidos(dias.iter().map(|d| d.id).collect()))
    }
}
