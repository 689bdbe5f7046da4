use std::sync::Arc;

use supera::config::Config;
use supera::models::PreCadastroStatus;
use supera::{financeiro, users, ApiClient, SessionContext};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();
    tracing::info!("Starting CT Supera client");

    let config = Config::from_env()?;
    let client = Arc::new(ApiClient::new(&config)?);
    let session = SessionContext::new(client.clone());

    let (Some(cpf), Some(password)) = (config.cpf.clone(), config.password.clone()) else {
        return Err("SUPERA_CPF and SUPERA_PASSWORD must be set".into());
    };

    let user = session.login(&cpf, &password).await?;
    tracing::info!("authenticated as {} ({})", user.full_name(), user.tipo.as_str());

    session.carregar_referencias().await?;

    // Console snapshot of the manager panel
    let painel = financeiro::painel_gerente(&client).await?;
    tracing::info!("alunos ativos: {}", painel.alunos_ativos);
    tracing::info!(
        "mensalidades: {} pagas, {} pendentes, {} atrasadas",
        painel.mensalidades_pagas,
        painel.mensalidades_pendentes,
        painel.mensalidades_atrasadas
    );

    let precadastros = users::listar_precadastros(&client).await?;
    let aguardando = precadastros
        .iter()
        .filter(|p| p.status == PreCadastroStatus::Pendente || p.status == PreCadastroStatus::Compareceu)
        .count();
    tracing::info!(
        "pré-cadastros: {} no total, {} aguardando matrícula",
        precadastros.len(),
        aguardando
    );

    session.logout().await;

    Ok(())
}
