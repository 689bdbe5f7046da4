use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{GaleriaFoto, SuperaNews};

/// News bodies are authored as rich HTML in the admin. Everything active is
/// stripped before the content reaches a renderer.
pub fn sanitizar_html(html: &str) -> String {
    ammonia::clean(html)
}

pub async fn listar_noticias(client: &ApiClient) -> Result<Vec<SuperaNews>> {
    let mut noticias: Vec<SuperaNews> = client.get_list("cts/supera-news/").await?;
    for noticia in &mut noticias {
        noticia.conteudo = sanitizar_html(&noticia.conteudo);
    }
    Ok(noticias)
}

pub async fn excluir_noticia(client: &ApiClient, id: i64) -> Result<()> {
    client.delete(&format!("cts/supera-news/excluir/{}/", id)).await
}

pub async fn listar_fotos(client: &ApiClient) -> Result<Vec<GaleriaFoto>> {
    client.get_list("cts/galeria/").await
}

pub async fn excluir_foto(client: &ApiClient, id: i64) -> Result<()> {
    client.delete(&format!("cts/galeria/excluir/{}/", id)).await
}

// Creating/updating news and photos goes through multipart image upload,
// which the API owns end to end; this client only lists and removes.


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizer_strips_scripts_and_keeps_markup() {
        let dirty = "<p>Copa <b>Supera</b></p><script>alert('x')</script>";
        let clean = sanitizar_html(dirty);
        assert!(clean.contains("<b>Supera</b>"));
        assert!(!clean.contains("script"));
        assert!(!clean.contains("alert"));
    }
}
