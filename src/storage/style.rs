use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::models::StyleConfig;
use crate::Result;

/// File-backed store for the style document.
///
/// A missing file means "use the defaults"; a file that exists but does not
/// hold a JSON object is reported to the caller. Concurrent saves are not
/// coordinated, the last writer wins.
#[derive(Clone, Debug)]
pub struct StyleStorage {
    path: PathBuf,
}
impl StyleStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    #[instrument(name = "loading style", skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<StyleConfig> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => StyleConfig::from_json_slice(&bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Nenhuma configuração salva, usando o estilo padrão");
                Ok(StyleConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }
    #[instrument(name = "saving style", skip_all, fields(path = %self.path.display()))]
    pub async fn save(&self, config: &StyleConfig) -> Result<()> {
        let document = config.to_json_pretty()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, document).await?;
        info!("Configuração de estilo salva");
        Ok(())
    }
}
