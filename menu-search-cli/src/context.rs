use std::path::Path;
use std::sync::Arc;

use menu_search::config::{ConfigLoader, MenuSearchConfig};
use menu_search::core::SearchPipeline;
use menu_search::storage::EntryStore;

pub struct CliContext {
    pub pipeline: SearchPipeline,
    pub config: MenuSearchConfig,
}

impl CliContext {
    /// Load configuration (defaults, config files, environment), apply the
    /// command-line overrides and build the pipeline.
    pub async fn new(
        data_dir: Option<String>,
        config_file: Option<&Path>,
    ) -> menu_search::Result<Self> {
        let mut loader = ConfigLoader::new();
        match config_file {
            Some(path) => {
                loader.load_file(path)?;
            }
            None => {
                loader.load_default_files();
            }
        }
        loader.load_env();

        let mut config = loader.extract()?;
        if let Some(dir) = data_dir {
            config.storage.data_dir = dir.into();
        }

        Self::from_config(config).await
    }

    pub async fn from_config(config: MenuSearchConfig) -> menu_search::Result<Self> {
        let pipeline = menu_search::init(config.clone()).await?;
        Ok(Self { pipeline, config })
    }

    pub fn store(&self) -> &Arc<EntryStore> {
        self.pipeline.store()
    }
}
