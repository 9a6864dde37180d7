//! Configuração em camadas do pipeline.
//!
//! `defaults/morph.default.toml` vai embutido no binário. Por cima dele entram,
//! nesta ordem: um arquivo TOML do usuário, variáveis `MORPH__SECAO__CHAVE` e
//! overrides explícitos (flags da CLI), via [`Loader`].

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, ValueKind};
use serde::Deserialize;

const DEFAULT_TOML: &str = include_str!("../defaults/morph.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct MorphConfig {
    pub corpus: CorpusConfig,
    pub analyzer: AnalyzerConfig,
    pub pipeline: PipelineConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorpusConfig {
    pub assets_dir: PathBuf,
}

/// Família de analisador; decide o par analisador/conversor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Mystem,
    OpenCorpora,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    pub backend: Backend,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Tabela de mapeamento própria; sem ela usa a embutida.
    #[serde(default)]
    pub mapping: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Processa documentos em workers do rayon.
    pub parallel: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub address: String,
}

/// Empilha fontes de configuração sobre os defaults embutidos.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Arquivo obrigatório; ausente gera erro no `build`.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Variáveis `MORPH__ANALYZER__COMMAND=...`.
    pub fn with_env(mut self) -> Self {
        self.builder = self
            .builder
            .add_source(Environment::with_prefix("MORPH").prefix_separator("__").separator("__"));
        self
    }

    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<MorphConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<MorphConfig, ConfigError> {
    Loader::new().build()
}
