//! # morph-core — Anotação Morfológica em CONLL-U
//!
//! Este crate transforma documentos de texto puro num corpus anotado
//! morfologicamente, no formato tabular CONLL-U, usando um analisador
//! morfológico externo como caixa-preta.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui em linha reta:
//!
//! 1.  **Entrada**: diretório com `{id}_raw.txt` + `{id}_meta.json` ([`corpus`]).
//! 2.  **Segmentação** ([`tokenizer`]): sentenças e palavras por regras próprias.
//! 3.  **Análise** ([`analyzer`]): uma chamada ao analisador sobre o texto normalizado.
//! 4.  **Alinhamento** ([`align`]): casa as palavras com o fluxo do analisador.
//! 5.  **Conversão** ([`converter`], [`mapping`]): tags nativas → UPOS + features UD.
//! 6.  **Saída** ([`conllu`], [`store`]): CONLL-U com e sem features, texto limpo.
//!
//! ## Exemplo de Uso
//!
//! ```rust,no_run
//! use morph_core::config::Loader;
//! use morph_core::corpus::CorpusManager;
//! use morph_core::pipeline::{annotator_for, MorphologicalAnalysisPipeline};
//!
//! let config = Loader::new().with_env().build()?;
//! let mut corpus = CorpusManager::load(&config.corpus.assets_dir)?;
//!
//! let pipeline = MorphologicalAnalysisPipeline::new(annotator_for(&config.analyzer)?)
//!     .parallel(config.pipeline.parallel);
//! let report = pipeline.run(&mut corpus);
//! println!("{} anotados, {} com falha", report.annotated.len(), report.failed.len());
//! # Ok::<(), morph_core::Error>(())
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestra as fases sobre o corpus.
//! - [`align`]: o motor de alinhamento, coração do sistema.
//! - [`document`]: tokens, sentenças e documentos em memória.

pub mod align;
pub mod analyzer;
pub mod config;
pub mod conllu;
pub mod converter;
pub mod corpus;
pub mod document;
pub mod error;
pub mod mapping;
pub mod pipeline;
pub mod store;
pub mod tokenizer;
pub mod ud;

pub use corpus::CorpusManager;
pub use document::{ConlluSentence, ConlluToken, Corpus, Document, DocumentId, MorphologicalAnnotation};
pub use error::{ConversionError, DatasetError, Error, Inconsistency, Result};
pub use pipeline::{Annotator, MorphologicalAnalysisPipeline, PosFrequencyPipeline, RunReport};
pub use ud::{Features, UdPos};
